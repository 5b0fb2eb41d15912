//! Process-scoped session context.
//!
//! # Design
//! - Create exactly one context per app boot and share it by `Rc`.
//! - `reset` is the only teardown: it drops the credential and every cached
//!   read together so no cached value outlives the credential it was read with.

use std::rc::Rc;

use crate::core::cache::SessionCache;
use crate::core::config::ClientConfig;
use crate::core::navigation::{AppRoute, NavigationMode, Navigator};
use crate::core::token::TokenStore;
use crate::core::transport::{ApiClient, Transport};

/// Shared state consulted by every orchestrator.
pub struct SessionContext {
    config: ClientConfig,
    tokens: Rc<TokenStore>,
    cache: SessionCache,
    api: ApiClient,
    auth_api: ApiClient,
    navigator: Rc<dyn Navigator>,
}

impl SessionContext {
    /// Build the context around a transport, a token store, and a navigator.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        transport: Rc<dyn Transport>,
        tokens: TokenStore,
        navigator: Rc<dyn Navigator>,
    ) -> Rc<Self> {
        let tokens = Rc::new(tokens);
        Rc::new(Self {
            api: ApiClient::json(transport.clone(), tokens.clone()),
            auth_api: ApiClient::form(transport, tokens.clone()),
            config,
            tokens,
            cache: SessionCache::new(),
            navigator,
        })
    }

    /// Client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Credential holder.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Server-state cache.
    #[must_use]
    pub const fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// JSON-body client for ordinary calls.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Form-body client for the login endpoint.
    #[must_use]
    pub const fn auth_api(&self) -> &ApiClient {
        &self.auth_api
    }

    /// Navigator used for post-operation redirects.
    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// Navigate to `route`.
    pub fn navigate(&self, route: AppRoute, mode: NavigationMode) {
        tracing::debug!(route = route.path(), ?mode, "navigating");
        self.navigator.navigate(route, mode);
    }

    /// Drop the credential and every cached value.
    pub fn reset(&self) {
        self.tokens.clear();
        self.cache.clear();
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SessionContext")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::cache::SESSION_KEY;
    use crate::core::error::RequestError;
    use crate::core::testing::harness;

    #[tokio::test]
    async fn reset_drops_token_and_cache_together() {
        let harness = harness();
        harness.context.tokens().set("tok");
        harness
            .context
            .cache()
            .read(SESSION_KEY, || async { Ok::<_, RequestError>(1_u8) })
            .await;

        harness.context.reset();

        assert!(harness.context.tokens().get().is_none());
        assert!(harness.context.cache().is_empty());
    }

    #[test]
    fn clients_share_the_token_store_with_distinct_encodings() {
        let harness = harness();
        assert_ne!(
            harness.context.api().encoding(),
            harness.context.auth_api().encoding()
        );
    }
}
