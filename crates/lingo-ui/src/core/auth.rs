//! Login, registration, and logout orchestration.
//!
//! # Design
//! - Each operation records its lifecycle in its own [`RequestStatus`];
//!   failures are captured there and never returned as `Err`.
//! - Side effects (token write, cache invalidation, navigation) run only on
//!   success, after the status transition is decided.
//! - Registration never authenticates; the user is sent to login instead.

use std::cell::RefCell;
use std::rc::Rc;

use lingo_api_models::{AccessToken, LoginForm, RegisterForm, User};

use crate::core::cache::{QuerySnapshot, QueryStatus, SESSION_KEY};
use crate::core::context::SessionContext;
use crate::core::error::{ApiError, RequestError};
use crate::core::navigation::{AppRoute, NavigationMode};
use crate::core::status::{CombinedStatus, RequestStatus};

/// Generic message shown when a login failure carries no server detail.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed.";

/// Generic message shown when a registration failure carries no server detail.
pub const REGISTER_FAILED_MESSAGE: &str = "Registration failed.";

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const CURRENT_USER_PATH: &str = "/users/me";

/// Drives the authentication flows against a [`SessionContext`].
#[derive(Debug)]
pub struct AuthOrchestrator {
    context: Rc<SessionContext>,
    login: RefCell<RequestStatus<()>>,
    register: RefCell<RequestStatus<()>>,
}

impl AuthOrchestrator {
    /// Orchestrator with both operations idle.
    #[must_use]
    pub fn new(context: Rc<SessionContext>) -> Self {
        Self {
            context,
            login: RefCell::new(RequestStatus::Idle),
            register: RefCell::new(RequestStatus::Idle),
        }
    }

    /// Exchange credentials for a token.
    ///
    /// On success the token is stored, the session entry is invalidated, and
    /// the dashboard is pushed. On failure nothing but the status changes.
    pub async fn login(&self, form: &LoginForm) -> RequestStatus<()> {
        self.login.replace(RequestStatus::Pending);
        let status = match self.request_token(form).await {
            Ok(token) => {
                self.context.tokens().set(&token.access_token);
                self.context.cache().invalidate(SESSION_KEY);
                tracing::info!(operation = "login", username = %form.username, "login succeeded");
                self.context
                    .navigate(AppRoute::Dashboard, NavigationMode::Push);
                RequestStatus::Succeeded(())
            }
            Err(err) => {
                tracing::warn!(operation = "login", error = %err, "login failed");
                RequestStatus::Failed(err)
            }
        };
        self.login.replace(status.clone());
        status
    }

    /// Create an account, then send the user to login on success.
    pub async fn register(&self, form: &RegisterForm) -> RequestStatus<()> {
        self.register.replace(RequestStatus::Pending);
        let outcome = self
            .context
            .api()
            .post_discarding(REGISTER_PATH, form)
            .await
            .map_err(RequestError::from);
        let status = match outcome {
            Ok(()) => {
                tracing::info!(operation = "register", username = %form.username, "registration succeeded");
                self.context.navigate(AppRoute::Login, NavigationMode::Push);
                RequestStatus::Succeeded(())
            }
            Err(err) => {
                tracing::warn!(operation = "register", error = %err, "registration failed");
                RequestStatus::Failed(err)
            }
        };
        self.register.replace(status.clone());
        status
    }

    /// Drop the credential and every cached read, then go to login.
    pub fn logout(&self) {
        self.context.reset();
        tracing::info!(operation = "logout", "session cleared");
        self.context.navigate(AppRoute::Login, NavigationMode::Push);
    }

    /// Read the signed-in user through the session cache.
    ///
    /// Without a credential the read fails locally and never reaches the
    /// network.
    /// A failure that raced a login is retried once against the new credential.
    pub async fn current_user(&self) -> QuerySnapshot<User> {
        let snapshot = self.read_session().await;
        if snapshot.status == QueryStatus::Failed && snapshot.stale {
            tracing::debug!("session read failed across an invalidation; refetching");
            return self.read_session().await;
        }
        snapshot
    }

    async fn read_session(&self) -> QuerySnapshot<User> {
        let context = &self.context;
        context
            .cache()
            .read(SESSION_KEY, || async move {
                if !context.tokens().has_credential() {
                    return Err(RequestError::MissingCredential);
                }
                context
                    .api()
                    .get::<User>(CURRENT_USER_PATH)
                    .await
                    .map_err(RequestError::from)
            })
            .await
    }

    /// Pending if either operation is in flight; login's failure wins.
    #[must_use]
    pub fn status(&self) -> CombinedStatus {
        CombinedStatus::of(&*self.login.borrow(), &*self.register.borrow())
    }

    /// Current login status.
    #[must_use]
    pub fn login_status(&self) -> RequestStatus<()> {
        self.login.borrow().clone()
    }

    /// Current registration status.
    #[must_use]
    pub fn register_status(&self) -> RequestStatus<()> {
        self.register.borrow().clone()
    }

    /// Return the login status to idle.
    pub fn reset_login(&self) {
        self.login.borrow_mut().reset();
    }

    /// Return the registration status to idle.
    pub fn reset_register(&self) {
        self.register.borrow_mut().reset();
    }

    async fn request_token(&self, form: &LoginForm) -> Result<AccessToken, RequestError> {
        let token: AccessToken = self.context.auth_api().post(LOGIN_PATH, form).await?;
        if token.access_token.trim().is_empty() {
            return Err(ApiError::Decode {
                detail: "login response carried an empty access token".to_string(),
            }
            .into());
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::harness;
    use crate::core::transport::RequestBody;
    use serde_json::json;

    fn login_form() -> LoginForm {
        LoginForm {
            username: "alice".to_string(),
            password: "secret".to_string(),
        }
    }

    fn register_form() -> RegisterForm {
        RegisterForm {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    fn alice() -> serde_json::Value {
        json!({"id": 1, "username": "alice", "email": "alice@example.com"})
    }

    #[tokio::test]
    async fn login_success_stores_token_invalidates_session_and_navigates() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());
        harness.context.tokens().set("old");
        harness.transport.respond_ok(alice());
        auth.current_user().await;

        harness
            .transport
            .respond_ok(json!({"access_token": "fresh", "token_type": "bearer"}));
        let status = auth.login(&login_form()).await;

        assert_eq!(status, RequestStatus::Succeeded(()));
        assert_eq!(harness.context.tokens().get().as_deref(), Some("fresh"));
        let session: QuerySnapshot<User> = harness.context.cache().snapshot(SESSION_KEY);
        assert!(session.stale);
        assert_eq!(harness.navigator.current(), Some(AppRoute::Dashboard));

        let sent = harness.transport.requests();
        assert_eq!(sent[1].path, LOGIN_PATH);
        assert!(matches!(sent[1].body, RequestBody::Form(_)));
    }

    #[tokio::test]
    async fn login_failure_has_no_side_effects() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());
        harness
            .transport
            .respond_status(401, json!({"detail": "Incorrect username or password"}));

        let status = auth.login(&login_form()).await;

        let err = status.error().expect("login should fail");
        assert_eq!(
            err.display_message(LOGIN_FAILED_MESSAGE),
            "Incorrect username or password"
        );
        assert!(harness.context.tokens().get().is_none());
        assert!(harness.navigator.history().is_empty());
        assert!(harness.context.cache().is_empty());
        assert!(auth.status().is_error());
    }

    #[tokio::test]
    async fn login_rejects_a_blank_token() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());
        harness.transport.respond_ok(json!({"access_token": "  "}));

        let status = auth.login(&login_form()).await;

        assert!(matches!(
            status,
            RequestStatus::Failed(RequestError::Transport(ApiError::Decode { .. }))
        ));
        assert!(!harness.context.tokens().has_credential());
        assert!(harness.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn login_is_pending_while_in_flight() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());
        let gate = harness.transport.respond_gated();
        let form = login_form();

        let login = auth.login(&form);
        let observe = async {
            tokio::task::yield_now().await;
            assert!(auth.status().pending);
            assert!(auth.login_status().is_pending());
            gate.send(Ok(json!({"access_token": "tok"}).to_string())).ok();
        };
        let (status, ()) = tokio::join!(login, observe);

        assert!(status.is_succeeded());
        assert!(!auth.status().pending);
    }

    #[tokio::test]
    async fn register_success_navigates_to_login_without_authenticating() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());
        harness.transport.respond_ok(alice());

        let status = auth.register(&register_form()).await;

        assert!(status.is_succeeded());
        assert!(harness.context.tokens().get().is_none());
        assert_eq!(harness.navigator.current(), Some(AppRoute::Login));
        let sent = harness.transport.requests();
        assert_eq!(sent[0].path, REGISTER_PATH);
        assert_eq!(
            sent[0].body,
            RequestBody::Json(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "secret",
            }))
        );
    }

    #[tokio::test]
    async fn register_failure_surfaces_validation_messages() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());
        harness.transport.respond_status(
            422,
            json!({"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address"}]}),
        );

        let status = auth.register(&register_form()).await;

        assert_eq!(
            status.error().map(|err| err.display_message(REGISTER_FAILED_MESSAGE)),
            Some("value is not a valid email address".to_string())
        );
        assert!(harness.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn logout_clears_token_and_cache_then_navigates() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());
        harness.context.tokens().set("tok");
        harness.transport.respond_ok(alice());
        auth.current_user().await;

        auth.logout();

        assert!(harness.context.tokens().get().is_none());
        assert!(harness.context.cache().is_empty());
        assert_eq!(harness.navigator.current(), Some(AppRoute::Login));
    }

    #[tokio::test]
    async fn combined_status_prefers_the_login_failure() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());
        harness
            .transport
            .respond_status(400, json!({"detail": "Username already registered"}));
        harness
            .transport
            .respond_status(401, json!({"detail": "Incorrect username or password"}));

        auth.register(&register_form()).await;
        auth.login(&login_form()).await;

        let combined = auth.status();
        assert_eq!(
            combined
                .error
                .map(|err| err.display_message(LOGIN_FAILED_MESSAGE)),
            Some("Incorrect username or password".to_string())
        );

        auth.reset_login();
        assert_eq!(
            auth.status()
                .error
                .map(|err| err.display_message(REGISTER_FAILED_MESSAGE)),
            Some("Username already registered".to_string())
        );
        auth.reset_register();
        assert_eq!(auth.status(), CombinedStatus::default());
    }

    #[tokio::test]
    async fn current_user_without_credential_never_reaches_the_network() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());

        let snapshot = auth.current_user().await;

        assert_eq!(snapshot.status, QueryStatus::Failed);
        assert_eq!(snapshot.error, Some(RequestError::MissingCredential));
        assert!(harness.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn current_user_refetches_when_a_login_lands_mid_read() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());
        harness.context.tokens().set("expired");
        let gate = harness.transport.respond_gated();
        harness.transport.respond_ok(alice());

        let read = auth.current_user();
        let login = async {
            tokio::task::yield_now().await;
            harness.context.tokens().set("fresh");
            harness.context.cache().invalidate(SESSION_KEY);
            gate.send(Err(ApiError::from_response(
                401,
                r#"{"detail": "Not authenticated"}"#,
            )))
            .ok();
        };
        let (snapshot, ()) = tokio::join!(read, login);

        assert_eq!(snapshot.status, QueryStatus::Succeeded);
        assert_eq!(snapshot.value.map(|user| user.username), Some("alice".to_string()));
        let sent = harness.transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].authorization().as_deref(), Some("Bearer fresh"));
    }

    #[tokio::test]
    async fn current_user_is_cached_until_login_invalidates_it() {
        let harness = harness();
        let auth = AuthOrchestrator::new(harness.context.clone());
        harness.context.tokens().set("tok");
        harness.transport.respond_ok(alice());

        let first = auth.current_user().await;
        let second = auth.current_user().await;
        assert_eq!(first.value.map(|user| user.username), Some("alice".to_string()));
        assert_eq!(second.status, QueryStatus::Succeeded);
        assert_eq!(harness.transport.requests().len(), 1);

        harness.transport.respond_ok(json!({"access_token": "tok-2"}));
        auth.login(&login_form()).await;
        harness
            .transport
            .respond_ok(json!({"id": 2, "username": "bob", "email": "bob@example.com"}));
        let refreshed = auth.current_user().await;

        assert_eq!(refreshed.value.map(|user| user.username), Some("bob".to_string()));
        let sent = harness.transport.requests();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].authorization().as_deref(), Some("Bearer tok-2"));
    }
}
