//! Access guard for protected views.
//!
//! A pure function of the session cache entry: it holds no state and never
//! fetches. A failed or empty session read redirects to login by replacing
//! the current history entry, so going back cannot bounce between the
//! protected page and the login page. A failure that raced an invalidation
//! is stale and stays pending until the refetch settles.

use lingo_api_models::User;

use crate::core::cache::{QuerySnapshot, QueryStatus, SESSION_KEY, SessionCache};
use crate::core::navigation::{AppRoute, NavigationMode, Navigator};

/// Render decision for a protected region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardState<T> {
    /// The session read has not settled; render a placeholder.
    Pending,
    /// The session read succeeded; render the protected content with it.
    Authenticated(T),
    /// The session read failed or produced nothing; redirect to login.
    Unauthenticated,
}

/// Navigation issued for an unauthenticated guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redirect {
    /// Target route.
    pub route: AppRoute,
    /// History handling.
    pub mode: NavigationMode,
}

impl<T> GuardState<T> {
    /// Derive the guard state from a session snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: QuerySnapshot<T>) -> Self {
        match snapshot.status {
            QueryStatus::Idle | QueryStatus::Fetching => Self::Pending,
            QueryStatus::Failed if snapshot.stale => Self::Pending,
            QueryStatus::Failed => Self::Unauthenticated,
            QueryStatus::Succeeded => snapshot
                .value
                .map_or(Self::Unauthenticated, Self::Authenticated),
        }
    }

    /// Navigation this state requires, if any.
    #[must_use]
    pub const fn redirect(&self) -> Option<Redirect> {
        match self {
            Self::Unauthenticated => Some(Redirect {
                route: AppRoute::Login,
                mode: NavigationMode::Replace,
            }),
            Self::Pending | Self::Authenticated(_) => None,
        }
    }
}

/// Gate over the session cache entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccessGuard;

impl AccessGuard {
    /// Evaluate the gate without side effects.
    #[must_use]
    pub fn evaluate(cache: &SessionCache) -> GuardState<User> {
        GuardState::from_snapshot(cache.snapshot::<User>(SESSION_KEY))
    }

    /// Evaluate the gate and perform the redirect it requires.
    pub fn enforce(cache: &SessionCache, navigator: &dyn Navigator) -> GuardState<User> {
        let state = Self::evaluate(cache);
        if let Some(redirect) = state.redirect() {
            tracing::info!(route = redirect.route.path(), "session unavailable; redirecting");
            navigator.navigate(redirect.route, redirect.mode);
        }
        state
    }
}
