//! Navigation targets and the navigator seam.
//!
//! The browser build adapts the yew-router navigator; everything else uses
//! [`HistoryNavigator`], an in-memory history stack.

use std::cell::RefCell;

/// Application entry points the core can navigate to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppRoute {
    /// Login form.
    Login,
    /// Registration form.
    Register,
    /// Protected area entry route.
    Dashboard,
}

impl AppRoute {
    /// Browser path for the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
        }
    }
}

/// How a navigation affects the history stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationMode {
    /// Append a new history entry.
    Push,
    /// Replace the current history entry.
    Replace,
}

/// Performs navigations requested by the core.
pub trait Navigator {
    /// Navigate to `route`.
    fn navigate(&self, route: AppRoute, mode: NavigationMode);
}

/// In-memory history stack.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    entries: RefCell<Vec<AppRoute>>,
}

impl HistoryNavigator {
    /// Route at the top of the stack.
    #[must_use]
    pub fn current(&self) -> Option<AppRoute> {
        self.entries.borrow().last().copied()
    }

    /// Full history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<AppRoute> {
        self.entries.borrow().clone()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: AppRoute, mode: NavigationMode) {
        let mut entries = self.entries.borrow_mut();
        if mode == NavigationMode::Replace {
            entries.pop();
        }
        entries.push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_swaps_the_top_entry() {
        let navigator = HistoryNavigator::default();
        navigator.navigate(AppRoute::Dashboard, NavigationMode::Push);
        navigator.navigate(AppRoute::Login, NavigationMode::Replace);
        assert_eq!(navigator.history(), vec![AppRoute::Login]);
    }

    #[test]
    fn push_appends_entries() {
        let navigator = HistoryNavigator::default();
        navigator.navigate(AppRoute::Login, NavigationMode::Push);
        navigator.navigate(AppRoute::Dashboard, NavigationMode::Push);
        assert_eq!(navigator.current(), Some(AppRoute::Dashboard));
        assert_eq!(navigator.history().len(), 2);
    }

    #[test]
    fn route_paths_are_stable() {
        assert_eq!(AppRoute::Login.path(), "/login");
        assert_eq!(AppRoute::Register.path(), "/register");
        assert_eq!(AppRoute::Dashboard.path(), "/dashboard");
    }
}
