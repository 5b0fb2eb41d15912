//! Routing definitions for the Lingo UI.
use yew_router::prelude::*;

use crate::core::navigation::AppRoute;

#[derive(Clone, Routable, PartialEq, Eq, Debug)]
pub(crate) enum Route {
    #[at("/")]
    Root,
    #[at("/login")]
    Login,
    #[at("/register")]
    Register,
    #[at("/dashboard")]
    Dashboard,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl From<AppRoute> for Route {
    fn from(route: AppRoute) -> Self {
        match route {
            AppRoute::Login => Self::Login,
            AppRoute::Register => Self::Register,
            AppRoute::Dashboard => Self::Dashboard,
        }
    }
}
