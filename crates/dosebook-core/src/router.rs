//! Navigation capability consumed by the API client.
//!
//! The client only ever addresses the login view directly. Whatever renders
//! views implements `Navigator`; `HistoryRouter` is the in-process version
//! used by the CLI and tests.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Symbolic view names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Login",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can switch the displayed view.
///
/// Called synchronously from the response path; implementations must not
/// block on the navigation completing.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, route: Route);
}

/// Records the navigation history; the last entry is the current view.
#[derive(Debug)]
pub struct HistoryRouter {
    history: Mutex<Vec<Route>>,
}

impl HistoryRouter {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(vec![Route::Home]),
        }
    }

    pub fn current(&self) -> Route {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
            .unwrap_or(Route::Home)
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any navigation to `route` happened after construction
    pub fn visited(&self, route: Route) -> bool {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .skip(1)
            .any(|r| *r == route)
    }
}

impl Default for HistoryRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for HistoryRouter {
    fn navigate_to(&self, route: Route) {
        debug!(route = %route, path = route.path(), "Navigating");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_names() {
        assert_eq!(Route::Login.name(), "Login");
        assert_eq!(Route::Login.to_string(), "Login");
        assert_eq!(Route::Home.path(), "/");
    }

    #[test]
    fn test_history_router_tracks_current() {
        let router = HistoryRouter::new();
        assert_eq!(router.current(), Route::Home);
        assert!(!router.visited(Route::Home));

        router.navigate_to(Route::Login);
        assert_eq!(router.current(), Route::Login);
        assert!(router.visited(Route::Login));
        assert_eq!(router.history(), vec![Route::Home, Route::Login]);
    }
}
