//! Application routing configuration.

use dioxus::prelude::*;
use dioxus::router::Navigator;

use crate::views::{
    AppShell, ContactSupport, Home, PageNotFound, Quote, SchedulePickup, SignIn, SignUp,
    TrackShipment,
};

// Every page sits inside the shell so the chat widget survives navigation.
#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(AppShell)]
        #[route("/")]
        Home {},

        // Auth routes
        #[route("/sign-in")]
        SignIn {},
        #[route("/sign-up")]
        SignUp {},

        // Targets of chat action buttons
        #[route("/track")]
        TrackShipment {},
        #[route("/quote")]
        Quote {},
        #[route("/pickup")]
        SchedulePickup {},
        #[route("/contact")]
        ContactSupport {},

        #[route("/:..segments")]
        PageNotFound { segments: Vec<String> },
}

/// Resolve an in-app path to a known page. Unknown paths give `None`.
pub fn route_for_path(path: &str) -> Option<Route> {
    match path.parse::<Route>() {
        Ok(Route::PageNotFound { .. }) | Err(_) => None,
        Ok(route) => Some(route),
    }
}

/// Navigate to `path` if it names a page. Returns whether navigation happened.
pub fn navigate_to_path(nav: Navigator, path: &str) -> bool {
    match route_for_path(path) {
        Some(route) => {
            nav.push(route);
            true
        }
        None => {
            crate::log_warn!("ignoring navigation to unknown path {}", path);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intents;

    #[test]
    fn every_intent_action_has_a_page() {
        for path in intents::action_paths() {
            assert!(route_for_path(path).is_some(), "no page for {path}");
        }
    }

    #[test]
    fn known_paths_resolve() {
        assert_eq!(route_for_path("/track"), Some(Route::TrackShipment {}));
        assert_eq!(route_for_path("/sign-in"), Some(Route::SignIn {}));
        assert_eq!(route_for_path("/"), Some(Route::Home {}));
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        assert_eq!(route_for_path("/definitely/not/here"), None);
    }
}
