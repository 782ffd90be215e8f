//! Screen routes, the private-route guard, and the navigator that the HTTP
//! adapter uses to force a return to the login screen.

use std::fmt;

use shared::domain::{ContentId, ModuleId};
use tokio::sync::watch;
use tracing::debug;

use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    Modules,
    ModuleDetail(ModuleId),
    ContentDetail(ContentId),
    Participants,
    Instructors,
    Chat,
    Schedule,
    Profile,
    Settings,
}

impl Route {
    pub fn is_public(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    pub fn path(self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Modules => "/modules".to_string(),
            Route::ModuleDetail(id) => format!("/modules/{id}"),
            Route::ContentDetail(id) => format!("/contents/{id}"),
            Route::Participants => "/peserta".to_string(),
            Route::Instructors => "/pemateri".to_string(),
            Route::Chat => "/chat".to_string(),
            Route::Schedule => "/kalender".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Settings => "/settings".to_string(),
        }
    }

    /// Parses an app path such as `/modules/7`. Unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let route = match segments.as_slice() {
            [""] => Route::Root,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["modules"] => Route::Modules,
            ["modules", id] => Route::ModuleDetail(ModuleId(id.parse().ok()?)),
            ["contents", id] => Route::ContentDetail(ContentId(id.parse().ok()?)),
            ["peserta"] => Route::Participants,
            ["pemateri"] => Route::Instructors,
            ["chat"] => Route::Chat,
            ["kalender"] => Route::Schedule,
            ["profile"] => Route::Profile,
            ["settings"] => Route::Settings,
            _ => return None,
        };
        Some(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Publishes the current route. Cloning shares the same channel.
#[derive(Clone)]
pub struct Navigator {
    tx: watch::Sender<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> Route {
        *self.tx.borrow()
    }

    pub fn push(&self, route: Route) {
        debug!(route = %route, "navigate");
        self.tx.send_replace(route);
    }

    /// Replaces the current route, used for forced redirects.
    pub fn redirect(&self, route: Route) {
        debug!(route = %route, "redirect");
        self.tx.send_replace(route);
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.tx.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Root)
    }
}

pub struct RouteGuard;

impl RouteGuard {
    /// Where a request for `route` actually lands given the session state.
    pub async fn resolve(route: Route, session: &SessionStore) -> Route {
        let authenticated = session.is_authenticated().await;
        match route {
            Route::Root if authenticated => Route::Dashboard,
            Route::Root => Route::Login,
            route if route.is_public() || authenticated => route,
            _ => Route::Login,
        }
    }

    /// Resolves and navigates in one step; returns the landed route.
    pub async fn navigate(route: Route, session: &SessionStore, navigator: &Navigator) -> Route {
        let landed = Self::resolve(route, session).await;
        if landed == route {
            navigator.push(landed);
        } else {
            navigator.redirect(landed);
        }
        landed
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
