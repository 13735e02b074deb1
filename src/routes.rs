//! Console routes and role gating.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::session::Session;
use crate::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminPage {
    Dashboard,
    Agents,
    Users,
    Tickets,
    Calls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentPage {
    Dashboard,
    Tickets,
    Calls,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Unauthorized,
    Admin(AdminPage),
    Agent(AgentPage),
    NotFound,
}

impl Route {
    /// Resolve a path. Trailing slashes are ignored; anything unknown is `NotFound`.
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim().trim_end_matches('/');
        match trimmed {
            "" => Route::Home,
            "/login" => Route::Login,
            "/unauthorized" => Route::Unauthorized,
            "/admin" => Route::Admin(AdminPage::Dashboard),
            "/admin/agents" => Route::Admin(AdminPage::Agents),
            "/admin/users" => Route::Admin(AdminPage::Users),
            "/admin/tickets" => Route::Admin(AdminPage::Tickets),
            "/admin/calls" => Route::Admin(AdminPage::Calls),
            "/agent" => Route::Agent(AgentPage::Dashboard),
            "/agent/tickets" => Route::Agent(AgentPage::Tickets),
            "/agent/calls" => Route::Agent(AgentPage::Calls),
            "/agent/outbound" => Route::Agent(AgentPage::Outbound),
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Unauthorized => "/unauthorized",
            Route::Admin(AdminPage::Dashboard) => "/admin",
            Route::Admin(AdminPage::Agents) => "/admin/agents",
            Route::Admin(AdminPage::Users) => "/admin/users",
            Route::Admin(AdminPage::Tickets) => "/admin/tickets",
            Route::Admin(AdminPage::Calls) => "/admin/calls",
            Route::Agent(AgentPage::Dashboard) => "/agent",
            Route::Agent(AgentPage::Tickets) => "/agent/tickets",
            Route::Agent(AgentPage::Calls) => "/agent/calls",
            Route::Agent(AgentPage::Outbound) => "/agent/outbound",
            Route::NotFound => "/404",
        }
    }

    /// Role needed to open this route; `None` means public.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::Admin(_) => Some(Role::Admin),
            Route::Agent(_) => Some(Role::Agent),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(Route),
}

/// Home route for a role. Unknown roles have none.
pub fn home_for(role: &Role) -> Option<Route> {
    match role {
        Role::Admin => Some(Route::Admin(AdminPage::Dashboard)),
        Role::Agent => Some(Route::Agent(AgentPage::Dashboard)),
        Role::Other(_) => None,
    }
}

/// Decide whether `session` may open `route`.
///
/// Protected routes send signed-out users to `/login` and the wrong role to
/// `/unauthorized`. A signed-in admin or agent visiting `/login` goes home.
pub fn guard(session: &Session, route: Route) -> RouteDecision {
    let authenticated = session.is_authenticated();

    if route == Route::Login {
        return match session.role().and_then(home_for) {
            Some(home) if authenticated => RouteDecision::Redirect(home),
            _ => RouteDecision::Allow,
        };
    }

    let Some(required) = route.required_role() else {
        return RouteDecision::Allow;
    };

    if !authenticated {
        return RouteDecision::Redirect(Route::Login);
    }
    if session.role() != Some(&required) {
        return RouteDecision::Redirect(Route::Unauthorized);
    }
    RouteDecision::Allow
}

/// Sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub route: Route,
}

pub fn menu_for(role: &Role) -> Vec<MenuItem> {
    let item = |label, route| MenuItem { label, route };
    match role {
        Role::Admin => vec![
            item("Dashboard", Route::Admin(AdminPage::Dashboard)),
            item("Agents", Route::Admin(AdminPage::Agents)),
            item("Tickets", Route::Admin(AdminPage::Tickets)),
            item("Users", Route::Admin(AdminPage::Users)),
            item("Calls", Route::Admin(AdminPage::Calls)),
        ],
        Role::Agent => vec![
            item("Dashboard", Route::Agent(AgentPage::Dashboard)),
            item("Tickets", Route::Agent(AgentPage::Tickets)),
            item("Calls", Route::Agent(AgentPage::Calls)),
            item("Outbound", Route::Agent(AgentPage::Outbound)),
        ],
        Role::Other(_) => Vec::new(),
    }
}
