// src/middleware/route_guard.rs
//! Navigation guard for the front end: given who is signed in and the path
//! being opened, decide whether to render it (and with or without the
//! navbar) or where to send the browser instead. This is a convenience for
//! the UI; access control lives in the services.

use serde::Serialize;

use crate::models::profile::Role;
use crate::models::session::Session;

pub const LOGIN_ROUTE: &str = "/auth/login";

const PROTECTED_PREFIXES: &[&str] = &["/user", "/admin"];
const ADMIN_PREFIX: &str = "/admin";
const AUTH_PREFIX: &str = "/auth";

const NAVBAR_HIDDEN: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/forgot-password",
    "/404",
    "/500",
    "/",
    "/admin",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unauthenticated,
    User,
    Admin,
}

impl GuardState {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session.map(Session::role) {
            None => GuardState::Unauthenticated,
            Some(Role::User) => GuardState::User,
            Some(Role::Admin) => GuardState::Admin,
        }
    }

    fn home(&self) -> Option<&'static str> {
        match self {
            GuardState::Unauthenticated => None,
            GuardState::User => Some(Role::User.home_route()),
            GuardState::Admin => Some(Role::Admin.home_route()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum GuardDecision {
    Allow { show_navbar: bool },
    Redirect { to: &'static str },
}

/// `/admin` covers `/admin` and `/admin/...` but not `/administrator`.
fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .map(|rest| rest.starts_with('/'))
            .unwrap_or(false)
}

/// Drop query/fragment and any trailing slash; the root stays `/`.
fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

pub fn evaluate(state: GuardState, path: &str) -> GuardDecision {
    let path = normalize(path);

    match state.home() {
        None => {
            if PROTECTED_PREFIXES.iter().any(|p| is_under(path, p)) {
                return GuardDecision::Redirect { to: LOGIN_ROUTE };
            }
        }
        Some(home) => {
            if is_under(path, AUTH_PREFIX) {
                return GuardDecision::Redirect { to: home };
            }
            if state == GuardState::User && is_under(path, ADMIN_PREFIX) {
                return GuardDecision::Redirect { to: home };
            }
        }
    }

    GuardDecision::Allow {
        show_navbar: !NAVBAR_HIDDEN.contains(&path),
    }
}
