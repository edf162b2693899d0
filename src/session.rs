//! Session token storage and route gating.
//!
//! A [`SessionStore`] is created when the application starts and handed to
//! whatever needs it; signing out clears it. The token is mirrored into a
//! cookie value so that route gating can work from cookie presence alone.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const SESSION_COOKIE: &str = "flowboard_session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    cookie: Option<Cookie>,
}

/// Shared handle to the current session. Clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a session from a cookie value left by a previous run.
    pub fn from_cookie(value: impl Into<String>) -> Self {
        let store = Self::new();
        store.sign_in(value);
        store
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        let token = token.into();
        let mut state = self.write();
        state.cookie = Some(Cookie {
            name: SESSION_COOKIE.to_string(),
            value: token.clone(),
        });
        state.token = Some(token);
    }

    pub fn sign_out(&self) {
        let mut state = self.write();
        state.token = None;
        state.cookie = None;
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn cookie(&self) -> Option<Cookie> {
        self.read().cookie.clone()
    }

    pub fn has_cookie(&self) -> bool {
        self.read().cookie.is_some()
    }

    // Both fields are replaced together, so a poisoned lock still holds a
    // consistent state.
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Decides whether a path may be shown for the current cookie state.
///
/// Public paths are open to anonymous visitors only; a signed-in visitor is
/// sent to the dashboard instead. Everything else requires the cookie.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    public_paths: Vec<&'static str>,
    login_path: &'static str,
    home_path: &'static str,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            public_paths: vec!["/", "/login", "/register"],
            login_path: "/login",
            home_path: "/dashboard",
        }
    }
}

impl RouteGuard {
    pub fn is_public(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let normalized = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        self.public_paths.contains(&normalized)
    }

    pub fn check(&self, path: &str, has_cookie: bool) -> RouteDecision {
        match (self.is_public(path), has_cookie) {
            (true, true) => RouteDecision::Redirect(self.home_path),
            (false, false) => RouteDecision::Redirect(self.login_path),
            _ => RouteDecision::Allow,
        }
    }

    pub fn check_session(&self, path: &str, session: &SessionStore) -> RouteDecision {
        self.check(path, session.has_cookie())
    }
}
