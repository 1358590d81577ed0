//! Client-side route gating
//!
//! Mirrors the server-side role guard purely for UX: an unauthenticated
//! session routes to the login surface, an authenticated but
//! under-privileged one routes to the default landing surface (the actor
//! is still logged in, just under-privileged). Never a security boundary;
//! the server guard is authoritative.

use std::sync::Arc;

use crate::domain::user::Role;

use super::session::SessionStore;

/// Outcome of a route access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Render the route
    Granted,
    /// Not authenticated: route to the login surface
    RedirectToLogin,
    /// Authenticated but under-privileged: route to the landing surface
    RedirectToHome,
}

/// Route guard over an explicit session store
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    /// Create a guard around the session store
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Check access to a route. `required` of `None` means any
    /// authenticated user.
    pub async fn check(&self, required: Option<Role>) -> RouteAccess {
        let snapshot = self.session.snapshot().await;

        if !snapshot.authenticated {
            return RouteAccess::RedirectToLogin;
        }

        let Some(required) = required else {
            return RouteAccess::Granted;
        };

        let current = snapshot.user.map(|u| u.role).unwrap_or_default();

        if current.grants(required) {
            RouteAccess::Granted
        } else {
            RouteAccess::RedirectToHome
        }
    }
}
