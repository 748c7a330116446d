//! Navigation gatekeeping based on session token presence.
//!
//! Only presence is checked. Token validity is the auth provider's concern
//! and is enforced by the handlers that need an identity.

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "authToken";

/// Lifetime of the session cookie in seconds.
pub const SESSION_TTL_SECS: i64 = 86_400;

/// Routes open to anonymous visitors.
const PUBLIC_ROUTES: &[&str] = &["/", "/search", "/login", "/signup"];

/// Prefix of collection detail pages, which are public.
const COLLECTION_PREFIX: &str = "/collection/";

/// Path prefixes outside the navigation surface.
const UNGUARDED_PREFIXES: &[&str] = &["/api/", "/health/", "/ws/", "/docs", "/_"];

/// What to do with a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the route.
    Allow,
    /// Send the visitor to the login page.
    RedirectToLogin,
}

/// Decide whether `path` may render, given whether a session token is present.
///
/// # Examples
/// ```
/// use pinboard::domain::{RouteDecision, route_decision};
///
/// assert_eq!(route_decision("/personal", false), RouteDecision::RedirectToLogin);
/// assert_eq!(route_decision("/collection/abc", false), RouteDecision::Allow);
/// ```
pub fn route_decision(path: &str, has_token: bool) -> RouteDecision {
    if has_token || !is_guarded(path) {
        RouteDecision::Allow
    } else {
        RouteDecision::RedirectToLogin
    }
}

/// Whether `path` needs a session token.
pub fn is_guarded(path: &str) -> bool {
    let path = normalise(path);
    if UNGUARDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix) || path == prefix.trim_end_matches('/'))
    {
        return false;
    }
    // Static assets such as `/favicon.ico`.
    if path.rsplit('/').next().is_some_and(|last| last.contains('.')) {
        return false;
    }
    if PUBLIC_ROUTES.contains(&path) {
        return false;
    }
    !is_collection_detail(path)
}

fn is_collection_detail(path: &str) -> bool {
    path.strip_prefix(COLLECTION_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

fn normalise(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
