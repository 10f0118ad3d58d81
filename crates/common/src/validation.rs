//! Validation of operator-supplied URIs and broker-supplied routes
//!
//! Session paths come from the command line and routes come from the broker; neither is
//! trusted to be well formed before it is used to build a URL.

use thiserror::Error;
use url::Url;

use crate::constants::{NEW_SESSION_SENTINEL, OPEN_PATH_PREFIX, SESSION_HASH_LEN};

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid format of open path: {0}")]
    MalformedOpenPath(String),

    #[error("Route is empty")]
    EmptyRoute,

    #[error("Route is neither an absolute URI nor an absolute path: {0}")]
    RouteNotAbsolute(String),

    #[error("Route contains control characters")]
    InvalidRouteCharacter,
}

/// A request-target: path plus optional query, no scheme or authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub path: String,
    pub query: Option<String>,
}

impl RequestTarget {
    /// Apply this target to `url`, replacing its path and query
    pub fn apply_to(&self, url: &mut Url) {
        url.set_path(&self.path);
        url.set_query(self.query.as_deref());
    }
}

impl std::fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{}?{}", self.path, query),
            None => f.write_str(&self.path),
        }
    }
}

/// Extract the candidate session hash from a broker path
///
/// - `/open/{hash}` yields `Some(hash)` (possibly empty)
/// - `/new` yields the `"new"` sentinel
/// - anything else yields `None`
///
/// # Examples
///
/// ```
/// use fhttp_common::validation::session_hash_from_path;
///
/// assert_eq!(session_hash_from_path("/open/AbCdEfGhIj").unwrap(), Some("AbCdEfGhIj"));
/// assert_eq!(session_hash_from_path("/new").unwrap(), Some("new"));
/// assert_eq!(session_hash_from_path("/").unwrap(), None);
/// assert!(session_hash_from_path("/open/a/b").is_err());
/// ```
pub fn session_hash_from_path(path: &str) -> Result<Option<&str>, ValidationError> {
    if path.starts_with(OPEN_PATH_PREFIX) {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != 3 {
            return Err(ValidationError::MalformedOpenPath(path.to_string()));
        }
        return Ok(Some(parts[2]));
    }

    if path.trim_start_matches('/') == NEW_SESSION_SENTINEL {
        return Ok(Some(NEW_SESSION_SENTINEL));
    }

    Ok(None)
}

/// Whether a candidate hash is unusable and a bootstrap exchange is required
pub fn needs_new_session(hash: Option<&str>) -> bool {
    match hash {
        None => true,
        Some(hash) => hash == NEW_SESSION_SENTINEL || hash.chars().count() != SESSION_HASH_LEN,
    }
}

/// Validate a broker-supplied route as a request-target
///
/// Accepts an absolute path (`/api/users?limit=10`) or an absolute URI, whose scheme and
/// authority are discarded.
pub fn validate_route(route: &str) -> Result<RequestTarget, ValidationError> {
    if route.is_empty() {
        return Err(ValidationError::EmptyRoute);
    }

    if route.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidRouteCharacter);
    }

    if route.starts_with('/') {
        let (path, query) = match route.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (route, None),
        };
        return Ok(RequestTarget {
            path: path.to_string(),
            query,
        });
    }

    match Url::parse(route) {
        Ok(url) if !url.cannot_be_a_base() => Ok(request_target(&url)),
        _ => Err(ValidationError::RouteNotAbsolute(
            route.chars().take(50).collect::<String>(), // Limit error message
        )),
    }
}

/// Reduce a URL to its request-target (path + query)
pub fn request_target(url: &Url) -> RequestTarget {
    RequestTarget {
        path: url.path().to_string(),
        query: url.query().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_hash_from_open_path() {
        assert_eq!(
            session_hash_from_path("/open/AbCdEfGhIj").unwrap(),
            Some("AbCdEfGhIj")
        );
        assert_eq!(session_hash_from_path("/open/short").unwrap(), Some("short"));
        assert_eq!(session_hash_from_path("/open/").unwrap(), Some(""));
    }

    #[test]
    fn test_session_hash_malformed_open_path() {
        assert!(matches!(
            session_hash_from_path("/open/AbCdEfGhIj/extra"),
            Err(ValidationError::MalformedOpenPath(_))
        ));
        assert!(session_hash_from_path("/open/a/b/c").is_err());
    }

    #[test]
    fn test_session_hash_sentinel_and_other_paths() {
        assert_eq!(session_hash_from_path("/new").unwrap(), Some("new"));
        assert_eq!(session_hash_from_path("new").unwrap(), Some("new"));
        assert_eq!(session_hash_from_path("/").unwrap(), None);
        assert_eq!(session_hash_from_path("").unwrap(), None);
        assert_eq!(session_hash_from_path("/opened/x").unwrap(), None);
    }

    #[test]
    fn test_needs_new_session() {
        assert!(needs_new_session(None));
        assert!(needs_new_session(Some("new")));
        assert!(needs_new_session(Some("")));
        assert!(needs_new_session(Some("123456789")));
        assert!(needs_new_session(Some("12345678901")));
        assert!(!needs_new_session(Some("AbCdEfGhIj")));
    }

    #[test]
    fn test_validate_route_absolute_path() {
        let target = validate_route("/api/test").unwrap();
        assert_eq!(target.path, "/api/test");
        assert_eq!(target.query, None);

        let target = validate_route("/search?q=rust&limit=10").unwrap();
        assert_eq!(target.path, "/search");
        assert_eq!(target.query.as_deref(), Some("q=rust&limit=10"));
        assert_eq!(target.to_string(), "/search?q=rust&limit=10");
    }

    #[test]
    fn test_validate_route_absolute_uri() {
        let target = validate_route("https://fhttp.dev/hooks/github?x=1").unwrap();
        assert_eq!(target.path, "/hooks/github");
        assert_eq!(target.query.as_deref(), Some("x=1"));
    }

    #[test]
    fn test_validate_route_rejects() {
        assert!(matches!(validate_route(""), Err(ValidationError::EmptyRoute)));
        assert!(matches!(
            validate_route("api/test"),
            Err(ValidationError::RouteNotAbsolute(_))
        ));
        assert!(matches!(
            validate_route("/api\n/test"),
            Err(ValidationError::InvalidRouteCharacter)
        ));
        assert!(validate_route("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_apply_to_replaces_path_and_query_only() {
        let base = Url::parse("http://127.0.0.1:8080/ignored?old=1").unwrap();
        let mut scoped = base.clone();
        validate_route("/api/test?new=2").unwrap().apply_to(&mut scoped);

        assert_eq!(scoped.as_str(), "http://127.0.0.1:8080/api/test?new=2");
        assert_eq!(base.as_str(), "http://127.0.0.1:8080/ignored?old=1");
    }

    #[test]
    fn test_request_target() {
        let url = Url::parse("https://fhttp.dev/open/XyZ1234567?token=a#frag").unwrap();
        let target = request_target(&url);
        assert_eq!(target.to_string(), "/open/XyZ1234567?token=a");
    }
}
