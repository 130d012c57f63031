//! Route definition
//!
//! A [`Route`] is a path fragment relative to its parent, an optional shared
//! payload and ordered child routes. Trees are immutable once built; the
//! absolute paths the resolver matches against only exist after flattening
//! (see [`crate::nested`]).

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// ============================================================================
// Route
// ============================================================================

/// A node in a route tree
///
/// The payload is whatever the host renders for this route. It is held
/// behind an `Arc`, so flattening and resolution share it instead of
/// copying it.
///
/// # Example
///
/// ```
/// use route_resolver::Route;
///
/// let tree = Route::new("/dashboard", "layout")
///     .child(Route::new("/overview", "overview"))
///     .child(Route::new("/settings", "settings"));
///
/// assert_eq!(tree.get_children().len(), 2);
/// assert_eq!(tree.payload().map(|p| **p), Some("layout"));
/// ```
pub struct Route<T> {
    path: String,
    payload: Option<Arc<T>>,
    key: Option<String>,
    children: Vec<Route<T>>,
}

impl<T> Route<T> {
    /// Create a route rendering `payload` at `path`
    pub fn new(path: impl Into<String>, payload: T) -> Self {
        Self::with_shared(path, Arc::new(payload))
    }

    /// Create a route around an already shared payload
    ///
    /// Routes built from clones of the same `Arc` have the same identity.
    pub fn with_shared(path: impl Into<String>, payload: Arc<T>) -> Self {
        Self {
            path: path.into(),
            payload: Some(payload),
            key: None,
            children: Vec::new(),
        }
    }

    /// Create a route with no payload of its own
    ///
    /// It only prefixes the paths of its children and never matches itself.
    pub fn layout(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            payload: None,
            key: None,
            children: Vec::new(),
        }
    }

    /// Replace the child routes
    pub fn children(mut self, children: Vec<Route<T>>) -> Self {
        self.children = children;
        self
    }

    /// Append a child route
    pub fn child(mut self, child: Route<T>) -> Self {
        self.children.push(child);
        self
    }

    /// Give the payload an explicit identity
    ///
    /// By default a payload is identified by its allocation. A key lets
    /// freshly built but equivalent payloads count as the same route.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Path fragment, relative to the parent
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Shared payload, if any
    pub fn payload(&self) -> Option<&Arc<T>> {
        self.payload.as_ref()
    }

    /// Explicit identity key, if any
    pub fn identity_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Child routes in declaration order
    pub fn get_children(&self) -> &[Route<T>] {
        &self.children
    }
}

impl<T> Clone for Route<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            payload: self.payload.clone(),
            key: self.key.clone(),
            children: self.children.clone(),
        }
    }
}

impl<T> fmt::Debug for Route<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("has_payload", &self.payload.is_some())
            .field("key", &self.key)
            .field("children", &self.children)
            .finish()
    }
}

/// Build a route from a path, an optional payload and its children
///
/// # Example
///
/// ```
/// use route_resolver::make_route;
///
/// let tree = make_route("/a", Some("a"), vec![make_route("/b", Some("b"), vec![])]);
/// assert_eq!(tree.get_children()[0].path(), "/b");
/// ```
pub fn make_route<T>(path: impl Into<String>, payload: Option<T>, children: Vec<Route<T>>) -> Route<T> {
    let route = match payload {
        Some(payload) => Route::new(path, payload),
        None => Route::layout(path),
    };
    route.children(children)
}

// ============================================================================
// RouteSetId
// ============================================================================

/// Structural identity of a route set
///
/// Combines each route's path, its payload identity and, recursively, its
/// children. The router rebuilds its resolvers only when this changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteSetId(u64);

impl RouteSetId {
    /// Compute the identity of a sibling list
    pub fn of<T>(routes: &[Route<T>]) -> Self {
        let mut hasher = DefaultHasher::new();
        hash_routes(routes, &mut hasher);
        Self(hasher.finish())
    }

    /// Raw hash value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RouteSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

fn hash_routes<T, H: Hasher>(routes: &[Route<T>], state: &mut H) {
    routes.len().hash(state);
    for route in routes {
        route.path.hash(state);
        match (&route.key, &route.payload) {
            (Some(key), _) => {
                1u8.hash(state);
                key.hash(state);
            }
            (None, Some(payload)) => {
                2u8.hash(state);
                (Arc::as_ptr(payload) as *const () as usize).hash(state);
            }
            (None, None) => 0u8.hash(state),
        }
        hash_routes(&route.children, state);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let route = Route::new("/users", 1)
            .child(Route::new("/{id:int}", 2))
            .key("users");

        assert_eq!(route.path(), "/users");
        assert_eq!(route.identity_key(), Some("users"));
        assert_eq!(route.get_children().len(), 1);
        assert_eq!(route.get_children()[0].payload().map(|p| **p), Some(2));
    }

    #[test]
    fn test_layout_has_no_payload() {
        let route: Route<()> = Route::layout("/admin");
        assert!(route.payload().is_none());
    }

    #[test]
    fn test_make_route() {
        let tree = make_route("/a", None, vec![make_route("/b", Some('b'), vec![])]);
        assert!(tree.payload().is_none());
        assert_eq!(tree.get_children()[0].payload().map(|p| **p), Some('b'));
    }

    #[test]
    fn test_clone_keeps_identity() {
        let routes = vec![Route::new("/a", "a").child(Route::new("/b", "b"))];
        let cloned = routes.clone();
        assert_eq!(RouteSetId::of(&routes), RouteSetId::of(&cloned));
    }

    #[test]
    fn test_distinct_payloads_differ() {
        let a = vec![Route::new("/a", "a")];
        let b = vec![Route::new("/a", "a")];
        assert_ne!(RouteSetId::of(&a), RouteSetId::of(&b));
    }

    #[test]
    fn test_keys_override_payload_identity() {
        let a = vec![Route::new("/a", "a").key("home")];
        let b = vec![Route::new("/a", "a").key("home")];
        assert_eq!(RouteSetId::of(&a), RouteSetId::of(&b));
    }

    #[test]
    fn test_structure_changes_identity() {
        let shared = Arc::new("x");
        let flat = vec![
            Route::with_shared("/a", shared.clone()),
            Route::with_shared("/b", shared.clone()),
        ];
        let nested = vec![Route::with_shared("/a", shared.clone())
            .child(Route::with_shared("/b", shared.clone()))];
        let renamed = vec![
            Route::with_shared("/a", shared.clone()),
            Route::with_shared("/c", shared),
        ];

        let flat_id = RouteSetId::of(&flat);
        assert_ne!(flat_id, RouteSetId::of(&nested));
        assert_ne!(flat_id, RouteSetId::of(&renamed));
    }
}
