//! Nested route flattening
//!
//! Turns a route tree into an ordered list of absolute templates. The order
//! *is* the matching precedence: descendants come before their ancestor at
//! every level, and siblings keep their declaration order. A parent's own
//! (often broader) template therefore never shadows a child's.

use crate::route::Route;
use std::sync::Arc;

/// A route with its absolute template
///
/// The payload is shared with the source tree, only the path is new.
#[derive(Debug)]
pub struct FlatRoute<T> {
    /// Concatenation of every ancestor's path and the route's own
    pub path: String,
    /// The route's payload
    pub payload: Arc<T>,
}

impl<T> Clone for FlatRoute<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            payload: Arc::clone(&self.payload),
        }
    }
}

/// Flatten sibling routes, children first
///
/// Paths are joined by plain concatenation; no separator is inserted and no
/// normalisation happens. Routes without a payload only contribute their
/// prefix.
///
/// # Example
///
/// ```
/// use route_resolver::{flatten, Route};
///
/// let routes = vec![Route::new("/a", "a").child(Route::new("/b", "b"))];
/// let paths: Vec<_> = flatten(&routes).into_iter().map(|r| r.path).collect();
///
/// assert_eq!(paths, vec!["/a/b", "/a"]);
/// ```
pub fn flatten<T>(routes: &[Route<T>]) -> Vec<FlatRoute<T>> {
    let mut out = Vec::new();
    flatten_into(routes, "", &mut out);
    out
}

fn flatten_into<T>(routes: &[Route<T>], prefix: &str, out: &mut Vec<FlatRoute<T>>) {
    for route in routes {
        let path = format!("{}{}", prefix, route.path());
        flatten_into(route.get_children(), &path, out);
        if let Some(payload) = route.payload() {
            out.push(FlatRoute {
                path,
                payload: Arc::clone(payload),
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn paths<T>(routes: &[Route<T>]) -> Vec<String> {
        flatten(routes).into_iter().map(|r| r.path).collect()
    }

    #[test]
    fn test_siblings_keep_order() {
        let routes = vec![Route::new("/a", 1), Route::new("/b", 2), Route::new("/c", 3)];
        assert_eq!(paths(&routes), vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_descendants_before_ancestors() {
        let routes = vec![
            Route::new("/a", 1)
                .child(Route::new("/x", 2).child(Route::new("/deep", 3)))
                .child(Route::new("/y", 4)),
            Route::new("/b", 5),
        ];

        assert_eq!(
            paths(&routes),
            vec!["/a/x/deep", "/a/x", "/a/y", "/a", "/b"]
        );
    }

    #[test]
    fn test_payload_is_shared() {
        let routes = vec![Route::new("/a", String::from("page")).child(Route::new("/b", String::from("child")))];
        let flat = flatten(&routes);

        assert!(Arc::ptr_eq(&flat[1].payload, routes[0].payload().unwrap()));
        assert!(Arc::ptr_eq(
            &flat[0].payload,
            routes[0].get_children()[0].payload().unwrap()
        ));
    }

    #[test]
    fn test_layout_contributes_prefix_only() {
        let routes = vec![
            Route::layout("/admin").child(Route::new("/users", 1)),
            Route::layout("/empty"),
        ];
        assert_eq!(paths(&routes), vec!["/admin/users"]);
    }

    #[test]
    fn test_plain_concatenation() {
        let routes = vec![Route::new("/first/{first}", 1).child(Route::new("/second/{second}", 2))];
        assert_eq!(
            paths(&routes),
            vec!["/first/{first}/second/{second}", "/first/{first}"]
        );
    }

    #[test]
    fn test_source_tree_untouched() {
        let routes = vec![Route::new("/a", 1).child(Route::new("/b", 2))];
        let _ = flatten(&routes);
        assert_eq!(routes[0].get_children()[0].path(), "/b");
    }
}
