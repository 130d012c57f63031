//! Router scope and accessors
//!
//! Code rendered beneath a router receives a [`RouterScope`] and reads the
//! current params and search string through it. Nothing is ambient: a scope
//! is a value passed down the call chain, and the root of that chain starts
//! from [`RouterScope::root`].
//!
//! A scope also guards against nesting. Building a router from a scope that
//! already carries one fails with [`RouterError::DuplicateRouter`].

use crate::error::{Result, RouterError};
use crate::params::{QueryOptions, QueryParams, RouteParams};
use crate::{warn_log, Location};
use std::sync::Arc;

/// Snapshot of the active router as seen by its descendants
#[derive(Debug, Clone, PartialEq)]
pub struct RouteState {
    /// Location that produced the match
    pub location: Location,
    /// Params of the matched route
    pub params: RouteParams,
    /// Rendering identity of the matched route
    pub key: String,
}

/// Handle carried down the call chain beneath a router
///
/// # Example
///
/// ```
/// use route_resolver::{simple_router, Location, Route, RouterScope};
///
/// let root = RouterScope::root();
/// let mut router = simple_router()
///     .build(vec![Route::new("/users/{id:int}", "user")], Location::new("/users/7", "?tab=posts"), &root)
///     .unwrap();
/// router.resolve().unwrap();
///
/// let scope = router.scope().unwrap();
/// assert_eq!(scope.params().unwrap().get_int("id"), Some(7));
/// assert_eq!(scope.search_params().unwrap().get("tab"), Some(&"posts".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouterScope {
    state: Option<Arc<RouteState>>,
}

impl RouterScope {
    /// Scope with no router in it
    pub fn root() -> Self {
        Self::default()
    }

    pub(crate) fn active(state: RouteState) -> Self {
        Self {
            state: Some(Arc::new(state)),
        }
    }

    /// Whether a router is active in this scope
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Fail if a router is already active here
    pub(crate) fn ensure_vacant(&self) -> Result<()> {
        if self.is_active() {
            warn_log!("Refusing to build a router inside another router's scope");
            return Err(RouterError::DuplicateRouter);
        }
        Ok(())
    }

    /// Full state of the active router
    pub fn state(&self) -> Result<&RouteState> {
        self.state.as_deref().ok_or_else(|| {
            warn_log!("Router state requested outside of a router");
            RouterError::OutsideRouter
        })
    }

    /// Params of the currently matched route
    pub fn params(&self) -> Result<&RouteParams> {
        Ok(&self.state()?.params)
    }

    /// Current location
    pub fn location(&self) -> Result<&Location> {
        Ok(&self.state()?.location)
    }

    /// Current search string parsed with default options
    pub fn search_params(&self) -> Result<QueryParams> {
        self.search_params_with(&QueryOptions::default())
    }

    /// Current search string parsed with the given options
    pub fn search_params_with(&self, options: &QueryOptions) -> Result<QueryParams> {
        QueryParams::parse_with(&self.location()?.search, options)
    }
}

/// Params of the router active in `scope`
pub fn use_params(scope: &RouterScope) -> Result<&RouteParams> {
    scope.params()
}

/// Search params of the router active in `scope`
pub fn use_search_params(scope: &RouterScope) -> Result<QueryParams> {
    scope.search_params()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RouteState {
        let mut params = RouteParams::new();
        params.insert("id", 3_i64);
        RouteState {
            location: Location::new("/items/3", "?sort=asc&sort=desc"),
            params,
            key: "^/items/(?P<id>\\d+)$".to_string(),
        }
    }

    #[test]
    fn test_root_scope_has_no_router() {
        let scope = RouterScope::root();
        assert!(!scope.is_active());
        assert!(matches!(scope.params(), Err(RouterError::OutsideRouter)));
        assert!(matches!(use_search_params(&scope), Err(RouterError::OutsideRouter)));
        assert!(scope.ensure_vacant().is_ok());
    }

    #[test]
    fn test_active_scope_exposes_state() {
        let scope = RouterScope::active(state());

        assert_eq!(use_params(&scope).unwrap().get_int("id"), Some(3));
        assert_eq!(scope.location().unwrap().pathname, "/items/3");

        let search = scope.search_params().unwrap();
        assert_eq!(search.get_all("sort").unwrap().len(), 2);
    }

    #[test]
    fn test_active_scope_rejects_second_router() {
        let scope = RouterScope::active(state());
        assert!(matches!(scope.ensure_vacant(), Err(RouterError::DuplicateRouter)));
    }

    #[test]
    fn test_clones_share_state() {
        let scope = RouterScope::active(state());
        let child = scope.clone();
        assert_eq!(child.state().unwrap(), scope.state().unwrap());
    }
}
