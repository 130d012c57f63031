//! Router state management
//!
//! A [`Router`] owns the current [`Location`] and the compiled resolvers for
//! its route set. It recompiles only when the route set's structural
//! identity changes and re-matches only when the pathname changes.

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, ResolutionCache};
use crate::context::{RouteState, RouterScope};
use crate::error::Result;
use crate::resolver::{build_resolvers, resolve, CompiledRoute, Resolution, Resolver, RouteCompiler};
use crate::route::{Route, RouteSetId};
use crate::{debug_log, Location, RouteChangeEvent};
use std::fmt;
#[cfg(feature = "cache")]
use std::num::NonZeroUsize;

// ============================================================================
// RouterConfig
// ============================================================================

/// Router configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Pathnames whose outcome is memoised per route set; `0` disables the memo
    ///
    /// Only used with the `cache` feature.
    pub cache_capacity: usize,
}

impl RouterConfig {
    /// Set the memo capacity
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { cache_capacity: 128 }
    }
}

// ============================================================================
// Router
// ============================================================================

/// A router instance: route set, location and the match between them
///
/// # Example
///
/// ```
/// use route_resolver::{simple_router, Location, Route, RouterScope};
///
/// let routes = vec![
///     Route::new("/", "home"),
///     Route::new("/user/{id:int}", "user"),
/// ];
/// let mut router = simple_router()
///     .build(routes, Location::new("/", ""), &RouterScope::root())
///     .unwrap();
///
/// assert_eq!(router.resolve().unwrap().map(|r| *r.payload), Some("home"));
///
/// router.navigate("/user/42").unwrap();
/// let current = router.current().unwrap();
/// assert_eq!(current.params.get_int("id"), Some(42));
/// ```
pub struct Router<T, C = Resolver> {
    compiler: C,
    routes: Vec<Route<T>>,
    routes_id: RouteSetId,
    /// Resolvers and the route set they were built for; empty until first resolve
    resolvers: Option<(RouteSetId, Vec<CompiledRoute<T>>)>,
    location: Location,
    current: Option<Resolution<T>>,
    /// Route set and pathname `current` was computed for
    resolved_for: Option<(RouteSetId, String)>,
    #[cfg(feature = "cache")]
    cache: Option<ResolutionCache<T>>,
}

impl<T, C: RouteCompiler> Router<T, C> {
    /// Create a router with the default configuration
    ///
    /// Fails with [`RouterError::DuplicateRouter`](crate::RouterError::DuplicateRouter)
    /// if `parent` already carries a router.
    pub fn new(compiler: C, routes: Vec<Route<T>>, location: Location, parent: &RouterScope) -> Result<Self> {
        Self::with_config(compiler, routes, location, parent, &RouterConfig::default())
    }

    /// Create a router
    pub fn with_config(
        compiler: C,
        routes: Vec<Route<T>>,
        location: Location,
        parent: &RouterScope,
        config: &RouterConfig,
    ) -> Result<Self> {
        parent.ensure_vacant()?;

        #[cfg(not(feature = "cache"))]
        let _ = config;

        Ok(Self {
            compiler,
            routes_id: RouteSetId::of(&routes),
            routes,
            resolvers: None,
            location,
            current: None,
            resolved_for: None,
            #[cfg(feature = "cache")]
            cache: NonZeroUsize::new(config.cache_capacity).map(ResolutionCache::with_capacity),
        })
    }

    /// Current location
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Route tree this router resolves against
    pub fn routes(&self) -> &[Route<T>] {
        &self.routes
    }

    /// Structural identity of the current route set
    pub fn route_set_id(&self) -> RouteSetId {
        self.routes_id
    }

    /// Compiled resolvers, if they have been built for the current route set
    pub fn resolvers(&self) -> Option<&[CompiledRoute<T>]> {
        match &self.resolvers {
            Some((id, resolvers)) if *id == self.routes_id => Some(resolvers),
            _ => None,
        }
    }

    /// Last computed outcome, without resolving
    pub fn current(&self) -> Option<&Resolution<T>> {
        self.current.as_ref()
    }

    /// Replace the route tree and re-resolve the current location
    ///
    /// Resolvers and the last outcome are discarded only if the new tree's
    /// identity differs. If the rebuild then fails, nothing stays matched.
    pub fn set_routes(&mut self, routes: Vec<Route<T>>) -> Result<Option<&Resolution<T>>> {
        let id = RouteSetId::of(&routes);
        self.routes = routes;

        if id != self.routes_id {
            debug_log!("Route set changed: {} -> {}", self.routes_id, id);
            self.routes_id = id;
            self.resolvers = None;
            self.current = None;
            self.resolved_for = None;
            self.invalidate_cache();
        }

        self.resolve()
    }

    /// Move to a new location and resolve it
    ///
    /// The location is recorded even when nothing matches; the event then
    /// reports no matched key.
    pub fn set_location(&mut self, location: Location) -> Result<RouteChangeEvent> {
        let from = std::mem::replace(&mut self.location, location);
        let matched = self.resolve()?.map(|r| r.key.clone());

        Ok(RouteChangeEvent {
            from,
            to: self.location.clone(),
            matched,
        })
    }

    /// Navigate to a link target such as `/search?q=rust`
    pub fn navigate(&mut self, to: &str) -> Result<RouteChangeEvent> {
        self.set_location(Location::parse(to))
    }

    /// Resolve the current location
    ///
    /// Builds resolvers on first use or after a route set change. Repeated
    /// calls for the same route set and pathname return the stored outcome.
    pub fn resolve(&mut self) -> Result<Option<&Resolution<T>>> {
        let fresh = matches!(
            &self.resolved_for,
            Some((id, pathname)) if *id == self.routes_id && *pathname == self.location.pathname
        );

        if !fresh {
            self.ensure_resolvers()?;
            let pathname = self.location.pathname.clone();
            self.current = self.lookup(&pathname);
            self.resolved_for = Some((self.routes_id, pathname));
        }

        Ok(self.current.as_ref())
    }

    /// Scope for code rendered beneath the current match
    ///
    /// `None` when nothing matched, since nothing renders beneath the router then.
    pub fn scope(&self) -> Option<RouterScope> {
        self.current.as_ref().map(|resolution| {
            RouterScope::active(RouteState {
                location: self.location.clone(),
                params: resolution.params.clone(),
                key: resolution.key.clone(),
            })
        })
    }

    /// Resolution memo statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> Option<&CacheStats> {
        self.cache.as_ref().map(ResolutionCache::stats)
    }

    fn ensure_resolvers(&mut self) -> Result<()> {
        if self.resolvers().is_some() {
            return Ok(());
        }

        let built = build_resolvers(&self.routes, &self.compiler)?;
        debug_log!(
            "Built {} resolvers for route set {}",
            built.len(),
            self.routes_id
        );
        self.resolvers = Some((self.routes_id, built));
        Ok(())
    }

    fn lookup(&mut self, pathname: &str) -> Option<Resolution<T>> {
        if let Some(outcome) = self.cached(pathname) {
            return outcome;
        }

        let outcome = self.resolvers().and_then(|resolvers| resolve(resolvers, pathname));
        self.remember(pathname, outcome.clone());
        outcome
    }

    #[cfg(feature = "cache")]
    #[allow(clippy::option_option)]
    fn cached(&mut self, pathname: &str) -> Option<Option<Resolution<T>>> {
        self.cache.as_mut()?.get(pathname)
    }

    #[cfg(not(feature = "cache"))]
    #[allow(clippy::option_option)]
    fn cached(&mut self, _pathname: &str) -> Option<Option<Resolution<T>>> {
        None
    }

    #[cfg(feature = "cache")]
    fn remember(&mut self, pathname: &str, outcome: Option<Resolution<T>>) {
        if let Some(cache) = self.cache.as_mut() {
            cache.insert(pathname.to_string(), outcome);
        }
    }

    #[cfg(not(feature = "cache"))]
    fn remember(&mut self, _pathname: &str, _outcome: Option<Resolution<T>>) {}

    #[cfg(feature = "cache")]
    fn invalidate_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    #[cfg(not(feature = "cache"))]
    fn invalidate_cache(&mut self) {}
}

impl<T, C> fmt::Debug for Router<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("location", &self.location)
            .field("routes_id", &self.routes_id)
            .field("compiled", &self.resolvers.as_ref().map(|(_, r)| r.len()))
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RouterFactory
// ============================================================================

/// Builds routers that share one compiler strategy
#[derive(Debug, Clone)]
pub struct RouterFactory<C> {
    compiler: C,
    config: RouterConfig,
}

impl<C: RouteCompiler + Clone> RouterFactory<C> {
    /// Use this configuration for every router built from now on
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// The compiler strategy
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Build a router instance for a route tree
    pub fn build<T>(&self, routes: Vec<Route<T>>, location: Location, parent: &RouterScope) -> Result<Router<T, C>> {
        Router::with_config(self.compiler.clone(), routes, location, parent, &self.config)
    }
}

/// Turn a compiler strategy into a router factory
pub fn create_router<C: RouteCompiler + Clone>(compiler: C) -> RouterFactory<C> {
    RouterFactory {
        compiler,
        config: RouterConfig::default(),
    }
}

/// Router factory over the built-in resolver
pub fn simple_router() -> RouterFactory<Resolver> {
    create_router(Resolver::new())
}

// ============================================================================
// Tests
// ============================================================================
