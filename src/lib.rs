//! # Route Resolver
//!
//! A declarative path-routing engine. Give it a tree of routes (a path
//! template, a payload and child routes each) and a location; it tells you
//! which payload to render and with which typed parameters.
//!
//! - **Typed templates** - `{id:int}`, `{slug:slug}`, `{rest:path}` and custom converters
//! - **Tree precedence** - children are always tried before their parent, siblings in order
//! - **Compile once** - resolvers are rebuilt only when the route tree's identity changes
//! - **Pluggable compilers** - custom token syntax, converter sets or whole strategies
//! - **Explicit scoping** - params and search accessors read from a scope value, never ambient state
//!
//! # Quick Start
//!
//! ```
//! use route_resolver::*;
//!
//! let routes = vec![
//!     Route::new("/", "home"),
//!     Route::new("/users", "user list")
//!         .child(Route::new("/{id:int}", "user detail")),
//!     Route::new("/{rest:path}", "not found"),
//! ];
//!
//! let mut router = simple_router()
//!     .build(routes, Location::parse("/users/42"), &RouterScope::root())
//!     .unwrap();
//!
//! let hit = router.resolve().unwrap().unwrap();
//! assert_eq!(*hit.payload, "user detail");
//! assert_eq!(hit.params.get_int("id"), Some(42));
//! ```
//!
//! # Custom Converters
//!
//! ```
//! use route_resolver::*;
//!
//! let registry = ConverterRegistry::new()
//!     .with("year", ConversionEntry::new(r"\d{4}", |s| s.parse().ok().map(ParamValue::Int)))
//!     .unwrap();
//! let factory = create_router(create_resolver(Some(registry), None));
//!
//! let mut router = factory
//!     .build(vec![Route::new("/archive/{y:year}", "archive")], Location::parse("/archive/2024"), &RouterScope::root())
//!     .unwrap();
//! assert_eq!(router.resolve().unwrap().unwrap().params.get_int("y"), Some(2024));
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU memo of resolution outcomes per pathname

#![doc(html_root_url = "https://docs.rs/route-resolver/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Core routing modules
pub mod converters;
pub mod matcher;
pub mod nested;
pub mod resolver;
pub mod route;
pub mod state;

// Error handling
pub mod error;

// Other modules
pub mod context;
pub mod params;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, ResolutionCache};
pub use context::{use_params, use_search_params, RouteState, RouterScope};
pub use converters::{ConversionEntry, ConvertFn, ConverterRegistry, DEFAULT_TAG};
pub use error::{Result, RouterError};
pub use matcher::{compile, CompiledPattern, ParamSyntax, DEFAULT_PARAM_PATTERN};
pub use nested::{flatten, FlatRoute};
pub use params::{ParamValue, QueryOptions, QueryParams, RouteParams};
pub use resolver::{
    build_resolvers, create_resolver, resolve, resolve_all, resolve_with, CompiledRoute,
    MatchMode, Resolution, Resolver, RouteCompiler,
};
pub use route::{make_route, Route, RouteSetId};
pub use state::{create_router, simple_router, Router, RouterConfig, RouterFactory};

use std::fmt;

/// Where the host currently is.
///
/// Only `pathname` takes part in matching. `search` keeps its leading `?`
/// and is exposed to code beneath the router for query parsing.
///
/// # Example
///
/// ```
/// use route_resolver::Location;
///
/// let location = Location::parse("/search?q=rust&page=2");
///
/// assert_eq!(location.pathname, "/search");
/// assert_eq!(location.search, "?q=rust&page=2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Path part, matched against routes
    pub pathname: String,
    /// Query part including the leading `?`, or empty
    pub search: String,
}

impl Location {
    /// Create a location from its parts
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: search.into(),
        }
    }

    /// Split a link target at its first `?`
    pub fn parse(to: &str) -> Self {
        match to.find('?') {
            Some(pos) => Self::new(&to[..pos], &to[pos..]),
            None => Self::new(to, ""),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/", "")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pathname, self.search)
    }
}

/// Event emitted when the router's location changes.
///
/// Tells the host what changed and which route, if any, now renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChangeEvent {
    /// The previous location
    pub from: Location,
    /// The new location
    pub to: Location,
    /// Key of the route now matched, or `None` if nothing matched
    pub matched: Option<String>,
}

impl RouteChangeEvent {
    /// Whether the new location matched a route
    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }

    /// Whether the pathname changed, as opposed to only the search string
    pub fn path_changed(&self) -> bool {
        self.from.pathname != self.to.pathname
    }
}
