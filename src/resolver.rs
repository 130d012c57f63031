//! Route resolution
//!
//! Compiles every flattened route once and matches paths against the result
//! in precedence order.
//!
//! The compiler is pluggable through [`RouteCompiler`]. [`Resolver`] is the
//! built-in strategy (a converter registry plus a token syntax); any
//! `Fn(&str) -> Result<CompiledPattern>` works too.

use crate::converters::ConverterRegistry;
use crate::error::Result;
use crate::matcher::{compile, CompiledPattern, ParamSyntax};
use crate::nested::flatten;
use crate::params::RouteParams;
use crate::route::Route;
use crate::{debug_log, trace_log};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Compiler Strategy
// ============================================================================

/// Turns an absolute template into a [`CompiledPattern`]
pub trait RouteCompiler {
    /// Compile one absolute template
    fn compile(&self, template: &str) -> Result<CompiledPattern>;
}

impl<F> RouteCompiler for F
where
    F: Fn(&str) -> Result<CompiledPattern>,
{
    fn compile(&self, template: &str) -> Result<CompiledPattern> {
        self(template)
    }
}

/// The built-in compiler strategy
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    registry: ConverterRegistry,
    syntax: ParamSyntax,
}

impl Resolver {
    /// Resolver with the built-in converters and `{name:type}` tokens
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the converter registry
    pub fn with_registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the token syntax
    pub fn with_syntax(mut self, syntax: ParamSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// The converter registry in use
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// The token syntax in use
    pub fn syntax(&self) -> &ParamSyntax {
        &self.syntax
    }
}

impl RouteCompiler for Resolver {
    fn compile(&self, template: &str) -> Result<CompiledPattern> {
        compile(template, &self.registry, &self.syntax)
    }
}

/// Create a compiler strategy, falling back to the built-in registry and syntax
///
/// # Example
///
/// ```
/// use route_resolver::{create_resolver, RouteCompiler};
///
/// let resolver = create_resolver(None, None);
/// let pattern = resolver.compile("/users/{id:int}").unwrap();
/// assert!(pattern.match_path("/users/5").is_some());
/// ```
pub fn create_resolver(registry: Option<ConverterRegistry>, syntax: Option<ParamSyntax>) -> Resolver {
    Resolver {
        registry: registry.unwrap_or_default(),
        syntax: syntax.unwrap_or_default(),
    }
}

// ============================================================================
// Compiled Routes
// ============================================================================

/// A compiled absolute template paired with its payload
pub struct CompiledRoute<T> {
    pattern: CompiledPattern,
    payload: Arc<T>,
}

impl<T> CompiledRoute<T> {
    /// Pair a pattern with a payload
    pub fn new(pattern: CompiledPattern, payload: Arc<T>) -> Self {
        Self { pattern, payload }
    }

    /// The compiled pattern
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Rendering identity of this route
    pub fn key(&self) -> &str {
        self.pattern.key()
    }

    /// The route's payload
    pub fn payload(&self) -> &Arc<T> {
        &self.payload
    }

    /// Match a path against this route alone
    pub fn resolve(&self, path: &str) -> Option<Resolution<T>> {
        let params = self.pattern.match_path(path)?;
        Some(Resolution {
            payload: Arc::clone(&self.payload),
            params,
            key: self.pattern.key().to_string(),
        })
    }
}

impl<T> Clone for CompiledRoute<T> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            payload: Arc::clone(&self.payload),
        }
    }
}

impl<T> fmt::Debug for CompiledRoute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// A successful match: the payload to render and its converted parameters
pub struct Resolution<T> {
    /// Payload of the matched route
    pub payload: Arc<T>,
    /// Parameters from every level of the matched template
    pub params: RouteParams,
    /// Rendering identity of the matched route
    pub key: String,
}

impl<T> Clone for Resolution<T> {
    fn clone(&self) -> Self {
        Self {
            payload: Arc::clone(&self.payload),
            params: self.params.clone(),
            key: self.key.clone(),
        }
    }
}

impl<T> fmt::Debug for Resolution<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("key", &self.key)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// How many matches to collect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Stop at the first match
    #[default]
    First,
    /// Collect every match in precedence order
    All,
}

// ============================================================================
// Build & Resolve
// ============================================================================

/// Flatten a route tree and compile every absolute template
///
/// Fails on the first template the compiler rejects.
pub fn build_resolvers<T, C>(routes: &[Route<T>], compiler: &C) -> Result<Vec<CompiledRoute<T>>>
where
    C: RouteCompiler + ?Sized,
{
    flatten(routes)
        .into_iter()
        .map(|flat| -> Result<CompiledRoute<T>> {
            let pattern = compiler.compile(&flat.path)?;
            Ok(CompiledRoute::new(pattern, flat.payload))
        })
        .collect()
}

/// Resolve a path to the first matching route
pub fn resolve<T>(resolvers: &[CompiledRoute<T>], path: &str) -> Option<Resolution<T>> {
    let found = resolvers.iter().find_map(|route| route.resolve(path));
    if let Some(resolution) = &found {
        trace_log!("Resolved '{}' via '{}'", path, resolution.key);
    } else {
        debug_log!("No matching route found for '{}'", path);
    }
    found
}

/// Resolve a path to every matching route, in precedence order
///
/// A match whose key equals an earlier match's key is dropped, so the result
/// never holds two entries with the same rendering identity.
pub fn resolve_all<T>(resolvers: &[CompiledRoute<T>], path: &str) -> Vec<Resolution<T>> {
    let mut seen = HashSet::new();
    let matches: Vec<_> = resolvers
        .iter()
        .filter_map(|route| route.resolve(path))
        .filter(|resolution| seen.insert(resolution.key.clone()))
        .collect();

    if matches.is_empty() {
        debug_log!("No matching route found for '{}'", path);
    }
    matches
}

/// Resolve a path in the given mode
///
/// `First` yields at most one element.
pub fn resolve_with<T>(
    resolvers: &[CompiledRoute<T>],
    path: &str,
    mode: MatchMode,
) -> Vec<Resolution<T>> {
    match mode {
        MatchMode::First => resolve(resolvers, path).into_iter().collect(),
        MatchMode::All => resolve_all(resolvers, path),
    }
}

// ============================================================================
// Tests
// ============================================================================
