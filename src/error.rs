//! Error handling for route compilation and router scoping
//!
//! Every failure here is fatal and surfaces synchronously to the caller.
//! A path that matches no route is *not* an error: resolution reports it as
//! `None` and leaves fallback behaviour to the caller.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

/// Errors raised while compiling route templates or using a router scope
#[derive(Debug, Error)]
pub enum RouterError {
    /// A parameter token names a converter tag missing from the registry
    #[error("unknown conversion type '{tag}' in '{template}'")]
    UnknownConverter { tag: String, template: String },

    /// A parameter delimiter is unterminated or stray
    #[error("malformed parameter token at byte {position} in '{template}'")]
    MalformedToken { template: String, position: usize },

    /// The same parameter name appears twice in one absolute template
    #[error("duplicate parameter '{name}' in '{template}'")]
    DuplicateParam { name: String, template: String },

    /// The assembled matcher expression does not compile
    #[error("template '{template}' produced an invalid matcher")]
    InvalidPattern {
        template: String,
        #[source]
        source: regex::Error,
    },

    /// A converter's regex fragment is unusable inside a compiled template
    #[error("converter '{tag}' is invalid: {reason}")]
    InvalidConverter { tag: String, reason: String },

    /// A custom parameter-token syntax is unusable
    #[error("invalid parameter syntax: {reason}")]
    InvalidSyntax { reason: String },

    /// A params or search accessor was called with no active router
    #[error("no active router in scope; accessors must be called beneath a router")]
    OutsideRouter,

    /// A router was constructed inside the scope of another router
    #[error("another router is already active in this scope")]
    DuplicateRouter,

    /// A search string failed strict parsing
    #[error("malformed query field '{field}'")]
    MalformedQuery { field: String },
}

impl RouterError {
    /// Whether this error comes from route or registry configuration.
    ///
    /// Configuration errors are raised while building resolvers, before any
    /// path is matched, and are never worth retrying.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RouterError::UnknownConverter { .. }
                | RouterError::MalformedToken { .. }
                | RouterError::DuplicateParam { .. }
                | RouterError::InvalidPattern { .. }
                | RouterError::InvalidConverter { .. }
                | RouterError::InvalidSyntax { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
