//! Parameter converter registry
//!
//! Maps a type tag (the `int` in `{id:int}`) to the regex fragment a
//! parameter must match and the function that turns the matched text into a
//! [`ParamValue`].
//!
//! | tag   | fragment                         | value                  |
//! |-------|----------------------------------|------------------------|
//! | `str` | `[^/]+`                          | [`ParamValue::Str`]    |
//! | `int` | `[0-9]+`                         | [`ParamValue::Int`]    |
//! | `float` | `[0-9]+(\.[0-9]+)?`          | [`ParamValue::Float`]  |
//! | `uuid` | lowercase 8-4-4-4-12 hex        | [`ParamValue::Uuid`]   |
//! | `slug` | `[-a-zA-Z0-9_]+`                | [`ParamValue::Str`]    |
//! | `path` | `.+`                            | [`ParamValue::Str`]    |
//! | `any` | `.*`                             | [`ParamValue::Str`]    |
//!
//! `int` and `float` accept ASCII digits only, since that is what `str::parse`
//! reads. A segment of other Unicode digits (`١٢٣`) is not a number here and
//! falls through to later routes. An `int` overflowing `i64` is rejected by
//! its converter, so the route does not match either.

use crate::error::{Result, RouterError};
use crate::params::ParamValue;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Tag used when a token omits its type
pub const DEFAULT_TAG: &str = "str";

/// Converts matched text into a parameter value.
///
/// Returning `None` means the text matched the fragment but is still not a
/// valid value (an integer overflowing `i64`, say); the route then does not
/// match.
pub type ConvertFn = Arc<dyn Fn(&str) -> Option<ParamValue> + Send + Sync>;

/// A regex fragment paired with its conversion function
#[derive(Clone)]
pub struct ConversionEntry {
    regex: String,
    convert: ConvertFn,
}

impl ConversionEntry {
    /// Create an entry from a fragment and a conversion function
    pub fn new<F>(regex: impl Into<String>, convert: F) -> Self
    where
        F: Fn(&str) -> Option<ParamValue> + Send + Sync + 'static,
    {
        Self {
            regex: regex.into(),
            convert: Arc::new(convert),
        }
    }

    /// Entry whose value is the matched text itself
    pub fn identity(regex: impl Into<String>) -> Self {
        Self::new(regex, |s| Some(ParamValue::Str(s.to_string())))
    }

    /// The regex fragment spliced into compiled templates
    pub fn regex(&self) -> &str {
        &self.regex
    }

    /// The conversion function
    pub fn converter(&self) -> &ConvertFn {
        &self.convert
    }

    /// Run the conversion on matched text
    pub fn convert(&self, raw: &str) -> Option<ParamValue> {
        (self.convert)(raw)
    }
}

impl fmt::Debug for ConversionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionEntry")
            .field("regex", &self.regex)
            .finish_non_exhaustive()
    }
}

/// Registry of converter tags
///
/// # Example
///
/// ```
/// use route_resolver::{ConversionEntry, ConverterRegistry, ParamValue};
///
/// let mut registry = ConverterRegistry::new();
/// registry
///     .register(
///         "upper",
///         ConversionEntry::new("[A-Z]+", |s| Some(ParamValue::Str(s.to_lowercase()))),
///     )
///     .unwrap();
///
/// assert!(registry.contains("upper"));
/// assert!(registry.contains("int"));
/// ```
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    entries: HashMap<String, ConversionEntry>,
}

impl ConverterRegistry {
    /// Create a registry holding the built-in converters
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert("str".to_string(), ConversionEntry::identity(r"[^/]+"));
        entries.insert(
            "int".to_string(),
            ConversionEntry::new(r"[0-9]+", |s| s.parse().ok().map(ParamValue::Int)),
        );
        entries.insert(
            "float".to_string(),
            ConversionEntry::new(r"[0-9]+(\.[0-9]+)?", |s| s.parse().ok().map(ParamValue::Float)),
        );
        entries.insert(
            "uuid".to_string(),
            ConversionEntry::new(
                r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
                |s| Uuid::parse_str(s).ok().map(ParamValue::Uuid),
            ),
        );
        entries.insert(
            "slug".to_string(),
            ConversionEntry::identity(r"[-a-zA-Z0-9_]+"),
        );
        entries.insert("path".to_string(), ConversionEntry::identity(r".+"));
        entries.insert("any".to_string(), ConversionEntry::identity(r".*"));
        Self { entries }
    }

    /// Create a registry with no converters at all
    ///
    /// Templates compiled against it may only use tags registered later,
    /// including `str` for untyped tokens.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register or replace a converter
    ///
    /// The fragment must compile on its own and must not declare named
    /// groups, which would collide with the groups the compiler owns.
    pub fn register(&mut self, tag: impl Into<String>, entry: ConversionEntry) -> Result<()> {
        let tag = tag.into();
        validate_fragment(&tag, entry.regex())?;
        self.entries.insert(tag, entry);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, tag: impl Into<String>, entry: ConversionEntry) -> Result<Self> {
        self.register(tag, entry)?;
        Ok(self)
    }

    /// Look up a converter by tag
    pub fn get(&self, tag: &str) -> Option<&ConversionEntry> {
        self.entries.get(tag)
    }

    /// Check if a tag is registered
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Remove a converter, returning it if present
    pub fn remove(&mut self, tag: &str) -> Option<ConversionEntry> {
        self.entries.remove(tag)
    }

    /// Registered tags, in no particular order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered converters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_fragment(tag: &str, fragment: &str) -> Result<()> {
    let compiled = Regex::new(fragment).map_err(|e| RouterError::InvalidConverter {
        tag: tag.to_string(),
        reason: e.to_string(),
    })?;

    if let Some(name) = compiled.capture_names().flatten().next() {
        return Err(RouterError::InvalidConverter {
            tag: tag.to_string(),
            reason: format!("fragment declares named group '{}'", name),
        });
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
