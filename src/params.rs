//! Typed path parameters and query string parsing
//!
//! [`RouteParams`] holds the converted values captured from a path template
//! (like `{id:int}`), keyed by the parameter name exactly as the template
//! declares it. [`QueryParams`] parses the `search` half of a location
//! (like `?page=1&sort=name`).

use crate::error::{Result, RouterError};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Parameter Values
// ============================================================================

/// A converted path parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Text captured by `str`, `slug`, `path`, `any` or a custom converter
    Str(String),
    /// Integer captured by `int`
    Int(i64),
    /// Floating point number captured by `float`
    Float(f64),
    /// UUID captured by `uuid`
    Uuid(Uuid),
}

impl ParamValue {
    /// Borrow the value as text, if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a float. Integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Get the value as a UUID, if it is one
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            ParamValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<Uuid> for ParamValue {
    fn from(value: Uuid) -> Self {
        ParamValue::Uuid(value)
    }
}

// ============================================================================
// Route Parameters
// ============================================================================

/// Route parameters extracted from a matched path
///
/// # Example
///
/// ```
/// use route_resolver::{ParamValue, RouteParams};
///
/// // Template: /users/{id:int}
/// // Matched path: /users/123
/// let mut params = RouteParams::new();
/// params.insert("id", ParamValue::Int(123));
///
/// assert_eq!(params.get_int("id"), Some(123));
/// assert_eq!(params.get_as::<u32>("id"), Some(123));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteParams {
    params: HashMap<String, ParamValue>,
}

impl RouteParams {
    /// Create new empty route params
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from hashmap
    pub fn from_map(params: HashMap<String, ParamValue>) -> Self {
        Self { params }
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Get a text parameter
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.as_str()
    }

    /// Get an integer parameter
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.params.get(key)?.as_int()
    }

    /// Get a parameter's display form parsed as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.to_string().parse().ok()
    }

    /// Insert a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Get all parameters as a reference to the HashMap
    pub fn all(&self) -> &HashMap<String, ParamValue> {
        &self.params
    }

    /// Iterate over all parameters
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.params.iter()
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Options for parsing a search string
///
/// The defaults drop blank values, skip malformed fields and split on `&`.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Keep `key=` and bare `key` fields with an empty value
    pub keep_blank_values: bool,
    /// Fail on a field without `=` instead of skipping it
    pub strict_parsing: bool,
    /// Stop with an error once more than this many fields are present
    pub max_num_fields: Option<usize>,
    /// Field separator
    pub separator: char,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            keep_blank_values: false,
            strict_parsing: false,
            max_num_fields: None,
            separator: '&',
        }
    }
}

/// Query parameters parsed from a location's search string
///
/// Supports multiple values for the same key.
///
/// # Example
///
/// ```
/// use route_resolver::QueryParams;
///
/// let query = QueryParams::from_query_string("?page=1&sort=name&tag=rust&tag=ui");
///
/// assert_eq!(query.get("page"), Some(&"1".to_string()));
/// assert_eq!(query.get_as::<i32>("page"), Some(1));
/// assert_eq!(query.get_all("tag").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

impl QueryParams {
    /// Create new empty query params
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse with default options, skipping anything malformed
    pub fn from_query_string(query: &str) -> Self {
        // Lenient parsing cannot fail.
        Self::parse_with(query, &QueryOptions::default()).unwrap_or_default()
    }

    /// Parse a search string, with or without its leading `?`
    pub fn parse_with(query: &str, options: &QueryOptions) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params: HashMap<String, Vec<String>> = HashMap::new();
        if query.is_empty() {
            return Ok(Self { params });
        }

        if let Some(max) = options.max_num_fields {
            let fields = query.split(options.separator).count();
            if fields > max {
                return Err(RouterError::MalformedQuery {
                    field: format!("too many fields ({} > {})", fields, max),
                });
            }
        }

        for pair in query.split(options.separator) {
            if pair.is_empty() && !options.strict_parsing {
                continue;
            }

            let (key, value) = match pair.split_once('=') {
                Some(kv) => kv,
                None if options.strict_parsing => {
                    return Err(RouterError::MalformedQuery {
                        field: pair.to_string(),
                    });
                }
                None if options.keep_blank_values => (pair, ""),
                None => continue,
            };

            if value.is_empty() && !options.keep_blank_values {
                continue;
            }

            params
                .entry(decode_uri_component(key))
                .or_default()
                .push(decode_uri_component(value));
        }

        Ok(Self { params })
    }

    /// Get first value for a parameter
    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)?.first()
    }

    /// Get all values for a parameter
    ///
    /// Useful for parameters that can appear multiple times like `?tag=rust&tag=ui`
    pub fn get_all(&self, key: &str) -> Option<&Vec<String>> {
        self.params.get(key)
    }

    /// Get the first value parsed as type T
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Insert a parameter
    ///
    /// If the key already exists, the value is appended to the list.
    pub fn insert(&mut self, key: String, value: String) {
        self.params.entry(key).or_default().push(value);
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of unique parameter keys
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// Percent-decode a query component; `+` is a space, invalid UTF-8 is replaced
fn decode_uri_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_typed_access() {
        let mut params = RouteParams::new();
        params.insert("id", 123_i64);
        params.insert("name", "alice");

        assert_eq!(params.get_int("id"), Some(123));
        assert_eq!(params.get_str("name"), Some("alice"));
        assert_eq!(params.get_str("id"), None);
        assert_eq!(params.get_as::<u16>("id"), Some(123));
        assert!(params.contains("name"));
        assert!(!params.contains("missing"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_param_value_display() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(ParamValue::Uuid(id).to_string(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(ParamValue::Float(1.5).to_string(), "1.5");
        assert_eq!(ParamValue::Int(7).as_float(), Some(7.0));
    }

    #[test]
    fn test_query_params_basic() {
        let query = QueryParams::from_query_string("?page=1&sort=name&filter=active");

        assert_eq!(query.get("page"), Some(&"1".to_string()));
        assert_eq!(query.get("sort"), Some(&"name".to_string()));
        assert_eq!(query.get("filter"), Some(&"active".to_string()));
        assert_eq!(query.get("missing"), None);
    }

    #[test]
    fn test_query_params_multiple_values() {
        let query = QueryParams::from_query_string("tag=rust&tag=web&tag=ui");

        let tags = query.get_all("tag").unwrap();
        assert_eq!(tags, &vec!["rust".to_string(), "web".to_string(), "ui".to_string()]);
        assert_eq!(query.get("tag"), Some(&"rust".to_string()));
    }

    #[test]
    fn test_blank_values_dropped_by_default() {
        let query = QueryParams::from_query_string("a=&b=2&c");
        assert!(!query.contains("a"));
        assert!(!query.contains("c"));
        assert_eq!(query.len(), 1);

        let options = QueryOptions {
            keep_blank_values: true,
            ..QueryOptions::default()
        };
        let query = QueryParams::parse_with("a=&b=2&c", &options).unwrap();
        assert_eq!(query.get("a"), Some(&String::new()));
        assert_eq!(query.get("c"), Some(&String::new()));
    }

    #[test]
    fn test_strict_parsing_rejects_bare_field() {
        let options = QueryOptions {
            strict_parsing: true,
            ..QueryOptions::default()
        };
        let err = QueryParams::parse_with("a=1&oops", &options).unwrap_err();
        assert!(matches!(err, RouterError::MalformedQuery { field } if field == "oops"));
    }

    #[test]
    fn test_max_num_fields() {
        let options = QueryOptions {
            max_num_fields: Some(2),
            ..QueryOptions::default()
        };
        assert!(QueryParams::parse_with("a=1&b=2", &options).is_ok());
        assert!(QueryParams::parse_with("a=1&b=2&c=3", &options).is_err());
    }

    #[test]
    fn test_custom_separator() {
        let options = QueryOptions {
            separator: ';',
            ..QueryOptions::default()
        };
        let query = QueryParams::parse_with("a=1;b=2", &options).unwrap();
        assert_eq!(query.get_as::<i32>("b"), Some(2));
    }

    #[test]
    fn test_uri_decoding() {
        assert_eq!(decode_uri_component("hello%20world"), "hello world");
        assert_eq!(decode_uri_component("hello+world"), "hello world");
        assert_eq!(decode_uri_component("caf%C3%A9"), "café");
        assert_eq!(decode_uri_component("100%"), "100%");
        assert_eq!(decode_uri_component("%zz"), "%zz");
        assert_eq!(decode_uri_component("a%2Bb"), "a+b");
        assert_eq!(decode_uri_component("%FF"), "\u{FFFD}");
    }

    #[test]
    fn test_empty_query_string() {
        assert!(QueryParams::from_query_string("").is_empty());
        assert!(QueryParams::from_query_string("?").is_empty());
    }
}
