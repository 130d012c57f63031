//! Path template compilation
//!
//! Turns a template such as `/users/{id:int}/posts/{slug:slug}` into an
//! anchored regular expression plus the converters for each parameter.
//!
//! - Literal text between tokens is escaped, never interpreted as regex syntax
//! - Every token becomes a named capture using its converter's fragment
//! - The whole expression is anchored at both ends, so only complete paths match
//! - Parameter names starting with a digit are renamed internally, since regex
//!   group names cannot start with one; callers only ever see the declared name

use crate::converters::{ConvertFn, ConverterRegistry, DEFAULT_TAG};
use crate::error::{Result, RouterError};
use crate::params::{ParamValue, RouteParams};
use crate::{debug_log, trace_log};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Default token syntax: `{name}` or `{name:type}`
pub const DEFAULT_PARAM_PATTERN: &str = r"\{(?P<name>\w+)(?P<type>:\w+)?\}";

/// Prefix given to capture groups whose parameter name is not a valid group name
const PRIVATE_GROUP_PREFIX: &str = "__rr_";

// ============================================================================
// ParamSyntax
// ============================================================================

/// How parameter tokens are written inside templates
///
/// A syntax is a regex with a `name` group and an optional `type` group. A
/// leading `:` on the type is ignored, so `{id:int}` and `<id|int>`-style
/// syntaxes can share converters.
///
/// # Example
///
/// ```
/// use route_resolver::{compile, ConverterRegistry, ParamSyntax};
///
/// let syntax = ParamSyntax::new(r"<(?P<name>\w+)(\|(?P<type>\w+))?>")
///     .unwrap()
///     .with_delimiters('<', '>');
/// let pattern = compile("/users/<id|int>", &ConverterRegistry::new(), &syntax).unwrap();
///
/// let params = pattern.match_path("/users/7").unwrap();
/// assert_eq!(params.get_int("id"), Some(7));
/// ```
#[derive(Debug, Clone)]
pub struct ParamSyntax {
    pattern: Regex,
    delimiters: Option<(char, char)>,
}

impl ParamSyntax {
    /// Build a custom token syntax
    ///
    /// Fails if the pattern does not compile or has no `name` group.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| RouterError::InvalidSyntax {
            reason: e.to_string(),
        })?;

        if !pattern.capture_names().flatten().any(|n| n == "name") {
            return Err(RouterError::InvalidSyntax {
                reason: format!("pattern '{}' has no 'name' group", pattern.as_str()),
            });
        }

        Ok(Self {
            pattern,
            delimiters: None,
        })
    }

    /// Report these delimiters as malformed tokens when they show up in literal text
    pub fn with_delimiters(mut self, open: char, close: char) -> Self {
        self.delimiters = Some((open, close));
        self
    }

    /// The token regex
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Token delimiters, if any were declared
    pub fn delimiters(&self) -> Option<(char, char)> {
        self.delimiters
    }
}

impl Default for ParamSyntax {
    fn default() -> Self {
        static DEFAULT: OnceLock<Regex> = OnceLock::new();
        let pattern = DEFAULT
            .get_or_init(|| Regex::new(DEFAULT_PARAM_PATTERN).expect("default token syntax"))
            .clone();
        Self {
            pattern,
            delimiters: Some(('{', '}')),
        }
    }
}

// ============================================================================
// CompiledPattern
// ============================================================================

#[derive(Clone)]
struct ParamSlot {
    /// Name as declared in the template
    name: String,
    /// Capture group carrying the value
    group: String,
    convert: ConvertFn,
}

/// An anchored matcher plus per-parameter converters
///
/// The [`key`](Self::key) is the text of the anchored expression, so two
/// structurally identical templates share a key. Hosts use it as a stable
/// rendering identity.
#[derive(Clone)]
pub struct CompiledPattern {
    key: String,
    template: String,
    matcher: Regex,
    params: Vec<ParamSlot>,
}

impl CompiledPattern {
    /// Wrap an already-built regex, for compiler strategies that assemble
    /// their own expression
    ///
    /// Every named group becomes a parameter. Groups with an entry in
    /// `converters` use it; the rest yield their matched text.
    pub fn from_regex(
        template: impl Into<String>,
        matcher: Regex,
        mut converters: HashMap<String, ConvertFn>,
    ) -> Self {
        let params = matcher
            .capture_names()
            .flatten()
            .map(|group| ParamSlot {
                name: group.to_string(),
                group: group.to_string(),
                convert: converters
                    .remove(group)
                    .unwrap_or_else(|| Arc::new(text_value) as ConvertFn),
            })
            .collect();

        Self {
            key: matcher.as_str().to_string(),
            template: template.into(),
            matcher,
            params,
        }
    }

    /// Stable identity of this pattern
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The template this pattern was compiled from
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The anchored matcher
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// Declared parameter names, in template order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    /// Match a whole path, converting every captured parameter
    ///
    /// Returns `None` if the path does not match or a converter rejects its
    /// captured text.
    pub fn match_path(&self, path: &str) -> Option<RouteParams> {
        let caps = self.matcher.captures(path)?;
        let mut params = RouteParams::new();

        for slot in &self.params {
            let raw = caps.name(&slot.group).map_or("", |m| m.as_str());
            if let Some(value) = (slot.convert)(raw) {
                params.insert(slot.name.clone(), value);
            } else {
                debug_log!(
                    "Parameter '{}' rejected value '{}' for template '{}'",
                    slot.name,
                    raw,
                    self.template
                );
                return None;
            }
        }

        Some(params)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("key", &self.key)
            .field("template", &self.template)
            .field("params", &self.param_names().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile a template against a converter registry and token syntax
///
/// # Errors
///
/// All errors are configuration errors: an unknown converter tag, a malformed
/// or duplicate token, or an expression that fails to compile.
pub fn compile(
    template: &str,
    registry: &ConverterRegistry,
    syntax: &ParamSyntax,
) -> Result<CompiledPattern> {
    let mut expr = String::from("^");
    let mut params: Vec<ParamSlot> = Vec::new();
    let mut last_end = 0;

    for caps in syntax.pattern.captures_iter(template) {
        let Some(token) = caps.get(0) else { continue };

        let name = caps.name("name").map_or("", |m| m.as_str());
        if name.is_empty() {
            return Err(RouterError::MalformedToken {
                template: template.to_string(),
                position: token.start(),
            });
        }

        let tag = caps
            .name("type")
            .map(|m| m.as_str().trim_start_matches(':'))
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TAG);
        let entry = registry
            .get(tag)
            .ok_or_else(|| RouterError::UnknownConverter {
                tag: tag.to_string(),
                template: template.to_string(),
            })?;

        if params.iter().any(|p| p.name == name) {
            return Err(RouterError::DuplicateParam {
                name: name.to_string(),
                template: template.to_string(),
            });
        }

        push_literal(&mut expr, template, last_end, token.start(), syntax)?;

        let group = group_name(name, params.len());
        expr.push_str("(?P<");
        expr.push_str(&group);
        expr.push('>');
        expr.push_str(entry.regex());
        expr.push(')');

        params.push(ParamSlot {
            name: name.to_string(),
            group,
            convert: entry.converter().clone(),
        });
        last_end = token.end();
    }

    push_literal(&mut expr, template, last_end, template.len(), syntax)?;
    expr.push('$');

    let matcher = Regex::new(&expr).map_err(|source| RouterError::InvalidPattern {
        template: template.to_string(),
        source,
    })?;

    trace_log!("Compiled template '{}' -> '{}'", template, expr);

    Ok(CompiledPattern {
        key: expr,
        template: template.to_string(),
        matcher,
        params,
    })
}

/// Escape `template[start..end]` onto `expr`, rejecting stray delimiters
fn push_literal(
    expr: &mut String,
    template: &str,
    start: usize,
    end: usize,
    syntax: &ParamSyntax,
) -> Result<()> {
    let literal = &template[start..end];

    if let Some((open, close)) = syntax.delimiters {
        if let Some(offset) = literal.find(|c: char| c == open || c == close) {
            return Err(RouterError::MalformedToken {
                template: template.to_string(),
                position: start + offset,
            });
        }
    }

    expr.push_str(&regex::escape(literal));
    Ok(())
}

fn text_value(raw: &str) -> Option<ParamValue> {
    Some(ParamValue::Str(raw.to_string()))
}

/// Capture group for a parameter; `index` is its position in the template
///
/// Names the regex engine would reject, or that could clash with a private
/// name, are replaced by `__rr_<index>`.
fn group_name(name: &str, index: usize) -> String {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && name.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !name.starts_with(PRIVATE_GROUP_PREFIX);

    if valid {
        name.to_string()
    } else {
        format!("{}{}", PRIVATE_GROUP_PREFIX, index)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_default(template: &str) -> Result<CompiledPattern> {
        compile(template, &ConverterRegistry::new(), &ParamSyntax::default())
    }

    #[test]
    fn test_default_syntax_compiles() {
        assert_eq!(ParamSyntax::default().pattern(), DEFAULT_PARAM_PATTERN);
    }

    #[test]
    fn test_static_template_is_anchored() {
        let pattern = compile_default("/users").unwrap();

        assert!(pattern.match_path("/users").is_some());
        assert!(pattern.match_path("/users/").is_none());
        assert!(pattern.match_path("/user").is_none());
        assert!(pattern.match_path("/api/users").is_none());
        assert!(pattern.match_path("").is_none());
        assert_eq!(pattern.key(), "^/users$");
    }

    #[test]
    fn test_literals_are_escaped() {
        let pattern = compile_default("/files/report.v1+(draft)").unwrap();

        assert!(pattern.match_path("/files/report.v1+(draft)").is_some());
        assert!(pattern.match_path("/files/reportXv1+(draft)").is_none());
        assert!(pattern.match_path("/files/report.v11(draft)").is_none());
    }

    #[test]
    fn test_empty_template_matches_empty_path() {
        let pattern = compile_default("").unwrap();
        assert_eq!(pattern.key(), "^$");
        assert!(pattern.match_path("").is_some());
        assert!(pattern.match_path("/").is_none());
    }

    #[test]
    fn test_untyped_param_defaults_to_str() {
        let pattern = compile_default("/users/{name}").unwrap();

        let params = pattern.match_path("/users/alice").unwrap();
        assert_eq!(params.get_str("name"), Some("alice"));
        assert!(pattern.match_path("/users/alice/posts").is_none());
        assert!(pattern.match_path("/users/").is_none());
    }

    #[test]
    fn test_int_param_converts() {
        let pattern = compile_default("/user/{id:int}").unwrap();

        let params = pattern.match_path("/user/123").unwrap();
        assert_eq!(params.get("id"), Some(&ParamValue::Int(123)));
        assert!(pattern.match_path("/user/abc").is_none());
    }

    #[test]
    fn test_int_overflow_does_not_match() {
        let pattern = compile_default("/user/{id:int}").unwrap();
        assert!(pattern.match_path("/user/99999999999999999999").is_none());
    }

    #[test]
    fn test_float_and_uuid_params() {
        let pattern = compile_default("/at/{lat:float}/{id:uuid}").unwrap();

        let params = pattern
            .match_path("/at/51.5/550e8400-e29b-41d4-a716-446655440000")
            .unwrap();
        assert_eq!(params.get("lat"), Some(&ParamValue::Float(51.5)));
        assert!(params.get("id").and_then(ParamValue::as_uuid).is_some());

        assert!(pattern.match_path("/at/51.5/not-a-uuid").is_none());
    }

    #[test]
    fn test_path_and_any_params() {
        let pattern = compile_default("/files/{rest:path}").unwrap();
        let params = pattern.match_path("/files/docs/2024/report.pdf").unwrap();
        assert_eq!(params.get_str("rest"), Some("docs/2024/report.pdf"));
        assert!(pattern.match_path("/files/").is_none());

        let pattern = compile_default("/files/{rest:any}").unwrap();
        let params = pattern.match_path("/files/").unwrap();
        assert_eq!(params.get_str("rest"), Some(""));
    }

    #[test]
    fn test_digit_leading_name_is_hidden() {
        let pattern = compile_default("/legacy/{1st}").unwrap();

        assert!(pattern.key().contains(PRIVATE_GROUP_PREFIX));
        let params = pattern.match_path("/legacy/x").unwrap();
        assert_eq!(params.get_str("1st"), Some("x"));
        assert_eq!(params.len(), 1);
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["1st"]);
    }

    #[test]
    fn test_hidden_names_do_not_collide() {
        let pattern = compile_default("/legacy/{1st}/{__rr_1st}/{__rr_0}").unwrap();

        let params = pattern.match_path("/legacy/a/b/c").unwrap();
        assert_eq!(params.get_str("1st"), Some("a"));
        assert_eq!(params.get_str("__rr_1st"), Some("b"));
        assert_eq!(params.get_str("__rr_0"), Some("c"));
    }

    #[test]
    fn test_custom_syntax_with_dashed_names() {
        let syntax = ParamSyntax::new(r"\{(?P<name>[\w-]+)(?P<type>:\w+)?\}").unwrap();
        let pattern = compile("/u/{user-id:int}/{tab}", &ConverterRegistry::new(), &syntax).unwrap();

        let params = pattern.match_path("/u/7/posts").unwrap();
        assert_eq!(params.get_int("user-id"), Some(7));
        assert_eq!(params.get_str("tab"), Some("posts"));
    }

    #[test]
    fn test_unknown_tag_is_configuration_error() {
        let err = compile_default("/posts/{day:date}").unwrap_err();

        assert!(err.is_configuration());
        let message = err.to_string();
        assert!(message.contains("date"));
        assert!(message.contains("/posts/{day:date}"));
    }

    #[test]
    fn test_unterminated_token() {
        let err = compile_default("/users/{id").unwrap_err();
        assert!(matches!(err, RouterError::MalformedToken { position: 7, .. }));
    }

    #[test]
    fn test_stray_closing_brace() {
        let err = compile_default("/users/id}").unwrap_err();
        assert!(matches!(err, RouterError::MalformedToken { position: 9, .. }));
    }

    #[test]
    fn test_empty_token() {
        assert!(matches!(
            compile_default("/users/{}").unwrap_err(),
            RouterError::MalformedToken { .. }
        ));
    }

    #[test]
    fn test_duplicate_param() {
        let err = compile_default("/a/{id}/b/{id:int}").unwrap_err();
        assert!(matches!(err, RouterError::DuplicateParam { ref name, .. } if name == "id"));
    }

    #[test]
    fn test_identical_templates_share_key() {
        let a = compile_default("/users/{id:int}").unwrap();
        let b = compile_default("/users/{id:int}").unwrap();
        let c = compile_default("/users/{id}").unwrap();

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_custom_syntax_without_delimiters() {
        let syntax = ParamSyntax::new(r":(?P<name>[a-z]+)").unwrap();
        let pattern = compile("/users/:id/{raw}", &ConverterRegistry::new(), &syntax).unwrap();

        // Braces are plain literals under this syntax.
        let params = pattern.match_path("/users/42/{raw}").unwrap();
        assert_eq!(params.get_str("id"), Some("42"));
    }

    #[test]
    fn test_custom_syntax_requires_name_group() {
        assert!(matches!(
            ParamSyntax::new(r"<(\w+)>").unwrap_err(),
            RouterError::InvalidSyntax { .. }
        ));
    }

    #[test]
    fn test_from_regex_defaults_to_text() {
        let matcher = Regex::new(r"^/v(?P<major>\d+)/(?P<name>[^/]+)$").unwrap();
        let mut converters: HashMap<String, ConvertFn> = HashMap::new();
        converters.insert(
            "major".to_string(),
            Arc::new(|s: &str| s.parse().ok().map(ParamValue::Int)),
        );

        let pattern = CompiledPattern::from_regex("/v{major}/{name}", matcher, converters);
        let params = pattern.match_path("/v2/widgets").unwrap();

        assert_eq!(params.get_int("major"), Some(2));
        assert_eq!(params.get_str("name"), Some("widgets"));
        assert_eq!(pattern.key(), r"^/v(?P<major>\d+)/(?P<name>[^/]+)$");
    }
}
