//! Declarative request validation.
//!
//! A [`Schema`] lists the fields expected in one request location together
//! with their [`Rule`]s. Schemas are checked by [`ValidateLayer`] before the
//! handler runs; see `schemas.rs` for the per-route definitions.

pub mod layer;
pub mod schemas;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub use layer::{RouteSchemas, ValidateLayer};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email pattern compiles")
});

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
        .expect("domain pattern compiles")
});

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("username pattern compiles"));

/// Where a schema is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Params,
    Query,
    Body,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Params => "params",
            Location::Query => "query",
            Location::Body => "body",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    String,
    NonEmpty,
    MinLength(usize),
    MaxLength(usize),
    Email,
    Domain,
    Username,
    Uuid,
    /// `true`/`false`, or their string forms in params and query
    Boolean,
    /// Integral number, or its string form in params and query
    Integer,
    OneOf(&'static [&'static str]),
    StringArray,
    Object,
    Array,
    Url,
}

impl Rule {
    /// Check one present value; `None` means the rule holds.
    fn check(&self, label: &str, value: &Value, location: Location) -> Option<String> {
        let text = value.as_str();
        // Path and query values only ever arrive as strings
        let scalar_text = if location == Location::Body { None } else { text };
        let failed = match self {
            Rule::Required => false,
            Rule::String => text.is_none(),
            Rule::NonEmpty => text.map(|s| s.trim().is_empty()).unwrap_or(false),
            Rule::MinLength(n) => text.map(|s| s.chars().count() < *n).unwrap_or(false),
            Rule::MaxLength(n) => text.map(|s| s.chars().count() > *n).unwrap_or(false),
            Rule::Email => !text.map(|s| EMAIL_RE.is_match(s.trim())).unwrap_or(false),
            Rule::Domain => !text.map(|s| DOMAIN_RE.is_match(s.trim())).unwrap_or(false),
            Rule::Username => !text.map(|s| USERNAME_RE.is_match(s)).unwrap_or(false),
            Rule::Uuid => !text.map(|s| uuid::Uuid::parse_str(s).is_ok()).unwrap_or(false),
            Rule::Boolean => !(value.is_boolean() || matches!(scalar_text, Some("true") | Some("false"))),
            Rule::Integer => {
                !(value.is_i64() || value.is_u64() || scalar_text.map(|s| s.parse::<i64>().is_ok()).unwrap_or(false))
            }
            Rule::OneOf(allowed) => !text.map(|s| allowed.contains(&s)).unwrap_or(false),
            Rule::StringArray => !value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false),
            Rule::Object => !value.is_object(),
            Rule::Array => !value.is_array(),
            Rule::Url => !text
                .and_then(|s| url::Url::parse(s).ok())
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false),
        };

        failed.then(|| self.message(label))
    }

    fn message(&self, label: &str) -> String {
        match self {
            Rule::Required => format!("\"{}\" is required", label),
            Rule::String => format!("\"{}\" must be a string", label),
            Rule::NonEmpty => format!("\"{}\" is not allowed to be empty", label),
            Rule::MinLength(n) => format!("\"{}\" length must be at least {} characters long", label, n),
            Rule::MaxLength(n) => {
                format!("\"{}\" length must be less than or equal to {} characters long", label, n)
            }
            Rule::Email => format!("\"{}\" must be a valid email", label),
            Rule::Domain => format!("\"{}\" must contain a valid domain name", label),
            Rule::Username => format!(
                "\"{}\" must only contain letters, numbers, dots, dashes and underscores",
                label
            ),
            Rule::Uuid => format!("\"{}\" must be a valid GUID", label),
            Rule::Boolean => format!("\"{}\" must be a boolean", label),
            Rule::Integer => format!("\"{}\" must be an integer", label),
            Rule::OneOf(allowed) => format!("\"{}\" must be one of [{}]", label, allowed.join(", ")),
            Rule::StringArray => format!("\"{}\" must be an array of strings", label),
            Rule::Object => format!("\"{}\" must be of type object", label),
            Rule::Array => format!("\"{}\" must be an array", label),
            Rule::Url => format!("\"{}\" must be a valid uri", label),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Key in the location; dotted names address nested objects.
    pub name: &'static str,
    pub label: &'static str,
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.name
            .split('.')
            .try_fold(root, |value, key| value.get(key))
            .filter(|v| !v.is_null())
    }

    fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rules: impl Into<Vec<Rule>>) -> Self {
        self.fields.push(FieldSpec {
            name,
            label: name,
            rules: rules.into(),
        });
        self
    }

    /// Validate a JSON body.
    pub fn validate(&self, value: &Value, abort_early: bool) -> Vec<String> {
        self.validate_in(Location::Body, value, abort_early)
    }

    /// Validate the values of one request location. Keys not named by the
    /// schema are ignored.
    ///
    /// Within a field, the first failing rule ends its checks. With
    /// `abort_early` only the first violation of the whole location is
    /// reported.
    pub fn validate_in(&self, location: Location, value: &Value, abort_early: bool) -> Vec<String> {
        let mut errors = Vec::new();

        for field in &self.fields {
            let failure = match field.lookup(value) {
                None if field.is_required() => Some(Rule::Required.message(field.label)),
                None => None,
                Some(present) => field.rules.iter().find_map(|rule| rule.check(field.label, present, location)),
            };

            if let Some(message) = failure {
                errors.push(message);
                if abort_early {
                    break;
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signup() -> Schema {
        Schema::new()
            .field("email", [Rule::Required, Rule::String, Rule::Email])
            .field("password", [Rule::Required, Rule::String, Rule::MinLength(6)])
            .field("role", [Rule::OneOf(&["user", "tenant_admin"])])
    }

    #[test]
    fn collects_every_violation_by_default() {
        let errors = signup().validate(&json!({ "role": "root" }), false);
        assert_eq!(
            errors,
            vec![
                "\"email\" is required".to_string(),
                "\"password\" is required".to_string(),
                "\"role\" must be one of [user, tenant_admin]".to_string(),
            ]
        );
    }

    #[test]
    fn abort_early_reports_first_violation_only() {
        let errors = signup().validate(&json!({}), true);
        assert_eq!(errors, vec!["\"email\" is required".to_string()]);
    }

    #[test]
    fn first_failing_rule_ends_the_field() {
        let errors = signup().validate(&json!({ "email": 42, "password": "abcdef" }), false);
        assert_eq!(errors, vec!["\"email\" must be a string".to_string()]);
    }

    #[test]
    fn optional_absent_fields_and_unknown_keys_pass() {
        let errors = signup().validate(
            &json!({ "email": "a@example.com", "password": "secret1", "extra": true }),
            false,
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn null_counts_as_absent() {
        let errors = signup().validate(&json!({ "email": null, "password": "secret1" }), false);
        assert_eq!(errors, vec!["\"email\" is required".to_string()]);
    }

    #[test]
    fn dotted_names_reach_nested_values() {
        let schema = Schema::new().field("whatsapp.baseUrl", [Rule::String, Rule::Url]);
        assert!(schema.validate(&json!({ "whatsapp": { "baseUrl": "https://graph.example.com" } }), false).is_empty());
        assert_eq!(
            schema.validate(&json!({ "whatsapp": { "baseUrl": "graph" } }), false),
            vec!["\"whatsapp.baseUrl\" must be a valid uri".to_string()]
        );
    }

    #[test]
    fn string_forms_satisfy_scalar_rules_in_query() {
        let schema = Schema::new()
            .field("start", [Rule::Integer])
            .field("flag", [Rule::Boolean])
            .field("id", [Rule::Uuid]);
        let ok = json!({ "start": "1700000000", "flag": "true", "id": uuid::Uuid::new_v4().to_string() });
        assert!(schema.validate_in(Location::Query, &ok, false).is_empty());

        let bad = json!({ "start": "soon", "flag": "yes", "id": "42" });
        assert_eq!(schema.validate_in(Location::Query, &bad, false).len(), 3);
    }

    #[test]
    fn body_scalars_need_json_types() {
        let schema = Schema::new().field("start", [Rule::Integer]).field("flag", [Rule::Boolean]);
        assert_eq!(
            schema.validate(&json!({ "start": "1700000000", "flag": "true" }), false),
            vec![
                "\"start\" must be an integer".to_string(),
                "\"flag\" must be a boolean".to_string(),
            ]
        );
        assert!(schema.validate(&json!({ "start": 1700000000, "flag": false }), false).is_empty());
    }

    #[test]
    fn format_rules() {
        let schema = Schema::new()
            .field("domain", [Rule::Domain])
            .field("username", [Rule::Username])
            .field("tags", [Rule::StringArray]);

        assert!(schema
            .validate(&json!({ "domain": "acme.example.com", "username": "jane_doe.1", "tags": ["a"] }), false)
            .is_empty());
        assert_eq!(
            schema
                .validate(&json!({ "domain": "localhost", "username": "jane doe", "tags": ["a", 1] }), false)
                .len(),
            3
        );
    }
}
