//! Built-in rules.
//!
//! Message wording follows the familiar model-validation phrasing
//! ("can't be blank", "is too short (minimum is 3 characters)").

use crate::registry::{Check, Registry, Rule};
use crate::schema::Type;
use crate::value::Value;
use chrono::DateTime;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use url::Url;

/// The message of a missing or blank required value.
pub const MUST_NOT_BE_EMPTY: &str = "must not be empty";

pub(crate) fn register_builtins(registry: &mut Registry) {
    registry
        .register("type", TypeRule)
        .register("class", TypeRule)
        .register("required", Required)
        .register("not_blank", NotBlank)
        .register("presence", Presence)
        .register("length", Length)
        .register("format", Format)
        .register("numericality", Numericality)
        .register("url", UrlRule)
        .register("timestamp", Timestamp);
}

/// The structural type check of a declaration.
pub(crate) struct TypeCheck(pub(crate) Type);

impl Check for TypeCheck {
    fn check(&self, value: &Value) -> Vec<String> {
        if self.0.accepts(value) {
            vec![]
        } else {
            vec![self.0.mismatch_message(value)]
        }
    }
}

/// `type` / `class`: options name a built-in type, e.g. `"Integer"`.
struct TypeRule;

impl Rule for TypeRule {
    fn compile(&self, options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        let name = options
            .as_str()
            .ok_or_else(|| "expected a type name".to_owned())?;
        let typ = Type::from_name(name).ok_or_else(|| format!("unknown type {}", name))?;
        Ok(Arc::new(TypeCheck(typ)))
    }
}

struct Required;

impl Rule for Required {
    fn compile(&self, _options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        Ok(Arc::new(|value: &Value| {
            if value.is_null() {
                vec![MUST_NOT_BE_EMPTY.to_owned()]
            } else {
                vec![]
            }
        }))
    }
}

struct NotBlank;

impl Rule for NotBlank {
    fn compile(&self, _options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        Ok(Arc::new(|value: &Value| {
            if value.is_blank() {
                vec![MUST_NOT_BE_EMPTY.to_owned()]
            } else {
                vec![]
            }
        }))
    }
}

/// `presence`: like `not_blank`, but also rejects empty lists and maps.
struct Presence;

impl Rule for Presence {
    fn compile(&self, _options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        Ok(Arc::new(|value: &Value| {
            let blank = match value {
                Value::List(l) => l.is_empty(),
                Value::Map(m) => m.is_empty(),
                _ => value.is_blank(),
            };
            if blank {
                vec!["can't be blank".to_owned()]
            } else {
                vec![]
            }
        }))
    }
}

fn bound(options: &JsonValue, key: &str) -> Result<Option<u64>, String> {
    match options.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| format!("{} must be a non-negative integer", key)),
    }
}

/// `length`: `{"min": n, "max": n, "is": n}`, counting characters of text and
/// elements of lists. Other values are not checked.
struct Length;

impl Rule for Length {
    fn compile(&self, options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        if !options.is_object() {
            return Err("expected an object with min, max or is".to_owned());
        }
        let min = bound(options, "min")?;
        let max = bound(options, "max")?;
        let is = bound(options, "is")?;

        Ok(Arc::new(move |value: &Value| {
            let (len, unit) = match value {
                Value::Text(s) => (s.chars().count() as u64, "characters"),
                Value::List(l) => (l.len() as u64, "elements"),
                _ => return vec![],
            };

            let mut messages = vec![];
            if let Some(min) = min {
                if len < min {
                    messages.push(format!("is too short (minimum is {} {})", min, unit));
                }
            }
            if let Some(max) = max {
                if len > max {
                    messages.push(format!("is too long (maximum is {} {})", max, unit));
                }
            }
            if let Some(is) = is {
                if len != is {
                    messages.push(format!("is the wrong length (should be {} {})", is, unit));
                }
            }
            messages
        }))
    }
}

fn regex_option(options: &JsonValue, key: &str) -> Result<Option<Regex>, String> {
    match options.get(key).and_then(JsonValue::as_str) {
        Some(pattern) => Regex::new(pattern).map(Some).map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

/// `format`: `{"with": regex}` and/or `{"without": regex}`, or a bare regex
/// string. Numbers are matched by their decimal rendering; other non-text
/// values are invalid.
struct Format;

impl Rule for Format {
    fn compile(&self, options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        let (with, without) = match options {
            JsonValue::String(pattern) => (
                Some(Regex::new(pattern).map_err(|e| e.to_string())?),
                None,
            ),
            JsonValue::Object(_) => (
                regex_option(options, "with")?,
                regex_option(options, "without")?,
            ),
            _ => return Err("expected a pattern or an object with with/without".to_owned()),
        };
        if with.is_none() && without.is_none() {
            return Err("expected a with or without pattern".to_owned());
        }

        Ok(Arc::new(move |value: &Value| {
            let rendered = match value {
                Value::Text(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return vec!["is invalid".to_owned()],
            };
            let matches_with = with.as_ref().map_or(true, |re| re.is_match(&rendered));
            let avoids_without = without.as_ref().map_or(true, |re| !re.is_match(&rendered));
            if matches_with && avoids_without {
                vec![]
            } else {
                vec!["is invalid".to_owned()]
            }
        }))
    }
}

#[derive(Default)]
struct NumericBounds {
    greater_than: Option<f64>,
    greater_than_or_equal_to: Option<f64>,
    less_than: Option<f64>,
    less_than_or_equal_to: Option<f64>,
    equal_to: Option<f64>,
    only_integer: bool,
    odd: bool,
    even: bool,
}

fn number_option(options: &JsonValue, key: &str) -> Result<Option<f64>, String> {
    match options.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("{} must be a number", key)),
    }
}

fn flag_option(options: &JsonValue, key: &str) -> bool {
    options.get(key).and_then(JsonValue::as_bool).unwrap_or(false)
}

/// `numericality`: `true`, or an object of bounds and flags. Text is never
/// read as a number.
struct Numericality;

impl Rule for Numericality {
    fn compile(&self, options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        let bounds = match options {
            JsonValue::Bool(true) => NumericBounds::default(),
            JsonValue::Object(_) => NumericBounds {
                greater_than: number_option(options, "greater_than")?,
                greater_than_or_equal_to: number_option(options, "greater_than_or_equal_to")?,
                less_than: number_option(options, "less_than")?,
                less_than_or_equal_to: number_option(options, "less_than_or_equal_to")?,
                equal_to: number_option(options, "equal_to")?,
                only_integer: flag_option(options, "only_integer"),
                odd: flag_option(options, "odd"),
                even: flag_option(options, "even"),
            },
            _ => return Err("expected true or an object of bounds".to_owned()),
        };

        Ok(Arc::new(move |value: &Value| {
            let number = match value.as_number() {
                Some(n) => n,
                None => return vec!["is not a number".to_owned()],
            };
            let n = match number.as_f64() {
                Some(n) => n,
                None => return vec!["is not a number".to_owned()],
            };

            let mut messages = vec![];
            if bounds.only_integer && number.is_f64() {
                messages.push("must be an integer".to_owned());
            }
            if let Some(b) = bounds.greater_than {
                if n <= b {
                    messages.push(format!("must be greater than {}", b));
                }
            }
            if let Some(b) = bounds.greater_than_or_equal_to {
                if n < b {
                    messages.push(format!("must be greater than or equal to {}", b));
                }
            }
            if let Some(b) = bounds.less_than {
                if n >= b {
                    messages.push(format!("must be less than {}", b));
                }
            }
            if let Some(b) = bounds.less_than_or_equal_to {
                if n > b {
                    messages.push(format!("must be less than or equal to {}", b));
                }
            }
            if let Some(b) = bounds.equal_to {
                if (n - b).abs() > std::f64::EPSILON {
                    messages.push(format!("must be equal to {}", b));
                }
            }
            if bounds.odd && (n.fract() != 0.0 || n % 2.0 == 0.0) {
                messages.push("must be odd".to_owned());
            }
            if bounds.even && (n.fract() != 0.0 || n % 2.0 != 0.0) {
                messages.push("must be even".to_owned());
            }
            messages
        }))
    }
}

/// `url`: text must parse as an absolute URL.
struct UrlRule;

impl Rule for UrlRule {
    fn compile(&self, _options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        Ok(Arc::new(|value: &Value| match value.as_str().map(Url::parse) {
            Some(Ok(_)) => vec![],
            _ => vec!["is not a valid URL".to_owned()],
        }))
    }
}

/// `timestamp`: text must be an RFC 3339 timestamp.
struct Timestamp;

impl Rule for Timestamp {
    fn compile(&self, _options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        Ok(Arc::new(|value: &Value| {
            match value.as_str().map(DateTime::parse_from_rfc3339) {
                Some(Ok(_)) => vec![],
                _ => vec!["is not a valid RFC 3339 timestamp".to_owned()],
            }
        }))
    }
}
