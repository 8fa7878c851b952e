//! A document bound to the schema it is meant to satisfy.

use crate::errors::SchemaError;
use crate::path::Path;
use crate::report::ErrorReport;
use crate::schema::Schema;
use crate::validator::Validator;
use crate::value::Value;
use failure::Error;
use once_cell::unsync::OnceCell;
use std::ops::Index;

/// The input an [`Instance`](struct.Instance.html) was constructed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Raw<'a> {
    Text(&'a str),
    Value(&'a Value),
}

/// A schema and a document, validated on demand.
///
/// The report is computed on the first call to
/// [`is_valid`](#method.is_valid) or [`errors`](#method.errors) and reused
/// afterwards. Lookups through [`at`](#method.at) work whether or not the
/// document is valid.
#[derive(Debug)]
pub struct Instance<'s> {
    schema: &'s Schema,
    validator: Validator,
    text: Option<String>,
    value: Value,
    report: OnceCell<ErrorReport>,
}

impl<'s> Instance<'s> {
    pub fn new<V: Into<Value>>(schema: &'s Schema, value: V) -> Self {
        Self::from_parts(schema, None, value.into())
    }

    /// Decodes `text` as JSON. Malformed text fails here, before any
    /// validation takes place.
    pub fn from_json_str(schema: &'s Schema, text: &str) -> Result<Self, Error> {
        let value = text.parse::<Value>()?;
        Ok(Self::from_parts(schema, Some(text.to_owned()), value))
    }

    fn from_parts(schema: &'s Schema, text: Option<String>, value: Value) -> Self {
        Self {
            schema,
            validator: Validator::new(),
            text,
            value,
            report: OnceCell::new(),
        }
    }

    /// Uses `validator` instead of a default one.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self.report = OnceCell::new();
        self
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// The input exactly as given.
    pub fn raw(&self) -> Raw<'_> {
        match &self.text {
            Some(text) => Raw::Text(text),
            None => Raw::Value(&self.value),
        }
    }

    /// The decoded document.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_valid(&self) -> Result<bool, SchemaError> {
        self.errors().map(ErrorReport::is_empty)
    }

    pub fn errors(&self) -> Result<&ErrorReport, SchemaError> {
        self.report
            .get_or_try_init(|| self.validator.validate(self.schema, &self.value))
    }

    /// Looks up a value by a path such as `/a/b[2]/c` or `a`.
    ///
    /// Returns `Ok(None)` when nothing is at the path.
    pub fn at(&self, path: &str) -> Result<Option<&Value>, SchemaError> {
        let path: Path = path.parse()?;
        Ok(self.value.at_path(&path))
    }

    /// Looks up a value by a sequence of keys.
    pub fn at_keys<S: AsRef<str>>(&self, keys: &[S]) -> Option<&Value> {
        self.value.at_keys(keys)
    }

    /// Looks up a value by an RFC 6901 JSON pointer such as `/a/b/2`.
    pub fn at_pointer(&self, pointer: &str) -> Result<Option<&Value>, SchemaError> {
        let keys = Path::from_pointer(pointer)?;
        Ok(self.value.at_keys(&keys))
    }
}

impl<'s> Index<&str> for Instance<'s> {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.value[key]
    }
}
