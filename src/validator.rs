//! Validate documents against schemas.
//!
//! This module contains logic related to *validation*, the process of taking a
//! decoded document and checking it against a schema.
//!
//! See the docs for [`Validator`](struct.Validator.html) for more.

use crate::errors::SchemaError;
use crate::report::ErrorReport;
use crate::schema::Schema;
use crate::value::Value;
use crate::vm::validate;
use tracing::debug;

/// Validates documents against schemas.
#[derive(Debug, Default, Eq, PartialEq, Clone, Hash)]
pub struct Validator {
    config: Config,
}

impl Validator {
    /// Constructs a new validator using the default configuration.
    pub fn new() -> Self {
        Self::new_with_config(Config::default())
    }

    /// Constructs a new validator using a configuration.
    pub fn new_with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate a document against a schema.
    ///
    /// Despite its name, the returned report does not describe a Rust error.
    /// A report, even a non-empty one, is the _successful_ result of running
    /// `validate`. Every finding in the document is in it; validation does not
    /// stop at the first.
    ///
    /// Returns an error if the maximum depth is exceeded (see
    /// [`Config::max_depth`](struct.Config.html#method.max_depth)).
    pub fn validate(&self, schema: &Schema, instance: &Value) -> Result<ErrorReport, SchemaError> {
        let report = validate(self.config.max_depth, schema, instance)?;
        debug!(errors = report.len(), "validated document");
        Ok(report)
    }
}

/// Configuration for how validation should proceed.
#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub struct Config {
    max_depth: usize,
}

impl Config {
    /// Create a new, default `Config`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth, in path segments, at which a map may
    /// still be walked. The default is 128.
    ///
    /// When evaluation is aborted because of this maximum depth, validation
    /// *fails* with [`SchemaError::TooDeep`](../errors/enum.SchemaError.html).
    /// No report is returned.
    pub fn max_depth(&mut self, max_depth: usize) -> &mut Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::Registry;
    use crate::schema::{Options, Type};
    use failure::Error;
    use serde_json::json;

    fn nested_schema(depth: usize) -> Result<Schema, SchemaError> {
        fn declare(s: &mut crate::builder::SchemaBuilder, depth: usize) -> Result<(), SchemaError> {
            if depth == 0 {
                s.field("leaf", Type::Integer, Options::new())
            } else {
                s.field_with("next", Type::Map, Options::new(), |s| declare(s, depth - 1))
            }
        }
        Registry::new().build(|s| declare(s, depth))
    }

    fn nested_instance(depth: usize) -> Value {
        let mut value = json!({ "leaf": 1 });
        for _ in 0..depth {
            value = json!({ "next": value });
        }
        Value::from(value)
    }

    #[test]
    fn too_deep() -> Result<(), Error> {
        let mut config = Config::new();
        config.max_depth(4);

        let validator = Validator::new_with_config(config);
        assert!(validator
            .validate(&nested_schema(3)?, &nested_instance(3))?
            .is_empty());
        assert!(validator
            .validate(&nested_schema(10)?, &nested_instance(10))
            .is_err());

        Ok(())
    }

    #[test]
    fn default_depth_is_generous() -> Result<(), Error> {
        let validator = Validator::new();
        assert_eq!(validator.config().clone(), Config::default());
        assert!(validator
            .validate(&nested_schema(100)?, &nested_instance(100))?
            .is_empty());

        Ok(())
    }
}
