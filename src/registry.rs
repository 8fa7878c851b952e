//! Named rules and named schemas.
//!
//! Declarations refer to rules by name. The [`Registry`](struct.Registry.html)
//! resolves those names when a schema is built, so a schema that names an
//! unknown rule never comes into existence. The registry also keeps named
//! schemas, which declarations may use as types.

use crate::builder::SchemaBuilder;
use crate::errors::SchemaError;
use crate::rules;
use crate::schema::Schema;
use crate::value::Value;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A rule bound to its options, ready to check values.
pub trait Check: Send + Sync {
    /// Returns one message per violation; an empty vector means the value
    /// passed.
    fn check(&self, value: &Value) -> Vec<String>;
}

impl<F> Check for F
where
    F: Fn(&Value) -> Vec<String> + Send + Sync,
{
    fn check(&self, value: &Value) -> Vec<String> {
        self(value)
    }
}

/// A named validation rule.
///
/// `compile` runs once per declaration, while the schema is built. Rejecting
/// the options there turns a bad declaration into a build-time
/// [`SchemaError::InvalidRuleOptions`](../errors/enum.SchemaError.html).
pub trait Rule: Send + Sync {
    fn compile(&self, options: &JsonValue) -> Result<Arc<dyn Check>, String>;
}

/// A rule made from a closure over `(value, options)`.
pub struct FnRule<F>(Arc<F>);

impl<F> FnRule<F>
where
    F: Fn(&Value, &JsonValue) -> Vec<String> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        FnRule(Arc::new(f))
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&Value, &JsonValue) -> Vec<String> + Send + Sync + 'static,
{
    fn compile(&self, options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        let f = self.0.clone();
        let options = options.clone();
        Ok(Arc::new(move |value: &Value| (*f)(value, &options)))
    }
}

/// A rule that records a fixed message whenever a predicate fails.
pub struct PredicateRule<F> {
    predicate: Arc<F>,
    message: String,
}

impl<F> PredicateRule<F>
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    pub fn new(message: &str, predicate: F) -> Self {
        Self {
            predicate: Arc::new(predicate),
            message: message.to_owned(),
        }
    }
}

impl<F> Rule for PredicateRule<F>
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    fn compile(&self, _options: &JsonValue) -> Result<Arc<dyn Check>, String> {
        let predicate = self.predicate.clone();
        let message = self.message.clone();
        Ok(Arc::new(move |value: &Value| {
            if (*predicate)(value) {
                vec![]
            } else {
                vec![message.clone()]
            }
        }))
    }
}

/// A mapping of rule names to rules, and of schema names to schemas.
#[derive(Clone)]
pub struct Registry {
    rules: HashMap<String, Arc<dyn Rule>>,
    schemas: HashMap<String, Arc<Schema>>,
}

impl Registry {
    /// Constructs a registry seeded with the built-in rules.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        rules::register_builtins(&mut registry);
        registry
    }

    /// Constructs a registry with no rules at all.
    ///
    /// Schemas built against it may only use rules registered afterwards.
    /// The implicit `not_blank` rule must be registered for any declaration
    /// that sets neither `allow_nil` nor `allow_blank`.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            schemas: HashMap::new(),
        }
    }

    /// Registers a rule under `name`, replacing any rule of the same name.
    pub fn register<R: Rule + 'static>(&mut self, name: &str, rule: R) -> &mut Self {
        trace!(rule = name, "registered rule");
        self.rules.insert(name.to_owned(), Arc::new(rule));
        self
    }

    /// Registers a closure over `(value, options)` as a rule.
    pub fn register_fn<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&Value, &JsonValue) -> Vec<String> + Send + Sync + 'static,
    {
        self.register(name, FnRule::new(f))
    }

    /// Registers a predicate as a rule that reports `message` when the
    /// predicate returns false.
    pub fn register_predicate<F>(&mut self, name: &str, message: &str, predicate: F) -> &mut Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.register(name, PredicateRule::new(message, predicate))
    }

    /// Looks up a rule by its exact name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Rule>, SchemaError> {
        self.rules
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::NoSuchRule {
                rule: name.to_owned(),
            })
    }

    pub fn contains_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Names a schema so that declarations can refer to it as a type.
    ///
    /// The stored schema carries the name, which then appears in type
    /// mismatch messages.
    pub fn register_schema(&mut self, name: &str, mut schema: Schema) -> Arc<Schema> {
        trace!(schema = name, "registered schema");
        schema.name = Some(name.to_owned());
        let schema = Arc::new(schema);
        self.schemas.insert(name.to_owned(), schema.clone());
        schema
    }

    /// Looks up a named schema.
    pub fn schema(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Builds a schema by running `body` against a fresh builder session.
    pub fn build<F>(&self, body: F) -> Result<Schema, SchemaError>
    where
        F: FnOnce(&mut SchemaBuilder) -> Result<(), SchemaError>,
    {
        let mut builder = SchemaBuilder::new(self);
        body(&mut builder)?;
        Ok(builder.finish())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut rules: Vec<&String> = self.rules.keys().collect();
        rules.sort();
        let mut schemas: Vec<&String> = self.schemas.keys().collect();
        schemas.sort();
        f.debug_struct("Registry")
            .field("rules", &rules)
            .field("schemas", &schemas)
            .finish()
    }
}
