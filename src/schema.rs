//! Compiled schema representations.
//!
//! A [`Schema`](struct.Schema.html) is plain data: an ordered list of
//! [`FieldSpec`](struct.FieldSpec.html)s, each carrying its expected
//! [`Type`](enum.Type.html), its resolved rules, and optionally a nested
//! schema or an element declaration. Schemas are produced by the
//! [`SchemaBuilder`](../builder/struct.SchemaBuilder.html) and never change
//! afterwards, so one schema may be shared by any number of concurrent
//! validations.

use crate::registry::Check;
use crate::value::Value;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// The values that a field or element may be declared to hold.
#[derive(Debug, Clone)]
pub enum Type {
    /// Exactly `null`.
    Null,

    /// Exactly `true` or `false`.
    ///
    /// Unlike the other tags, a mismatch reports "should be boolean".
    Boolean,

    /// Any number, integral or not.
    Number,

    /// A number decoded with an integral representation.
    Integer,

    /// A number decoded with a floating representation.
    Float,

    /// Any string.
    Text,

    /// Any map. A block declared with this type becomes the nested schema.
    Map,

    /// Any list. A block declared with this type may declare the element.
    List,

    /// A map satisfying another schema.
    Schema(Arc<Schema>),
}

impl Type {
    /// Resolves a built-in type name. Schema names are resolved by the
    /// [`Registry`](../registry/struct.Registry.html), not here.
    pub fn from_name(name: &str) -> Option<Type> {
        let typ = match name {
            "Null" | "Nil" => Type::Null,
            "Boolean" | "Bool" => Type::Boolean,
            "Number" | "Numeric" => Type::Number,
            "Integer" => Type::Integer,
            "Float" => Type::Float,
            "Text" | "String" => Type::Text,
            "Map" | "Hash" | "Object" => Type::Map,
            "List" | "Array" => Type::List,
            _ => return None,
        };
        Some(typ)
    }

    /// The name used for this type in validation messages.
    pub fn name(&self) -> &str {
        match self {
            Type::Null => "Null",
            Type::Boolean => "Boolean",
            Type::Number => "Number",
            Type::Integer => "Integer",
            Type::Float => "Float",
            Type::Text => "Text",
            Type::Map => "Map",
            Type::List => "List",
            Type::Schema(schema) => schema.name().unwrap_or("Map"),
        }
    }

    /// Does `value` have this type, or a specialization of it?
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Type::Null, Value::Null) => true,
            (Type::Boolean, Value::Bool(_)) => true,
            (Type::Number, Value::Number(_)) => true,
            (Type::Integer, Value::Number(n)) => !n.is_f64(),
            (Type::Float, Value::Number(n)) => n.is_f64(),
            (Type::Text, Value::Text(_)) => true,
            (Type::Map, Value::Map(_)) | (Type::Schema(_), Value::Map(_)) => true,
            (Type::List, Value::List(_)) => true,
            _ => false,
        }
    }

    /// The message recorded when `value` does not have this type.
    pub fn mismatch_message(&self, value: &Value) -> String {
        match self {
            Type::Boolean => format!(
                "has class \"{}\" but should be boolean",
                value.class_name()
            ),
            _ => format!(
                "has class \"{}\" but should be a \"{}\"",
                value.class_name(),
                self.name()
            ),
        }
    }

    pub fn is_list(&self) -> bool {
        match self {
            Type::List => true,
            _ => false,
        }
    }

    /// Can a declaration of this type carry a block?
    pub fn accepts_block(&self) -> bool {
        match self {
            Type::Map | Type::List | Type::Schema(_) => true,
            _ => false,
        }
    }
}

impl From<Arc<Schema>> for Type {
    fn from(schema: Arc<Schema>) -> Self {
        Type::Schema(schema)
    }
}

impl From<Schema> for Type {
    fn from(schema: Schema) -> Self {
        Type::Schema(Arc::new(schema))
    }
}

/// Options of one declaration: presence escape hatches plus rules to run.
///
/// Rules keep the order in which they are added; that order is the order of
/// their findings in a report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    pub(crate) allow_nil: bool,
    pub(crate) allow_blank: bool,
    pub(crate) rules: Vec<(String, JsonValue)>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a missing or `null` value, skipping every rule for it.
    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }

    /// Accept a missing, `null`, or whitespace-only value, skipping every rule
    /// for it.
    pub fn allow_blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    /// Adds a rule invocation. Options of `false` disable the rule; its name
    /// must still resolve when the schema is built.
    pub fn rule<T: Into<JsonValue>>(mut self, name: &str, options: T) -> Self {
        self.rules.push((name.to_owned(), options.into()));
        self
    }

    /// Shorthand for the `presence` rule.
    pub fn presence(self) -> Self {
        self.rule("presence", true)
    }

    /// Reads options from a JSON object such as
    /// `{"presence": true, "allow_nil": true, "length": {"min": 3}}`.
    ///
    /// `allow_nil` and `allow_blank` (or `allowNil` and `allowBlank`) are the
    /// escape hatches; every other key names a rule.
    pub fn from_json(options: &JsonValue) -> Option<Self> {
        let object = match options {
            JsonValue::Null => return Some(Self::default()),
            JsonValue::Object(object) => object,
            _ => return None,
        };

        let mut result = Self::default();
        for (key, value) in object {
            match key.as_str() {
                "allow_nil" | "allowNil" => result.allow_nil = value.as_bool()?,
                "allow_blank" | "allowBlank" => result.allow_blank = value.as_bool()?,
                _ => result = result.rule(key, value.clone()),
            }
        }
        Some(result)
    }

    pub fn allows_nil(&self) -> bool {
        self.allow_nil
    }

    pub fn allows_blank(&self) -> bool {
        self.allow_blank
    }

    pub fn rules(&self) -> &[(String, JsonValue)] {
        &self.rules
    }
}

/// One rule applied to a field or element, already resolved and compiled.
#[derive(Clone)]
pub struct RuleInvocation {
    pub(crate) name: String,
    pub(crate) options: JsonValue,
    pub(crate) check: Arc<dyn Check>,
    pub(crate) allow_nil: bool,
    pub(crate) allow_blank: bool,
}

impl RuleInvocation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &JsonValue {
        &self.options
    }

    pub fn allows_nil(&self) -> bool {
        self.allow_nil
    }

    pub fn allows_blank(&self) -> bool {
        self.allow_blank
    }

    /// Runs the rule, returning its violation messages.
    pub fn check(&self, value: &Value) -> Vec<String> {
        self.check.check(value)
    }
}

impl fmt::Debug for RuleInvocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RuleInvocation")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("allow_nil", &self.allow_nil)
            .field("allow_blank", &self.allow_blank)
            .finish()
    }
}

/// The declared rules and type of one value: a field's value or a list
/// element. Shared by [`FieldSpec`](struct.FieldSpec.html) and
/// [`ElementSpec`](struct.ElementSpec.html).
#[derive(Debug, Clone)]
pub struct Slot {
    pub(crate) typ: Type,
    pub(crate) rules: Vec<RuleInvocation>,
    pub(crate) nested: Option<Arc<Schema>>,
}

impl Slot {
    pub fn expected_type(&self) -> &Type {
        &self.typ
    }

    pub fn rules(&self) -> &[RuleInvocation] {
        &self.rules
    }

    /// The schema declared in this slot's block, if any.
    pub fn nested(&self) -> Option<&Arc<Schema>> {
        self.nested.as_ref()
    }

    /// The schema a map in this slot is walked with: the block's schema, or
    /// else the referenced schema.
    pub fn descent(&self) -> Option<&Schema> {
        match (&self.nested, &self.typ) {
            (Some(nested), _) => Some(&**nested),
            (None, Type::Schema(schema)) => Some(&**schema),
            _ => None,
        }
    }

    /// Is a missing, `null`, or blank value acceptable here?
    ///
    /// The escape hatches travel on every invocation of the slot, including
    /// the structural type check, so a slot without other rules still knows
    /// them.
    pub fn skips(&self, value: Option<&Value>) -> bool {
        let null = Value::Null;
        let value = value.unwrap_or(&null);
        self.rules
            .iter()
            .any(|rule| (rule.allow_nil && value.is_null()) || (rule.allow_blank && value.is_blank()))
    }
}

/// One declared key of a schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) slot: Slot,
    pub(crate) element: Option<ElementSpec>,
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn expected_type(&self) -> &Type {
        &self.slot.typ
    }

    pub fn rules(&self) -> &[RuleInvocation] {
        &self.slot.rules
    }

    /// The element declaration; only ever present on `List` fields.
    pub fn element(&self) -> Option<&ElementSpec> {
        self.element.as_ref()
    }
}

/// The single declaration applied to every element of a `List` field.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub(crate) slot: Slot,
}

impl ElementSpec {
    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn expected_type(&self) -> &Type {
        &self.slot.typ
    }

    pub fn rules(&self) -> &[RuleInvocation] {
        &self.slot.rules
    }
}

/// An immutable, declared shape for a map-shaped document.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) name: Option<String>,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) strict: bool,
}

impl Schema {
    /// The registered name of this schema. Anonymous schemas have none.
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(String::as_str)
    }

    /// The fields, in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Are keys that are not declared reported?
    pub fn is_strict(&self) -> bool {
        self.strict
    }
}
