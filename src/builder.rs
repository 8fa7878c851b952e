//! Declaring schemas.
//!
//! A [`SchemaBuilder`](struct.SchemaBuilder.html) is one declaration session.
//! Blocks passed to [`field_with`](struct.SchemaBuilder.html#method.field_with)
//! and [`element_with`](struct.SchemaBuilder.html#method.element_with) run
//! against a fresh, nested session whose result becomes the nested schema or
//! the element. Sessions share nothing but the registry, so independent
//! schemas may be declared concurrently.
//!
//! ```
//! use docshape::{Options, Registry, Type};
//!
//! let registry = Registry::new();
//! let schema = registry
//!     .build(|s| {
//!         s.field("id", Type::Integer, Options::new())?;
//!         s.field_with("tags", Type::List, Options::new().allow_nil(), |s| {
//!             s.element(Type::Text, Options::new().rule("length", serde_json::json!({ "max": 8 })))
//!         })
//!     })
//!     .unwrap();
//!
//! assert_eq!(schema.fields().len(), 2);
//! assert!(schema.fields()[1].element().is_some());
//! ```

use crate::errors::SchemaError;
use crate::registry::Registry;
use crate::rules::TypeCheck;
use crate::schema::{ElementSpec, FieldSpec, Options, RuleInvocation, Schema, Slot, Type};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// A type as written in a declaration: a tag, or a name to be resolved.
#[derive(Debug, Clone)]
pub enum TypeDecl {
    Type(Type),
    Named(String),
}

impl From<Type> for TypeDecl {
    fn from(typ: Type) -> Self {
        TypeDecl::Type(typ)
    }
}

impl From<Arc<Schema>> for TypeDecl {
    fn from(schema: Arc<Schema>) -> Self {
        TypeDecl::Type(Type::Schema(schema))
    }
}

impl From<&Arc<Schema>> for TypeDecl {
    fn from(schema: &Arc<Schema>) -> Self {
        TypeDecl::Type(Type::Schema(schema.clone()))
    }
}

impl From<&str> for TypeDecl {
    fn from(name: &str) -> Self {
        TypeDecl::Named(name.to_owned())
    }
}

impl From<String> for TypeDecl {
    fn from(name: String) -> Self {
        TypeDecl::Named(name)
    }
}

/// What a session may declare.
#[derive(Debug, Clone)]
enum Scope {
    /// Keys of a map: the root, or the block of a `Map` or schema field.
    Keys,
    /// The block of the `List` field named here: one element only.
    Element(String),
}

/// One schema declaration session.
pub struct SchemaBuilder<'r> {
    registry: &'r Registry,
    scope: Scope,
    fields: Vec<FieldSpec>,
    names: HashSet<String>,
    element: Option<ElementSpec>,
    strict: bool,
}

impl<'r> SchemaBuilder<'r> {
    /// Starts a root session resolving names against `registry`.
    pub fn new(registry: &'r Registry) -> Self {
        Self::scoped(registry, Scope::Keys)
    }

    fn scoped(registry: &'r Registry, scope: Scope) -> Self {
        Self {
            registry,
            scope,
            fields: vec![],
            names: HashSet::new(),
            element: None,
            strict: true,
        }
    }

    /// Sets whether undeclared keys are reported. Schemas are strict unless
    /// told otherwise; inside a block this applies to the nested schema.
    pub fn strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    /// Declares a key.
    pub fn field<T: Into<TypeDecl>>(
        &mut self,
        name: &str,
        typ: T,
        options: Options,
    ) -> Result<(), SchemaError> {
        self.declare_field(name, typ.into(), options, None)
    }

    /// Declares a key whose nested schema, or element, is declared by `body`.
    ///
    /// The type must be `Map`, `List`, or a schema reference. A block on a
    /// schema reference extends a copy of the referenced schema.
    pub fn field_with<T, F>(
        &mut self,
        name: &str,
        typ: T,
        options: Options,
        body: F,
    ) -> Result<(), SchemaError>
    where
        T: Into<TypeDecl>,
        F: FnOnce(&mut SchemaBuilder<'r>) -> Result<(), SchemaError>,
    {
        self.declare_field(name, typ.into(), options, Some(Box::new(body)))
    }

    /// Declares the element of the enclosing `List` field.
    pub fn element<T: Into<TypeDecl>>(&mut self, typ: T, options: Options) -> Result<(), SchemaError> {
        self.declare_element(typ.into(), options, None)
    }

    /// Declares the element of the enclosing `List` field, with a block for
    /// the element's nested schema.
    pub fn element_with<T, F>(&mut self, typ: T, options: Options, body: F) -> Result<(), SchemaError>
    where
        T: Into<TypeDecl>,
        F: FnOnce(&mut SchemaBuilder<'r>) -> Result<(), SchemaError>,
    {
        self.declare_element(typ.into(), options, Some(Box::new(body)))
    }

    /// Ends the session.
    pub fn finish(self) -> Schema {
        debug!(
            fields = self.fields.len(),
            strict = self.strict,
            "built schema"
        );
        Schema {
            name: None,
            fields: self.fields,
            strict: self.strict,
        }
    }

    fn declare_field(
        &mut self,
        name: &str,
        typ: TypeDecl,
        options: Options,
        body: Option<Block<'_, 'r>>,
    ) -> Result<(), SchemaError> {
        if let Scope::Element(_) = self.scope {
            return Err(SchemaError::MisplacedKey {
                key: name.to_owned(),
            });
        }
        if self.names.contains(name) {
            return Err(SchemaError::DuplicateKey {
                key: name.to_owned(),
            });
        }
        let typ = self.resolve_type(typ)?;
        check_null(name, &typ, &options)?;

        let mut nested = None;
        let mut element = None;
        if let Some(body) = body {
            if !typ.accepts_block() {
                return Err(SchemaError::UnexpectedBlock {
                    key: name.to_owned(),
                    typ: typ.name().to_owned(),
                });
            }

            let mut session = match &typ {
                Type::List => Self::scoped(self.registry, Scope::Element(name.to_owned())),
                Type::Schema(base) => self.extending(base),
                _ => Self::scoped(self.registry, Scope::Keys),
            };
            body(&mut session)?;

            if typ.is_list() {
                if !session.strict {
                    return Err(SchemaError::MisplacedStrict {
                        key: name.to_owned(),
                    });
                }
                element = session.element;
            } else {
                nested = Some(Arc::new(session.finish()));
            }
        }

        let slot = self.slot(typ, &options, nested)?;
        self.names.insert(name.to_owned());
        self.fields.push(FieldSpec {
            name: name.to_owned(),
            slot,
            element,
        });
        Ok(())
    }

    fn declare_element(
        &mut self,
        typ: TypeDecl,
        options: Options,
        body: Option<Block<'_, 'r>>,
    ) -> Result<(), SchemaError> {
        let key = match &self.scope {
            Scope::Element(key) => key.clone(),
            Scope::Keys => return Err(SchemaError::MisplacedElement),
        };
        let typ = self.resolve_type(typ)?;
        if typ.is_list() {
            return Err(SchemaError::NestedArray { key });
        }
        if self.element.is_some() {
            return Err(SchemaError::DuplicateElement { key });
        }
        check_null(&format!("{}[*]", key), &typ, &options)?;

        let nested = match body {
            Some(body) => {
                if !typ.accepts_block() {
                    return Err(SchemaError::UnexpectedBlock {
                        key: format!("{}[*]", key),
                        typ: typ.name().to_owned(),
                    });
                }
                let mut session = match &typ {
                    Type::Schema(base) => self.extending(base),
                    _ => Self::scoped(self.registry, Scope::Keys),
                };
                body(&mut session)?;
                Some(Arc::new(session.finish()))
            }
            None => None,
        };

        let slot = self.slot(typ, &options, nested)?;
        self.element = Some(ElementSpec { slot });
        Ok(())
    }

    /// A key session pre-seeded with the fields of `base`.
    fn extending(&self, base: &Schema) -> Self {
        let mut session = Self::scoped(self.registry, Scope::Keys);
        session.fields = base.fields.clone();
        session.names = base.fields.iter().map(|f| f.name.clone()).collect();
        session.strict = base.strict;
        session
    }

    fn resolve_type(&self, typ: TypeDecl) -> Result<Type, SchemaError> {
        match typ {
            TypeDecl::Type(typ) => Ok(typ),
            TypeDecl::Named(name) => Type::from_name(&name)
                .or_else(|| self.registry.schema(&name).map(Type::Schema))
                .ok_or(SchemaError::InvalidType { name }),
        }
    }

    /// Resolves the declared rules, then appends the structural type check
    /// and, unless an escape hatch is set, the implicit `not_blank` rule.
    fn slot(
        &self,
        typ: Type,
        options: &Options,
        nested: Option<Arc<Schema>>,
    ) -> Result<Slot, SchemaError> {
        let mut rules = Vec::with_capacity(options.rules.len() + 2);
        for (name, rule_options) in &options.rules {
            if *rule_options == JsonValue::Bool(false) {
                self.registry.resolve(name)?;
                continue;
            }
            rules.push(self.invocation(name, rule_options, options)?);
        }

        rules.push(RuleInvocation {
            name: "type".to_owned(),
            options: JsonValue::String(typ.name().to_owned()),
            check: Arc::new(TypeCheck(typ.clone())),
            allow_nil: options.allow_nil,
            allow_blank: options.allow_blank,
        });

        if !options.allow_nil && !options.allow_blank {
            rules.push(self.invocation("not_blank", &JsonValue::Bool(true), options)?);
        }

        Ok(Slot { typ, rules, nested })
    }

    fn invocation(
        &self,
        name: &str,
        rule_options: &JsonValue,
        options: &Options,
    ) -> Result<RuleInvocation, SchemaError> {
        let check = self
            .registry
            .resolve(name)?
            .compile(rule_options)
            .map_err(|reason| SchemaError::InvalidRuleOptions {
                rule: name.to_owned(),
                reason,
            })?;

        // A rule's own options may open its escape hatches too.
        let own = |key: &str| {
            rule_options
                .get(key)
                .and_then(JsonValue::as_bool)
                .unwrap_or(false)
        };

        Ok(RuleInvocation {
            name: name.to_owned(),
            options: rule_options.clone(),
            check,
            allow_nil: options.allow_nil || own("allow_nil"),
            allow_blank: options.allow_blank || own("allow_blank"),
        })
    }
}

fn check_null(key: &str, typ: &Type, options: &Options) -> Result<(), SchemaError> {
    match typ {
        Type::Null if !options.allow_nil && !options.allow_blank => Err(SchemaError::RequiredNull {
            key: key.to_owned(),
        }),
        _ => Ok(()),
    }
}

type Block<'b, 'r> = Box<dyn FnOnce(&mut SchemaBuilder<'r>) -> Result<(), SchemaError> + 'b>;

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn build<F>(body: F) -> Result<Schema, SchemaError>
    where
        F: FnOnce(&mut SchemaBuilder) -> Result<(), SchemaError>,
    {
        Registry::new().build(body)
    }

    #[test]
    fn empty_schema() {
        let schema = build(|_| Ok(())).unwrap();
        assert!(schema.fields().is_empty());
        assert!(schema.is_strict());
    }

    #[test]
    fn accepts_type_names() {
        let schema = build(|s| {
            s.field("a", "Integer", Options::new())?;
            s.field("b", "String", Options::new())
        })
        .unwrap();
        assert_eq!(schema.fields()[0].expected_type().name(), "Integer");
        assert_eq!(schema.fields()[1].expected_type().name(), "Text");
    }

    #[test]
    fn rejects_unknown_type_names() {
        assert_eq!(
            build(|s| s.field("a", "integer", Options::new())).err(),
            Some(SchemaError::InvalidType {
                name: "integer".to_owned()
            })
        );
    }

    #[test]
    fn rejects_duplicate_keys() {
        assert_eq!(
            build(|s| {
                s.field("a", Type::Integer, Options::new())?;
                s.field("a", Type::Text, Options::new())
            })
            .err(),
            Some(SchemaError::DuplicateKey {
                key: "a".to_owned()
            })
        );
    }

    #[test]
    fn rejects_blocks_on_scalars() {
        assert_eq!(
            build(|s| s.field_with("a", Type::Integer, Options::new(), |_| Ok(()))).err(),
            Some(SchemaError::UnexpectedBlock {
                key: "a".to_owned(),
                typ: "Integer".to_owned()
            })
        );
        assert_eq!(
            build(|s| {
                s.field_with("a", Type::List, Options::new(), |s| {
                    s.element_with(Type::Integer, Options::new(), |_| Ok(()))
                })
            })
            .err(),
            Some(SchemaError::UnexpectedBlock {
                key: "a[*]".to_owned(),
                typ: "Integer".to_owned()
            })
        );
    }

    #[test]
    fn null_types_need_an_escape_hatch() {
        assert_eq!(
            build(|s| s.field("a", Type::Null, Options::new())).err(),
            Some(SchemaError::RequiredNull {
                key: "a".to_owned()
            })
        );
        assert_eq!(
            build(|s| {
                s.field_with("a", Type::List, Options::new(), |s| {
                    s.element(Type::Null, Options::new())
                })
            })
            .err(),
            Some(SchemaError::RequiredNull {
                key: "a[*]".to_owned()
            })
        );
        assert!(build(|s| s.field("a", Type::Null, Options::new().allow_nil())).is_ok());
    }

    #[test]
    fn strictness_belongs_to_the_element() {
        assert_eq!(
            build(|s| {
                s.field_with("a", Type::List, Options::new(), |s| {
                    s.strict(false);
                    s.element_with(Type::Map, Options::new(), |s| {
                        s.field("b", Type::Integer, Options::new())
                    })
                })
            })
            .err(),
            Some(SchemaError::MisplacedStrict {
                key: "a".to_owned()
            })
        );

        let schema = build(|s| {
            s.field_with("a", Type::List, Options::new(), |s| {
                s.element_with(Type::Map, Options::new(), |s| {
                    s.strict(false);
                    s.field("b", Type::Integer, Options::new())
                })
            })
        })
        .unwrap();
        let element = schema.fields()[0].element().unwrap();
        assert!(!element.slot().nested().unwrap().is_strict());
    }

    #[test]
    fn rejects_elements_outside_lists() {
        assert_eq!(
            build(|s| s.element(Type::Text, Options::new())).err(),
            Some(SchemaError::MisplacedElement)
        );
        assert_eq!(
            build(|s| {
                s.field_with("a", Type::Map, Options::new(), |s| {
                    s.element(Type::Text, Options::new())
                })
            })
            .err(),
            Some(SchemaError::MisplacedElement)
        );
    }

    #[test]
    fn rejects_duplicate_elements() {
        assert_eq!(
            build(|s| {
                s.field_with("a", Type::List, Options::new(), |s| {
                    s.element(Type::Text, Options::new())?;
                    s.element(Type::Text, Options::new())
                })
            })
            .err(),
            Some(SchemaError::DuplicateElement {
                key: "a".to_owned()
            })
        );
    }

    #[test]
    fn rejects_keys_inside_lists() {
        assert_eq!(
            build(|s| {
                s.field_with("a", Type::List, Options::new(), |s| {
                    s.field("b", Type::Text, Options::new())
                })
            })
            .err(),
            Some(SchemaError::MisplacedKey {
                key: "b".to_owned()
            })
        );
    }

    #[test]
    fn rejects_nested_arrays() {
        assert_eq!(
            build(|s| {
                s.field_with("a", Type::List, Options::new(), |s| {
                    s.element_with(Type::List, Options::new(), |s| {
                        s.element(Type::Text, Options::new())
                    })
                })
            })
            .err(),
            Some(SchemaError::NestedArray {
                key: "a".to_owned()
            })
        );
    }

    #[test]
    fn rejects_unknown_rules_at_build_time() {
        assert_eq!(
            build(|s| s.field("a", Type::Integer, Options::new().rule("odd", true))).err(),
            Some(SchemaError::NoSuchRule {
                rule: "odd".to_owned()
            })
        );
        assert_eq!(
            build(|s| s.field("a", Type::Integer, Options::new().rule("odd", false))).err(),
            Some(SchemaError::NoSuchRule {
                rule: "odd".to_owned()
            })
        );
    }

    #[test]
    fn disabled_rules_do_not_run() {
        let schema = build(|s| {
            s.field("a", Type::Text, Options::new().rule("presence", false))
        })
        .unwrap();
        let names: Vec<&str> = schema.fields()[0].rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["type", "not_blank"]);
    }

    #[test]
    fn rejects_bad_rule_options() {
        match build(|s| s.field("a", Type::Text, Options::new().rule("format", json!({ "with": "(" })))) {
            Err(SchemaError::InvalidRuleOptions { rule, .. }) => assert_eq!(rule, "format"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rule_order() {
        let schema = build(|s| s.field("a", Type::Text, Options::new().presence())).unwrap();
        let names: Vec<&str> = schema.fields()[0].rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["presence", "type", "not_blank"]);

        let schema = build(|s| s.field("a", Type::Text, Options::new().allow_nil())).unwrap();
        let rules = schema.fields()[0].rules();
        assert_eq!(rules.len(), 1);
        assert!(rules[0].allows_nil());
    }

    #[test]
    fn nested_blocks() {
        let schema = build(|s| {
            s.field_with("a", Type::Map, Options::new(), |s| {
                s.strict(false);
                s.field("b", Type::Text, Options::new())
            })?;
            s.field_with("c", Type::List, Options::new(), |s| {
                s.element_with(Type::Map, Options::new(), |s| {
                    s.field("d", Type::Integer, Options::new())
                })
            })
        })
        .unwrap();

        let a = schema.field("a").unwrap().slot().nested().unwrap();
        assert!(!a.is_strict());
        assert_eq!(a.fields()[0].name(), "b");

        let element = schema.field("c").unwrap().element().unwrap();
        let nested = element.slot().nested().unwrap();
        assert_eq!(nested.fields()[0].name(), "d");
    }

    #[test]
    fn empty_list_block_leaves_elements_unconstrained() {
        let schema = build(|s| s.field_with("a", Type::List, Options::new(), |_| Ok(()))).unwrap();
        assert!(schema.field("a").unwrap().element().is_none());
    }

    #[test]
    fn named_schema_references() {
        let mut registry = Registry::new();
        let item = registry
            .build(|s| s.field("id", Type::Integer, Options::new()))
            .unwrap();
        registry.register_schema("Item", item);

        let schema = registry
            .build(|s| s.field("item", "Item", Options::new()))
            .unwrap();
        assert_eq!(schema.fields()[0].expected_type().name(), "Item");
        assert!(schema.fields()[0].slot().descent().is_some());
    }

    #[test]
    fn extending_a_reference() {
        let mut registry = Registry::new();
        let item = registry
            .build(|s| s.field("id", Type::Integer, Options::new()))
            .unwrap();
        let item = registry.register_schema("Item", item);

        let schema = registry
            .build(|s| {
                s.field_with("item", &item, Options::new(), |s| {
                    s.field("label", Type::Text, Options::new())
                })
            })
            .unwrap();
        let extended = schema.fields()[0].slot().descent().unwrap();
        let names: Vec<&str> = extended.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["id", "label"]);

        assert_eq!(
            registry
                .build(|s| {
                    s.field_with("item", &item, Options::new(), |s| {
                        s.field("id", Type::Text, Options::new())
                    })
                })
                .err(),
            Some(SchemaError::DuplicateKey {
                key: "id".to_owned()
            })
        );
    }
}
