//! A serialization/deserialization-friendly schema declaration.
//!
//! [`SerdeSchema`](struct.SerdeSchema.html) describes the same declarations
//! as the [`SchemaBuilder`](../builder/struct.SchemaBuilder.html) API, as
//! data. It does not enforce any of the declaration rules by itself; for
//! that, compile it with
//! [`Registry::compile`](../registry/struct.Registry.html#method.compile),
//! which replays it through a builder.

use crate::builder::SchemaBuilder;
use crate::errors::SchemaError;
use crate::registry::Registry;
use crate::schema::{Options, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, PartialEq, Deserialize, Serialize, Clone)]
pub struct SerdeSchema {
    #[serde(default = "default_strict")]
    pub strict: bool,

    #[serde(default)]
    pub fields: Vec<SerdeField>,
}

impl Default for SerdeSchema {
    fn default() -> Self {
        Self {
            strict: true,
            fields: vec![],
        }
    }
}

fn default_strict() -> bool {
    true
}

/// One declared key. `fields` and `element` together form the key's block.
#[derive(Debug, PartialEq, Deserialize, Serialize, Clone)]
pub struct SerdeField {
    pub name: String,

    #[serde(rename = "type")]
    pub typ: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<SerdeField>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<SerdeElement>>,
}

#[derive(Debug, PartialEq, Deserialize, Serialize, Clone)]
pub struct SerdeElement {
    #[serde(rename = "type")]
    pub typ: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<SerdeField>>,
}

fn options(key: &str, options: &Value) -> Result<Options, SchemaError> {
    Options::from_json(options).ok_or_else(|| SchemaError::InvalidRuleOptions {
        rule: key.to_owned(),
        reason: "options must be an object".to_owned(),
    })
}

fn declare_fields(s: &mut SchemaBuilder, fields: &[SerdeField]) -> Result<(), SchemaError> {
    for field in fields {
        let opts = options(&field.name, &field.options)?;
        let has_block = field.fields.is_some() || field.element.is_some() || field.strict.is_some();
        if !has_block {
            s.field(&field.name, field.typ.as_str(), opts)?;
            continue;
        }

        s.field_with(&field.name, field.typ.as_str(), opts, |s| {
            if let Some(strict) = field.strict {
                s.strict(strict);
            }
            if let Some(fields) = &field.fields {
                declare_fields(s, fields)?;
            }
            if let Some(element) = &field.element {
                declare_element(s, element)?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn declare_element(s: &mut SchemaBuilder, element: &SerdeElement) -> Result<(), SchemaError> {
    let opts = options("element", &element.options)?;
    if element.fields.is_none() && element.strict.is_none() {
        return s.element(element.typ.as_str(), opts);
    }

    s.element_with(element.typ.as_str(), opts, |s| {
        if let Some(strict) = element.strict {
            s.strict(strict);
        }
        match &element.fields {
            Some(fields) => declare_fields(s, fields),
            None => Ok(()),
        }
    })
}

impl Registry {
    /// Builds a schema from its serde form, applying every declaration rule
    /// the builder API applies.
    pub fn compile(&self, schema: &SerdeSchema) -> Result<Schema, SchemaError> {
        self.build(|s| {
            s.strict(schema.strict);
            declare_fields(s, &schema.fields)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_and_compiles() {
        let data = json!({
            "fields": [
                { "name": "id", "type": "Integer", "options": { "presence": true } },
                {
                    "name": "tags",
                    "type": "Array",
                    "options": { "allow_nil": true },
                    "element": { "type": "String", "options": { "length": { "max": 8 } } }
                },
                {
                    "name": "owner",
                    "type": "Hash",
                    "strict": false,
                    "fields": [{ "name": "email", "type": "String" }]
                }
            ]
        });

        let parsed: SerdeSchema = serde_json::from_value(data).expect("failed to parse json");
        assert!(parsed.strict);
        assert_eq!(parsed.fields.len(), 3);

        let schema = Registry::new().compile(&parsed).unwrap();
        assert!(schema.is_strict());
        assert!(schema.field("tags").unwrap().element().is_some());
        let owner = schema.field("owner").unwrap().slot().nested().unwrap();
        assert!(!owner.is_strict());
        assert_eq!(owner.fields()[0].name(), "email");
    }

    #[test]
    fn compile_applies_declaration_rules() {
        let parsed: SerdeSchema = serde_json::from_value(json!({
            "fields": [{
                "name": "a",
                "type": "Array",
                "element": { "type": "Array" }
            }]
        }))
        .unwrap();
        assert_eq!(
            Registry::new().compile(&parsed).err(),
            Some(SchemaError::NestedArray {
                key: "a".to_owned()
            })
        );

        let parsed: SerdeSchema = serde_json::from_value(json!({
            "fields": [{ "name": "a", "type": "Integer", "options": "presence" }]
        }))
        .unwrap();
        assert!(Registry::new().compile(&parsed).is_err());
    }

    #[test]
    fn roundtrip_json() {
        let data = r#"{
  "strict": false,
  "fields": [
    {
      "name": "a",
      "type": "List",
      "element": {
        "type": "Map",
        "fields": [
          {
            "name": "b",
            "type": "Text",
            "options": {
              "allow_blank": true
            }
          }
        ]
      }
    }
  ]
}"#;

        let parsed: SerdeSchema = serde_json::from_str(data).expect("failed to parse json");
        let round_trip = serde_json::to_string_pretty(&parsed).expect("failed to serialize json");
        assert_eq!(round_trip, data);
    }
}
