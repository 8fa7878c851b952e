//! `docshape` declares the expected shape of semi-structured documents (maps,
//! lists and scalars, usually decoded from JSON) and checks documents against
//! it, reporting every violation with a path to where it occurred.
//!
//! # Validating data
//!
//! A schema is declared once, against a [`Registry`](registry/struct.Registry.html)
//! of rules, and then shared by any number of validations:
//!
//! ```
//! use serde_json::json;
//! use docshape::{Instance, Options, Registry, Type};
//! use failure::Error;
//!
//! fn main() -> Result<(), Error> {
//!     let mut registry = Registry::new();
//!
//!     // Consumer rules are registered by name before any schema uses them.
//!     registry.register_predicate("odd", "can't be even", |value| {
//!         value.as_i64().map_or(true, |n| n % 2 != 0)
//!     });
//!
//!     // Named schemas can be used as types.
//!     let item = registry.build(|s| {
//!         s.field("id", Type::Integer, Options::new().rule("odd", true))?;
//!         s.field("text", Type::Text, Options::new().allow_nil().rule("length", json!({ "min": 3 })))
//!     })?;
//!     registry.register_schema("Item", item);
//!
//!     let schema = registry.build(|s| {
//!         s.field("name", Type::Text, Options::new())?;
//!         s.field("active", Type::Boolean, Options::new())?;
//!         s.field_with("items", Type::List, Options::new(), |s| {
//!             s.element("Item", Options::new())
//!         })
//!     })?;
//!
//!     let ok = Instance::new(&schema, json!({
//!         "name": "John Doe",
//!         "active": false,
//!         "items": [{ "id": 1, "text": "first" }, { "id": 3 }]
//!     }));
//!     assert!(ok.is_valid()?);
//!
//!     let bad = Instance::from_json_str(&schema, r#"{
//!         "name": "   ",
//!         "active": "yes",
//!         "items": [{ "id": 2, "text": "no" }, 7],
//!         "extra": true
//!     }"#)?;
//!     assert!(!bad.is_valid()?);
//!
//!     // Findings come back in a deterministic order: unknown keys first,
//!     // then declared fields in declaration order, then list elements by
//!     // index.
//!     assert_eq!(bad.errors()?.formatted_messages(), vec![
//!         "/extra is not a known key",
//!         "/name must not be empty",
//!         "/active has class \"Text\" but should be boolean",
//!         "/items[0]/id can't be even",
//!         "/items[0]/text is too short (minimum is 3 characters)",
//!         "/items[1] has class \"Integer\" but should be a \"Item\"",
//!     ]);
//!
//!     // Lookups work regardless of the outcome.
//!     assert_eq!(bad.at("/items[0]/id")?.and_then(|v| v.as_i64()), Some(2));
//!
//!     Ok(())
//! }
//! ```
//!
//! Declarations that make no sense, such as a key declared twice or an
//! element declared outside a list, fail while the schema is built, with a
//! [`SchemaError`](errors/enum.SchemaError.html). Problems with a document are
//! never Rust errors: they are entries of an
//! [`ErrorReport`](report/struct.ErrorReport.html).

mod vm;

pub mod builder;
pub mod errors;
pub mod instance;
pub mod path;
pub mod registry;
pub mod report;
pub mod rules;
pub mod schema;
pub mod serde;
pub mod validator;
pub mod value;

pub use crate::builder::{SchemaBuilder, TypeDecl};
pub use crate::errors::SchemaError;
pub use crate::instance::{Instance, Raw};
pub use crate::path::{Path, Segment};
pub use crate::registry::{Check, Registry, Rule};
pub use crate::report::{ErrorEntry, ErrorReport};
pub use crate::schema::{ElementSpec, FieldSpec, Options, RuleInvocation, Schema, Type};
pub use crate::serde::SerdeSchema;
pub use crate::validator::{Config, Validator};
pub use crate::value::Value;
