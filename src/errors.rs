//! An error type for schema construction and fatal validation conditions.

use failure::Fail;

/// An enum of possible errors that can emerge from this crate.
///
/// Most variants are programmer mistakes in a schema declaration. They are
/// raised while the schema is being built, never deferred to validation time.
/// Problems with a validated document are *not* represented here; see
/// [`ErrorReport`](../report/struct.ErrorReport.html) for those.
#[derive(Debug, Fail, PartialEq, Clone, Eq, Hash)]
pub enum SchemaError {
    /// The same key was declared twice on one schema.
    #[fail(display = "duplicate key: {}", key)]
    DuplicateKey { key: String },

    /// A type name did not resolve to a type tag or a registered schema.
    #[fail(display = "invalid type: {}", name)]
    InvalidType { name: String },

    /// A declaration block was given for a type that cannot have one.
    ///
    /// Only `Map`, `List` and schema references accept a block.
    #[fail(display = "unexpected block for {} of type {}", key, typ)]
    UnexpectedBlock { key: String, typ: String },

    /// An element was declared outside the block of a `List` field.
    #[fail(display = "element declared outside of a list field")]
    MisplacedElement,

    /// A key was declared inside the block of a `List` field, where only an
    /// element may be declared.
    #[fail(display = "key {} declared inside a list field", key)]
    MisplacedKey { key: String },

    /// A second element was declared for the same `List` field.
    #[fail(display = "duplicate element declaration for {}", key)]
    DuplicateElement { key: String },

    /// An element was declared with type `List`. Arrays of arrays are not
    /// supported.
    #[fail(display = "nested array element in {}", key)]
    NestedArray { key: String },

    /// Strictness was turned off inside the block of a `List` field. It
    /// belongs in the element's block.
    #[fail(display = "strictness set on list field {}", key)]
    MisplacedStrict { key: String },

    /// A `Null` type was declared without `allow_nil` or `allow_blank`, so
    /// no value could ever satisfy it.
    #[fail(display = "{} is of type Null but does not allow nil", key)]
    RequiredNull { key: String },

    /// A rule name was not found in the registry.
    #[fail(display = "no such rule: {}", rule)]
    NoSuchRule { rule: String },

    /// A rule refused the options it was given.
    #[fail(display = "invalid options for rule {}: {}", rule, reason)]
    InvalidRuleOptions { rule: String, reason: String },

    /// A lookup path could not be parsed.
    #[fail(display = "invalid path: {}", path)]
    InvalidPath { path: String },

    /// The maximum nesting depth was exceeded during validation.
    ///
    /// This is the only validation-time condition that aborts validation. The
    /// path is the one at which the limit was reached.
    #[fail(display = "maximum depth exceeded at {}", path)]
    TooDeep { path: String },
}
