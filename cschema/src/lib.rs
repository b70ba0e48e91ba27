//! Declared object shapes, field-level validation, and JSON Schema export.
//!
//! Invalid input is a normal outcome: [`ObjectSchema::validate`] never panics and
//! never returns an error type, it returns a [`Validation`].
//!
//! ```rust
//! use cschema::{Field, ObjectSchema, Validation};
//! use serde_json::json;
//!
//! let schema = ObjectSchema::builder()
//!     .field(Field::string("schoolName"))
//!     .field(Field::number("amountPerStudent").positive())
//!     .build();
//!
//! match schema.validate(&json!({"schoolName": "Oak", "amountPerStudent": 100})) {
//!     Validation::Valid(value) => assert_eq!(value["schoolName"], "Oak"),
//!     Validation::Invalid(errors) => panic!("unexpected errors: {errors}"),
//! }
//!
//! let errors = schema
//!     .validate(&json!({"schoolName": ""}))
//!     .into_result()
//!     .expect_err("empty name and missing amount should fail");
//! assert!(errors.get("schoolName").is_some());
//! assert!(errors.get("amountPerStudent").is_some());
//! ```

mod export;
mod format;
mod shape;
mod validate;

pub use format::StringFormat;
pub use shape::{
    ArrayRules, Field, FieldSpec, FieldType, NumberRules, ObjectSchema, ObjectSchemaBuilder,
    StringRules,
};
pub use validate::{FieldErrors, Validation};

pub mod prelude {
    pub use crate::{Field, FieldErrors, FieldType, ObjectSchema, StringFormat, Validation};
}
