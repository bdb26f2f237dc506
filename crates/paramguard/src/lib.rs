//! # paramguard
//!
//! Schema-driven validation of untrusted, nested parameters.
//!
//! A schema is a JSON object describing each field with a handful of rules.
//! Validating an input either yields a sanitized copy holding only the
//! fields the schema describes, or an error report keyed by field path.
//!
//! ## Example
//!
//! ```rust
//! use paramguard::Session;
//! use serde_json::json;
//!
//! let session = Session::new(json!({
//!     "name": { "type": "String", "required": true },
//!     "age":  { "type": "Number", "length": { "min": 1, "max": 3 } },
//!     "code": { "test": ["^[A-Z]+$"] },
//!     "role": { "type": "String", "default": "member" }
//! }))
//! .unwrap();
//!
//! let output = session.check(&json!({"name": "Al", "age": 2, "code": "AB"})).unwrap();
//! assert_eq!(output, json!({"name": "Al", "age": 2, "code": "AB", "role": "member"}));
//!
//! let report = session.check(&json!({"name": "Al", "age": 1234})).unwrap_err();
//! assert!(report.entry("age", "max").is_some());
//! ```
//!
//! ## Rules
//!
//! - `required` - the field must be present (not missing, not `null`)
//! - `default` - value used when the field is absent
//! - `type` - one of `String`, `Number`, `Boolean`, `Object`, `Array`, `Null`
//! - `length` - exact size, or `{ "min": X, "max": Y }`
//! - `test` - a regex, or a list of regexes that must all match
//!
//! More rules are added through [`RuleRegistry::register`].
//!
//! ## Failure behavior
//!
//! Validation stops at the first rule that records an error. A report only
//! holds several entries when a single rule emits more than one, such as
//! `length` violating both bounds.

mod config;
mod context;
mod engine;
mod error;
mod params;
mod registry;
mod rules;
mod schema;
mod session;

pub mod path;


pub use config::{ConfigError, SessionConfig, ENV_PREFIX};
pub use context::RuleContext;
pub use error::{
    ApiValidationError, ErrorBody, ErrorEntry, ErrorReport, FieldErrorResponse, PathError,
    RegistryError, SchemaError, REQUIRED_MESSAGE,
};
pub use params::Params;
pub use registry::{Registration, RuleHandler, RuleRegistry};
pub use rules::{LengthRule, TestRule, TypeRule, TypeTag};
pub use schema::{Entry, RuleEntry, SchemaNode, DEFAULT_KEY, REQUIRED_KEY};
pub use session::{Session, SessionBuilder};

/// Prelude module for validation
pub mod prelude {
    pub use crate::context::RuleContext;
    pub use crate::error::{ErrorEntry, ErrorReport};
    pub use crate::params::Params;
    pub use crate::registry::{RuleHandler, RuleRegistry};
    pub use crate::session::{Session, SessionBuilder};
}
