//! # paramguard-http
//!
//! Request hook for [`paramguard`] sessions.
//!
//! A [`Guard`] checks each request's parameters (body first, then query
//! string). Requests that fail are answered with a [`Rejection`]: a fixed
//! status (`422 Unprocessable Entity` unless configured otherwise) and a JSON
//! body in the API error format:
//!
//! ```json
//! {
//!   "error": {
//!     "type": "validation_error",
//!     "message": "Request validation failed",
//!     "fields": [
//!       {"field": "name", "code": "required", "message": "This parameter is required."}
//!     ]
//!   }
//! }
//! ```
//!
//! Requests that pass continue with their sanitized parameters attached as a
//! [`ValidatedParams`] extension.

mod config;
mod guard;
mod request;

pub use config::{ConfigError, GuardConfig};
pub use guard::{validated, Guard, Rejection, ValidatedParams};
pub use request::RequestParams;
