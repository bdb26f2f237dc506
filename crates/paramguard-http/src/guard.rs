//! The request hook: validate, then reject or forward.

use crate::config::{ConfigError, GuardConfig};
use crate::request::RequestParams;
use http::header::{self, HeaderValue};
use http::{Request, Response, StatusCode};
use paramguard::{ApiValidationError, ErrorReport, Params, Session};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Sanitized parameters attached to a request that passed validation.
///
/// Read them back with [`validated`] or through the request's extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParams(pub Value);

/// The sanitized parameters attached by [`Guard::apply`], if any.
pub fn validated<B>(request: &Request<B>) -> Option<&Value> {
    request
        .extensions()
        .get::<ValidatedParams>()
        .map(|params| &params.0)
}

/// A request refused by a [`Guard`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}: {report}")]
pub struct Rejection {
    status: StatusCode,
    message: String,
    report: ErrorReport,
}

impl Rejection {
    /// HTTP status of the rejection.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The error report of the failed run.
    pub fn report(&self) -> &ErrorReport {
        &self.report
    }

    /// Give up the rejection for its error report.
    pub fn into_report(self) -> ErrorReport {
        self.report
    }

    /// Response body in the API error format.
    pub fn body(&self) -> ApiValidationError {
        self.report.to_api_error_with_message(self.message.clone())
    }

    /// Build the JSON response sent to the client.
    pub fn into_response(self) -> Response<String> {
        let body = serde_json::to_string(&self.body()).unwrap_or_else(|_| {
            r#"{"error":{"type":"internal_error","message":"Failed to serialize error"}}"#
                .to_string()
        });

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}

/// Runs a [`Session`] against incoming requests.
///
/// ## Example
///
/// ```rust
/// use http::{Request, StatusCode};
/// use paramguard::Session;
/// use paramguard_http::{validated, Guard};
/// use serde_json::json;
///
/// let session = Session::new(json!({"page": {"test": "^\\d+$", "default": "1"}})).unwrap();
/// let guard = Guard::new(session);
///
/// let request = Request::builder().uri("/items?page=3").body(()).unwrap();
/// let request = guard.apply(request).unwrap();
/// assert_eq!(validated(&request), Some(&json!({"page": "3"})));
///
/// let request = Request::builder().uri("/items?page=x").body(()).unwrap();
/// let rejection = guard.apply(request).unwrap_err();
/// assert_eq!(rejection.status(), StatusCode::UNPROCESSABLE_ENTITY);
/// ```
#[derive(Debug, Clone)]
pub struct Guard {
    session: Arc<Session>,
    status: StatusCode,
    message: String,
}

impl Guard {
    /// Guard with the default configuration.
    pub fn new(session: Session) -> Self {
        Self::from_arc(Arc::new(session))
    }

    /// Guard sharing an existing session.
    pub fn from_arc(session: Arc<Session>) -> Self {
        let config = GuardConfig::default();
        Self {
            session,
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: config.message,
        }
    }

    /// Guard with an explicit configuration.
    pub fn with_config(session: Session, config: GuardConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            session: Arc::new(session),
            status: config.status()?,
            message: config.message,
        })
    }

    /// The session requests are checked against.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Validate a request's parameters without taking the request.
    pub fn inspect<B: Params>(&self, request: &Request<B>) -> Result<Value, Rejection> {
        let params = RequestParams::new(request);
        self.session.check(&params).map_err(|report| {
            debug!(
                method = %request.method(),
                path = %request.uri().path(),
                errors = report.len(),
                "Rejecting request"
            );
            Rejection {
                status: self.status,
                message: self.message.clone(),
                report,
            }
        })
    }

    /// Validate a request and pass it on with its sanitized parameters
    /// attached as [`ValidatedParams`].
    pub fn apply<B: Params>(&self, mut request: Request<B>) -> Result<Request<B>, Rejection> {
        let data = self.inspect(&request)?;
        request.extensions_mut().insert(ValidatedParams(data));
        Ok(request)
    }
}
