//! Validator sessions: a compiled schema ready to check any number of inputs.

use crate::config::SessionConfig;
use crate::engine::Run;
use crate::error::{ErrorReport, SchemaError};
use crate::params::Params;
use crate::registry::RuleRegistry;
use crate::schema::SchemaNode;
use serde_json::Value;
use std::sync::Arc;

/// A schema bound to a rule registry and configuration.
///
/// The schema is compiled once at construction. Each call to
/// [`Session::check`] or [`Session::validate`] works on its own copy of the
/// input, so one session can serve many threads at once.
///
/// ## Example
///
/// ```rust
/// use paramguard::Session;
/// use serde_json::json;
///
/// let session = Session::new(json!({
///     "name": { "type": "String", "required": true }
/// }))
/// .unwrap();
///
/// assert_eq!(session.check(&json!({"name": "Al"})).unwrap(), json!({"name": "Al"}));
///
/// let report = session.check(&json!({})).unwrap_err();
/// assert_eq!(
///     report.entry("name", "required").unwrap().message,
///     "This parameter is required."
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    root: Arc<SchemaNode>,
    fields: Vec<String>,
    registry: Arc<RuleRegistry>,
    config: SessionConfig,
}

impl Session {
    /// Compile `schema` against the global rule registry.
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        Self::builder(schema).build()
    }

    /// Start configuring a session for `schema`.
    pub fn builder(schema: Value) -> SessionBuilder {
        SessionBuilder::new(schema)
    }

    /// Validate parameters read from `params`.
    ///
    /// Returns the sanitized, schema-shaped output on success or the error
    /// report of the first failing rule.
    pub fn check<P: Params + ?Sized>(&self, params: &P) -> Result<Value, ErrorReport> {
        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        self.validate(params.to_input(&fields))
    }

    /// Validate an input tree.
    ///
    /// Defaults are written into the input as the run goes, so rules on later
    /// fields observe them through [`RuleContext::input`].
    ///
    /// [`RuleContext::input`]: crate::RuleContext::input
    pub fn validate(&self, input: Value) -> Result<Value, ErrorReport> {
        Run::new(input, self.config.debug).execute(&self.root)
    }

    /// The compiled schema root.
    pub fn schema(&self) -> &SchemaNode {
        &self.root
    }

    /// The registry the schema was compiled against.
    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// The session's configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Builder for constructing a [`Session`].
#[derive(Debug)]
pub struct SessionBuilder {
    schema: Value,
    registry: Option<Arc<RuleRegistry>>,
    config: SessionConfig,
}

impl SessionBuilder {
    /// Create a builder for `schema`.
    pub fn new(schema: Value) -> Self {
        Self {
            schema,
            registry: None,
            config: SessionConfig::default(),
        }
    }

    /// Compile against `registry` instead of the global one.
    pub fn registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use `config` for every run.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Render offending values into error entries.
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Compile the schema and build the session.
    pub fn build(self) -> Result<Session, SchemaError> {
        let registry = self.registry.unwrap_or_else(RuleRegistry::global);
        let root = SchemaNode::compile_root(&self.schema, &registry)?;
        let fields = root.fields().map(|(name, _)| name.to_string()).collect();

        tracing::debug!(fields = ?fields, debug = self.config.debug, "Compiled schema");

        Ok(Session {
            root: Arc::new(root),
            fields,
            registry,
            config: self.config,
        })
    }
}
