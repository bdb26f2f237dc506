//! Rule handlers and the registry that maps rule names to them.

use crate::context::RuleContext;
use crate::error::RegistryError;
use crate::rules::{LengthRule, TestRule, TypeRule};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// A pluggable validator for one named schema rule.
///
/// Handlers receive a [`RuleContext`] and record zero or more errors through
/// it. They return nothing; the engine decides what happens next by looking
/// at the run's error report.
///
/// Any `Fn(&mut RuleContext<'_>)` closure is a handler.
///
/// ## Example
///
/// ```rust
/// use paramguard::{RuleContext, RuleHandler};
///
/// struct Positive;
///
/// impl RuleHandler for Positive {
///     fn apply(&self, rule: &mut RuleContext<'_>) {
///         if rule.data().and_then(|v| v.as_f64()).is_some_and(|n| n <= 0.0) {
///             rule.error("Must be positive.");
///         }
///     }
/// }
/// ```
pub trait RuleHandler: Send + Sync {
    /// Check the field described by `rule`.
    fn apply(&self, rule: &mut RuleContext<'_>);

    /// Specialize the handler for one schema argument.
    ///
    /// Called once per rule entry while a schema is compiled. `Ok(None)`
    /// keeps this handler; an `Err` rejects the schema with the given reason.
    fn bind(&self, argument: &Value) -> Result<Option<Arc<dyn RuleHandler>>, String> {
        let _ = argument;
        Ok(None)
    }
}

impl<F> RuleHandler for F
where
    F: Fn(&mut RuleContext<'_>) + Send + Sync,
{
    fn apply(&self, rule: &mut RuleContext<'_>) {
        self(rule)
    }
}

/// A handler together with how its schema argument is shaped.
#[derive(Clone)]
pub struct Registration {
    handler: Arc<dyn RuleHandler>,
    container_argument: bool,
}

impl Registration {
    /// The registered handler.
    pub fn handler(&self) -> &Arc<dyn RuleHandler> {
        &self.handler
    }

    /// Whether an object under this rule's key is the rule's own argument
    /// rather than a nested field schema.
    pub fn container_argument(&self) -> bool {
        self.container_argument
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("container_argument", &self.container_argument)
            .finish_non_exhaustive()
    }
}

static GLOBAL: OnceLock<Arc<RuleRegistry>> = OnceLock::new();

/// Mapping from rule name to handler.
///
/// Names are matched case-insensitively. The registry is filled once, before
/// any schema is compiled against it, and is only read afterwards.
///
/// ## Example
///
/// ```rust
/// use paramguard::{RuleContext, RuleRegistry};
///
/// let mut registry = RuleRegistry::with_builtins();
/// registry.register("even", false, |rule: &mut RuleContext<'_>| {
///     if rule.data().and_then(|v| v.as_i64()).is_some_and(|n| n % 2 != 0) {
///         rule.error("Must be even.");
///     }
/// });
/// assert!(registry.lookup("EVEN").is_some());
/// ```
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Registration>,
}

impl RuleRegistry {
    /// Create a registry with no rules at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in `type`, `length` and `test` rules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry
            .register("type", false, TypeRule)
            .register("length", true, LengthRule)
            .register("test", false, TestRule);
        registry
    }

    /// Install `handler` under `name`, replacing any earlier rule of that name.
    ///
    /// Set `container_argument` for rules whose argument may be an object,
    /// such as `length: {min, max}`.
    pub fn register(
        &mut self,
        name: impl AsRef<str>,
        container_argument: bool,
        handler: impl RuleHandler + 'static,
    ) -> &mut Self {
        self.register_arc(name, container_argument, Arc::new(handler))
    }

    /// Install a shared handler under `name`.
    pub fn register_arc(
        &mut self,
        name: impl AsRef<str>,
        container_argument: bool,
        handler: Arc<dyn RuleHandler>,
    ) -> &mut Self {
        let name = name.as_ref().to_lowercase();
        debug!(rule = %name, container_argument, "Registering rule");
        self.rules.insert(
            name,
            Registration {
                handler,
                container_argument,
            },
        );
        self
    }

    /// Find the rule registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<&Registration> {
        match self.rules.get(name) {
            Some(registration) => Some(registration),
            None => self.rules.get(&name.to_lowercase()),
        }
    }

    /// Whether a rule is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Names of all registered rules.
    pub fn names(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Make this registry the process-wide one.
    ///
    /// Must run at startup, before the first call to [`RuleRegistry::global`];
    /// fails once a global registry exists.
    pub fn install(self) -> Result<Arc<RuleRegistry>, RegistryError> {
        let registry = Arc::new(self);
        GLOBAL
            .set(Arc::clone(&registry))
            .map_err(|_| RegistryError::AlreadyInstalled)?;
        info!(rules = registry.len(), "Installed global rule registry");
        Ok(registry)
    }

    /// The process-wide registry. Defaults to [`RuleRegistry::with_builtins`]
    /// when nothing was installed.
    pub fn global() -> Arc<RuleRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::with_builtins())))
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort_unstable();
        f.debug_struct("RuleRegistry").field("rules", &names).finish()
    }
}
