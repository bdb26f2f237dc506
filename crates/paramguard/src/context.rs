//! The view of a validation run handed to each rule handler.

use crate::error::{ErrorEntry, ErrorReport};
use serde_json::Value;

/// Everything a rule handler may inspect for one invocation.
///
/// Handlers report failures through [`RuleContext::error`] or
/// [`RuleContext::error_kind`]; the engine checks the run's report after the
/// handler returns and stops the run if anything was recorded.
///
/// ## Example
///
/// ```rust
/// use paramguard::RuleContext;
///
/// fn even(rule: &mut RuleContext<'_>) {
///     if rule.data().and_then(|v| v.as_i64()).is_some_and(|n| n % 2 != 0) {
///         rule.error("Must be even.");
///     }
/// }
/// ```
pub struct RuleContext<'a> {
    rule: &'a str,
    argument: &'a Value,
    path: &'a str,
    data: Option<&'a Value>,
    input: &'a Value,
    errors: &'a mut ErrorReport,
    debug: bool,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        rule: &'a str,
        argument: &'a Value,
        path: &'a str,
        data: Option<&'a Value>,
        input: &'a Value,
        errors: &'a mut ErrorReport,
        debug: bool,
    ) -> Self {
        Self {
            rule,
            argument,
            path,
            data,
            input,
            errors,
            debug,
        }
    }

    /// Name of the rule being applied, in lower case.
    pub fn rule(&self) -> &'a str {
        self.rule
    }

    /// The argument declared for this rule in the schema.
    pub fn argument(&self) -> &'a Value {
        self.argument
    }

    /// Dotted key path of the field under validation.
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// The field's value, after default substitution.
    pub fn data(&self) -> Option<&'a Value> {
        self.data
    }

    /// The complete input tree, for rules that compare fields.
    pub fn input(&self) -> &'a Value {
        self.input
    }

    /// Record an error under this rule's own name.
    pub fn error(&mut self, message: impl Into<String>) -> &ErrorReport {
        let kind = self.rule.to_string();
        self.error_kind(kind, message)
    }

    /// Record an error under an explicit kind such as `"min"` or `"test-0"`.
    ///
    /// Returns the run's report as it stands after the write.
    pub fn error_kind(&mut self, kind: impl Into<String>, message: impl Into<String>) -> &ErrorReport {
        let mut entry = ErrorEntry::new(message);
        if self.debug {
            if let Some(data) = self.data {
                entry = entry.with_value(render(data));
            }
        }
        self.errors.add(self.path, kind, entry);
        &*self.errors
    }

    /// Whether the run has recorded any error so far.
    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }
}

impl std::fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContext")
            .field("rule", &self.rule)
            .field("argument", &self.argument)
            .field("path", &self.path)
            .field("data", &self.data)
            .field("errors", &self.errors.len())
            .finish()
    }
}

/// Text form of a value: strings verbatim, everything else as compact JSON.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
