//! Built-in rules: `type`, `length` and `test`.
//!
//! Each is an ordinary [`RuleHandler`]; they know nothing about each other
//! and are registered by [`RuleRegistry::with_builtins`].
//!
//! [`RuleRegistry::with_builtins`]: crate::RuleRegistry::with_builtins

use crate::context::{render, RuleContext};
use crate::registry::RuleHandler;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The kinds of value a `type` rule can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl TypeTag {
    /// Parse a declared type name. Matching ignores case, so `"String"` and
    /// `"string"` both work.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" | "bool" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// The tag of a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::Null => Self::Null,
        }
    }

    /// Canonical name, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Object => "Object",
            Self::Array => "Array",
            Self::Null => "Null",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `type`: the value must be of the declared kind.
///
/// An unknown type name never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeRule;

impl RuleHandler for TypeRule {
    fn apply(&self, rule: &mut RuleContext<'_>) {
        let declared = match rule.argument() {
            Value::String(name) => name.clone(),
            other => render(other),
        };

        let matches = match (TypeTag::from_name(&declared), rule.data()) {
            (Some(expected), Some(data)) => TypeTag::of(data) == expected,
            _ => false,
        };

        if !matches {
            rule.error(format!("Invalid parameter data type, expected: {declared}"));
        }
    }
}

/// `length`: bounds on a string's character count, an array's element count
/// or a number's value.
///
/// A numeric argument demands an exact match. An object argument may carry
/// `min` and `max`; each bound is checked on its own and reported under its
/// own kind. Values without a measurable size are not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthRule;

impl LengthRule {
    fn measure(value: &Value) -> Option<f64> {
        match value {
            Value::String(s) => Some(s.chars().count() as f64),
            Value::Array(items) => Some(items.len() as f64),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

impl RuleHandler for LengthRule {
    fn apply(&self, rule: &mut RuleContext<'_>) {
        let Some(data) = rule.data() else {
            return;
        };
        let Some(actual) = Self::measure(data) else {
            return;
        };
        let suffix = if data.is_string() { " characters long." } else { "" };

        match rule.argument() {
            Value::Object(bounds) => {
                let min = bounds.get("min").and_then(Value::as_f64);
                let max = bounds.get("max").and_then(Value::as_f64);

                if let Some(min) = min.filter(|min| *min > actual) {
                    rule.error_kind("min", format!("Must be greater than {}{suffix}", number(min)));
                }
                if let Some(max) = max.filter(|max| *max < actual) {
                    rule.error_kind("max", format!("Must be less than {}{suffix}", number(max)));
                }
            }
            Value::Number(exact) => {
                if exact.as_f64() != Some(actual) {
                    rule.error(format!("Must be {exact} characters long."));
                }
            }
            _ => {}
        }
    }
}

fn number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// `test`: the stringified value must match a regular expression.
///
/// The argument is a single pattern or a list of patterns. A failing single
/// pattern is reported as `test`; a failing list entry as `test-<index>`,
/// one error per failing entry.
///
/// Patterns are compiled when the schema is compiled, once per rule entry,
/// so a malformed pattern is a [`SchemaError`](crate::SchemaError) rather
/// than a validation failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestRule;

const TEST_MESSAGE: &str = "Parameter data did not pass regex test.";

impl RuleHandler for TestRule {
    fn bind(&self, argument: &Value) -> Result<Option<Arc<dyn RuleHandler>>, String> {
        let handler: Arc<dyn RuleHandler> = Arc::new(Patterns::compile(argument)?);
        Ok(Some(handler))
    }

    fn apply(&self, rule: &mut RuleContext<'_>) {
        // Only reached when used outside a compiled schema.
        match Patterns::compile(rule.argument()) {
            Ok(patterns) => patterns.apply(rule),
            Err(reason) => {
                rule.error(format!("Parameter data could not be tested: {reason}"));
            }
        }
    }
}

/// Compiled form of a `test` argument.
#[derive(Debug)]
enum Patterns {
    Single(Regex),
    List(Vec<Regex>),
}

impl Patterns {
    fn compile(argument: &Value) -> Result<Self, String> {
        match argument {
            Value::Array(items) => items
                .iter()
                .map(Self::regex)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            single => Self::regex(single).map(Self::Single),
        }
    }

    fn regex(pattern: &Value) -> Result<Regex, String> {
        match pattern {
            Value::String(pattern) => Regex::new(pattern).map_err(|e| e.to_string()),
            other => Err(format!("pattern must be a string, found {other}")),
        }
    }
}

impl RuleHandler for Patterns {
    fn apply(&self, rule: &mut RuleContext<'_>) {
        let text = rule.data().map(render).unwrap_or_default();

        match self {
            Self::Single(regex) => {
                if !regex.is_match(&text) {
                    rule.error(TEST_MESSAGE);
                }
            }
            Self::List(regexes) => {
                for (i, regex) in regexes.iter().enumerate() {
                    if !regex.is_match(&text) {
                        rule.error_kind(format!("test-{i}"), TEST_MESSAGE);
                    }
                }
            }
        }
    }
}
