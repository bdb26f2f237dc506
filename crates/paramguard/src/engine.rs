//! The recursive validation engine.
//!
//! Walks a compiled [`SchemaNode`] tree and the input tree in lockstep. Each
//! visit resolves the field's value, applies `default` and `required`, runs
//! the field's rules and nested fields in schema order, and finally copies
//! leaf values into the output tree. The first recorded error stops the whole
//! run.

use crate::context::RuleContext;
use crate::error::{ErrorEntry, ErrorReport, REQUIRED_MESSAGE};
use crate::path;
use crate::schema::{Entry, SchemaNode};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Marker returned up the recursion once the report holds an error.
#[derive(Debug)]
struct Halted;

/// State owned by one validation run.
#[derive(Debug)]
pub(crate) struct Run {
    input: Value,
    output: Value,
    errors: ErrorReport,
    debug: bool,
}

impl Run {
    pub(crate) fn new(input: Value, debug: bool) -> Self {
        Self {
            input,
            output: Value::Object(Map::new()),
            errors: ErrorReport::new(),
            debug,
        }
    }

    /// Validate every field of `root` and hand back the output or the report.
    pub(crate) fn execute(mut self, root: &SchemaNode) -> Result<Value, ErrorReport> {
        for (name, node) in root.fields() {
            if visit(node, name, &mut self).is_err() {
                debug!(
                    paths = ?self.errors.paths(),
                    errors = self.errors.len(),
                    "Validation failed"
                );
                return Err(self.errors);
            }
        }
        Ok(self.output)
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    value.map_or(true, Value::is_null)
}

fn lookup<'a>(input: &'a Value, key_path: &str, fallback: Option<&'a Value>) -> Option<&'a Value> {
    path::resolve(input, key_path)
        .filter(|value| !value.is_null())
        .or(fallback)
}

fn visit(node: &SchemaNode, key_path: &str, run: &mut Run) -> Result<(), Halted> {
    let mut fallback = None;

    if is_absent(path::resolve(&run.input, key_path)) {
        if let Some(default) = node.default_value() {
            trace!(path = %key_path, "Substituting default");
            if let Err(e) = path::assign(&mut run.input, key_path, default.clone()) {
                debug!(path = %key_path, error = %e, "Default not written into input");
            }
            fallback = Some(default);
        }
    }

    let absent = is_absent(lookup(&run.input, key_path, fallback));
    let mut skip_rules = false;

    if absent {
        match node.required() {
            Some(true) => {
                trace!(path = %key_path, "Required parameter missing");
                run.errors
                    .add(key_path, "required", ErrorEntry::new(REQUIRED_MESSAGE));
                return Err(Halted);
            }
            Some(false) => {
                trace!(path = %key_path, "Optional parameter absent, skipping");
                return Ok(());
            }
            // Nested fields may still be required or defaulted.
            None => skip_rules = true,
        }
    }

    for entry in node.entries() {
        match entry {
            Entry::Rule(_) if skip_rules => {}
            Entry::Rule(rule) => {
                trace!(path = %key_path, rule = %rule.name, "Applying rule");
                let data = lookup(&run.input, key_path, fallback);
                let mut ctx = RuleContext::new(
                    &rule.name,
                    &rule.argument,
                    key_path,
                    data,
                    &run.input,
                    &mut run.errors,
                    run.debug,
                );
                rule.handler.apply(&mut ctx);

                if run.errors.has_errors() {
                    return Err(Halted);
                }
            }
            Entry::Field { name, node: child } => {
                visit(child, &path::join(key_path, name), run)?;
            }
        }
    }

    // Containers are rebuilt from their validated children; a present one
    // stays in the output even when none of its children were.
    let written = match lookup(&run.input, key_path, fallback) {
        Some(data) if data.is_object() => path::resolve(&run.output, key_path)
            .is_none()
            .then(|| Value::Object(Map::new())),
        Some(data) => Some(data.clone()),
        None => None,
    };
    if let Some(value) = written {
        if let Err(e) = path::assign(&mut run.output, key_path, value) {
            debug!(path = %key_path, error = %e, "Value not written into output");
        }
    }

    Ok(())
}
