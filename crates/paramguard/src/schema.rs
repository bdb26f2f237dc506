//! Compiled schema trees.
//!
//! A schema is written as nested JSON. Each object describes one field: keys
//! naming a registered rule carry that rule's argument, `required` and
//! `default` are handled by the engine itself, and any other object-valued
//! key describes a nested field.
//!
//! ```json
//! {
//!   "name":    { "type": "String", "required": true },
//!   "age":     { "type": "Number", "length": { "min": 1, "max": 3 } },
//!   "address": { "city": { "type": "String", "default": "Oslo" } }
//! }
//! ```
//!
//! Compilation decides once which keys are rules and which are fields, so the
//! engine never has to inspect key shapes while validating.

use crate::error::SchemaError;
use crate::path;
use crate::registry::{RuleHandler, RuleRegistry};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

/// Reserved key marking a field as mandatory.
pub const REQUIRED_KEY: &str = "required";
/// Reserved key giving a field's fallback value.
pub const DEFAULT_KEY: &str = "default";

/// One rule declared on a field.
#[derive(Clone)]
pub struct RuleEntry {
    pub(crate) name: String,
    pub(crate) argument: Value,
    pub(crate) handler: Arc<dyn RuleHandler>,
}

impl RuleEntry {
    /// Lower-cased rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rule's argument as written in the schema.
    pub fn argument(&self) -> &Value {
        &self.argument
    }
}

impl fmt::Debug for RuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEntry")
            .field("name", &self.name)
            .field("argument", &self.argument)
            .finish_non_exhaustive()
    }
}

/// A rule or a nested field, in schema order.
#[derive(Debug, Clone)]
pub enum Entry {
    Rule(RuleEntry),
    Field { name: String, node: SchemaNode },
}

/// One field of a compiled schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    pub(crate) required: Option<bool>,
    pub(crate) default: Option<Value>,
    pub(crate) entries: Vec<Entry>,
}

impl SchemaNode {
    /// Compile a schema root. Every top-level key names a field.
    pub fn compile_root(schema: &Value, registry: &RuleRegistry) -> Result<Self, SchemaError> {
        let Value::Object(fields) = schema else {
            return Err(SchemaError::InvalidRoot {
                found: kind_name(schema),
            });
        };

        let mut entries = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            match value {
                Value::Object(spec) => {
                    warn_unaddressable("", name);
                    entries.push(Entry::Field {
                        name: name.clone(),
                        node: Self::compile(name, spec, registry)?,
                    });
                }
                other => {
                    warn!(field = %name, found = kind_name(other), "Ignoring non-object field schema");
                }
            }
        }

        Ok(Self {
            required: None,
            default: None,
            entries,
        })
    }

    fn compile(
        key_path: &str,
        spec: &Map<String, Value>,
        registry: &RuleRegistry,
    ) -> Result<Self, SchemaError> {
        let mut node = Self::default();

        for (key, value) in spec {
            let normalized = key.to_lowercase();

            if normalized == REQUIRED_KEY && !value.is_object() {
                node.required = Some(value.as_bool() == Some(true));
                continue;
            }
            if normalized == DEFAULT_KEY {
                node.default = (!value.is_null()).then(|| value.clone());
                continue;
            }

            let rule = registry
                .lookup(&normalized)
                .filter(|registration| !value.is_object() || registration.container_argument());

            match (rule, value) {
                (Some(registration), _) => {
                    let handler = registration
                        .handler()
                        .bind(value)
                        .map_err(|reason| SchemaError::InvalidArgument {
                            path: key_path.to_string(),
                            rule: normalized.clone(),
                            reason,
                        })?
                        .unwrap_or_else(|| Arc::clone(registration.handler()));

                    node.entries.push(Entry::Rule(RuleEntry {
                        name: normalized,
                        argument: value.clone(),
                        handler,
                    }));
                }
                (None, Value::Object(child)) => {
                    warn_unaddressable(key_path, key);
                    let child_path = path::join(key_path, key);
                    node.entries.push(Entry::Field {
                        name: key.clone(),
                        node: Self::compile(&child_path, child, registry)?,
                    });
                }
                (None, _) => {
                    trace!(path = %key_path, key = %key, "Ignoring unregistered rule");
                }
            }
        }

        Ok(node)
    }

    /// Whether the field must be present. `None` when undeclared.
    pub fn required(&self) -> Option<bool> {
        self.required
    }

    /// The declared fallback value.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Rules and nested fields in schema order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Rules declared on this field.
    pub fn rules(&self) -> impl Iterator<Item = &RuleEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Rule(rule) => Some(rule),
            Entry::Field { .. } => None,
        })
    }

    /// Nested fields of this field.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Field { name, node } => Some((name.as_str(), node)),
            Entry::Rule(_) => None,
        })
    }

    /// The nested field directly below this one.
    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        self.fields()
            .find(|(field, _)| *field == name)
            .map(|(_, node)| node)
    }

    /// The node at a dotted key path below this one. The empty path is `self`.
    pub fn node(&self, key_path: &str) -> Option<&SchemaNode> {
        path::segments(key_path).try_fold(self, |node, segment| node.field(segment))
    }
}

/// Key paths are split on `.` and skip empty segments, so such field names
/// address a different location than the one they are declared at.
fn warn_unaddressable(parent: &str, name: &str) {
    if name.is_empty() || name.contains('.') {
        warn!(
            parent = %parent,
            field = %name,
            "Field name is empty or contains '.', its values are looked up at another path"
        );
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::log_capture::capture;
    use serde_json::json;
    use tracing::Level;

    fn compile(schema: Value) -> SchemaNode {
        SchemaNode::compile_root(&schema, &RuleRegistry::with_builtins()).unwrap()
    }

    #[test]
    fn root_must_be_object() {
        let err = SchemaNode::compile_root(&json!([1]), &RuleRegistry::with_builtins()).unwrap_err();
        assert_eq!(err.to_string(), "schema root must be an object, found an array");
    }

    #[test]
    fn rules_and_reserved_keys() {
        let root = compile(json!({
            "name": {"type": "String", "required": true, "default": "anon"}
        }));
        let name = root.node("name").unwrap();

        assert_eq!(name.required(), Some(true));
        assert_eq!(name.default_value(), Some(&json!("anon")));
        let rules: Vec<&str> = name.rules().map(RuleEntry::name).collect();
        assert_eq!(rules, vec!["type"]);
        assert_eq!(name.fields().count(), 0);
    }

    #[test]
    fn rule_names_are_case_insensitive() {
        let root = compile(json!({"name": {"Type": "String", "REQUIRED": true}}));
        let name = root.node("name").unwrap();

        assert_eq!(name.required(), Some(true));
        assert_eq!(name.rules().next().unwrap().name(), "type");
    }

    #[test]
    fn required_only_true_counts() {
        let root = compile(json!({"a": {"required": "yes"}, "b": {"required": false}, "c": {}}));
        assert_eq!(root.node("a").unwrap().required(), Some(false));
        assert_eq!(root.node("b").unwrap().required(), Some(false));
        assert_eq!(root.node("c").unwrap().required(), None);
    }

    #[test]
    fn container_argument_stays_a_rule() {
        let root = compile(json!({"age": {"length": {"min": 1, "max": 3}}}));
        let age = root.node("age").unwrap();

        assert_eq!(age.rules().count(), 1);
        assert_eq!(age.rules().next().unwrap().argument(), &json!({"min": 1, "max": 3}));
    }

    #[test]
    fn object_under_plain_rule_name_is_a_field() {
        let root = compile(json!({"item": {"type": {"type": "String"}}}));
        let item = root.node("item").unwrap();

        assert_eq!(item.rules().count(), 0);
        let nested = root.node("item.type").unwrap();
        assert_eq!(nested.rules().next().unwrap().argument(), &json!("String"));
    }

    #[test]
    fn nested_fields_keep_order() {
        let root = compile(json!({
            "address": {
                "street": {"type": "String"},
                "city": {"type": "String"},
                "zip": {"test": "^\\d+$"}
            }
        }));
        let names: Vec<&str> = root.node("address").unwrap().fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["street", "city", "zip"]);
    }

    #[test]
    fn unregistered_scalar_keys_are_ignored() {
        let root = compile(json!({"name": {"label": "Name", "type": "String"}}));
        assert_eq!(root.node("name").unwrap().entries().len(), 1);
    }

    #[test]
    fn malformed_pattern_rejects_schema() {
        let err = SchemaNode::compile_root(
            &json!({"address": {"zip": {"test": ["^\\d+$", "("]}}}),
            &RuleRegistry::with_builtins(),
        )
        .unwrap_err();

        match err {
            SchemaError::InvalidArgument { path, rule, .. } => {
                assert_eq!(path, "address.zip");
                assert_eq!(rule, "test");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bound_rules_replace_registered_handler() {
        let root = compile(json!({"code": {"test": "^[A-Z]+$"}}));
        let rule = root.node("code").unwrap().rules().next().unwrap();
        let registered = RuleRegistry::with_builtins();

        assert!(!Arc::ptr_eq(&rule.handler, registered.lookup("test").unwrap().handler()));
    }

    #[test]
    fn unaddressable_field_names_warn() {
        let (root, events) = capture(|| {
            compile(json!({
                "a.b": {"required": true},
                "": {"type": "String"},
                "ok": {"inner.x": {"type": "String"}}
            }))
        });

        let warned: Vec<&str> = events
            .iter()
            .filter(|event| event.level == Level::WARN)
            .filter_map(|event| event.field("field"))
            .collect();
        assert_eq!(warned, vec!["a.b", "", "inner.x"]);
        assert!(root.node("ok").is_some());
    }

    #[test]
    fn non_object_top_level_entries_are_ignored() {
        let root = compile(json!({"name": "String", "age": {"type": "Number"}}));
        assert!(root.node("name").is_none());
        assert!(root.node("age").is_some());
    }
}
