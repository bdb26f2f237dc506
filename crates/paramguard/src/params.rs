//! Sources of parameters to validate.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Something parameters can be read from.
///
/// Plain JSON trees are validated as a whole. Getter-style sources, such as
/// request wrappers, only need [`Params::param`]: the session asks for each
/// top-level schema field by name and assembles the input tree from the
/// answers.
pub trait Params {
    /// The value of one top-level parameter.
    fn param(&self, key: &str) -> Option<Value>;

    /// Build the input tree for a schema whose top-level fields are `fields`.
    fn to_input(&self, fields: &[&str]) -> Value {
        let map: Map<String, Value> = fields
            .iter()
            .filter_map(|field| self.param(field).map(|value| (field.to_string(), value)))
            .collect();
        Value::Object(map)
    }
}

impl Params for Value {
    fn param(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }

    fn to_input(&self, _fields: &[&str]) -> Value {
        match self {
            Value::Object(_) => self.clone(),
            _ => Value::Object(Map::new()),
        }
    }
}

impl Params for Map<String, Value> {
    fn param(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }

    fn to_input(&self, _fields: &[&str]) -> Value {
        Value::Object(self.clone())
    }
}

impl<S: std::hash::BuildHasher> Params for HashMap<String, String, S> {
    fn param(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Value::String)
    }
}

impl Params for BTreeMap<String, String> {
    fn param(&self, key: &str) -> Option<Value> {
        self.get(key).cloned().map(Value::String)
    }
}

impl<S: std::hash::BuildHasher> Params for HashMap<String, Value, S> {
    fn param(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl Params for () {
    fn param(&self, _key: &str) -> Option<Value> {
        None
    }
}

impl<T: Params + ?Sized> Params for &T {
    fn param(&self, key: &str) -> Option<Value> {
        (**self).param(key)
    }

    fn to_input(&self, fields: &[&str]) -> Value {
        (**self).to_input(fields)
    }
}
