//! Dotted key path resolution over `serde_json::Value` trees.
//!
//! Input and output trees are addressed the same way: `"address.city"`
//! names the `city` key of the `address` object. The empty path is the root.

use crate::error::PathError;
use serde_json::{Map, Value};

/// Split a key path into its segments. The empty path has none.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}

/// Build the key path of `field` below `parent`.
pub fn join(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

/// Read the value at `path`.
///
/// Object keys are followed by name and array elements by numeric index.
/// Returns `None` as soon as a segment is missing or the current value cannot
/// be descended into.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// Missing and `null` intermediates are replaced by empty objects. Any other
/// non-object intermediate is left untouched and reported as an error.
pub fn assign(root: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    let mut parts: Vec<&str> = segments(path).collect();
    let leaf = parts.pop().ok_or(PathError::EmptyPath)?;

    let mut current = root;
    for segment in parts {
        let map = as_object_mut(current, path, segment)?;
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    as_object_mut(current, path, leaf)?.insert(leaf.to_string(), value);
    Ok(())
}

fn as_object_mut<'a>(
    value: &'a mut Value,
    path: &str,
    segment: &str,
) -> Result<&'a mut Map<String, Value>, PathError> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PathError::NotAnObject {
            path: path.to_string(),
            segment: segment.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_empty_path_returns_root() {
        let root = json!({"a": 1});
        assert_eq!(resolve(&root, ""), Some(&root));
    }

    #[test]
    fn resolve_nested() {
        let root = json!({"address": {"city": "Oslo"}});
        assert_eq!(resolve(&root, "address.city"), Some(&json!("Oslo")));
        assert_eq!(resolve(&root, "address"), Some(&json!({"city": "Oslo"})));
    }

    #[test]
    fn resolve_missing_segment_is_none() {
        let root = json!({"address": {"city": "Oslo"}});
        assert_eq!(resolve(&root, "address.zip"), None);
        assert_eq!(resolve(&root, "contact.email"), None);
        assert_eq!(resolve(&root, "address.city.name"), None);
    }

    #[test]
    fn resolve_array_index() {
        let root = json!({"tags": ["a", "b"]});
        assert_eq!(resolve(&root, "tags.1"), Some(&json!("b")));
        assert_eq!(resolve(&root, "tags.2"), None);
        assert_eq!(resolve(&root, "tags.first"), None);
    }

    #[test]
    fn assign_creates_intermediates() {
        let mut root = json!({});
        assign(&mut root, "a.b.c", json!(3)).unwrap();
        assert_eq!(root, json!({"a": {"b": {"c": 3}}}));

        assign(&mut root, "a.d", json!("x")).unwrap();
        assert_eq!(root, json!({"a": {"b": {"c": 3}, "d": "x"}}));
    }

    #[test]
    fn assign_replaces_null_intermediate() {
        let mut root = json!({"a": null});
        assign(&mut root, "a.b", json!(true)).unwrap();
        assert_eq!(root, json!({"a": {"b": true}}));
    }

    #[test]
    fn assign_through_scalar_fails() {
        let mut root = json!({"a": "text"});
        let err = assign(&mut root, "a.b", json!(1)).unwrap_err();
        assert_eq!(
            err,
            PathError::NotAnObject {
                path: "a.b".to_string(),
                segment: "b".to_string()
            }
        );
        assert_eq!(root, json!({"a": "text"}));
    }

    #[test]
    fn assign_empty_path_fails() {
        let mut root = json!({});
        assert_eq!(assign(&mut root, "", json!(1)), Err(PathError::EmptyPath));
    }

    #[test]
    fn join_paths() {
        assert_eq!(join("", "name"), "name");
        assert_eq!(join("address", "city"), "address.city");
    }
}
