//! Generic helpers over `serde_json::Value` trees: a key-stripping visitor
//! and dotted-path access.

use serde_json::{Map, Value};

/// Remove every object entry whose key matches `is_stripped`, recursing
/// through objects and arrays. Returns how many entries were removed.
pub fn strip_keys<F>(value: &mut Value, is_stripped: &F) -> usize
where
    F: Fn(&str) -> bool,
{
    match value {
        Value::Object(map) => {
            let before = map.len();
            map.retain(|key, _| !is_stripped(key));
            let mut removed = before - map.len();
            for child in map.values_mut() {
                removed += strip_keys(child, is_stripped);
            }
            removed
        }
        Value::Array(items) => items.iter_mut().map(|item| strip_keys(item, is_stripped)).sum(),
        _ => 0,
    }
}

/// Join a dotted path and a key.
pub fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// JSON type name for messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Look up a dotted path.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |node, key| node.as_object()?.get(key))
}

/// Remove and return the value at a dotted path.
pub fn take_path(root: &mut Value, path: &str) -> Option<Value> {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (get_path_mut(root, parent)?, last),
        None => (root, path),
    };
    parent.as_object_mut()?.remove(last)
}

pub fn get_path_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.')
        .try_fold(root, |node, key| node.as_object_mut()?.get_mut(key))
}

/// Set the value at a dotted path, creating or replacing intermediate
/// objects as needed.
pub fn set_path(root: &mut Value, path: &str, value: Value) {
    let mut node = root;
    let mut keys = path.split('.').peekable();
    while let Some(key) = keys.next() {
        let map = object_mut(node);
        if keys.peek().is_none() {
            map.insert(key.to_string(), value);
            return;
        }
        node = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// View `value` as an object, replacing it with an empty one if it is
/// anything else.
pub fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was replaced with an object"),
    }
}

/// View `value` as an array, replacing it with an empty one if it is
/// anything else.
pub fn array_mut(value: &mut Value) -> &mut Vec<Value> {
    if !value.is_array() {
        *value = Value::Array(Vec::new());
    }
    match value {
        Value::Array(items) => items,
        _ => unreachable!("value was replaced with an array"),
    }
}

/// Copy every entry of `source` into `target` that `target` lacks.
pub fn fill_missing(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        target.entry(key).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_keys_recurses_into_arrays() {
        let mut doc = json!({
            "_AI说明": "x",
            "角色": { "_AI说明": "y", "名字": "零" },
            "列表": [ { "_AI说明": "z", "a": 1 }, 2 ]
        });
        let removed = strip_keys(&mut doc, &|k: &str| k == "_AI说明");
        assert_eq!(removed, 3);
        assert_eq!(doc, json!({ "角色": { "名字": "零" }, "列表": [ { "a": 1 }, 2 ] }));
    }

    #[test]
    fn test_get_and_take_path() {
        let mut doc = json!({ "状态": { "位置": { "描述": "港口" }, "声望": 3 } });
        assert_eq!(get_path(&doc, "状态.声望"), Some(&json!(3)));
        assert_eq!(get_path(&doc, "状态.声望.x"), None);

        let taken = take_path(&mut doc, "状态.位置");
        assert_eq!(taken, Some(json!({ "描述": "港口" })));
        assert_eq!(doc, json!({ "状态": { "声望": 3 } }));
        assert_eq!(take_path(&mut doc, "不存在.x"), None);
    }

    #[test]
    fn test_set_path_creates_parents() {
        let mut doc = json!({ "系统": "broken" });
        set_path(&mut doc, "系统.扩展.旧数据", json!([1]));
        assert_eq!(doc, json!({ "系统": { "扩展": { "旧数据": [1] } } }));
    }

    #[test]
    fn test_object_mut_resets_non_objects() {
        let mut v = json!(5);
        object_mut(&mut v).insert("a".to_string(), json!(1));
        assert_eq!(v, json!({ "a": 1 }));
    }

    #[test]
    fn test_fill_missing_keeps_existing() {
        let mut target = json!({ "a": 1 }).as_object().cloned().unwrap();
        let source = json!({ "a": 2, "b": 3 }).as_object().cloned().unwrap();
        fill_missing(&mut target, source);
        assert_eq!(Value::Object(target), json!({ "a": 1, "b": 3 }));
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "角色"), "角色");
        assert_eq!(join("角色", "身份"), "角色.身份");
    }
}
