use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// One JSON Patch operation as sent in `STATE_DELTA` events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    Add { path: String, value: Value },
    Replace { path: String, value: Value },
    Remove { path: String },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("invalid pointer {0}")]
    InvalidPointer(String),
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("unsupported patch operation")]
    Unsupported,
}

/// Applies all operations or none of them.
pub fn apply_patch(doc: &mut Value, ops: &[PatchOp]) -> Result<(), PatchError> {
    let mut patched = doc.clone();
    for op in ops {
        apply_one(&mut patched, op)?;
    }
    *doc = patched;
    Ok(())
}

fn apply_one(doc: &mut Value, op: &PatchOp) -> Result<(), PatchError> {
    match op {
        PatchOp::Add { path, value } => insert(doc, path, value.clone(), false),
        PatchOp::Replace { path, value } => insert(doc, path, value.clone(), true),
        PatchOp::Remove { path } => remove(doc, path),
        PatchOp::Unsupported => Err(PatchError::Unsupported),
    }
}

fn split_pointer(path: &str) -> Result<(String, String), PatchError> {
    if path.is_empty() {
        return Ok((String::new(), String::new()));
    }
    if !path.starts_with('/') {
        return Err(PatchError::InvalidPointer(path.to_string()));
    }
    let (parent, last) = path.rsplit_once('/').unwrap_or(("", path));
    Ok((parent.to_string(), last.replace("~1", "/").replace("~0", "~")))
}

fn insert(doc: &mut Value, path: &str, value: Value, replace: bool) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, key) = split_pointer(path)?;
    let target = doc
        .pointer_mut(&parent)
        .ok_or_else(|| PatchError::PathNotFound(path.to_string()))?;

    match target {
        Value::Object(map) => {
            if replace && !map.contains_key(&key) {
                return Err(PatchError::PathNotFound(path.to_string()));
            }
            map.insert(key, value);
            Ok(())
        }
        Value::Array(items) => {
            if key == "-" && !replace {
                items.push(value);
                return Ok(());
            }
            let index = parse_index(&key, path)?;
            if replace {
                let slot = items
                    .get_mut(index)
                    .ok_or_else(|| PatchError::PathNotFound(path.to_string()))?;
                *slot = value;
            } else {
                if index > items.len() {
                    return Err(PatchError::PathNotFound(path.to_string()));
                }
                items.insert(index, value);
            }
            Ok(())
        }
        _ => Err(PatchError::PathNotFound(path.to_string())),
    }
}

fn remove(doc: &mut Value, path: &str) -> Result<(), PatchError> {
    let (parent, key) = split_pointer(path)?;
    let target = doc
        .pointer_mut(&parent)
        .ok_or_else(|| PatchError::PathNotFound(path.to_string()))?;

    let removed = match target {
        Value::Object(map) => map.remove(&key).is_some(),
        Value::Array(items) => {
            let index = parse_index(&key, path)?;
            if index < items.len() {
                items.remove(index);
                true
            } else {
                false
            }
        }
        _ => false,
    };
    if removed {
        Ok(())
    } else {
        Err(PatchError::PathNotFound(path.to_string()))
    }
}

fn parse_index(key: &str, path: &str) -> Result<usize, PatchError> {
    key.parse()
        .map_err(|_| PatchError::InvalidPointer(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ops(raw: Value) -> Vec<PatchOp> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn add_replace_remove_on_objects() {
        let mut doc = json!({"llm_status": "Thinking", "summary_data": null});
        let patch = ops(json!([
            {"op": "replace", "path": "/llm_status", "value": "Counting"},
            {"op": "add", "path": "/final_count", "value": {"word_count": 3}},
            {"op": "remove", "path": "/summary_data"}
        ]));
        apply_patch(&mut doc, &patch).unwrap();
        assert_eq!(doc, json!({"llm_status": "Counting", "final_count": {"word_count": 3}}));
    }

    #[test]
    fn array_append_and_escaped_keys() {
        let mut doc = json!({"messages": [], "a/b": 1});
        let patch = ops(json!([
            {"op": "add", "path": "/messages/-", "value": "hi"},
            {"op": "replace", "path": "/a~1b", "value": 2}
        ]));
        apply_patch(&mut doc, &patch).unwrap();
        assert_eq!(doc, json!({"messages": ["hi"], "a/b": 2}));
    }

    #[test]
    fn failed_patch_leaves_document_untouched() {
        let mut doc = json!({"llm_status": "Thinking"});
        let patch = ops(json!([
            {"op": "replace", "path": "/llm_status", "value": "Counting"},
            {"op": "remove", "path": "/missing"}
        ]));
        assert_eq!(
            apply_patch(&mut doc, &patch),
            Err(PatchError::PathNotFound("/missing".to_string()))
        );
        assert_eq!(doc, json!({"llm_status": "Thinking"}));
    }

    #[test]
    fn move_is_reported_as_unsupported() {
        let mut doc = json!({});
        let patch = ops(json!([{"op": "move", "from": "/a", "path": "/b"}]));
        assert_eq!(apply_patch(&mut doc, &patch), Err(PatchError::Unsupported));
    }
}
