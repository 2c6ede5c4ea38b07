//! Small shared helpers: ids, timestamps, JSON merge-patch.

use serde_json::Value;

/// Generate a new random ID (UUIDv4, no dashes).
///
/// Used for every row id and for share-link tokens, so it must stay
/// unguessable.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Apply a JSON Merge Patch (RFC 7386) to `base`, in place.
///
/// Objects merge recursively, `null` removes the key, everything else
/// (including arrays) replaces wholesale. Record updates ride on this:
/// a client clears a property's `ownerContact` by patching it to null.
pub fn merge_patch(base: &mut Value, patch: &Value) {
    let Some(patch_obj) = patch.as_object() else {
        *base = patch.clone();
        return;
    };
    if !base.is_object() {
        *base = Value::Object(serde_json::Map::new());
    }
    let base_obj = match base.as_object_mut() {
        Some(obj) => obj,
        None => return,
    };
    for (key, value) in patch_obj {
        match value {
            Value::Null => {
                base_obj.remove(key);
            }
            Value::Object(_) => {
                let entry = base_obj
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(serde_json::Map::new()));
                merge_patch(entry, value);
            }
            other => {
                base_obj.insert(key.clone(), other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_now_rfc3339() {
        let ts = now_rfc3339();
        assert!(ts.contains('T'));
    }

    #[test]
    fn test_merge_patch_record_update() {
        let mut base = serde_json::json!({
            "title": "Riverside flat",
            "price": 420000,
            "ownerContact": {"name": "Kim", "phone": "010-0000-0000"},
        });
        let patch = serde_json::json!({
            "price": 395000,
            "ownerContact": null,
            "options": {"hideAddress": true},
        });
        merge_patch(&mut base, &patch);
        assert_eq!(
            base,
            serde_json::json!({
                "title": "Riverside flat",
                "price": 395000,
                "options": {"hideAddress": true},
            })
        );
    }

    #[test]
    fn test_merge_patch_nested_and_arrays() {
        let mut base = serde_json::json!({"a": {"b": 1, "c": 2}, "tags": ["x"]});
        merge_patch(
            &mut base,
            &serde_json::json!({"a": {"c": null, "d": 3}, "tags": ["y", "z"]}),
        );
        assert_eq!(
            base,
            serde_json::json!({"a": {"b": 1, "d": 3}, "tags": ["y", "z"]})
        );
    }

    #[test]
    fn test_merge_patch_scalar_base_replaced() {
        let mut base = serde_json::json!("plain");
        merge_patch(&mut base, &serde_json::json!({"k": 1}));
        assert_eq!(base, serde_json::json!({"k": 1}));
    }
}
