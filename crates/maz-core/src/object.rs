//! Remote objects as mirrored from the directory and resource-manager APIs.
//!
//! Server objects are heterogeneous JSON documents. A [`RemoteObject`] keeps
//! the whole document as an attribute map and lifts out the one attribute
//! that identifies it within its collection. Accessors never panic on a
//! missing or differently-typed attribute; they fall back to an explicit
//! default instead.

use serde_json::{Map, Value};

use crate::errors::CoreError;

/// Attribute present on delta records that represent a deletion.
pub const REMOVED_MARKER: &str = "@removed";

/// Attribute present on group delta records that only describe membership
/// churn. These carry no mergeable group state.
pub const MEMBERS_DELTA_MARKER: &str = "members@delta";

/// The persisted, id-unique sequence of objects for one collection.
pub type EntitySnapshot = Vec<RemoteObject>;

/// A single server object: a stable id plus its full attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteObject {
    /// Identity within the collection (the `id` or `name` attribute).
    pub id: String,
    /// Every attribute the server returned, identity attribute included.
    pub attrs: Map<String, Value>,
}

impl RemoteObject {
    /// Build an object from a JSON document, reading its identity from `id_attr`.
    ///
    /// A missing identity attribute yields an empty id rather than an error;
    /// only non-object documents are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Malformed`] if `value` is not a JSON object.
    pub fn from_value(value: Value, id_attr: &str) -> Result<Self, CoreError> {
        match value {
            Value::Object(attrs) => {
                let id = attrs
                    .get(id_attr)
                    .map(scalar_text)
                    .unwrap_or_default();
                Ok(Self { id, attrs })
            }
            other => Err(CoreError::Malformed(format!(
                "expected a JSON object, got {}",
                kind_name(&other)
            ))),
        }
    }

    /// Convert a batch of JSON documents, skipping (and counting) non-objects
    /// and objects without an identity. Snapshots are keyed on id, so an
    /// id-less record cannot be merged or deduplicated.
    pub fn from_values(values: Vec<Value>, id_attr: &str) -> (Vec<Self>, usize) {
        let mut skipped = 0;
        let objects = values
            .into_iter()
            .filter_map(|v| match Self::from_value(v, id_attr) {
                Ok(x) if !x.id.is_empty() => Some(x),
                _ => {
                    skipped += 1;
                    None
                }
            })
            .collect();
        (objects, skipped)
    }

    /// Consume the object, returning its JSON document.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.attrs)
    }

    /// `true` for delta records that must not be merged as live state:
    /// deletions and membership-only group records.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.attrs.contains_key(REMOVED_MARKER) || self.attrs.contains_key(MEMBERS_DELTA_MARKER)
    }

    /// String attribute, or `""` when missing or not a string.
    #[must_use]
    pub fn str_attr(&self, key: &str) -> &str {
        self.attrs.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// Boolean attribute, or `false` when missing or not a boolean.
    #[must_use]
    pub fn bool_attr(&self, key: &str) -> bool {
        self.attrs.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Nested string attribute addressed by a JSON pointer such as
    /// `/properties/roleName`, or `""`.
    #[must_use]
    pub fn pointer_str(&self, pointer: &str) -> &str {
        let mut segments = pointer.trim_start_matches('/').split('/');
        let Some(first) = segments.next() else {
            return "";
        };
        let mut current = self.attrs.get(first);
        for segment in segments {
            current = current.and_then(|v| v.get(segment));
        }
        current.and_then(Value::as_str).unwrap_or("")
    }

    /// Shallow merge: every attribute of `update` overwrites this object's
    /// attribute of the same name; attributes `update` lacks are kept.
    pub fn merge_from(&mut self, update: Self) {
        for (key, value) in update.attrs {
            self.attrs.insert(key, value);
        }
    }

    /// `true` if `visit` accepts the text of any scalar value, recursing into
    /// arrays and nested objects. Attribute names are not visited.
    pub fn any_scalar_text(&self, mut visit: impl FnMut(&str) -> bool) -> bool {
        self.attrs.values().any(|v| walk_scalars(v, &mut visit))
    }
}

fn walk_scalars(value: &Value, visit: &mut impl FnMut(&str) -> bool) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => visit(s),
        Value::Bool(_) | Value::Number(_) => visit(&value.to_string()),
        Value::Array(items) => items.iter().any(|v| walk_scalars(v, visit)),
        Value::Object(map) => map.values().any(|v| walk_scalars(v, visit)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(value: Value) -> RemoteObject {
        RemoteObject::from_value(value, "id").unwrap()
    }

    #[test]
    fn identity_is_read_from_the_configured_attribute() {
        let x = RemoteObject::from_value(
            json!({"id": "/subscriptions/abc/providers/x", "name": "guid-1"}),
            "name",
        )
        .unwrap();
        assert_eq!(x.id, "guid-1");
        assert_eq!(x.str_attr("id"), "/subscriptions/abc/providers/x");
    }

    #[test]
    fn missing_identity_defaults_to_empty() {
        assert_eq!(obj(json!({"displayName": "x"})).id, "");
    }

    #[test]
    fn non_objects_are_rejected() {
        let err = RemoteObject::from_value(json!([1, 2]), "id").unwrap_err();
        assert!(matches!(err, CoreError::Malformed(_)));

        let (objects, skipped) =
            RemoteObject::from_values(vec![json!({"id": "1"}), json!("nope")], "id");
        assert_eq!(objects.len(), 1);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn batches_drop_records_without_identity() {
        let (objects, skipped) = RemoteObject::from_values(
            vec![
                json!({"id": "1"}),
                json!({"displayName": "no id"}),
                json!({"id": null, "displayName": "null id"}),
            ],
            "id",
        );
        assert_eq!(objects, vec![obj(json!({"id": "1"}))]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn tombstone_markers() {
        assert!(obj(json!({"id": "1", "@removed": {"reason": "deleted"}})).is_tombstone());
        assert!(obj(json!({"id": "1", "members@delta": []})).is_tombstone());
        assert!(!obj(json!({"id": "1", "displayName": "g"})).is_tombstone());
    }

    #[test]
    fn accessors_fall_back_to_defaults() {
        let x = obj(json!({"id": "1", "enabled": "yes", "properties": {"roleName": "Reader"}}));
        assert_eq!(x.str_attr("missing"), "");
        assert!(!x.bool_attr("enabled"));
        assert_eq!(x.pointer_str("/properties/roleName"), "Reader");
        assert_eq!(x.pointer_str("/properties/missing/deeper"), "");
    }

    #[test]
    fn merge_overwrites_present_and_keeps_absent() {
        let mut base = obj(json!({"id": "1", "a": "x", "b": "y"}));
        base.merge_from(obj(json!({"id": "1", "a": "z"})));
        assert_eq!(base.into_value(), json!({"id": "1", "a": "z", "b": "y"}));
    }

    #[test]
    fn scalar_walk_reaches_nested_values() {
        let x = obj(json!({"id": "1", "tags": [{"k": "needle"}], "n": 42}));
        assert!(x.any_scalar_text(|s| s == "needle"));
        assert!(x.any_scalar_text(|s| s == "42"));
        assert!(!x.any_scalar_text(|s| s == "tags"));
    }
}
