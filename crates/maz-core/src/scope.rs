//! Authorization hierarchy: scope nodes and the flattened scope list.

use serde::{Deserialize, Serialize};

use crate::object::RemoteObject;

/// Where a node sits in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Tenant root or a nested management group.
    HierarchyNode,
    /// A subscription.
    LeafAccount,
}

/// A read-only mirror of one hierarchy level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeNode {
    /// Canonical path, e.g. `/providers/Microsoft.Management/managementGroups/root`
    /// or `/subscriptions/<guid>`.
    pub path: String,
    pub display_name: String,
    pub kind: ScopeKind,
    /// Always `true` for hierarchy nodes.
    pub enabled: bool,
}

impl ScopeNode {
    /// Read a management-group listing entry.
    #[must_use]
    pub fn from_management_group(x: &RemoteObject) -> Self {
        let display = x.pointer_str("/properties/displayName");
        Self {
            path: x.str_attr("id").to_string(),
            display_name: if display.is_empty() {
                x.str_attr("name").to_string()
            } else {
                display.to_string()
            },
            kind: ScopeKind::HierarchyNode,
            enabled: true,
        }
    }

    /// Read a subscription listing entry. Only the `Enabled` state counts as
    /// enabled.
    #[must_use]
    pub fn from_subscription(x: &RemoteObject) -> Self {
        Self {
            path: x.str_attr("id").to_string(),
            display_name: x.str_attr("displayName").to_string(),
            kind: ScopeKind::LeafAccount,
            enabled: x.str_attr("state") == "Enabled",
        }
    }
}

/// Ordered, duplicate-free scope paths: hierarchy nodes first, then leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeList(Vec<String>);

impl ScopeList {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a path unless it is already present.
    pub fn push(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if path.is_empty() || self.0.contains(&path) {
            return false;
        }
        self.0.push(path);
        true
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ScopeList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn management_group_display_name_falls_back_to_name() {
        let x = RemoteObject::from_value(
            json!({"id": "/providers/Microsoft.Management/managementGroups/mg1", "name": "mg1"}),
            "id",
        )
        .unwrap();
        let node = ScopeNode::from_management_group(&x);
        assert_eq!(node.display_name, "mg1");
        assert_eq!(node.kind, ScopeKind::HierarchyNode);
        assert!(node.enabled);
    }

    #[test]
    fn subscription_state_drives_enabled() {
        let x = RemoteObject::from_value(
            json!({"id": "/subscriptions/s1", "displayName": "Prod", "state": "Disabled"}),
            "id",
        )
        .unwrap();
        let node = ScopeNode::from_subscription(&x);
        assert_eq!(node.path, "/subscriptions/s1");
        assert!(!node.enabled);
    }

    #[test]
    fn scope_list_rejects_duplicates_and_empties() {
        let mut scopes = ScopeList::new();
        assert!(scopes.push("/a"));
        assert!(!scopes.push("/a"));
        assert!(!scopes.push(""));
        assert_eq!(scopes.as_slice(), ["/a".to_string()]);
    }
}
