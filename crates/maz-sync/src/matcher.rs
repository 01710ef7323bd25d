//! Case-insensitive substring filter over cached objects.

use std::collections::{HashMap, HashSet};

use maz_core::RemoteObject;

/// Resolves an attribute holding a resource path (such as a role
/// assignment's `/properties/roleDefinitionId`) to a display name, keyed on
/// the path's last segment.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    pointer: String,
    names: HashMap<String, String>,
}

impl ReferenceResolver {
    pub fn new(pointer: impl Into<String>, names: HashMap<String, String>) -> Self {
        Self {
            pointer: pointer.into(),
            names,
        }
    }

    #[must_use]
    pub fn resolve(&self, x: &RemoteObject) -> Option<&str> {
        let reference = x.pointer_str(&self.pointer);
        let key = reference.rsplit('/').next().filter(|k| !k.is_empty())?;
        self.names.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectMatcher {
    resolver: Option<ReferenceResolver>,
}

impl ObjectMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_resolver(resolver: ReferenceResolver) -> Self {
        Self {
            resolver: Some(resolver),
        }
    }

    /// Whether any scalar attribute value (or the resolved reference name)
    /// contains `needle`, ignoring case. `needle` must already be lowercase.
    fn matches(&self, x: &RemoteObject, needle: &str) -> bool {
        let hit = |text: &str| text.to_lowercase().contains(needle);
        x.any_scalar_text(hit)
            || self
                .resolver
                .as_ref()
                .and_then(|r| r.resolve(x))
                .is_some_and(hit)
    }

    /// Objects matching `query`, in input order and unique by id. A blank
    /// query returns the input unchanged.
    #[must_use]
    pub fn filter(&self, objects: Vec<RemoteObject>, query: &str) -> Vec<RemoteObject> {
        let query = query.trim();
        if query.is_empty() {
            return objects;
        }
        let needle = query.to_lowercase();
        let mut seen = HashSet::new();
        objects
            .into_iter()
            .filter(|x| self.matches(x, &needle))
            .filter(|x| seen.insert(x.id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn users() -> Vec<RemoteObject> {
        [
            json!({"id": "1", "displayName": "Alice Smith", "userPrincipalName": "alice@contoso.com"}),
            json!({"id": "2", "displayName": "Bob", "tags": ["Finance", {"team": "payroll"}]}),
            json!({"id": "3", "displayName": "Carol", "accountEnabled": true}),
        ]
        .into_iter()
        .map(|v| RemoteObject::from_value(v, "id").unwrap())
        .collect()
    }

    fn ids(objects: &[RemoteObject]) -> Vec<&str> {
        objects.iter().map(|x| x.id.as_str()).collect()
    }

    #[test]
    fn blank_query_returns_everything() {
        assert_eq!(ObjectMatcher::new().filter(users(), "  "), users());
    }

    #[test]
    fn matching_ignores_case() {
        let hits = ObjectMatcher::new().filter(users(), "CONTOSO");
        assert_eq!(ids(&hits), ["1"]);
    }

    #[test]
    fn nested_values_are_searched_but_keys_are_not() {
        let matcher = ObjectMatcher::new();
        assert_eq!(ids(&matcher.filter(users(), "payroll")), ["2"]);
        assert!(matcher.filter(users(), "team").is_empty());
        assert!(matcher.filter(users(), "userPrincipal").is_empty());
    }

    #[test]
    fn non_string_scalars_match_by_text() {
        assert_eq!(ids(&ObjectMatcher::new().filter(users(), "true")), ["3"]);
    }

    #[test]
    fn results_are_unique_by_id() {
        let mut objects = users();
        objects.push(objects[0].clone());
        assert_eq!(ids(&ObjectMatcher::new().filter(objects, "alice")), ["1"]);
    }

    #[test]
    fn resolved_reference_names_match() {
        let assignment = RemoteObject::from_value(
            json!({
                "name": "a1",
                "properties": {
                    "roleDefinitionId": "/subscriptions/s1/providers/Microsoft.Authorization/roleDefinitions/r1",
                    "scope": "/subscriptions/s1"
                }
            }),
            "name",
        )
        .unwrap();
        let names = HashMap::from([("r1".to_string(), "Key Vault Reader".to_string())]);
        let matcher = ObjectMatcher::with_resolver(ReferenceResolver::new(
            "/properties/roleDefinitionId",
            names,
        ));

        assert_eq!(ids(&matcher.filter(vec![assignment.clone()], "vault")), ["a1"]);
        assert!(ObjectMatcher::new().filter(vec![assignment], "vault").is_empty());
    }
}
