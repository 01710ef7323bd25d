//! Read-side operations on a [`CacheStore`].

use std::collections::{BTreeMap, HashMap};

use maz_core::{EntitySnapshot, EntityType, RemoteObject};
use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStore;
use crate::connectivity::Connectivity;
use crate::error::SyncError;
use crate::http::{QueryTransport, RequestOptions};
use crate::matcher::{ObjectMatcher, ReferenceResolver};

const ROLE_REFERENCE_POINTER: &str = "/properties/roleDefinitionId";

/// Cached object count for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalCount {
    pub entity: &'static str,
    pub total: usize,
    /// Per-class counts for collections with a breakdown (built-in vs custom
    /// roles, native vs multi-tenant service principals).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub breakdown: BTreeMap<&'static str, usize>,
}

impl LocalCount {
    /// Count `objects` of `entity`, classifying them against `tenant`.
    #[must_use]
    pub fn of(entity: EntityType, objects: &[RemoteObject], tenant: &str) -> Self {
        let mut breakdown = BTreeMap::new();
        for x in objects {
            if let Some(class) = entity.count_class(x, tenant) {
                *breakdown.entry(class).or_insert(0) += 1;
            }
        }
        Self {
            entity: entity.cache_name(),
            total: objects.len(),
            breakdown,
        }
    }
}

impl<T: QueryTransport, P: Connectivity> CacheStore<T, P> {
    /// Objects of `entity` matching `query` (all of them when blank).
    ///
    /// Role assignments also match on the name of the role they grant.
    ///
    /// # Errors
    ///
    /// See [`CacheStore::get`].
    pub async fn find(
        &self,
        entity: EntityType,
        query: &str,
        force: bool,
    ) -> Result<EntitySnapshot, SyncError> {
        let objects = self.get(entity, force).await?;
        if query.trim().is_empty() {
            return Ok(objects);
        }
        let matcher = if entity == EntityType::RoleAssignments {
            let names = self.name_map(EntityType::RoleDefinitions).await?;
            ObjectMatcher::with_resolver(ReferenceResolver::new(ROLE_REFERENCE_POINTER, names))
        } else {
            ObjectMatcher::new()
        };
        let matched = matcher.filter(objects, query);
        tracing::debug!(%entity, query, matched = matched.len(), "filtered objects");
        Ok(matched)
    }

    /// Id to display-name map for `entity`, from its (possibly refreshed)
    /// snapshot.
    ///
    /// # Errors
    ///
    /// See [`CacheStore::get`].
    pub async fn name_map(&self, entity: EntityType) -> Result<HashMap<String, String>, SyncError> {
        let objects = self.get(entity, false).await?;
        Ok(entity.name_map(&objects))
    }

    /// Size of the persisted snapshot, with its breakdown where one applies.
    /// Never touches the network.
    #[must_use]
    pub fn count_local(&self, entity: EntityType) -> LocalCount {
        let objects = self
            .files
            .load_snapshot(entity)
            .map(|stored| stored.objects)
            .unwrap_or_default();
        LocalCount::of(entity, &objects, self.files.tenant())
    }

    /// Server-side object count, for collections that expose `$count`.
    /// `None` for the others.
    ///
    /// # Errors
    ///
    /// Returns the transport error, or [`SyncError::Parse`] if the answer is
    /// not a number.
    pub async fn count_remote(&self, entity: EntityType) -> Result<Option<u64>, SyncError> {
        let Some(url) = entity.count_url(&self.endpoints) else {
            return Ok(None);
        };
        let options = RequestOptions {
            eventual_consistency: true,
            ..RequestOptions::default()
        };
        let body = self.transport.get_json(&url, &options).await?;
        body.get("value")
            .and_then(Value::as_u64)
            .map(Some)
            .ok_or_else(|| SyncError::Parse(format!("{entity} count is not a number")))
    }

    /// Forget one collection's snapshot and cursor.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if a file cannot be removed.
    pub fn clear(&self, entity: EntityType) -> Result<usize, SyncError> {
        let removed = self.files.clear(entity)?;
        tracing::info!(%entity, removed, "cleared cache");
        Ok(removed)
    }

    /// Forget every collection cached for this tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if the cache directory cannot be cleaned.
    pub fn clear_all(&self) -> Result<usize, SyncError> {
        self.files.clear_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::AssumeReachable;
    use crate::files::SnapshotFiles;
    use crate::page::testing::ScriptedTransport;
    use maz_config::CacheConfig;
    use maz_core::Endpoints;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn objects(values: Vec<Value>, id_attr: &str) -> Vec<RemoteObject> {
        RemoteObject::from_values(values, id_attr).0
    }

    #[test]
    fn role_definitions_count_builtin_and_custom() {
        let defs = objects(
            vec![
                json!({"name": "r1", "properties": {"type": "BuiltInRole"}}),
                json!({"name": "r2", "properties": {"type": "CustomRole"}}),
                json!({"name": "r3", "properties": {"type": "BuiltInRole"}}),
            ],
            "name",
        );
        let count = LocalCount::of(EntityType::RoleDefinitions, &defs, "t1");
        assert_eq!(count.total, 3);
        assert_eq!(count.breakdown, BTreeMap::from([("builtin", 2), ("custom", 1)]));
    }

    #[test]
    fn service_principals_count_native_and_multi_tenant() {
        let sps = objects(
            vec![
                json!({"id": "1", "appOwnerOrganizationId": "t1"}),
                json!({"id": "2", "appOwnerOrganizationId": "f8cdef31-a31e-4b4a-93e4-5f571e91255a"}),
                json!({"id": "3"}),
            ],
            "id",
        );
        let count = LocalCount::of(EntityType::ServicePrincipals, &sps, "t1");
        assert_eq!(count.breakdown, BTreeMap::from([("multi_tenant", 2), ("native", 1)]));
    }

    #[test]
    fn plain_collections_serialize_without_breakdown() {
        let users = objects(vec![json!({"id": "1"})], "id");
        let count = LocalCount::of(EntityType::Users, &users, "t1");
        assert_eq!(
            serde_json::to_value(&count).unwrap(),
            json!({"entity": "users", "total": 1})
        );
    }

    #[tokio::test]
    async fn remote_count_asks_for_eventual_consistency() {
        let dir = tempfile::tempdir().unwrap();
        let endpoints = Endpoints::default();
        let url = EntityType::Groups.count_url(&endpoints).unwrap();
        let store = CacheStore::new(
            SnapshotFiles::new(dir.path(), "t1"),
            ScriptedTransport::default().with(&url, json!({"value": 42})),
            AssumeReachable(true),
            CacheConfig::default(),
            endpoints,
        );

        assert_eq!(store.count_remote(EntityType::Groups).await.unwrap(), Some(42));
        assert_eq!(store.count_remote(EntityType::Subscriptions).await.unwrap(), None);
        let calls = store.transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.eventual_consistency);
    }
}
