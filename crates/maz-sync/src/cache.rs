//! Snapshot cache with TTL-driven refresh.
//!
//! [`CacheStore::get`] serves the persisted snapshot while it is fresh and
//! refreshes it otherwise:
//!
//! | Sync mode | Refresh |
//! |-----------|---------|
//! | delta     | resume from the cursor (or walk the base url), reconcile into the snapshot |
//! | listing   | one full walk, replaces the snapshot |
//! | scoped    | one walk per scope of the [`ScopeList`], deduplicated, replaces the snapshot |
//!
//! When the network is unreachable the persisted snapshot is served as-is.
//! A failed refresh persists nothing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use maz_config::{CacheConfig, ConfigError, MazConfig};
use maz_core::{EntitySnapshot, EntityType, Endpoints, RemoteObject, ScopeList, ScopeNode, SyncMode};

use crate::connectivity::Connectivity;
use crate::delta::DeltaCycle;
use crate::error::SyncError;
use crate::files::{SnapshotFiles, StoredSnapshot};
use crate::http::{QueryTransport, RequestOptions};
use crate::page::PageWalker;
use crate::reconcile::reconcile;
use crate::scope::{aggregate_scoped_objects, build_scope_list};

/// Whether a snapshot saved at `saved_at` must be refreshed at `now`.
///
/// A snapshot exactly `ttl` old is still fresh.
#[must_use]
pub fn needs_refresh(
    saved_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    ttl: Duration,
    force: bool,
) -> bool {
    let Some(saved_at) = saved_at else {
        return true;
    };
    if force {
        return true;
    }
    chrono::Duration::from_std(ttl).map_or(true, |ttl| now.signed_duration_since(saved_at) > ttl)
}

enum DirectQuery<'u> {
    Delta(&'u str),
    Listing(&'u str),
}

pub struct CacheStore<T, P> {
    pub(crate) files: SnapshotFiles,
    pub(crate) transport: T,
    probe: P,
    config: CacheConfig,
    pub(crate) endpoints: Endpoints,
}

impl<T: QueryTransport, P: Connectivity> CacheStore<T, P> {
    pub fn new(
        files: SnapshotFiles,
        transport: T,
        probe: P,
        config: CacheConfig,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            files,
            transport,
            probe,
            config,
            endpoints,
        }
    }

    /// Build a store for the configured tenant and cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the tenant is missing or no cache directory
    /// can be determined.
    pub fn from_config(config: &MazConfig, transport: T, probe: P) -> Result<Self, ConfigError> {
        let tenant = config.require_tenant()?;
        let dir = config
            .cache
            .resolved_dir()
            .ok_or_else(|| ConfigError::NotConfigured {
                section: "cache.dir".to_string(),
            })?;
        Ok(Self::new(
            SnapshotFiles::new(dir, tenant),
            transport,
            probe,
            config.cache.clone(),
            config.endpoints.resolve(),
        ))
    }

    /// The snapshot of `entity`, refreshed first if stale or `force`d.
    ///
    /// # Errors
    ///
    /// Returns the [`SyncError`] that aborted a refresh, or an I/O error
    /// persisting its result.
    pub async fn get(&self, entity: EntityType, force: bool) -> Result<EntitySnapshot, SyncError> {
        match entity.sync_mode(&self.endpoints) {
            SyncMode::Delta { url } => self.get_direct(entity, DirectQuery::Delta(&url), force).await,
            SyncMode::Listing { url } => {
                self.get_direct(entity, DirectQuery::Listing(&url), force).await
            }
            SyncMode::Scoped { suffix } => self.get_scoped(entity, &suffix, force).await,
        }
    }

    /// Scope paths for per-scope queries, built from cached or refreshed
    /// hierarchy data.
    ///
    /// # Errors
    ///
    /// Propagates refresh failures of the hierarchy snapshots.
    pub async fn scope_list(&self) -> Result<ScopeList, SyncError> {
        let groups_url = self.endpoints.management_groups_url();
        let groups = self
            .get_direct(EntityType::ManagementGroups, DirectQuery::Listing(&groups_url), false)
            .await?;
        let subscriptions_url = self.endpoints.subscriptions_url();
        let subscriptions = self
            .get_direct(
                EntityType::Subscriptions,
                DirectQuery::Listing(&subscriptions_url),
                false,
            )
            .await?;

        let hierarchy: Vec<ScopeNode> = groups.iter().map(ScopeNode::from_management_group).collect();
        let accounts: Vec<ScopeNode> = subscriptions.iter().map(ScopeNode::from_subscription).collect();
        Ok(build_scope_list(&hierarchy, &accounts))
    }

    /// `Some(stored)` when the stored snapshot should be served, `None` when a
    /// refresh should run.
    async fn serve_cached(
        &self,
        entity: EntityType,
        stored: Option<&StoredSnapshot>,
        force: bool,
        now: DateTime<Utc>,
    ) -> Option<EntitySnapshot> {
        let ttl = self.config.ttl(entity.ttl_class());
        if !needs_refresh(stored.map(|s| s.saved_at), now, ttl, force) {
            tracing::debug!(%entity, "serving fresh snapshot");
            return Some(stored.map(|s| s.objects.clone()).unwrap_or_default());
        }
        if !self.probe.is_reachable().await {
            tracing::info!(%entity, "network unavailable, serving cached snapshot");
            return Some(stored.map(|s| s.objects.clone()).unwrap_or_default());
        }
        None
    }

    async fn get_direct(
        &self,
        entity: EntityType,
        query: DirectQuery<'_>,
        force: bool,
    ) -> Result<EntitySnapshot, SyncError> {
        let now = Utc::now();
        let stored = self.files.load_snapshot(entity);
        if let Some(objects) = self.serve_cached(entity, stored.as_ref(), force, now).await {
            return Ok(objects);
        }

        let objects = match query {
            DirectQuery::Delta(base_url) => {
                let base = stored.map(|s| s.objects).unwrap_or_default();
                let cursor = self.files.load_cursor(entity);
                let outcome = DeltaCycle::new(&self.transport, self.config.cursor_max_age())
                    .sync(base_url, cursor.as_ref(), !base.is_empty(), now)
                    .await?;
                let (delta, skipped) = RemoteObject::from_values(outcome.records, entity.id_attr());
                if skipped > 0 {
                    tracing::warn!(%entity, skipped, "ignored malformed or id-less delta records");
                }
                tracing::info!(%entity, full = outcome.full, changes = delta.len(), "applied delta");
                let merged = reconcile(base, delta);
                // Snapshot before cursor: a cursor must never run ahead of
                // the snapshot it resumes.
                self.files.save_snapshot(entity, &merged, now)?;
                self.files.save_cursor(entity, &outcome.cursor)?;
                return Ok(merged);
            }
            DirectQuery::Listing(url) => {
                let batch = PageWalker::new(&self.transport, RequestOptions::default())
                    .walk(url)
                    .await?;
                let (objects, skipped) = RemoteObject::from_values(batch.items, entity.id_attr());
                if skipped > 0 {
                    tracing::warn!(%entity, skipped, "ignored malformed or id-less records");
                }
                objects
            }
        };

        tracing::info!(%entity, count = objects.len(), "refreshed snapshot");
        self.files.save_snapshot(entity, &objects, now)?;
        Ok(objects)
    }

    async fn get_scoped(
        &self,
        entity: EntityType,
        suffix: &str,
        force: bool,
    ) -> Result<EntitySnapshot, SyncError> {
        let now = Utc::now();
        let stored = self.files.load_snapshot(entity);
        if let Some(objects) = self.serve_cached(entity, stored.as_ref(), force, now).await {
            return Ok(objects);
        }

        let scopes = self.scope_list().await?;
        let arm = self.endpoints.arm_url.trim_end_matches('/');
        let transport = &self.transport;
        let id_attr = entity.id_attr();
        let scoped = aggregate_scoped_objects(&scopes, |scope| {
            let url = format!("{arm}{scope}{suffix}");
            async move {
                let batch = PageWalker::new(transport, RequestOptions::default())
                    .walk(&url)
                    .await?;
                Ok::<_, SyncError>(RemoteObject::from_values(batch.items, id_attr).0)
            }
        })
        .await?;

        let objects: EntitySnapshot = scoped.into_iter().map(|s| s.object).collect();
        tracing::info!(%entity, scopes = scopes.len(), count = objects.len(), "refreshed scoped snapshot");
        self.files.save_snapshot(entity, &objects, now)?;
        Ok(objects)
    }
}
