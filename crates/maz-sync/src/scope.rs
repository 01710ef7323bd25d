//! Scope flattening and per-scope aggregation.
//!
//! Role definitions and assignments are only listable per authorization
//! scope. The hierarchy (management groups, then subscriptions) is flattened
//! into a [`ScopeList`], each scope is queried in turn, and objects inherited
//! by several scopes are kept once, attributed to the first scope returning
//! them.

use std::collections::HashSet;
use std::future::Future;

use maz_core::{RemoteObject, ScopeKind, ScopeList, ScopeNode};

use crate::error::SyncError;

/// Pseudo-subscription that exists in many tenants but holds no resources.
pub const LEGACY_ACCOUNT_NAME: &str = "Access to Azure Active Directory";

/// Hierarchy node paths in server order, followed by every enabled leaf
/// account other than the legacy pseudo-account.
#[must_use]
pub fn build_scope_list(hierarchy: &[ScopeNode], accounts: &[ScopeNode]) -> ScopeList {
    let mut scopes = ScopeList::new();
    for node in hierarchy {
        scopes.push(node.path.as_str());
    }
    for account in accounts {
        if account.kind != ScopeKind::LeafAccount {
            continue;
        }
        if !account.enabled || account.display_name == LEGACY_ACCOUNT_NAME {
            tracing::debug!(path = %account.path, name = %account.display_name, "skipping account scope");
            continue;
        }
        scopes.push(account.path.as_str());
    }
    scopes
}

/// An object together with the scope it was first seen at.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedObject {
    pub scope: String,
    pub object: RemoteObject,
}

/// Query every scope in order with `fetch` and merge the results, keeping the
/// first occurrence of each id.
///
/// # Errors
///
/// The first failing scope aborts the aggregation.
pub async fn aggregate_scoped_objects<F, Fut>(
    scopes: &ScopeList,
    mut fetch: F,
) -> Result<Vec<ScopedObject>, SyncError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<RemoteObject>, SyncError>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for scope in scopes {
        let objects = fetch(scope.clone()).await?;
        let before = merged.len();
        for object in objects {
            if seen.insert(object.id.clone()) {
                merged.push(ScopedObject {
                    scope: scope.clone(),
                    object,
                });
            }
        }
        tracing::debug!(%scope, new = merged.len() - before, "aggregated scope");
    }
    Ok(merged)
}
