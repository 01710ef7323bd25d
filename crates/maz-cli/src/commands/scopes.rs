use std::collections::HashMap;

use anyhow::Context;
use maz_core::EntityType;
use serde::Serialize;

use crate::cli::{GlobalFlags, ScopesArgs};
use crate::context::Store;
use crate::output::output;

#[derive(Serialize)]
struct ScopeEntry {
    scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// Handle `maz scopes`.
pub async fn handle(args: &ScopesArgs, store: &Store, flags: &GlobalFlags) -> anyhow::Result<()> {
    let scopes = store
        .scope_list()
        .await
        .context("failed to build scope list")?;

    let names = if args.names {
        let mut names = store.name_map(EntityType::ManagementGroups).await?;
        names.extend(store.name_map(EntityType::Subscriptions).await?);
        names
    } else {
        HashMap::new()
    };

    let entries: Vec<ScopeEntry> = scopes
        .iter()
        .map(|scope| ScopeEntry {
            scope: scope.clone(),
            name: lookup_name(&names, scope),
        })
        .collect();
    output(&entries, flags.format)
}

/// Hierarchy nodes are keyed by full path, subscriptions by their bare id.
fn lookup_name(names: &HashMap<String, String>, scope: &str) -> Option<String> {
    names
        .get(scope)
        .or_else(|| scope.rsplit('/').next().and_then(|id| names.get(id)))
        .cloned()
}
