use anyhow::Context;
use serde_json::Value;

use crate::cli::{GlobalFlags, ListArgs};
use crate::context::Store;
use crate::output::output;

/// Handle `maz list`.
pub async fn handle(args: &ListArgs, store: &Store, flags: &GlobalFlags) -> anyhow::Result<()> {
    let query = args.filter.as_deref().unwrap_or("");
    let objects = store
        .find(args.entity, query, args.force)
        .await
        .with_context(|| format!("failed to list {}", args.entity.long_name()))?;

    let limit = flags.limit.unwrap_or(usize::MAX);
    let values: Vec<Value> = objects
        .into_iter()
        .take(limit)
        .map(maz_core::RemoteObject::into_value)
        .collect();
    output(&values, flags.format)
}
