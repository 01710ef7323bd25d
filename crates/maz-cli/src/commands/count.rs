use anyhow::Context;
use maz_sync::LocalCount;
use serde::Serialize;

use crate::cli::{CountArgs, GlobalFlags};
use crate::context::Store;
use crate::output::output;

#[derive(Serialize)]
struct CountResponse {
    #[serde(flatten)]
    local: LocalCount,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote: Option<u64>,
}

/// Handle `maz count`. Reads the local cache unless `--remote` is given.
pub async fn handle(args: &CountArgs, store: &Store, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut counts = Vec::new();
    for entity in args.target.entities() {
        let remote = if args.remote {
            store
                .count_remote(entity)
                .await
                .with_context(|| format!("failed to count {entity} upstream"))?
        } else {
            None
        };
        counts.push(CountResponse {
            local: store.count_local(entity),
            remote,
        });
    }
    match counts.as_slice() {
        [one] => output(one, flags.format),
        _ => output(&counts, flags.format),
    }
}
