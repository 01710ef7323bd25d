use anyhow::Context;
use serde::Serialize;

use crate::cli::{ClearArgs, GlobalFlags, TypeTarget};
use crate::context::Store;
use crate::output::output;

#[derive(Serialize)]
struct ClearResponse {
    target: String,
    files_removed: usize,
}

/// Handle `maz clear`.
pub fn handle(args: &ClearArgs, store: &Store, flags: &GlobalFlags) -> anyhow::Result<()> {
    let (target, files_removed) = match args.target {
        TypeTarget::All => (
            "all".to_string(),
            store.clear_all().context("failed to clear cache")?,
        ),
        TypeTarget::One(entity) => (
            entity.cache_name().to_string(),
            store
                .clear(entity)
                .with_context(|| format!("failed to clear {entity} cache"))?,
        ),
    };
    if flags.quiet {
        return Ok(());
    }
    output(
        &ClearResponse {
            target,
            files_removed,
        },
        flags.format,
    )
}
