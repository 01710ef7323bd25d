use crate::cli::{Commands, GlobalFlags};
use crate::context::Store;

pub mod clear;
pub mod count;
pub mod list;
pub mod scopes;

/// Route a parsed command to its handler.
pub async fn dispatch(command: Commands, store: &Store, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::List(args) => list::handle(&args, store, flags).await,
        Commands::Scopes(args) => scopes::handle(&args, store, flags).await,
        Commands::Count(args) => count::handle(&args, store, flags).await,
        Commands::Clear(args) => clear::handle(&args, store, flags),
    }
}
