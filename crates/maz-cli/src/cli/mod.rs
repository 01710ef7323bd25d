use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::{ClearArgs, Commands, CountArgs, ListArgs, ScopesArgs, TypeTarget};

/// Top-level CLI parser for the `maz` binary.
#[derive(Debug, Parser)]
#[command(
    name = "maz",
    version,
    about = "maz - cached queries over directory and authorization objects"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to print
    #[arg(short, long, global = true)]
    pub limit: Option<usize>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use maz_core::EntityType;
    use pretty_assertions::assert_eq;

    use super::{Cli, Commands, OutputFormat, TypeTarget};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_parses_type_filter_and_force() {
        let cli = Cli::try_parse_from(["maz", "list", "sp", "graph", "--force"])
            .expect("cli should parse");
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.entity, EntityType::ServicePrincipals);
        assert_eq!(args.filter.as_deref(), Some("graph"));
        assert!(args.force);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["maz", "count", "u", "--format", "raw", "--quiet"])
            .expect("cli should parse");
        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Count(_)));
    }

    #[test]
    fn clear_accepts_all_or_a_type() {
        let cli = Cli::try_parse_from(["maz", "clear", "ALL"]).expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Clear(ref args) if args.target == TypeTarget::All
        ));

        let cli = Cli::try_parse_from(["maz", "clear", "a"]).expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Clear(ref args) if args.target == TypeTarget::One(EntityType::RoleAssignments)
        ));
    }

    #[test]
    fn count_accepts_all_and_remote() {
        let cli = Cli::try_parse_from(["maz", "count", "all", "--remote"]).expect("cli should parse");
        let Commands::Count(args) = cli.command else {
            panic!("expected count");
        };
        assert!(args.remote);
        assert_eq!(args.target.entities(), EntityType::ALL.to_vec());

        let cli = Cli::try_parse_from(["maz", "count", "sp"]).expect("cli should parse");
        let Commands::Count(args) = cli.command else {
            panic!("expected count");
        };
        assert!(!args.remote);
        assert_eq!(args.target.entities(), [EntityType::ServicePrincipals]);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(Cli::try_parse_from(["maz", "list", "zz"]).is_err());
    }
}
