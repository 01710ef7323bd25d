use std::str::FromStr;

use clap::{Args, Subcommand};
use maz_core::{CoreError, EntityType};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// List cached objects of one type, optionally filtered.
    List(ListArgs),
    /// Show the authorization scopes role data is gathered from.
    Scopes(ScopesArgs),
    /// Count locally cached objects of one type, or `all`.
    Count(CountArgs),
    /// Delete cache files for one type, or `all`.
    Clear(ClearArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    /// Object type code (d, a, s, m, u, g, sp, ap, ad) or cache name.
    pub entity: EntityType,
    /// Case-insensitive substring to match against attribute values.
    pub filter: Option<String>,
    /// Refresh from upstream even if the cache is fresh.
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ScopesArgs {
    /// Include hierarchy node and subscription display names.
    #[arg(long)]
    pub names: bool,
}

#[derive(Clone, Debug, Args)]
pub struct CountArgs {
    /// Object type code or `all`.
    pub target: TypeTarget,
    /// Also ask upstream for its count, where the type supports it.
    #[arg(long)]
    pub remote: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ClearArgs {
    /// Object type code or `all`.
    pub target: TypeTarget,
}

/// One object type, or every one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeTarget {
    All,
    One(EntityType),
}

impl TypeTarget {
    #[must_use]
    pub fn entities(self) -> Vec<EntityType> {
        match self {
            Self::All => EntityType::ALL.to_vec(),
            Self::One(entity) => vec![entity],
        }
    }
}

impl FromStr for TypeTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}
