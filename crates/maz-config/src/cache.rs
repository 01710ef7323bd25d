//! Local snapshot cache configuration.

use std::path::PathBuf;
use std::time::Duration;

use maz_core::TtlClass;
use serde::{Deserialize, Serialize};

/// Half an hour for frequently-mutating directory objects.
const fn default_directory_ttl_secs() -> u64 {
    1_800
}

/// One day for authorization, subscription and hierarchy data.
const fn default_authorization_ttl_secs() -> u64 {
    86_400
}

/// Delta links are honoured by the server for about 30 days; stop short of that.
const fn default_cursor_max_age_days() -> u64 {
    27
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Directory holding snapshot and cursor files. Empty means `~/.maz`.
    #[serde(default)]
    pub dir: String,

    #[serde(default = "default_directory_ttl_secs")]
    pub directory_ttl_secs: u64,

    #[serde(default = "default_authorization_ttl_secs")]
    pub authorization_ttl_secs: u64,

    #[serde(default = "default_cursor_max_age_days")]
    pub cursor_max_age_days: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: String::new(),
            directory_ttl_secs: default_directory_ttl_secs(),
            authorization_ttl_secs: default_authorization_ttl_secs(),
            cursor_max_age_days: default_cursor_max_age_days(),
        }
    }
}

impl CacheConfig {
    /// Resolved cache directory.
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        if self.dir.is_empty() {
            dirs::home_dir().map(|home| home.join(".maz"))
        } else {
            Some(PathBuf::from(&self.dir))
        }
    }

    pub const fn ttl(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Directory => Duration::from_secs(self.directory_ttl_secs),
            TtlClass::Authorization => Duration::from_secs(self.authorization_ttl_secs),
        }
    }

    pub const fn cursor_max_age(&self) -> Duration {
        Duration::from_secs(self.cursor_max_age_days * 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl(TtlClass::Directory), Duration::from_secs(1_800));
        assert_eq!(config.ttl(TtlClass::Authorization), Duration::from_secs(86_400));
        assert_eq!(config.cursor_max_age(), Duration::from_secs(27 * 86_400));
    }

    #[test]
    fn explicit_dir_wins() {
        let config = CacheConfig {
            dir: "/tmp/maz-cache".to_string(),
            ..CacheConfig::default()
        };
        assert_eq!(config.resolved_dir(), Some(PathBuf::from("/tmp/maz-cache")));
    }
}
