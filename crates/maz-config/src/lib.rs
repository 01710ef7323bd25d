//! # maz-config
//!
//! Layered configuration loading for maz using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`MAZ_*` prefix, `__` as separator)
//! 2. Project-level `.maz/config.toml`
//! 3. User-level `~/.config/maz/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `MAZ_TENANT_ID` -> `tenant_id`, `MAZ_CACHE__DIR` -> `cache.dir`,
//! `MAZ_CREDENTIALS__GRAPH_TOKEN` -> `credentials.graph_token`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use maz_config::MazConfig;
//!
//! let config = MazConfig::load_with_dotenv().expect("config");
//! let tenant = config.require_tenant().expect("tenant");
//! println!("caching for {tenant}");
//! ```

mod cache;
mod credentials;
mod error;
mod http;

pub use cache::CacheConfig;
pub use credentials::CredentialsConfig;
pub use error::ConfigError;
pub use http::{EndpointsConfig, HttpConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MazConfig {
    /// Directory tenant whose objects are cached. Prefixes every cache file.
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

impl MazConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support from the current directory.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".maz/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("MAZ_").split("__"))
    }

    /// The tenant id, which every cache operation is keyed on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] if unset, or
    /// [`ConfigError::InvalidValue`] if it could not be used in a file name.
    pub fn require_tenant(&self) -> Result<&str, ConfigError> {
        let tenant = self.tenant_id.trim();
        if tenant.is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "tenant_id".to_string(),
            });
        }
        if tenant.contains(['/', '\\']) || tenant.contains("..") {
            return Err(ConfigError::InvalidValue {
                field: "tenant_id".to_string(),
                reason: "must not contain path separators".to_string(),
            });
        }
        Ok(tenant)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("maz").join("config.toml"))
    }
}
