//! Upstream endpoint and HTTP client settings.

use maz_core::Endpoints;
use serde::{Deserialize, Serialize};

const fn default_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    "maz/0.1".to_string()
}

fn default_probe_addr() -> String {
    "graph.microsoft.com:443".to_string()
}

const fn default_probe_timeout_ms() -> u64 {
    1_500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Fixed per-request timeout. There is no retry.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// `host:port` dialled to decide whether the network is reachable.
    #[serde(default = "default_probe_addr")]
    pub probe_addr: String,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            probe_addr: default_probe_addr(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EndpointsConfig {
    #[serde(default)]
    pub graph_url: String,

    #[serde(default)]
    pub arm_url: String,
}

impl EndpointsConfig {
    /// Configured endpoints, with the public cloud filling any blanks.
    pub fn resolve(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            graph_url: if self.graph_url.is_empty() {
                defaults.graph_url
            } else {
                self.graph_url.clone()
            },
            arm_url: if self.arm_url.is_empty() {
                defaults.arm_url
            } else {
                self.arm_url.clone()
            },
        }
    }
}
