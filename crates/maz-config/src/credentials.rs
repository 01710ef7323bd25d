//! Ready-made bearer tokens.
//!
//! Token acquisition happens elsewhere; maz only consumes the resulting
//! tokens, one per API.

use serde::{Deserialize, Serialize};

#[derive(Clone, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    /// Token for the directory API.
    #[serde(default)]
    pub graph_token: String,

    /// Token for the resource-manager API.
    #[serde(default)]
    pub arm_token: String,
}

impl CredentialsConfig {
    pub fn is_configured(&self) -> bool {
        !self.graph_token.is_empty() || !self.arm_token.is_empty()
    }
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |token: &str| if token.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("CredentialsConfig")
            .field("graph_token", &mask(&self.graph_token))
            .field("arm_token", &mask(&self.arm_token))
            .finish()
    }
}
