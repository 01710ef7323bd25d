//! Bearer-token seam.
//!
//! Acquiring tokens is somebody else's job. The transport only asks a
//! [`CredentialProvider`] for a ready token for the API a url belongs to.

use maz_config::CredentialsConfig;
use maz_core::ApiSurface;

use crate::error::SyncError;

pub trait CredentialProvider: Send + Sync {
    /// Bearer token for `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Credentials`] if no token is available.
    fn bearer(&self, surface: ApiSurface) -> Result<String, SyncError>;
}

/// Tokens handed over verbatim from configuration.
#[derive(Clone)]
pub struct StaticCredentials {
    graph: String,
    arm: String,
}

impl StaticCredentials {
    #[must_use]
    pub fn new(graph: impl Into<String>, arm: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            arm: arm.into(),
        }
    }
}

impl From<&CredentialsConfig> for StaticCredentials {
    fn from(config: &CredentialsConfig) -> Self {
        Self::new(config.graph_token.clone(), config.arm_token.clone())
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer(&self, surface: ApiSurface) -> Result<String, SyncError> {
        let (token, name) = match surface {
            ApiSurface::Graph => (&self.graph, "graph"),
            ApiSurface::ResourceManager => (&self.arm, "resource manager"),
        };
        if token.is_empty() {
            return Err(SyncError::Credentials(format!("{name} API")));
        }
        Ok(token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_token_per_surface() {
        let creds = StaticCredentials::new("g", "");
        assert_eq!(creds.bearer(ApiSurface::Graph).unwrap(), "g");
        assert!(matches!(
            creds.bearer(ApiSurface::ResourceManager),
            Err(SyncError::Credentials(_))
        ));
    }
}
