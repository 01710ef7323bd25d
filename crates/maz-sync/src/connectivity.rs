//! Network reachability check.
//!
//! A refresh is only attempted when the upstream looks reachable; otherwise
//! the persisted snapshot is served as-is.

use std::future::Future;
use std::time::Duration;

use maz_config::HttpConfig;

pub trait Connectivity: Send + Sync {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send;
}

/// Dials a TCP endpoint with a short timeout.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    #[must_use]
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(
            config.probe_addr.clone(),
            Duration::from_millis(config.probe_timeout_ms),
        )
    }
}

impl Connectivity for TcpProbe {
    async fn is_reachable(&self) -> bool {
        match tokio::time::timeout(self.timeout, tokio::net::TcpStream::connect(&self.addr)).await
        {
            Ok(Ok(_)) => true,
            Ok(Err(error)) => {
                tracing::debug!(addr = %self.addr, %error, "network probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(addr = %self.addr, "network probe timed out");
                false
            }
        }
    }
}

/// Fixed answer, for offline operation and tests.
#[derive(Debug, Clone, Copy)]
pub struct AssumeReachable(pub bool);

impl Connectivity for AssumeReachable {
    async fn is_reachable(&self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_reaches_a_local_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let probe = TcpProbe::new(addr.to_string(), Duration::from_secs(1));
        assert!(probe.is_reachable().await);
    }

    #[tokio::test]
    async fn probe_fails_on_a_closed_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let probe = TcpProbe::new(addr.to_string(), Duration::from_secs(1));
        assert!(!probe.is_reachable().await);
    }
}
