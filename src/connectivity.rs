//! Network reachability checks.

use async_trait::async_trait;
use log::debug;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// Answers whether the network is reachable before a request is attempted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_reachable(&self) -> bool;
}

/// Default time allowed for each probe connection.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Probes reachability by opening a TCP connection to well-known hosts.
/// The network counts as reachable if any connection succeeds.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    targets: Vec<SocketAddr>,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(targets: Vec<SocketAddr>, timeout: Duration) -> Self {
        Self { targets, timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(
            vec![
                SocketAddr::from(([1, 1, 1, 1], 53)),
                SocketAddr::from(([8, 8, 8, 8], 53)),
            ],
            DEFAULT_PROBE_TIMEOUT,
        )
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    #[tracing::instrument(level = "trace", skip(self))]
    async fn is_reachable(&self) -> bool {
        for target in &self.targets {
            match tokio::time::timeout(self.timeout, TcpStream::connect(target)).await {
                Ok(Ok(_)) => {
                    debug!("Network reachable via {}", target);
                    return true;
                }
                Ok(Err(e)) => debug!("Probe to {} failed: {}", target, e),
                Err(_) => debug!("Probe to {} timed out after {:?}", target, self.timeout),
            }
        }
        false
    }
}
