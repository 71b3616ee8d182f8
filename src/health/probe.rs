//! TCP reachability probe.
//!
//! # Responsibilities
//! - Resolve a dependency's host name
//! - Attempt one TCP connection, bounded by a timeout
//! - Close the connection immediately (zero-I/O probe)

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{lookup_host, TcpStream};

use crate::config::DependencyCheck;
use crate::resilience::timeouts::{with_timeout, Elapsed};

/// Why a single probe attempt failed. All variants are transient.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("could not resolve {host}: {source}")]
    Resolve { host: String, source: io::Error },

    #[error("{host} resolved to no addresses")]
    NoAddresses { host: String },

    #[error("connection to {addr} failed: {source}")]
    Connect { addr: SocketAddr, source: io::Error },

    #[error("connect {0}")]
    Timeout(#[from] Elapsed),
}

impl ProbeError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Resolve { .. } | ProbeError::NoAddresses { .. } => "resolve",
            ProbeError::Connect { .. } => "refused",
            ProbeError::Timeout(_) => "timeout",
        }
    }
}

/// Attempt one connection to `dep`, trying each resolved address in turn.
///
/// Returns the peer address that accepted the connection.
pub async fn probe_tcp(dep: &DependencyCheck, timeout: Duration) -> Result<SocketAddr, ProbeError> {
    with_timeout(timeout, connect_any(dep)).await
}

async fn connect_any(dep: &DependencyCheck) -> Result<SocketAddr, ProbeError> {
    let addrs = lookup_host((dep.host.as_str(), dep.port))
        .await
        .map_err(|source| ProbeError::Resolve {
            host: dep.host.clone(),
            source,
        })?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                tracing::trace!(dependency = %dep.label, %addr, "Probe connected");
                drop(stream);
                return Ok(addr);
            }
            Err(source) => last_err = Some(ProbeError::Connect { addr, source }),
        }
    }

    Err(last_err.unwrap_or_else(|| ProbeError::NoAddresses {
        host: dep.host.clone(),
    }))
}
