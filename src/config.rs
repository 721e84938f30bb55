use crate::domain::{PacError, Result};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Loop iterations a single evaluation may run before it is aborted.
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
    /// Wall-clock budget for loading a script or answering one query.
    pub evaluation_timeout_ms: u64,
    /// Evaluation threads alive at once, including ones past their budget.
    pub evaluation_thread_limit: usize,
    pub dns_timeout_ms: u64,
    pub dns_thread_limit: usize,
    /// Returned by `myIpAddress()` when no outbound interface is found.
    pub my_ip_fallback: Ipv4Addr,
    /// UDP destination used to pick the outbound interface. Nothing is sent.
    pub probe_address: SocketAddr,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            loop_iteration_limit: 1_000_000,
            recursion_limit: 256,
            evaluation_timeout_ms: 5000,
            evaluation_thread_limit: 32,
            dns_timeout_ms: 2000,
            dns_thread_limit: 16,
            my_ip_fallback: Ipv4Addr::LOCALHOST,
            probe_address: SocketAddr::from(([198, 51, 100, 1], 53)),
        }
    }
}

impl EngineConfig {
    pub fn evaluation_timeout(&self) -> Duration {
        Duration::from_millis(self.evaluation_timeout_ms)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }

    /// The user configuration file, created with defaults when missing.
    pub fn load() -> Result<Self> {
        confy::load("nanopac", None).map_err(|e| PacError::Config(e.to_string()))
    }

    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        confy::load_path(path).map_err(|e| PacError::Config(e.to_string()))
    }
}
