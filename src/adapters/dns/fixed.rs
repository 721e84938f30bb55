use crate::domain::{PacError, Result};
use crate::ports::DnsPort;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An in-memory host table. Names are matched case-insensitively.
#[derive(Debug, Default)]
pub struct StaticDnsResolver {
    hosts: HashMap<String, Vec<Ipv4Addr>>,
    lookups: AtomicUsize,
}

impl StaticDnsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: &str, addr: Ipv4Addr) -> Self {
        self.hosts.entry(host.to_ascii_lowercase()).or_default().push(addr);
        self
    }

    /// Lookups served so far, hits and misses alike.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl DnsPort for StaticDnsResolver {
    fn resolve_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.hosts
            .get(&host.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| PacError::ResolutionFailed(format!("{}: not in host table", host)))
    }
}
