use crate::config::EngineConfig;
use crate::domain::{PacError, Result};
use crate::ports::DnsPort;
use crate::worker::DeadlineRunner;
use log::{debug, warn};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

type Lookup = fn(&str) -> io::Result<Vec<SocketAddr>>;

fn getaddrinfo(host: &str) -> io::Result<Vec<SocketAddr>> {
    (host, 0).to_socket_addrs().map(|addrs| addrs.collect())
}

/// Lookups through the operating system resolver.
///
/// `getaddrinfo` has no timeout of its own, so each lookup runs on its own
/// thread and is abandoned once `timeout` expires. Abandoned lookups still
/// count against the thread limit; past it, lookups fail at once.
pub struct SystemDnsResolver {
    timeout: Duration,
    workers: DeadlineRunner,
    lookup: Lookup,
}

impl SystemDnsResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            workers: DeadlineRunner::new("nanopac-dns", EngineConfig::default().dns_thread_limit),
            lookup: getaddrinfo,
        }
    }

    pub fn with_thread_limit(mut self, limit: usize) -> Self {
        self.workers = DeadlineRunner::new("nanopac-dns", limit);
        self
    }

    #[cfg(test)]
    fn with_lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = lookup;
        self
    }

    /// Lookup threads still running, timed-out ones included.
    pub fn pending_lookups(&self) -> usize {
        self.workers.running()
    }
}

impl DnsPort for SystemDnsResolver {
    fn resolve_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>> {
        let lookup = self.lookup;
        let target = host.to_string();
        let addrs = match self.workers.run(self.timeout, move || lookup(&target)) {
            Ok(Ok(addrs)) => addrs,
            Ok(Err(e)) => {
                debug!("lookup of {} failed: {}", host, e);
                return Err(PacError::ResolutionFailed(format!("{}: {}", host, e)));
            }
            Err(e) => {
                warn!("lookup of {} abandoned: {}", host, e);
                return Err(PacError::ResolutionFailed(format!("{}: {}", host, e)));
            }
        };

        let v4: Vec<Ipv4Addr> = addrs
            .into_iter()
            .filter_map(|addr| match addr.ip() {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
            .collect();
        if v4.is_empty() {
            return Err(PacError::ResolutionFailed(format!("{}: no IPv4 address", host)));
        }
        debug!("resolved {} to {:?}", host, v4);
        Ok(v4)
    }
}
