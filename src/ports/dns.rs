use crate::domain::Result;
use std::net::Ipv4Addr;

/// Port for forward DNS lookups used by the PAC helper functions
pub trait DnsPort: Send + Sync {
    /// Resolve a hostname to its IPv4 addresses, in resolver order
    ///
    /// Blocks the calling thread. Implementations should bound the time
    /// spent on a single lookup.
    fn resolve_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>>;
}
