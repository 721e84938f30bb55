use super::net::parse_ipv4;
use crate::ports::DnsPort;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Resolved(Ipv4Addr),
    Failed,
}

impl Lookup {
    fn address(self) -> Option<Ipv4Addr> {
        match self {
            Lookup::Resolved(addr) => Some(addr),
            Lookup::Failed => None,
        }
    }
}

/// Lookups made during a single evaluation.
///
/// Failures are remembered as well, so a script calling `isResolvable` and then
/// `isInNet` on the same host only reaches the resolver once. Literal IPv4
/// addresses never reach it.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: RefCell<HashMap<String, Lookup>>,
    round_trips: Cell<usize>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, dns: &dyn DnsPort, host: &str) -> Option<Ipv4Addr> {
        if host.is_empty() {
            return None;
        }
        if let Some(literal) = parse_ipv4(host) {
            return Some(literal);
        }

        let key = host.to_ascii_lowercase();
        let cached = self.entries.borrow().get(&key).copied();
        if let Some(hit) = cached {
            debug!(host = %key, "DNS cache hit");
            return hit.address();
        }

        self.round_trips.set(self.round_trips.get() + 1);
        let outcome = match dns.resolve_ipv4(host) {
            Ok(addresses) => addresses.first().copied().map_or(Lookup::Failed, Lookup::Resolved),
            Err(e) => {
                debug!(host = %key, error = %e, "DNS lookup failed");
                Lookup::Failed
            }
        };
        self.entries.borrow_mut().insert(key, outcome);
        outcome.address()
    }

    /// Number of lookups actually sent to the resolver.
    pub fn round_trips(&self) -> usize {
        self.round_trips.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PacError, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingDns {
        calls: AtomicUsize,
    }

    impl DnsPort for CountingDns {
        fn resolve_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match host.to_ascii_lowercase().as_str() {
                "www.example.com" => Ok(vec![Ipv4Addr::new(93, 184, 216, 34), Ipv4Addr::new(10, 0, 0, 1)]),
                "empty.example.com" => Ok(vec![]),
                _ => Err(PacError::ResolutionFailed(host.to_string())),
            }
        }
    }

    #[test]
    fn test_first_address_is_used() {
        let dns = CountingDns::default();
        let cache = ResolutionCache::new();
        assert_eq!(cache.resolve(&dns, "www.example.com"), Some(Ipv4Addr::new(93, 184, 216, 34)));
    }

    #[test]
    fn test_one_round_trip_per_host() {
        let dns = CountingDns::default();
        let cache = ResolutionCache::new();
        for _ in 0..3 {
            cache.resolve(&dns, "www.example.com");
            cache.resolve(&dns, "WWW.Example.com");
        }
        assert_eq!(dns.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.round_trips(), 1);
    }

    #[test]
    fn test_failures_are_cached() {
        let dns = CountingDns::default();
        let cache = ResolutionCache::new();
        assert_eq!(cache.resolve(&dns, "nowhere.invalid"), None);
        assert_eq!(cache.resolve(&dns, "nowhere.invalid"), None);
        assert_eq!(cache.resolve(&dns, "empty.example.com"), None);
        assert_eq!(dns.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_literals_and_empty_hosts_skip_the_resolver() {
        let dns = CountingDns::default();
        let cache = ResolutionCache::new();
        assert_eq!(cache.resolve(&dns, "10.1.2.3"), Some(Ipv4Addr::new(10, 1, 2, 3)));
        assert_eq!(cache.resolve(&dns, ""), None);
        assert_eq!(dns.calls.load(Ordering::SeqCst), 0);
    }
}
