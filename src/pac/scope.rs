use super::calendar::EvaluationClock;
use super::dns_cache::ResolutionCache;
use crate::ports::{ClockPort, DnsPort, LocalAddressPort};
use std::cell::OnceCell;
use std::net::Ipv4Addr;
use std::sync::Arc;
use uuid::Uuid;

/// Host services shared by every evaluation of an evaluator.
#[derive(Clone)]
pub struct HelperEnvironment {
    dns: Arc<dyn DnsPort>,
    clock: Arc<dyn ClockPort>,
    local_address: Arc<dyn LocalAddressPort>,
    my_ip_fallback: Ipv4Addr,
}

impl HelperEnvironment {
    pub fn new(dns: Arc<dyn DnsPort>, clock: Arc<dyn ClockPort>, local_address: Arc<dyn LocalAddressPort>) -> Self {
        Self {
            dns,
            clock,
            local_address,
            my_ip_fallback: Ipv4Addr::LOCALHOST,
        }
    }

    pub fn with_my_ip_fallback(mut self, fallback: Ipv4Addr) -> Self {
        self.my_ip_fallback = fallback;
        self
    }

    /// Opens the scope for one evaluation; the clock is sampled here.
    pub fn begin(&self, id: Uuid) -> EvaluationScope {
        EvaluationScope {
            id,
            clock: EvaluationClock::new(self.clock.now()),
            dns: Arc::clone(&self.dns),
            cache: ResolutionCache::new(),
            local_address: Arc::clone(&self.local_address),
            my_ip: OnceCell::new(),
            my_ip_fallback: self.my_ip_fallback,
        }
    }
}

/// Mutable state of a single `FindProxyForURL` call.
///
/// Lives on the evaluating thread only and is dropped with the call, so
/// nothing cached here leaks into another evaluation.
pub struct EvaluationScope {
    id: Uuid,
    clock: EvaluationClock,
    dns: Arc<dyn DnsPort>,
    cache: ResolutionCache,
    local_address: Arc<dyn LocalAddressPort>,
    my_ip: OnceCell<Ipv4Addr>,
    my_ip_fallback: Ipv4Addr,
}

impl EvaluationScope {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn clock(&self) -> &EvaluationClock {
        &self.clock
    }

    pub fn resolve(&self, host: &str) -> Option<Ipv4Addr> {
        self.cache.resolve(self.dns.as_ref(), host)
    }

    pub fn my_ip_address(&self) -> Ipv4Addr {
        *self
            .my_ip
            .get_or_init(|| self.local_address.primary_ipv4().unwrap_or(self.my_ip_fallback))
    }

    pub fn dns_round_trips(&self) -> usize {
        self.cache.round_trips()
    }
}
