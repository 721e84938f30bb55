use std::net::Ipv4Addr;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use nanopac::adapters::{BoaScriptRuntime, ExecutionLimits, FixedClock, StaticDnsResolver, StaticLocalAddress};
use nanopac::domain::PacEvaluator;
use nanopac::pac::HelperEnvironment;

/// Offline helper environment: static host table, frozen clock, fixed local address.
pub struct TestEnvironment {
    dns: Arc<StaticDnsResolver>,
    now: DateTime<FixedOffset>,
    my_ip: Option<Ipv4Addr>,
}

impl TestEnvironment {
    pub fn at(now: &str) -> Self {
        Self {
            dns: Arc::new(StaticDnsResolver::new()),
            now: DateTime::parse_from_rfc3339(now).expect("valid RFC 3339 timestamp"),
            my_ip: Some(Ipv4Addr::new(192, 168, 1, 20)),
        }
    }

    pub fn with_dns(mut self, dns: StaticDnsResolver) -> Self {
        self.dns = Arc::new(dns);
        self
    }

    pub fn dns(&self) -> &StaticDnsResolver {
        &self.dns
    }

    pub fn helpers(&self) -> HelperEnvironment {
        HelperEnvironment::new(
            self.dns.clone(),
            Arc::new(FixedClock::new(self.now)),
            Arc::new(StaticLocalAddress::new(self.my_ip)),
        )
    }

    pub fn evaluator(&self) -> PacEvaluator {
        self.evaluator_with_limits(ExecutionLimits::default())
    }

    pub fn evaluator_with_limits(&self, limits: ExecutionLimits) -> PacEvaluator {
        PacEvaluator::new(Arc::new(BoaScriptRuntime::new(limits)), self.helpers())
    }
}
