//! Proxy auto-config evaluation: load a PAC script, ask it which proxies to
//! use for a URL and get back a typed, ordered proxy chain.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod pac;
pub mod ports;
pub mod worker;

use adapters::{BoaScriptRuntime, SystemClock, SystemDnsResolver, UdpLocalAddress};
use config::EngineConfig;
use domain::PacEvaluator;
use pac::HelperEnvironment;
use std::sync::Arc;

/// An evaluator wired to the system resolver, clock and network interfaces.
pub fn system_evaluator(config: &EngineConfig) -> PacEvaluator {
    let helpers = HelperEnvironment::new(
        Arc::new(SystemDnsResolver::new(config.dns_timeout()).with_thread_limit(config.dns_thread_limit)),
        Arc::new(SystemClock),
        Arc::new(UdpLocalAddress::new(config.probe_address)),
    )
    .with_my_ip_fallback(config.my_ip_fallback);
    PacEvaluator::new(Arc::new(BoaScriptRuntime::from_config(config)), helpers)
        .with_time_budget(config.evaluation_timeout(), config.evaluation_thread_limit)
}
