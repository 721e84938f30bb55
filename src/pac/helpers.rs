use super::calendar;
use super::glob::sh_exp_match;
use super::net::{dns_domain_is, dns_domain_levels, is_plain_host_name, local_host_or_domain_is, parse_ipv4, subnet_contains};
use super::EvaluationScope;
use std::fmt;
use tracing::info;

/// A value crossing the boundary between script code and a helper.
#[derive(Debug, Clone, PartialEq)]
pub enum HelperValue {
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
}

impl HelperValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HelperValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integral numbers, or strings holding one (`"2022"`).
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            HelperValue::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            HelperValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            HelperValue::Undefined => "undefined",
            HelperValue::Bool(_) => "boolean",
            HelperValue::Number(_) => "number",
            HelperValue::String(_) => "string",
        }
    }
}

impl fmt::Display for HelperValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HelperValue::Undefined => f.write_str("undefined"),
            HelperValue::Bool(b) => write!(f, "{}", b),
            HelperValue::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{}", *n as i64),
            HelperValue::Number(n) => write!(f, "{}", n),
            HelperValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for HelperValue {
    fn from(b: bool) -> Self {
        HelperValue::Bool(b)
    }
}

impl From<String> for HelperValue {
    fn from(s: String) -> Self {
        HelperValue::String(s)
    }
}

impl From<&str> for HelperValue {
    fn from(s: &str) -> Self {
        HelperValue::String(s.to_string())
    }
}

/// The functions a PAC script may call besides its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperFunction {
    IsPlainHostName,
    DnsDomainIs,
    LocalHostOrDomainIs,
    IsResolvable,
    IsInNet,
    DnsResolve,
    MyIpAddress,
    DnsDomainLevels,
    ShExpMatch,
    WeekdayRange,
    DateRange,
    TimeRange,
    Alert,
}

impl HelperFunction {
    pub const ALL: [HelperFunction; 13] = [
        HelperFunction::IsPlainHostName,
        HelperFunction::DnsDomainIs,
        HelperFunction::LocalHostOrDomainIs,
        HelperFunction::IsResolvable,
        HelperFunction::IsInNet,
        HelperFunction::DnsResolve,
        HelperFunction::MyIpAddress,
        HelperFunction::DnsDomainLevels,
        HelperFunction::ShExpMatch,
        HelperFunction::WeekdayRange,
        HelperFunction::DateRange,
        HelperFunction::TimeRange,
        HelperFunction::Alert,
    ];

    /// Name as seen by scripts (case-sensitive).
    pub fn name(&self) -> &'static str {
        match self {
            HelperFunction::IsPlainHostName => "isPlainHostName",
            HelperFunction::DnsDomainIs => "dnsDomainIs",
            HelperFunction::LocalHostOrDomainIs => "localHostOrDomainIs",
            HelperFunction::IsResolvable => "isResolvable",
            HelperFunction::IsInNet => "isInNet",
            HelperFunction::DnsResolve => "dnsResolve",
            HelperFunction::MyIpAddress => "myIpAddress",
            HelperFunction::DnsDomainLevels => "dnsDomainLevels",
            HelperFunction::ShExpMatch => "shExpMatch",
            HelperFunction::WeekdayRange => "weekdayRange",
            HelperFunction::DateRange => "dateRange",
            HelperFunction::TimeRange => "timeRange",
            HelperFunction::Alert => "alert",
        }
    }

    /// Declared parameter count (the script-visible `length`).
    pub fn arity(&self) -> usize {
        match self {
            HelperFunction::MyIpAddress => 0,
            HelperFunction::IsPlainHostName
            | HelperFunction::IsResolvable
            | HelperFunction::DnsResolve
            | HelperFunction::DnsDomainLevels
            | HelperFunction::WeekdayRange
            | HelperFunction::DateRange
            | HelperFunction::TimeRange
            | HelperFunction::Alert => 1,
            HelperFunction::DnsDomainIs | HelperFunction::LocalHostOrDomainIs | HelperFunction::ShExpMatch => 2,
            HelperFunction::IsInNet => 3,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Runs the helper. Missing or mistyped arguments yield `false`, `0` or
    /// `""` instead of an error.
    pub fn invoke(&self, scope: &EvaluationScope, args: &[HelperValue]) -> HelperValue {
        let text = |i: usize| args.get(i).and_then(HelperValue::as_str);

        match self {
            HelperFunction::IsPlainHostName => text(0).is_some_and(is_plain_host_name).into(),
            HelperFunction::DnsDomainIs => match (text(0), text(1)) {
                (Some(host), Some(domain)) => dns_domain_is(host, domain).into(),
                _ => false.into(),
            },
            HelperFunction::LocalHostOrDomainIs => match (text(0), text(1)) {
                (Some(host), Some(fqdn)) => local_host_or_domain_is(host, fqdn).into(),
                _ => false.into(),
            },
            HelperFunction::IsResolvable => text(0).and_then(|host| scope.resolve(host)).is_some().into(),
            HelperFunction::IsInNet => is_in_net(scope, text(0), text(1), text(2)).into(),
            HelperFunction::DnsResolve => text(0)
                .and_then(|host| scope.resolve(host))
                .map(|addr| addr.to_string())
                .unwrap_or_default()
                .into(),
            HelperFunction::MyIpAddress => scope.my_ip_address().to_string().into(),
            HelperFunction::DnsDomainLevels => HelperValue::Number(text(0).map_or(0, dns_domain_levels) as f64),
            HelperFunction::ShExpMatch => match (text(0), text(1)) {
                (Some(input), Some(pattern)) => sh_exp_match(input, pattern).into(),
                _ => false.into(),
            },
            HelperFunction::WeekdayRange => calendar::weekday_range(scope.clock(), args).into(),
            HelperFunction::DateRange => calendar::date_range(scope.clock(), args).into(),
            HelperFunction::TimeRange => calendar::time_range(scope.clock(), args).into(),
            HelperFunction::Alert => {
                let message = args.first().map(|v| v.to_string()).unwrap_or_default();
                info!(target: "nanopac::alert", evaluation_id = %scope.id(), "{}", message);
                HelperValue::Undefined
            }
        }
    }
}

fn is_in_net(scope: &EvaluationScope, host: Option<&str>, pattern: Option<&str>, mask: Option<&str>) -> bool {
    let (Some(host), Some(pattern), Some(mask)) = (host, pattern, mask) else {
        return false;
    };
    let (Some(pattern), Some(mask)) = (parse_ipv4(pattern), parse_ipv4(mask)) else {
        return false;
    };
    scope
        .resolve(host)
        .is_some_and(|addr| subnet_contains(addr, pattern, mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedClock, StaticDnsResolver, StaticLocalAddress};
    use crate::pac::HelperEnvironment;
    use chrono::DateTime;
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use uuid::Uuid;

    fn environment(dns: Arc<StaticDnsResolver>, my_ip: Option<Ipv4Addr>) -> HelperEnvironment {
        let now = DateTime::parse_from_rfc3339("2022-05-23T14:34:56+02:00").unwrap();
        HelperEnvironment::new(dns, Arc::new(FixedClock::new(now)), Arc::new(StaticLocalAddress::new(my_ip)))
    }

    fn scope() -> EvaluationScope {
        let dns = StaticDnsResolver::new()
            .with_host("www.netscape.com", Ipv4Addr::new(198, 95, 249, 79))
            .with_host("intranet.corp", Ipv4Addr::new(10, 1, 2, 3));
        environment(Arc::new(dns), Some(Ipv4Addr::new(192, 168, 1, 20))).begin(Uuid::new_v4())
    }

    fn call(scope: &EvaluationScope, name: &str, args: &[&str]) -> HelperValue {
        let args: Vec<HelperValue> = args.iter().map(|a| HelperValue::from(*a)).collect();
        HelperFunction::from_name(name).unwrap().invoke(scope, &args)
    }

    #[test]
    fn test_names_round_trip() {
        for function in HelperFunction::ALL {
            assert_eq!(HelperFunction::from_name(function.name()), Some(function));
        }
        assert_eq!(HelperFunction::from_name("IsPlainHostName"), None);
    }

    #[test]
    fn test_is_in_net() {
        let s = scope();
        let yes = HelperValue::Bool(true);
        let no = HelperValue::Bool(false);
        assert_eq!(call(&s, "isInNet", &["198.95.249.79", "198.95.249.79", "255.255.255.255"]), yes);
        assert_eq!(call(&s, "isInNet", &["198.95.249.79", "198.95.0.0", "255.255.0.0"]), yes);
        assert_eq!(call(&s, "isInNet", &["198.95.249.79", "198.95.0.0", "255.255.255.0"]), no);
        assert_eq!(call(&s, "isInNet", &["www.netscape.com", "198.95.0.0", "255.255.0.0"]), yes);
        assert_eq!(call(&s, "isInNet", &["unknown.host", "0.0.0.0", "0.0.0.0"]), no);
        assert_eq!(call(&s, "isInNet", &["256.0.0.0", "0.0.0.0", "0.0.0.0"]), no);
        assert_eq!(call(&s, "isInNet", &["1.2.3.4", "0.0.0.0.0", "0.0.0.0"]), no);
        assert_eq!(call(&s, "isInNet", &["1.2.3.4", "0.0.0.0", "255.255.255.256"]), no);
        assert_eq!(call(&s, "isInNet", &["1.2.3.4", "0.0.0.0"]), no);
    }

    #[test]
    fn test_dns_resolve_and_is_resolvable() {
        let s = scope();
        assert_eq!(call(&s, "dnsResolve", &["www.netscape.com"]), HelperValue::from("198.95.249.79"));
        assert_eq!(call(&s, "dnsResolve", &["unknown.host"]), HelperValue::from(""));
        assert_eq!(call(&s, "dnsResolve", &["10.9.8.7"]), HelperValue::from("10.9.8.7"));
        assert_eq!(call(&s, "isResolvable", &["intranet.corp"]), HelperValue::Bool(true));
        assert_eq!(call(&s, "isResolvable", &["unknown.host"]), HelperValue::Bool(false));
        assert_eq!(s.dns_round_trips(), 3);
    }

    #[test]
    fn test_shared_cache_across_helpers() {
        let dns = Arc::new(StaticDnsResolver::new().with_host("intranet.corp", Ipv4Addr::new(10, 1, 2, 3)));
        let s = environment(Arc::clone(&dns), None).begin(Uuid::new_v4());
        call(&s, "isResolvable", &["intranet.corp"]);
        call(&s, "isInNet", &["intranet.corp", "10.0.0.0", "255.0.0.0"]);
        call(&s, "dnsResolve", &["intranet.corp"]);
        assert_eq!(dns.lookups(), 1);
    }

    #[test]
    fn test_my_ip_address() {
        assert_eq!(call(&scope(), "myIpAddress", &[]), HelperValue::from("192.168.1.20"));
        let dns = Arc::new(StaticDnsResolver::new());
        let fallback = environment(dns, None).begin(Uuid::new_v4());
        assert_eq!(call(&fallback, "myIpAddress", &[]), HelperValue::from("127.0.0.1"));
    }

    #[test]
    fn test_dns_domain_levels_is_a_number() {
        let s = scope();
        assert_eq!(call(&s, "dnsDomainLevels", &["www.netscape.com"]), HelperValue::Number(2.0));
        assert_eq!(call(&s, "dnsDomainLevels", &[]), HelperValue::Number(0.0));
    }

    #[test]
    fn test_wrong_argument_types_degrade() {
        let s = scope();
        let numbers = [HelperValue::Number(1.0), HelperValue::Number(2.0), HelperValue::Number(3.0)];
        assert_eq!(HelperFunction::IsPlainHostName.invoke(&s, &numbers), HelperValue::Bool(false));
        assert_eq!(HelperFunction::DnsDomainIs.invoke(&s, &numbers), HelperValue::Bool(false));
        assert_eq!(HelperFunction::ShExpMatch.invoke(&s, &numbers), HelperValue::Bool(false));
        assert_eq!(HelperFunction::IsInNet.invoke(&s, &numbers), HelperValue::Bool(false));
        assert_eq!(HelperFunction::DnsResolve.invoke(&s, &[HelperValue::Undefined]), HelperValue::from(""));
        assert_eq!(HelperFunction::WeekdayRange.invoke(&s, &numbers), HelperValue::Bool(false));
    }

    #[test]
    fn test_calendar_helpers_use_the_sampled_clock() {
        let s = scope();
        assert_eq!(call(&s, "weekdayRange", &["MON"]), HelperValue::Bool(true));
        assert_eq!(call(&s, "dateRange", &["MAY"]), HelperValue::Bool(true));
        assert_eq!(
            HelperFunction::TimeRange.invoke(&s, &[HelperValue::Number(14.0)]),
            HelperValue::Bool(true)
        );
    }

    #[test]
    fn test_alert_returns_undefined() {
        assert_eq!(call(&scope(), "alert", &["hello"]), HelperValue::Undefined);
    }

    #[test]
    fn test_display_of_integral_numbers() {
        assert_eq!(HelperValue::Number(3.0).to_string(), "3");
        assert_eq!(HelperValue::Number(2.5).to_string(), "2.5");
        assert_eq!(HelperValue::Number(2022.0).as_integer(), Some(2022));
        assert_eq!(HelperValue::from(" 7 ").as_integer(), Some(7));
        assert_eq!(HelperValue::Number(1.5).as_integer(), None);
    }
}
