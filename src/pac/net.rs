use std::net::Ipv4Addr;

/// Strict dotted-quad parsing: four decimal groups of one to three digits,
/// each at most 255. Leading zeros are accepted (`010.0.0.1`).
pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut groups = s.split('.');
    for octet in octets.iter_mut() {
        let group = groups.next()?;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = group.parse::<u8>().ok()?;
    }
    if groups.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

pub fn is_ipv4_literal(s: &str) -> bool {
    parse_ipv4(s).is_some()
}

/// `(addr & mask) == (pattern & mask)`
pub fn subnet_contains(addr: Ipv4Addr, pattern: Ipv4Addr, mask: Ipv4Addr) -> bool {
    let mask = u32::from(mask);
    (u32::from(addr) & mask) == (u32::from(pattern) & mask)
}

pub fn is_plain_host_name(host: &str) -> bool {
    !host.contains('.')
}

/// Suffix test against a domain.
///
/// A domain with a leading dot matches any host ending with it; otherwise only
/// the identical host name matches, so `example.com` does not cover
/// `www.example.com`.
pub fn dns_domain_is(host: &str, domain: &str) -> bool {
    if host.is_empty() || domain.is_empty() {
        return false;
    }
    host == domain || (domain.starts_with('.') && host.ends_with(domain))
}

pub fn local_host_or_domain_is(host: &str, fqdn: &str) -> bool {
    if host.is_empty() || fqdn.is_empty() {
        return false;
    }
    if host == fqdn {
        return true;
    }
    is_plain_host_name(host) && fqdn.split('.').next() == Some(host)
}

pub fn dns_domain_levels(host: &str) -> usize {
    host.matches('.').count()
}
