use super::{DirectiveParseError, ProxyChain, ProxyDirective, ProxyKind};
use tracing::warn;

/// Parse the string returned by `FindProxyForURL` into a proxy chain.
///
/// Segments are separated by `;`. A segment is either `DIRECT` or
/// `KIND host:port` with exactly one space after the keyword. Malformed
/// segments are skipped; the call only fails when nothing usable remains.
pub fn parse_directives(raw: &str) -> Result<ProxyChain, DirectiveParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DirectiveParseError::Empty);
    }

    let directives: Vec<ProxyDirective> = trimmed
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let parsed = parse_segment(segment);
            if parsed.is_none() {
                warn!("Dropping malformed proxy directive {:?}", segment);
            }
            parsed
        })
        .collect();

    ProxyChain::new(directives).ok_or_else(|| DirectiveParseError::NoValidDirective(raw.to_string()))
}

fn parse_segment(segment: &str) -> Option<ProxyDirective> {
    let (keyword, address) = match segment.split_once(' ') {
        Some((keyword, address)) => (keyword, Some(address)),
        None => (segment, None),
    };

    match (ProxyKind::from_keyword(keyword)?, address) {
        (ProxyKind::Direct, None) => Some(ProxyDirective::direct()),
        (ProxyKind::Direct, Some(_)) => None,
        (_, None) => None,
        (kind, Some(address)) => {
            let (host, port) = split_host_port(address)?;
            ProxyDirective::proxy(kind, host, port)
        }
    }
}

fn split_host_port(address: &str) -> Option<(&str, u16)> {
    if address.is_empty() || address.chars().any(char::is_whitespace) {
        return None;
    }
    let (host, port) = address.rsplit_once(':')?;
    // unbracketed IPv6 literals are ambiguous
    if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
        return None;
    }
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let port: u16 = port.parse().ok()?;
    Some((host, port))
}
