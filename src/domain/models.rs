use std::fmt;
use std::num::NonZeroU16;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    Direct,
    Proxy,
    Socks,
    Socks4,
    Socks5,
    Http,
    Https,
}

impl ProxyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyKind::Direct => "DIRECT",
            ProxyKind::Proxy => "PROXY",
            ProxyKind::Socks => "SOCKS",
            ProxyKind::Socks4 => "SOCKS4",
            ProxyKind::Socks5 => "SOCKS5",
            ProxyKind::Http => "HTTP",
            ProxyKind::Https => "HTTPS",
        }
    }

    /// Case-insensitive keyword lookup.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DIRECT" => Some(ProxyKind::Direct),
            "PROXY" => Some(ProxyKind::Proxy),
            "SOCKS" => Some(ProxyKind::Socks),
            "SOCKS4" => Some(ProxyKind::Socks4),
            "SOCKS5" => Some(ProxyKind::Socks5),
            "HTTP" => Some(ProxyKind::Http),
            "HTTPS" => Some(ProxyKind::Https),
            _ => None,
        }
    }

    fn url_scheme(&self) -> Option<&'static str> {
        match self {
            ProxyKind::Direct => None,
            ProxyKind::Proxy | ProxyKind::Http => Some("http"),
            ProxyKind::Https => Some("https"),
            ProxyKind::Socks4 => Some("socks4"),
            ProxyKind::Socks | ProxyKind::Socks5 => Some("socks5"),
        }
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Endpoint {
    host: String,
    port: NonZeroU16,
}

/// One selectable proxy option.
///
/// `DIRECT` never carries an endpoint and every other kind always does;
/// the constructors are the only way to build a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyDirective {
    kind: ProxyKind,
    endpoint: Option<Endpoint>,
}

impl ProxyDirective {
    pub fn direct() -> Self {
        Self {
            kind: ProxyKind::Direct,
            endpoint: None,
        }
    }

    /// Returns `None` for `DIRECT`, an empty host or port 0.
    pub fn proxy(kind: ProxyKind, host: impl Into<String>, port: u16) -> Option<Self> {
        let host = host.into();
        if kind == ProxyKind::Direct || host.is_empty() {
            return None;
        }
        let port = NonZeroU16::new(port)?;
        Some(Self {
            kind,
            endpoint: Some(Endpoint { host, port }),
        })
    }

    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    pub fn host(&self) -> Option<&str> {
        self.endpoint.as_ref().map(|e| e.host.as_str())
    }

    pub fn port(&self) -> Option<u16> {
        self.endpoint.as_ref().map(|e| e.port.get())
    }

    pub fn is_direct(&self) -> bool {
        self.kind == ProxyKind::Direct
    }

    /// The directive as a proxy URL for the connection layer, `None` for `DIRECT`.
    pub fn proxy_url(&self) -> Option<Url> {
        let scheme = self.kind.url_scheme()?;
        let endpoint = self.endpoint.as_ref()?;
        format!("{}://{}:{}", scheme, endpoint.host, endpoint.port).parse().ok()
    }
}

impl fmt::Display for ProxyDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.endpoint {
            Some(endpoint) => write!(f, "{} {}:{}", self.kind, endpoint.host, endpoint.port),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

/// Ordered, non-empty list of directives to try in sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyChain {
    directives: Vec<ProxyDirective>,
}

impl ProxyChain {
    pub fn new(directives: Vec<ProxyDirective>) -> Option<Self> {
        if directives.is_empty() {
            None
        } else {
            Some(Self { directives })
        }
    }

    pub fn direct() -> Self {
        Self {
            directives: vec![ProxyDirective::direct()],
        }
    }

    pub fn first(&self) -> &ProxyDirective {
        &self.directives[0]
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProxyDirective> {
        self.directives.iter()
    }

    pub fn as_slice(&self) -> &[ProxyDirective] {
        &self.directives
    }

    pub fn into_vec(self) -> Vec<ProxyDirective> {
        self.directives
    }
}

impl fmt::Display for ProxyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, directive) in self.directives.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", directive)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ProxyChain {
    type Item = &'a ProxyDirective;
    type IntoIter = std::slice::Iter<'a, ProxyDirective>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.iter()
    }
}

/// Arguments of one `FindProxyForURL(url, host)` call.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub id: uuid::Uuid,
    pub url: String,
    pub host: String,
}

impl EvaluationRequest {
    pub fn new(url: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            url: url.into(),
            host: host.into(),
        }
    }

    /// Derives `host` from the URL the way browsers do (brackets kept for IPv6).
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        Some(Self::new(url.to_string(), host))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorState {
    Uninitialized,
    Ready,
    Evaluating,
}

impl fmt::Display for EvaluatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluatorState::Uninitialized => write!(f, "uninitialized"),
            EvaluatorState::Ready => write!(f, "ready"),
            EvaluatorState::Evaluating => write!(f, "evaluating"),
        }
    }
}
