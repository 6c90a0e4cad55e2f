//! Proxy data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport kind a proxy speaks, derived from its TLS support flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProxyKind {
    #[default]
    Http,
    Https,
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyKind::Http => write!(f, "http"),
            ProxyKind::Https => write!(f, "https"),
        }
    }
}

/// A single candidate proxy harvested from a listing source.
///
/// Identity is the `(host, port)` pair; all other attributes are
/// descriptive and ignored by equality. `verified` and `working` are
/// only ever set by a health check: `working` carries no meaning until
/// `verified` is true.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Proxy {
    pub host: String,
    pub port: u16,
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub anonymity: Option<String>,
    /// Whether the source lists the proxy as usable for search-engine traffic.
    pub google: bool,
    /// Whether the source lists the proxy as supporting encrypted transport.
    pub https: bool,
    /// Raw "last checked" text from the source, kept unparsed.
    pub last_checked: Option<String>,
    kind: ProxyKind,
    verified: bool,
    working: bool,
}

impl Proxy {
    /// Create a proxy with just an address; all other fields default.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::builder().host(host).port(port).build()
    }

    /// Start building a proxy with the full field set.
    pub fn builder() -> ProxyBuilder {
        ProxyBuilder::default()
    }

    /// Transport kind, fixed at construction from the `https` flag.
    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    /// Whether a health check has ever been attempted.
    pub fn verified(&self) -> bool {
        self.verified
    }

    /// Outcome of the most recent health check. Meaningful only when
    /// [`verified`](Self::verified) is true.
    pub fn working(&self) -> bool {
        self.working
    }

    /// Record the outcome of a health check attempt.
    pub(crate) fn mark_checked(&mut self, working: bool) {
        self.verified = true;
        self.working = working;
    }

    /// Proxy URL with its transport scheme, e.g. `http://1.2.3.4:8080`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.kind, self.host, self.port)
    }

    /// Bare `host:port` form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl PartialEq for Proxy {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl Eq for Proxy {}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Builder enumerating every settable field of a [`Proxy`].
///
/// The transport kind is computed from `https` when [`build`](Self::build)
/// runs and cannot be set directly.
#[derive(Debug, Clone, Default)]
pub struct ProxyBuilder {
    host: String,
    port: u16,
    country_code: Option<String>,
    country: Option<String>,
    anonymity: Option<String>,
    google: bool,
    https: bool,
    last_checked: Option<String>,
}

impl ProxyBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn anonymity(mut self, anonymity: impl Into<String>) -> Self {
        self.anonymity = Some(anonymity.into());
        self
    }

    pub fn google(mut self, google: bool) -> Self {
        self.google = google;
        self
    }

    pub fn https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    pub fn last_checked(mut self, text: impl Into<String>) -> Self {
        self.last_checked = Some(text.into());
        self
    }

    pub fn build(self) -> Proxy {
        Proxy {
            kind: if self.https {
                ProxyKind::Https
            } else {
                ProxyKind::Http
            },
            host: self.host,
            port: self.port,
            country_code: self.country_code,
            country: self.country,
            anonymity: self.anonymity,
            google: self.google,
            https: self.https,
            last_checked: self.last_checked,
            verified: false,
            working: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_creation() {
        let proxy = Proxy::new("127.0.0.1", 8080);
        assert_eq!(proxy.host, "127.0.0.1");
        assert_eq!(proxy.port, 8080);
        assert_eq!(proxy.kind(), ProxyKind::Http);
        assert!(!proxy.google);
        assert!(!proxy.https);
        assert!(!proxy.verified());
        assert!(!proxy.working());
    }

    #[test]
    fn test_builder_full_field_set() {
        let proxy = Proxy::builder()
            .host("10.0.0.1")
            .port(3128)
            .country_code("US")
            .country("United States")
            .anonymity("elite proxy")
            .google(true)
            .https(true)
            .last_checked("12 seconds ago")
            .build();

        assert_eq!(proxy.host, "10.0.0.1");
        assert_eq!(proxy.port, 3128);
        assert_eq!(proxy.country_code.as_deref(), Some("US"));
        assert_eq!(proxy.country.as_deref(), Some("United States"));
        assert_eq!(proxy.anonymity.as_deref(), Some("elite proxy"));
        assert!(proxy.google);
        assert!(proxy.https);
        assert_eq!(proxy.last_checked.as_deref(), Some("12 seconds ago"));
    }

    #[test]
    fn test_kind_derived_from_https_flag() {
        let plain = Proxy::builder().host("1.1.1.1").port(80).build();
        assert_eq!(plain.kind(), ProxyKind::Http);

        let encrypted = Proxy::builder().host("1.1.1.1").port(443).https(true).build();
        assert_eq!(encrypted.kind(), ProxyKind::Https);
    }

    #[test]
    fn test_equality_is_host_port_only() {
        let a = Proxy::builder().host("1.2.3.4").port(80).country_code("US").build();
        let b = Proxy::builder().host("1.2.3.4").port(80).country_code("DE").https(true).build();
        let c = Proxy::new("1.2.3.4", 81);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_mark_checked() {
        let mut proxy = Proxy::new("1.2.3.4", 80);
        proxy.mark_checked(true);
        assert!(proxy.verified());
        assert!(proxy.working());

        proxy.mark_checked(false);
        assert!(proxy.verified());
        assert!(!proxy.working());
    }

    #[test]
    fn test_url_and_addr() {
        let proxy = Proxy::builder().host("1.2.3.4").port(8080).https(true).build();
        assert_eq!(proxy.url(), "https://1.2.3.4:8080");
        assert_eq!(proxy.addr(), "1.2.3.4:8080");
        assert_eq!(proxy.to_string(), "1.2.3.4:8080");
    }
}
