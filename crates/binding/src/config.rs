//! Binding configuration.
//!
//! An [`HttpConfig`] is assembled once, validated setter by setter, and then
//! shared as an immutable snapshot: producers clone the [`std::sync::Arc`]
//! they were created with, so later edits through a builder never affect
//! in-flight calls.

use std::time::Duration;

use http::{Method, Uri, Version};

use crate::error::ConfigError;
use crate::status::StatusRanges;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_CONNECTIONS: usize = 20;

/// How the transport treats redirect responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectPolicy {
    /// Never follow redirects.
    Never,
    /// Follow redirects, but refuse to downgrade from `https` to `http`.
    #[default]
    Normal,
    /// Always follow redirects.
    Always,
}

/// Configuration snapshot for one endpoint.
///
/// Setters validate eagerly and leave the previous value in place on error,
/// so a config is usable at every point of its construction.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_uri: Uri,
    method: Option<Method>,
    version: Version,
    throw_on_failure: bool,
    ok_status_ranges: StatusRanges,
    disable_stream_cache: bool,
    response_body_as_bytes: bool,
    connect_timeout: Duration,
    response_timeout: Option<Duration>,
    max_connections: usize,
    redirect_policy: RedirectPolicy,
    http2_priority: Option<u32>,
    use_default_client: bool,
    proxy_host: Option<String>,
    proxy_port: Option<u16>,
    allow_restricted_headers: Vec<String>,
}

impl HttpConfig {
    /// Config with defaults around the given base URI.
    ///
    /// The base must be absolute, with an `http` or `https` scheme and a
    /// host.
    pub fn new(base_uri: Uri) -> Result<Self, ConfigError> {
        match base_uri.scheme_str() {
            Some("http") | Some("https") => {}
            Some(other) => return Err(ConfigError::invalid_base_uri(format!("unsupported scheme: {other}"))),
            None => return Err(ConfigError::invalid_base_uri("missing scheme")),
        }
        if base_uri.host().is_none_or(str::is_empty) {
            return Err(ConfigError::invalid_base_uri("missing host"));
        }

        Ok(Self {
            base_uri,
            method: None,
            version: Version::HTTP_11,
            throw_on_failure: true,
            ok_status_ranges: StatusRanges::default(),
            disable_stream_cache: false,
            response_body_as_bytes: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            response_timeout: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            redirect_policy: RedirectPolicy::default(),
            http2_priority: None,
            use_default_client: false,
            proxy_host: None,
            proxy_port: None,
            allow_restricted_headers: Vec::new(),
        })
    }

    /// Parses `uri` and calls [`HttpConfig::new`].
    pub fn parse(uri: &str) -> Result<Self, ConfigError> {
        let base_uri: Uri = uri.parse().map_err(|e| ConfigError::invalid_base_uri(format!("{e}: {uri}")))?;
        Self::new(base_uri)
    }

    pub fn base_uri(&self) -> &Uri {
        &self.base_uri
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Fixed method override. A blank value clears the override; anything
    /// outside the supported method set is rejected.
    pub fn set_method(&mut self, method: &str) -> Result<(), ConfigError> {
        let trimmed = method.trim();
        if trimmed.is_empty() {
            self.method = None;
            return Ok(());
        }
        let parsed = parse_method(trimmed).ok_or_else(|| ConfigError::unsupported_method(trimmed))?;
        if !is_supported_method(&parsed) {
            return Err(ConfigError::unsupported_method(trimmed));
        }
        self.method = Some(parsed);
        Ok(())
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Preferred protocol version; only `HTTP/1.1` and `HTTP/2` are
    /// meaningful to the transport.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    pub fn throw_on_failure(&self) -> bool {
        self.throw_on_failure
    }

    pub fn set_throw_on_failure(&mut self, throw_on_failure: bool) {
        self.throw_on_failure = throw_on_failure;
    }

    pub fn ok_status_ranges(&self) -> &StatusRanges {
        &self.ok_status_ranges
    }

    /// Replaces the success-status set. On parse failure the previously
    /// installed set stays in place.
    pub fn set_ok_status_ranges(&mut self, spec: &str) -> Result<(), ConfigError> {
        self.ok_status_ranges = StatusRanges::parse(spec)?;
        Ok(())
    }

    pub fn disable_stream_cache(&self) -> bool {
        self.disable_stream_cache
    }

    pub fn set_disable_stream_cache(&mut self, disable: bool) {
        self.disable_stream_cache = disable;
    }

    pub fn response_body_as_bytes(&self) -> bool {
        self.response_body_as_bytes
    }

    pub fn set_response_body_as_bytes(&mut self, as_bytes: bool) {
        self.response_body_as_bytes = as_bytes;
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout
    }

    pub fn set_response_timeout(&mut self, timeout: Duration) {
        self.response_timeout = Some(timeout);
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub fn set_max_connections(&mut self, max_connections: usize) -> Result<(), ConfigError> {
        if max_connections < 1 {
            return Err(ConfigError::invalid_max_connections(max_connections));
        }
        self.max_connections = max_connections;
        Ok(())
    }

    pub fn redirect_policy(&self) -> RedirectPolicy {
        self.redirect_policy
    }

    pub fn set_redirect_policy(&mut self, policy: RedirectPolicy) {
        self.redirect_policy = policy;
    }

    pub fn http2_priority(&self) -> Option<u32> {
        self.http2_priority
    }

    /// Stream priority for HTTP/2 requests, `1..=256`.
    pub fn set_http2_priority(&mut self, priority: u32) -> Result<(), ConfigError> {
        if !(1..=256).contains(&priority) {
            return Err(ConfigError::invalid_http2_priority(priority));
        }
        self.http2_priority = Some(priority);
        Ok(())
    }

    pub fn use_default_client(&self) -> bool {
        self.use_default_client
    }

    /// When set, the transport is built with its own defaults and every
    /// tuning knob here (timeouts, pool size, redirects, proxy) is ignored.
    pub fn set_use_default_client(&mut self, use_default: bool) {
        self.use_default_client = use_default;
    }

    pub fn proxy_host(&self) -> Option<&str> {
        self.proxy_host.as_deref()
    }

    pub fn set_proxy_host(&mut self, host: &str) {
        self.proxy_host = Some(host.trim().to_owned());
    }

    pub fn proxy_port(&self) -> Option<u16> {
        self.proxy_port
    }

    pub fn set_proxy_port(&mut self, port: u16) {
        self.proxy_port = Some(port);
    }

    /// Proxy address, if fully configured. A host without a port is an
    /// error; a port without a host means no proxy.
    pub fn proxy(&self) -> Result<Option<(&str, u16)>, ConfigError> {
        match (self.proxy_host.as_deref(), self.proxy_port) {
            (Some(host), Some(port)) if !host.is_empty() => Ok(Some((host, port))),
            (Some(host), None) if !host.is_empty() => Err(ConfigError::incomplete_proxy(host)),
            _ => Ok(None),
        }
    }

    pub fn allow_restricted_headers(&self) -> &[String] {
        &self.allow_restricted_headers
    }

    /// Permits one restricted header name to propagate outbound.
    pub fn allow_restricted_header<S: Into<String>>(&mut self, name: S) {
        self.allow_restricted_headers.push(name.into());
    }

    pub fn is_restricted_header_allowed(&self, name: &str) -> bool {
        self.allow_restricted_headers.iter().any(|allowed| allowed.eq_ignore_ascii_case(name))
    }
}

/// Methods the binding knows how to frame a body for.
pub fn is_supported_method(method: &Method) -> bool {
    matches!(method.as_str(), "GET" | "HEAD" | "DELETE" | "PATCH" | "POST" | "PUT")
}

/// Uppercases and parses a method token. `None` when the token is not a
/// valid method name at all.
pub(crate) fn parse_method(text: &str) -> Option<Method> {
    Method::from_bytes(text.trim().to_ascii_uppercase().as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HttpConfig {
        HttpConfig::parse("http://example.org/api").unwrap()
    }

    #[test]
    fn defaults() {
        let config = config();

        assert_eq!(config.base_uri().to_string(), "http://example.org/api");
        assert_eq!(config.method(), None);
        assert_eq!(config.version(), Version::HTTP_11);
        assert!(config.throw_on_failure());
        assert!(config.ok_status_ranges().contains(204));
        assert!(!config.ok_status_ranges().contains(301));
        assert!(!config.disable_stream_cache());
        assert!(!config.response_body_as_bytes());
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.response_timeout(), None);
        assert_eq!(config.max_connections(), 20);
        assert_eq!(config.redirect_policy(), RedirectPolicy::Normal);
        assert_eq!(config.http2_priority(), None);
    }

    #[test]
    fn base_uri_must_be_http_with_host() {
        assert!(matches!(HttpConfig::parse("ftp://example.org"), Err(ConfigError::InvalidBaseUri { .. })));
        assert!(matches!(HttpConfig::parse("/relative/path"), Err(ConfigError::InvalidBaseUri { .. })));
        assert!(matches!(HttpConfig::parse("not a uri"), Err(ConfigError::InvalidBaseUri { .. })));
        assert!(HttpConfig::parse("https://example.org").is_ok());
    }

    #[test]
    fn status_range_failure_keeps_previous_set() {
        let mut config = config();
        config.set_ok_status_ranges("200,204").unwrap();

        let err = config.set_ok_status_ranges("200-").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStatusRanges { .. }));

        assert!(config.ok_status_ranges().contains(204));
        assert!(!config.ok_status_ranges().contains(201));
        assert_eq!(config.ok_status_ranges().source(), "200,204");
    }

    #[test]
    fn method_override_normalizes_case() {
        let mut config = config();

        config.set_method("post").unwrap();
        assert_eq!(config.method(), Some(&Method::POST));

        config.set_method(" PaTcH ").unwrap();
        assert_eq!(config.method(), Some(&Method::PATCH));

        config.set_method("  ").unwrap();
        assert_eq!(config.method(), None);
    }

    #[test]
    fn unsupported_method_override_is_rejected() {
        let mut config = config();
        config.set_method("PUT").unwrap();

        let err = config.set_method("TRACE").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedMethod { .. }));
        assert_eq!(config.method(), Some(&Method::PUT));
    }

    #[test]
    fn max_connections_lower_bound() {
        let mut config = config();

        assert!(matches!(config.set_max_connections(0), Err(ConfigError::InvalidMaxConnections { value: 0 })));
        assert_eq!(config.max_connections(), 20);

        config.set_max_connections(1).unwrap();
        assert_eq!(config.max_connections(), 1);
    }

    #[test]
    fn http2_priority_range() {
        let mut config = config();

        assert!(config.set_http2_priority(0).is_err());
        assert!(config.set_http2_priority(257).is_err());
        assert_eq!(config.http2_priority(), None);

        config.set_http2_priority(1).unwrap();
        config.set_http2_priority(256).unwrap();
        assert_eq!(config.http2_priority(), Some(256));
    }

    #[test]
    fn proxy_requires_port_when_host_set() {
        let mut config = config();
        assert_eq!(config.proxy().unwrap(), None);

        config.set_proxy_port(3128);
        assert_eq!(config.proxy().unwrap(), None);

        config.set_proxy_host(" proxy.local ");
        assert_eq!(config.proxy().unwrap(), Some(("proxy.local", 3128)));

        let mut host_only = HttpConfig::parse("http://example.org").unwrap();
        host_only.set_proxy_host("proxy.local");
        assert!(matches!(host_only.proxy(), Err(ConfigError::IncompleteProxy { .. })));
    }

    #[test]
    fn restricted_header_allow_list() {
        let mut config = config();
        assert!(!config.is_restricted_header_allowed("Host"));

        config.allow_restricted_header("host");
        assert!(config.is_restricted_header_allowed("Host"));
        assert!(config.is_restricted_header_allowed("HOST"));
        assert!(!config.is_restricted_header_allowed("Expect"));
    }

    #[test]
    fn supported_method_set() {
        for method in [Method::GET, Method::HEAD, Method::DELETE, Method::PATCH, Method::POST, Method::PUT] {
            assert!(is_supported_method(&method));
        }
        assert!(!is_supported_method(&Method::OPTIONS));
        assert!(!is_supported_method(&Method::TRACE));
        assert!(!is_supported_method(&Method::CONNECT));
    }
}
