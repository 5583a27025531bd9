//! Effective target URI composition.
//!
//! The wire URI starts from a base and is reshaped by up to five independent
//! per-call overrides, applied in a fixed order: scheme, host, port, path,
//! query. Each override replaces exactly one component and leaves the rest
//! alone; the path override appends rather than replaces.

use std::fmt::Write;

use http::Uri;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::RequestError;

/// Characters percent-encoded in path and query overrides.
///
/// Existing `%hh` escapes in the input are kept as-is; a stray `%` that does
/// not open a valid escape is encoded like any other unsafe byte.
const HTTP_PCT_ENCODING_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'{')
    .add(b'}')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'\\')
    .add(b'|')
    .add(b'%');

/// Per-call URI overrides. `None` (or a blank string) leaves the component
/// from the base URI in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriOverrides<'a> {
    pub scheme: Option<&'a str>,
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub path: Option<&'a str>,
    pub query: Option<&'a str>,
}

impl UriOverrides<'_> {
    pub fn is_empty(&self) -> bool {
        self.scheme.is_none() && self.host.is_none() && self.port.is_none() && self.path.is_none() && self.query.is_none()
    }
}

/// Applies the overrides to `base` and reparses the result.
///
/// The scheme override must be `http` or `https`, case-insensitively, after
/// trimming. The path override is percent-encoded and appended with exactly
/// one separating `/`: a doubled slash at the join is collapsed, a missing
/// one is inserted. Multiple repeated slashes inside either side pass
/// through untouched. The query override is percent-encoded and replaces the
/// whole query component.
pub fn resolve(base: &Uri, overrides: &UriOverrides<'_>) -> Result<Uri, RequestError> {
    let mut scheme = base.scheme_str().unwrap_or("http").to_ascii_lowercase();
    let authority = base.authority().map_or("", |a| a.as_str());
    let (userinfo, base_host, base_port) = split_authority(authority);
    let mut host = base_host.to_owned();
    let mut port = base_port.map(str::to_owned);
    let mut path = base.path().to_owned();
    let mut query = base.query().map(str::to_owned);

    if let Some(ov) = present(overrides.scheme) {
        if !ov.eq_ignore_ascii_case("http") && !ov.eq_ignore_ascii_case("https") {
            return Err(RequestError::invalid_override("scheme", ov));
        }
        scheme = ov.to_ascii_lowercase();
    }

    if let Some(ov) = present(overrides.host) {
        host = ov.to_owned();
    }

    if let Some(ov) = overrides.port {
        port = Some(ov.to_string());
    }

    if let Some(ov) = present(overrides.path) {
        let mut encoded = encode_http_uri(ov);
        if path.ends_with('/') && encoded.starts_with('/') {
            encoded.remove(0);
        } else if !path.ends_with('/') && !encoded.starts_with('/') {
            path.push('/');
        }
        path.push_str(&encoded);
    }

    if let Some(ov) = present(overrides.query) {
        query = Some(encode_http_uri(ov));
    }

    if host.is_empty() {
        return Err(RequestError::invalid_uri(format!("no host in uri: {base}")));
    }

    let mut target = String::with_capacity(scheme.len() + host.len() + path.len() + 16);
    target.push_str(&scheme);
    target.push_str("://");
    if let Some(userinfo) = userinfo {
        target.push_str(userinfo);
        target.push('@');
    }
    target.push_str(&host);
    if let Some(port) = &port {
        let _ = write!(target, ":{port}");
    }
    target.push_str(&path);
    if let Some(query) = &query {
        target.push('?');
        target.push_str(query);
    }

    target.parse().map_err(|e: http::uri::InvalidUri| RequestError::invalid_uri(format!("{e}: {target}")))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Splits `userinfo@host:port` into its parts. The host keeps its square
/// brackets for IPv6 literals.
fn split_authority(authority: &str) -> (Option<&str>, &str, Option<&str>) {
    let (userinfo, hostport) = match authority.rfind('@') {
        Some(at) => (Some(&authority[..at]), &authority[at + 1..]),
        None => (None, authority),
    };
    let bracket = hostport.rfind(']');
    match hostport.rfind(':') {
        Some(colon) if bracket.is_none_or(|b| colon > b) => (userinfo, &hostport[..colon], Some(&hostport[colon + 1..])),
        _ => (userinfo, hostport, None),
    }
}

/// Percent-encodes unsafe characters, passing well-formed `%hh` escapes
/// through untouched.
pub(crate) fn encode_http_uri(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() && bytes[i + 1].is_ascii_hexdigit() && bytes[i + 2].is_ascii_hexdigit() {
            out.extend(utf8_percent_encode(&raw[start..i], HTTP_PCT_ENCODING_SET));
            out.push_str(&raw[i..i + 3]);
            i += 3;
            start = i;
        } else {
            i += 1;
        }
    }
    out.extend(utf8_percent_encode(&raw[start..], HTTP_PCT_ENCODING_SET));
    out
}
