use std::io;

use http::{StatusCode, Uri};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("status code ranges has invalid format: {spec}")]
    InvalidStatusRanges { spec: String },

    #[error("max connections must be at least 1, got {value}")]
    InvalidMaxConnections { value: usize },

    #[error("http/2 priority must be within 1..=256, got {value}")]
    InvalidHttp2Priority { value: u32 },

    #[error("invalid base uri: {reason}")]
    InvalidBaseUri { reason: String },

    #[error("unsupported http method: {method}")]
    UnsupportedMethod { method: String },

    #[error("proxy host `{host}` is set but proxy port is missing")]
    IncompleteProxy { host: String },
}

impl ConfigError {
    pub fn invalid_status_ranges<S: ToString>(spec: S) -> Self {
        Self::InvalidStatusRanges { spec: spec.to_string() }
    }

    pub fn invalid_max_connections(value: usize) -> Self {
        Self::InvalidMaxConnections { value }
    }

    pub fn invalid_http2_priority(value: u32) -> Self {
        Self::InvalidHttp2Priority { value }
    }

    pub fn invalid_base_uri<S: ToString>(reason: S) -> Self {
        Self::InvalidBaseUri { reason: reason.to_string() }
    }

    pub fn unsupported_method<S: ToString>(method: S) -> Self {
        Self::UnsupportedMethod { method: method.to_string() }
    }

    pub fn incomplete_proxy<S: ToString>(host: S) -> Self {
        Self::IncompleteProxy { host: host.to_string() }
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request uri: {reason}")]
    InvalidUri { reason: String },

    #[error("invalid {part} override: {value}")]
    InvalidOverride { part: &'static str, value: String },

    #[error("unsupported http method: {method}")]
    UnsupportedMethod { method: String },

    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("unsupported charset: {label}")]
    UnsupportedCharset { label: String },

    #[error("placeholder resolution failed: {reason}")]
    Placeholder { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl RequestError {
    pub fn invalid_uri<S: ToString>(reason: S) -> Self {
        Self::InvalidUri { reason: reason.to_string() }
    }

    pub fn invalid_override<S: ToString>(part: &'static str, value: S) -> Self {
        Self::InvalidOverride { part, value: value.to_string() }
    }

    pub fn unsupported_method<S: ToString>(method: S) -> Self {
        Self::UnsupportedMethod { method: method.to_string() }
    }

    pub fn invalid_header<N: ToString, S: ToString>(name: N, reason: S) -> Self {
        Self::InvalidHeader { name: name.to_string(), reason: reason.to_string() }
    }

    pub fn unsupported_charset<S: ToString>(label: S) -> Self {
        Self::UnsupportedCharset { label: label.to_string() }
    }

    pub fn placeholder<S: ToString>(reason: S) -> Self {
        Self::Placeholder { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("{source}")]
    OperationFailed {
        #[from]
        source: OperationFailed,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ResponseError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn operation_failed(&self) -> Option<&OperationFailed> {
        match self {
            Self::OperationFailed { source } => Some(source),
            Self::Io { .. } => None,
        }
    }
}

/// Failure raised when a response status falls outside the configured
/// success set and throw-on-failure is enabled.
#[derive(Debug, Error)]
#[error("http operation failed with status {status}, uri: {uri}")]
pub struct OperationFailed {
    pub uri: Uri,
    pub status: StatusCode,
    pub status_text: Option<String>,
    pub location: Option<String>,
}

impl OperationFailed {
    pub fn new(uri: Uri, status: StatusCode, location: Option<String>) -> Self {
        let status_text = status.canonical_reason().map(str::to_owned);
        Self { uri, status, status_text, location }
    }
}
