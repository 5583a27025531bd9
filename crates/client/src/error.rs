use std::io;

use ferry_binding::error::{ConfigError, OperationFailed, RequestError, ResponseError};
use thiserror::Error;

/// Failure inside the transport engine, between a built request and the
/// response head.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {reason}")]
    Connect { reason: String },

    #[error("request timed out: {reason}")]
    Timeout { reason: String },

    #[error("protocol error: {reason}")]
    Protocol { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl TransportError {
    pub fn connect<S: ToString>(reason: S) -> Self {
        Self::Connect { reason: reason.to_string() }
    }

    pub fn timeout<S: ToString>(reason: S) -> Self {
        Self::Timeout { reason: reason.to_string() }
    }

    pub fn protocol<S: ToString>(reason: S) -> Self {
        Self::Protocol { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Failure of a single produced call, in the phase order the call runs:
/// request building, transport, response mapping.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("request error: {source}")]
    Request {
        #[from]
        source: RequestError,
    },

    #[error("transport error: {source}")]
    Transport {
        #[from]
        source: TransportError,
    },

    #[error("response error: {source}")]
    Response {
        #[from]
        source: ResponseError,
    },

    #[error("blocking call from inside an async runtime; use the async producer")]
    BlockedRuntime,
}

impl CallError {
    /// The typed operation failure, when the call was rejected by the
    /// success-status gate.
    pub fn operation_failure(&self) -> Option<&OperationFailed> {
        match self {
            Self::Response { source } => source.operation_failed(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum EndpointBuildError {
    #[error("config error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("transport engine construction failed: {reason}")]
    Engine { reason: String },

    #[error("runtime construction failed: {source}")]
    Runtime {
        #[source]
        source: io::Error,
    },
}

impl EndpointBuildError {
    pub fn engine<S: ToString>(reason: S) -> Self {
        Self::Engine { reason: reason.to_string() }
    }

    pub fn runtime(source: io::Error) -> Self {
        Self::Runtime { source }
    }
}
