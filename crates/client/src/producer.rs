//! Producers drive one call end to end: build the wire request, dispatch
//! it through the transport, map the response back into the message.
//!
//! A producer holds an immutable configuration snapshot; reconfiguring the
//! endpoint affects producers minted afterwards, never existing ones.

use std::fmt;
use std::sync::Arc;

use tokio::runtime;
use tracing::debug;

use ferry_binding::{HttpBinding, HttpConfig, Message};

use crate::error::{CallError, EndpointBuildError};
use crate::transport::Transport;

/// Async producer. Shareable; one instance can drive any number of
/// concurrent calls.
#[derive(Clone)]
pub struct Producer {
    binding: HttpBinding,
    transport: Arc<dyn Transport>,
}

impl Producer {
    pub fn new(binding: HttpBinding, transport: Arc<dyn Transport>) -> Self {
        Self { binding, transport }
    }

    #[inline]
    pub fn config(&self) -> &HttpConfig {
        self.binding.config()
    }

    /// Runs one call. Request-build failures return before the transport is
    /// touched; the request body is released when dispatch concludes, and
    /// the response body is either moved into the message or dropped by the
    /// mapping path that consumed it.
    pub async fn send(&self, message: &mut Message) -> Result<(), CallError> {
        let request = self.binding.build_request(message)?;
        let response = self.transport.send(request).await?;
        self.binding.map_response(response, message).await?;
        Ok(())
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").finish_non_exhaustive()
    }
}

/// Blocking producer for synchronous callers. Owns a current-thread runtime
/// that drives the call's I/O on the calling thread.
pub struct BlockingProducer {
    inner: Producer,
    runtime: runtime::Runtime,
}

impl BlockingProducer {
    pub fn new(inner: Producer) -> Result<Self, EndpointBuildError> {
        let runtime = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EndpointBuildError::runtime)?;
        Ok(Self { inner, runtime })
    }

    #[inline]
    pub fn config(&self) -> &HttpConfig {
        self.inner.config()
    }

    /// Runs one call to completion on the calling thread.
    ///
    /// Refused with [`CallError::BlockedRuntime`] when the caller is already
    /// inside an async runtime; parking such a thread could deadlock its
    /// executor.
    pub fn send(&self, message: &mut Message) -> Result<(), CallError> {
        if runtime::Handle::try_current().is_ok() {
            debug!("blocking call rejected inside an async context");
            return Err(CallError::BlockedRuntime);
        }
        self.runtime.block_on(self.inner.send(message))
    }
}

impl fmt::Debug for BlockingProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingProducer").finish_non_exhaustive()
    }
}
