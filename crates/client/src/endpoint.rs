//! Endpoint: the validated configuration cell, the shared transport, and
//! producer minting.
//!
//! The live configuration sits in an [`ArcSwap`]; reconfiguration swaps
//! whole snapshots, so producers keep the snapshot they were minted with
//! and concurrent readers never observe a half-edited configuration.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use ferry_binding::error::ConfigError;
use ferry_binding::filter::HeaderFilter;
use ferry_binding::{BindingContext, HttpBinding, HttpConfig};

use crate::error::EndpointBuildError;
use crate::producer::{BlockingProducer, Producer};
use crate::shared::SharedClient;
use crate::transport::Transport;

pub struct EndpointBuilder {
    config: HttpConfig,
    transport: Option<Arc<dyn Transport>>,
    filter: Option<Arc<dyn HeaderFilter>>,
    context: Option<Arc<dyn BindingContext>>,
}

impl EndpointBuilder {
    fn new(config: HttpConfig) -> Self {
        Self { config, transport: None, filter: None, context: None }
    }

    /// Replaces the bundled engine with a caller-supplied transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn header_filter(mut self, filter: Arc<dyn HeaderFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn context(mut self, context: Arc<dyn BindingContext>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn build(self) -> Result<HttpEndpoint, EndpointBuildError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(SharedClient::from_config(&self.config)?),
        };
        Ok(HttpEndpoint {
            config: ArcSwap::from_pointee(self.config),
            transport,
            filter: self.filter,
            context: self.context,
        })
    }
}

impl fmt::Debug for EndpointBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBuilder").finish_non_exhaustive()
    }
}

/// One configured remote endpoint. The transport is resolved once at build
/// time and shared by every producer minted from here.
pub struct HttpEndpoint {
    config: ArcSwap<HttpConfig>,
    transport: Arc<dyn Transport>,
    filter: Option<Arc<dyn HeaderFilter>>,
    context: Option<Arc<dyn BindingContext>>,
}

impl HttpEndpoint {
    pub fn builder(config: HttpConfig) -> EndpointBuilder {
        EndpointBuilder::new(config)
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<HttpConfig> {
        self.config.load_full()
    }

    /// Applies `edit` to a copy of the live configuration and installs the
    /// copy atomically. A failed edit installs nothing.
    pub fn reconfigure(
        &self,
        edit: impl FnOnce(&mut HttpConfig) -> Result<(), ConfigError>,
    ) -> Result<(), ConfigError> {
        let current = self.config.load_full();
        let mut next = (*current).clone();
        edit(&mut next)?;
        self.config.store(Arc::new(next));
        debug!("installed new endpoint configuration");
        Ok(())
    }

    fn binding(&self) -> HttpBinding {
        let mut binding = HttpBinding::new(self.config.load_full());
        if let Some(filter) = &self.filter {
            binding = binding.with_filter(Arc::clone(filter));
        }
        if let Some(context) = &self.context {
            binding = binding.with_context(Arc::clone(context));
        }
        binding
    }

    /// Mints an async producer over the current snapshot.
    pub fn producer(&self) -> Producer {
        Producer::new(self.binding(), Arc::clone(&self.transport))
    }

    /// Mints a blocking producer over the current snapshot.
    pub fn blocking_producer(&self) -> Result<BlockingProducer, EndpointBuildError> {
        BlockingProducer::new(self.producer())
    }
}

impl fmt::Debug for HttpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpEndpoint").finish_non_exhaustive()
    }
}
