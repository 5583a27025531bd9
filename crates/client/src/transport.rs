use std::future::Future;

use async_trait::async_trait;

use ferry_binding::{ClientRequest, ClientResponse};

use crate::error::TransportError;

/// Executes one wire request and returns the response head with its body
/// still unread.
///
/// Implementations never retry and never inspect the response status; both
/// are the binding's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ClientRequest) -> Result<ClientResponse, TransportError>;
}

#[derive(Debug)]
pub struct TransportFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Transport for TransportFn<F>
where
    F: Fn(ClientRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ClientResponse, TransportError>> + Send,
{
    async fn send(&self, request: ClientRequest) -> Result<ClientResponse, TransportError> {
        (self.f)(request).await
    }
}

/// Wraps a closure as a [`Transport`].
pub fn make_transport<F, Fut>(f: F) -> TransportFn<F>
where
    F: Fn(ClientRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ClientResponse, TransportError>> + Send,
{
    TransportFn { f }
}
