//! Binding façade: message to wire request, wire response to message.

mod request;
mod response;

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::HttpConfig;
use crate::context::{BindingContext, DefaultContext};
use crate::error::{RequestError, ResponseError};
use crate::filter::{HeaderFilter, StandardHeaderFilter};
use crate::message::Message;
use crate::wire::{ClientRequest, ClientResponse};

static DEFAULT_FILTER: Lazy<Arc<dyn HeaderFilter>> = Lazy::new(|| Arc::new(StandardHeaderFilter));
static DEFAULT_CONTEXT: Lazy<Arc<dyn BindingContext>> = Lazy::new(|| Arc::new(DefaultContext));

/// Stateless translator between messages and the wire.
///
/// Holds an immutable config snapshot plus the filter and context
/// collaborators. Both directions are pure over their inputs, so one
/// binding serves any number of concurrent calls.
#[derive(Clone)]
pub struct HttpBinding {
    config: Arc<HttpConfig>,
    filter: Arc<dyn HeaderFilter>,
    context: Arc<dyn BindingContext>,
}

impl HttpBinding {
    /// Binding with the default filter policy and context.
    pub fn new(config: Arc<HttpConfig>) -> Self {
        Self { config, filter: Arc::clone(&DEFAULT_FILTER), context: Arc::clone(&DEFAULT_CONTEXT) }
    }

    pub fn with_filter(mut self, filter: Arc<dyn HeaderFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_context(mut self, context: Arc<dyn BindingContext>) -> Self {
        self.context = context;
        self
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Translates `message` into a wire request. The message body is
    /// consumed, whatever method ends up selected.
    pub fn build_request(&self, message: &mut Message) -> Result<ClientRequest, RequestError> {
        request::build_request(message, &self.config, self.filter.as_ref(), self.context.as_ref())
    }

    /// Writes the wire response back into `message`: status gate first, then
    /// metadata, filtered headers and the configured body form.
    pub async fn map_response(&self, response: ClientResponse, message: &mut Message) -> Result<(), ResponseError> {
        response::map_response(response, message, &self.config, self.filter.as_ref()).await
    }
}

impl fmt::Debug for HttpBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBinding").field("config", &self.config).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::body::ByteStream;

    fn check_send<T: Send + Sync>() {}

    #[test]
    fn is_shareable() {
        check_send::<HttpBinding>();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn round_trip_preserves_filter_accepted_headers() {
        let config = Arc::new(HttpConfig::parse("http://example.org/api").unwrap());
        let binding = HttpBinding::new(config);

        let mut outbound = Message::new();
        outbound.set_header("Content-Type", "text/plain; charset=utf-8");
        outbound.set_header("X-Trace-Id", "abc-123");
        outbound.headers_mut().append("Accept-Encoding", "gzip");
        outbound.headers_mut().append("Accept-Encoding", "br");
        outbound.set_body("ping");

        let request = binding.build_request(&mut outbound).unwrap();

        let echoed = request.headers().clone();
        let response =
            ClientResponse::new(request.uri().clone(), StatusCode::OK, echoed, ByteStream::cached(Bytes::from_static(b"pong")));

        let mut inbound = Message::new();
        binding.map_response(response, &mut inbound).await.unwrap();

        assert_eq!(inbound.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(inbound.header("x-trace-id"), Some("abc-123"));
        let encodings = inbound.headers().get("accept-encoding").unwrap();
        assert_eq!(encodings.iter().collect::<Vec<_>>(), ["gzip", "br"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn swapped_collaborators_are_used() {
        use crate::filter::fn_filter;

        let config = Arc::new(HttpConfig::parse("http://example.org").unwrap());
        let binding =
            HttpBinding::new(config).with_filter(Arc::new(fn_filter(|_, name, _| !name.eq_ignore_ascii_case("x-drop"))));

        let mut message = Message::new();
        message.set_header("X-Drop", "gone");
        message.set_header("X-Keep", "kept");

        let request = binding.build_request(&mut message).unwrap();
        assert!(request.headers().get("x-drop").is_none());
        assert_eq!(request.headers().get("x-keep").unwrap(), "kept");
    }
}
