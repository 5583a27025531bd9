//! Bidirectional binding between generic messages and wire-level HTTP.
//!
//! This crate turns a transport-agnostic [`Message`] (case-insensitive
//! headers plus a body in one of a closed set of shapes) into a concrete
//! HTTP request, and maps the HTTP response back into the same message
//! shape. It owns everything between the message and the socket: URI
//! composition from per-call overrides, method selection, body
//! materialization, header filtering, the success-status gate and the
//! response-body lifecycle. It does not speak the wire protocol itself;
//! a transport (see the companion client crate) executes the requests it
//! builds.
//!
//! # Example
//!
//! Building a request is pure and needs no transport:
//!
//! ```
//! use std::sync::Arc;
//!
//! use ferry_binding::{HttpBinding, HttpConfig, Message};
//!
//! let config = Arc::new(HttpConfig::parse("http://api.example.org/v1")?);
//! let binding = HttpBinding::new(config);
//!
//! let mut message = Message::with_body("{\"ok\":true}");
//! message.set_header("Content-Type", "application/json");
//!
//! // a body is present and no method is configured, so this is a POST
//! let request = binding.build_request(&mut message)?;
//! assert_eq!(request.method().as_str(), "POST");
//! assert_eq!(request.uri().to_string(), "http://api.example.org/v1");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - [`bind`]: the [`HttpBinding`] façade orchestrating both directions
//! - [`headers`]: control-header names and the case-insensitive header bag
//! - [`uri`]: effective-URI composition from layered overrides
//! - [`filter`]: the header filter policy consulted on both sides
//! - [`error`]: configuration, request and response error taxonomy
//!
//! Per-call URI, method and protocol-version overrides travel as control
//! headers (`Ferry-Http-*`) on the message; they steer the binding and are
//! never written to the wire.

mod body;
mod charset;
mod config;
mod context;
mod message;
mod status;
mod wire;

pub mod bind;
pub mod error;
pub mod filter;
pub mod headers;
pub mod uri;

pub use bind::HttpBinding;
pub use body::{ByteStream, RequestBody};
pub use charset::{Charset, content_type_charset};
pub use config::{HttpConfig, RedirectPolicy, is_supported_method};
pub use context::{BindingContext, DefaultContext};
pub use message::{Body, Message};
pub use status::StatusRanges;
pub use wire::{ClientRequest, ClientResponse};
