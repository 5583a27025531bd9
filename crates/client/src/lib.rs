//! Endpoints and producers over the ferry binding.
//!
//! This crate executes the wire requests that `ferry_binding` builds. An
//! [`HttpEndpoint`] owns a validated configuration cell and one shared
//! transport; it mints [`Producer`]s (async) and [`BlockingProducer`]s
//! (synchronous callers), each pinned to the configuration snapshot it was
//! minted with. The bundled transport drives a shared `reqwest` engine;
//! any [`Transport`] implementation can stand in for it.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use ferry_binding::{HttpConfig, Message};
//! use ferry_client::HttpEndpoint;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = HttpConfig::parse("https://api.example.org/v1")?;
//!     config.set_response_timeout(Duration::from_secs(10));
//!
//!     let endpoint = HttpEndpoint::builder(config).build()?;
//!     let producer = endpoint.blocking_producer()?;
//!
//!     let mut message = Message::new();
//!     message.set_header("Ferry-Http-Path", "users/42");
//!     producer.send(&mut message)?;
//!
//!     println!("status: {:?}", message.header("Ferry-Http-Response-Code"));
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`HttpEndpoint`] / [`EndpointBuilder`]: configuration cell, transport
//!   resolution, producer minting
//! - [`Producer`] / [`BlockingProducer`]: the dual-mode call pipeline
//! - [`transport`]: the [`Transport`] seam and its closure adapter
//! - [`SharedClient`]: the bundled `reqwest`-backed transport
//! - [`error`]: transport, call and endpoint-build error taxonomy

mod endpoint;
mod producer;
mod shared;

pub mod error;
pub mod transport;

pub use endpoint::{EndpointBuilder, HttpEndpoint};
pub use producer::{BlockingProducer, Producer};
pub use shared::SharedClient;
pub use transport::{Transport, make_transport};
