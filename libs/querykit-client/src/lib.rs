//! Transport-agnostic OData request dispatcher.
//!
//! This crate is the dispatch half of the querykit workspace. It resolves
//! call-level parameters, instance configuration, and per-method overrides
//! into one outbound request descriptor, compiles the attached query
//! options via `querykit-odata`, and hands the result to an injected
//! [`Transport`].
//!
//! The crate never opens a socket: the transport owns all I/O concerns
//! (retries, timeouts, TLS). Compiler and resolver failures surface
//! synchronously, before any request leaves the process; transport
//! failures are relayed to the caller unchanged.

mod client;
mod errors;
mod params;
mod resolver;
mod transport;

pub use client::Client;
pub use errors::Error;
pub use params::{ClientConfig, MethodParamMap, ParamMap, Params};
pub use resolver::{ResolvedRequest, resolve};
pub use transport::{BoxError, Transport};

pub use http::Method;
