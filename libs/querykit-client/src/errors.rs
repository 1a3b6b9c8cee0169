use thiserror::Error;

use crate::transport::BoxError;

/// Client error types.
///
/// Compiler and resolver failures are synchronous and surface before any
/// transport call is attempted; transport failures are relayed opaquely.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Query compilation failed (malformed filter, bad option, ...).
    #[error("query compilation failed: {0}")]
    Query(#[from] querykit_odata::Error),

    /// Neither `resource` nor `url` was supplied, so no address resolves.
    #[error("neither resource nor url was supplied")]
    MissingAddress,

    /// The injected transport reported a failure; relayed unmodified.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}
