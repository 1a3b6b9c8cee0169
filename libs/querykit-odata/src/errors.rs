use thiserror::Error;

/// Unified error type for query construction and compilation.
///
/// All variants are raised synchronously, before any request leaves the
/// process; a malformed query never produces partial output.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Grammar violations: empty filter objects or groups, misplaced
    /// operator keys, lambdas outside `$any`/`$all`, raw-template
    /// placeholder mismatches.
    #[error("malformed filter: {0}")]
    MalformedFilter(String),

    /// A value that has no literal rendering where a literal is required.
    #[error("unsupported literal type: {0}")]
    UnsupportedLiteralType(String),

    /// Invalid query options: negative or non-integer `$top`/`$skip`,
    /// unrecognized option keys, bad sort directions.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}
