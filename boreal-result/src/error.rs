use std::io;
use thiserror::Error;

/// Unified error type for all boreal operations.
///
/// The first group of variants wraps upstream library failures; the second
/// group covers the engine's own contracts. At API boundaries errors are
/// rendered as messages, while internal code matches on variants where the
/// distinction changes behavior (for example [`Error::NotFound`] during a
/// bucket stat).
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file, pipe, or stream operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arrow error during columnar data operations.
    ///
    /// Typically a schema mismatch while assembling a record batch or a
    /// failure inside a compute kernel.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error while encoding or decoding a block file.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Invalid user input or API parameter.
    ///
    /// Covers malformed block identifiers, out-of-range byte windows, table
    /// names that would corrupt the key layout, and column types an operator
    /// does not support. These are recoverable: fix the input and retry.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// A bucket object (or other named entity) does not exist.
    ///
    /// Store lookups surface this verbatim; the caller decides whether a
    /// retry makes sense.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The operation observed a cancelled token and stopped early.
    #[error("operation cancelled")]
    Cancelled,

    /// The serializer side of a block persist failed.
    ///
    /// Reported even when the concurrent upload of the truncated body
    /// appeared to succeed; the wrapped error is the original cause.
    #[error("failed to serialize block: {0}")]
    BlockSerialize(#[source] Box<Error>),

    /// The upload side of a block persist failed.
    #[error("failed to upload block: {0}")]
    BlockUpload(#[source] Box<Error>),

    /// Internal error indicating a bug or unexpected state.
    ///
    /// Should never occur during normal operation; the message names the
    /// violated invariant.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap the causal error of a failed block serialization.
    #[inline]
    pub fn block_serialize(cause: Error) -> Self {
        Error::BlockSerialize(Box::new(cause))
    }

    /// Wrap the causal error of a failed block upload.
    #[inline]
    pub fn block_upload(cause: Error) -> Self {
        Error::BlockUpload(Box::new(cause))
    }
}
