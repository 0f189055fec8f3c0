//! Errors
//!
//! Custom error types used throughout the `arbor` crate.
use thiserror::Error;

/// Errors that can occur while decoding, encoding or persisting decision tree nodes.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The type tag read from a stream is not one of the known node types.
    #[error("Unknown node type {0}, expected one of 0 (MOCKLEAF), 1 (LEAF), 2 (NUMERICAL), 3 (CATEGORICAL).")]
    UnknownNodeType(i32),
    /// A decoded field holds a value no well-formed node can carry.
    /// First value is the name of the field, second is the value read.
    #[error("Invalid value {1} decoded for {0}.")]
    InvalidField(String, i64),
    /// The stream nests nodes deeper than the configured limit.
    #[error("Node stream exceeds the maximum decode depth of {0}.")]
    DepthLimitExceeded(usize),
    /// Bytes were left over after a complete node was decoded from a buffer.
    #[error("{0} trailing bytes found after a complete node.")]
    TrailingBytes(usize),
    /// The underlying byte sink or source failed, including a source that ends mid-node.
    #[error("I/O failure on node stream: {0}")]
    Io(#[from] std::io::Error),
    /// Unable to write model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read model from file.
    #[error("Unable to read model from a file {0}")]
    UnableToRead(String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
}
