//! Metadata errors
//!
//! Only malformed input ends up here. Type mismatches and unresolvable
//! classes degrade to error values and empty annotations instead.

use crate::encoder::DecodeError;
use crate::proto::VERSION;
use thiserror::Error;

/// Result alias for fallible metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Fatal metadata errors (malformed or incompatible binary)
#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    /// Byte-level decode error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Invalid magic number
    #[error("Invalid magic number: expected TSMD, got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Unsupported format version
    #[error("Unsupported version: {0} (current: {})", VERSION)]
    UnsupportedVersion(u32),

    /// String table index out of range
    #[error("String index {0} is out of range")]
    StringIndexOutOfRange(u32),

    /// Class id table index out of range
    #[error("Class id index {0} is out of range")]
    ClassIdIndexOutOfRange(u32),

    /// Wire value kind unknown to this reader
    #[error("Unsupported annotation argument type: {tag} (expected {expected})")]
    UnrecognizedValueKind {
        /// Raw kind tag
        tag: u8,
        /// Expected type of the argument
        expected: String,
    },

    /// `ANNOTATION` value without a nested annotation
    #[error("Annotation value has no annotation payload")]
    MissingAnnotationPayload,
}
