//! Error types for precondition violations
//!
//! Every fallible operation in this crate fails eagerly, inside the call
//! that received the offending argument, and always with a variant of
//! [`InvalidArgument`]. Materializing a recipe never fails.

use thiserror::Error;

/// Enumerated error type for arguments rejected by a [`DataBuilder`] or by
/// one of the named-configuration lookups.
///
/// [`DataBuilder`]: crate::DataBuilder
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[non_exhaustive]
pub enum InvalidArgument {
    /// Label did not name any supported text encoding
    #[error("unrecognized text encoding `{0}`")]
    UnknownEncoding(String),
    /// Label did not name either supported byte order
    #[error("unrecognized byte order `{0}`")]
    UnknownByteOrder(String),
    /// A builder was passed as its own repeat pattern
    #[error("a builder cannot repeat itself")]
    SelfRepeat,
    /// The repeat pattern already references the receiving builder, directly or through nested patterns
    #[error("pattern already repeats the receiving builder; repeating it would form a cycle")]
    CyclicRepeat,
}

pub type Result<T> = std::result::Result<T, InvalidArgument>;
