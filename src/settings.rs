//! Bundled builder configuration
//!
//! A [`Settings`] value captures the two knobs that influence how appended
//! values are converted into bytes. With the `serde_impls` feature enabled it
//! can be deserialized, so fixture suites may keep their defaults alongside
//! other test configuration.

use crate::{encoding::TextEncoding, order::ByteOrder};

/// Text encoding and byte order applied to subsequent appends
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde_impls", serde(default))]
pub struct Settings {
    /// Encoding used by `append_text`
    pub encoding: TextEncoding,
    /// Byte order used by integer appends
    pub byte_order: ByteOrder,
}

impl Settings {
    /// Bundles an encoding and a byte order
    #[must_use]
    pub const fn new(encoding: TextEncoding, byte_order: ByteOrder) -> Self {
        Self {
            encoding,
            byte_order,
        }
    }

    /// Returns a copy with the encoding replaced
    #[must_use]
    pub const fn with_encoding(self, encoding: TextEncoding) -> Self {
        Self { encoding, ..self }
    }

    /// Returns a copy with the byte order replaced
    #[must_use]
    pub const fn with_byte_order(self, byte_order: ByteOrder) -> Self {
        Self { byte_order, ..self }
    }
}
