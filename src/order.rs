//! Byte-order selection for fixed-width integers
//!
//! Integers are first converted with the host's native routine (see
//! [`Integral::native_bytes`](crate::integral::Integral::native_bytes)), and
//! [`ByteOrder::orient`] then decides whether that buffer must be reversed
//! to match the order requested by the caller.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::InvalidArgument;

/// Byte orders (endianness) supported when appending integers
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    /// Least significant byte first
    #[default]
    LittleEndian,
    /// Most significant byte first
    BigEndian,
}

impl ByteOrder {
    cfg_if::cfg_if! {
        if #[cfg(target_endian = "big")] {
            /// Byte order of the host's native integer-to-bytes conversion
            pub const NATIVE: ByteOrder = ByteOrder::BigEndian;
        } else {
            /// Byte order of the host's native integer-to-bytes conversion
            pub const NATIVE: ByteOrder = ByteOrder::LittleEndian;
        }
    }

    /// Returns `true` if a buffer in native order must be reversed to be in order `self`
    #[inline]
    #[must_use]
    pub const fn requires_swap(self) -> bool {
        !matches!(
            (self, Self::NATIVE),
            (ByteOrder::LittleEndian, ByteOrder::LittleEndian)
                | (ByteOrder::BigEndian, ByteOrder::BigEndian)
        )
    }

    /// Converts a native-order buffer into one in order `self`.
    ///
    /// The buffer is taken by value, so the reversal (when one is needed)
    /// can never be observed through another handle to the same storage.
    #[inline]
    #[must_use]
    pub fn orient<B: AsMut<[u8]>>(self, mut bytes: B) -> B {
        if self.requires_swap() {
            bytes.as_mut().reverse();
        }
        bytes
    }

    /// Canonical lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "little-endian",
            ByteOrder::BigEndian => "big-endian",
        }
    }
}

impl Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ByteOrder {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" | "little-endian" | "littleendian" => Ok(ByteOrder::LittleEndian),
            "big" | "be" | "big-endian" | "bigendian" | "network" => Ok(ByteOrder::BigEndian),
            _ => Err(InvalidArgument::UnknownByteOrder(s.to_owned())),
        }
    }
}
