/// Formats a sequence of bytes as a `String` containing a lowercase hexadecimal blob
///
/// # Examples
///
/// ```
/// # use databuilder::util::hex_of_bytes;
/// assert_eq!(hex_of_bytes(vec![0xde, 0xad, 0xbe, 0xef]), String::from("deadbeef"));
/// ```
#[must_use]
pub fn hex_of_bytes<T>(val: T) -> String
where
    T: AsRef<[u8]>,
{
    format!("{:?}", HexBlob(val.as_ref()))
}

/// `Debug` adapter that renders a byte slice as a hex blob
pub(crate) struct HexBlob<'a>(pub(crate) &'a [u8]);

impl std::fmt::Debug for HexBlob<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
