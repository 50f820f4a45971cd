//! Fixed-width integers accepted by [`DataBuilder::append_int`](crate::DataBuilder::append_int)

mod private {
    pub trait Sealed {}
}

/// Primitive integer with a fixed serialized width.
///
/// The byte sequence returned by [`native_bytes`](Integral::native_bytes) is
/// always in the host's native order; reorienting it is the job of
/// [`ByteOrder::orient`](crate::ByteOrder::orient).
pub trait Integral: Copy + private::Sealed {
    /// Invariant byte-width of every value of `Self`
    const LEN: usize;

    /// Array type holding exactly `LEN` bytes
    type Bytes: AsRef<[u8]> + AsMut<[u8]>;

    /// Converts `self` into its byte representation in native order
    fn native_bytes(self) -> Self::Bytes;
}

macro_rules! impl_integral {
    ($n:expr, $($x:ty),+) => {
        $(
            impl private::Sealed for $x {}

            impl Integral for $x {
                const LEN: usize = $n;

                type Bytes = [u8; $n];

                #[inline]
                fn native_bytes(self) -> Self::Bytes {
                    self.to_ne_bytes()
                }
            }
        )+
    };
}

impl_integral!(1, u8, i8);
impl_integral!(2, u16, i16);
impl_integral!(4, u32, i32);
impl_integral!(8, u64, i64);
