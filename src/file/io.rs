//! Bounds-checked big-endian reads of primitive values from byte buffers.
//!
//! Class files store every multi-byte value big-endian. Reads go through the [`BinaryIO`]
//! trait so that each one is checked against the buffer length and reports
//! [`crate::Error::OutOfBounds`] instead of panicking on truncated input.
//!
//! # Key Components
//!
//! - [`BinaryIO`] - Conversion trait implemented for the fixed-width integer types
//! - [`read_be_at`] - Read at an offset and advance it
//!
//! # Examples
//!
//! ```rust,ignore
//! use sdkscope::file::io::read_be_at;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE];
//! let mut offset = 0;
//! let magic: u32 = read_be_at(&data, &mut offset)?;
//! assert_eq!(magic, 0xCAFE_BABE);
//! assert_eq!(offset, 4);
//! # Ok::<(), sdkscope::Error>(())
//! ```

use crate::Result;

/// Trait for fixed-width values that can be decoded from a big-endian byte array.
pub trait BinaryIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_binary_io {
    ($($ty:ty),*) => {
        $(
            impl BinaryIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_binary_io!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Safely reads T in big-endian from a data buffer at the given offset, advancing the
/// offset past the value.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_be_at<T: BinaryIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let bytes = take::<T>(data, offset)?;
    Ok(T::from_be_bytes(bytes))
}

fn take<T: BinaryIO>(data: &[u8], offset: &mut usize) -> Result<T::Bytes> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;
    Ok(read)
}
