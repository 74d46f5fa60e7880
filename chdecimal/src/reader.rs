use crate::Error;
use bytes::Buf;
use pastey::paste;

macro_rules! read_primitive {
    ($($ty:ident),*) => {
        paste! {
            $(
                fn [<read_ $ty>](&mut self) -> Result<$ty, Error> {
                    Ok(<$ty>::from_le_bytes(self.read_array()?))
                }
            )*
        }
    };
}

/// Byte source handed to a column by the transport. Every integer on the
/// wire is fixed-width little-endian.
pub trait Decoder {
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error>;

    read_primitive!(u8, i32, i64);

    fn read_decimal128(&mut self) -> Result<[u8; 16], Error> {
        self.read_array()
    }
}

impl<B: Buf> Decoder for B {
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        if self.remaining() < N {
            return Err(Error::Incomplete);
        }

        let mut bytes = [0u8; N];
        self.copy_to_slice(&mut bytes);

        Ok(bytes)
    }
}
