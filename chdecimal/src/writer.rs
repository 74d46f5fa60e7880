use crate::Error;
use bytes::BufMut;
use pastey::paste;

macro_rules! write_primitive {
    ($($ty:ident),*) => {
        paste! {
            $(
                fn [<write_ $ty>](&mut self, value: $ty) -> Result<(), Error> {
                    self.write_bytes(&value.to_le_bytes())
                }
            )*
        }
    };
}

/// Byte sink handed to a column by the transport, mirroring [`Decoder`].
///
/// [`Decoder`]: crate::Decoder
pub trait Encoder {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;

    write_primitive!(u8, i32, i64);

    fn write_decimal128(&mut self, bytes: &[u8; 16]) -> Result<(), Error> {
        self.write_bytes(bytes)
    }
}

impl<B: BufMut> Encoder for B {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if self.remaining_mut() < bytes.len() {
            return Err(Error::Incomplete);
        }

        self.put_slice(bytes);

        Ok(())
    }
}
