use crate::{Column, Config, Decoded, Decoder, Encoder, Error, Value};
use bytes::BytesMut;
use num_enum::TryFromPrimitive;

#[derive(Clone, Copy, Debug, Eq, PartialEq, TryFromPrimitive)]
#[repr(u8)]
enum NullFlag {
    Present = 0,
    Null = 1,
}

/// `Nullable(T)` wrapper around a column.
///
/// A block is laid out as one null flag per row followed by the inner
/// column's values for every row, where missing rows hold the inner column's
/// zero value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Nullable<C: Column> {
    inner: C,
}

impl<C: Column> Nullable<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn read_block<D: Decoder>(
        &self,
        decoder: &mut D,
        rows: usize,
        config: Config,
    ) -> Result<Vec<Option<Decoded>>, Error> {
        tracing::trace!(column = self.inner.name(), rows, "reading nullable block");

        let flags = (0..rows)
            .map(|_| {
                let value = decoder.read_u8()?;

                NullFlag::try_from(value).map_err(|_| Error::InvalidNullFlag(value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        flags
            .into_iter()
            .map(|flag| {
                let value = self.inner.read(decoder, config)?;

                Ok(match flag {
                    NullFlag::Present => Some(value),
                    NullFlag::Null => None,
                })
            })
            .collect()
    }

    /// Writes every row or none of them.
    pub fn write_block<E: Encoder>(
        &self,
        encoder: &mut E,
        values: &[Option<Value<'_>>],
    ) -> Result<(), Error> {
        tracing::trace!(column = self.inner.name(), rows = values.len(), "writing nullable block");

        let mut bytes = BytesMut::with_capacity(values.len());

        for value in values {
            let flag = match value {
                Some(_) => NullFlag::Present,
                None => NullFlag::Null,
            };

            bytes.write_u8(flag as u8)?;
        }

        for value in values {
            match value {
                Some(value) => self.inner.write(&mut bytes, value)?,
                None => self.inner.write_zero(&mut bytes)?,
            }
        }

        encoder.write_bytes(&bytes[..])
    }
}
