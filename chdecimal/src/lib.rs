mod decimal;
mod descriptor;
mod float;
pub mod int128;
mod nullable;
mod reader;
mod value;
mod writer;

use bytes::BytesMut;
use thiserror::Error;

pub use crate::decimal::{Decoded, DecimalColumn};
pub use crate::descriptor::{ColumnDescriptor, MAX_PRECISION, Width};
pub use crate::nullable::Nullable;
pub use crate::reader::Decoder;
pub use crate::value::Value;
pub use crate::writer::Encoder;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid Decimal format: '{0}'")]
    MalformedTypeDescriptor(String),
    #[error("wrong precision of Decimal type: '{0}'")]
    InvalidPrecision(String),
    #[error("wrong scale of Decimal type: '{0}'")]
    InvalidScale(String),
    #[error("precision of Decimal exceeds max bound: {0}")]
    PrecisionOutOfRange(i64),
    #[error("column {column}: unexpected value of type {value}")]
    UnsupportedValueType { value: &'static str, column: String },
    #[error("overflow when narrowing type conversion from {from} to {to}")]
    NarrowingOverflow {
        from: &'static str,
        to: &'static str,
    },
    #[error("expected 16 bytes, got {0}")]
    InvalidBufferLength(usize),
    #[error("incomplete")]
    Incomplete,
    #[error("invalid null flag {0}")]
    InvalidNullFlag(u8),
    #[error(transparent)]
    ParseDecimal(#[from] bigdecimal::ParseBigDecimalError),
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Config {
    parse_decimal: bool,
}

impl Config {
    /// Decode values as their canonical decimal string.
    pub fn string_decimal(&mut self) -> &mut Self {
        self.parse_decimal = false;
        self
    }

    /// Decode values as a [`bigdecimal::BigDecimal`] instead of a string.
    pub fn parse_decimal(&mut self) -> &mut Self {
        self.parse_decimal = true;
        self
    }

    pub fn parses_decimal(&self) -> bool {
        self.parse_decimal
    }
}

/// A column codec that reads and writes one value per row.
pub trait Column {
    fn name(&self) -> &str;

    fn read<D: Decoder>(&self, decoder: &mut D, config: Config) -> Result<Decoded, Error>;

    fn write<E: Encoder>(&self, encoder: &mut E, value: &Value<'_>) -> Result<(), Error>;

    /// Writes the value that stands in for a missing row.
    fn write_zero<E: Encoder>(&self, encoder: &mut E) -> Result<(), Error>;

    fn read_block<D: Decoder>(
        &self,
        decoder: &mut D,
        rows: usize,
        config: Config,
    ) -> Result<Vec<Decoded>, Error> {
        tracing::trace!(column = self.name(), rows, "reading block");

        (0..rows).map(|_| self.read(decoder, config)).collect()
    }

    /// Writes every value or none of them.
    fn write_block<E: Encoder>(&self, encoder: &mut E, values: &[Value<'_>]) -> Result<(), Error> {
        tracing::trace!(column = self.name(), rows = values.len(), "writing block");

        let mut bytes = BytesMut::new();

        for value in values {
            self.write(&mut bytes, value)?;
        }

        encoder.write_bytes(&bytes[..])
    }
}
