use crate::{ColumnDescriptor, Error, float};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Zero as _;
use pastey::paste;
use std::{borrow::Cow, cmp::Ordering, str::FromStr};

/// A value supplied by the application for a single row of a column.
///
/// Native integers are taken to be the coefficient of the decimal already,
/// i.e. `1234` written to a `Decimal(9, 2)` column reads back as `12.34`.
/// Floats, strings and decimals are scaled to the column.
///
/// Values built from references (`Value::from(&x)`) are copied or borrowed;
/// a nullable column is expected to have filtered out missing values before
/// they get here.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<'a> {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(i128),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    UInt128(u128),
    Float32(f32),
    Float64(f64),
    String(Cow<'a, str>),
    BigDecimal(Cow<'a, BigDecimal>),
    #[cfg(feature = "rust_decimal")]
    Decimal(rust_decimal::Decimal),
    /// Wire-ready little-endian bytes, only accepted by 128-bit columns.
    Bytes(Cow<'a, [u8]>),
}

macro_rules! impl_from_integer {
    ($($bits:literal),*) => {
        paste! {
            $(
                impl From<[<i $bits>]> for Value<'_> {
                    fn from(value: [<i $bits>]) -> Self {
                        Self::[<Int $bits>](value)
                    }
                }

                impl From<&[<i $bits>]> for Value<'_> {
                    fn from(value: &[<i $bits>]) -> Self {
                        Self::[<Int $bits>](*value)
                    }
                }

                impl From<[<u $bits>]> for Value<'_> {
                    fn from(value: [<u $bits>]) -> Self {
                        Self::[<UInt $bits>](value)
                    }
                }

                impl From<&[<u $bits>]> for Value<'_> {
                    fn from(value: &[<u $bits>]) -> Self {
                        Self::[<UInt $bits>](*value)
                    }
                }
            )*
        }
    };
}

macro_rules! impl_from_float {
    ($($bits:literal),*) => {
        paste! {
            $(
                impl From<[<f $bits>]> for Value<'_> {
                    fn from(value: [<f $bits>]) -> Self {
                        Self::[<Float $bits>](value)
                    }
                }

                impl From<&[<f $bits>]> for Value<'_> {
                    fn from(value: &[<f $bits>]) -> Self {
                        Self::[<Float $bits>](*value)
                    }
                }
            )*
        }
    };
}

impl_from_integer!(8, 16, 32, 64, 128);
impl_from_float!(32, 64);

impl From<isize> for Value<'_> {
    fn from(value: isize) -> Self {
        Self::Int64(value as i64)
    }
}

impl From<usize> for Value<'_> {
    fn from(value: usize) -> Self {
        Self::UInt64(value as u64)
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Self::String(Cow::Borrowed(value))
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(value: &'a String) -> Self {
        Self::String(Cow::Borrowed(value))
    }
}

impl From<String> for Value<'_> {
    fn from(value: String) -> Self {
        Self::String(Cow::Owned(value))
    }
}

impl<'a> From<&'a BigDecimal> for Value<'a> {
    fn from(value: &'a BigDecimal) -> Self {
        Self::BigDecimal(Cow::Borrowed(value))
    }
}

impl From<BigDecimal> for Value<'_> {
    fn from(value: BigDecimal) -> Self {
        Self::BigDecimal(Cow::Owned(value))
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for Value<'_> {
    fn from(value: rust_decimal::Decimal) -> Self {
        Self::Decimal(value)
    }
}

#[cfg(feature = "rust_decimal")]
impl From<&rust_decimal::Decimal> for Value<'_> {
    fn from(value: &rust_decimal::Decimal) -> Self {
        Self::Decimal(*value)
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Bytes(Cow::Borrowed(value))
    }
}

impl From<Vec<u8>> for Value<'_> {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(Cow::Owned(value))
    }
}

impl From<[u8; 16]> for Value<'_> {
    fn from(value: [u8; 16]) -> Self {
        Self::Bytes(Cow::Owned(value.to_vec()))
    }
}

impl Value<'_> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Int8(_) => "Int8",
            Self::Int16(_) => "Int16",
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Int128(_) => "Int128",
            Self::UInt8(_) => "UInt8",
            Self::UInt16(_) => "UInt16",
            Self::UInt32(_) => "UInt32",
            Self::UInt64(_) => "UInt64",
            Self::UInt128(_) => "UInt128",
            Self::Float32(_) => "Float32",
            Self::Float64(_) => "Float64",
            Self::String(_) => "String",
            Self::BigDecimal(_) => "BigDecimal",
            #[cfg(feature = "rust_decimal")]
            Self::Decimal(_) => "Decimal",
            Self::Bytes(_) => "Bytes",
        }
    }

    /// Returns the unscaled integer this value stores as in a column of the
    /// given descriptor, or `None` if the value is not numeric.
    pub fn coefficient(&self, descriptor: &ColumnDescriptor) -> Result<Option<BigInt>, Error> {
        let scale = descriptor.scale();
        let from = self.type_name();
        let to = descriptor.width().type_name();

        let coefficient = match self {
            Self::Int8(value) => BigInt::from(*value),
            Self::Int16(value) => BigInt::from(*value),
            Self::Int32(value) => BigInt::from(*value),
            Self::Int64(value) => BigInt::from(*value),
            Self::Int128(value) => BigInt::from(*value),
            Self::UInt8(value) => BigInt::from(*value),
            Self::UInt16(value) => BigInt::from(*value),
            Self::UInt32(value) => BigInt::from(*value),
            Self::UInt64(value) => BigInt::from(*value),
            Self::UInt128(value) => BigInt::from(*value),
            Self::Float32(value) => float::to_fixed(*value as f64, scale, from, to)?,
            Self::Float64(value) => float::to_fixed(*value, scale, from, to)?,
            Self::String(value) => {
                let value = BigDecimal::from_str(value)?;
                let (coefficient, value_scale) = value.as_bigint_and_exponent();

                rescale(coefficient, value_scale, scale, from, to)?
            }
            Self::BigDecimal(value) => {
                let (coefficient, value_scale) = value.as_bigint_and_exponent();

                rescale(coefficient, value_scale, scale, from, to)?
            }
            #[cfg(feature = "rust_decimal")]
            Self::Decimal(value) => rescale(
                BigInt::from(value.mantissa()),
                value.scale() as i64,
                scale,
                from,
                to,
            )?,
            Self::Bool(_) | Self::Bytes(_) => return Ok(None),
        };

        Ok(Some(coefficient))
    }
}

/// Re-expresses `coefficient * 10^-value_scale` at `scale`, dropping any
/// digits beyond it.
fn rescale(
    coefficient: BigInt,
    value_scale: i64,
    scale: u8,
    from: &'static str,
    to: &'static str,
) -> Result<BigInt, Error> {
    if coefficient.is_zero() {
        return Ok(BigInt::zero());
    }

    let overflow = Error::NarrowingOverflow { from, to };

    // `scale` is non-negative, so this only fails for exponents far past any width.
    let Some(delta) = (scale as i64).checked_sub(value_scale) else {
        return Err(overflow);
    };

    match delta.cmp(&0) {
        Ordering::Equal => Ok(coefficient),
        Ordering::Greater => {
            // Any non-zero coefficient is already past every width at this point.
            if delta > 2 * crate::descriptor::MAX_PRECISION as i64 {
                return Err(overflow);
            }

            Ok(coefficient * BigInt::from(10).pow(delta as u32))
        }
        Ordering::Less => {
            let shift = delta.unsigned_abs();

            // 10^shift > 2^bits > |coefficient|
            if shift >= coefficient.bits() {
                return Ok(BigInt::zero());
            }

            Ok(coefficient / BigInt::from(10).pow(shift as u32))
        }
    }
}
