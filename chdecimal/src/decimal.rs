use crate::{
    Column, ColumnDescriptor, Config, Decoder, Encoder, Error, Value, Width, int128,
};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use std::{fmt, str::FromStr};

/// A decoded `Decimal` value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decoded {
    String(String),
    Decimal(BigDecimal),
}

impl Decoded {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            Self::Decimal(_) => None,
        }
    }

    pub fn into_big_decimal(self) -> Result<BigDecimal, Error> {
        match self {
            Self::String(value) => Ok(BigDecimal::from_str(&value)?),
            Self::Decimal(value) => Ok(value),
        }
    }
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Decimal(value) => {
                let (coefficient, scale) = value.as_bigint_and_exponent();

                if scale >= 0 {
                    return f.write_str(&format_big(&coefficient, scale as usize));
                }

                match u32::try_from(scale.unsigned_abs()) {
                    Ok(exponent) => {
                        let coefficient = coefficient * BigInt::from(10).pow(exponent);

                        f.write_str(&format_big(&coefficient, 0))
                    }
                    // Too many digits to spell out.
                    Err(_) => fmt::Display::fmt(value, f),
                }
            }
        }
    }
}

/// Places the decimal point `scale` digits from the right of `digits`.
fn format_scaled(negative: bool, digits: &str, scale: usize) -> String {
    let mut s = String::with_capacity(digits.len() + scale + 3);

    if negative {
        s.push('-');
    }

    if scale == 0 {
        s.push_str(digits);
    } else if digits.len() > scale {
        let (integer, fraction) = digits.split_at(digits.len() - scale);

        s.push_str(integer);
        s.push('.');
        s.push_str(fraction);
    } else {
        s.push_str("0.");
        s.extend(std::iter::repeat_n('0', scale - digits.len()));
        s.push_str(digits);
    }

    s
}

fn format_big(coefficient: &BigInt, scale: usize) -> String {
    format_scaled(
        coefficient.sign() == Sign::Minus,
        &coefficient.magnitude().to_string(),
        scale,
    )
}

/// Codec for a `Decimal(P, S)` column.
///
/// Precision 1 through 9 is stored as `Int32`, 10 through 18 as `Int64` and
/// 19 through 38 as a 16-byte little-endian two's-complement `Int128`. The
/// stored integer is the value multiplied by `10^S`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecimalColumn {
    name: String,
    ch_type: String,
    descriptor: ColumnDescriptor,
}

impl DecimalColumn {
    pub fn parse(name: impl Into<String>, ch_type: &str) -> Result<Self, Error> {
        let name = name.into();
        let descriptor = ch_type.parse::<ColumnDescriptor>()?;

        tracing::debug!(
            column = %name,
            precision = descriptor.precision(),
            scale = descriptor.scale(),
            bits = descriptor.width().bits(),
            "resolved decimal column"
        );

        Ok(Self {
            name,
            ch_type: ch_type.to_string(),
            descriptor,
        })
    }

    pub fn ch_type(&self) -> &str {
        &self.ch_type
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    pub fn precision(&self) -> u8 {
        self.descriptor.precision()
    }

    pub fn scale(&self) -> u8 {
        self.descriptor.scale()
    }

    pub fn width(&self) -> Width {
        self.descriptor.width()
    }

    fn coefficient(&self, value: &Value<'_>) -> Result<BigInt, Error> {
        value
            .coefficient(&self.descriptor)?
            .ok_or_else(|| Error::UnsupportedValueType {
                value: value.type_name(),
                column: self.name.clone(),
            })
    }

    fn overflow(&self, value: &Value<'_>) -> Error {
        Error::NarrowingOverflow {
            from: value.type_name(),
            to: self.width().type_name(),
        }
    }

    fn encode<E: Encoder>(&self, encoder: &mut E, value: &Value<'_>) -> Result<(), Error> {
        match self.width() {
            Width::Bits32 => {
                let coefficient = self.coefficient(value)?;
                let value = i32::try_from(&coefficient).map_err(|_| self.overflow(value))?;

                encoder.write_i32(value)
            }
            Width::Bits64 => {
                let coefficient = self.coefficient(value)?;
                let value = i64::try_from(&coefficient).map_err(|_| self.overflow(value))?;

                encoder.write_i64(value)
            }
            Width::Bits128 => {
                let bytes = match value {
                    Value::Bytes(bytes) => <[u8; 16]>::try_from(&bytes[..])
                        .map_err(|_| Error::InvalidBufferLength(bytes.len()))?,
                    value => {
                        let coefficient = self.coefficient(value)?;

                        int128::to_bytes(&coefficient).map_err(|_| self.overflow(value))?
                    }
                };

                encoder.write_decimal128(&bytes)
            }
        }
    }

    fn decoded(&self, coefficient: BigInt, config: Config) -> Decoded {
        let scale = self.scale();

        if config.parses_decimal() {
            Decoded::Decimal(BigDecimal::new(coefficient, scale as i64))
        } else {
            Decoded::String(format_big(&coefficient, scale as usize))
        }
    }
}

impl Column for DecimalColumn {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<D: Decoder>(&self, decoder: &mut D, config: Config) -> Result<Decoded, Error> {
        let scale = self.scale() as usize;

        let value = match self.width() {
            Width::Bits32 => {
                let value = decoder.read_i32()?;

                if !config.parses_decimal() {
                    let digits = value.unsigned_abs().to_string();

                    return Ok(Decoded::String(format_scaled(value < 0, &digits, scale)));
                }

                self.decoded(BigInt::from(value), config)
            }
            Width::Bits64 => {
                let value = decoder.read_i64()?;

                if !config.parses_decimal() {
                    let digits = value.unsigned_abs().to_string();

                    return Ok(Decoded::String(format_scaled(value < 0, &digits, scale)));
                }

                self.decoded(BigInt::from(value), config)
            }
            Width::Bits128 => self.decoded(int128::from_bytes(decoder.read_decimal128()?), config),
        };

        Ok(value)
    }

    fn write<E: Encoder>(&self, encoder: &mut E, value: &Value<'_>) -> Result<(), Error> {
        let result = self.encode(encoder, value);

        if let Err(err) = &result {
            tracing::debug!(
                column = %self.name,
                value = value.type_name(),
                error = %err,
                "rejected decimal value"
            );
        }

        result
    }

    fn write_zero<E: Encoder>(&self, encoder: &mut E) -> Result<(), Error> {
        match self.width() {
            Width::Bits32 => encoder.write_i32(0),
            Width::Bits64 => encoder.write_i64(0),
            Width::Bits128 => encoder.write_decimal128(&[0; 16]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn column(ch_type: &str) -> DecimalColumn {
        DecimalColumn::parse("price", ch_type).unwrap()
    }

    fn encode(column: &DecimalColumn, value: Value<'_>) -> Result<BytesMut, Error> {
        let mut bytes = BytesMut::new();
        column.write(&mut bytes, &value)?;

        Ok(bytes)
    }

    fn round_trip(column: &DecimalColumn, value: Value<'_>) -> String {
        let bytes = encode(column, value).unwrap();
        let mut slice = &bytes[..];

        let decoded = column.read(&mut slice, Config::default()).unwrap();
        assert!(slice.is_empty());

        decoded.to_string()
    }

    #[test]
    fn formats_with_exact_scale() {
        assert_eq!(format_scaled(false, "12345", 2), "123.45");
        assert_eq!(format_scaled(true, "12345", 2), "-123.45");
        assert_eq!(format_scaled(false, "5", 3), "0.005");
        assert_eq!(format_scaled(true, "5", 3), "-0.005");
        assert_eq!(format_scaled(false, "500", 3), "0.500");
        assert_eq!(format_scaled(false, "0", 2), "0.00");
        assert_eq!(format_scaled(false, "0", 0), "0");
        assert_eq!(format_scaled(true, "7", 0), "-7");
    }

    #[test]
    fn int32_round_trip() {
        let column = column("Decimal(9,2)");

        assert_eq!(encode(&column, Value::from(12345i32)).unwrap().len(), 4);
        assert_eq!(round_trip(&column, Value::from(12345i32)), "123.45");
        assert_eq!(round_trip(&column, Value::from(-12345i64)), "-123.45");
        assert_eq!(round_trip(&column, Value::from(i32::MAX)), "21474836.47");
        assert_eq!(round_trip(&column, Value::from(i32::MIN)), "-21474836.48");
        assert_eq!(round_trip(&column, Value::from(7u8)), "0.07");
    }

    #[test]
    fn int64_round_trip() {
        let column = column("Decimal(18,4)");

        assert_eq!(encode(&column, Value::from(1i8)).unwrap().len(), 8);
        assert_eq!(round_trip(&column, Value::from(i64::MAX)), "922337203685477.5807");
        assert_eq!(round_trip(&column, Value::from(i64::MIN)), "-922337203685477.5808");
        assert_eq!(round_trip(&column, Value::from(u32::MAX)), "429496.7295");
    }

    #[test]
    fn scale_zero_has_no_point() {
        let column = column("Decimal(9,0)");

        assert_eq!(round_trip(&column, Value::from(-42i32)), "-42");
        assert_eq!(round_trip(&column, Value::from(0i32)), "0");
    }

    #[test]
    fn strings_and_floats_are_scaled() {
        let column = column("Decimal(10,2)");

        assert_eq!(round_trip(&column, Value::from("3.14159")), "3.14");
        assert_eq!(round_trip(&column, Value::from("-0.5")), "-0.50");
        assert_eq!(round_trip(&column, Value::from(2.75f64)), "2.75");
        assert_eq!(round_trip(&column, Value::from(&-1.5f32)), "-1.50");
        assert_eq!(round_trip(&column, Value::from(String::from("100"))), "100.00");
    }

    #[test]
    fn narrowing_overflow_is_rejected() {
        let int32 = column("Decimal(9,0)");

        for value in [
            Value::from(i32::MAX as i64 + 1),
            Value::from(i32::MIN as i64 - 1),
            Value::from(u32::MAX),
            Value::from(u64::MAX),
            Value::from("2147483648"),
            Value::from(3e9f64),
        ] {
            assert!(
                matches!(
                    encode(&int32, value.clone()),
                    Err(Error::NarrowingOverflow { to: "Int32", .. })
                ),
                "{value:?}"
            );
        }

        let int64 = column("Decimal(18,0)");

        assert!(matches!(
            encode(&int64, Value::from(u64::MAX)),
            Err(Error::NarrowingOverflow { from: "UInt64", to: "Int64" })
        ));
        assert!(matches!(
            encode(&int64, Value::from(f64::NAN)),
            Err(Error::NarrowingOverflow { from: "Float64", .. })
        ));
    }

    #[test]
    fn unsupported_values_name_the_column() {
        let column = column("Decimal(9,2)");

        match encode(&column, Value::from(true)) {
            Err(Error::UnsupportedValueType { value, column }) => {
                assert_eq!(value, "Bool");
                assert_eq!(column, "price");
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            encode(&column, Value::from([0u8; 16])),
            Err(Error::UnsupportedValueType { value: "Bytes", .. })
        ));
    }

    #[test]
    fn int128_accepts_raw_buffers() {
        let column = column("Decimal(38,0)");
        let buffer = (-5i128).to_le_bytes();

        let bytes = encode(&column, Value::from(&buffer[..])).unwrap();
        assert_eq!(&bytes[..], &buffer[..]);
        assert_eq!(round_trip(&column, Value::from(buffer)), "-5");

        assert!(matches!(
            encode(&column, Value::from(vec![0u8; 15])),
            Err(Error::InvalidBufferLength(15))
        ));
    }

    #[test]
    fn int128_round_trip() {
        let column = column("Decimal(38,0)");

        assert_eq!(round_trip(&column, Value::from(0i64)), "0");
        assert_eq!(round_trip(&column, Value::from(-1i64)), "-1");
        assert_eq!(round_trip(&column, Value::from(i64::MIN)), i64::MIN.to_string());
        assert_eq!(round_trip(&column, Value::from(&i64::MAX)), i64::MAX.to_string());
        assert_eq!(round_trip(&column, Value::from(u128::MAX >> 1)), i128::MAX.to_string());

        let nines = "9".repeat(38);
        assert_eq!(round_trip(&column, Value::from(nines.as_str())), nines);
        assert_eq!(round_trip(&column, Value::from(format!("-{nines}"))), format!("-{nines}"));
    }

    #[test]
    fn int128_with_scale() {
        let column = column("Decimal(38,10)");

        assert_eq!(round_trip(&column, Value::from("-1234.5")), "-1234.5000000000");
        assert_eq!(round_trip(&column, Value::from(1.25f64)), "1.2500000000");
        assert_eq!(round_trip(&column, Value::from(1i32)), "0.0000000001");
    }

    #[test]
    fn int128_rejects_values_outside_range() {
        let column = column("Decimal(38,0)");

        assert!(matches!(
            encode(&column, Value::from(u128::MAX)),
            Err(Error::NarrowingOverflow { from: "UInt128", to: "Int128" })
        ));
        assert!(matches!(
            encode(&column, Value::from(1e39f64)),
            Err(Error::NarrowingOverflow { from: "Float64", to: "Int128" })
        ));
    }

    #[test]
    fn parse_decimal_mode() {
        let mut config = Config::default();
        config.parse_decimal();

        for ch_type in ["Decimal(9,3)", "Decimal(18,3)", "Decimal(38,3)"] {
            let column = column(ch_type);
            let bytes = encode(&column, Value::from(-12345i32)).unwrap();

            let decoded = column.read(&mut &bytes[..], config).unwrap();

            assert_eq!(
                decoded,
                Decoded::Decimal(BigDecimal::new(BigInt::from(-12345), 3)),
                "{ch_type}"
            );
            assert_eq!(decoded.to_string(), "-12.345");
            assert_eq!(decoded.as_str(), None);
        }
    }

    #[test]
    fn decoded_converts_to_big_decimal() {
        let decoded = Decoded::String("-12.50".into());

        assert_eq!(
            decoded.into_big_decimal().unwrap(),
            BigDecimal::new(BigInt::from(-1250), 2)
        );
        assert_eq!(
            Decoded::Decimal(BigDecimal::new(BigInt::from(12), -2)).to_string(),
            "1200"
        );
    }

    #[test]
    fn enormous_exponents_keep_their_own_form() {
        let value = BigDecimal::new(BigInt::from(12), -(u32::MAX as i64) - 1);
        let decoded = Decoded::Decimal(value.clone());

        assert_eq!(decoded.to_string(), value.to_string());
        assert_ne!(decoded.to_string(), "12");
    }

    #[test]
    fn non_finite_floats_are_narrowing_overflows() {
        for (ch_type, to) in [("Decimal(9,2)", "Int32"), ("Decimal(18,2)", "Int64")] {
            let column = column(ch_type);

            let error = encode(&column, Value::from(f64::NAN)).unwrap_err();
            assert!(
                matches!(error, Error::NarrowingOverflow { from: "Float64", to: t } if t == to),
                "{ch_type}: {error:?}"
            );
        }
    }

    #[test]
    fn failed_write_leaves_encoder_untouched() {
        let column = column("Decimal(9,0)");
        let mut bytes = BytesMut::new();

        let values = [Value::from(1i32), Value::from(i64::MAX), Value::from(3i32)];

        assert!(column.write_block(&mut bytes, &values).is_err());
        assert!(bytes.is_empty());

        column
            .write_block(&mut bytes, &[Value::from(1i32), Value::from(2i32)])
            .unwrap();

        let decoded = column.read_block(&mut &bytes[..], 2, Config::default()).unwrap();
        assert_eq!(decoded, [Decoded::String("1".into()), Decoded::String("2".into())]);
    }

    #[test]
    fn short_input_is_incomplete() {
        let column = column("Decimal(38,2)");

        assert!(matches!(
            column.read(&mut &[0u8; 8][..], Config::default()),
            Err(Error::Incomplete)
        ));
    }
}
