//! Conversion between the 16-byte little-endian two's-complement layout used
//! by `Decimal128` and a signed big integer.

use crate::Error;
use num_bigint::{BigInt, Sign};
use std::sync::LazyLock;

static MIN: LazyLock<BigInt> = LazyLock::new(|| -(BigInt::from(1i32) << 127u32));
static MAX: LazyLock<BigInt> = LazyLock::new(|| (BigInt::from(1i32) << 127u32) - 1);

/// Reverses `bytes` in place, complementing every byte on the way when `not`
/// is set.
fn endian_swap(bytes: &mut [u8; 16], not: bool) {
    bytes.reverse();

    if not {
        for byte in bytes.iter_mut() {
            *byte = !*byte;
        }
    }
}

pub fn from_bytes(mut bytes: [u8; 16]) -> BigInt {
    endian_swap(&mut bytes, false);

    if bytes[0] & 0x80 != 0 {
        // -x == !(x - 1), so the complemented bytes are the magnitude minus one.
        for byte in bytes.iter_mut() {
            *byte = !*byte;
        }

        !BigInt::from_bytes_be(Sign::Plus, &bytes)
    } else {
        BigInt::from_bytes_be(Sign::Plus, &bytes)
    }
}

pub fn to_bytes(value: &BigInt) -> Result<[u8; 16], Error> {
    if *value < *MIN || *value > *MAX {
        return Err(Error::NarrowingOverflow {
            from: "BigInt",
            to: "Int128",
        });
    }

    let negative = value.sign() == Sign::Minus;
    let magnitude = if negative { !value } else { value.clone() };

    let (_, digits) = magnitude.to_bytes_be();
    let mut bytes = [0u8; 16];
    bytes[16 - digits.len()..].copy_from_slice(&digits);

    endian_swap(&mut bytes, negative);

    Ok(bytes)
}
