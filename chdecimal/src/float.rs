use crate::{Error, descriptor::MAX_PRECISION};
use num_bigint::BigInt;
use num_traits::FromPrimitive as _;

/// Powers of ten for scaling floating-point inputs to their fixed-point
/// representation, one entry per supported scale.
const FACTORS: [f64; MAX_PRECISION as usize + 1] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22, 1e23, 1e24, 1e25, 1e26, 1e27, 1e28, 1e29, 1e30, 1e31,
    1e32, 1e33, 1e34, 1e35, 1e36, 1e37, 1e38,
];

pub fn factor(scale: u8) -> f64 {
    FACTORS[scale as usize]
}

/// Multiplies `value` by `10^scale` and truncates toward zero.
///
/// Non-finite inputs have no fixed-point form and are reported as an
/// overflow of the target integer.
pub fn to_fixed(
    value: f64,
    scale: u8,
    from: &'static str,
    to: &'static str,
) -> Result<BigInt, Error> {
    let scaled = value * factor(scale);

    BigInt::from_f64(scaled.trunc()).ok_or(Error::NarrowingOverflow { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_exact_where_doubles_are() {
        let mut expected = 1.0;

        for scale in 0..=22 {
            assert_eq!(factor(scale), expected);
            expected *= 10.0;
        }
    }

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(to_fixed(1.239, 2, "Float64", "Int64").unwrap(), BigInt::from(123));
        assert_eq!(to_fixed(-1.239, 2, "Float64", "Int64").unwrap(), BigInt::from(-123));
        assert_eq!(to_fixed(0.5, 0, "Float64", "Int64").unwrap(), BigInt::from(0));
        assert_eq!(
            to_fixed(42.0, 18, "Float64", "Int64").unwrap(),
            BigInt::from(42_000_000_000_000_000_000i128)
        );
    }

    #[test]
    fn non_finite_is_overflow() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                to_fixed(value, 0, "Float64", "Int32"),
                Err(Error::NarrowingOverflow { from: "Float64", to: "Int32" })
            ));
        }
    }
}
