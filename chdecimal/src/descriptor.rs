use crate::Error;
use std::{fmt, str::FromStr};

pub const MAX_PRECISION: u8 = 38;

/// Storage width on the wire, selected from the precision of the column.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Width {
    Bits32,
    Bits64,
    Bits128,
}

impl Width {
    pub fn from_precision(precision: u8) -> Option<Self> {
        match precision {
            1..=9 => Some(Self::Bits32),
            10..=18 => Some(Self::Bits64),
            19..=MAX_PRECISION => Some(Self::Bits128),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
            Self::Bits128 => 128,
        }
    }

    /// Name of the native integer backing this width on the server.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Bits32 => "Int32",
            Self::Bits64 => "Int64",
            Self::Bits128 => "Int128",
        }
    }

    /// Number of bytes a single value occupies on the wire.
    pub fn size(self) -> usize {
        self.bits() as usize / 8
    }
}

/// The `(precision, scale)` pair of a `Decimal(P, S)` column together with the
/// width it is stored in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ColumnDescriptor {
    precision: u8,
    scale: u8,
    width: Width,
}

impl ColumnDescriptor {
    pub fn new(precision: u8, scale: u8) -> Result<Self, Error> {
        if precision < 1 {
            return Err(Error::InvalidPrecision(format!("Decimal({precision}, {scale})")));
        }

        if scale > precision {
            return Err(Error::InvalidScale(format!("Decimal({precision}, {scale})")));
        }

        let width =
            Width::from_precision(precision).ok_or(Error::PrecisionOutOfRange(precision as i64))?;

        Ok(Self {
            precision,
            scale,
            width,
        })
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn width(&self) -> Width {
        self.width
    }
}

impl FromStr for ColumnDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let malformed = || Error::MalformedTypeDescriptor(s.to_string());

        // `Decimal(P,S)` with single digits is the shortest valid form.
        if s.len() < 12 {
            return Err(malformed());
        }

        let params = s
            .strip_prefix("Decimal(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let mut fields = params.split(',');

        let (Some(precision), Some(scale), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed());
        };

        let precision: i64 = precision
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPrecision(s.to_string()))?;

        if precision < 1 {
            return Err(Error::InvalidPrecision(s.to_string()));
        }

        let scale: i64 = scale
            .trim()
            .parse()
            .map_err(|_| Error::InvalidScale(s.to_string()))?;

        if scale < 0 || scale > precision {
            return Err(Error::InvalidScale(s.to_string()));
        }

        if precision > MAX_PRECISION as i64 {
            return Err(Error::PrecisionOutOfRange(precision));
        }

        Self::new(precision as u8, scale as u8)
    }
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({}, {})", self.precision, self.scale)
    }
}
