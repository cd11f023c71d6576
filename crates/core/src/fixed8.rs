//! Fixed-point asset amounts. Every value on the wire is a signed 64-bit count of 10^-8 units.

use std::{
    fmt,
    io::{Read, Write},
    str::FromStr,
};

use thiserror::Error;

use crate::ser::{ByteFormat, SerError, SerResult};

const DECIMALS: usize = 8;
const FACTOR: i64 = 100_000_000;

/// Errors parsing or combining amounts
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Not a decimal number
    #[error("Invalid amount {0:?}")]
    Invalid(String),

    /// More fractional digits than the 8 an amount can hold
    #[error("Amount {0:?} has more than 8 decimal places")]
    TooPrecise(String),

    /// Out of the i64 range of raw units
    #[error("Amount overflow")]
    Overflow,
}

/// An amount with 8 decimal places, stored as raw 10^-8 units.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Fixed8(i64);

impl Fixed8 {
    /// Zero units
    pub const ZERO: Fixed8 = Fixed8(0);

    /// Wrap a raw count of 10^-8 units
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw count of 10^-8 units
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// A whole number of units
    pub fn from_units(units: i64) -> Result<Self, AmountError> {
        units
            .checked_mul(FACTOR)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// `self + other`, or `Overflow`
    pub fn checked_add(self, other: Fixed8) -> Result<Self, AmountError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// `self - other`, or `Overflow`
    pub fn checked_sub(self, other: Fixed8) -> Result<Self, AmountError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Sum an iterator of amounts, or `Overflow`
    pub fn checked_sum<I>(iter: I) -> Result<Self, AmountError>
    where
        I: IntoIterator<Item = Fixed8>,
    {
        iter.into_iter()
            .try_fold(Fixed8::ZERO, |acc, v| acc.checked_add(v))
    }

    /// True if strictly greater than zero
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// True if strictly less than zero
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// True if zero
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Fixed8 {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AmountError::Invalid(s.to_owned());

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let frac_digits = frac_part.trim_end_matches('0');
        if frac_digits.len() > DECIMALS {
            return Err(AmountError::TooPrecise(s.to_owned()));
        }

        let int_value: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| AmountError::Overflow)?
        };
        let frac_value: i64 = if frac_digits.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac_digits, width = DECIMALS);
            padded.parse().map_err(|_| invalid())?
        };

        let raw = int_value
            .checked_mul(FACTOR)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or(AmountError::Overflow)?;
        Ok(Self(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for Fixed8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let int_part = abs / FACTOR as u64;
        let frac_part = abs % FACTOR as u64;
        if frac_part == 0 {
            return write!(f, "{sign}{int_part}");
        }
        let frac = format!("{:08}", frac_part);
        write!(f, "{sign}{int_part}.{}", frac.trim_end_matches('0'))
    }
}

impl ByteFormat for Fixed8 {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        8
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
    {
        Ok(Self(Self::read_i64_le(reader)?))
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        Self::write_i64_le(writer, self.0)
    }
}

impl serde::Serialize for Fixed8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Fixed8 {
    fn deserialize<D>(deserializer: D) -> Result<Fixed8, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
