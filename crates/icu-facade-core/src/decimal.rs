use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use thiserror::Error;

/// Exponents beyond this magnitude are rejected rather than expanded.
const MAX_EXPONENT: i64 = 4096;

/// Largest number of fraction digits a decimal may carry.
const MAX_SCALE: u32 = MAX_EXPONENT as u32;

/// An arbitrary-precision decimal: `unscaled * 10^-scale`.
///
/// Trailing zeros are preserved, so `"1.50"` keeps a scale of 2. Equality is
/// numeric: `1.5 == 1.50`.
#[derive(Clone, Debug)]
pub struct Decimal {
    unscaled: BigInt,
    scale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid decimal literal: {0}")]
pub struct ParseDecimalError(&'static str);

impl Decimal {
    pub fn new(unscaled: impl Into<BigInt>, scale: u32) -> Result<Self, ParseDecimalError> {
        if scale > MAX_SCALE {
            return Err(ParseDecimalError("scale out of range"));
        }
        Ok(Self {
            unscaled: unscaled.into(),
            scale,
        })
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_negative(&self) -> bool {
        self.unscaled.sign() == Sign::Minus
    }

    pub fn is_integer(&self) -> bool {
        self.scale == 0 || (&self.unscaled % pow10(self.scale)).sign() == Sign::NoSign
    }

    /// `self - value`, keeping the current scale.
    pub fn sub_integer(&self, value: i64) -> Self {
        Self {
            unscaled: &self.unscaled - BigInt::from(value) * pow10(self.scale),
            scale: self.scale,
        }
    }

    fn rescaled(&self, scale: u32) -> BigInt {
        &self.unscaled * pow10(scale - self.scale)
    }
}

fn pow10(exponent: u32) -> BigInt {
    BigInt::from(10u32).pow(exponent)
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.rescaled(scale).cmp(&other.rescaled(scale))
    }
}

impl From<BigInt> for Decimal {
    fn from(unscaled: BigInt) -> Self {
        Self { unscaled, scale: 0 }
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from(BigInt::from(value))
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (negative, rest) = match input.as_bytes().first() {
            Some(b'-') => (true, &input[1..]),
            Some(b'+') => (false, &input[1..]),
            _ => (false, input),
        };

        let (mantissa, exponent) = match rest.find(['e', 'E']) {
            Some(idx) => {
                let exponent = rest[idx + 1..]
                    .parse::<i64>()
                    .map_err(|_| ParseDecimalError("malformed exponent"))?;
                if exponent.abs() > MAX_EXPONENT {
                    return Err(ParseDecimalError("exponent out of range"));
                }
                (&rest[..idx], exponent)
            }
            None => (rest, 0),
        };

        let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(ParseDecimalError("missing digits"));
        }
        if !integer
            .bytes()
            .chain(fraction.bytes())
            .all(|byte| byte.is_ascii_digit())
        {
            return Err(ParseDecimalError("unexpected character"));
        }

        let digits = format!("{integer}{fraction}");
        let magnitude = digits
            .parse::<BigInt>()
            .map_err(|_| ParseDecimalError("missing digits"))?;
        let mut unscaled = if negative { -magnitude } else { magnitude };

        let scale = fraction.len() as i64 - exponent;
        let scale = if scale < 0 {
            unscaled *= pow10(scale.unsigned_abs() as u32);
            0
        } else {
            u32::try_from(scale).map_err(|_| ParseDecimalError("scale out of range"))?
        };

        Self::new(unscaled, scale)
    }
}

impl fmt::Display for Decimal {
    /// Plain notation, never scientific.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        let digits = self.unscaled.magnitude().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (integer, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{integer}.{fraction}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}
