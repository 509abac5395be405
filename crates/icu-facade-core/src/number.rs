use fixed_decimal::FixedDecimal;
use num_bigint::BigInt;

use crate::{Decimal, NumberStyle, Value};

/// The numeric view of an argument value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Number {
    Int(BigInt),
    Float(f64),
    Decimal(Decimal),
}

/// A number ready for locale formatting.
#[derive(Clone, Debug)]
pub(crate) enum Displayable {
    Finite(FixedDecimal),
    NonFinite(&'static str),
}

impl Number {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(value) => Some(Number::Int(value.clone())),
            Value::Float(value) => Some(Number::Float(*value)),
            Value::Decimal(value) => Some(Number::Decimal(value.clone())),
            _ => None,
        }
    }

    pub(crate) fn minus(&self, offset: i64) -> Self {
        if offset == 0 {
            return self.clone();
        }
        match self {
            Number::Int(value) => Number::Int(value - BigInt::from(offset)),
            Number::Float(value) => Number::Float(value - offset as f64),
            Number::Decimal(value) => Number::Decimal(value.sub_integer(offset)),
        }
    }

    /// Exact comparison used by `=N` selectors.
    pub(crate) fn matches_exact(&self, exact: &Decimal) -> bool {
        match self {
            Number::Int(value) => Decimal::from(value.clone()) == *exact,
            Number::Float(value) => value.is_finite()
                && value
                    .to_string()
                    .parse::<Decimal>()
                    .is_ok_and(|value| value == *exact),
            Number::Decimal(value) => value == exact,
        }
    }

    /// Applies `style` and returns the decimal that will be displayed. Plural
    /// operands are taken from this same value.
    pub(crate) fn to_display(&self, style: &NumberStyle) -> Result<Displayable, String> {
        let (text, is_float) = match self {
            Number::Int(value) => (value.to_string(), false),
            Number::Decimal(value) => (value.to_string(), false),
            Number::Float(value) if value.is_nan() => return Ok(Displayable::NonFinite("NaN")),
            Number::Float(value) if value.is_infinite() => {
                let text = if value.is_sign_negative() { "-\u{221e}" } else { "\u{221e}" };
                return Ok(Displayable::NonFinite(text));
            }
            Number::Float(value) => (value.to_string(), true),
        };
        let mut decimal: FixedDecimal = text.parse().map_err(|err| format!("{err}"))?;
        style.apply(&mut decimal, is_float);
        Ok(Displayable::Finite(decimal))
    }
}
