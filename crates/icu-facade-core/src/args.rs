use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use num_bigint::BigInt;

use crate::{CoreError, CoreResult, Decimal};

/// A message argument value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Int(BigInt),
    Float(f64),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Rendered at its local wall-clock time; the offset does not shift the
    /// displayed fields.
    ZonedDateTime(DateTime<FixedOffset>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::ZonedDateTime(_) => "zoned datetime",
        }
    }

    /// Local wall-clock time of a temporal value; dates are taken at midnight.
    pub fn as_naive_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(date) => Some(date.and_time(chrono::NaiveTime::MIN)),
            Value::DateTime(datetime) => Some(*datetime),
            Value::ZonedDateTime(datetime) => Some(datetime.naive_local()),
            _ => None,
        }
    }

    fn from_json(key: &str, value: &serde_json::Value) -> CoreResult<Self> {
        match value {
            serde_json::Value::String(text) => Ok(Value::Str(text.clone())),
            serde_json::Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    Ok(Value::Int(value.into()))
                } else if let Some(value) = number.as_u64() {
                    Ok(Value::Int(value.into()))
                } else if let Some(value) = number.as_f64() {
                    Ok(Value::Float(value))
                } else {
                    Err(CoreError::unsupported(key, JSON_EXPECTED))
                }
            }
            serde_json::Value::Object(fields) if fields.len() == 1 => {
                let Some((tag, serde_json::Value::String(text))) = fields.iter().next() else {
                    return Err(CoreError::unsupported(key, JSON_EXPECTED));
                };
                parse_tagged(key, tag, text)
            }
            _ => Err(CoreError::unsupported(key, JSON_EXPECTED)),
        }
    }
}

const JSON_EXPECTED: &str =
    "string, number, or an object tagged int, decimal, date or datetime";

fn parse_tagged(key: &str, tag: &str, text: &str) -> CoreResult<Value> {
    let invalid = |reason: String| CoreError::InvalidValue {
        key: key.to_string(),
        reason,
    };
    match tag {
        "int" => text
            .trim()
            .parse::<BigInt>()
            .map(Value::Int)
            .map_err(|err| invalid(err.to_string())),
        "decimal" => text
            .parse::<Decimal>()
            .map(Value::Decimal)
            .map_err(|err| invalid(err.to_string())),
        "date" => text
            .trim()
            .parse::<NaiveDate>()
            .map(Value::Date)
            .map_err(|err| invalid(err.to_string())),
        "datetime" => {
            let text = text.trim();
            if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
                return Ok(Value::ZonedDateTime(zoned));
            }
            text.parse::<NaiveDateTime>()
                .map(Value::DateTime)
                .map_err(|err| invalid(err.to_string()))
        }
        _ => Err(CoreError::unsupported(key, JSON_EXPECTED)),
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

macro_rules! int_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(BigInt::from(value))
                }
            }
        )*
    };
}

int_value_from!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::ZonedDateTime(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::ZonedDateTime(value.fixed_offset())
    }
}

/// Named message arguments, looked up by exact key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    values: BTreeMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Builds arguments from a JSON object. Integers beyond 64 bits, exact
    /// decimals and temporal values use single-key tagged objects such as
    /// `{"int": "1000000000000000000000000000000"}`.
    pub fn from_json(value: &serde_json::Value) -> CoreResult<Self> {
        let serde_json::Value::Object(fields) = value else {
            return Err(CoreError::InvalidArgument(String::from(
                "arguments must be a JSON object",
            )));
        };
        fields
            .iter()
            .map(|(key, value)| Ok((key.clone(), Value::from_json(key, value)?)))
            .collect::<CoreResult<BTreeMap<_, _>>>()
            .map(|values| Self { values })
    }
}

impl<K, V> FromIterator<(K, V)> for Args
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use num_bigint::BigInt;

    use super::{Args, Value};
    use crate::{CoreError, Decimal};

    #[test]
    fn insert_and_get() {
        let mut args = Args::new();
        args.insert("name", "Ada");
        args.insert("count", 3);
        assert_eq!(args.get("name"), Some(&Value::Str(String::from("Ada"))));
        assert_eq!(args.get("count"), Some(&Value::Int(BigInt::from(3))));
        assert_eq!(args.get("missing"), None);
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn collects_from_pairs() {
        let args: Args = [("a", 1.5), ("b", 2.0)].into_iter().collect();
        assert_eq!(args.get("a"), Some(&Value::Float(1.5)));
    }

    #[test]
    fn dates_become_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date");
        let value = Value::from(date);
        let datetime = value.as_naive_datetime().expect("temporal value");
        assert_eq!(datetime.to_string(), "2024-01-15 00:00:00");
    }

    #[test]
    fn zoned_values_keep_wall_clock() {
        let utc = Utc
            .with_ymd_and_hms(2024, 12, 25, 14, 30, 0)
            .single()
            .expect("valid datetime");
        let value = Value::from(utc);
        assert_eq!(value.type_name(), "zoned datetime");
        assert_eq!(
            value.as_naive_datetime().expect("temporal").to_string(),
            "2024-12-25 14:30:00"
        );
    }

    #[test]
    fn json_maps_plain_and_tagged_values() {
        let json = serde_json::json!({
            "name": "Ada",
            "count": 5,
            "ratio": 0.25,
            "big": { "int": "1000000000000000000000000000000" },
            "price": { "decimal": "-42.50" },
            "day": { "date": "1990-05-25" },
            "at": { "datetime": "2024-01-15T14:30:00" },
            "zoned": { "datetime": "2024-01-15T14:30:00+05:00" }
        });
        let args = Args::from_json(&json).expect("valid args");
        assert_eq!(args.get("count"), Some(&Value::Int(BigInt::from(5))));
        assert_eq!(args.get("ratio"), Some(&Value::Float(0.25)));
        assert_eq!(
            args.get("big"),
            Some(&Value::Int(BigInt::from(10u32).pow(30)))
        );
        assert_eq!(
            args.get("price"),
            Some(&Value::Decimal("-42.5".parse::<Decimal>().expect("decimal")))
        );
        assert!(matches!(args.get("day"), Some(Value::Date(_))));
        assert!(matches!(args.get("at"), Some(Value::DateTime(_))));
        assert!(matches!(args.get("zoned"), Some(Value::ZonedDateTime(_))));
    }

    #[test]
    fn json_rejects_unsupported_values() {
        let err = Args::from_json(&serde_json::json!({ "flag": true })).expect_err("bool");
        assert!(matches!(
            err,
            CoreError::UnsupportedValueType { ref key, .. } if key == "flag"
        ));

        let err = Args::from_json(&serde_json::json!({ "day": { "date": "nope" } }))
            .expect_err("bad date");
        assert!(matches!(err, CoreError::InvalidValue { ref key, .. } if key == "day"));

        let err = Args::from_json(&serde_json::json!([1, 2])).expect_err("array");
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }
}
