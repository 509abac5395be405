use chrono::NaiveDateTime;
use fixed_decimal::FixedDecimal;

use crate::number::{Displayable, Number};
use crate::{CoreError, CoreResult, NumberStyle, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateLength {
    Short,
    Medium,
    Long,
    Full,
}

impl DateLength {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "short" => Some(DateLength::Short),
            "medium" => Some(DateLength::Medium),
            "long" => Some(DateLength::Long),
            "full" => Some(DateLength::Full),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "zero" => Some(PluralCategory::Zero),
            "one" => Some(PluralCategory::One),
            "two" => Some(PluralCategory::Two),
            "few" => Some(PluralCategory::Few),
            "many" => Some(PluralCategory::Many),
            "other" => Some(PluralCategory::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }
}

impl From<icu::plurals::PluralCategory> for PluralCategory {
    fn from(category: icu::plurals::PluralCategory) -> Self {
        use icu::plurals::PluralCategory as Icu;
        match category {
            Icu::Zero => PluralCategory::Zero,
            Icu::One => PluralCategory::One,
            Icu::Two => PluralCategory::Two,
            Icu::Few => PluralCategory::Few,
            Icu::Many => PluralCategory::Many,
            Icu::Other => PluralCategory::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PluralRuleType {
    Cardinal,
    Ordinal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FormatterId<'a> {
    Identity,
    Number(&'a NumberStyle),
    Date(DateLength),
    Time(DateLength),
}

/// Locale services used while rendering a message.
pub trait FormatBackend {
    fn plural_category(
        &self,
        rule_type: PluralRuleType,
        value: &FixedDecimal,
    ) -> CoreResult<PluralCategory>;
    fn format_decimal(&self, value: &FixedDecimal, grouping: bool) -> CoreResult<String>;
    /// `key` names the argument an unrepresentable value is reported against.
    fn format_date(
        &self,
        key: &str,
        value: &NaiveDateTime,
        length: DateLength,
    ) -> CoreResult<String>;
    fn format_time(
        &self,
        key: &str,
        value: &NaiveDateTime,
        length: DateLength,
    ) -> CoreResult<String>;
    /// Short date followed by short time.
    fn format_datetime(&self, key: &str, value: &NaiveDateTime) -> CoreResult<String>;
}

pub fn format_value(
    backend: &dyn FormatBackend,
    key: &str,
    formatter: FormatterId<'_>,
    value: &Value,
) -> CoreResult<String> {
    match formatter {
        FormatterId::Identity => format_value_default(backend, key, value),
        FormatterId::Number(style) => match Number::from_value(value) {
            Some(number) => format_number(backend, key, &number, style),
            None => Err(CoreError::mismatch(key, value, "number")),
        },
        FormatterId::Date(length) => match value.as_naive_datetime() {
            Some(datetime) => backend.format_date(key, &datetime, length),
            None => Err(CoreError::mismatch(key, value, "date or datetime")),
        },
        FormatterId::Time(length) => match value.as_naive_datetime() {
            Some(datetime) => backend.format_time(key, &datetime, length),
            None => Err(CoreError::mismatch(key, value, "date or datetime")),
        },
    }
}

fn format_value_default(backend: &dyn FormatBackend, key: &str, value: &Value) -> CoreResult<String> {
    if let Value::Str(text) = value {
        return Ok(text.clone());
    }
    if let Some(number) = Number::from_value(value) {
        return format_number(backend, key, &number, &NumberStyle::standard());
    }
    match value.as_naive_datetime() {
        Some(datetime) => backend.format_datetime(key, &datetime),
        None => Err(CoreError::mismatch(key, value, "string, number or datetime")),
    }
}

pub(crate) fn format_number(
    backend: &dyn FormatBackend,
    key: &str,
    number: &Number,
    style: &NumberStyle,
) -> CoreResult<String> {
    let body = match to_display(key, number, style)? {
        Displayable::Finite(decimal) => backend.format_decimal(&decimal, style.grouping)?,
        Displayable::NonFinite(text) => text.to_string(),
    };
    Ok(format!("{}{body}{}", style.prefix, style.suffix))
}

pub(crate) fn plural_category(
    backend: &dyn FormatBackend,
    key: &str,
    rule_type: PluralRuleType,
    number: &Number,
) -> CoreResult<PluralCategory> {
    match to_display(key, number, &NumberStyle::standard())? {
        Displayable::Finite(decimal) => backend.plural_category(rule_type, &decimal),
        Displayable::NonFinite(_) => Ok(PluralCategory::Other),
    }
}

fn to_display(key: &str, number: &Number, style: &NumberStyle) -> CoreResult<Displayable> {
    number
        .to_display(style)
        .map_err(|reason| CoreError::InvalidValue {
            key: key.to_string(),
            reason,
        })
}
