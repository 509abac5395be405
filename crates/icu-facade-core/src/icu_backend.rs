use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDateTime, Timelike};
use fixed_decimal::FixedDecimal;
use icu::calendar::{DateTime, Gregorian};
use icu::datetime::options::length;
use icu::datetime::{TimeFormatter, TypedDateFormatter, TypedDateTimeFormatter};
use icu::decimal::FixedDecimalFormatter;
use icu::decimal::options::{FixedDecimalFormatterOptions, GroupingStrategy};
use icu::plurals::PluralRules;
use icu_provider::DataLocale;
use tracing::debug;

use crate::{
    CoreError, CoreResult, DateLength, FormatBackend, Locale, PluralCategory, PluralRuleType,
};

/// Locales whose decimal symbols carry the digits of a numbering system.
const NUMBERING_DONORS: &[(&str, &str)] = &[
    ("arab", "ar-EG-u-nu-arab"),
    ("arabext", "fa-IR-u-nu-arabext"),
    ("beng", "bn-BD-u-nu-beng"),
    ("deva", "hi-IN-u-nu-deva"),
    ("hanidec", "zh-CN-u-nu-hanidec"),
    ("mymr", "my-MM-u-nu-mymr"),
    ("thai", "th-TH-u-nu-thai"),
];

/// The set of formatters a compiled message renders with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendNeeds {
    pub cardinal: bool,
    pub ordinal: bool,
    pub grouped: bool,
    pub ungrouped: bool,
    pub dates: BTreeSet<DateLength>,
    pub times: BTreeSet<DateLength>,
    pub datetime: bool,
}

impl BackendNeeds {
    pub fn count(&self) -> usize {
        [
            self.cardinal,
            self.ordinal,
            self.grouped,
            self.ungrouped,
            self.datetime,
        ]
        .iter()
        .filter(|needed| **needed)
        .count()
            + self.dates.len()
            + self.times.len()
    }
}

/// [`FormatBackend`] over ICU4X compiled data. Formatters are loaded once,
/// up front, for the needs of a single message.
pub struct IcuBackend {
    cardinal: Option<PluralRules>,
    ordinal: Option<PluralRules>,
    grouped: Option<FixedDecimalFormatter>,
    ungrouped: Option<FixedDecimalFormatter>,
    dates: BTreeMap<DateLength, TypedDateFormatter<Gregorian>>,
    times: BTreeMap<DateLength, TimeFormatter>,
    datetime: Option<TypedDateTimeFormatter<Gregorian>>,
}

impl IcuBackend {
    pub fn new(locale: &Locale, needs: &BackendNeeds) -> CoreResult<Self> {
        let data_locale = locale.data_locale();
        let numbers_locale = numbering_locale(locale);
        let mut dates = BTreeMap::new();
        for length in &needs.dates {
            let formatter =
                TypedDateFormatter::<Gregorian>::try_new_with_length(&data_locale, date_length(*length))
                    .map_err(CoreError::data)?;
            dates.insert(*length, formatter);
        }
        let mut times = BTreeMap::new();
        for length in &needs.times {
            let formatter = TimeFormatter::try_new_with_length(&data_locale, time_length(*length))
                .map_err(CoreError::data)?;
            times.insert(*length, formatter);
        }

        Ok(Self {
            cardinal: load(needs.cardinal, || PluralRules::try_new_cardinal(&data_locale))?,
            ordinal: load(needs.ordinal, || PluralRules::try_new_ordinal(&data_locale))?,
            grouped: load(needs.grouped, || decimal_formatter(&numbers_locale, true))?,
            ungrouped: load(needs.ungrouped, || decimal_formatter(&numbers_locale, false))?,
            dates,
            times,
            datetime: load(needs.datetime, || {
                let options = length::Bag::from_date_time_style(length::Date::Short, length::Time::Short);
                TypedDateTimeFormatter::<Gregorian>::try_new(&data_locale, options.into())
            })?,
        })
    }
}

/// Picks the data locale for decimal symbols. Compiled data only carries a
/// non-default numbering system for the languages that use it, so a
/// `numbers` keyword naming one of those systems borrows that language's
/// symbols. Plural rules and date patterns stay with `locale`.
fn numbering_locale(locale: &Locale) -> DataLocale {
    let system = locale
        .extension("numbers")
        .or_else(|| locale.extension("nu"))
        .map(str::to_ascii_lowercase);
    let donor = system.as_deref().and_then(|system| {
        NUMBERING_DONORS
            .iter()
            .find(|(name, _)| *name == system)
            .and_then(|(_, tag)| tag.parse::<icu::locid::Locale>().ok())
    });
    match donor {
        Some(donor) if donor.id.language.as_str() != locale.language() => {
            debug!(
                locale = %locale,
                donor = %donor,
                "decimal symbols borrowed for numbering system"
            );
            DataLocale::from(donor)
        }
        _ => locale.data_locale(),
    }
}

fn load<T, E: std::fmt::Display>(
    needed: bool,
    build: impl FnOnce() -> Result<T, E>,
) -> CoreResult<Option<T>> {
    if !needed {
        return Ok(None);
    }
    build().map(Some).map_err(CoreError::data)
}

fn decimal_formatter(
    locale: &DataLocale,
    grouping: bool,
) -> Result<FixedDecimalFormatter, icu::decimal::DecimalError> {
    let mut options = FixedDecimalFormatterOptions::default();
    if !grouping {
        options.grouping_strategy = GroupingStrategy::Never;
    }
    FixedDecimalFormatter::try_new(locale, options)
}

fn date_length(length: DateLength) -> length::Date {
    match length {
        DateLength::Short => length::Date::Short,
        DateLength::Medium => length::Date::Medium,
        DateLength::Long => length::Date::Long,
        DateLength::Full => length::Date::Full,
    }
}

/// Long and full time styles carry a zone name, which a wall-clock time has
/// no source for; they render at medium length.
fn time_length(length: DateLength) -> length::Time {
    match length {
        DateLength::Short => length::Time::Short,
        DateLength::Medium | DateLength::Long | DateLength::Full => length::Time::Medium,
    }
}

fn to_calendar(key: &str, value: &NaiveDateTime) -> CoreResult<DateTime<Gregorian>> {
    gregorian(
        key,
        value.year(),
        [value.month(), value.day(), value.hour(), value.minute(), value.second()],
    )
}

/// `fields` holds month, day, hour, minute and second.
fn gregorian(key: &str, year: i32, fields: [u32; 5]) -> CoreResult<DateTime<Gregorian>> {
    let invalid = |reason: String| CoreError::InvalidValue {
        key: key.to_string(),
        reason,
    };
    let [month, day, hour, minute, second] =
        fields.map(|field| u8::try_from(field).unwrap_or(u8::MAX));
    DateTime::try_new_gregorian_datetime(year, month, day, hour, minute, second)
        .map_err(|err| invalid(format!("outside the Gregorian calendar: {err}")))
}

fn missing(formatter: &'static str) -> CoreError {
    CoreError::Data(format!("{formatter} formatter was not loaded for this message"))
}

impl FormatBackend for IcuBackend {
    fn plural_category(
        &self,
        rule_type: PluralRuleType,
        value: &FixedDecimal,
    ) -> CoreResult<PluralCategory> {
        let rules = match rule_type {
            PluralRuleType::Cardinal => self.cardinal.as_ref().ok_or_else(|| missing("cardinal plural"))?,
            PluralRuleType::Ordinal => self.ordinal.as_ref().ok_or_else(|| missing("ordinal plural"))?,
        };
        Ok(rules.category_for(value).into())
    }

    fn format_decimal(&self, value: &FixedDecimal, grouping: bool) -> CoreResult<String> {
        let formatter = if grouping {
            self.grouped.as_ref().ok_or_else(|| missing("grouped decimal"))?
        } else {
            self.ungrouped.as_ref().ok_or_else(|| missing("decimal"))?
        };
        Ok(formatter.format_to_string(value))
    }

    fn format_date(
        &self,
        key: &str,
        value: &NaiveDateTime,
        length: DateLength,
    ) -> CoreResult<String> {
        let formatter = self.dates.get(&length).ok_or_else(|| missing("date"))?;
        Ok(formatter.format_to_string(&to_calendar(key, value)?))
    }

    fn format_time(
        &self,
        key: &str,
        value: &NaiveDateTime,
        length: DateLength,
    ) -> CoreResult<String> {
        let formatter = self.times.get(&length).ok_or_else(|| missing("time"))?;
        Ok(formatter.format_to_string(&to_calendar(key, value)?))
    }

    fn format_datetime(&self, key: &str, value: &NaiveDateTime) -> CoreResult<String> {
        let formatter = self.datetime.as_ref().ok_or_else(|| missing("datetime"))?;
        Ok(formatter.format_to_string(&to_calendar(key, value)?))
    }
}
