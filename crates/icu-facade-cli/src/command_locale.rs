use std::collections::BTreeMap;

use icu_facade_core::{Locale, locale_from_json};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Clone, Serialize)]
pub struct LocaleReport {
    pub input: String,
    pub canonical: String,
    pub language_tag: String,
    pub language: String,
    pub script: String,
    pub country: String,
    pub variant: String,
    pub extensions: BTreeMap<String, String>,
    pub bogus: bool,
}

/// Reads a locale argument. Input starting with `{` is a JSON object with
/// `language`, `country`, `variant` and `extensions` members; anything else
/// is an identifier.
pub fn parse_locale_input(input: &str) -> Result<Locale, CliError> {
    if input.trim_start().starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(input)?;
        return Ok(locale_from_json(&value)?);
    }
    Ok(Locale::parse(input))
}

impl LocaleReport {
    pub fn new(input: &str, locale: &Locale) -> Self {
        Self {
            input: input.to_string(),
            canonical: locale.to_string(),
            language_tag: locale.to_language_tag(),
            language: locale.language().to_string(),
            script: locale.script().to_string(),
            country: locale.country().to_string(),
            variant: locale.variant().to_string(),
            extensions: locale.extensions().clone(),
            bogus: locale.is_bogus(),
        }
    }
}

pub fn run_locale(input: &str) -> Result<String, CliError> {
    let locale = parse_locale_input(input)?;
    Ok(serde_json::to_string_pretty(&LocaleReport::new(input, &locale))?)
}
