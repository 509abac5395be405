use std::collections::BTreeMap;
use std::fmt;

use icu::locid_transform::LocaleCanonicalizer;
use icu_provider::DataLocale;
use tracing::debug;

use crate::keywords;
use crate::{CoreError, CoreResult};

/// Identifiers longer than this are never resolved.
const MAX_IDENTIFIER_LEN: usize = 157;

/// A locale identifier in `language[_Script][_COUNTRY][_VARIANT][@k=v;...]`
/// form. Hyphenated BCP-47 input is accepted too, with a `-u-` extension read
/// into keywords.
///
/// Malformed identifiers do not fail: they produce a value whose
/// [`Locale::is_bogus`] flag is set. Absent components are empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    script: String,
    country: String,
    variant: String,
    extensions: BTreeMap<String, String>,
    bogus: bool,
}

impl Locale {
    /// The root locale: every component empty.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(identifier: &str) -> Self {
        let trimmed = identifier.trim();
        if trimmed.len() > MAX_IDENTIFIER_LEN {
            debug!(len = trimmed.len(), "locale identifier too long");
            return Self {
                bogus: true,
                ..Self::default()
            };
        }

        let (base, keywords) = match trimmed.split_once('@') {
            Some((base, keywords)) => (base, Some(keywords)),
            None => (trimmed, None),
        };

        let mut locale = Self::default();
        let mut valid = true;

        if !base.is_empty() {
            let mut parts = base.split(['_', '-']).peekable();
            if let Some(language) = parts.next() {
                valid &= language.is_empty() || is_language(language);
                locale.language = language.to_ascii_lowercase();
            }
            if let Some(script) = parts.next_if(|part| part.len() == 4 && is_alpha(part)) {
                locale.script = titlecase(script);
            }
            if let Some(country) = parts.next_if(|part| part.is_empty() || is_region(part)) {
                locale.country = country.to_ascii_uppercase();
                if country.is_empty() && parts.peek().is_none() {
                    valid = false;
                }
            }
            let mut variants: Vec<&str> = parts.collect();
            if let Some(at) = variants.iter().position(|part| part.len() == 1) {
                match parse_unicode_extension(&variants.split_off(at)) {
                    Some(extensions) => locale.extensions = extensions,
                    None => valid = false,
                }
            }
            if !variants.is_empty() {
                valid &= variants.iter().all(|part| is_variant_part(part));
                locale.variant = variants.join("_").to_ascii_uppercase();
            }
        }

        if let Some(keywords) = keywords {
            match parse_keywords(keywords) {
                Some(extensions) => locale.extensions.extend(extensions),
                None => valid = false,
            }
        }

        locale.bogus = !valid;
        if locale.bogus {
            debug!(identifier = trimmed, "locale identifier resolved bogus");
        }
        locale
    }

    /// Starts component-wise construction. The language, script and region
    /// are canonicalized against locale alias data when the locale is built.
    pub fn builder(language: impl Into<String>) -> LocaleBuilder {
        LocaleBuilder {
            language: language.into(),
            script: String::new(),
            country: String::new(),
            variant: String::new(),
            extensions: BTreeMap::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn extensions(&self) -> &BTreeMap<String, String> {
        &self.extensions
    }

    pub fn extension(&self, key: &str) -> Option<&str> {
        self.extensions.get(key).map(String::as_str)
    }

    pub fn is_bogus(&self) -> bool {
        self.bogus
    }

    /// BCP-47 form used for locale data lookup. Components that cannot be
    /// expressed as BCP-47 subtags are left out, and a bogus locale maps to
    /// `und`.
    pub fn to_language_tag(&self) -> String {
        if self.bogus {
            return String::from("und");
        }

        let mut tag = if self.language.is_empty() {
            String::from("und")
        } else {
            self.language.clone()
        };
        if !self.script.is_empty() {
            tag.push('-');
            tag.push_str(&self.script);
        }
        if !self.country.is_empty() {
            tag.push('-');
            tag.push_str(&self.country);
        }
        for variant in self.variant.split('_').filter(|part| is_bcp47_variant(part)) {
            tag.push('-');
            tag.push_str(&variant.to_ascii_lowercase());
        }

        let unicode: BTreeMap<&str, String> = self
            .extensions
            .iter()
            .filter_map(|(key, value)| {
                let key = keywords::unicode_key(key)?;
                let value = keywords::unicode_value(key, value);
                keywords::is_valid_value(&value).then_some((key, value))
            })
            .collect();
        if !unicode.is_empty() {
            tag.push_str("-u");
            for (key, value) in unicode {
                tag.push('-');
                tag.push_str(key);
                tag.push('-');
                tag.push_str(&value);
            }
        }
        tag
    }

    pub fn to_icu(&self) -> icu::locid::Locale {
        self.to_language_tag()
            .parse()
            .unwrap_or(icu::locid::Locale::UND)
    }

    pub(crate) fn data_locale(&self) -> DataLocale {
        DataLocale::from(self.to_icu())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if !self.script.is_empty() {
            write!(f, "_{}", self.script)?;
        }
        if !self.country.is_empty() || !self.variant.is_empty() {
            write!(f, "_{}", self.country)?;
        }
        if !self.variant.is_empty() {
            write!(f, "_{}", self.variant)?;
        }
        if !self.extensions.is_empty() {
            f.write_str("@")?;
            for (idx, (key, value)) in self.extensions.iter().enumerate() {
                if idx > 0 {
                    f.write_str(";")?;
                }
                write!(f, "{key}={value}")?;
            }
        }
        Ok(())
    }
}

impl From<&str> for Locale {
    fn from(identifier: &str) -> Self {
        Self::parse(identifier)
    }
}

impl From<String> for Locale {
    fn from(identifier: String) -> Self {
        Self::parse(&identifier)
    }
}

impl From<&Locale> for Locale {
    fn from(locale: &Locale) -> Self {
        locale.clone()
    }
}

/// Conversion applied once at every entry point that accepts a locale.
pub trait IntoLocale {
    fn into_locale(self) -> Locale;
}

impl IntoLocale for Locale {
    fn into_locale(self) -> Locale {
        self
    }
}

impl IntoLocale for &Locale {
    fn into_locale(self) -> Locale {
        self.clone()
    }
}

impl IntoLocale for &str {
    fn into_locale(self) -> Locale {
        Locale::parse(self)
    }
}

impl IntoLocale for String {
    fn into_locale(self) -> Locale {
        Locale::parse(&self)
    }
}

impl IntoLocale for &String {
    fn into_locale(self) -> Locale {
        Locale::parse(self)
    }
}

/// Resolves a locale from loosely typed input: a string identifier or an
/// object with `language`, `country`, `variant` and `extensions` members.
pub fn locale_from_json(value: &serde_json::Value) -> CoreResult<Locale> {
    match value {
        serde_json::Value::String(identifier) => Ok(Locale::parse(identifier)),
        serde_json::Value::Object(fields) => {
            let text = |name: &str| -> CoreResult<String> {
                match fields.get(name) {
                    None | Some(serde_json::Value::Null) => Ok(String::new()),
                    Some(serde_json::Value::String(text)) => Ok(text.clone()),
                    Some(_) => Err(CoreError::InvalidArgument(format!(
                        "locale field `{name}` must be a string"
                    ))),
                }
            };
            let mut builder = Locale::builder(text("language")?)
                .country(text("country")?)
                .variant(text("variant")?);
            match fields.get("extensions") {
                None | Some(serde_json::Value::Null) => {}
                Some(serde_json::Value::Object(extensions)) => {
                    for (key, value) in extensions {
                        let serde_json::Value::String(value) = value else {
                            return Err(CoreError::InvalidArgument(format!(
                                "locale extension `{key}` must be a string"
                            )));
                        };
                        builder = builder.extension(key.as_str(), value.as_str());
                    }
                }
                Some(_) => {
                    return Err(CoreError::InvalidArgument(String::from(
                        "locale extensions must be an object",
                    )));
                }
            }
            Ok(builder.build())
        }
        _ => Err(CoreError::InvalidArgument(String::from(
            "locale must be a string or Locale object",
        ))),
    }
}

#[derive(Clone, Debug)]
pub struct LocaleBuilder {
    language: String,
    script: String,
    country: String,
    variant: String,
    extensions: BTreeMap<String, String>,
}

impl LocaleBuilder {
    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn extension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    pub fn extensions<K, V>(mut self, extensions: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in extensions {
            self.extensions.insert(key.into(), value.into());
        }
        self
    }

    pub fn build(self) -> Locale {
        let language = self.language.trim();
        let script = self.script.trim();
        let country = self.country.trim();
        let variant = self.variant.trim();

        let mut valid = (language.is_empty() || is_language(language))
            && (script.is_empty() || (script.len() == 4 && is_alpha(script)))
            && (country.is_empty() || is_region(country))
            && (variant.is_empty() || variant.split(['_', '-']).all(is_variant_part));

        let mut locale = Locale {
            language: language.to_ascii_lowercase(),
            script: titlecase(script),
            country: country.to_ascii_uppercase(),
            variant: variant.replace('-', "_").to_ascii_uppercase(),
            extensions: BTreeMap::new(),
            bogus: false,
        };

        if valid {
            match canonical_identity(&locale.language, &locale.script, &locale.country) {
                Some((language, script, country)) => {
                    locale.language = language;
                    locale.script = script;
                    locale.country = country;
                }
                None => valid = false,
            }
        }

        for (key, value) in self.extensions {
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if key.is_empty()
                || value.is_empty()
                || !key.chars().all(|ch| ch.is_ascii_alphanumeric())
                || !is_keyword_value(&value)
            {
                valid = false;
                continue;
            }
            locale.extensions.insert(key, value);
        }

        locale.bogus = !valid;
        if locale.bogus {
            debug!(locale = %locale, "locale components resolved bogus");
        }
        locale
    }
}

fn canonical_identity(language: &str, script: &str, country: &str) -> Option<(String, String, String)> {
    let mut tag = if language.is_empty() {
        String::from("und")
    } else {
        language.to_string()
    };
    for subtag in [script, country] {
        if !subtag.is_empty() {
            tag.push('-');
            tag.push_str(subtag);
        }
    }

    let mut resolved: icu::locid::Locale = tag.parse().ok()?;
    LocaleCanonicalizer::new().canonicalize(&mut resolved);

    let language = match resolved.id.language.as_str() {
        "und" => String::new(),
        other => other.to_string(),
    };
    let script = resolved
        .id
        .script
        .map(|script| script.as_str().to_string())
        .unwrap_or_default();
    let country = resolved
        .id
        .region
        .map(|region| region.as_str().to_string())
        .unwrap_or_default();
    Some((language, script, country))
}

fn parse_keywords(input: &str) -> Option<BTreeMap<String, String>> {
    let mut extensions = BTreeMap::new();
    for entry in input.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (key, value) = entry.split_once('=')?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty()
            || value.is_empty()
            || !key.chars().all(|ch| ch.is_ascii_alphanumeric())
            || !is_keyword_value(value)
        {
            return None;
        }
        extensions.insert(key.to_ascii_lowercase(), value.to_string());
    }
    Some(extensions)
}

/// Reads a BCP-47 `-u-` extension into keywords. A key without a value
/// means `true`. Any other singleton is rejected.
fn parse_unicode_extension(subtags: &[&str]) -> Option<BTreeMap<String, String>> {
    let (singleton, rest) = subtags.split_first()?;
    if !singleton.eq_ignore_ascii_case("u") || rest.is_empty() {
        return None;
    }
    let mut extensions = BTreeMap::new();
    let mut current: Option<(String, Vec<String>)> = None;
    for subtag in rest {
        if !is_variant_part(subtag) {
            return None;
        }
        if subtag.len() == 2 {
            if let Some((key, values)) = current.take() {
                extensions.insert(key, join_or_true(values));
            }
            current = Some((subtag.to_ascii_lowercase(), Vec::new()));
        } else if (3..=8).contains(&subtag.len()) {
            let (_, values) = current.as_mut()?;
            values.push(subtag.to_ascii_lowercase());
        } else {
            return None;
        }
    }
    if let Some((key, values)) = current {
        extensions.insert(key, join_or_true(values));
    }
    Some(extensions)
}

/// Keyword values must survive the `@key=value;...` rendering unchanged.
fn is_keyword_value(value: &str) -> bool {
    !value
        .chars()
        .any(|ch| matches!(ch, ';' | '=' | '@') || ch.is_whitespace())
}

fn join_or_true(values: Vec<String>) -> String {
    if values.is_empty() {
        String::from("true")
    } else {
        values.join("-")
    }
}

fn is_alpha(value: &str) -> bool {
    value.chars().all(|ch| ch.is_ascii_alphabetic())
}

fn is_language(value: &str) -> bool {
    (2..=8).contains(&value.len()) && is_alpha(value)
}

fn is_region(value: &str) -> bool {
    (value.len() == 2 && is_alpha(value))
        || (value.len() == 3 && value.chars().all(|ch| ch.is_ascii_digit()))
}

fn is_variant_part(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_alphanumeric())
}

fn is_bcp47_variant(value: &str) -> bool {
    let alnum = value.chars().all(|ch| ch.is_ascii_alphanumeric());
    match value.len() {
        5..=8 => alnum,
        4 => alnum && value.starts_with(|ch: char| ch.is_ascii_digit()),
        _ => false,
    }
}

fn titlecase(value: &str) -> String {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut output = String::with_capacity(value.len());
    output.push(first.to_ascii_uppercase());
    for ch in chars {
        output.push(ch.to_ascii_lowercase());
    }
    output
}
