//! Mapping from legacy `@key=value` locale keywords to BCP-47 `-u-` extension
//! subtags.

const KEY_ALIASES: &[(&str, &str)] = &[
    ("calendar", "ca"),
    ("colalternate", "ka"),
    ("colbackwards", "kb"),
    ("colcasefirst", "kf"),
    ("colcaselevel", "kc"),
    ("colhiraganaquaternary", "kh"),
    ("collation", "co"),
    ("colnormalization", "kk"),
    ("colnumeric", "kn"),
    ("colreorder", "kr"),
    ("colstrength", "ks"),
    ("currency", "cu"),
    ("em", "em"),
    ("fw", "fw"),
    ("hours", "hc"),
    ("lb", "lb"),
    ("lw", "lw"),
    ("measure", "ms"),
    ("numbers", "nu"),
    ("sd", "sd"),
    ("ss", "ss"),
    ("timezone", "tz"),
    ("va", "va"),
    ("variabletop", "vt"),
];

const VALUE_ALIASES: &[(&str, &str, &str)] = &[
    ("ca", "ethiopic-amete-alem", "ethioaa"),
    ("ca", "gregorian", "gregory"),
    ("ca", "islamicc", "islamic-civil"),
    ("co", "dictionary", "dict"),
    ("co", "gb2312han", "gb2312"),
    ("co", "phonebook", "phonebk"),
    ("co", "traditional", "trad"),
    ("ks", "identical", "identic"),
    ("ks", "primary", "level1"),
    ("ks", "quaternary", "level4"),
    ("ks", "secondary", "level2"),
    ("ks", "tertiary", "level3"),
];

const BOOLEAN_KEYS: &[&str] = &["kb", "kc", "kh", "kk", "kn"];

/// Returns the Unicode extension key for a keyword, accepting both legacy
/// names and keys that are already in two-character form.
pub(crate) fn unicode_key(keyword: &str) -> Option<&'static str> {
    let keyword = keyword.to_ascii_lowercase();
    KEY_ALIASES
        .iter()
        .find(|(legacy, key)| *legacy == keyword || *key == keyword)
        .map(|(_, key)| *key)
}

pub(crate) fn unicode_value(key: &str, value: &str) -> String {
    let lower = value.to_ascii_lowercase();
    if let Some((_, _, mapped)) = VALUE_ALIASES
        .iter()
        .find(|(alias_key, legacy, _)| *alias_key == key && *legacy == lower)
    {
        return (*mapped).to_string();
    }
    if BOOLEAN_KEYS.contains(&key) {
        match lower.as_str() {
            "yes" | "on" => return String::from("true"),
            "no" | "off" => return String::from("false"),
            _ => {}
        }
    }
    lower
}

/// A value is representable when every hyphen-separated part is 3 to 8
/// alphanumerics.
pub(crate) fn is_valid_value(value: &str) -> bool {
    !value.is_empty()
        && value.split('-').all(|part| {
            (3..=8).contains(&part.len()) && part.chars().all(|ch| ch.is_ascii_alphanumeric())
        })
}
