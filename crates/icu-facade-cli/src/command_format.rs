use std::path::PathBuf;

use icu_facade_core::{Args, MessageFormat};

use crate::config::resolve_locale;
use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub pattern: String,
    pub locale: Option<String>,
    pub args: Option<String>,
    pub config_path: PathBuf,
}

pub fn run_format(options: &FormatOptions) -> Result<String, CliError> {
    let locale = resolve_locale(options.locale.as_deref(), &options.config_path)?;
    let args = match &options.args {
        Some(json) => Args::from_json(&serde_json::from_str(json)?)?,
        None => Args::new(),
    };
    let message = MessageFormat::new(options.pattern.as_str(), &locale)?;
    Ok(message.format(&args)?)
}

#[cfg(test)]
mod tests {
    use super::{FormatOptions, run_format};
    use crate::error::CliError;
    use icu_facade_core::CoreError;
    use std::path::PathBuf;

    fn options(pattern: &str, locale: Option<&str>, args: Option<&str>) -> FormatOptions {
        FormatOptions {
            pattern: pattern.to_string(),
            locale: locale.map(str::to_string),
            args: args.map(str::to_string),
            config_path: PathBuf::from("does-not-exist/icu-facade.toml"),
        }
    }

    #[test]
    fn formats_with_json_args() {
        let options = options(
            "{n, plural, one {# file} other {# files}} in {dir}",
            Some("en"),
            Some(r#"{"n": 1200, "dir": "tmp"}"#),
        );
        assert_eq!(run_format(&options).expect("format"), "1,200 files in tmp");
    }

    #[test]
    fn falls_back_to_config_locale() {
        let options = options("{n, number}", None, Some(r#"{"n": 1234567}"#));
        assert_eq!(run_format(&options).expect("format"), "1,234,567");
    }

    #[test]
    fn formats_without_args() {
        let options = options("Hello, {name}!", Some("en"), None);
        assert_eq!(run_format(&options).expect("format"), "Hello, {name}!");
    }

    #[test]
    fn reports_pattern_errors() {
        let options = options("{n, plural, one {x}}", Some("en"), None);
        let err = run_format(&options).expect_err("missing other");
        assert!(matches!(err, CliError::Core(CoreError::PatternSyntax(_))));
    }

    #[test]
    fn reports_malformed_args() {
        let options = options("{n}", Some("en"), Some("{not json"));
        assert!(matches!(
            run_format(&options).expect_err("bad json"),
            CliError::Json(_)
        ));
    }

    #[test]
    fn accepts_json_locale_objects() {
        let options = options(
            "{n, number}",
            Some(r#"{"language": "de", "country": "DE"}"#),
            Some(r#"{"n": 1234.5}"#),
        );
        assert_eq!(run_format(&options).expect("format"), "1.234,5");
    }
}
