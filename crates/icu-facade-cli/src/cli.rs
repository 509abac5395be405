use std::path::PathBuf;

use icu_facade_core::{SegmentKind, icu_version};
use thiserror::Error;

use crate::command_format::{FormatOptions, run_format};
use crate::command_locale::run_locale;
use crate::command_segment::{SegmentOptions, run_segment};
use crate::command_verify::{VerifyCommandError, VerifyOptions, run_verify};
use crate::config::DEFAULT_CONFIG_PATH;
use crate::error::CliError;

#[derive(Debug, Error)]
pub enum CliAppError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Cli(#[from] CliError),
    #[error(transparent)]
    Verify(#[from] VerifyCommandError),
}

#[derive(Debug)]
enum Command {
    Format(FormatOptions),
    Segment(SegmentOptions),
    Locale(String),
    Version,
    Verify(VerifyOptions),
}

pub fn run() -> Result<(), CliAppError> {
    let command = parse_command(std::env::args().skip(1).collect())?;
    for line in execute(command)? {
        println!("{line}");
    }
    Ok(())
}

fn execute(command: Command) -> Result<Vec<String>, CliAppError> {
    match command {
        Command::Format(options) => Ok(vec![run_format(&options)?]),
        Command::Segment(options) => Ok(run_segment(&options)?),
        Command::Locale(identifier) => Ok(vec![run_locale(&identifier)?]),
        Command::Version => Ok(vec![icu_version()]),
        Command::Verify(options) => {
            let file = run_verify(&options)?;
            Ok(vec![format!("verified {file}")])
        }
    }
}

fn parse_command(args: Vec<String>) -> Result<Command, CliAppError> {
    let mut args = args.into_iter();
    let command = args.next().ok_or_else(|| CliAppError::Usage(usage()))?;
    let rest: Vec<String> = args.collect();
    match command.as_str() {
        "format" => Ok(Command::Format(parse_format_options(rest)?)),
        "segment" => Ok(Command::Segment(parse_segment_options(rest)?)),
        "locale" => Ok(Command::Locale(parse_locale_identifier(rest)?)),
        "version" => {
            if rest.is_empty() {
                Ok(Command::Version)
            } else {
                Err(CliAppError::Usage(usage()))
            }
        }
        "verify-asset" => Ok(Command::Verify(parse_verify_options(rest)?)),
        "--help" | "-h" | "help" => Err(CliAppError::Usage(usage())),
        other => Err(CliAppError::Usage(format!(
            "unknown command `{other}`\n\n{}",
            usage()
        ))),
    }
}

fn parse_format_options(args: Vec<String>) -> Result<FormatOptions, CliAppError> {
    let mut pattern = None;
    let mut locale = None;
    let mut message_args = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pattern" => pattern = Some(next_value("--pattern", &mut iter)?),
            "--locale" => locale = Some(next_value("--locale", &mut iter)?),
            "--args" => message_args = Some(next_value("--args", &mut iter)?),
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let pattern = pattern.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(FormatOptions {
        pattern,
        locale,
        args: message_args,
        config_path,
    })
}

fn parse_segment_options(args: Vec<String>) -> Result<SegmentOptions, CliAppError> {
    let mut kind = None;
    let mut text = None;
    let mut locale = None;
    let mut offsets = false;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--kind" => {
                let value = next_value("--kind", &mut iter)?;
                let parsed: SegmentKind = value
                    .parse()
                    .map_err(|err| CliAppError::Usage(format!("{err}\n\n{}", usage())))?;
                kind = Some(parsed);
            }
            "--text" => text = Some(next_value("--text", &mut iter)?),
            "--locale" => locale = Some(next_value("--locale", &mut iter)?),
            "--offsets" => offsets = true,
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let kind = kind.ok_or_else(|| CliAppError::Usage(usage()))?;
    let text = text.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(SegmentOptions {
        kind,
        text,
        locale,
        offsets,
        config_path,
    })
}

fn parse_locale_identifier(args: Vec<String>) -> Result<String, CliAppError> {
    match <[String; 1]>::try_from(args) {
        Ok([identifier]) => Ok(identifier),
        Err(_) => Err(CliAppError::Usage(usage())),
    }
}

fn parse_verify_options(args: Vec<String>) -> Result<VerifyOptions, CliAppError> {
    let mut archive = None;
    let mut target = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--archive" => archive = Some(PathBuf::from(next_value("--archive", &mut iter)?)),
            "--target" => target = Some(next_value("--target", &mut iter)?),
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    Ok(VerifyOptions {
        archive,
        target,
        config_path,
    })
}

fn next_value(flag: &str, iter: &mut impl Iterator<Item = String>) -> Result<String, CliAppError> {
    iter.next()
        .ok_or_else(|| CliAppError::Usage(format!("{flag} requires a value\n\n{}", usage())))
}

fn usage() -> String {
    "usage: icu-facade format --pattern <pattern> [--locale <locale>] [--args <json>] [--config <path>]\n       icu-facade segment --kind character|word|line|sentence --text <text> [--locale <locale>] [--offsets] [--config <path>]\n       icu-facade locale <identifier>\n       icu-facade version\n       icu-facade verify-asset [--archive <path>] [--target <triple>] [--config <path>]".to_string()
}

#[cfg(test)]
mod tests {
    use super::{CliAppError, Command, execute, parse_command};
    use icu_facade_core::SegmentKind;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_format_command() {
        let command = parse_command(args(&[
            "format",
            "--pattern",
            "{n, number}",
            "--locale",
            "de_DE",
            "--args",
            r#"{"n": 1234.5}"#,
        ]))
        .expect("command");
        let Command::Format(options) = command else {
            panic!("expected format command");
        };
        assert_eq!(options.pattern, "{n, number}");
        assert_eq!(options.locale.as_deref(), Some("de_DE"));
        assert!(options.config_path.ends_with("icu-facade.toml"));
    }

    #[test]
    fn parses_segment_command() {
        let command = parse_command(args(&[
            "segment", "--kind", "grapheme", "--text", "abc", "--offsets",
        ]))
        .expect("command");
        let Command::Segment(options) = command else {
            panic!("expected segment command");
        };
        assert_eq!(options.kind, SegmentKind::Character);
        assert!(options.offsets);
        assert_eq!(options.locale, None);
    }

    #[test]
    fn parses_verify_command() {
        let command = parse_command(args(&[
            "verify-asset",
            "--archive",
            "icu.tar.gz",
            "--target",
            "x86_64-unknown-linux-musl",
        ]))
        .expect("command");
        let Command::Verify(options) = command else {
            panic!("expected verify command");
        };
        assert!(options.archive.expect("archive").ends_with("icu.tar.gz"));
        assert_eq!(options.target.as_deref(), Some("x86_64-unknown-linux-musl"));
    }

    #[test]
    fn unknown_commands_are_named() {
        let err = parse_command(args(&["frobnicate"])).expect_err("unknown");
        let CliAppError::Usage(message) = err else {
            panic!("expected usage error");
        };
        assert!(message.starts_with("unknown command `frobnicate`"));
    }

    #[test]
    fn rejects_missing_values_and_flags() {
        assert!(matches!(
            parse_command(args(&["format", "--pattern"])),
            Err(CliAppError::Usage(message)) if message.starts_with("--pattern requires a value")
        ));
        assert!(matches!(
            parse_command(args(&["segment", "--text", "abc"])),
            Err(CliAppError::Usage(_))
        ));
        assert!(matches!(
            parse_command(args(&["segment", "--kind", "paragraph", "--text", "abc"])),
            Err(CliAppError::Usage(_))
        ));
        assert!(matches!(parse_command(args(&[])), Err(CliAppError::Usage(_))));
        assert!(matches!(
            parse_command(args(&["locale", "en", "fr"])),
            Err(CliAppError::Usage(_))
        ));
    }

    #[test]
    fn executes_version_and_locale() {
        let lines = execute(parse_command(args(&["version"])).expect("command")).expect("run");
        assert_eq!(lines, ["1.5.0"]);
        let lines = execute(parse_command(args(&["locale", "fr_CA"])).expect("command"))
            .expect("run");
        assert!(lines[0].contains("\"language_tag\": \"fr-CA\""));
    }

    #[test]
    fn executes_format() {
        let command = parse_command(args(&[
            "format",
            "--pattern",
            "{n, number}",
            "--locale",
            "en",
            "--args",
            r#"{"n": 1234}"#,
        ]))
        .expect("command");
        assert_eq!(execute(command).expect("run"), ["1,234"]);
    }
}
