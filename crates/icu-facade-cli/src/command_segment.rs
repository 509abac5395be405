use std::path::PathBuf;

use icu_facade_core::{SegmentKind, new_segmenter};

use crate::config::resolve_locale;
use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct SegmentOptions {
    pub kind: SegmentKind,
    pub text: String,
    pub locale: Option<String>,
    pub offsets: bool,
    pub config_path: PathBuf,
}

/// One output line per segment: the segment text as a JSON string, or its
/// `start..end` byte range when offsets are requested.
pub fn run_segment(options: &SegmentOptions) -> Result<Vec<String>, CliError> {
    let locale = resolve_locale(options.locale.as_deref(), &options.config_path)?;
    let segmenter = new_segmenter(options.kind, options.text.as_str(), locale);
    if options.offsets {
        return Ok(segmenter
            .segments()
            .map(|(start, end)| format!("{start}..{end}"))
            .collect());
    }
    segmenter
        .iter()
        .map(|piece| serde_json::to_string(piece).map_err(CliError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{SegmentOptions, run_segment};
    use icu_facade_core::SegmentKind;
    use std::path::PathBuf;

    fn options(kind: SegmentKind, text: &str, offsets: bool) -> SegmentOptions {
        SegmentOptions {
            kind,
            text: text.to_string(),
            locale: Some("en".to_string()),
            offsets,
            config_path: PathBuf::from("does-not-exist/icu-facade.toml"),
        }
    }

    #[test]
    fn prints_quoted_pieces() {
        let lines = run_segment(&options(SegmentKind::Word, "Hello World", false)).expect("segment");
        assert_eq!(lines, ["\"Hello\"", "\" \"", "\"World\""]);
    }

    #[test]
    fn prints_offsets() {
        let lines = run_segment(&options(SegmentKind::Word, "Hello World", true)).expect("segment");
        assert_eq!(lines, ["0..5", "5..6", "6..11"]);
    }

    #[test]
    fn escapes_control_characters() {
        let lines = run_segment(&options(SegmentKind::Sentence, "One.\nTwo.", false))
            .expect("segment");
        assert_eq!(lines, ["\"One.\\n\"", "\"Two.\""]);
    }

    #[test]
    fn empty_text_prints_nothing() {
        let lines = run_segment(&options(SegmentKind::Line, "", true)).expect("segment");
        assert!(lines.is_empty());
    }

    #[test]
    fn accepts_json_locale_objects() {
        let mut options = options(SegmentKind::Word, "Hello World", true);
        options.locale = Some(r#"{"language": "en", "country": "US"}"#.to_string());
        assert_eq!(run_segment(&options).expect("segment"), ["0..5", "5..6", "6..11"]);
    }
}
