use std::fmt;
use std::str::FromStr;

use icu::segmenter::{
    GraphemeClusterSegmenter, LineBreakOptions, LineBreakStrictness, LineSegmenter,
    SentenceSegmenter, WordBreakIteratorUtf8, WordSegmenter,
};
use tracing::trace;

use crate::{CoreError, IntoLocale, Locale};

/// Raw breakpoints, starting at 0 and ending at the text length.
pub type Boundaries<'a> = Box<dyn Iterator<Item = usize> + 'a>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Character,
    Word,
    Line,
    Sentence,
}

impl SegmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Character => "character",
            SegmentKind::Word => "word",
            SegmentKind::Line => "line",
            SegmentKind::Sentence => "sentence",
        }
    }
}

impl FromStr for SegmentKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "character" | "grapheme" => Ok(SegmentKind::Character),
            "word" => Ok(SegmentKind::Word),
            "line" => Ok(SegmentKind::Line),
            "sentence" => Ok(SegmentKind::Sentence),
            _ => Err(CoreError::InvalidArgument(format!(
                "unknown segment kind `{value}`"
            ))),
        }
    }
}

/// Locale-aware segmentation of a fixed text.
///
/// Offsets are UTF-8 byte offsets into [`TextSegmenter::text`]. Every call to
/// [`segments`](TextSegmenter::segments) or [`iter`](TextSegmenter::iter)
/// starts a fresh traversal.
pub trait TextSegmenter {
    fn kind(&self) -> SegmentKind;
    fn text(&self) -> &str;
    fn locale(&self) -> &Locale;
    fn boundaries(&self) -> Boundaries<'_>;

    fn segments(&self) -> Segments<'_> {
        trace!(
            kind = self.kind().as_str(),
            len = self.text().len(),
            "segmenting text"
        );
        Segments::new(self.boundaries())
    }

    fn iter(&self) -> Pieces<'_> {
        Pieces {
            text: self.text(),
            segments: self.segments(),
        }
    }
}

/// `(start, end)` pairs between consecutive breakpoints. Empty ranges are
/// skipped, so empty text yields nothing.
pub struct Segments<'a> {
    boundaries: Boundaries<'a>,
    start: usize,
}

impl<'a> Segments<'a> {
    fn new(boundaries: Boundaries<'a>) -> Self {
        Self {
            boundaries,
            start: 0,
        }
    }
}

impl Iterator for Segments<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let end = self.boundaries.next()?;
            if end <= self.start {
                continue;
            }
            let start = std::mem::replace(&mut self.start, end);
            return Some((start, end));
        }
    }
}

impl fmt::Debug for Segments<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segments")
            .field("start", &self.start)
            .finish_non_exhaustive()
    }
}

/// The text of each segment.
#[derive(Debug)]
pub struct Pieces<'a> {
    text: &'a str,
    segments: Segments<'a>,
}

impl<'a> Iterator for Pieces<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let (start, end) = self.segments.next()?;
        self.text.get(start..end)
    }
}

/// Grapheme cluster (user-perceived character) segmentation.
pub struct CharacterBreaker {
    text: String,
    locale: Locale,
    segmenter: GraphemeClusterSegmenter,
}

impl CharacterBreaker {
    pub fn new(text: impl Into<String>, locale: impl IntoLocale) -> Self {
        Self {
            text: text.into(),
            locale: locale.into_locale(),
            segmenter: GraphemeClusterSegmenter::new(),
        }
    }
}

impl TextSegmenter for CharacterBreaker {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Character
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn boundaries(&self) -> Boundaries<'_> {
        Box::new(self.segmenter.segment_str(&self.text))
    }
}

/// Word segmentation; words and the separators between them are separate
/// segments. Dictionary and LSTM models handle scripts written without
/// spaces.
pub struct WordBreaker {
    text: String,
    locale: Locale,
    segmenter: WordSegmenter,
}

impl WordBreaker {
    pub fn new(text: impl Into<String>, locale: impl IntoLocale) -> Self {
        Self {
            text: text.into(),
            locale: locale.into_locale(),
            segmenter: WordSegmenter::new_auto(),
        }
    }

    /// Only the word-like segments: letters, numbers and ideographs, without
    /// whitespace or punctuation.
    pub fn words(&self) -> Words<'_> {
        Words {
            text: &self.text,
            inner: self.segmenter.segment_str(&self.text),
            start: 0,
        }
    }
}

impl TextSegmenter for WordBreaker {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Word
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn boundaries(&self) -> Boundaries<'_> {
        Box::new(self.segmenter.segment_str(&self.text))
    }
}

pub struct Words<'a> {
    text: &'a str,
    inner: WordBreakIteratorUtf8<'a, 'a>,
    start: usize,
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let end = self.inner.next()?;
            let start = std::mem::replace(&mut self.start, end);
            if end > start && self.inner.is_word_like() {
                return self.text.get(start..end);
            }
        }
    }
}

/// Line break opportunities. Trailing spaces and hyphens stay with the
/// preceding segment.
///
/// The `lb` locale keyword (`strict`, `normal`, `loose`) selects the break
/// strictness.
pub struct LineBreaker {
    text: String,
    locale: Locale,
    segmenter: LineSegmenter,
}

impl LineBreaker {
    pub fn new(text: impl Into<String>, locale: impl IntoLocale) -> Self {
        let locale = locale.into_locale();
        let segmenter = LineSegmenter::new_auto_with_options(line_options(&locale));
        Self {
            text: text.into(),
            locale,
            segmenter,
        }
    }
}

fn line_options(locale: &Locale) -> LineBreakOptions {
    let mut options = LineBreakOptions::default();
    let strictness = locale.extension("lb").or_else(|| locale.extension("linebreak"));
    match strictness.map(str::to_ascii_lowercase).as_deref() {
        Some("strict") => options.strictness = LineBreakStrictness::Strict,
        Some("loose") => options.strictness = LineBreakStrictness::Loose,
        Some("anywhere") => options.strictness = LineBreakStrictness::Anywhere,
        _ => {}
    }
    options.ja_zh = matches!(locale.language(), "ja" | "zh");
    options
}

impl TextSegmenter for LineBreaker {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Line
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn boundaries(&self) -> Boundaries<'_> {
        Box::new(self.segmenter.segment_str(&self.text))
    }
}

/// Sentence segmentation. Terminal punctuation and the whitespace after it
/// belong to the sentence they end.
pub struct SentenceBreaker {
    text: String,
    locale: Locale,
    segmenter: SentenceSegmenter,
}

impl SentenceBreaker {
    pub fn new(text: impl Into<String>, locale: impl IntoLocale) -> Self {
        Self {
            text: text.into(),
            locale: locale.into_locale(),
            segmenter: SentenceSegmenter::new(),
        }
    }
}

impl TextSegmenter for SentenceBreaker {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Sentence
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn boundaries(&self) -> Boundaries<'_> {
        Box::new(self.segmenter.segment_str(&self.text))
    }
}

macro_rules! breaker_common {
    ($($breaker:ident),*) => {
        $(
            impl<'a> IntoIterator for &'a $breaker {
                type Item = &'a str;
                type IntoIter = Pieces<'a>;

                fn into_iter(self) -> Self::IntoIter {
                    self.iter()
                }
            }

            impl fmt::Debug for $breaker {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($breaker))
                        .field("text", &self.text)
                        .field("locale", &self.locale)
                        .finish_non_exhaustive()
                }
            }
        )*
    };
}

breaker_common!(CharacterBreaker, WordBreaker, LineBreaker, SentenceBreaker);

/// Builds the breaker for `kind`.
pub fn new_segmenter(
    kind: SegmentKind,
    text: impl Into<String>,
    locale: impl IntoLocale,
) -> Box<dyn TextSegmenter + Send + Sync> {
    match kind {
        SegmentKind::Character => Box::new(CharacterBreaker::new(text, locale)),
        SegmentKind::Word => Box::new(WordBreaker::new(text, locale)),
        SegmentKind::Line => Box::new(LineBreaker::new(text, locale)),
        SegmentKind::Sentence => Box::new(SentenceBreaker::new(text, locale)),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CharacterBreaker, LineBreaker, SegmentKind, SentenceBreaker, TextSegmenter, WordBreaker,
        new_segmenter,
    };

    fn pieces(segmenter: &dyn TextSegmenter) -> Vec<&str> {
        segmenter.iter().collect()
    }

    #[test]
    fn word_segments_alternate_words_and_separators() {
        let breaker = WordBreaker::new("Hello World", "en");
        assert_eq!(
            breaker.segments().collect::<Vec<_>>(),
            vec![(0, 5), (5, 6), (6, 11)]
        );
        let breaker = WordBreaker::new("Hello, World!", "en_US");
        assert_eq!(pieces(&breaker), vec!["Hello", ",", " ", "World", "!"]);
        let breaker = WordBreaker::new("self-contained", "en");
        assert_eq!(pieces(&breaker), vec!["self", "-", "contained"]);
    }

    #[test]
    fn word_breaker_keeps_contractions() {
        let breaker = WordBreaker::new("I'm here", "en");
        assert_eq!(pieces(&breaker), vec!["I'm", " ", "here"]);
        assert_eq!(breaker.words().collect::<Vec<_>>(), vec!["I'm", "here"]);
    }

    #[test]
    fn whitespace_is_a_single_word_segment() {
        let breaker = WordBreaker::new("   ", "en");
        assert_eq!(pieces(&breaker), vec!["   "]);
        assert_eq!(breaker.words().count(), 0);
    }

    #[test]
    fn line_segments_keep_trailing_space_and_hyphen() {
        let breaker = LineBreaker::new("Hello World", "en");
        assert_eq!(
            breaker.segments().collect::<Vec<_>>(),
            vec![(0, 6), (6, 11)]
        );
        let breaker = LineBreaker::new("self-contained", "en");
        assert_eq!(
            breaker.segments().collect::<Vec<_>>(),
            vec![(0, 5), (5, 14)]
        );
        let breaker = LineBreaker::new("Hello\nWorld", "en");
        assert_eq!(pieces(&breaker), vec!["Hello\n", "World"]);
    }

    #[test]
    fn sentence_segments_skip_abbreviations_and_decimals() {
        let breaker = SentenceBreaker::new("Hello. World.", "en");
        assert_eq!(pieces(&breaker), vec!["Hello. ", "World."]);
        let breaker = SentenceBreaker::new("The value is 3.14. That's pi.", "en");
        assert_eq!(pieces(&breaker), vec!["The value is 3.14. ", "That's pi."]);
    }

    #[test]
    fn character_segments_keep_emoji_sequences() {
        let family = "\u{1f468}\u{200d}\u{1f469}\u{200d}\u{1f467}\u{200d}\u{1f466}";
        let wave = "\u{1f44b}\u{1f3fd}";
        let text = format!("a{family}{wave}e\u{301}");
        let breaker = CharacterBreaker::new(text.as_str(), "en");
        assert_eq!(pieces(&breaker), vec!["a", family, wave, "e\u{301}"]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        for kind in [
            SegmentKind::Character,
            SegmentKind::Word,
            SegmentKind::Line,
            SegmentKind::Sentence,
        ] {
            let segmenter = new_segmenter(kind, "", "en");
            assert_eq!(segmenter.segments().count(), 0, "{kind:?}");
            assert_eq!(segmenter.iter().count(), 0, "{kind:?}");
        }
    }

    #[test]
    fn traversals_restart() {
        let breaker = WordBreaker::new("one two", "en");
        let first: Vec<_> = breaker.segments().collect();
        let second: Vec<_> = breaker.segments().collect();
        assert_eq!(first, second);
        let joined: String = (&breaker).into_iter().collect();
        assert_eq!(joined, "one two");
    }

    #[test]
    fn segments_cover_multibyte_text() {
        let text = "Grüße, 世界! Ça va?";
        for kind in [
            SegmentKind::Character,
            SegmentKind::Word,
            SegmentKind::Line,
            SegmentKind::Sentence,
        ] {
            let segmenter = new_segmenter(kind, text, "en");
            let mut expected_start = 0;
            for (start, end) in segmenter.segments() {
                assert_eq!(start, expected_start, "{kind:?}");
                assert!(end > start);
                assert!(text.is_char_boundary(end));
                expected_start = end;
            }
            assert_eq!(expected_start, text.len(), "{kind:?}");
            assert_eq!(segmenter.iter().collect::<String>(), text);
        }
    }

    #[test]
    fn parses_segment_kinds() {
        assert_eq!("word".parse::<SegmentKind>().expect("kind"), SegmentKind::Word);
        assert_eq!(
            "grapheme".parse::<SegmentKind>().expect("kind"),
            SegmentKind::Character
        );
        assert!("paragraph".parse::<SegmentKind>().is_err());
    }

    #[test]
    fn breakers_keep_their_locale() {
        let breaker = LineBreaker::new("text", "ja_JP@lb=strict");
        assert_eq!(breaker.locale().language(), "ja");
        assert_eq!(breaker.text(), "text");
        assert_eq!(breaker.kind(), SegmentKind::Line);
    }

    #[test]
    fn breakers_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CharacterBreaker>();
        assert_send_sync::<WordBreaker>();
        assert_send_sync::<LineBreaker>();
        assert_send_sync::<SentenceBreaker>();
    }
}
