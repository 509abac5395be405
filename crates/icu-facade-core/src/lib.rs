//! Locale identifiers, text segmentation and ICU MessageFormat rendering,
//! backed by ICU4X compiled data.
#![forbid(unsafe_code)]

mod args;
mod decimal;
mod error;
mod format_backend;
mod icu_backend;
mod interpreter;
mod keywords;
mod lexer;
mod locale;
mod message_format;
mod number;
mod number_pattern;
mod parser;
mod segment;
mod version;

pub use args::{Args, Value};
pub use decimal::{Decimal, ParseDecimalError};
pub use error::{CoreError, CoreResult};
pub use format_backend::{
    DateLength, FormatBackend, FormatterId, PluralCategory, PluralRuleType, format_value,
};
pub use icu_backend::{BackendNeeds, IcuBackend};
pub use interpreter::render;
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use locale::{IntoLocale, Locale, LocaleBuilder, locale_from_json};
pub use message_format::{Format, MessageFormat, Transformed};
pub use number_pattern::NumberStyle;
pub use parser::{
    Argument, ArgumentKind, Message, Part, PatternError, PluralArgument, PluralKey,
    SelectArgument, parse_message,
};
pub use segment::{
    Boundaries, CharacterBreaker, LineBreaker, Pieces, SegmentKind, Segments, SentenceBreaker,
    TextSegmenter, WordBreaker, Words, new_segmenter,
};
pub use version::{VersionInfo, icu_version, icu_version_info};
