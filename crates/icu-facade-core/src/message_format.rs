use std::fmt;

use tracing::debug;

use crate::icu_backend::{BackendNeeds, IcuBackend};
use crate::interpreter::render;
use crate::parser::{ArgumentKind, Message, parse_message};
use crate::{Args, CoreResult, IntoLocale, Locale};

/// Anything that renders text from named arguments.
pub trait Format {
    fn format(&self, args: &Args) -> CoreResult<String>;
}

/// An ICU MessageFormat pattern compiled for one locale.
///
/// The pattern is parsed and the locale formatters it needs are loaded once,
/// in [`MessageFormat::new`]; [`Format::format`] only reads that state.
pub struct MessageFormat {
    pattern: String,
    locale: Locale,
    message: Message,
    backend: IcuBackend,
}

impl MessageFormat {
    pub fn new(pattern: impl Into<String>, locale: impl IntoLocale) -> CoreResult<Self> {
        let pattern = pattern.into();
        let locale = locale.into_locale();
        let message = parse_message(&pattern)?;
        let needs = compile(&message);
        let backend = IcuBackend::new(&locale, &needs)?;
        debug!(
            locale = %locale,
            arguments = message.arguments().len(),
            formatters = needs.count(),
            "compiled message format"
        );
        Ok(Self {
            pattern,
            locale,
            message,
            backend,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Names of every argument the pattern references, in pattern order.
    pub fn argument_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for argument in self.message.arguments() {
            if !names.contains(&argument.name.as_str()) {
                names.push(&argument.name);
            }
        }
        names
    }

    pub fn format(&self, args: &Args) -> CoreResult<String> {
        render(&self.message, args, &self.backend)
    }
}

impl Format for MessageFormat {
    fn format(&self, args: &Args) -> CoreResult<String> {
        MessageFormat::format(self, args)
    }
}

impl fmt::Debug for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageFormat")
            .field("pattern", &self.pattern)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

/// Determines which formatters a message renders with. A simple `{x}`
/// argument may receive a number or a temporal value, so it needs both.
fn compile(message: &Message) -> BackendNeeds {
    let mut needs = BackendNeeds::default();
    for argument in message.arguments() {
        match &argument.kind {
            ArgumentKind::Simple => {
                needs.grouped = true;
                needs.datetime = true;
            }
            ArgumentKind::Number(style) => {
                if style.grouping {
                    needs.grouped = true;
                } else {
                    needs.ungrouped = true;
                }
            }
            ArgumentKind::Date(length) => {
                needs.dates.insert(*length);
            }
            ArgumentKind::Time(length) => {
                needs.times.insert(*length);
            }
            ArgumentKind::Plural(plural) => {
                needs.grouped = true;
                match plural.rule_type {
                    crate::PluralRuleType::Cardinal => needs.cardinal = true,
                    crate::PluralRuleType::Ordinal => needs.ordinal = true,
                }
            }
            ArgumentKind::Select(_) => {}
        }
    }
    needs
}

/// Wraps a formatter and post-processes everything it renders.
pub struct Transformed<F> {
    inner: F,
    transform: Box<dyn Fn(String) -> String + Send + Sync>,
}

impl<F: Format> Transformed<F> {
    pub fn new(inner: F, transform: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        Self {
            inner,
            transform: Box::new(transform),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: Format> Format for Transformed<F> {
    fn format(&self, args: &Args) -> CoreResult<String> {
        self.inner.format(args).map(|text| (self.transform)(text))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
    use num_bigint::BigInt;

    use super::{Format, MessageFormat, Transformed, compile};
    use crate::parser::parse_message;
    use crate::{Args, CoreError, Decimal, Locale};

    fn format(pattern: &str, locale: &str, args: Args) -> String {
        MessageFormat::new(pattern, locale)
            .expect("valid pattern")
            .format(&args)
            .expect("format")
    }

    fn decimal(input: &str) -> Decimal {
        input.parse().expect("decimal")
    }

    #[test]
    fn groups_digits_by_locale() {
        let args = || Args::new().with("n", 1234567);
        assert_eq!(format("{n, number}", "en_GB", args()), "1,234,567");
        assert_eq!(
            format("{n, number}", "fr_FR", args()),
            "1\u{202f}234\u{202f}567"
        );
        assert_eq!(
            format("{n}", "de_DE", Args::new().with("n", 1234.56)),
            "1.234,56"
        );
    }

    #[test]
    fn keeps_big_integers_exact() {
        let big = BigInt::from(10u32).pow(30);
        assert_eq!(
            format("{n, number}", "en", Args::new().with("n", big)),
            "1,000,000,000,000,000,000,000,000,000,000"
        );
    }

    #[test]
    fn rounds_floats_by_default() {
        assert_eq!(
            format("{pi}", "en", Args::new().with("pi", 3.14159265359)),
            "3.142"
        );
    }

    #[test]
    fn decimals_honor_sub_patterns() {
        assert_eq!(
            format(
                "{d, number, #.####################}",
                "en",
                Args::new().with("d", decimal("3.14159265358979323846"))
            ),
            "3.14159265358979323846"
        );
        assert_eq!(
            format(
                "{d, number, #.##}",
                "en",
                Args::new().with("d", decimal("99999999999999999999999999.99"))
            ),
            "99999999999999999999999999.99"
        );
        assert_eq!(
            format("{d}", "en", Args::new().with("d", decimal("1.23E+10"))),
            "12,300,000,000"
        );
        assert_eq!(
            format("{d}", "en", Args::new().with("d", decimal("-42.50"))),
            "-42.5"
        );
    }

    #[test]
    fn selects_plural_forms() {
        let pattern = "{n, plural, one {# book} other {# books}}";
        assert_eq!(format(pattern, "en", Args::new().with("n", 1)), "1 book");
        assert_eq!(format(pattern, "en", Args::new().with("n", 2)), "2 books");
        assert_eq!(format(pattern, "en", Args::new().with("n", 1.0)), "1 book");
    }

    #[test]
    fn exact_values_take_precedence() {
        let pattern = "{count, plural, =0 {no items} =1 {one item} other {# items}}";
        assert_eq!(format(pattern, "en", Args::new().with("count", 0)), "no items");
        assert_eq!(format(pattern, "en", Args::new().with("count", 1)), "one item");
        assert_eq!(format(pattern, "en", Args::new().with("count", 5)), "5 items");
    }

    #[test]
    fn offset_shifts_pound() {
        let pattern = "{num_guests, plural, offset:1 =0 {A} =1 {B} other {C with #}}";
        assert_eq!(
            format(pattern, "en", Args::new().with("num_guests", 5)),
            "C with 4"
        );
    }

    #[test]
    fn offset_keeps_exact_matches_on_the_raw_value() {
        let pattern = concat!(
            "{num_guests, plural, offset:1 ",
            "=0 {{host} does not give a party.}",
            "=1 {{host} invites {guest} to the party.}",
            "=2 {{host} invites {guest} and one other person to the party.}",
            "other {{host} invites {guest} and # other people to the party.}}"
        );
        let args = |guests: i64| {
            Args::new()
                .with("num_guests", guests)
                .with("host", "Alice")
                .with("guest", "Bob")
        };
        assert_eq!(format(pattern, "en_GB", args(0)), "Alice does not give a party.");
        assert_eq!(format(pattern, "en_GB", args(1)), "Alice invites Bob to the party.");
        assert_eq!(
            format(pattern, "en_GB", args(2)),
            "Alice invites Bob and one other person to the party."
        );
        assert_eq!(
            format(pattern, "en_GB", args(5)),
            "Alice invites Bob and 4 other people to the party."
        );
    }

    #[test]
    fn russian_plurals_use_few_and_many() {
        let pattern = "{count, plural, one {# день} few {# дня} many {# дней} other {# дня}}";
        let day = |count: i64| format(pattern, "ru_RU", Args::new().with("count", count));
        assert_eq!(day(1), "1 день");
        assert_eq!(day(2), "2 дня");
        assert_eq!(day(5), "5 дней");
        assert_eq!(day(11), "11 дней");
        assert_eq!(day(21), "21 день");
        assert_eq!(day(24), "24 дня");
    }

    #[test]
    fn selectordinal_applies_offset_before_selection() {
        let pattern = concat!(
            "{rank, selectordinal, offset:1 ",
            "one {You're #st after the winner!} ",
            "two {You're #nd after the winner!} ",
            "few {You're #rd after the winner!} ",
            "other {You're #th after the winner!}}"
        );
        assert_eq!(
            format(pattern, "en_GB", Args::new().with("rank", 2)),
            "You're 1st after the winner!"
        );
        assert_eq!(
            format(pattern, "en_GB", Args::new().with("rank", 3)),
            "You're 2nd after the winner!"
        );
    }

    #[test]
    fn selectordinal_uses_ordinal_rules() {
        let message =
            MessageFormat::new("{place, selectordinal, one {#st} two {#nd} few {#rd} other {#th}}", "en")
                .expect("valid pattern");
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 21, 22, 23]
            .into_iter()
            .map(|place| {
                message
                    .format(&Args::new().with("place", place))
                    .expect("format")
            })
            .collect();
        assert_eq!(
            rendered,
            ["1st", "2nd", "3rd", "4th", "11th", "21st", "22nd", "23rd"]
        );
    }

    #[test]
    fn renders_nested_arguments() {
        let pattern = "{host} {guests, plural, =0 {has no guests} other {{gender, select, female {invites her # friends} other {invites their # friends}}}}";
        let args = Args::new()
            .with("host", "Ada")
            .with("guests", 3)
            .with("gender", "female");
        assert_eq!(format(pattern, "en", args), "Ada invites her 3 friends");
    }

    #[test]
    fn formats_dates_and_times() {
        let day = NaiveDate::from_ymd_opt(1990, 5, 25).expect("date");
        assert_eq!(
            format("{d, date, long}", "en_GB", Args::new().with("d", day)),
            "25 May 1990"
        );
        let at: NaiveDateTime = "2024-01-15T14:30:00".parse().expect("datetime");
        assert_eq!(
            format("{d, date, short}", "en_GB", Args::new().with("d", at)),
            "15/01/2024"
        );
        assert_eq!(
            format("{d, time, short}", "en_GB", Args::new().with("d", at)),
            "14:30"
        );
        let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).expect("date");
        assert_eq!(
            format("{d, date}", "en_GB", Args::new().with("d", christmas)),
            "25 Dec 2024"
        );
    }

    #[test]
    fn formats_full_dates_beside_medium_times() {
        let at: NaiveDateTime = "2024-06-20T15:45:30".parse().expect("datetime");
        assert_eq!(
            format(
                "Scheduled for {when,date,full} at {when,time,medium}",
                "en_GB",
                Args::new().with("when", at)
            ),
            "Scheduled for Thursday, 20 June 2024 at 15:45:30"
        );
    }

    #[test]
    fn date_styles_follow_the_locale() {
        let christmas: NaiveDateTime = "2024-12-25T10:30:00".parse().expect("datetime");
        let pattern = "Date: {when,date,medium}";
        assert_eq!(
            format(pattern, "en_GB", Args::new().with("when", christmas)),
            "Date: 25 Dec 2024"
        );
        assert_eq!(
            format(pattern, "fr_FR", Args::new().with("when", christmas)),
            "Date: 25 déc. 2024"
        );
    }

    #[test]
    fn zoned_values_render_local_wall_clock() {
        let zone = FixedOffset::east_opt(9 * 3600).expect("offset");
        let at = zone
            .with_ymd_and_hms(2024, 1, 15, 14, 30, 0)
            .single()
            .expect("datetime");
        assert_eq!(
            format("{d, time, short}", "en_GB", Args::new().with("d", at)),
            "14:30"
        );
    }

    #[test]
    fn repeated_formats_do_not_leak_state() {
        let message =
            MessageFormat::new("{n, plural, one {# item} other {# items}}", "en").expect("pattern");
        let first = message.format(&Args::new().with("n", 1)).expect("format");
        let second = message.format(&Args::new().with("n", 2)).expect("format");
        let again = message.format(&Args::new().with("n", 1)).expect("format");
        assert_eq!(first, "1 item");
        assert_eq!(second, "2 items");
        assert_eq!(again, first);
    }

    #[test]
    fn quoted_braces_render_literally() {
        assert_eq!(
            format(
                "Use '{' and '}' to denote variables like {var}.",
                "en_GB",
                Args::new().with("var", "test")
            ),
            "Use { and } to denote variables like test."
        );
        assert_eq!(
            format("It''s {n}", "en_GB", Args::new().with("n", 3)),
            "It's 3"
        );
    }

    #[test]
    fn signed_zero_keeps_its_sign() {
        let temp = |value: f64| {
            format("Temperature: {temp}", "en_GB", Args::new().with("temp", value))
        };
        assert_eq!(temp(0.0), "Temperature: 0");
        assert_eq!(temp(-0.0), "Temperature: -0");
        assert_eq!(temp(-0.5), "Temperature: -0.5");
        assert_eq!(
            format(
                "{n, plural, =0 {none} other {#}}",
                "en_GB",
                Args::new().with("n", -0.0)
            ),
            "none"
        );
    }

    #[test]
    fn numbering_keyword_changes_digits_only() {
        let locale = Locale::builder("en")
            .country("GB")
            .extension("numbers", "arab")
            .build();
        let message = MessageFormat::new("{amount, number} pears", &locale).expect("pattern");
        assert_eq!(
            message.format(&Args::new().with("amount", 1234)).expect("format"),
            "١٬٢٣٤ pears"
        );
        let plural = MessageFormat::new("{n, plural, one {# pear} other {# pears}}", &locale)
            .expect("pattern");
        assert_eq!(
            plural.format(&Args::new().with("n", 1)).expect("format"),
            "١ pear"
        );
    }

    #[test]
    fn oversized_number_patterns_are_syntax_errors() {
        let pattern = format!("{{n, number, #.{}}}", "#".repeat(32_768));
        let err = MessageFormat::new(pattern, "en").expect_err("too many digits");
        assert!(matches!(err, CoreError::PatternSyntax(_)));
    }

    #[test]
    fn syntax_errors_fail_at_construction() {
        let err = MessageFormat::new("{n, plural, one {x}}", "en").expect_err("missing other");
        assert!(matches!(err, CoreError::PatternSyntax(_)));
        let err = MessageFormat::new("unbalanced {", "en").expect_err("unbalanced");
        assert!(matches!(err, CoreError::PatternSyntax(_)));
    }

    #[test]
    fn accepts_locale_values_and_strings() {
        let locale = Locale::builder("eng").country("GB").build();
        let message = MessageFormat::new("{n}", &locale).expect("pattern");
        assert_eq!(message.locale().to_string(), "en_GB");
        assert_eq!(message.pattern(), "{n}");
        let message = MessageFormat::new("{n}", String::from("fr_FR")).expect("pattern");
        assert_eq!(message.locale().country(), "FR");
    }

    #[test]
    fn lists_argument_names_once() {
        let message = MessageFormat::new("{a} {b, plural, other {{a} #}}", "en").expect("pattern");
        assert_eq!(message.argument_names(), vec!["a", "b"]);
    }

    #[test]
    fn compile_collects_needed_formatters() {
        let message = parse_message("{a, number, #.#} {b, date, full} {c, selectordinal, other {#}}")
            .expect("parse");
        let needs = compile(&message);
        assert!(needs.ungrouped);
        assert!(needs.grouped);
        assert!(needs.ordinal);
        assert!(!needs.cardinal);
        assert!(!needs.datetime);
        assert_eq!(needs.dates.len(), 1);
    }

    #[test]
    fn transformed_post_processes_output() {
        let base = MessageFormat::new("Hello, {name}!", "en").expect("pattern");
        let shouting = Transformed::new(base, |text| text.to_uppercase());
        let args = Args::new().with("name", "Ada");
        assert_eq!(shouting.format(&args).expect("format"), "HELLO, ADA!");
        assert_eq!(shouting.inner().pattern(), "Hello, {name}!");
    }
}
