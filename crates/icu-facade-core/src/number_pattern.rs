use fixed_decimal::FixedDecimal;

/// Digit layout for a `{n, number, ...}` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberStyle {
    pub min_integer_digits: u16,
    pub min_fraction_digits: u16,
    /// `None` keeps every digit of exact values; floats then fall back to
    /// three fraction digits.
    pub max_fraction_digits: Option<u16>,
    pub grouping: bool,
    pub prefix: String,
    pub suffix: String,
}

const FLOAT_FRACTION_DIGITS: u16 = 3;

/// Upper bound on the integer or fraction digits a sub-pattern may request.
const MAX_PATTERN_DIGITS: usize = 999;

impl NumberStyle {
    pub fn standard() -> Self {
        Self {
            min_integer_digits: 1,
            min_fraction_digits: 0,
            max_fraction_digits: None,
            grouping: true,
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    pub fn integer() -> Self {
        Self {
            max_fraction_digits: Some(0),
            ..Self::standard()
        }
    }

    /// Parses a decimal sub-pattern such as `#,##0.00` or `#.##`, with
    /// optional literal text on either side.
    pub fn parse(pattern: &str) -> Result<Self, &'static str> {
        let pattern = pattern.trim();
        if pattern.contains(';') {
            return Err("negative sub-patterns are not supported");
        }
        let is_digit_char = |ch: char| matches!(ch, '#' | '0' | ',' | '.');
        let (Some(first), Some(last)) = (pattern.find(is_digit_char), pattern.rfind(is_digit_char))
        else {
            return Err("number pattern has no digits");
        };

        let prefix = unquote(&pattern[..first]);
        let body = &pattern[first..=last];
        let suffix = unquote(&pattern[last + 1..]);
        if [&prefix, &suffix]
            .iter()
            .any(|affix| affix.contains(['%', '\u{2030}', '\u{a4}']))
        {
            return Err("percent and currency patterns are not supported");
        }
        if !body.chars().all(is_digit_char) {
            return Err("unexpected character in number pattern");
        }

        let (integer, fraction) = body.split_once('.').unwrap_or((body, ""));
        if fraction.contains(['.', ',']) {
            return Err("malformed fraction in number pattern");
        }
        if fraction.trim_start_matches('0').contains('0') {
            return Err("optional fraction digits must follow required ones");
        }
        let min_fraction_digits = digit_count(count(fraction, '0'))?;
        let max_fraction_digits = digit_count(fraction.len())?;
        let min_integer_digits = digit_count(count(integer, '0'))?;

        Ok(Self {
            min_integer_digits: min_integer_digits.max(1),
            min_fraction_digits,
            max_fraction_digits: Some(max_fraction_digits),
            grouping: integer.contains(','),
            prefix,
            suffix,
        })
    }

    pub(crate) fn apply(&self, value: &mut FixedDecimal, is_float: bool) {
        let max = self
            .max_fraction_digits
            .or(is_float.then_some(FLOAT_FRACTION_DIGITS));
        if let Some(max) = max {
            value.half_even(-position(max));
        }
        value.trim_end();
        if self.min_fraction_digits > 0 {
            value.pad_end(-position(self.min_fraction_digits));
        }
        if self.min_integer_digits > 1 {
            value.pad_start(position(self.min_integer_digits));
        }
    }
}

impl Default for NumberStyle {
    fn default() -> Self {
        Self::standard()
    }
}

fn count(value: &str, needle: char) -> usize {
    value.chars().filter(|ch| *ch == needle).count()
}

fn digit_count(digits: usize) -> Result<u16, &'static str> {
    if digits > MAX_PATTERN_DIGITS {
        return Err("too many digits in number pattern");
    }
    u16::try_from(digits).map_err(|_| "too many digits in number pattern")
}

/// Digit position for `FixedDecimal`, saturating for styles built by hand.
fn position(digits: u16) -> i16 {
    i16::try_from(digits.min(MAX_PATTERN_DIGITS as u16)).unwrap_or(i16::MAX)
}

fn unquote(affix: &str) -> String {
    let mut output = String::with_capacity(affix.len());
    let mut chars = affix.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\'' {
            output.push(ch);
        } else if chars.peek() == Some(&'\'') {
            chars.next();
            output.push('\'');
        }
    }
    output
}
