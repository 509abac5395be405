use thiserror::Error;

use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::{DateLength, Decimal, NumberStyle, PluralCategory, PluralRuleType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {}:{}", .span.line, .span.column)]
pub struct PatternError {
    pub message: String,
    pub span: Span,
}

impl PatternError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// `#` inside a plural sub-message.
    Pound,
    Argument(Argument),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub kind: ArgumentKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentKind {
    Simple,
    Number(NumberStyle),
    Date(DateLength),
    Time(DateLength),
    Plural(PluralArgument),
    Select(SelectArgument),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralArgument {
    pub rule_type: PluralRuleType,
    pub offset: i64,
    pub cases: Vec<(PluralKey, Message)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluralKey {
    Exact(Decimal),
    Category(PluralCategory),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectArgument {
    pub cases: Vec<(String, Message)>,
}

impl PluralArgument {
    pub fn exact(&self, matches: impl Fn(&Decimal) -> bool) -> Option<&Message> {
        self.cases.iter().find_map(|(key, message)| match key {
            PluralKey::Exact(value) if matches(value) => Some(message),
            _ => None,
        })
    }

    pub fn category(&self, category: PluralCategory) -> Option<&Message> {
        self.cases.iter().find_map(|(key, message)| match key {
            PluralKey::Category(value) if *value == category => Some(message),
            _ => None,
        })
    }
}

impl SelectArgument {
    pub fn case(&self, selector: &str) -> Option<&Message> {
        self.cases
            .iter()
            .find(|(key, _)| key == selector)
            .map(|(_, message)| message)
    }
}

impl Message {
    /// Every argument reachable from this message, depth first.
    pub fn arguments(&self) -> Vec<&Argument> {
        let mut found = Vec::new();
        collect_arguments(self, &mut found);
        found
    }
}

fn collect_arguments<'a>(message: &'a Message, found: &mut Vec<&'a Argument>) {
    for part in &message.parts {
        let Part::Argument(argument) = part else {
            continue;
        };
        found.push(argument);
        match &argument.kind {
            ArgumentKind::Plural(plural) => {
                for (_, case) in &plural.cases {
                    collect_arguments(case, found);
                }
            }
            ArgumentKind::Select(select) => {
                for (_, case) in &select.cases {
                    collect_arguments(case, found);
                }
            }
            _ => {}
        }
    }
}

pub fn parse_message(input: &str) -> Result<Message, PatternError> {
    let tokens = Lexer::new(input).lex_all()?;
    let mut parser = Parser::new(tokens);
    parser.parse_message(false)
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    fn parse_message(&mut self, stop_on_rbrace: bool) -> Result<Message, PatternError> {
        let mut parts = Vec::new();
        while let Some(token) = self.peek().cloned() {
            match token.kind {
                TokenKind::Text(value) => {
                    self.next();
                    parts.push(Part::Text(value));
                }
                TokenKind::Pound => {
                    self.next();
                    parts.push(Part::Pound);
                }
                TokenKind::LBrace => {
                    self.next();
                    let argument = self.parse_argument(token.span)?;
                    parts.push(Part::Argument(argument));
                }
                TokenKind::RBrace if stop_on_rbrace => break,
                _ => return Err(self.error("unexpected token in message", token.span)),
            }
        }
        Ok(Message { parts })
    }

    fn parse_argument(&mut self, start: Span) -> Result<Argument, PatternError> {
        let name = match self.next() {
            Some(Token {
                kind: TokenKind::Word(name),
                ..
            }) => name,
            Some(token) => return Err(self.error("expected argument name", token.span)),
            None => return Err(self.error("expected argument name", start)),
        };

        if let Some(end) = self.eat(&TokenKind::RBrace) {
            return Ok(Argument {
                name,
                kind: ArgumentKind::Simple,
                span: span_merge(start, end),
            });
        }

        self.expect(TokenKind::Comma)?;
        let (arg_type, type_span) = self.expect_word("expected argument type")?;
        let kind = match arg_type.as_str() {
            "number" => ArgumentKind::Number(self.parse_number_style()?),
            "date" => ArgumentKind::Date(self.parse_date_length()?),
            "time" => ArgumentKind::Time(self.parse_date_length()?),
            "plural" => ArgumentKind::Plural(self.parse_plural(PluralRuleType::Cardinal, start)?),
            "selectordinal" => {
                ArgumentKind::Plural(self.parse_plural(PluralRuleType::Ordinal, start)?)
            }
            "select" => ArgumentKind::Select(self.parse_select(start)?),
            _ => {
                return Err(self.error(
                    format!("unsupported argument type `{arg_type}`"),
                    type_span,
                ));
            }
        };
        let end = self.expect(TokenKind::RBrace)?;
        Ok(Argument {
            name,
            kind,
            span: span_merge(start, end),
        })
    }

    fn parse_style(&mut self) -> Result<Option<(String, Span)>, PatternError> {
        if self.peek_is(&TokenKind::RBrace) {
            return Ok(None);
        }
        self.expect(TokenKind::Comma)?;
        match self.next() {
            Some(Token {
                kind: TokenKind::Style(style),
                span,
            }) if !style.is_empty() => Ok(Some((style, span))),
            Some(token) => Err(self.error("expected argument style", token.span)),
            None => Err(self.error("expected argument style", self.eof_span())),
        }
    }

    fn parse_number_style(&mut self) -> Result<NumberStyle, PatternError> {
        let Some((style, span)) = self.parse_style()? else {
            return Ok(NumberStyle::standard());
        };
        match style.as_str() {
            "integer" => Ok(NumberStyle::integer()),
            "percent" | "currency" => Err(self.error(
                format!("number style `{style}` is not supported"),
                span,
            )),
            _ if style.starts_with("::") => {
                Err(self.error("number skeletons are not supported", span))
            }
            _ => NumberStyle::parse(&style).map_err(|message| self.error(message, span)),
        }
    }

    fn parse_date_length(&mut self) -> Result<DateLength, PatternError> {
        let Some((style, span)) = self.parse_style()? else {
            return Ok(DateLength::Medium);
        };
        DateLength::from_keyword(&style).ok_or_else(|| {
            self.error(
                format!("unsupported date/time style `{style}`"),
                span,
            )
        })
    }

    fn parse_plural(
        &mut self,
        rule_type: PluralRuleType,
        start: Span,
    ) -> Result<PluralArgument, PatternError> {
        self.expect(TokenKind::Comma)?;
        let mut offset = 0;
        let mut cases: Vec<(PluralKey, Message)> = Vec::new();

        while !self.peek_is(&TokenKind::RBrace) {
            let (word, span) = self.expect_word("expected plural selector")?;
            if let Some(rest) = word.strip_prefix("offset:") {
                if !cases.is_empty() {
                    return Err(self.error("offset must precede plural cases", span));
                }
                let value = if rest.is_empty() {
                    self.expect_word("expected plural offset")?.0
                } else {
                    rest.to_string()
                };
                offset = value
                    .parse::<i64>()
                    .map_err(|_| self.error("invalid plural offset", span))?;
                continue;
            }

            let key = match word.strip_prefix('=') {
                Some(exact) => PluralKey::Exact(
                    exact
                        .parse::<Decimal>()
                        .map_err(|_| self.error("invalid exact plural selector", span))?,
                ),
                None => PluralKey::Category(PluralCategory::from_keyword(&word).ok_or_else(
                    || self.error(format!("invalid plural keyword `{word}`"), span),
                )?),
            };
            if cases.iter().any(|(existing, _)| *existing == key) {
                return Err(self.error(format!("duplicate selector `{word}`"), span));
            }
            let message = self.parse_sub_message()?;
            cases.push((key, message));
        }

        if !cases
            .iter()
            .any(|(key, _)| *key == PluralKey::Category(PluralCategory::Other))
        {
            return Err(self.error("missing `other` case", start));
        }
        Ok(PluralArgument {
            rule_type,
            offset,
            cases,
        })
    }

    fn parse_select(&mut self, start: Span) -> Result<SelectArgument, PatternError> {
        self.expect(TokenKind::Comma)?;
        let mut cases: Vec<(String, Message)> = Vec::new();
        while !self.peek_is(&TokenKind::RBrace) {
            let (key, span) = self.expect_word("expected select case")?;
            if cases.iter().any(|(existing, _)| *existing == key) {
                return Err(self.error(format!("duplicate selector `{key}`"), span));
            }
            let message = self.parse_sub_message()?;
            cases.push((key, message));
        }
        if !cases.iter().any(|(key, _)| key == "other") {
            return Err(self.error("missing `other` case", start));
        }
        Ok(SelectArgument { cases })
    }

    fn parse_sub_message(&mut self) -> Result<Message, PatternError> {
        self.expect(TokenKind::LBrace)?;
        let message = self.parse_message(true)?;
        self.expect(TokenKind::RBrace)?;
        Ok(message)
    }

    fn expect_word(&mut self, message: &str) -> Result<(String, Span), PatternError> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Word(word),
                span,
            }) => Ok((word, span)),
            Some(token) => Err(self.error(message, token.span)),
            None => Err(self.error(message, self.eof_span())),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Span, PatternError> {
        match self.next() {
            Some(token) if token.kind == kind => Ok(token.span),
            Some(token) => Err(self.error(format!("expected {}", describe(&kind)), token.span)),
            None => Err(self.error(format!("expected {}", describe(&kind)), self.eof_span())),
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> Option<Span> {
        if self.peek_is(kind) {
            self.next().map(|token| token.span)
        } else {
            None
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == *kind)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn eof_span(&self) -> Span {
        self.tokens
            .last()
            .map(|token| Span {
                start: token.span.end,
                ..token.span
            })
            .unwrap_or(Span {
                start: 0,
                end: 0,
                line: 1,
                column: 1,
            })
    }

    fn error(&self, message: impl Into<String>, span: Span) -> PatternError {
        PatternError::new(message, span)
    }
}

fn describe(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::LBrace => "'{'",
        TokenKind::RBrace => "'}'",
        TokenKind::Comma => "','",
        TokenKind::Pound => "'#'",
        TokenKind::Text(_) => "text",
        TokenKind::Word(_) => "word",
        TokenKind::Style(_) => "style",
    }
}

fn span_merge(start: Span, end: Span) -> Span {
    Span {
        start: start.start,
        end: end.end,
        line: start.line,
        column: start.column,
    }
}
