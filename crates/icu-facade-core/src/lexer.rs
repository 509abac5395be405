use crate::parser::PatternError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text with quoting already resolved.
    Text(String),
    Pound,
    LBrace,
    RBrace,
    Comma,
    Word(String),
    /// Raw style text after the second comma of a simple argument.
    Style(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    offset: usize,
    line: u32,
    column: u32,
    mode_stack: Vec<Mode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Mode {
    Text { plural: bool },
    Expr(ExprState),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct ExprState {
    plural: bool,
    commas: u8,
    arg_type: Option<String>,
}

impl ExprState {
    fn has_sub_messages(&self) -> bool {
        matches!(
            self.arg_type.as_deref(),
            Some("plural" | "selectordinal" | "select")
        )
    }

    fn opens_plural(&self) -> bool {
        matches!(self.arg_type.as_deref(), Some("plural" | "selectordinal"))
    }
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            offset: 0,
            line: 1,
            column: 1,
            mode_stack: vec![Mode::Text { plural: false }],
        }
    }

    pub fn lex_all(mut self) -> Result<Vec<Token>, PatternError> {
        let mut tokens = Vec::new();
        while self.offset < self.bytes.len() {
            match self.mode_stack.last() {
                Some(Mode::Expr(_)) => self.lex_expr_token(&mut tokens)?,
                Some(Mode::Text { plural }) => {
                    let plural = *plural;
                    self.lex_text_token(&mut tokens, plural)?;
                }
                None => return Err(self.error("unbalanced brace", self.here())),
            }
        }
        if self.mode_stack.len() > 1 {
            return Err(self.error("unclosed brace", self.here()));
        }
        Ok(tokens)
    }

    fn lex_text_token(&mut self, tokens: &mut Vec<Token>, plural: bool) -> Result<(), PatternError> {
        let start = self.offset;
        let line = self.line;
        let column = self.column;
        let mut text = String::new();

        while self.offset < self.bytes.len() {
            let byte = self.bytes[self.offset];
            if byte == b'{' || byte == b'}' || (plural && byte == b'#') {
                break;
            }
            if byte == b'\'' {
                self.lex_apostrophe(&mut text, plural);
                continue;
            }
            text.push(self.advance_char());
        }

        if self.offset > start {
            tokens.push(Token {
                kind: TokenKind::Text(text),
                span: Span {
                    start,
                    end: self.offset,
                    line,
                    column,
                },
            });
        }
        if self.offset >= self.bytes.len() {
            return Ok(());
        }

        let span = self.single_span();
        match self.bytes[self.offset] {
            b'{' => {
                tokens.push(Token {
                    kind: TokenKind::LBrace,
                    span,
                });
                self.advance_char();
                self.mode_stack.push(Mode::Expr(ExprState {
                    plural,
                    ..ExprState::default()
                }));
            }
            b'}' => {
                if self.mode_stack.len() <= 1 {
                    return Err(self.error("unbalanced brace", span));
                }
                tokens.push(Token {
                    kind: TokenKind::RBrace,
                    span,
                });
                self.advance_char();
                self.mode_stack.pop();
            }
            b'#' => {
                tokens.push(Token {
                    kind: TokenKind::Pound,
                    span,
                });
                self.advance_char();
            }
            _ => {}
        }
        Ok(())
    }

    /// Apostrophes quote only when followed by a syntax character; `''` is
    /// always a literal apostrophe. An unterminated quote runs to the end.
    fn lex_apostrophe(&mut self, text: &mut String, plural: bool) {
        self.advance_char();
        match self.bytes.get(self.offset) {
            Some(b'\'') => {
                self.advance_char();
                text.push('\'');
            }
            Some(b'{' | b'}' | b'|') => self.lex_quoted(text),
            Some(b'#') if plural => self.lex_quoted(text),
            _ => text.push('\''),
        }
    }

    fn lex_quoted(&mut self, text: &mut String) {
        while self.offset < self.bytes.len() {
            if self.bytes[self.offset] == b'\'' {
                self.advance_char();
                if self.bytes.get(self.offset) == Some(&b'\'') {
                    self.advance_char();
                    text.push('\'');
                    continue;
                }
                return;
            }
            text.push(self.advance_char());
        }
    }

    fn lex_expr_token(&mut self, tokens: &mut Vec<Token>) -> Result<(), PatternError> {
        self.skip_whitespace();
        if self.offset >= self.bytes.len() {
            return Ok(());
        }
        let span = self.single_span();
        match self.bytes[self.offset] {
            b'}' => {
                tokens.push(Token {
                    kind: TokenKind::RBrace,
                    span,
                });
                self.advance_char();
                self.mode_stack.pop();
            }
            b'{' => {
                let Some(Mode::Expr(state)) = self.mode_stack.last() else {
                    return Err(self.error("unexpected '{'", span));
                };
                if !state.has_sub_messages() {
                    return Err(self.error("unexpected '{' in argument", span));
                }
                let plural = state.plural || state.opens_plural();
                tokens.push(Token {
                    kind: TokenKind::LBrace,
                    span,
                });
                self.advance_char();
                self.mode_stack.push(Mode::Text { plural });
            }
            b',' => {
                tokens.push(Token {
                    kind: TokenKind::Comma,
                    span,
                });
                self.advance_char();
                let lex_style = match self.mode_stack.last_mut() {
                    Some(Mode::Expr(state)) => {
                        state.commas = state.commas.saturating_add(1);
                        state.commas == 2 && !state.has_sub_messages()
                    }
                    _ => false,
                };
                if lex_style {
                    let token = self.lex_style()?;
                    tokens.push(token);
                }
            }
            _ => {
                let token = self.lex_word();
                if let (Some(Mode::Expr(state)), TokenKind::Word(word)) =
                    (self.mode_stack.last_mut(), &token.kind)
                {
                    if state.commas == 1 && state.arg_type.is_none() {
                        state.arg_type = Some(word.clone());
                    }
                }
                tokens.push(token);
            }
        }
        Ok(())
    }

    fn lex_word(&mut self) -> Token {
        let start = self.offset;
        let line = self.line;
        let column = self.column;
        while self.offset < self.bytes.len() {
            let byte = self.bytes[self.offset];
            if matches!(byte, b'{' | b'}' | b',') || self.at_whitespace() {
                break;
            }
            self.advance_char();
        }
        Token {
            kind: TokenKind::Word(self.input[start..self.offset].to_string()),
            span: Span {
                start,
                end: self.offset,
                line,
                column,
            },
        }
    }

    fn lex_style(&mut self) -> Result<Token, PatternError> {
        let start = self.offset;
        let line = self.line;
        let column = self.column;
        let mut depth = 0usize;
        while self.offset < self.bytes.len() {
            match self.bytes[self.offset] {
                b'{' => depth += 1,
                b'}' if depth == 0 => break,
                b'}' => depth -= 1,
                b'\'' => {
                    self.advance_char();
                    while self.offset < self.bytes.len() && self.bytes[self.offset] != b'\'' {
                        self.advance_char();
                    }
                    if self.offset >= self.bytes.len() {
                        break;
                    }
                }
                _ => {}
            }
            self.advance_char();
        }
        if self.offset >= self.bytes.len() {
            return Err(self.error("unclosed brace", self.here()));
        }
        Ok(Token {
            kind: TokenKind::Style(self.input[start..self.offset].trim().to_string()),
            span: Span {
                start,
                end: self.offset,
                line,
                column,
            },
        })
    }

    fn skip_whitespace(&mut self) {
        while self.offset < self.bytes.len() && self.at_whitespace() {
            self.advance_char();
        }
    }

    fn at_whitespace(&self) -> bool {
        self.input[self.offset..]
            .chars()
            .next()
            .is_some_and(char::is_whitespace)
    }

    fn advance_char(&mut self) -> char {
        let Some(ch) = self.input[self.offset..].chars().next() else {
            return '\0';
        };
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn here(&self) -> Span {
        Span {
            start: self.offset,
            end: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    fn single_span(&self) -> Span {
        Span {
            end: self.offset + 1,
            ..self.here()
        }
    }

    fn error(&self, message: &str, span: Span) -> PatternError {
        PatternError::new(message, span)
    }
}
