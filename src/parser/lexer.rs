//! Tokenizer for the clause surface syntax.

use std::fmt;

/// Error reported by the tokenizer or the parser, with a source position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { line, column, message: message.into() }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at {}:{}: {}",
            self.line + 1,
            self.column + 1,
            self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// One lexical token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Punctuation: `(` `)` `.` `,` `[` `]` `|` `:-`
    Punc(&'static str),
    /// A variable name (leading upper-case letter or underscore).
    Var(String),
    /// An identifier, quoted atom, or operator symbol.
    Id(String),
    /// A numeric literal.
    Num(f64),
    /// A double-quoted string literal, escapes already resolved.
    Str(String),
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Punc(p) => format!("`{}`", p),
            Token::Var(name) | Token::Id(name) => format!("`{}`", name),
            Token::Num(n) => format!("`{}`", n),
            Token::Str(s) => format!("\"{}\"", s),
            Token::Eof => "end of file".to_string(),
        }
    }
}

/// Streaming tokenizer with one token of lookahead.
#[derive(Debug)]
pub struct Tokeniser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    current: Token,
    token_line: usize,
    token_column: usize,
}

impl Tokeniser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut tk = Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 0,
            column: 0,
            current: Token::Eof,
            token_line: 0,
            token_column: 0,
        };
        tk.advance()?;
        Ok(tk)
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Returns the current token and reads the next one.
    pub fn bump(&mut self) -> Result<Token, ParseError> {
        let token = std::mem::replace(&mut self.current, Token::Eof);
        self.advance()?;
        Ok(token)
    }

    /// "unexpected token" / "unexpected end of file", at the current token.
    pub fn unexpected(&self) -> ParseError {
        let message = match &self.current {
            Token::Eof => "unexpected end of file".to_string(),
            other => format!("unexpected token {}", other.describe()),
        };
        ParseError::new(self.token_line, self.token_column, message)
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line, self.column, message)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn take(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.take();
            } else if c == '%' {
                while let Some(c) = self.peek() {
                    self.take();
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.skip_trivia();
        self.token_line = self.line;
        self.token_column = self.column;

        let c = match self.peek() {
            Some(c) => c,
            None => {
                self.current = Token::Eof;
                return Ok(());
            }
        };

        self.current = match c {
            '(' | ')' | '.' | ',' | '[' | ']' | '|' => {
                self.take();
                Token::Punc(match c {
                    '(' => "(",
                    ')' => ")",
                    '.' => ".",
                    ',' => ",",
                    '[' => "[",
                    ']' => "]",
                    _ => "|",
                })
            }
            ':' => {
                self.take();
                if self.peek() == Some('-') {
                    self.take();
                    Token::Punc(":-")
                } else {
                    return Err(self.error_here("expected `-` after `:`"));
                }
            }
            'A'..='Z' | '_' => Token::Var(self.take_ident()),
            'a'..='z' => Token::Id(self.take_ident()),
            '0'..='9' => self.take_number()?,
            '-' => {
                if self.peek_at(1).map_or(false, |d| d.is_ascii_digit()) {
                    self.take_number()?
                } else {
                    self.take();
                    Token::Id("-".to_string())
                }
            }
            '+' | '*' | '/' | '=' | '!' => {
                self.take();
                Token::Id(c.to_string())
            }
            '\'' => self.take_quoted_atom()?,
            '"' => self.take_string()?,
            other => {
                return Err(self.error_here(format!("unexpected character `{}`", other)));
            }
        };
        Ok(())
    }

    fn take_ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                out.push(c);
                self.take();
            } else {
                break;
            }
        }
        out
    }

    fn take_number(&mut self) -> Result<Token, ParseError> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.take();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.take();
            } else {
                break;
            }
        }
        // a dot only belongs to the number when digits follow; otherwise it
        // terminates the clause
        if self.peek() == Some('.') && self.peek_at(1).map_or(false, |d| d.is_ascii_digit()) {
            text.push('.');
            self.take();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.take();
                } else {
                    break;
                }
            }
        }
        match text.parse::<f64>() {
            Ok(n) => Ok(Token::Num(n)),
            Err(_) => Err(self.error_here(format!("invalid number `{}`", text))),
        }
    }

    fn take_quoted_atom(&mut self) -> Result<Token, ParseError> {
        self.take();
        let mut out = String::new();
        loop {
            match self.take() {
                Some('\'') => return Ok(Token::Id(out)),
                Some(c) => out.push(c),
                None => return Err(self.error_here("unterminated quoted atom")),
            }
        }
    }

    fn take_string(&mut self) -> Result<Token, ParseError> {
        self.take();
        let mut out = String::new();
        loop {
            match self.take() {
                Some('"') => return Ok(Token::Str(out)),
                Some('\\') => match self.take() {
                    Some('b') => out.push('\u{0008}'),
                    Some('r') => out.push('\r'),
                    Some('n') => out.push('\n'),
                    Some('f') => out.push('\u{000C}'),
                    Some('t') => out.push('\t'),
                    Some('v') => out.push('\u{000B}'),
                    Some('\'') => out.push('\''),
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some(other) => {
                        return Err(
                            self.error_here(format!("unknown escape sequence `\\{}`", other))
                        );
                    }
                    None => return Err(self.error_here("unterminated string")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error_here("unterminated string")),
            }
        }
    }
}
