//! Tokenizer for the command language.
//!
//! Whitespace between tokens is skipped. A `/` opens a text literal that runs
//! to the next unescaped `/` or to the end of input; `\/` inside a literal
//! stands for a plain `/`, and every other backslash sequence is kept as
//! written so regex escapes pass through untouched.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `0`, `$`, `.`, `#N` or a run of digits.
    Address(String),
    Comma,
    /// One of `a i c d x g v`.
    Command(char),
    /// Literal content without its delimiters.
    Text(String),
    Eof,
    Unknown(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Address(lit) => write!(f, "address {lit:?}"),
            Token::Comma => f.write_str("','"),
            Token::Command(c) => write!(f, "command '{c}'"),
            Token::Text(lit) => write!(f, "text /{lit}/"),
            Token::Eof => f.write_str("end of input"),
            Token::Unknown(c) => write!(f, "{c:?}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    src: &'a str,
    offset: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, offset: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.offset..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn scan_address(&mut self) -> String {
        let start = self.offset;
        match self.peek() {
            Some('$' | '.') => {
                self.bump();
            }
            _ => {
                if self.peek() == Some('#') {
                    self.bump();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
        self.src[start..self.offset].to_string()
    }

    /// Called with the opening `/` still unread.
    fn scan_text(&mut self) -> String {
        self.bump();
        let mut out = String::new();
        while let Some(c) = self.bump() {
            match c {
                '/' => break,
                '\\' => match self.bump() {
                    Some('/') => out.push('/'),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                },
                _ => out.push(c),
            }
        }
        out
    }

    /// Next token and the byte offset it starts at.
    pub fn scan(&mut self) -> (usize, Token) {
        self.skip_whitespace();
        let pos = self.offset;
        let tok = match self.peek() {
            None => Token::Eof,
            Some('#' | '.' | '$' | '0'..='9') => Token::Address(self.scan_address()),
            Some(',') => {
                self.bump();
                Token::Comma
            }
            Some(c @ ('a' | 'i' | 'c' | 'd' | 'x' | 'g' | 'v')) => {
                self.bump();
                Token::Command(c)
            }
            Some('/') => Token::Text(self.scan_text()),
            Some(c) => {
                self.bump();
                Token::Unknown(c)
            }
        };
        (pos, tok)
    }
}
