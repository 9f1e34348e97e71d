//! Recursive-descent parser: `[address][',' address] command*`.
//!
//! Address side defaults follow the comma rules: a leading comma stands for
//! `0`, a trailing comma (followed by a command or end of input) for `$`.
//! `x`, `g` and `v` take the command that follows them as their body, so
//! `x/re/g/re2/d` nests three deep, while any other command ends the chain
//! and the next one starts a new list entry.
//!
//! Regex arguments are compiled here so that a bad pattern fails the whole
//! script before any edit is made.

use crate::error::CommandError;
use crate::scanner::{Scanner, Token};
use regex::bytes::{Regex, RegexBuilder};
use std::fmt;
use tracing::debug;

/// A compiled pattern plus the source it came from.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, CommandError> {
        let regex = RegexBuilder::new(source)
            .multi_line(true)
            .build()
            .map_err(|e| CommandError::Regex {
                pattern: source.to_string(),
                source: e,
            })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressKind {
    /// `0`
    Start,
    /// `$`
    End,
    /// `.`, the session's current dot.
    Dot,
    /// `#N`
    Byte(usize),
    /// One-based line number.
    Line(usize),
    /// `/re/`, next match after the current dot.
    Pattern(Pattern),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub kind: AddressKind,
    /// Right-hand side of `addr,addr`.
    pub through: Option<Box<Address>>,
}

impl Address {
    pub fn new(kind: AddressKind) -> Self {
        Self {
            kind,
            through: None,
        }
    }

    pub fn through(kind: AddressKind, right: AddressKind) -> Self {
        Self {
            kind,
            through: Some(Box::new(Address::new(right))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Delete,
    Append(String),
    Insert(String),
    Change(String),
    /// `x/re/ cmd`: run `body` on every match inside the range.
    Extract {
        pattern: Pattern,
        body: Option<Box<Command>>,
    },
    /// `g/re/ cmd`: run `body` once if the range matches.
    Guard {
        pattern: Pattern,
        body: Option<Box<Command>>,
    },
    /// `v/re/ cmd`: run `body` once if the range does not match.
    Exclude {
        pattern: Pattern,
        body: Option<Box<Command>>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub address: Option<Address>,
    pub commands: Vec<Command>,
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    pos: usize,
    tok: Token,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let mut scanner = Scanner::new(src);
        let (pos, tok) = scanner.scan();
        Self { scanner, pos, tok }
    }

    fn next(&mut self) {
        (self.pos, self.tok) = self.scanner.scan();
    }

    fn error(&self, message: impl Into<String>) -> CommandError {
        CommandError::syntax(self.pos, &self.tok, message)
    }

    fn parse_script(&mut self) -> Result<Script, CommandError> {
        let address = match self.tok {
            Token::Address(_) | Token::Text(_) | Token::Comma => Some(self.parse_address()?),
            _ => None,
        };
        let mut commands = Vec::new();
        while matches!(self.tok, Token::Command(_)) {
            commands.push(self.parse_command()?);
        }
        if self.tok != Token::Eof {
            return Err(self.error("expecting command"));
        }
        Ok(Script { address, commands })
    }

    fn parse_address(&mut self) -> Result<Address, CommandError> {
        let kind = if self.tok == Token::Comma {
            AddressKind::Start
        } else {
            self.parse_side()?
        };
        let mut addr = Address::new(kind);
        if self.tok == Token::Comma {
            self.next();
            let right = match self.tok {
                Token::Command(_) | Token::Eof => AddressKind::End,
                Token::Address(_) | Token::Text(_) => self.parse_side()?,
                _ => return Err(self.error("wrong address after ','")),
            };
            addr.through = Some(Box::new(Address::new(right)));
        }
        Ok(addr)
    }

    fn parse_side(&mut self) -> Result<AddressKind, CommandError> {
        let kind = match &self.tok {
            Token::Address(lit) => match lit.as_str() {
                "$" => AddressKind::End,
                "." => AddressKind::Dot,
                _ => {
                    if let Some(digits) = lit.strip_prefix('#') {
                        AddressKind::Byte(self.number(digits, "byte offset after '#'")?)
                    } else {
                        match self.number(lit, "line number")? {
                            0 => AddressKind::Start,
                            n => AddressKind::Line(n),
                        }
                    }
                }
            },
            Token::Text(lit) => AddressKind::Pattern(Pattern::new(lit)?),
            _ => return Err(self.error("expecting address")),
        };
        self.next();
        Ok(kind)
    }

    fn number(&self, digits: &str, what: &str) -> Result<usize, CommandError> {
        if digits.is_empty() {
            return Err(self.error(format!("missing {what}")));
        }
        digits
            .parse()
            .map_err(|_| self.error(format!("{what} out of range")))
    }

    fn parse_command(&mut self) -> Result<Command, CommandError> {
        let Token::Command(name) = self.tok else {
            return Err(self.error("expecting command"));
        };
        self.next();
        if name == 'd' {
            return Ok(Command::Delete);
        }
        let Token::Text(arg) = &self.tok else {
            return Err(self.error(format!("command '{name}' needs a /text/ argument")));
        };
        let arg = arg.clone();
        self.next();
        let cmd = match name {
            'a' => Command::Append(arg),
            'i' => Command::Insert(arg),
            'c' => Command::Change(arg),
            _ => {
                let pattern = Pattern::new(&arg)?;
                let body = if matches!(self.tok, Token::Command(_)) {
                    Some(Box::new(self.parse_command()?))
                } else {
                    None
                };
                match name {
                    'x' => Command::Extract { pattern, body },
                    'g' => Command::Guard { pattern, body },
                    _ => Command::Exclude { pattern, body },
                }
            }
        };
        Ok(cmd)
    }
}

/// Parse a complete script. An empty (or all-whitespace) script is valid and
/// does nothing.
pub fn parse(src: &str) -> Result<Script, CommandError> {
    let script = Parser::new(src).parse_script()?;
    debug!(
        target: "command.parse",
        has_address = script.address.is_some(),
        commands = script.commands.len(),
        "parsed"
    );
    Ok(script)
}
