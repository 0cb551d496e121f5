//! Encoded list decoding
//!
//! Diet and medication cells hold a bracketed list of quoted strings, e.g.
//! `['Antibiotics', "Antifungal Cream"]`. This is a strict recursive-descent
//! parser for exactly that shape; anything else is a typed error.
//!
//! Grammar:
//! ```text
//! list   := ws '[' ws ( item ( ws ',' ws item )* ( ws ',' )? )? ws ']' ws EOF
//! item   := '\'' chars '\'' | '"' chars '"'
//! escape := '\\' ( '\\' | '\'' | '"' | 'n' | 't' )
//! ```

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

/// Parse failure with the byte offset it was detected at
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at byte {position}")]
pub struct ListParseError {
    pub position: usize,
    pub kind: ListParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListParseErrorKind {
    Expected(&'static str, char),
    UnexpectedEnd,
    UnterminatedString,
    BadEscape(char),
    TrailingInput(char),
}

impl fmt::Display for ListParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected(what, found) => write!(f, "expected {}, found '{}'", what, found),
            Self::UnexpectedEnd => write!(f, "unexpected end of input"),
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::BadEscape(c) => write!(f, "unsupported escape '\\{}'", c),
            Self::TrailingInput(c) => write!(f, "trailing input starting with '{}'", c),
        }
    }
}

/// True when a cell looks like an encoded list rather than a plain item
pub fn looks_like_list(cell: &str) -> bool {
    cell.trim_start().starts_with('[')
}

/// Decode `['a', "b"]` into `["a", "b"]`
pub fn parse_list_literal(input: &str) -> Result<Vec<String>, ListParseError> {
    let mut parser = Parser {
        chars: input.char_indices().peekable(),
        len: input.len(),
    };
    let items = parser.list()?;
    parser.skip_ws();
    match parser.chars.next() {
        None => Ok(items),
        Some((pos, c)) => Err(parser.error(pos, ListParseErrorKind::TrailingInput(c))),
    }
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, position: usize, kind: ListParseErrorKind) -> ListParseError {
        ListParseError { position, kind }
    }

    fn end(&self) -> ListParseError {
        self.error(self.len, ListParseErrorKind::UnexpectedEnd)
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn list(&mut self) -> Result<Vec<String>, ListParseError> {
        self.skip_ws();
        match self.chars.next() {
            Some((_, '[')) => {}
            Some((pos, c)) => return Err(self.error(pos, ListParseErrorKind::Expected("'['", c))),
            None => return Err(self.end()),
        }

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.chars.peek().copied() {
                Some((_, ']')) => {
                    self.chars.next();
                    return Ok(items);
                }
                Some((_, '\'')) | Some((_, '"')) => items.push(self.item()?),
                Some((pos, c)) => {
                    return Err(self.error(pos, ListParseErrorKind::Expected("quoted string or ']'", c)))
                }
                None => return Err(self.end()),
            }

            self.skip_ws();
            match self.chars.next() {
                Some((_, ',')) => continue,
                Some((_, ']')) => return Ok(items),
                Some((pos, c)) => return Err(self.error(pos, ListParseErrorKind::Expected("',' or ']'", c))),
                None => return Err(self.end()),
            }
        }
    }

    fn item(&mut self) -> Result<String, ListParseError> {
        let (start, quote) = self.chars.next().ok_or_else(|| self.end())?;
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(out),
                Some((pos, '\\')) => match self.chars.next() {
                    Some((_, '\\')) => out.push('\\'),
                    Some((_, '\'')) => out.push('\''),
                    Some((_, '"')) => out.push('"'),
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, c)) => return Err(self.error(pos, ListParseErrorKind::BadEscape(c))),
                    None => return Err(self.error(start, ListParseErrorKind::UnterminatedString)),
                },
                Some((_, c)) => out.push(c),
                None => return Err(self.error(start, ListParseErrorKind::UnterminatedString)),
            }
        }
    }
}
