use std::fmt::Display;

use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

/// 1-based line holding the key that starts at byte `offset`.
fn line_of(src: &str, offset: usize) -> usize {
    src[..offset].matches('\n').count() + 1
}

#[derive(Error, Debug, Diagnostic)]
#[error("Unknown symbol '{symbol}'")]
#[diagnostic(help("run `calc symbols` to list the keypad"))]
pub struct UnknownSymbolError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this key")]
    bad_bit: SourceSpan,

    pub symbol: String,
}

impl UnknownSymbolError {
    pub fn build(keys: &Keys<'_>, key: &Key<'_>) -> Self {
        UnknownSymbolError {
            src: keys.source(),
            bad_bit: SourceSpan::from(key.span()),
            symbol: key.literal.to_string(),
        }
    }

    pub fn line(&self) -> usize {
        line_of(self.src.inner(), self.bad_bit.offset())
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("'{literal}' is not a number")]
#[diagnostic(help("operands are decimal numbers such as `42`, `-3` or `0.25`"))]
pub struct NumberParseError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this numeric literal")]
    bad_bit: SourceSpan,

    pub literal: String,
}

impl NumberParseError {
    pub fn line(&self) -> usize {
        line_of(self.src.inner(), self.bad_bit.offset())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key<'de> {
    pub kind: KeyKind,
    pub literal: &'de str,
    /// byte offset of the first byte of `literal`
    pub offset: usize,
}

impl Key<'_> {
    pub fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.literal.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyKind {
    Operand(f64),
    Symbol,
}

impl Display for Key<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            KeyKind::Operand(n) => write!(f, "OPERAND {lit} {n}"),
            KeyKind::Symbol => write!(f, "SYMBOL {lit}"),
        }
    }
}

/// Splits a line of keypad input into operands and symbols.
///
/// Keys are separated by whitespace. A key that starts with a digit or `.`,
/// or a `-` directly followed by one, is an operand; anything else is a
/// symbol, looked up later by the brain.
pub struct Keys<'de> {
    filename: Option<&'de str>,
    whole: &'de str,
    rest: &'de str,
    byte: usize,
}

impl<'de> Keys<'de> {
    pub fn new(filename: Option<&'de str>, input: &'de str) -> Self {
        Keys {
            filename,
            whole: input,
            rest: input,
            byte: 0,
        }
    }

    pub fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.filename.unwrap_or("<input>"), self.whole.to_string())
    }
}

impl<'de> Iterator for Keys<'de> {
    type Item = Result<Key<'de>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let trimmed = self.rest.trim_start();
        self.byte += self.rest.len() - trimmed.len();
        self.rest = trimmed;

        let mut chars = self.rest.chars();
        let c = chars.next()?;
        let end = self.rest.find(char::is_whitespace).unwrap_or(self.rest.len());
        let literal = &self.rest[..end];
        let offset = self.byte;
        self.rest = &self.rest[end..];
        self.byte += end;

        let numeric = match c {
            '0'..='9' | '.' => true,
            '-' => matches!(chars.next(), Some('0'..='9' | '.')),
            _ => false,
        };
        if !numeric {
            return Some(Ok(Key {
                kind: KeyKind::Symbol,
                literal,
                offset,
            }));
        }

        match literal.parse() {
            Ok(n) => Some(Ok(Key {
                kind: KeyKind::Operand(n),
                literal,
                offset,
            })),
            Err(_) => Some(Err(NumberParseError {
                src: self.source(),
                bad_bit: SourceSpan::from(offset..self.byte),
                literal: literal.to_string(),
            }
            .into())),
        }
    }
}
