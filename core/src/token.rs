//! Token classes produced by the [`Scanner`](crate::Scanner).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a single scanned lexeme.
///
/// The set is closed: every character sequence the scanner sees maps onto
/// exactly one of these. Flag shapes are decided by the configured flag
/// prefix and the length of the word (see [`ScannerConfig`](crate::ScannerConfig)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    /// A character no token can start with.
    Illegal,
    /// End of input.
    Eol,
    Empty,
    /// A run of blankspace characters.
    Bs,
    /// Bare text.
    Ident,
    /// Boundary between two original argument-vector elements.
    ArgDelimiter,
    /// The assignment operator (`=` by default).
    Assign,
    /// The multi-value delimiter (`,` by default).
    MultiValueDelimiter,
    /// Doubled prefix followed by a name (`--name`).
    LongFlag,
    /// Single prefix followed by one character (`-x`).
    ShortFlag,
    /// Single prefix followed by several characters (`-xyz`).
    CompoundShortFlag,
    /// The bare prefix (`-`).
    StdinFlag,
    /// The bare doubled prefix (`--`).
    StopFlag,
}

impl Token {
    /// Returns `true` for the three shapes that name one or more flags.
    pub fn is_flag(self) -> bool {
        matches!(
            self,
            Token::LongFlag | Token::ShortFlag | Token::CompoundShortFlag
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Token::Illegal => "ILLEGAL",
            Token::Eol => "EOL",
            Token::Empty => "EMPTY",
            Token::Bs => "BS",
            Token::Ident => "IDENT",
            Token::ArgDelimiter => "ARG_DELIMITER",
            Token::Assign => "ASSIGN",
            Token::MultiValueDelimiter => "MULTI_VALUE_DELIMITER",
            Token::LongFlag => "LONG_FLAG",
            Token::ShortFlag => "SHORT_FLAG",
            Token::CompoundShortFlag => "COMPOUND_SHORT_FLAG",
            Token::StdinFlag => "STDIN_FLAG",
            Token::StopFlag => "STOP_FLAG",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
