//! Error types for parsing and unparsing.
//!
//! Two channels exist. [`Error`] is fatal: the operation returns it instead
//! of a result. [`ParserErrorList`] collects recoverable problems found
//! while parsing; it is returned next to a best-effort tree.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::Position;

/// Fatal errors that stop a parse or an unparse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No parser configuration was supplied; parsing never starts.
    #[error("no parser config supplied")]
    MissingConfig,

    /// The scanner met a character no token can start with.
    #[error("illegal character {literal:?} at position {pos}")]
    Illegal { pos: Position, literal: String },

    /// A node kind appeared where the serializer cannot place it.
    #[error("unexpected {kind} node inside {context}")]
    UnexpectedNode {
        kind: &'static str,
        context: &'static str,
    },

    /// A compound short flag member whose name is not a single character.
    #[error("compound short flag member {0:?} is not a single-character flag")]
    InvalidCompoundMember(String),
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A recoverable problem recorded while parsing.
///
/// Ordering is by position, then message.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ParserError {
    pub pos: Position,
    pub msg: String,
}

impl ParserError {
    pub fn new(pos: Position, msg: impl Into<String>) -> Self {
        Self {
            pos,
            msg: msg.into(),
        }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pos.is_valid() {
            write!(f, "{}:{}", self.pos, self.msg)
        } else {
            f.write_str(&self.msg)
        }
    }
}

impl std::error::Error for ParserError {}

/// Accumulated [`ParserError`]s from one parse.
///
/// Two lists compare equal when their combined messages are equal.
///
/// # Examples
///
/// ```
/// use argtree_core::{ParserErrorList, Position};
///
/// let mut errors = ParserErrorList::new();
/// assert_eq!(errors.to_string(), "no errors");
///
/// errors.add(Position::new(9), "unknown flag \"x\"");
/// errors.add(Position::new(3), "invalid bare assignment");
/// errors.sort();
///
/// assert_eq!(
///     errors.to_string(),
///     "3:invalid bare assignment (and 1 more errors)"
/// );
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ParserErrorList(Vec<ParserError>);

impl ParserErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pos: Position, msg: impl Into<String>) {
        self.0.push(ParserError::new(pos, msg));
    }

    /// Sorts by position, then message.
    pub fn sort(&mut self) {
        self.0.sort();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParserError> {
        self.0.iter()
    }

    /// `Ok(())` for an empty list, the list itself otherwise.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ParserErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("no errors"),
            [only] => write!(f, "{only}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more errors)", rest.len()),
        }
    }
}

impl std::error::Error for ParserErrorList {}

impl PartialEq for ParserErrorList {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for ParserErrorList {}

impl From<Vec<ParserError>> for ParserErrorList {
    fn from(errors: Vec<ParserError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ParserErrorList {
    type Item = ParserError;
    type IntoIter = std::vec::IntoIter<ParserError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParserErrorList {
    type Item = &'a ParserError;
    type IntoIter = std::slice::Iter<'a, ParserError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
