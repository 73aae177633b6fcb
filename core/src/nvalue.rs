//! Value arity for commands and flags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of positional values a command or flag consumes.
///
/// Any positive integer is a literal count. Three values are reserved:
/// [`NValue::ONE_OR_MORE`] (`-2`), [`NValue::ZERO_OR_MORE`] (`-1`) and
/// [`NValue::ZERO`] (`0`, the default).
///
/// [`contains`](NValue::contains) is the only gate the parser uses to decide
/// whether another value token is consumed.
///
/// # Examples
///
/// ```
/// use argtree_core::NValue;
///
/// let one = NValue::from(1);
/// assert!(one.required());
/// assert!(one.contains(0));
/// assert!(!one.contains(1));
///
/// assert!(NValue::ZERO_OR_MORE.contains(1_000));
/// assert!(!NValue::ZERO_OR_MORE.required());
/// assert_eq!("+".parse::<NValue>().unwrap(), NValue::ONE_OR_MORE);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "NValueRepr", into = "NValueRepr")]
pub struct NValue(pub i64);

impl NValue {
    pub const ONE_OR_MORE: Self = Self(-2);
    pub const ZERO_OR_MORE: Self = Self(-1);
    pub const ZERO: Self = Self(0);

    /// Returns `true` when at least one value must be supplied: always for
    /// [`ONE_OR_MORE`](Self::ONE_OR_MORE), never for
    /// [`ZERO_OR_MORE`](Self::ZERO_OR_MORE), otherwise for counts of one or
    /// more.
    pub fn required(self) -> bool {
        self == Self::ONE_OR_MORE || self.0 >= 1
    }

    /// Returns whether the zero-based value index `i` is within range.
    ///
    /// Negative indexes are never contained; the two unbounded sentinels
    /// contain every other index.
    pub fn contains(self, i: isize) -> bool {
        if i < 0 {
            return false;
        }

        if self.is_unbounded() {
            return true;
        }

        self.0 > i as i64
    }

    /// Returns `true` for [`ONE_OR_MORE`](Self::ONE_OR_MORE) and
    /// [`ZERO_OR_MORE`](Self::ZERO_OR_MORE).
    pub fn is_unbounded(self) -> bool {
        self == Self::ONE_OR_MORE || self == Self::ZERO_OR_MORE
    }
}

impl From<i64> for NValue {
    fn from(n: i64) -> Self {
        Self(n)
    }
}

impl fmt::Display for NValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ONE_OR_MORE => f.write_str("one-or-more"),
            Self::ZERO_OR_MORE => f.write_str("zero-or-more"),
            Self::ZERO => f.write_str("zero"),
            Self(n) => write!(f, "{n}"),
        }
    }
}

/// Error returned when an arity name or number cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value arity: {0:?}")]
pub struct ParseNValueError(String);

impl FromStr for NValue {
    type Err = ParseNValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "one-or-more" | "+" => Ok(Self::ONE_OR_MORE),
            "zero-or-more" | "*" => Ok(Self::ZERO_OR_MORE),
            "zero" => Ok(Self::ZERO),
            other => other
                .parse::<i64>()
                .map(Self)
                .map_err(|_| ParseNValueError(s.to_string())),
        }
    }
}

/// Document form: either a plain integer or a sentinel name.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum NValueRepr {
    Count(i64),
    Named(String),
}

impl TryFrom<NValueRepr> for NValue {
    type Error = ParseNValueError;

    fn try_from(repr: NValueRepr) -> Result<Self, Self::Error> {
        match repr {
            NValueRepr::Count(n) => Ok(Self(n)),
            NValueRepr::Named(name) => name.parse(),
        }
    }
}

impl From<NValue> for NValueRepr {
    fn from(nv: NValue) -> Self {
        if nv.is_unbounded() {
            NValueRepr::Named(nv.to_string())
        } else {
            NValueRepr::Count(nv.0)
        }
    }
}
