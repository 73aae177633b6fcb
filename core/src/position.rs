use std::fmt;

use serde::{Deserialize, Serialize};

/// Scan offset of a token, counted in characters from the start of the
/// flattened argument stream.
///
/// Columns are 1-based; the zero value marks an unknown position. Positions
/// are only used to order and report errors.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub column: usize,
}

impl Position {
    pub const fn new(column: usize) -> Self {
        Self { column }
    }

    pub const fn is_valid(&self) -> bool {
        self.column > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.column)
        } else {
            f.write_str("-")
        }
    }
}
