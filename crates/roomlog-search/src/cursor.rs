//! Opaque pagination cursors.
//!
//! A cursor is the decimal text of an event row id. Nothing beyond "a row id
//! seen on an earlier page" is implied; existence is never checked.

use std::fmt;
use std::str::FromStr;

use crate::error::{SearchError, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(i64);

impl Cursor {
    pub fn from_rowid(rowid: i64) -> Self {
        Self(rowid)
    }

    pub fn rowid(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn encode_cursor(rowid: i64) -> String {
    Cursor::from_rowid(rowid).to_string()
}

pub fn decode_cursor(token: &str) -> SearchResult<Cursor> {
    token
        .parse::<i64>()
        .map(Cursor)
        .map_err(|err| SearchError::invalid_cursor(format!("'{token}' is not a row id: {err}")))
}

/// Which side of the cursor the next page lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Before,
    After,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl FromStr for Direction {
    type Err = SearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            _ => Err(SearchError::invalid_filter(
                "Invalid pagination direction, must be 'before' or 'after'",
            )),
        }
    }
}
