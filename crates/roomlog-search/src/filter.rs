//! Turns the raw query string into a validated [`SearchFilter`].

use roomlog_types::SearchMessagesParams;

use crate::cursor::{Cursor, Direction, decode_cursor};
use crate::error::{SearchError, SearchResult};

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 1000;

const SENDER_SIGIL: char = '@';
const DOMAIN_SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub cursor: Cursor,
    pub direction: Direction,
}

/// Fully validated search criteria. All present fields combine with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub room_id: Option<String>,
    pub sender: Option<String>,
    /// Strict upper timestamp bound, epoch milliseconds.
    pub before: Option<i64>,
    /// Strict lower timestamp bound, epoch milliseconds.
    pub after: Option<i64>,
    /// Limit as requested; see [`SearchFilter::effective_limit`].
    pub limit: u64,
    pub pagination: Option<Pagination>,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            room_id: None,
            sender: None,
            before: None,
            after: None,
            limit: DEFAULT_LIMIT,
            pagination: None,
        }
    }
}

impl SearchFilter {
    pub fn from_params(params: &SearchMessagesParams) -> SearchResult<Self> {
        let mut filter = Self {
            room_id: present(&params.room_id).map(str::to_string),
            ..Self::default()
        };

        if let Some(sender) = present(&params.sender) {
            filter.sender = Some(normalize_sender(sender)?);
        }

        if let Some(limit) = present(&params.limit) {
            filter.limit = parse_limit(limit)?;
        }

        if let Some(before) = present(&params.before) {
            filter.before = Some(parse_timestamp("before", before)?);
        }

        if let Some(after) = present(&params.after) {
            filter.after = Some(parse_timestamp("after", after)?);
        }

        filter.pagination = match (present(&params.cursor), present(&params.direction)) {
            (Some(cursor), Some(direction)) => {
                // Direction first: a bad direction is a filter error even when
                // the cursor is malformed too.
                let direction = direction.parse::<Direction>()?;
                let cursor = decode_cursor(cursor)?;
                Some(Pagination { cursor, direction })
            }
            (Some(_), None) => {
                return Err(SearchError::invalid_filter(
                    "Invalid pagination direction, must be 'before' or 'after'",
                ));
            }
            (None, Some(_)) => {
                return Err(SearchError::invalid_filter(
                    "Pagination direction requires a cursor",
                ));
            }
            (None, None) => None,
        };

        Ok(filter)
    }

    /// Row count actually served: the requested limit clamped to `[1, MAX_LIMIT]`.
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT) as usize
    }
}

/// Empty query values count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// `alice:example.org` becomes `@alice:example.org`; an id without a
/// server part is rejected.
pub fn normalize_sender(raw: &str) -> SearchResult<String> {
    let sender = if raw.starts_with(SENDER_SIGIL) {
        raw.to_string()
    } else {
        format!("{SENDER_SIGIL}{raw}")
    };

    if !sender.contains(DOMAIN_SEPARATOR) {
        return Err(SearchError::invalid_filter("Invalid sender user ID format"));
    }
    Ok(sender)
}

fn parse_limit(raw: &str) -> SearchResult<u64> {
    match raw.parse::<i64>() {
        Ok(limit) if limit > 0 => Ok(limit as u64),
        _ => Err(SearchError::invalid_filter("Invalid limit parameter")),
    }
}

fn parse_timestamp(name: &str, raw: &str) -> SearchResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| SearchError::invalid_filter(format!("Invalid {name} timestamp")))
}
