//! Compiles a [`SearchFilter`] into the conditions of a single keyset scan.
//!
//! Each condition is built together with the value it binds, so the Nth
//! `?N` placeholder always refers to the Nth bound parameter. The two can not
//! drift apart because there is no way to push one without the other.

use roomlog_db::SqlValue;

use crate::cursor::Direction;
use crate::filter::SearchFilter;

pub const MESSAGE_EVENT_TYPE: &str = "m.room.message";

const MESSAGE_TYPE_CONDITION: &str =
    "(event.type = 'm.room.message' OR event.decrypted_type = 'm.room.message')";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Text(String),
    Integer(i64),
}

impl From<&Param> for SqlValue {
    fn from(param: &Param) -> Self {
        match param {
            Param::Text(text) => SqlValue::Text(text.clone()),
            Param::Integer(value) => SqlValue::Integer(*value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub sql: String,
    pub param: Option<Param>,
}

/// Ordered condition list. Every method returns a new list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateList {
    predicates: Vec<Predicate>,
}

impl PredicateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a condition that binds nothing.
    pub fn constant(mut self, sql: &str) -> Self {
        self.predicates.push(Predicate {
            sql: sql.to_string(),
            param: None,
        });
        self
    }

    /// Appends `<lhs> ?N` where N is the position `param` will be bound at.
    pub fn bind(mut self, lhs: &str, param: Param) -> Self {
        let placeholder = self.param_count() + 1;
        self.predicates.push(Predicate {
            sql: format!("{lhs} ?{placeholder}"),
            param: Some(param),
        });
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn param_count(&self) -> usize {
        self.predicates.iter().filter(|p| p.param.is_some()).count()
    }

    pub fn conditions(&self) -> Vec<String> {
        self.predicates.iter().map(|p| p.sql.clone()).collect()
    }

    pub fn params(&self) -> Vec<&Param> {
        self.predicates.iter().filter_map(|p| p.param.as_ref()).collect()
    }
}

/// Everything the event fetcher needs for one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub predicates: PredicateList,
    /// Rows the page will emit.
    pub limit: usize,
}

impl CompiledQuery {
    /// One extra row signals that more results exist.
    pub fn fetch_limit(&self) -> i64 {
        self.limit as i64 + 1
    }

    pub fn sql_params(&self) -> Vec<SqlValue> {
        self.predicates.params().into_iter().map(SqlValue::from).collect()
    }
}

/// Conditions are appended in a fixed order: message type, room, sender,
/// lower timestamp bound, upper timestamp bound, cursor.
pub fn compile(filter: &SearchFilter) -> CompiledQuery {
    let mut predicates = PredicateList::new().constant(MESSAGE_TYPE_CONDITION);

    if let Some(room_id) = &filter.room_id {
        predicates = predicates.bind("event.room_id =", Param::Text(room_id.clone()));
    }
    if let Some(sender) = &filter.sender {
        predicates = predicates.bind("event.sender =", Param::Text(sender.clone()));
    }
    if let Some(after) = filter.after {
        predicates = predicates.bind("event.timestamp >", Param::Integer(after));
    }
    if let Some(before) = filter.before {
        predicates = predicates.bind("event.timestamp <", Param::Integer(before));
    }
    if let Some(pagination) = &filter.pagination {
        let lhs = match pagination.direction {
            Direction::Before => "event.rowid <",
            Direction::After => "event.rowid >",
        };
        predicates = predicates.bind(lhs, Param::Integer(pagination.cursor.rowid()));
    }

    CompiledQuery {
        predicates,
        limit: filter.effective_limit(),
    }
}
