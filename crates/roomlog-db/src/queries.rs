use crate::models::{EventRow, LocalContent, RoomRow};
use crate::{CancelFlag, Database, SqlValue};
use anyhow::{Result, anyhow};
use rusqlite::types::{FromSqlError, ValueRef};
use rusqlite::{Connection, Row};
use tracing::warn;

/// SQLite VM instructions between two cancellation checks.
const PROGRESS_CHECK_OPS: i32 = 1_000;

const EVENT_COLUMNS: &str = "event.rowid, event.room_id, event.event_id, event.sender, event.type,
       event.timestamp, event.content, event.decrypted, event.decrypted_type, event.unsigned,
       event.local_content, event.redacted_by, event.relates_to, event.relation_type";

impl Database {
    // -- Events --

    /// Single read over the event log.
    ///
    /// `conditions` are ANDed and reference `params` positionally as `?1..?N`;
    /// the row limit is bound as `?N+1`. Rows come back most recent first,
    /// ties broken by row id.
    pub fn query_events(
        &self,
        conditions: &[String],
        params: Vec<SqlValue>,
        limit: i64,
        cancel: &CancelFlag,
    ) -> Result<Vec<EventRow>> {
        if cancel.is_cancelled() {
            return Err(anyhow!("Event query cancelled before start"));
        }

        self.with_conn(|conn| {
            let flag = cancel.clone();
            conn.progress_handler(PROGRESS_CHECK_OPS, Some(move || flag.is_cancelled()));
            let result = query_events_on(conn, conditions, params, limit);
            conn.progress_handler(0, None::<fn() -> bool>);

            result.map_err(|e| {
                if cancel.is_cancelled() {
                    anyhow!("Event query interrupted: {}", e)
                } else {
                    e
                }
            })
        })
    }

    // -- Rooms --

    pub fn get_room(&self, room_id: &str) -> Result<Option<RoomRow>> {
        self.with_conn(|conn| query_room(conn, room_id))
    }
}

fn query_events_on(
    conn: &Connection,
    conditions: &[String],
    mut params: Vec<SqlValue>,
    limit: i64,
) -> Result<Vec<EventRow>> {
    let where_clause = if conditions.is_empty() {
        "1 = 1".to_string()
    } else {
        conditions.join(" AND ")
    };
    let sql = format!(
        "SELECT {EVENT_COLUMNS}
         FROM event
         WHERE {where_clause}
         ORDER BY event.timestamp DESC, event.rowid DESC
         LIMIT ?{}",
        params.len() + 1
    );
    params.push(SqlValue::Integer(limit));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params), map_event_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_event_row(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    let rowid: i64 = row.get(0)?;
    let local_content = row
        .get::<_, Option<String>>(10)?
        .and_then(|raw| parse_local_content(rowid, &raw));

    Ok(EventRow {
        rowid,
        room_id: row.get(1)?,
        event_id: row.get(2)?,
        sender: row.get(3)?,
        event_type: row.get(4)?,
        timestamp: row.get(5)?,
        content: bytes_column(row, 6)?.unwrap_or_default(),
        decrypted: bytes_column(row, 7)?,
        decrypted_type: row.get(8)?,
        unsigned: bytes_column(row, 9)?.unwrap_or_default(),
        local_content,
        redacted_by: row.get(11)?,
        relates_to: row.get(12)?,
        relation_type: row.get(13)?,
    })
}

/// Payload columns may hold TEXT or BLOB depending on who wrote them.
fn bytes_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Vec<u8>>> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Ok(Some(bytes.to_vec())),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            other.data_type(),
            Box::new(FromSqlError::InvalidType),
        )),
    }
}

fn parse_local_content(rowid: i64, raw: &str) -> Option<LocalContent> {
    match serde_json::from_str(raw) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("Corrupt local_content on event row {}: {}", rowid, e);
            None
        }
    }
}

fn query_room(conn: &Connection, room_id: &str) -> Result<Option<RoomRow>> {
    let mut stmt = conn.prepare("SELECT room_id, name FROM room WHERE room_id = ?1")?;

    let row = stmt
        .query_row([room_id], |row| {
            Ok(RoomRow {
                room_id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
