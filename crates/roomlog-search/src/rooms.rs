//! Denormalizes room metadata onto results.
//!
//! Each distinct room on a page is looked up once per request. A failed or
//! empty lookup degrades the room name to its id and never drops a message.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use roomlog_db::models::EventRow;
use roomlog_types::RoomInfo;
use tracing::{debug, error, warn};

use crate::error::RoomLookupError;
use crate::links::LinkBuilder;
use crate::store::RoomTable;

/// Request-scoped cache of room display names.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    names: HashMap<String, String>,
    failures: Vec<RoomLookupError>,
    lookups: usize,
}

impl RoomDirectory {
    pub fn room_info(&self, room_id: &str, links: &LinkBuilder) -> RoomInfo {
        RoomInfo {
            id: room_id.to_string(),
            name: self
                .names
                .get(room_id)
                .cloned()
                .unwrap_or_else(|| room_id.to_string()),
            url: links.room(room_id),
        }
    }

    pub fn failures(&self) -> &[RoomLookupError] {
        &self.failures
    }

    /// Number of room lookups issued.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    fn record_failure(&mut self, room_id: &str, message: String) {
        warn!(room_id = %room_id, error = %message, "Failed to get room info");
        self.failures.push(RoomLookupError {
            room_id: room_id.to_string(),
            message,
        });
    }
}

/// Room ids in order of first appearance, without duplicates.
pub fn distinct_rooms(rows: &[EventRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| seen.insert(row.room_id.as_str()))
        .map(|row| row.room_id.clone())
        .collect()
}

pub fn lookup_rooms(table: &dyn RoomTable, room_ids: &[String]) -> RoomDirectory {
    let mut directory = RoomDirectory::default();
    for room_id in room_ids {
        directory.lookups += 1;
        match table.get_room(room_id) {
            Ok(Some(room)) => {
                if let Some(name) = room.name {
                    directory.names.insert(room_id.clone(), name);
                }
            }
            Ok(None) => debug!(room_id = %room_id, "Room not found, using id as name"),
            Err(e) => directory.record_failure(room_id, format!("{e:#}")),
        }
    }
    directory
}

/// Looks up every room referenced by `rows`. Runs after the event fetch.
pub async fn enrich(table: Arc<dyn RoomTable>, rows: &[EventRow]) -> RoomDirectory {
    let room_ids = distinct_rooms(rows);
    if room_ids.is_empty() {
        return RoomDirectory::default();
    }

    let ids = room_ids.clone();
    match tokio::task::spawn_blocking(move || lookup_rooms(table.as_ref(), &ids)).await {
        Ok(directory) => directory,
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            let mut directory = RoomDirectory::default();
            for room_id in &room_ids {
                directory.record_failure(room_id, format!("lookup task failed: {e}"));
            }
            directory
        }
    }
}
