//! Store seams and the event fetcher.
//!
//! Both stores are synchronous (SQLite); the engine drives them from
//! `spawn_blocking` so the async runtime never waits on disk.

use std::sync::Arc;

use roomlog_db::models::{EventRow, RoomRow};
use roomlog_db::{CancelFlag, Database};
use tracing::error;

use crate::error::{SearchError, SearchResult};
use crate::predicate::CompiledQuery;

/// Read access to the event log.
pub trait EventStore: Send + Sync + 'static {
    /// Runs one read: conditions ANDed, newest first, at most
    /// `query.fetch_limit()` rows. Must abort once `cancel` is set.
    fn query_events(
        &self,
        query: &CompiledQuery,
        cancel: &CancelFlag,
    ) -> anyhow::Result<Vec<EventRow>>;
}

/// Room metadata lookups.
pub trait RoomTable: Send + Sync + 'static {
    fn get_room(&self, room_id: &str) -> anyhow::Result<Option<RoomRow>>;
}

impl EventStore for Database {
    fn query_events(
        &self,
        query: &CompiledQuery,
        cancel: &CancelFlag,
    ) -> anyhow::Result<Vec<EventRow>> {
        Database::query_events(
            self,
            &query.predicates.conditions(),
            query.sql_params(),
            query.fetch_limit(),
            cancel,
        )
    }
}

impl RoomTable for Database {
    fn get_room(&self, room_id: &str) -> anyhow::Result<Option<RoomRow>> {
        Database::get_room(self, room_id)
    }
}

/// Sets the flag when dropped before [`CancelOnDrop::disarm`], so a request
/// future abandoned mid-query stops the blocking read as well.
struct CancelOnDrop {
    flag: CancelFlag,
    armed: bool,
}

impl CancelOnDrop {
    fn new(flag: CancelFlag) -> Self {
        Self { flag, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.cancel();
        }
    }
}

/// Executes the compiled query. The only store read on the hot path; no retry.
pub async fn fetch_events(
    store: Arc<dyn EventStore>,
    query: CompiledQuery,
) -> SearchResult<Vec<EventRow>> {
    let cancel = CancelFlag::new();
    let guard = CancelOnDrop::new(cancel.clone());

    let rows = tokio::task::spawn_blocking(move || store.query_events(&query, &cancel))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            SearchError::StoreQuery(format!("query task failed: {e}"))
        })?
        .map_err(|e| {
            error!(error = %format!("{e:#}"), "Failed to query timeline");
            SearchError::store_query(&e)
        })?;

    guard.disarm();
    Ok(rows)
}
