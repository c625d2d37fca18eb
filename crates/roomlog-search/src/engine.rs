use std::sync::Arc;
use std::time::Duration;

use roomlog_db::Database;
use roomlog_types::{MessagePage, SearchMessagesParams};
use tracing::{debug, error};

use crate::error::{SearchError, SearchResult};
use crate::filter::SearchFilter;
use crate::links::LinkBuilder;
use crate::page::PageWindow;
use crate::predicate::compile;
use crate::rooms::enrich;
use crate::store::{EventStore, RoomTable, fetch_events};

/// Search entry point. Holds no per-request state and is cheap to clone.
#[derive(Clone)]
pub struct SearchEngine {
    events: Arc<dyn EventStore>,
    rooms: Arc<dyn RoomTable>,
    links: LinkBuilder,
    deadline: Option<Duration>,
}

impl SearchEngine {
    pub fn new(events: Arc<dyn EventStore>, rooms: Arc<dyn RoomTable>, links: LinkBuilder) -> Self {
        Self {
            events,
            rooms,
            links,
            deadline: None,
        }
    }

    pub fn from_database(db: Arc<Database>, links: LinkBuilder) -> Self {
        Self::new(db.clone(), db, links)
    }

    /// Abandons the request, store work included, once `deadline` elapses.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub async fn search(&self, params: &SearchMessagesParams) -> SearchResult<MessagePage> {
        let filter = SearchFilter::from_params(params).inspect_err(|e| debug!("Rejected search: {}", e))?;
        self.search_filter(&filter).await
    }

    pub async fn search_filter(&self, filter: &SearchFilter) -> SearchResult<MessagePage> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(filter))
                .await
                .map_err(|_| {
                    error!("Search exceeded deadline of {:?}", deadline);
                    SearchError::StoreQuery(format!("deadline of {deadline:?} exceeded"))
                })?,
            None => self.run(filter).await,
        }
    }

    async fn run(&self, filter: &SearchFilter) -> SearchResult<MessagePage> {
        let query = compile(filter);
        let limit = query.limit;

        let rows = fetch_events(self.events.clone(), query).await?;
        let window = PageWindow::from_rows(rows, limit);

        let rooms = enrich(self.rooms.clone(), &window.rows).await;
        if !rooms.failures().is_empty() {
            debug!(
                failed = rooms.failures().len(),
                "Some rooms fell back to their id as name"
            );
        }

        let page = window.into_page(&rooms, &self.links);
        debug!(
            items = page.items.len(),
            has_more = page.has_more,
            direction = filter.pagination.map_or("none", |p| p.direction.as_str()),
            room_lookups = rooms.lookups(),
            "Search page assembled"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::CompiledQuery;
    use roomlog_db::CancelFlag;
    use roomlog_db::models::{EventRow, RoomRow};
    use std::sync::Mutex;
    use std::sync::mpsc;

    /// Returns canned rows, truncated to the requested fetch size.
    struct CannedEvents {
        rows: Vec<EventRow>,
        seen: Mutex<Vec<CompiledQuery>>,
    }

    impl EventStore for CannedEvents {
        fn query_events(&self, query: &CompiledQuery, _: &CancelFlag) -> anyhow::Result<Vec<EventRow>> {
            self.seen.lock().unwrap().push(query.clone());
            Ok(self.rows.iter().take(query.fetch_limit() as usize).cloned().collect())
        }
    }

    struct FlakyRooms;

    impl RoomTable for FlakyRooms {
        fn get_room(&self, room_id: &str) -> anyhow::Result<Option<RoomRow>> {
            if room_id == "!down:x" {
                return Err(anyhow::anyhow!("lookup timed out"));
            }
            Ok(Some(RoomRow {
                room_id: room_id.into(),
                name: Some(format!("Room {room_id}")),
            }))
        }
    }

    fn row(rowid: i64, room_id: &str) -> EventRow {
        EventRow {
            rowid,
            room_id: room_id.into(),
            event_id: format!("$e{rowid}"),
            sender: "@a:x".into(),
            event_type: "m.room.message".into(),
            timestamp: rowid * 1000,
            content: br#"{"body":"hello"}"#.to_vec(),
            ..Default::default()
        }
    }

    fn engine(rows: Vec<EventRow>) -> (Arc<CannedEvents>, SearchEngine) {
        let events = Arc::new(CannedEvents {
            rows,
            seen: Mutex::new(Vec::new()),
        });
        let engine = SearchEngine::new(events.clone(), Arc::new(FlakyRooms), LinkBuilder::default());
        (events, engine)
    }

    #[tokio::test]
    async fn invalid_filter_never_reaches_the_store() {
        let (events, engine) = engine(vec![row(1, "!a:x")]);
        let params = SearchMessagesParams {
            limit: Some("0".into()),
            ..Default::default()
        };

        let result = engine.search(&params).await;
        assert!(matches!(result, Err(SearchError::InvalidFilter(_))));
        assert!(events.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn clamps_limit_and_over_fetches_by_one() {
        let (events, engine) = engine(vec![]);
        let params = SearchMessagesParams {
            limit: Some("5000".into()),
            ..Default::default()
        };

        let page = engine.search(&params).await.unwrap();
        assert_eq!(page, MessagePage::empty());

        let seen = events.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].limit, 1000);
        assert_eq!(seen[0].fetch_limit(), 1001);
    }

    #[tokio::test]
    async fn room_failure_only_degrades_its_messages() {
        let (_, engine) = engine(vec![row(3, "!up:x"), row(2, "!down:x"), row(1, "!up:x")]);
        let page = engine.search(&SearchMessagesParams::default()).await.unwrap();

        let names: Vec<&str> = page
            .items
            .iter()
            .map(|m| m.room_info.as_ref().unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["Room !up:x", "!down:x", "Room !up:x"]);
        assert!(page.items.iter().all(|m| m.text.as_deref() == Some("hello")));
    }

    #[tokio::test]
    async fn has_more_tracks_the_look_ahead_row() {
        let rows: Vec<EventRow> = (1..=6).rev().map(|id| row(id, "!up:x")).collect();
        let (_, engine) = engine(rows);
        let params = |limit: &str| SearchMessagesParams {
            limit: Some(limit.into()),
            ..Default::default()
        };

        let page = engine.search(&params("5")).await.unwrap();
        assert!(page.has_more);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.oldest_cursor, "6");
        assert_eq!(page.newest_cursor, "2");

        let page = engine.search(&params("6")).await.unwrap();
        assert!(!page.has_more);
        assert_eq!(page.items.len(), 6);
    }

    /// Blocks until its cancel flag is set, then reports what it saw.
    struct StalledEvents {
        observed: Mutex<mpsc::Sender<bool>>,
    }

    impl EventStore for StalledEvents {
        fn query_events(&self, _: &CompiledQuery, cancel: &CancelFlag) -> anyhow::Result<Vec<EventRow>> {
            for _ in 0..500 {
                if cancel.is_cancelled() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            let _ = self.observed.lock().unwrap().send(cancel.is_cancelled());
            Err(anyhow::anyhow!("interrupted"))
        }
    }

    #[tokio::test]
    async fn deadline_interrupts_the_store_read() {
        let (tx, rx) = mpsc::channel();
        let events = Arc::new(StalledEvents {
            observed: Mutex::new(tx),
        });
        let engine = SearchEngine::new(events, Arc::new(FlakyRooms), LinkBuilder::default())
            .with_deadline(Duration::from_millis(20));

        let result = engine.search(&SearchMessagesParams::default()).await;
        assert!(matches!(result, Err(SearchError::StoreQuery(_))), "{result:?}");

        let cancelled = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .unwrap()
            .unwrap();
        assert!(cancelled);
    }
}
