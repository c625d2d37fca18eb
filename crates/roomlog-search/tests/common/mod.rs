#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use roomlog_db::Database;
use roomlog_search::{LinkBuilder, SearchEngine};
use tempfile::TempDir;

pub struct Store {
    _dir: TempDir,
    pub db: Arc<Database>,
    next_event: AtomicUsize,
}

impl Store {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_with_readers(&dir.path().join("events.db"), 2).unwrap();
        Self {
            _dir: dir,
            db: Arc::new(db),
            next_event: AtomicUsize::new(1),
        }
    }

    pub fn engine(&self) -> SearchEngine {
        SearchEngine::from_database(self.db.clone(), LinkBuilder::default())
    }

    /// Inserts a plain `m.room.message` and returns its row id.
    pub fn message(&self, room_id: &str, sender: &str, timestamp: i64, body: &str) -> i64 {
        let content = serde_json::json!({ "msgtype": "m.text", "body": body }).to_string();
        self.event(room_id, sender, "m.room.message", timestamp, content.as_bytes())
    }

    pub fn event(&self, room_id: &str, sender: &str, event_type: &str, timestamp: i64, content: &[u8]) -> i64 {
        let event_id = format!("$ev{}", self.next_event.fetch_add(1, Ordering::Relaxed));
        self.db
            .with_conn_mut(|conn| {
                conn.execute(
                    "INSERT INTO event (room_id, event_id, sender, type, timestamp, content)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![room_id, event_id, sender, event_type, timestamp, content],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .unwrap()
    }

    pub fn encrypted(&self, room_id: &str, timestamp: i64, decrypted_body: &str) -> i64 {
        let rowid = self.event(
            room_id,
            "@bob:example.org",
            "m.room.encrypted",
            timestamp,
            br#"{"algorithm":"m.megolm.v1.aes-sha2","ciphertext":"AwgAEnAC"}"#,
        );
        let decrypted = serde_json::json!({ "body": decrypted_body }).to_string();
        self.db
            .with_conn_mut(|conn| {
                conn.execute(
                    "UPDATE event SET decrypted = ?1, decrypted_type = 'm.room.message' WHERE rowid = ?2",
                    rusqlite::params![decrypted.as_bytes(), rowid],
                )?;
                Ok(())
            })
            .unwrap();
        rowid
    }

    pub fn room(&self, room_id: &str, name: Option<&str>) {
        self.db
            .with_conn_mut(|conn| {
                conn.execute(
                    "INSERT INTO room (room_id, name) VALUES (?1, ?2)",
                    rusqlite::params![room_id, name],
                )?;
                Ok(())
            })
            .unwrap();
    }
}
