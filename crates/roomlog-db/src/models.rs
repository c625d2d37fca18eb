use serde::Deserialize;

// Row types read from the SQLite event store.
// Distinct from roomlog-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct RoomRow {
    pub room_id: String,
    pub name: Option<String>,
}

/// Locally computed rendering of an event, stored as JSON next to the event.
/// Only the fields search reads are kept; the rest of the object is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LocalContent {
    #[serde(default)]
    pub sanitized_html: String,
    #[serde(default)]
    pub was_plaintext: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EventRow {
    /// Insertion-order id, strictly increasing across the whole store.
    pub rowid: i64,
    pub room_id: String,
    pub event_id: String,
    pub sender: String,
    pub event_type: String,
    pub timestamp: i64,
    pub content: Vec<u8>,
    pub decrypted: Option<Vec<u8>>,
    pub decrypted_type: Option<String>,
    pub unsigned: Vec<u8>,
    pub local_content: Option<LocalContent>,
    pub redacted_by: Option<String>,
    pub relates_to: Option<String>,
    pub relation_type: Option<String>,
}
