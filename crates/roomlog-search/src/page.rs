//! Builds the response page from fetched rows.

use roomlog_db::models::EventRow;
use roomlog_types::{Message, MessagePage};

use crate::content::{resolve_text, sort_hint};
use crate::cursor::encode_cursor;
use crate::links::LinkBuilder;
use crate::rooms::RoomDirectory;

const THREAD_RELATION: &str = "m.thread";

/// Rows that will be emitted, split from the over-fetched look-ahead row.
#[derive(Debug)]
pub struct PageWindow {
    pub rows: Vec<EventRow>,
    pub has_more: bool,
}

impl PageWindow {
    /// `has_more` is set iff the store returned more than `limit` rows.
    pub fn from_rows(mut rows: Vec<EventRow>, limit: usize) -> Self {
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        Self { rows, has_more }
    }

    pub fn into_page(self, rooms: &RoomDirectory, links: &LinkBuilder) -> MessagePage {
        // `oldest_cursor` takes the first emitted row and `newest_cursor` the
        // last one. Clients depend on this binding.
        let oldest_cursor = self
            .rows
            .first()
            .map(|row| encode_cursor(row.rowid))
            .unwrap_or_default();
        let newest_cursor = self
            .rows
            .last()
            .map(|row| encode_cursor(row.rowid))
            .unwrap_or_default();

        let items = self
            .rows
            .iter()
            .map(|row| project_message(row, rooms, links))
            .collect();

        MessagePage {
            items,
            has_more: self.has_more,
            oldest_cursor,
            newest_cursor,
        }
    }
}

pub fn project_message(row: &EventRow, rooms: &RoomDirectory, links: &LinkBuilder) -> Message {
    let text = resolve_text(row);
    let thread_root = match row.relation_type.as_deref() {
        Some(THREAD_RELATION) => row.relates_to.clone(),
        _ => None,
    };

    Message {
        id: row.event_id.clone(),
        timestamp: row.timestamp,
        sender_id: row.sender.clone(),
        text: (!text.is_empty()).then_some(text),
        is_deleted: row.redacted_by.is_some(),
        linked_message_thread_id: thread_root,
        room_info: Some(rooms.room_info(&row.room_id, links)),
        sort_key: sort_hint(&row.unsigned),
        cursor: Some(encode_cursor(row.rowid)),
        url: Some(links.event(&row.room_id, &row.event_id)),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rowid: i64, timestamp: i64) -> EventRow {
        EventRow {
            rowid,
            room_id: "!r:x".into(),
            event_id: format!("$e{rowid}"),
            sender: "@a:x".into(),
            event_type: "m.room.message".into(),
            timestamp,
            content: format!(r#"{{"body":"message {rowid}"}}"#).into_bytes(),
            unsigned: b"{}".to_vec(),
            ..Default::default()
        }
    }

    fn assemble(rows: Vec<EventRow>, limit: usize) -> MessagePage {
        PageWindow::from_rows(rows, limit).into_page(&RoomDirectory::default(), &LinkBuilder::default())
    }

    #[test]
    fn empty_fetch_gives_empty_page() {
        let page = assemble(vec![], 10);
        assert_eq!(page, MessagePage::empty());
    }

    #[test]
    fn look_ahead_row_is_never_emitted() {
        let rows = vec![row(9, 900), row(8, 800), row(7, 700), row(6, 600)];
        let page = assemble(rows, 3);

        assert!(page.has_more);
        let ids: Vec<&str> = page.items.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["$e9", "$e8", "$e7"]);
    }

    #[test]
    fn exactly_limit_rows_means_no_more() {
        let page = assemble(vec![row(2, 200), row(1, 100)], 2);
        assert!(!page.has_more);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn cursors_bind_first_and_last_emitted_rows() {
        let rows = vec![row(30, 3000), row(20, 2000), row(10, 1000), row(5, 500)];
        let page = assemble(rows, 3);

        // First emitted (most recent) lands in oldest_cursor.
        assert_eq!(page.oldest_cursor, "30");
        assert_eq!(page.newest_cursor, "10");
    }

    #[test]
    fn single_row_page_uses_it_for_both_cursors() {
        let page = assemble(vec![row(4, 400)], 10);
        assert_eq!(page.oldest_cursor, "4");
        assert_eq!(page.newest_cursor, "4");
    }

    #[test]
    fn projects_message_fields() {
        let mut event = row(12, 1_700_000_000_000);
        event.unsigned = br#"{"com.beeper.hs.order":77}"#.to_vec();
        event.redacted_by = Some("$redaction".into());
        event.relation_type = Some("m.thread".into());
        event.relates_to = Some("$root".into());

        let message = project_message(&event, &RoomDirectory::default(), &LinkBuilder::default());

        assert_eq!(message.id, "$e12");
        assert_eq!(message.timestamp, 1_700_000_000_000);
        assert_eq!(message.sender_id, "@a:x");
        assert_eq!(message.text.as_deref(), Some("message 12"));
        assert_eq!(message.sort_key, Some(77));
        assert!(message.is_deleted);
        assert_eq!(message.linked_message_thread_id.as_deref(), Some("$root"));
        assert_eq!(message.cursor.as_deref(), Some("12"));
        assert_eq!(message.url.as_deref(), Some("https://matrix.to/#/!r:x/$e12"));
        let room = message.room_info.unwrap();
        assert_eq!(room.name, "!r:x");
        assert_eq!(room.url, "https://matrix.to/#/!r:x");
    }

    #[test]
    fn edits_are_not_threads() {
        let mut event = row(1, 1);
        event.relation_type = Some("m.replace".into());
        event.relates_to = Some("$orig".into());

        let message = project_message(&event, &RoomDirectory::default(), &LinkBuilder::default());
        assert!(message.linked_message_thread_id.is_none());
        assert!(!message.is_deleted);
        assert!(message.sort_key.is_none());
    }
}
