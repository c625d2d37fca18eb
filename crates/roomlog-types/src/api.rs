use serde::{Deserialize, Serialize};

use crate::models::Message;

// -- Search --

/// Raw query string of `GET /search-messages`.
///
/// Every field is kept as text so the filter builder can report which
/// parameter was malformed instead of the extractor rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchMessagesParams {
    pub room_id: Option<String>,
    pub sender: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub limit: Option<String>,
    pub cursor: Option<String>,
    pub direction: Option<String>,
}

/// One page of search results.
///
/// `oldest_cursor` holds the row id of the first emitted item and
/// `newest_cursor` the row id of the last one. Items are emitted most recent
/// first, so clients paging backwards feed `newest_cursor` back with
/// `direction=before`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePage {
    pub items: Vec<Message>,
    pub has_more: bool,
    pub oldest_cursor: String,
    pub newest_cursor: String,
}

impl MessagePage {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_serializes_blank_cursors() {
        let json = serde_json::to_value(MessagePage::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "items": [],
                "has_more": false,
                "oldest_cursor": "",
                "newest_cursor": "",
            })
        );
    }

    #[test]
    fn params_accept_partial_query() {
        let params: SearchMessagesParams =
            serde_json::from_value(serde_json::json!({ "room_id": "!a:b", "limit": "5" })).unwrap();
        assert_eq!(params.room_id.as_deref(), Some("!a:b"));
        assert_eq!(params.limit.as_deref(), Some("5"));
        assert!(params.cursor.is_none());
    }
}
