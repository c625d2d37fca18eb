//! Message model exposed to search clients.
//!
//! Mirrors the platform message shape: every optional field is omitted from
//! the JSON when unset, never sent as `null`. Loosely typed payloads
//! (`extra`, `action`, `seen`, ...) are carried as [`serde_json::Value`] so
//! unknown shapes round-trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    #[default]
    Unknown,
    Img,
    Video,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayStatus {
    Unplayed,
    Played,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AttachmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<AttachmentSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_gif: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_sticker: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_voice_note: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_status: Option<PlayStatus>,
    #[serde(default, rename = "srcURL", skip_serializing_if = "Option::is_none")]
    pub src_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReaction {
    pub id: String,
    pub reaction_key: String,
    #[serde(default, rename = "imgURL", skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    #[serde(rename = "participantID")]
    pub participant_id: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub emoji: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageLink {
    pub url: String,
    #[serde(default, rename = "originalURL", skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default, rename = "imgSize", skip_serializing_if = "Option::is_none")]
    pub img_size: Option<AttachmentSize>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageButton {
    pub label: String,
    #[serde(rename = "linkURL")]
    pub link_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePreview {
    pub id: String,
    #[serde(default, rename = "threadID", skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "senderID")]
    pub sender_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Room reference denormalized onto every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarded_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarded_from: Option<Value>,
    #[serde(rename = "senderID")]
    pub sender_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_attributes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_footer: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tweets: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<MessageLink>,
    #[serde(default, rename = "iframeURL", skip_serializing_if = "Option::is_none")]
    pub iframe_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<MessageReaction>,
    /// Either a flag, a timestamp, or a per-participant map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_delivered: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_sender: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_action: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_errored: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub parse_template: bool,

    #[serde(default, rename = "linkedMessageThreadID", skip_serializing_if = "Option::is_none")]
    pub linked_message_thread_id: Option<String>,
    #[serde(default, rename = "linkedMessageID", skip_serializing_if = "Option::is_none")]
    pub linked_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_message: Option<Box<MessagePreview>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<MessageButton>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_info: Option<RoomInfo>,

    /// Homeserver ordering hint, for stable client-side sorting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
    #[serde(default, rename = "_original", skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
