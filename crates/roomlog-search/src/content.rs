//! Picks the text a search result shows for an event.
//!
//! Precedence, evaluated once per event:
//! 1. locally rendered sanitized text, verbatim;
//! 2. otherwise the `body` of the decrypted payload when the event was
//!    plaintext or decrypted to a message, else the `body` of the raw payload;
//! 3. when that payload is not a JSON object, the payload bytes as text.
//!
//! Step 3 never drops a message, which means undecryptable ciphertext comes
//! back as text. Callers must check decryption state before showing it to
//! end users.

use roomlog_db::models::EventRow;
use serde::Deserialize;

use crate::predicate::MESSAGE_EVENT_TYPE;

const SORT_HINT_FIELD: &str = "com.beeper.hs.order";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextSource<'a> {
    Sanitized(&'a str),
    Payload(&'a [u8]),
}

/// A `null` body, or a `null` payload, reads as empty text.
#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    body: Option<String>,
}

fn select_source(event: &EventRow) -> TextSource<'_> {
    if let Some(local) = &event.local_content {
        if !local.sanitized_html.is_empty() {
            return TextSource::Sanitized(&local.sanitized_html);
        }
    }

    let was_plaintext = event.local_content.as_ref().is_some_and(|l| l.was_plaintext);
    let decrypted_message = event.decrypted_type.as_deref() == Some(MESSAGE_EVENT_TYPE);
    if was_plaintext || decrypted_message {
        TextSource::Payload(event.decrypted.as_deref().unwrap_or_default())
    } else {
        TextSource::Payload(&event.content)
    }
}

fn render(source: TextSource<'_>) -> String {
    match source {
        TextSource::Sanitized(text) => text.to_string(),
        TextSource::Payload(bytes) => match serde_json::from_slice::<Option<MessageBody>>(bytes) {
            Ok(parsed) => parsed.and_then(|m| m.body).unwrap_or_default(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
    }
}

pub fn resolve_text(event: &EventRow) -> String {
    render(select_source(event))
}

/// Homeserver ordering hint from the unsigned block; absent or malformed is `None`.
pub fn sort_hint(unsigned: &[u8]) -> Option<i64> {
    let unsigned: serde_json::Value = serde_json::from_slice(unsigned).ok()?;
    unsigned.get(SORT_HINT_FIELD)?.as_i64()
}
