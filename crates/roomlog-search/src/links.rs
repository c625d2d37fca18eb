pub const DEFAULT_LINK_BASE: &str = "https://matrix.to/#/";

/// Builds deep links to rooms and events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base: String,
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_BASE)
    }
}

impl LinkBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn room(&self, room_id: &str) -> String {
        format!("{}{}", self.base, room_id)
    }

    pub fn event(&self, room_id: &str, event_id: &str) -> String {
        format!("{}{}/{}", self.base, room_id, event_id)
    }
}
