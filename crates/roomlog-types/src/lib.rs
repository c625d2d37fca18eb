pub mod api;
pub mod models;

pub use api::{MessagePage, SearchMessagesParams};
pub use models::{Message, RoomInfo};
