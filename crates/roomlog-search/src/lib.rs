//! Search and pagination over the local message log.
//!
//! Request flow: [`filter`] validates the query string, [`predicate`]
//! compiles it into one keyset scan, [`store`] runs it, [`content`] and
//! [`rooms`] fill in text and room metadata, and [`page`] assembles the
//! response.

pub mod content;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod filter;
pub mod handler;
pub mod links;
pub mod page;
pub mod predicate;
pub mod rooms;
pub mod store;

pub use engine::SearchEngine;
pub use error::{RoomLookupError, SearchError, SearchResult};
pub use filter::SearchFilter;
pub use links::LinkBuilder;
