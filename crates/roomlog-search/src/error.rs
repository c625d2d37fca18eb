use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Malformed or out-of-range request parameters.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    /// The event store failed to run the compiled query.
    #[error("store query failed: {0}")]
    StoreQuery(String),
    #[error("failed to encode response: {0}")]
    Encoding(String),
}

impl SearchError {
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter(message.into())
    }

    pub fn invalid_cursor(message: impl Into<String>) -> Self {
        Self::InvalidCursor(message.into())
    }

    /// Keeps the whole cause chain of a storage error.
    pub fn store_query(err: &anyhow::Error) -> Self {
        Self::StoreQuery(format!("{err:#}"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidFilter(_) | Self::InvalidCursor(_) => StatusCode::BAD_REQUEST,
            Self::StoreQuery(_) | Self::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Server-side causes stay in the logs.
        let body = match &self {
            Self::InvalidFilter(_) | Self::InvalidCursor(_) => self.to_string(),
            Self::StoreQuery(_) => "Failed to query timeline".to_string(),
            Self::Encoding(_) => "Failed to encode response".to_string(),
        };
        (status, body).into_response()
    }
}

/// A room metadata lookup that failed. Never aborts the request.
#[derive(Debug, Clone, Error)]
#[error("room lookup failed for {room_id}: {message}")]
pub struct RoomLookupError {
    pub room_id: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(SearchError::invalid_filter("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(SearchError::invalid_cursor("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            SearchError::StoreQuery("disk".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            SearchError::Encoding("bad".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_error_keeps_cause_chain() {
        let err = anyhow::anyhow!("disk I/O error").context("Event query failed");
        let SearchError::StoreQuery(message) = SearchError::store_query(&err) else {
            panic!("expected StoreQuery");
        };
        assert!(message.contains("Event query failed"));
        assert!(message.contains("disk I/O error"));
    }
}
