use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::error;

use roomlog_types::SearchMessagesParams;

use crate::engine::SearchEngine;
use crate::error::SearchError;

pub const SEARCH_MESSAGES_PATH: &str = "/search-messages";

pub fn router(engine: Arc<SearchEngine>) -> Router {
    Router::new()
        .route(SEARCH_MESSAGES_PATH, get(search_messages))
        .with_state(engine)
}

/// GET /search-messages: filtered, cursor-paginated message search.
pub async fn search_messages(
    State(engine): State<Arc<SearchEngine>>,
    Query(params): Query<SearchMessagesParams>,
) -> Result<Response, SearchError> {
    let page = engine.search(&params).await?;

    let body = serde_json::to_vec(&page).map_err(|e| {
        error!("Failed to encode response: {}", e);
        SearchError::Encoding(e.to_string())
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
