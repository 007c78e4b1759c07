use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{ApiError, AppState, auth, validation};
use crate::services::SearchHit;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub total: usize,
}

/// `GET /api/search?q=<term>`
///
/// The length check runs before credential verification so a too-short query
/// is a 400 no matter what, and never touches the database.
pub async fn search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let term = validation::validate_search_query(params.q.as_deref().unwrap_or(""))?;

    let user = auth::require_user(&state, &headers).await?;
    debug!("Search for '{term}' by {}", user.email);

    let outcome = state.search_service.search(term).await;

    Ok(Json(SearchResponse {
        results: outcome.results,
        total: outcome.total,
    }))
}
