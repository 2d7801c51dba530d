//! Airline directory lookup.

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use crate::{AppState, extractors::AppQuery, error::ApiResult, middleware::AuthUser};
use agencia_core::airline::Airline;

/// Creates the airline routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/compagnies", get(search_airlines))
}

/// Query parameters for the airline search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Code or name fragment.
    pub q: Option<String>,
}

/// Search results.
#[derive(Debug, Serialize)]
pub struct AirlineSearchResponse {
    /// Matching airlines.
    pub compagnies: Vec<Airline>,
    /// Number of matches returned.
    pub total: usize,
}

/// GET `/compagnies?q=` - Search the airline directory.
async fn search_airlines(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppQuery(query): AppQuery<SearchQuery>,
) -> ApiResult<Json<AirlineSearchResponse>> {
    let compagnies: Vec<Airline> = state
        .airlines
        .search(query.q.as_deref().unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(AirlineSearchResponse {
        total: compagnies.len(),
        compagnies,
    }))
}
