//! Command history endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::{ApiState, ErrorResponse, error_response};
use crate::db::{CommandHistoryEntry, history::DEFAULT_HISTORY_LIMIT};

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
}

impl HistoryQuery {
    /// Requested limit; missing, unparseable or zero means the default
    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<usize>().ok())
            .filter(|&l| l > 0)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub history: Vec<CommandHistoryEntry>,
}

/// Most recent commands, newest first
async fn history(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let history = state.history.recent(query.limit()).map_err(|e| {
        tracing::error!(error = %e, "failed to fetch history");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch history")
    })?;

    Ok(Json(HistoryResponse { history }))
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/history", get(history))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(raw: Option<&str>) -> usize {
        HistoryQuery {
            limit: raw.map(ToString::to_string),
        }
        .limit()
    }

    #[test]
    fn limit_defaults() {
        assert_eq!(limit(None), 10);
        assert_eq!(limit(Some("abc")), 10);
        assert_eq!(limit(Some("0")), 10);
        assert_eq!(limit(Some("-3")), 10);
        assert_eq!(limit(Some("25")), 25);
    }
}
