//! Open-ended query endpoint

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};

use super::{ApiState, ErrorResponse, error_response};

#[derive(Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub response: String,
}

/// Answer a message and record it in the command history
///
/// The history row is written before the reply is computed and completed by
/// the id returned from that insert.
async fn query(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(message) = req.message.filter(|m| !m.trim().is_empty()) else {
        return Err(error_response(StatusCode::BAD_REQUEST, "Message is required"));
    };

    let row = match state.history.record_command(&message) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::error!(error = %e, "failed to record command");
            None
        }
    };

    let response = state.responder.respond(&message).await;

    if let Some(id) = row {
        if let Err(e) = state.history.set_response(id, &response) {
            tracing::error!(error = %e, id, "failed to store response");
        }
    }

    Ok(Json(QueryResponse { response }))
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/query", post(query))
        .with_state(state)
}
