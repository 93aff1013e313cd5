//! Feedback endpoint

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;

use super::{ApiState, OutcomeResponse, failure};

#[derive(Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Store a feedback entry
async fn submit_feedback(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<OutcomeResponse>, (StatusCode, Json<OutcomeResponse>)> {
    let Some(text) = req.feedback.filter(|f| !f.trim().is_empty()) else {
        return Err(failure(StatusCode::BAD_REQUEST, "Feedback is required"));
    };

    let entry = state.feedback.add(&text).map_err(|e| {
        tracing::error!(error = %e, "failed to save feedback");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save feedback")
    })?;

    tracing::info!(id = entry.id, "feedback received");

    Ok(Json(OutcomeResponse {
        success: true,
        message: "Feedback received successfully".to_string(),
    }))
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/feedback", post(submit_feedback))
        .with_state(state)
}
