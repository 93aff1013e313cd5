//! Reminder endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use super::{ApiState, OutcomeResponse, failure};

#[derive(Deserialize)]
pub struct AddReminderRequest {
    #[serde(default)]
    pub reminder: Option<String>,
}

#[derive(Serialize)]
pub struct AddReminderResponse {
    pub success: bool,
    pub reminders: Vec<String>,
}

#[derive(Serialize)]
pub struct ReminderListResponse {
    pub reminders: Vec<String>,
}

/// Store a reminder and return every reminder, newest first
async fn add_reminder(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<AddReminderRequest>,
) -> Result<Json<AddReminderResponse>, (StatusCode, Json<OutcomeResponse>)> {
    let Some(text) = req.reminder.filter(|r| !r.trim().is_empty()) else {
        return Err(failure(StatusCode::BAD_REQUEST, "Reminder is required"));
    };

    state.reminders.add(&text).map_err(|e| {
        tracing::error!(error = %e, "failed to add reminder");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to add reminder")
    })?;

    let reminders = state.reminders.texts().map_err(|e| {
        tracing::error!(error = %e, "failed to fetch reminders");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch reminders")
    })?;

    Ok(Json(AddReminderResponse {
        success: true,
        reminders,
    }))
}

/// List reminders, newest first
async fn list_reminders(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ReminderListResponse>, (StatusCode, Json<OutcomeResponse>)> {
    let reminders = state.reminders.texts().map_err(|e| {
        tracing::error!(error = %e, "failed to fetch reminders");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch reminders")
    })?;

    Ok(Json(ReminderListResponse { reminders }))
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/reminders", get(list_reminders).post(add_reminder))
        .with_state(state)
}
