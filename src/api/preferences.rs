//! Preference endpoints

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use super::{ApiState, OutcomeResponse, failure};

#[derive(Serialize)]
pub struct PreferencesResponse {
    pub preferences: BTreeMap<String, Option<String>>,
}

#[derive(Deserialize)]
pub struct SetPreferenceRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

async fn list_preferences(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<PreferencesResponse>, (StatusCode, Json<OutcomeResponse>)> {
    let preferences = state.preferences.all().map_err(|e| {
        tracing::error!(error = %e, "failed to fetch preferences");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch preferences")
    })?;

    Ok(Json(PreferencesResponse { preferences }))
}

async fn set_preference(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<SetPreferenceRequest>,
) -> Result<Json<OutcomeResponse>, (StatusCode, Json<OutcomeResponse>)> {
    let Some(key) = req.key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) else {
        return Err(failure(StatusCode::BAD_REQUEST, "Preference key is required"));
    };

    state
        .preferences
        .set(&key, req.value.as_deref())
        .map_err(|e| {
            tracing::error!(error = %e, key = %key, "failed to save preference");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save preference")
        })?;

    Ok(Json(OutcomeResponse {
        success: true,
        message: format!("Preference {key} saved"),
    }))
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/preferences", get(list_preferences).post(set_preference))
        .with_state(state)
}
