//! Liveness and readiness probes

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use super::ApiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Fail,
    /// Not configured; the service still answers
    Unavailable,
}

#[derive(Serialize)]
pub struct Check {
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Check {
    fn new(status: CheckStatus, detail: Option<String>) -> Self {
        Self { status, detail }
    }
}

#[derive(Serialize)]
pub struct Checks {
    pub database: Check,
    pub language_model: Check,
}

#[derive(Serialize)]
pub struct ReadyReport {
    pub status: &'static str,
    pub checks: Checks,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn ready(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<ReadyReport>) {
    let database = probe_database(&state);
    let language_model = match state.responder.model_name() {
        Some(model) => Check::new(CheckStatus::Ok, Some(model.to_string())),
        None => Check::new(
            CheckStatus::Unavailable,
            Some("no API key, answering from canned replies".to_string()),
        ),
    };

    // Only the store can make the service unready
    let code = if database.status == CheckStatus::Ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status = if code == StatusCode::OK { "ok" } else { "degraded" };

    (
        code,
        Json(ReadyReport {
            status,
            checks: Checks {
                database,
                language_model,
            },
        }),
    )
}

fn probe_database(state: &ApiState) -> Check {
    let result = state
        .db
        .get()
        .map_err(|e| format!("pool: {e}"))
        .and_then(|conn| {
            conn.query_row("SELECT COUNT(*) FROM reminders", [], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(|e| format!("query: {e}"))
        });

    match result {
        Ok(_) => Check::new(CheckStatus::Ok, None),
        Err(detail) => {
            tracing::warn!(%detail, "database readiness check failed");
            Check::new(CheckStatus::Fail, Some(detail))
        }
    }
}

/// `/health`, stateless
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// `/ready`, probes the store and the language model setup
pub fn ready_router(state: Arc<ApiState>) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}
