//! HTTP API server for the assistant backend

pub mod feedback;
pub mod health;
pub mod history;
pub mod preferences;
pub mod query;
pub mod reminders;
pub mod system;

use std::path::PathBuf;
use std::sync::Arc;

use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{DEFAULT_PORT, LlmConfig};
use crate::db::{DbPool, FeedbackRepo, HistoryRepo, PreferenceRepo, ReminderRepo};
use crate::responder::Responder;
use crate::{Error, Result};

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub db: DbPool,
    pub reminders: ReminderRepo,
    pub feedback: FeedbackRepo,
    pub history: HistoryRepo,
    pub preferences: PreferenceRepo,
    pub responder: Arc<Responder>,
}

impl ApiState {
    /// Build handler state over a database pool
    #[must_use]
    pub fn new(db: DbPool, responder: Responder) -> Self {
        Self {
            reminders: ReminderRepo::new(db.clone()),
            feedback: FeedbackRepo::new(db.clone()),
            history: HistoryRepo::new(db.clone()),
            preferences: PreferenceRepo::new(db.clone()),
            responder: Arc::new(responder),
            db,
        }
    }
}

/// Error body for `/api/query`, `/api/history` and unknown paths
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `{success, message}` body used by the write endpoints
#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    pub success: bool,
    pub message: String,
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

pub(crate) fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<OutcomeResponse>) {
    (
        status,
        Json(OutcomeResponse {
            success: false,
            message: message.to_string(),
        }),
    )
}

async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    error_response(StatusCode::NOT_FOUND, "Endpoint not found")
}

/// Build the API router with every endpoint and no static files
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(query::router(state.clone()))
        .merge(reminders::router(state.clone()))
        .merge(feedback::router(state.clone()))
        .merge(history::router(state.clone()))
        .merge(preferences::router(state.clone()))
        .merge(system::router())
        .merge(health::router())
        .merge(health::ready_router(state))
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    db: DbPool,
    port: u16,
    llm: Option<LlmConfig>,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub const fn new(db: DbPool) -> Self {
        Self {
            db,
            port: DEFAULT_PORT,
            llm: None,
            static_dir: None,
        }
    }

    /// Set the port to listen on
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the language model configuration
    #[must_use]
    pub fn llm(mut self, config: LlmConfig) -> Self {
        self.llm = Some(config);
        self
    }

    /// Set the static files directory for serving the web front-end
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let responder = self.llm.as_ref().map_or_else(
            || {
                Responder::new(&LlmConfig {
                    api_key: None,
                    model: crate::config::DEFAULT_MODEL.to_string(),
                    max_tokens: 150,
                    temperature: 0.7,
                    system_prompt: crate::config::DEFAULT_SYSTEM_PROMPT.to_string(),
                })
            },
            Responder::new,
        );

        ApiServer {
            state: Arc::new(ApiState::new(self.db, responder)),
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Shared handler state
    #[must_use]
    pub fn state(&self) -> Arc<ApiState> {
        Arc::clone(&self.state)
    }

    /// Build the router with all routes and layers
    pub fn router(&self) -> Router {
        let router = router(self.state.clone());

        // Unknown paths fall through to static files, then to a JSON 404
        let router = if let Some(static_dir) = &self.static_dir {
            tracing::info!(path = %static_dir.display(), "serving static files");
            router.fallback_service(
                ServeDir::new(static_dir).not_found_service(not_found.into_service()),
            )
        } else {
            router.fallback(not_found)
        };

        // CORS layer for cross-origin requests from the front-end
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server on the configured port
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener
    ///
    /// # Errors
    ///
    /// Returns error if the server fails while running
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let port = listener.local_addr().map(|a| a.port()).unwrap_or(self.port);
        tracing::info!(
            port,
            language_model = self.state.responder.has_language_model(),
            "API server listening"
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
