//! Nova - voice assistant front-end and companion backend
//!
//! This library provides:
//! - A voice session state machine driven by speech adapter events
//! - A command dispatcher mapping transcripts to local actions
//! - An HTTP client for the assistant backend with web-search fallback
//! - The backend itself: reminders, feedback, history, preferences, queries
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   Front-end (nova console)           │
//! │  Speech adapters ─▶ SessionDriver ─▶ Dispatcher      │
//! │                          │                           │
//! │                   RemoteClient (reqwest)             │
//! └──────────────────────────┬──────────────────────────┘
//!                            │ HTTP/JSON
//! ┌──────────────────────────▼──────────────────────────┐
//! │                   Backend (nova serve)               │
//! │   axum routes  │  Responder (OpenAI)  │  SQLite      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod host;
pub mod responder;
pub mod session;
pub mod voice;

pub use client::{AssistantBackend, QueryReply, RemoteClient};
pub use commands::{Action, Dispatcher, Reply, RuleKind};
pub use config::Config;
pub use db::{DbConn, DbPool};
pub use error::{Error, Result};
pub use responder::Responder;
pub use session::{Event, SessionDriver, SessionState};
