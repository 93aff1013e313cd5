//! System information and mocked weather/news endpoints

use axum::{Json, Router, routing::get};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Features advertised by `/api/system`
pub const FEATURES: &[&str] = &["voice-commands", "reminders", "ai-responses", "feedback"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub status: &'static str,
    pub server_time: String,
    pub version: &'static str,
    pub features: &'static [&'static str],
}

#[derive(Serialize)]
pub struct WeatherReport {
    pub location: &'static str,
    pub temperature: i32,
    pub condition: &'static str,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct NewsItem {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct NewsReport {
    pub news: Vec<NewsItem>,
    pub message: &'static str,
}

async fn system() -> Json<SystemInfo> {
    Json(SystemInfo {
        status: "online",
        server_time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION"),
        features: FEATURES,
    })
}

/// No weather provider is wired in; the payload is fixed
async fn weather() -> Json<WeatherReport> {
    Json(WeatherReport {
        location: "Your Location",
        temperature: 72,
        condition: "Sunny",
        message: "Weather data is currently mocked for testing purposes.",
    })
}

/// No news provider is wired in; the payload is fixed
async fn news() -> Json<NewsReport> {
    Json(NewsReport {
        news: vec![
            NewsItem {
                title: "Latest technology developments",
                description: "New advancements in AI technology.",
            },
            NewsItem {
                title: "Current world events",
                description: "Updates on global affairs.",
            },
            NewsItem {
                title: "Interesting science discoveries",
                description: "Recent findings in the field of science.",
            },
        ],
        message: "News data is currently mocked for testing purposes.",
    })
}

pub fn router() -> Router {
    Router::new()
        .route("/api/system", get(system))
        .route("/api/weather", get(weather))
        .route("/api/news", get(news))
}
