//! TOML configuration file loading
//!
//! Supports `~/.config/nova/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct NovaConfigFile {
    /// Backend server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Language model configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Front-end client configuration
    #[serde(default)]
    pub client: ClientFileConfig,

    /// Speech configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,
}

/// Backend server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Directory holding `nova.db`
    pub data_dir: Option<String>,

    /// Directory of static web assets to serve
    pub static_dir: Option<String>,
}

/// Language model configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// `OpenAI` API key
    pub api_key: Option<String>,

    /// Chat model identifier (e.g. "gpt-3.5-turbo")
    pub model: Option<String>,

    /// Completion token budget
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// System prompt override
    pub system_prompt: Option<String>,
}

/// Front-end client configuration
#[derive(Debug, Default, Deserialize)]
pub struct ClientFileConfig {
    /// Backend base URL (e.g. `http://localhost:3000`)
    pub server_url: Option<String>,

    /// Wake-words stripped from web-search fallbacks
    pub wake_words: Option<Vec<String>>,

    /// Search URL prefix; the encoded query is appended
    pub search_url: Option<String>,
}

/// Speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Recognition language tag (e.g. "en-US")
    pub language: Option<String>,

    /// Preferred synthesis voice names, matched by substring
    pub preferred_voices: Option<Vec<String>>,
}

/// Load the TOML config file from the standard path
///
/// Returns `NovaConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> NovaConfigFile {
    config_file_path().map_or_else(NovaConfigFile::default, |path| load_from(&path))
}

/// Load a TOML config file from an explicit path
///
/// Missing or malformed files yield the defaults.
pub fn load_from(path: &Path) -> NovaConfigFile {
    if !path.exists() {
        return NovaConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                NovaConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            NovaConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/nova/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("nova").join("config.toml"))
}
