//! Configuration management for the Nova assistant
//!
//! Values resolve as env > TOML file > default. CLI flags are applied on top
//! by the binary.

pub mod file;

use std::path::PathBuf;

use secrecy::SecretString;

pub use file::NovaConfigFile;

/// Default backend port
pub const DEFAULT_PORT: u16 = 3000;

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default system prompt for the language model
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Nova, a helpful AI assistant. Provide concise, friendly responses. Keep responses under 2-3 sentences when possible.";

/// Placeholder key shipped in sample `.env` files; treated as unset
const PLACEHOLDER_API_KEY: &str = "your-openai-api-key-here";

/// Nova configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the database
    pub data_dir: PathBuf,

    /// Backend server configuration
    pub server: ServerConfig,

    /// Language model configuration
    pub llm: LlmConfig,

    /// Front-end client configuration
    pub client: ClientConfig,

    /// Speech configuration
    pub voice: VoiceConfig,
}

/// Backend server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,
}

/// Language model configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// `OpenAI` API key; `None` selects the canned fallback table
    pub api_key: Option<SecretString>,

    /// Chat model identifier
    pub model: String,

    /// Completion token budget
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Fixed system prompt
    pub system_prompt: String,
}

/// Front-end client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL
    pub server_url: String,

    /// Wake-words stripped from web-search fallback queries
    pub wake_words: Vec<String>,

    /// Search URL prefix
    pub search_url: String,
}

/// Speech configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Recognition language tag
    pub language: String,

    /// Preferred synthesis voices, matched by name substring
    pub preferred_voices: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: format!("http://localhost:{DEFAULT_PORT}"),
            wake_words: vec!["nova".to_string(), "shifra".to_string(), "shipra".to_string()],
            search_url: "https://www.google.com/search?q=".to_string(),
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            preferred_voices: vec![
                "Google US English".to_string(),
                "Microsoft David - English (United States)".to_string(),
                "English (US)".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load configuration from the config file and process environment
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();
        let config = Self::resolve(fc, |key| std::env::var(key).ok());

        if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
            tracing::warn!(
                path = %config.data_dir.display(),
                error = %e,
                "failed to create data directory"
            );
        }

        config
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// Kept separate from [`Config::load`] so resolution can be tested
    /// without touching the process environment.
    pub fn resolve<F>(fc: NovaConfigFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = env("NOVA_DATA_DIR")
            .or(fc.server.data_dir)
            .map_or_else(default_data_dir, PathBuf::from);

        let server = ServerConfig {
            port: env("NOVA_PORT")
                .or_else(|| env("PORT"))
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            static_dir: env("NOVA_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from),
        };

        let llm = LlmConfig {
            api_key: env("OPENAI_API_KEY")
                .or(fc.llm.api_key)
                .filter(|k| is_usable_key(k))
                .map(SecretString::from),
            model: env("NOVA_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: fc.llm.max_tokens.unwrap_or(150),
            temperature: fc.llm.temperature.unwrap_or(0.7),
            system_prompt: fc
                .llm
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        };

        let client_defaults = ClientConfig::default();
        let client = ClientConfig {
            server_url: env("NOVA_SERVER_URL")
                .or(fc.client.server_url)
                .unwrap_or(client_defaults.server_url),
            wake_words: env("NOVA_WAKE_WORDS")
                .map(|s| split_list(&s))
                .or(fc.client.wake_words)
                .unwrap_or(client_defaults.wake_words),
            search_url: fc.client.search_url.unwrap_or(client_defaults.search_url),
        };

        let voice_defaults = VoiceConfig::default();
        let voice = VoiceConfig {
            language: env("NOVA_LANGUAGE")
                .or(fc.voice.language)
                .unwrap_or(voice_defaults.language),
            preferred_voices: fc
                .voice
                .preferred_voices
                .unwrap_or(voice_defaults.preferred_voices),
        };

        Self {
            data_dir,
            server,
            llm,
            client,
            voice,
        }
    }

    /// Path of the `SQLite` database file
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("nova.db")
    }
}

/// Default data directory: `~/.local/share/nova` on Linux
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("nova"))
}

fn is_usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn resolve_with(vars: &[(&str, &str)], fc: NovaConfigFile) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::resolve(fc, |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_sources() {
        let config = resolve_with(&[], NovaConfigFile::default());

        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.max_tokens, 150);
        assert_eq!(config.client.wake_words, vec!["nova", "shifra", "shipra"]);
        assert_eq!(config.voice.language, "en-US");
    }

    #[test]
    fn env_overrides_file() {
        let mut fc = NovaConfigFile::default();
        fc.server.port = Some(4000);
        fc.client.server_url = Some("http://file:1".to_string());

        let config = resolve_with(
            &[("NOVA_PORT", "5000"), ("NOVA_WAKE_WORDS", "jarvis, friday")],
            fc,
        );

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.client.server_url, "http://file:1");
        assert_eq!(config.client.wake_words, vec!["jarvis", "friday"]);
    }

    #[test]
    fn placeholder_api_key_is_unset() {
        let config = resolve_with(
            &[("OPENAI_API_KEY", "your-openai-api-key-here")],
            NovaConfigFile::default(),
        );
        assert!(config.llm.api_key.is_none());

        let config = resolve_with(&[("OPENAI_API_KEY", "sk-real")], NovaConfigFile::default());
        assert!(config.llm.api_key.is_some());
    }

    #[test]
    fn db_path_lives_in_data_dir() {
        let config = resolve_with(&[("NOVA_DATA_DIR", "/tmp/nova-test")], NovaConfigFile::default());
        assert_eq!(config.db_path(), PathBuf::from("/tmp/nova-test/nova.db"));
    }
}
