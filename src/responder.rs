//! Reply generation for open-ended queries
//!
//! With an `OpenAI` key configured, replies come from the chat-completions
//! API. Without one, a small ordered table of canned replies is used.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::{Error, Result};

/// Reply used when the language model call fails
pub const APOLOGY: &str =
    "I'm having trouble processing your request right now. Please try again later.";

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Canned replies, checked in order; first substring match wins
const FALLBACK_REPLIES: &[(&str, &str)] = &[
    (
        "hello",
        "Hello! I'm Nova, your AI assistant. How can I help you today?",
    ),
    ("hey", "Hey there! What can I do for you?"),
    (
        "how are you",
        "I'm doing great, thanks for asking! Ready to help you with anything.",
    ),
    (
        "what can you do",
        "I can help with reminders, answer questions, open websites, tell time and date, set timers, and much more!",
    ),
    (
        "thank you",
        "You're welcome! Is there anything else I can help with?",
    ),
    (
        "who made you",
        "I was created to be your helpful AI assistant!",
    ),
];

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

struct ChatModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
    max_tokens: u32,
    temperature: f32,
    system_prompt: String,
}

impl ChatModel {
    async fn complete(&self, message: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LanguageModel(format!(
                "chat completion error {status}: {body}"
            )));
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::LanguageModel("empty chat completion".to_string()))
    }
}

/// Produces replies for `/api/query`
pub struct Responder {
    model: Option<ChatModel>,
}

impl Responder {
    /// Build a responder from language model settings
    #[must_use]
    pub fn new(config: &LlmConfig) -> Self {
        let model = config.api_key.as_ref().map(|key| ChatModel {
            client: reqwest::Client::new(),
            endpoint: OPENAI_CHAT_URL.to_string(),
            api_key: key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
        });

        if model.is_none() {
            tracing::info!("no OpenAI key configured, using canned replies");
        }

        Self { model }
    }

    /// Point the chat client at a different completions URL
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        if let Some(model) = self.model.as_mut() {
            model.endpoint = endpoint.into();
        }
        self
    }

    /// Whether replies come from a language model
    #[must_use]
    pub const fn has_language_model(&self) -> bool {
        self.model.is_some()
    }

    /// Configured chat model name, if any
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.model.as_str())
    }

    /// Reply to a message; never fails
    pub async fn respond(&self, message: &str) -> String {
        let Some(model) = &self.model else {
            return fallback_reply(message);
        };

        match model.complete(message).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "language model request failed");
                APOLOGY.to_string()
            }
        }
    }
}

/// Canned reply for a message when no language model is configured
#[must_use]
pub fn fallback_reply(message: &str) -> String {
    let lower = message.to_lowercase();
    FALLBACK_REPLIES
        .iter()
        .find(|(key, _)| lower.contains(key))
        .map_or_else(
            || {
                format!(
                    "I heard you say: \"{message}\". I'm here to help! What would you like me to do?"
                )
            },
            |(_, reply)| (*reply).to_string(),
        )
}
