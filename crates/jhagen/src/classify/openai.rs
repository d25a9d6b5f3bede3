//! Blocking OpenAI chat-completions client.
//!
//! The pipeline processes steps strictly in order with exactly one call
//! outstanding at a time, so a blocking round trip per step is the whole
//! concurrency story. Requests pin `temperature` to 0.0 and `seed` to 42:
//! repeated runs on identical input must reproduce identical
//! classifications.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::classify::{clean_response, parse_classification, Classification, Classifier, ClassifyError};

const DETERMINISTIC_SEED: u32 = 42;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    seed: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiClassifier {
    client: reqwest::blocking::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl OpenAiClassifier {
    pub fn new(api_key: SecretString, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key,
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

impl Classifier for OpenAiClassifier {
    fn classify(&self, step_text: &str) -> Result<Classification, ClassifyError> {
        let user_prompt = build_user_prompt(step_text);
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: 0.0,
            seed: DETERMINISTIC_SEED,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json()?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ClassifyError::MissingContent)?;

        let cleaned = clean_response(&content);
        debug!(raw = %content.trim(), cleaned = %cleaned, "classification response");
        Ok(parse_classification(&cleaned))
    }
}
