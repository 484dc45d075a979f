//! Plain-language storm advice from a chat-completion endpoint.
//!
//! The API key is a per-call argument. It is attached with `bearer_auth` and
//! appears nowhere else: not in the body, not in logs, not in errors.

use crate::config::WeatherConfig;
use crate::error::{WeatherError, WeatherResult};
use crate::types::StormRiskSummary;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SERVICE: &str = "advice";

const SYSTEM_PROMPT: &str = "You are a local weather assistant. Explain the storm risk simply, \
in Brazilian Portuguese, focusing on practical safety. Be concise (at most 3 short paragraphs).";

/// What the advice is about.
#[derive(Clone, Debug)]
pub struct AdviceRequest {
    pub location_label: String,
    pub summary: StormRiskSummary,
}

impl AdviceRequest {
    fn user_prompt(&self) -> String {
        let location = if self.location_label.trim().is_empty() {
            "unknown"
        } else {
            self.location_label.as_str()
        };
        [
            format!("Approximate location: {location}."),
            format!(
                "Risk level (local heuristic): {}.",
                self.summary.level.as_str().to_uppercase()
            ),
            format!("Summary: {}", self.summary.reason),
        ]
        .join("\n")
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
pub struct AdviceClient {
    client: Client,
    url: String,
    model: String,
}

impl AdviceClient {
    pub fn new(config: &WeatherConfig) -> WeatherResult<Self> {
        Ok(Self {
            client: crate::http_client(config)?,
            url: config.advice_url.clone(),
            model: config.advice_model.clone(),
        })
    }

    /// Asks the model for advice, authenticating with `api_key`.
    pub async fn advise(&self, api_key: &str, request: &AdviceRequest) -> WeatherResult<String> {
        let user_prompt = request.user_prompt();
        let body = ChatRequest {
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
        };

        debug!("requesting advice from {} with model {}", self.url, self.model);
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                service: SERVICE,
                status: status.as_u16(),
                body: crate::truncate_body(&body),
            });
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| WeatherError::invalid(SERVICE, e.to_string()))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| WeatherError::invalid(SERVICE, "no message content in first choice"))
    }
}
