//! Free-text advisor backends.
//!
//! Anything the chat session cannot answer deterministically is sent to an
//! `AdvisorGateway` as a single prompt. Two backends exist:
//!
//! - `HttpAdvisor`: any server implementing the OpenAI `/v1/chat/completions`
//!   API (OpenAI itself, vLLM, LocalAI, llama-server, ...)
//! - `OfflineAdvisor`: used when no endpoint is configured; every request fails
//!
//! Callers are expected to treat every error as a degraded answer, not a crash.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{PurseError, Result};
use crate::models::Dataset;
use crate::settings::AdvisorSettings;

/// A blocking text-in, text-out reasoning service.
pub trait AdvisorGateway {
    fn advise(&self, prompt: &str) -> Result<String>;
}

const INSTRUCTIONS: &str = "\
You are an AI Personal Finance Assistant. Your goal is to give helpful and
practical advice on personal finance topics.
Do not give any specific advice without first asking for the user's risk level
or financial goals; instead suggest helpful resources for finding answers.
If the user asks about saving or investing, tell them you can only provide
general information on these topics and that they should consult a financial
professional.";

/// Build the advisor prompt: fixed instructions, the whole dataset as JSON,
/// then the user's question.
pub fn compose_prompt(dataset: &Dataset, question: &str) -> Result<String> {
    let data = serde_json::to_string(dataset)?;
    Ok(format!(
        "{INSTRUCTIONS}\n\nHere is the user's financial data: {data}\nUser's question: {question}\n"
    ))
}

// ---------------------------------------------------------------------------
// OpenAI-compatible HTTP backend
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct HttpAdvisor {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpAdvisor {
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl AdvisorGateway for HttpAdvisor {
    fn advise(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        tracing::debug!(host = %self.base_url, model = %self.model, "sending advisor request");
        let response = req_builder.send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(PurseError::Gateway(format!("API error {status}: {body}")));
        }

        let chat_response: ChatCompletionResponse = response.json()?;
        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| PurseError::Gateway("empty response from advisor".into()))
    }
}

// ---------------------------------------------------------------------------
// Offline backend
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Default)]
pub struct OfflineAdvisor;

impl AdvisorGateway for OfflineAdvisor {
    fn advise(&self, _prompt: &str) -> Result<String> {
        Err(PurseError::Gateway(
            "no advisor endpoint configured (set PURSE_ADVISOR_HOST)".into(),
        ))
    }
}

/// Pick a backend from settings: HTTP when a host is configured, offline otherwise.
pub fn from_settings(settings: &AdvisorSettings) -> Result<Box<dyn AdvisorGateway>> {
    match settings.host.as_deref().filter(|h| !h.trim().is_empty()) {
        Some(host) => {
            let advisor = HttpAdvisor::new(
                host,
                &settings.model,
                settings.api_key.as_deref(),
                Duration::from_secs(settings.timeout_secs),
            )?;
            tracing::info!(host = advisor.host(), model = advisor.model(), "using HTTP advisor");
            Ok(Box::new(advisor))
        }
        None => {
            tracing::info!("no advisor host configured, free-text questions will be declined");
            Ok(Box::new(OfflineAdvisor))
        }
    }
}
