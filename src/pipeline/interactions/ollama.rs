use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::ReasoningEngine;
use crate::pipeline::PipelineError;

/// Default Ollama endpoint.
pub const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Default reasoning model.
pub const DEFAULT_MODEL: &str = "medgemma";

/// Ollama HTTP client used as the reasoning engine.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout_secs: u64, temperature: f32) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
            temperature,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_error(&self, e: reqwest::Error) -> PipelineError {
        if e.is_timeout() {
            PipelineError::reasoning_engine(format!(
                "request timed out after {}s",
                self.timeout_secs
            ))
        } else if e.is_connect() {
            PipelineError::reasoning_engine(format!("Ollama is not running at {}", self.base_url))
        } else {
            PipelineError::reasoning_engine(e.to_string())
        }
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    format: &'a serde_json::Value,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl ReasoningEngine for OllamaClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
        schema: &serde_json::Value,
    ) -> Result<String, PipelineError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model,
            prompt,
            system,
            stream: false,
            format: schema,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body_len = body.len(), "Ollama returned error");
            return Err(PipelineError::reasoning_engine(format!(
                "Ollama returned status {}",
                status.as_u16()
            )));
        }

        // The client timeout also covers the body read.
        let text = response.text().map_err(|e| self.transport_error(e))?;
        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            PipelineError::ClassificationContractViolation(format!(
                "unreadable Ollama response envelope: {e}"
            ))
        })?;

        Ok(parsed.response)
    }
}

enum MockReply {
    Text(String),
    Unavailable,
}

/// Mock reasoning engine for testing. Returns a configurable response.
pub struct MockReasoningEngine {
    reply: MockReply,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockReasoningEngine {
    pub fn new(response: &str) -> Self {
        Self {
            reply: MockReply::Text(response.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Engine that always fails as unreachable.
    pub fn unavailable() -> Self {
        Self {
            reply: MockReply::Unavailable,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

impl ReasoningEngine for MockReasoningEngine {
    fn generate(
        &self,
        _model: &str,
        prompt: &str,
        _system: &str,
        _schema: &serde_json::Value,
    ) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Unavailable => Err(PipelineError::reasoning_engine("mock outage")),
        }
    }
}
