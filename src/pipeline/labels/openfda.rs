use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::Deserialize;

use super::types::LabelSource;
use crate::pipeline::PipelineError;

/// Public openFDA API host.
pub const OPENFDA_DEFAULT_URL: &str = "https://api.fda.gov";

/// openFDA drug label client.
pub struct OpenFdaClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenFdaClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
            timeout_secs,
        })
    }

    fn label_url(&self) -> String {
        format!("{}/drug/label.json", self.base_url)
    }

    fn transport_error(&self, e: reqwest::Error) -> PipelineError {
        if e.is_timeout() {
            PipelineError::label_source(format!("request timed out after {}s", self.timeout_secs))
        } else if e.is_connect() {
            PipelineError::label_source(format!("cannot connect to {}", self.base_url))
        } else {
            PipelineError::label_source(e.to_string())
        }
    }
}

/// Build the openFDA search expression for an exact brand-name match.
pub fn brand_name_search(brand_name: &str) -> String {
    let escaped = brand_name.trim().replace('\\', "\\\\").replace('"', "\\\"");
    format!("openfda.brand_name:\"{escaped}\"")
}

/// Response body from `/drug/label.json`
#[derive(Deserialize)]
struct LabelSearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

impl LabelSource for OpenFdaClient {
    fn search_by_brand(&self, brand_name: &str) -> Result<Vec<serde_json::Value>, PipelineError> {
        let search = brand_name_search(brand_name);
        let mut params: Vec<(&str, &str)> = vec![("search", search.as_str()), ("limit", "1")];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("api_key", key));
        }

        let started = Instant::now();
        let response = self
            .client
            .get(self.label_url())
            .query(&params)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        tracing::debug!(
            drug = %brand_name,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "openFDA label lookup"
        );

        // openFDA answers "no matches" with 404.
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(PipelineError::label_source(format!(
                "openFDA returned status {}",
                status.as_u16()
            )));
        }

        let text = response.text().map_err(|e| self.transport_error(e))?;
        let parsed: LabelSearchResponse = serde_json::from_str(&text)
            .map_err(|e| PipelineError::label_source(format!("unreadable openFDA body: {e}")))?;

        Ok(parsed.results)
    }
}

/// In-memory label source for tests and offline runs.
#[derive(Default)]
pub struct MockLabelSource {
    labels: HashMap<String, Vec<serde_json::Value>>,
    unavailable: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockLabelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the raw results returned for a brand name (case-insensitive).
    pub fn with_results(mut self, brand_name: &str, results: Vec<serde_json::Value>) -> Self {
        self.labels.insert(key(brand_name), results);
        self
    }

    /// Register a single openFDA-shaped label for a brand name.
    pub fn with_label(
        self,
        brand_name: &str,
        generic_name: &str,
        interactions: &[&str],
        warnings: &[&str],
    ) -> Self {
        let label = serde_json::json!({
            "openfda": {
                "brand_name": [brand_name],
                "generic_name": [generic_name],
            },
            "purpose": [format!("{generic_name} purpose")],
            "drug_interactions": interactions,
            "warnings": warnings,
        });
        self.with_results(brand_name, vec![label])
    }

    /// Make lookups for this brand name fail as if the source were down.
    pub fn with_outage(mut self, brand_name: &str) -> Self {
        self.unavailable.insert(key(brand_name));
        self
    }

    /// Delay lookups for this brand name.
    pub fn with_delay(mut self, brand_name: &str, delay: Duration) -> Self {
        self.delays.insert(key(brand_name), delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn key(brand_name: &str) -> String {
    brand_name.trim().to_lowercase()
}

impl LabelSource for MockLabelSource {
    fn search_by_brand(&self, brand_name: &str) -> Result<Vec<serde_json::Value>, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let k = key(brand_name);
        if let Some(delay) = self.delays.get(&k) {
            std::thread::sleep(*delay);
        }
        if self.unavailable.contains(&k) {
            return Err(PipelineError::label_source("mock outage"));
        }
        Ok(self.labels.get(&k).cloned().unwrap_or_default())
    }
}
