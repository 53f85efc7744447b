use std::sync::Arc;
use std::time::Instant;

use super::parser::parse_interaction_response;
use super::prompt::{build_interaction_prompt, interaction_report_schema, INTERACTION_SYSTEM_PROMPT};
use super::types::{InteractionReport, ReasoningEngine, RiskTier};
use crate::pipeline::labels::LabelRecord;
use crate::pipeline::{PipelineError, MIN_CLASSIFIABLE};

/// Submits normalized label records to the reasoning engine and validates
/// the answer into a raw (pre-aggregation) report.
///
/// One engine call per classification, no retries: classification is not
/// deterministic, and retry policy belongs to the caller.
pub struct InteractionClassifier {
    engine: Arc<dyn ReasoningEngine>,
    model_name: String,
}

impl InteractionClassifier {
    pub fn new(engine: Arc<dyn ReasoningEngine>, model_name: &str) -> Self {
        Self {
            engine,
            model_name: model_name.to_string(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn classify(&self, records: &[LabelRecord]) -> Result<InteractionReport, PipelineError> {
        if records.len() < MIN_CLASSIFIABLE {
            return Err(PipelineError::InsufficientInput {
                required: MIN_CLASSIFIABLE,
                actual: records.len(),
            });
        }

        let _span = tracing::info_span!(
            "classify_interactions",
            drugs = records.len(),
            model = %self.model_name
        )
        .entered();

        let prompt = build_interaction_prompt(records);
        let schema = interaction_report_schema();

        let started = Instant::now();
        let response =
            self.engine
                .generate(&self.model_name, &prompt, INTERACTION_SYSTEM_PROMPT, &schema)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let mut report = parse_interaction_response(&response).inspect_err(|e| {
            tracing::warn!(
                error = %e,
                response_len = response.len(),
                elapsed_ms,
                "Reasoning engine response rejected"
            );
        })?;

        drop_self_pairs(&mut report);

        let summary = report.summary();
        tracing::info!(
            high = summary.high,
            moderate = summary.moderate,
            low = summary.low,
            elapsed_ms,
            "Interactions classified"
        );

        Ok(report)
    }
}

/// Remove entries pairing a drug with itself; they carry no information and
/// violate the distinct-pair invariant.
fn drop_self_pairs(report: &mut InteractionReport) {
    for tier in RiskTier::ALL {
        let entries = report.tier_mut(tier);
        let before = entries.len();
        entries.retain(|r| !r.is_self_pair());
        let dropped = before - entries.len();
        if dropped > 0 {
            tracing::warn!(tier = %tier, dropped, "Self-pair interactions dropped");
        }
    }
}
