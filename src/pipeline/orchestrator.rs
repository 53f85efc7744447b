//! End-to-end interaction analysis.
//!
//! Owns the label source and classifier and runs the stages in order:
//! normalize the batch, apply the unknown-drug policy, classify, aggregate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::interactions::{aggregate, InteractionClassifier, InteractionReport, TierSummary};
use super::labels::{normalize_batch, resolve, LabelRecord, LabelSource};
use super::{PipelineError, MIN_CLASSIFIABLE};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// What to do with drugs the label source has never heard of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownDrugPolicy {
    /// Report them as unresolved and classify the rest.
    #[default]
    Exclude,
    /// Classify them anyway, marked as having no label data.
    Include,
}

impl std::str::FromStr for UnknownDrugPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "include" => Ok(Self::Include),
            other => Err(format!("expected 'exclude' or 'include', got '{other}'")),
        }
    }
}

/// Result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionAnalysis {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Records that went to the classifier, in submission order.
    pub drugs: Vec<LabelRecord>,
    /// Queries the label source had no match for and that were left out.
    pub unresolved: Vec<String>,
    pub interactions: InteractionReport,
    pub summary: TierSummary,
    pub model: String,
}

// ═══════════════════════════════════════════════════════════
// Pipeline
// ═══════════════════════════════════════════════════════════

pub struct InteractionPipeline {
    source: Arc<dyn LabelSource>,
    classifier: InteractionClassifier,
    policy: UnknownDrugPolicy,
}

impl InteractionPipeline {
    pub fn new(
        source: Arc<dyn LabelSource>,
        classifier: InteractionClassifier,
        policy: UnknownDrugPolicy,
    ) -> Self {
        Self {
            source,
            classifier,
            policy,
        }
    }

    pub fn model_name(&self) -> &str {
        self.classifier.model_name()
    }

    pub fn policy(&self) -> UnknownDrugPolicy {
        self.policy
    }

    /// Look up a single drug's label.
    pub fn search(&self, name: &str) -> Result<LabelRecord, PipelineError> {
        let _span = tracing::info_span!("search_drug", query = %name.trim()).entered();
        let record = resolve(self.source.as_ref(), name)?;
        if record.is_unknown() {
            tracing::info!("No label found");
        }
        Ok(record)
    }

    /// Resolve, classify and aggregate a batch of drug names.
    ///
    /// Blocking: performs network I/O on the calling thread.
    pub fn analyze(&self, names: &[String]) -> Result<InteractionAnalysis, PipelineError> {
        let id = Uuid::new_v4();
        let _span = tracing::info_span!("analyze", analysis_id = %id, drugs = names.len()).entered();

        let records = normalize_batch(self.source.as_ref(), names)?;
        let (drugs, unresolved) = self.apply_policy(records);

        if !unresolved.is_empty() {
            tracing::info!(count = unresolved.len(), "Drugs without label data excluded");
        }
        if drugs.len() < MIN_CLASSIFIABLE {
            return Err(PipelineError::InsufficientInput {
                required: MIN_CLASSIFIABLE,
                actual: drugs.len(),
            });
        }

        let raw = self.classifier.classify(&drugs)?;
        let interactions = aggregate(raw)?;
        let summary = interactions.summary();

        tracing::info!(
            high = summary.high,
            moderate = summary.moderate,
            low = summary.low,
            "Analysis complete"
        );

        Ok(InteractionAnalysis {
            id,
            generated_at: Utc::now(),
            drugs,
            unresolved,
            interactions,
            summary,
            model: self.classifier.model_name().to_string(),
        })
    }

    fn apply_policy(&self, records: Vec<LabelRecord>) -> (Vec<LabelRecord>, Vec<String>) {
        match self.policy {
            UnknownDrugPolicy::Include => (records, Vec::new()),
            UnknownDrugPolicy::Exclude => {
                let (unknown, known): (Vec<_>, Vec<_>) =
                    records.into_iter().partition(LabelRecord::is_unknown);
                (known, unknown.into_iter().map(|r| r.query).collect())
            }
        }
    }
}
