//! Drug interaction analysis pipeline.
//!
//! names → batch normalizer → label resolver × N → classifier → aggregator.
//! Every stage reports failures through [`PipelineError`], whose variants form
//! a closed taxonomy: callers can always tell bad input from a transient
//! outage from a defect.

pub mod interactions;
pub mod labels;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod canned_http;

pub use orchestrator::*;

use serde::Serialize;
use thiserror::Error;

/// Largest number of drug names accepted in one batch.
pub const MAX_BATCH_SIZE: usize = 10;

/// Fewest records that can have a pairwise interaction.
pub const MIN_CLASSIFIABLE: usize = 2;

/// External collaborator that failed to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalService {
    LabelSource,
    ReasoningEngine,
}

impl std::fmt::Display for ExternalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LabelSource => write!(f, "Label source"),
            Self::ReasoningEngine => write!(f, "Reasoning engine"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Batch of {requested} drug names exceeds the limit of {limit}")]
    BatchSizeExceeded { requested: usize, limit: usize },

    #[error("At least {required} drugs are needed to classify interactions, got {actual}")]
    InsufficientInput { required: usize, actual: usize },

    #[error("{service} unavailable: {detail}")]
    SourceUnavailable {
        service: ExternalService,
        detail: String,
    },

    #[error("Reasoning engine broke the interaction report contract: {0}")]
    ClassificationContractViolation(String),

    #[error("Interaction report invariant violated: {0}")]
    InvariantViolation(String),
}

/// How a caller should react to a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Fix the request and resubmit.
    ClientInput,
    /// Retry the whole batch later.
    Transient,
    /// An external producer misbehaved; retrying may or may not help.
    Upstream,
    /// A defect in this crate.
    Internal,
}

impl PipelineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidInput(_)
            | Self::BatchSizeExceeded { .. }
            | Self::InsufficientInput { .. } => ErrorClass::ClientInput,
            Self::SourceUnavailable { .. } => ErrorClass::Transient,
            Self::ClassificationContractViolation(_) => ErrorClass::Upstream,
            Self::InvariantViolation(_) => ErrorClass::Internal,
        }
    }

    pub(crate) fn label_source(detail: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            service: ExternalService::LabelSource,
            detail: detail.into(),
        }
    }

    pub(crate) fn reasoning_engine(detail: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            service: ExternalService::ReasoningEngine,
            detail: detail.into(),
        }
    }
}
