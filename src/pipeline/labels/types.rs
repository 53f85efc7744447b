use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

/// Normalized label data for one drug query.
///
/// `name` is never empty: it is the first generic name the label source
/// reports, or the trimmed query when the source has none. Every other field
/// defaults to empty rather than being absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRecord {
    pub name: String,
    /// The trimmed query string this record was resolved from.
    pub query: String,
    pub generic_name: String,
    pub purpose: String,
    pub description: String,
    /// Free-text interaction warnings, in published order.
    pub interactions_text: Vec<String>,
    pub warnings_text: Vec<String>,
    #[serde(default)]
    pub sections: LabelSections,
}

/// Remaining label fields, kept verbatim for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSections {
    pub brand_name: Vec<String>,
    pub rxcui: Vec<String>,
    pub dosage_and_administration: Vec<String>,
    pub indications_and_usage: Vec<String>,
    pub active_ingredient: Vec<String>,
    pub inactive_ingredient: Vec<String>,
    pub storage_and_handling: Vec<String>,
}

impl LabelSections {
    pub fn is_empty(&self) -> bool {
        self.brand_name.is_empty()
            && self.rxcui.is_empty()
            && self.dosage_and_administration.is_empty()
            && self.indications_and_usage.is_empty()
            && self.active_ingredient.is_empty()
            && self.inactive_ingredient.is_empty()
            && self.storage_and_handling.is_empty()
    }
}

impl LabelRecord {
    /// Record for a query the label source has no match for.
    pub fn unknown(query: &str) -> Self {
        let query = query.trim().to_string();
        Self {
            name: query.clone(),
            query,
            generic_name: String::new(),
            purpose: String::new(),
            description: String::new(),
            interactions_text: Vec::new(),
            warnings_text: Vec::new(),
            sections: LabelSections::default(),
        }
    }

    /// True when the label source contributed nothing to this record.
    pub fn is_unknown(&self) -> bool {
        self.generic_name.is_empty()
            && self.purpose.is_empty()
            && self.description.is_empty()
            && self.interactions_text.is_empty()
            && self.warnings_text.is_empty()
            && self.sections.is_empty()
    }

    /// Case-insensitive identity used to compare records within a batch.
    pub fn identity(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// External label database, queried by brand name.
///
/// Implementations return the source's raw result documents in source order.
/// An empty vector means "no match" and is not an error; transport failures
/// and timeouts must surface as `PipelineError::SourceUnavailable`.
pub trait LabelSource: Send + Sync {
    fn search_by_brand(&self, brand_name: &str) -> Result<Vec<serde_json::Value>, PipelineError>;
}
