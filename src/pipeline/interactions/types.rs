use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

/// Clinical severity of a drug-pair interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    High,
    Moderate,
    Low,
}

impl RiskTier {
    /// All tiers, most severe first.
    pub const ALL: [RiskTier; 3] = [RiskTier::High, RiskTier::Moderate, RiskTier::Low];

    /// Severity rank: higher is more severe.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 2,
            Self::Moderate => 1,
            Self::Low => 0,
        }
    }

    /// Key of this tier in the serialized report.
    pub fn report_key(self) -> &'static str {
        match self {
            Self::High => "highRisk",
            Self::Moderate => "moderateRisk",
            Self::Low => "lowRisk",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

/// One classified drug pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub drug_a: String,
    pub drug_b: String,
    pub risk_tier: RiskTier,
    pub reason: String,
}

impl InteractionRecord {
    pub fn new(drug_a: &str, drug_b: &str, risk_tier: RiskTier, reason: &str) -> Self {
        Self {
            drug_a: drug_a.to_string(),
            drug_b: drug_b.to_string(),
            risk_tier,
            reason: reason.to_string(),
        }
    }

    /// Unordered, case-insensitive key of the drug pair.
    pub fn pair_key(&self) -> (String, String) {
        let a = self.drug_a.trim().to_lowercase();
        let b = self.drug_b.trim().to_lowercase();
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn is_self_pair(&self) -> bool {
        self.drug_a.trim().to_lowercase() == self.drug_b.trim().to_lowercase()
    }
}

/// Interactions grouped by risk tier.
///
/// All three tiers are always present when serialized, empty or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionReport {
    pub high_risk: Vec<InteractionRecord>,
    pub moderate_risk: Vec<InteractionRecord>,
    pub low_risk: Vec<InteractionRecord>,
}

impl InteractionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&self, tier: RiskTier) -> &[InteractionRecord] {
        match tier {
            RiskTier::High => &self.high_risk,
            RiskTier::Moderate => &self.moderate_risk,
            RiskTier::Low => &self.low_risk,
        }
    }

    pub fn tier_mut(&mut self, tier: RiskTier) -> &mut Vec<InteractionRecord> {
        match tier {
            RiskTier::High => &mut self.high_risk,
            RiskTier::Moderate => &mut self.moderate_risk,
            RiskTier::Low => &mut self.low_risk,
        }
    }

    /// Append a record under the tier named by its `risk_tier`.
    pub fn push(&mut self, record: InteractionRecord) {
        self.tier_mut(record.risk_tier).push(record);
    }

    /// All records, most severe tier first, in tier order.
    pub fn records(&self) -> impl Iterator<Item = &InteractionRecord> {
        RiskTier::ALL.into_iter().flat_map(move |t| self.tier(t).iter())
    }

    pub fn len(&self) -> usize {
        self.high_risk.len() + self.moderate_risk.len() + self.low_risk.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> TierSummary {
        TierSummary {
            high: self.high_risk.len(),
            moderate: self.moderate_risk.len(),
            low: self.low_risk.len(),
            total: self.len(),
        }
    }
}

/// Per-tier interaction counts, as charted by the rendering layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSummary {
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
    pub total: usize,
}

/// Reasoning engine abstraction (allows mocking).
///
/// `schema` is the JSON Schema the response must conform to; engines that
/// support constrained output pass it through. The returned string is
/// untrusted and validated by the caller.
pub trait ReasoningEngine: Send + Sync {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
        schema: &serde_json::Value,
    ) -> Result<String, PipelineError>;
}
