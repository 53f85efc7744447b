use std::collections::HashSet;

use super::types::{InteractionReport, RiskTier};
use crate::pipeline::PipelineError;

/// Canonicalize a classified report.
///
/// - Each unordered drug pair appears once per tier; the first occurrence wins.
/// - A pair listed in several tiers is kept only in the most severe one.
/// - All three tiers are present in the result.
///
/// Pure and idempotent. Fails only when the input breaks the classifier's
/// guarantees (blank or identical drug names, a record filed under the wrong
/// tier), which is an upstream defect.
pub fn aggregate(mut raw: InteractionReport) -> Result<InteractionReport, PipelineError> {
    check_preconditions(&raw)?;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut canonical = InteractionReport::new();
    let mut dropped = 0usize;

    for tier in RiskTier::ALL {
        for record in std::mem::take(raw.tier_mut(tier)) {
            if seen.insert(record.pair_key()) {
                canonical.push(record);
            } else {
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "Duplicate interaction pairs removed");
    }

    Ok(canonical)
}

fn check_preconditions(report: &InteractionReport) -> Result<(), PipelineError> {
    for tier in RiskTier::ALL {
        for (i, record) in report.tier(tier).iter().enumerate() {
            let at = format!("{}[{i}]", tier.report_key());
            if record.risk_tier != tier {
                return Err(PipelineError::InvariantViolation(format!(
                    "{at} is tagged {} but filed under {tier}",
                    record.risk_tier
                )));
            }
            if record.drug_a.trim().is_empty() || record.drug_b.trim().is_empty() {
                return Err(PipelineError::InvariantViolation(format!(
                    "{at} has a blank drug name"
                )));
            }
            if record.is_self_pair() {
                return Err(PipelineError::InvariantViolation(format!(
                    "{at} pairs {} with itself",
                    record.drug_a
                )));
            }
        }
    }
    Ok(())
}
