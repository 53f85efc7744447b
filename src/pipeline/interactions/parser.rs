use serde::Deserialize;

use super::types::{InteractionRecord, InteractionReport, RiskTier};
use crate::pipeline::PipelineError;

/// Validate the reasoning engine's answer against the report contract.
///
/// The answer must be a single JSON object, bare or inside one ```json
/// fence, with exactly the keys `highRisk`, `moderateRisk` and `lowRisk`,
/// each an array of `{drugA, drugB, reason}` string triples. Any deviation
/// is a [`PipelineError::ClassificationContractViolation`]; nothing is
/// coerced or guessed.
pub fn parse_interaction_response(response: &str) -> Result<InteractionReport, PipelineError> {
    let body = extract_json_body(response)?;

    let raw: RawReport = serde_json::from_str(body)
        .map_err(|e| PipelineError::ClassificationContractViolation(e.to_string()))?;

    let mut report = InteractionReport::new();
    for (tier, pairs) in [
        (RiskTier::High, raw.high_risk),
        (RiskTier::Moderate, raw.moderate_risk),
        (RiskTier::Low, raw.low_risk),
    ] {
        for (i, pair) in pairs.into_iter().enumerate() {
            let drug_a = pair.drug_a.trim();
            let drug_b = pair.drug_b.trim();
            if drug_a.is_empty() || drug_b.is_empty() {
                return Err(PipelineError::ClassificationContractViolation(format!(
                    "{}[{i}] has a blank drug name",
                    tier.report_key()
                )));
            }
            report.push(InteractionRecord::new(drug_a, drug_b, tier, pair.reason.trim()));
        }
    }

    Ok(report)
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReport {
    #[serde(rename = "highRisk")]
    high_risk: Vec<RawPair>,
    #[serde(rename = "moderateRisk")]
    moderate_risk: Vec<RawPair>,
    #[serde(rename = "lowRisk")]
    low_risk: Vec<RawPair>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPair {
    #[serde(rename = "drugA")]
    drug_a: String,
    #[serde(rename = "drugB")]
    drug_b: String,
    reason: String,
}

/// Locate the JSON text: the whole answer, or the body of a single fence
/// that makes up the whole answer.
fn extract_json_body(response: &str) -> Result<&str, PipelineError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::ClassificationContractViolation(
            "empty response".into(),
        ));
    }

    let Some(after_open) = trimmed.strip_prefix("```") else {
        return Ok(trimmed);
    };
    let after_tag = after_open.strip_prefix("json").unwrap_or(after_open);
    let inner = after_tag.strip_suffix("```").ok_or_else(|| {
        PipelineError::ClassificationContractViolation(
            "fenced block is unclosed or followed by other text".into(),
        )
    })?;
    if inner.contains("```") {
        return Err(PipelineError::ClassificationContractViolation(
            "more than one fenced block".into(),
        ));
    }
    Ok(inner.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(response: &str) -> String {
        match parse_interaction_response(response) {
            Err(PipelineError::ClassificationContractViolation(msg)) => msg,
            other => panic!("expected contract violation, got {other:?}"),
        }
    }

    #[test]
    fn parses_well_formed_report() {
        let response = r#"{
            "highRisk": [{"drugA": "Warfarin", "drugB": "Aspirin", "reason": "Bleeding"}],
            "moderateRisk": [],
            "lowRisk": [{"drugA": "Tylenol", "drugB": "Advil", "reason": " Minor "}]
        }"#;
        let report = parse_interaction_response(response).unwrap();
        assert_eq!(report.high_risk.len(), 1);
        assert_eq!(report.high_risk[0].risk_tier, RiskTier::High);
        assert_eq!(report.high_risk[0].drug_a, "Warfarin");
        assert!(report.moderate_risk.is_empty());
        assert_eq!(report.low_risk[0].risk_tier, RiskTier::Low);
        assert_eq!(report.low_risk[0].reason, "Minor");
    }

    #[test]
    fn accepts_single_fenced_block() {
        let response = "```json\n{\"highRisk\": [], \"moderateRisk\": [], \"lowRisk\": []}\n```";
        let report = parse_interaction_response(response).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn scalar_tier_is_violation() {
        let msg = violation(r#"{"highRisk": "none", "moderateRisk": [], "lowRisk": []}"#);
        assert!(msg.contains("invalid type"));
    }

    #[test]
    fn missing_tier_is_violation() {
        let msg = violation(r#"{"highRisk": [], "moderateRisk": []}"#);
        assert!(msg.contains("lowRisk"));
    }

    #[test]
    fn extra_top_level_key_is_violation() {
        violation(r#"{"highRisk": [], "moderateRisk": [], "lowRisk": [], "notes": "x"}"#);
    }

    #[test]
    fn item_with_extra_field_is_violation() {
        violation(
            r#"{"highRisk": [{"drugA": "A", "drugB": "B", "reason": "r", "severity": 9}],
                "moderateRisk": [], "lowRisk": []}"#,
        );
    }

    #[test]
    fn item_missing_reason_is_violation() {
        violation(r#"{"highRisk": [{"drugA": "A", "drugB": "B"}], "moderateRisk": [], "lowRisk": []}"#);
    }

    #[test]
    fn non_string_drug_is_violation() {
        violation(
            r#"{"highRisk": [{"drugA": 1, "drugB": "B", "reason": "r"}], "moderateRisk": [], "lowRisk": []}"#,
        );
    }

    #[test]
    fn blank_drug_name_is_violation() {
        let msg = violation(
            r#"{"highRisk": [], "moderateRisk": [{"drugA": "  ", "drugB": "B", "reason": "r"}], "lowRisk": []}"#,
        );
        assert!(msg.contains("moderateRisk[0]"));
    }

    #[test]
    fn prose_is_violation() {
        violation("The combination of warfarin and aspirin is dangerous.");
    }

    #[test]
    fn prose_around_fence_is_violation() {
        violation("Here you go:\n```json\n{\"highRisk\": [], \"moderateRisk\": [], \"lowRisk\": []}\n```");
        violation("```json\n{\"highRisk\": [], \"moderateRisk\": [], \"lowRisk\": []}\n```\nHope this helps");
    }

    #[test]
    fn empty_response_is_violation() {
        assert_eq!(violation("   "), "empty response");
    }

    #[test]
    fn top_level_array_is_violation() {
        violation("[]");
    }
}
