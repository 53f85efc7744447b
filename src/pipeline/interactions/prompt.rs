use serde_json::{json, Value};

use super::sanitize::sanitize_label_text;
use crate::pipeline::labels::LabelRecord;

pub const INTERACTION_SYSTEM_PROMPT: &str = r#"
You are a clinical pharmacology assistant. Your ONLY role is to assess
pairwise interactions between the drugs you are given, using the label
excerpts supplied with each drug.

RULES (ABSOLUTE, NO EXCEPTIONS):
1. Consider every unordered pair of distinct drugs at most once.
2. Never pair a drug with itself.
3. Use each drug's name exactly as written in its "Drug:" line.
4. Classify each interacting pair into exactly one tier:
   highRisk (avoid the combination or requires close monitoring),
   moderateRisk (use with caution or adjust dosing),
   lowRisk (minor or theoretical interaction).
5. Omit pairs with no known interaction.
6. Give a short, plain-language reason for every pair.
7. Output ONLY a JSON object with exactly the keys "highRisk", "moderateRisk"
   and "lowRisk". Each is an array of {"drugA", "drugB", "reason"} objects.
   No other keys, no prose, no markdown.
"#;

/// JSON Schema of the interaction report the reasoning engine must produce.
pub fn interaction_report_schema() -> Value {
    let pair = json!({
        "type": "object",
        "properties": {
            "drugA": { "type": "string" },
            "drugB": { "type": "string" },
            "reason": { "type": "string" }
        },
        "required": ["drugA", "drugB", "reason"],
        "additionalProperties": false
    });

    json!({
        "type": "object",
        "properties": {
            "highRisk": { "type": "array", "items": pair.clone() },
            "moderateRisk": { "type": "array", "items": pair.clone() },
            "lowRisk": { "type": "array", "items": pair }
        },
        "required": ["highRisk", "moderateRisk", "lowRisk"],
        "additionalProperties": false
    })
}

/// Build the classification prompt for a batch of label records.
pub fn build_interaction_prompt(records: &[LabelRecord]) -> String {
    let summaries = records
        .iter()
        .enumerate()
        .map(|(i, record)| drug_summary(i + 1, record))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"<drugs>
{summaries}
</drugs>

Assess every pair of the {count} drugs above and answer with the JSON object
described in your instructions."#,
        count = records.len()
    )
}

fn drug_summary(index: usize, record: &LabelRecord) -> String {
    let mut out = format!("{index}. Drug: {}", sanitize_label_text(&record.name));

    if record.is_unknown() {
        out.push_str("\n   No label data found for this drug.");
        return out;
    }

    if !record.generic_name.is_empty() {
        out.push_str(&format!(
            "\n   Generic name: {}",
            sanitize_label_text(&record.generic_name)
        ));
    }
    push_section(&mut out, "Purpose", &record.purpose);
    push_section(&mut out, "Interactions", &record.interactions_text.join(" "));
    push_section(&mut out, "Warnings", &record.warnings_text.join(" "));
    out
}

fn push_section(out: &mut String, heading: &str, text: &str) {
    let cleaned = sanitize_label_text(text);
    let body = if cleaned.is_empty() {
        "not listed".to_string()
    } else {
        cleaned
    };
    out.push_str(&format!("\n   {heading}: {body}"));
}
