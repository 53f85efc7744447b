use serde_json::Value;

use super::types::{LabelRecord, LabelSections, LabelSource};
use crate::pipeline::PipelineError;

/// Resolve one drug name to a normalized label record.
///
/// Only the first result the source returns is used. A query with no match
/// yields [`LabelRecord::unknown`], not an error.
pub fn resolve(source: &dyn LabelSource, name: &str) -> Result<LabelRecord, PipelineError> {
    let query = name.trim();
    if query.is_empty() {
        return Err(PipelineError::InvalidInput(
            "drug name must not be empty".into(),
        ));
    }

    let results = source.search_by_brand(query)?;
    let Some(first) = results.first() else {
        tracing::info!(drug = %query, "No label found, continuing with empty record");
        return Ok(LabelRecord::unknown(query));
    };

    if results.len() > 1 {
        tracing::debug!(
            drug = %query,
            results = results.len(),
            "Multiple labels returned, using the first"
        );
    }

    Ok(extract_label(query, first))
}

/// Extract the fixed field subset from one raw label document.
pub fn extract_label(query: &str, label: &Value) -> LabelRecord {
    let query = query.trim().to_string();
    let openfda = label.get("openfda").unwrap_or(&Value::Null);

    let generic_names = string_list(openfda, "generic_name");
    let name = generic_names
        .first()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| query.clone());

    LabelRecord {
        name,
        query,
        generic_name: generic_names.join(", "),
        purpose: string_list(label, "purpose").join("\n\n"),
        description: string_list(label, "description").join("\n\n"),
        interactions_text: string_list(label, "drug_interactions"),
        warnings_text: string_list(label, "warnings"),
        sections: LabelSections {
            brand_name: string_list(openfda, "brand_name"),
            rxcui: string_list(openfda, "rxcui"),
            dosage_and_administration: string_list(label, "dosage_and_administration"),
            indications_and_usage: string_list(label, "indications_and_usage"),
            active_ingredient: string_list(label, "active_ingredient"),
            inactive_ingredient: string_list(label, "inactive_ingredient"),
            storage_and_handling: string_list(label, "storage_and_handling"),
        },
    }
}

/// Read a label field as a list of strings.
///
/// openFDA publishes text fields as string arrays; a bare string is taken as a
/// one-item list. Non-string items and blank strings are skipped, and an
/// absent or mistyped field becomes an empty list.
fn string_list(obj: &Value, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::labels::MockLabelSource;
    use serde_json::json;

    fn tylenol_label() -> Value {
        json!({
            "openfda": {
                "generic_name": ["ACETAMINOPHEN"],
                "brand_name": ["Tylenol"],
                "rxcui": ["209387", "313782"]
            },
            "purpose": ["Pain reliever/fever reducer"],
            "description": ["Acetaminophen tablets 500 mg"],
            "drug_interactions": ["Ask a doctor before use if you are taking warfarin."],
            "warnings": ["Liver warning: severe liver damage may occur."],
            "dosage_and_administration": ["Do not take more than directed."],
            "active_ingredient": ["Acetaminophen 500 mg"],
            "storage_and_handling": ["Store at 20-25C"]
        })
    }

    #[test]
    fn extracts_all_fields() {
        let record = extract_label("Tylenol", &tylenol_label());
        assert_eq!(record.name, "ACETAMINOPHEN");
        assert_eq!(record.query, "Tylenol");
        assert_eq!(record.generic_name, "ACETAMINOPHEN");
        assert_eq!(record.purpose, "Pain reliever/fever reducer");
        assert_eq!(record.description, "Acetaminophen tablets 500 mg");
        assert_eq!(record.interactions_text.len(), 1);
        assert!(record.warnings_text[0].starts_with("Liver warning"));
        assert_eq!(record.sections.rxcui, vec!["209387", "313782"]);
        assert_eq!(record.sections.brand_name, vec!["Tylenol"]);
        assert!(record.sections.inactive_ingredient.is_empty());
        assert!(record.sections.indications_and_usage.is_empty());
    }

    #[test]
    fn missing_generic_name_falls_back_to_query() {
        let label = json!({ "purpose": ["Antacid"] });
        let record = extract_label(" Tums ", &label);
        assert_eq!(record.name, "Tums");
        assert_eq!(record.generic_name, "");
        assert_eq!(record.purpose, "Antacid");
    }

    #[test]
    fn multiple_generic_names_are_joined() {
        let label = json!({ "openfda": { "generic_name": ["IBUPROFEN", "DIPHENHYDRAMINE"] } });
        let record = extract_label("Advil PM", &label);
        assert_eq!(record.name, "IBUPROFEN");
        assert_eq!(record.generic_name, "IBUPROFEN, DIPHENHYDRAMINE");
    }

    #[test]
    fn tolerates_scalar_and_mistyped_fields() {
        let label = json!({
            "purpose": "Sleep aid",
            "warnings": [1, "Do not drive", null, "  "],
            "drug_interactions": {"unexpected": true}
        });
        let record = extract_label("ZzzQuil", &label);
        assert_eq!(record.purpose, "Sleep aid");
        assert_eq!(record.warnings_text, vec!["Do not drive"]);
        assert!(record.interactions_text.is_empty());
    }

    #[test]
    fn no_match_yields_empty_record_not_error() {
        let source = MockLabelSource::new();
        let record = resolve(&source, "Tylenol").unwrap();
        assert_eq!(record, LabelRecord::unknown("Tylenol"));
        assert_eq!(record.name, "Tylenol");
        assert_eq!(record.generic_name, "");
        assert_eq!(record.purpose, "");
        assert!(record.interactions_text.is_empty());
        assert!(record.warnings_text.is_empty());
    }

    #[test]
    fn first_result_wins() {
        let second = json!({ "openfda": { "generic_name": ["SECOND"] } });
        let source =
            MockLabelSource::new().with_results("Tylenol", vec![tylenol_label(), second]);
        let record = resolve(&source, "Tylenol").unwrap();
        assert_eq!(record.name, "ACETAMINOPHEN");
    }

    #[test]
    fn blank_name_is_rejected_before_lookup() {
        let source = MockLabelSource::new();
        let err = resolve(&source, "   ").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert_eq!(source.call_count(), 0);
    }

    #[test]
    fn outage_is_not_treated_as_not_found() {
        let source = MockLabelSource::new().with_outage("Tylenol");
        let err = resolve(&source, "Tylenol").unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
    }

    #[test]
    fn query_is_trimmed_before_lookup() {
        let source = MockLabelSource::new().with_results("Tylenol", vec![tylenol_label()]);
        let record = resolve(&source, "  Tylenol\t").unwrap();
        assert_eq!(record.query, "Tylenol");
        assert!(!record.is_unknown());
    }
}
