use serde_json::Value;
use tracing::debug;

use super::domain::ScoreReportDraft;

/// Keys the generator must return for its output to be usable.
pub const REQUIRED_KEYS: [&str; 1] = ["criteriaScores"];

/// Keys owned by this engine; anything the generator supplies under them is
/// discarded and recomputed.
pub const DISCARDED_KEYS: [&str; 3] = ["grammarCorrections", "totalScore", "scoringSummary"];

/// Outcome of checking raw generator output against the report schema.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftValidation {
    Valid(Box<ScoreReportDraft>),
    Invalid(String),
}

/// Parse generator content as a JSON object.
pub fn parse_json(content: &str) -> Result<Value, String> {
    let value: Value = serde_json::from_str(content.trim())
        .map_err(|err| format!("response is not valid JSON: {err}"))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("response is not a JSON object".to_string())
    }
}

/// Check required keys, drop engine-owned keys, then deserialize the typed draft.
pub fn validate_draft(mut value: Value) -> DraftValidation {
    let Some(object) = value.as_object_mut() else {
        return DraftValidation::Invalid("response is not a JSON object".to_string());
    };

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| object.get(*key).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return DraftValidation::Invalid(format!(
            "response is missing required keys: {}",
            missing.join(", ")
        ));
    }

    for key in DISCARDED_KEYS {
        if object.remove(key).is_some() {
            debug!(key, "discarded generator-supplied field");
        }
    }

    match serde_json::from_value::<ScoreReportDraft>(value) {
        Ok(draft) => DraftValidation::Valid(Box::new(draft)),
        Err(err) => DraftValidation::Invalid(format!("response does not match the report schema: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn criteria() -> Value {
        json!({
            "ideasContent": { "score": 8, "outOf": 10, "band": 4 },
            "structureOrganization": { "score": 4, "outOf": 6, "band": 4 },
            "languageVocab": { "score": 5, "outOf": 7.5, "band": 4 },
            "spellingGrammar": { "score": 3, "outOf": 4.5, "band": 4 }
        })
    }

    #[test]
    fn rejects_non_json_and_non_objects() {
        assert!(parse_json("Sorry, I cannot help with that.").is_err());
        assert!(parse_json("[1, 2, 3]").is_err());
        assert!(parse_json(" {\"criteriaScores\": {}} ").is_ok());
    }

    #[test]
    fn missing_criteria_is_invalid() {
        let validation = validate_draft(json!({ "overallBand": 4, "highlights": [] }));
        assert!(
            matches!(validation, DraftValidation::Invalid(reason) if reason.contains("criteriaScores"))
        );
    }

    #[test]
    fn incomplete_criteria_is_invalid() {
        let validation = validate_draft(json!({
            "criteriaScores": { "ideasContent": { "score": 8, "outOf": 12 } }
        }));
        assert!(matches!(validation, DraftValidation::Invalid(_)));
    }

    #[test]
    fn valid_draft_keeps_unknown_keys_and_drops_engine_owned_ones() {
        let validation = validate_draft(json!({
            "overallBand": 4,
            "totalScore": 99,
            "criteriaScores": criteria(),
            "grammarCorrections": [{ "original": "x" }],
            "scoringSummary": { "rawTotal": 1 },
            "feedbackCategories": [{ "strengths": [] }]
        }));

        let DraftValidation::Valid(draft) = validation else {
            panic!("expected a valid draft");
        };
        assert_eq!(draft.overall_band, Some(4.0));
        assert_eq!(draft.criteria_scores.ideas_content.out_of, Some(10.0));
        assert!(draft.additional.contains_key("feedbackCategories"));
        assert!(!draft.additional.contains_key("totalScore"));
        assert!(!draft.additional.contains_key("grammarCorrections"));
        assert!(!draft.additional.contains_key("scoringSummary"));
    }
}
