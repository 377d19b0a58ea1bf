use chrono::Utc;

use super::domain::{DetailedFeedback, FallbackReport, GrammarCorrection, NarrativeStructure};
use crate::essay::Essay;
use crate::realtime::{score_text, HeuristicScorers};
use crate::rubric::CriteriaScores;

const BAND_DESCRIPTION: &str = "Unable to generate automated feedback. Please try again.";

/// Report returned when the generative path fails: zeroed rubric scores,
/// the grammar corrections that were found, and a heuristic estimate for
/// the same text.
pub fn fallback_report(
    essay: &Essay,
    grammar_corrections: Vec<GrammarCorrection>,
    scorers: &HeuristicScorers,
    reason: &str,
) -> FallbackReport {
    FallbackReport {
        overall_band: 0,
        total_score: 0.0,
        band_description: BAND_DESCRIPTION.to_string(),
        criteria_scores: CriteriaScores::unassessed(),
        highlights: Vec::new(),
        detailed_feedback: DetailedFeedback {
            strengths: Vec::new(),
            areas_to_improve: vec![
                "Detailed feedback could not be generated. Grammar check results are still available below."
                    .to_string(),
            ],
            next_steps: vec!["Please try submitting your work again.".to_string()],
        },
        grammar_corrections,
        vocabulary_enhancements: Vec::new(),
        narrative_structure: NarrativeStructure {
            structure_notes: "Unable to analyse structure".to_string(),
            ..NarrativeStructure::default()
        },
        error: true,
        error_message: format!("Generative evaluation failed ({reason}); grammar checking results are still available"),
        heuristic_estimate: score_text(scorers, &essay.text, essay.text_type),
        generated_at: Utc::now(),
    }
}
