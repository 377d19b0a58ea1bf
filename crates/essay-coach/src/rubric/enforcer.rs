use super::report::{CriteriaScores, CriterionScore, ScoringSummary};
use super::{band_for_fraction, clamp_band, round1, Criterion, TOTAL_OUT_OF};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Criterion score exactly as the generator reported it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionDraft {
    pub score: f64,
    #[serde(default)]
    pub out_of: Option<f64>,
    #[serde(default)]
    pub band: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaDraft {
    pub ideas_content: CriterionDraft,
    pub structure_organization: CriterionDraft,
    pub language_vocab: CriterionDraft,
    pub spelling_grammar: CriterionDraft,
}

impl CriteriaDraft {
    fn get(&self, criterion: Criterion) -> &CriterionDraft {
        match criterion {
            Criterion::IdeasContent => &self.ideas_content,
            Criterion::StructureOrganization => &self.structure_organization,
            Criterion::LanguageVocab => &self.language_vocab,
            Criterion::SpellingGrammar => &self.spelling_grammar,
        }
    }
}

/// Rubric-compliant scores derived from a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcedScores {
    pub criteria_scores: CriteriaScores,
    pub total_score: f64,
    pub overall_band: u8,
    pub scoring_summary: ScoringSummary,
}

/// Pins every criterion to its official maximum, rescaling proportionally when
/// the generator used a different one, then recomputes totals and summary.
///
/// Runs unconditionally: a draft that already matches the rubric passes
/// through with its scores intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct RubricEnforcer;

impl RubricEnforcer {
    pub fn enforce(&self, draft: &CriteriaDraft, overall_band: Option<f64>) -> EnforcedScores {
        let criteria_scores = CriteriaScores {
            ideas_content: normalize(Criterion::IdeasContent, draft.get(Criterion::IdeasContent)),
            structure_organization: normalize(
                Criterion::StructureOrganization,
                draft.get(Criterion::StructureOrganization),
            ),
            language_vocab: normalize(
                Criterion::LanguageVocab,
                draft.get(Criterion::LanguageVocab),
            ),
            spelling_grammar: normalize(
                Criterion::SpellingGrammar,
                draft.get(Criterion::SpellingGrammar),
            ),
        };

        let total_score = criteria_scores.total();
        let overall_band = overall_band
            .and_then(clamp_band)
            .unwrap_or_else(|| band_for_fraction(total_score / TOTAL_OUT_OF));
        let scoring_summary = ScoringSummary::from_scores(&criteria_scores, total_score);

        debug!(total_score, overall_band, "rubric enforcement complete");

        EnforcedScores {
            criteria_scores,
            total_score,
            overall_band,
            scoring_summary,
        }
    }
}

fn normalize(criterion: Criterion, draft: &CriterionDraft) -> CriterionScore {
    let fixed = criterion.out_of();
    let reported = if draft.score.is_finite() {
        draft.score
    } else {
        0.0
    };

    let rescaled = match draft.out_of {
        Some(out_of) if out_of == fixed => reported,
        Some(out_of) if out_of.is_finite() && out_of > 0.0 => {
            let rescaled = round1(reported / out_of * fixed);
            warn!(
                criterion = criterion.key(),
                reported,
                reported_out_of = out_of,
                fixed_out_of = fixed,
                rescaled,
                "generator used a non-standard maximum; rescaling"
            );
            rescaled
        }
        Some(out_of) => {
            warn!(
                criterion = criterion.key(),
                reported_out_of = out_of,
                "generator reported an unusable maximum; reading score on the official scale"
            );
            reported
        }
        None => reported,
    };

    let score = rescaled.clamp(0.0, fixed);
    if score != rescaled {
        warn!(
            criterion = criterion.key(),
            rescaled, score, "criterion score outside 0..=outOf; clamped"
        );
    }

    let band = draft
        .band
        .and_then(clamp_band)
        .unwrap_or_else(|| band_for_fraction(score / fixed));

    CriterionScore {
        score,
        out_of: fixed,
        band,
        raw_score: CriterionScore::raw_for(score, criterion),
    }
}
