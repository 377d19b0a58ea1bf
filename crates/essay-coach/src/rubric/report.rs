use super::{round1, Criterion, RAW_POINTS_PER_CRITERION, RAW_TOTAL_OUT_OF, TOTAL_OUT_OF};
use serde::{Deserialize, Serialize};

/// Score for one criterion, always expressed against the official maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionScore {
    pub score: f64,
    pub out_of: f64,
    pub band: u8,
    pub raw_score: f64,
}

impl CriterionScore {
    /// Zero score pinned to the criterion's fixed maximum; band 0 marks "not assessed".
    pub fn unassessed(criterion: Criterion) -> Self {
        Self {
            score: 0.0,
            out_of: criterion.out_of(),
            band: 0,
            raw_score: 0.0,
        }
    }

    pub(crate) fn raw_for(score: f64, criterion: Criterion) -> f64 {
        round1(score / criterion.out_of() * RAW_POINTS_PER_CRITERION)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaScores {
    pub ideas_content: CriterionScore,
    pub structure_organization: CriterionScore,
    pub language_vocab: CriterionScore,
    pub spelling_grammar: CriterionScore,
}

impl CriteriaScores {
    pub fn unassessed() -> Self {
        Self {
            ideas_content: CriterionScore::unassessed(Criterion::IdeasContent),
            structure_organization: CriterionScore::unassessed(Criterion::StructureOrganization),
            language_vocab: CriterionScore::unassessed(Criterion::LanguageVocab),
            spelling_grammar: CriterionScore::unassessed(Criterion::SpellingGrammar),
        }
    }

    pub fn get(&self, criterion: Criterion) -> &CriterionScore {
        match criterion {
            Criterion::IdeasContent => &self.ideas_content,
            Criterion::StructureOrganization => &self.structure_organization,
            Criterion::LanguageVocab => &self.language_vocab,
            Criterion::SpellingGrammar => &self.spelling_grammar,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, &CriterionScore)> + '_ {
        Criterion::ordered()
            .into_iter()
            .map(move |criterion| (criterion, self.get(criterion)))
    }

    /// Sum of criterion scores rounded to one decimal.
    pub fn total(&self) -> f64 {
        round1(self.iter().map(|(_, score)| score.score).sum())
    }
}

/// One line of the score summary, e.g. `21.5/30`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub score: f64,
    pub out_of: f64,
    pub display_format: String,
}

impl SummaryLine {
    fn fraction(score: f64, out_of: f64) -> Self {
        Self {
            score,
            out_of,
            display_format: format!("{score}/{out_of}"),
        }
    }

    fn percentage(score: f64) -> Self {
        Self {
            score,
            out_of: 100.0,
            display_format: format!("{score}%"),
        }
    }
}

/// Raw (/16), weighted (/30) and percentage views of the same result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringSummary {
    pub raw_total: SummaryLine,
    pub weighted_total: SummaryLine,
    pub percentage_score: SummaryLine,
}

impl ScoringSummary {
    pub fn from_scores(scores: &CriteriaScores, total_score: f64) -> Self {
        let raw_total = round1(scores.iter().map(|(_, score)| score.raw_score).sum());
        let percentage = round1(total_score / TOTAL_OUT_OF * 100.0);

        Self {
            raw_total: SummaryLine::fraction(raw_total, RAW_TOTAL_OUT_OF),
            weighted_total: SummaryLine::fraction(total_score, TOTAL_OUT_OF),
            percentage_score: SummaryLine::percentage(percentage),
        }
    }
}
