use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::metrics::TextMetrics;
use super::scorers::{HeuristicScorers, LevelComponent};
use super::thresholds::MAX_LEVEL;
use crate::essay::TextType;
use crate::rubric::{round1, round2, Criterion, TOTAL_OUT_OF};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionLevels {
    pub ideas_content: u8,
    pub structure_organization: u8,
    pub vocabulary_language: u8,
    pub grammar_mechanics: u8,
}

impl CriterionLevels {
    pub fn get(&self, criterion: Criterion) -> u8 {
        match criterion {
            Criterion::IdeasContent => self.ideas_content,
            Criterion::StructureOrganization => self.structure_organization,
            Criterion::LanguageVocab => self.vocabulary_language,
            Criterion::SpellingGrammar => self.grammar_mechanics,
        }
    }
}

/// One criterion's level converted onto its rubric maximum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionBreakdown {
    pub criterion: Criterion,
    pub label: &'static str,
    pub level: u8,
    pub score: f64,
    pub out_of: f64,
    pub weight_percent: f64,
    pub notes: Vec<String>,
}

/// Immutable result of one debounced heuristic evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeScoreSnapshot {
    pub levels: CriterionLevels,
    /// Weight-percent mean of the four 1-4 levels.
    pub weighted_score: f64,
    pub total_out_of_30: f64,
    pub percentage: f64,
    pub breakdown: Vec<CriterionBreakdown>,
    pub word_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl RealtimeScoreSnapshot {
    pub fn from_components(
        components: [LevelComponent; 4],
        word_count: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let level_of = |criterion: Criterion| {
            components
                .iter()
                .find(|component| component.criterion == criterion)
                .map(|component| component.level)
                .unwrap_or(0)
        };
        let levels = CriterionLevels {
            ideas_content: level_of(Criterion::IdeasContent),
            structure_organization: level_of(Criterion::StructureOrganization),
            vocabulary_language: level_of(Criterion::LanguageVocab),
            grammar_mechanics: level_of(Criterion::SpellingGrammar),
        };

        let mut weighted = 0.0;
        let mut total = 0.0;
        let breakdown = components
            .into_iter()
            .map(|component| {
                let weighting = component.criterion.weighting();
                let attained = f64::from(component.level) / f64::from(MAX_LEVEL) * weighting.out_of;
                weighted += f64::from(component.level) * weighting.weight_percent / 100.0;
                total += attained;

                CriterionBreakdown {
                    criterion: component.criterion,
                    label: component.criterion.label(),
                    level: component.level,
                    score: round1(attained),
                    out_of: weighting.out_of,
                    weight_percent: weighting.weight_percent,
                    notes: component.notes,
                }
            })
            .collect();

        let total_out_of_30 = round1(total);
        Self {
            levels,
            weighted_score: round2(weighted),
            total_out_of_30,
            percentage: round1(total_out_of_30 / TOTAL_OUT_OF * 100.0),
            breakdown,
            word_count,
            timestamp,
        }
    }
}

/// Either a snapshot or the sentinel for empty text; zero is a real score,
/// "no score" is not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RealtimeScore {
    NoScore,
    Scored(RealtimeScoreSnapshot),
}

impl RealtimeScore {
    pub fn snapshot(&self) -> Option<&RealtimeScoreSnapshot> {
        match self {
            Self::NoScore => None,
            Self::Scored(snapshot) => Some(snapshot),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreChange {
    pub criterion: Criterion,
    pub old_score: u8,
    pub new_score: u8,
    pub direction: ScoreDirection,
}

/// What a single evaluation produced: the score plus any level movements.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeUpdate {
    pub score: RealtimeScore,
    pub changes: Vec<ScoreChange>,
}

/// Score `text` once, without any history.
pub fn score_text(scorers: &HeuristicScorers, text: &str, text_type: TextType) -> RealtimeScore {
    if text.trim().is_empty() {
        return RealtimeScore::NoScore;
    }

    let metrics = TextMetrics::analyze(text);
    let components = scorers.score_all(&metrics, text_type);
    RealtimeScore::Scored(RealtimeScoreSnapshot::from_components(
        components,
        metrics.word_count,
        Utc::now(),
    ))
}

/// Criteria whose level moved between two snapshots, in rubric order.
pub fn compare_snapshots(
    previous: &RealtimeScoreSnapshot,
    current: &RealtimeScoreSnapshot,
) -> Vec<ScoreChange> {
    Criterion::ordered()
        .into_iter()
        .filter_map(|criterion| {
            let old_score = previous.levels.get(criterion);
            let new_score = current.levels.get(criterion);
            let direction = match new_score.cmp(&old_score) {
                std::cmp::Ordering::Greater => ScoreDirection::Up,
                std::cmp::Ordering::Less => ScoreDirection::Down,
                std::cmp::Ordering::Equal => return None,
            };
            Some(ScoreChange {
                criterion,
                old_score,
                new_score,
                direction,
            })
        })
        .collect()
}

/// Keeps the previous snapshot of one editing session and diffs each new
/// evaluation against it.
#[derive(Debug, Default)]
pub struct RealtimeScoreAggregator {
    scorers: HeuristicScorers,
    previous: Option<RealtimeScoreSnapshot>,
}

impl RealtimeScoreAggregator {
    pub fn new(scorers: HeuristicScorers) -> Self {
        Self {
            scorers,
            previous: None,
        }
    }

    pub fn previous(&self) -> Option<&RealtimeScoreSnapshot> {
        self.previous.as_ref()
    }

    pub fn update(&mut self, text: &str, text_type: TextType) -> RealtimeUpdate {
        let score = score_text(&self.scorers, text, text_type);

        let changes = match (&self.previous, score.snapshot()) {
            (Some(previous), Some(current)) => compare_snapshots(previous, current),
            _ => Vec::new(),
        };
        self.previous = score.snapshot().cloned();

        debug!(
            scored = self.previous.is_some(),
            total = self.previous.as_ref().map(|snapshot| snapshot.total_out_of_30),
            changes = changes.len(),
            "realtime score updated"
        );

        RealtimeUpdate { score, changes }
    }
}
