use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::realtime::RealtimeScore;
use crate::rubric::{CriteriaDraft, CriteriaScores, ScoringSummary};

/// Character span inside the essay, `start <= end <= len`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_within(&self, text_len: usize) -> bool {
        self.start <= self.end && self.end <= text_len
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightKind {
    Strength,
    Improvement,
    #[default]
    #[serde(other)]
    Suggestion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeforeAfter {
    pub before: String,
    pub after: String,
}

/// Annotated span of essay text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: HighlightKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub start_index: usize,
    #[serde(default)]
    pub end_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_after: Option<BeforeAfter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionKind {
    SpellingError,
    StyleWarning,
    GrammarError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionSeverity {
    Error,
    Warning,
}

/// Positioned correction produced by the rule-based grammar checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarCorrection {
    pub original: String,
    pub suggestion: Option<String>,
    pub explanation: String,
    pub position: TextSpan,
    #[serde(rename = "type")]
    pub kind: CorrectionKind,
    pub severity: CorrectionSeverity,
    pub rule_id: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEnhancement {
    #[serde(default, deserialize_with = "null_as_default")]
    pub original: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestion: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<TextSpan>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedFeedback {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_to_improve: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeStructure {
    #[serde(default)]
    pub has_orientation: bool,
    #[serde(default)]
    pub has_complication: bool,
    #[serde(default)]
    pub has_climax: bool,
    #[serde(default)]
    pub has_resolution: bool,
    #[serde(default)]
    pub structure_notes: String,
}

/// Generator output after schema validation, before rubric enforcement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReportDraft {
    #[serde(default)]
    pub overall_band: Option<f64>,
    #[serde(default)]
    pub band_description: String,
    pub criteria_scores: CriteriaDraft,
    #[serde(default, deserialize_with = "usable_items")]
    pub highlights: Vec<Highlight>,
    #[serde(default)]
    pub detailed_feedback: DetailedFeedback,
    #[serde(default, deserialize_with = "usable_items")]
    pub vocabulary_enhancements: Vec<VocabularyEnhancement>,
    #[serde(default)]
    pub narrative_structure: Option<NarrativeStructure>,
    /// Keys outside the published schema, passed through untouched.
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

/// Treat an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keep the items that fit the schema; one unusable item does not sink the list.
fn usable_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if kept.len() < total {
        debug!(dropped = total - kept.len(), "skipped unusable generator items");
    }
    Ok(kept)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
    pub model_latency_ms: u64,
}

/// Rubric-compliant report merged from the generator and the grammar checker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub overall_band: u8,
    pub total_score: f64,
    pub band_description: String,
    pub criteria_scores: CriteriaScores,
    pub scoring_summary: ScoringSummary,
    pub highlights: Vec<Highlight>,
    pub detailed_feedback: DetailedFeedback,
    pub grammar_corrections: Vec<GrammarCorrection>,
    pub vocabulary_enhancements: Vec<VocabularyEnhancement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative_structure: Option<NarrativeStructure>,
    pub timings: Timings,
    pub model_version: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

/// Degraded report returned when the generative path fails; grammar
/// corrections are still carried.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackReport {
    pub overall_band: u8,
    pub total_score: f64,
    pub band_description: String,
    pub criteria_scores: CriteriaScores,
    pub highlights: Vec<Highlight>,
    pub detailed_feedback: DetailedFeedback,
    pub grammar_corrections: Vec<GrammarCorrection>,
    pub vocabulary_enhancements: Vec<VocabularyEnhancement>,
    pub narrative_structure: NarrativeStructure,
    pub error: bool,
    pub error_message: String,
    pub heuristic_estimate: RealtimeScore,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EvaluationOutcome {
    Merged(Box<EvaluationReport>),
    Fallback(Box<FallbackReport>),
}

impl EvaluationOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn total_score(&self) -> f64 {
        match self {
            Self::Merged(report) => report.total_score,
            Self::Fallback(report) => report.total_score,
        }
    }

    pub fn grammar_corrections(&self) -> &[GrammarCorrection] {
        match self {
            Self::Merged(report) => &report.grammar_corrections,
            Self::Fallback(report) => &report.grammar_corrections,
        }
    }

    pub fn criteria_scores(&self) -> &CriteriaScores {
        match self {
            Self::Merged(report) => &report.criteria_scores,
            Self::Fallback(report) => &report.criteria_scores,
        }
    }
}
