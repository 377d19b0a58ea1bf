use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    EvaluationOutcome, EvaluationReport, GrammarCorrection, ScoreReportDraft, Timings,
};
use super::fallback::fallback_report;
use super::generative::{GenerationRequest, GenerativeError, GenerativeEvaluator};
use super::grammar::{check_grammar, GrammarChecker};
use super::prompt::{system_instruction, user_message};
use super::sanitizer::{sanitize_corrections, sanitize_spans};
use super::schema::{parse_json, validate_draft, DraftValidation};
use crate::essay::{Essay, ValidationError};
use crate::realtime::HeuristicScorers;
use crate::rubric::RubricEnforcer;

/// Lifecycle of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationPhase {
    Idle,
    GrammarAndGenerationInFlight,
    Merged,
    FallbackOnGenerationFailure,
    Done,
}

impl fmt::Display for EvaluationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::GrammarAndGenerationInFlight => "in_flight",
            Self::Merged => "merged",
            Self::FallbackOnGenerationFailure => "fallback",
            Self::Done => "done",
        };
        f.write_str(label)
    }
}

/// Phases visited by one run, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PhaseTrace(Vec<EvaluationPhase>);

impl PhaseTrace {
    pub(crate) fn new() -> Self {
        Self(vec![EvaluationPhase::Idle])
    }

    fn enter(&mut self, next: EvaluationPhase) {
        let current = self.current();
        debug!(from = %current, to = %next, "evaluation phase transition");
        self.0.push(next);
    }

    pub(crate) fn current(&self) -> EvaluationPhase {
        self.0.last().copied().unwrap_or(EvaluationPhase::Idle)
    }

    pub(crate) fn phases(&self) -> &[EvaluationPhase] {
        &self.0
    }
}

/// Runs the grammar checker and the generator concurrently, then merges their
/// results into one rubric-compliant report or a fallback that still carries
/// the grammar corrections.
pub struct HybridOrchestrator {
    grammar: Arc<dyn GrammarChecker>,
    generator: Arc<dyn GenerativeEvaluator>,
    enforcer: RubricEnforcer,
    scorers: HeuristicScorers,
}

impl HybridOrchestrator {
    pub fn new(grammar: Arc<dyn GrammarChecker>, generator: Arc<dyn GenerativeEvaluator>) -> Self {
        Self {
            grammar,
            generator,
            enforcer: RubricEnforcer,
            scorers: HeuristicScorers::default(),
        }
    }

    pub fn with_scorers(mut self, scorers: HeuristicScorers) -> Self {
        self.scorers = scorers;
        self
    }

    pub fn scorers(&self) -> &HeuristicScorers {
        &self.scorers
    }

    /// Evaluate one essay. Only validation failures are returned as errors;
    /// every upstream failure is folded into the outcome.
    pub async fn evaluate(&self, essay: &Essay) -> Result<EvaluationOutcome, ValidationError> {
        let mut trace = PhaseTrace::new();
        self.run(essay, &mut trace).await
    }

    pub(crate) async fn run(
        &self,
        essay: &Essay,
        trace: &mut PhaseTrace,
    ) -> Result<EvaluationOutcome, ValidationError> {
        essay.validate()?;

        trace.enter(EvaluationPhase::GrammarAndGenerationInFlight);
        let grammar = Arc::clone(&self.grammar);
        let grammar_text = essay.text.clone();
        let grammar_task =
            tokio::spawn(async move { check_grammar(grammar.as_ref(), &grammar_text).await });

        let request = GenerationRequest {
            system: system_instruction(),
            user: user_message(essay),
        };
        let started = Instant::now();
        let generated = self.generator.evaluate(&request).await;
        let model_latency_ms = started.elapsed().as_millis() as u64;

        let interpreted = generated.and_then(|content| {
            interpret(&content.content, &essay.text).map(|draft| (draft, content.model))
        });

        let mut grammar_corrections = match grammar_task.await {
            Ok(corrections) => corrections,
            Err(err) => {
                warn!(error = %err, "grammar task did not complete; continuing without corrections");
                Vec::new()
            }
        };
        let zeroed = sanitize_corrections(&mut grammar_corrections, essay.char_len());
        if zeroed > 0 {
            warn!(zeroed, "grammar checker returned out-of-bounds spans; zeroed in place");
        }

        let outcome = match interpreted {
            Ok((draft, model_version)) => {
                trace.enter(EvaluationPhase::Merged);
                info!(
                    model = %model_version,
                    model_latency_ms,
                    corrections = grammar_corrections.len(),
                    "hybrid evaluation merged"
                );
                EvaluationOutcome::Merged(Box::new(self.merge(
                    draft,
                    grammar_corrections,
                    model_version,
                    model_latency_ms,
                )))
            }
            Err(err) => {
                trace.enter(EvaluationPhase::FallbackOnGenerationFailure);
                warn!(
                    error = %err,
                    corrections = grammar_corrections.len(),
                    "generative evaluation failed; returning fallback report"
                );
                EvaluationOutcome::Fallback(Box::new(fallback_report(
                    essay,
                    grammar_corrections,
                    &self.scorers,
                    &err.to_string(),
                )))
            }
        };

        trace.enter(EvaluationPhase::Done);
        Ok(outcome)
    }

    fn merge(
        &self,
        draft: ScoreReportDraft,
        grammar_corrections: Vec<GrammarCorrection>,
        model_version: String,
        model_latency_ms: u64,
    ) -> EvaluationReport {
        let enforced = self
            .enforcer
            .enforce(&draft.criteria_scores, draft.overall_band);

        EvaluationReport {
            overall_band: enforced.overall_band,
            total_score: enforced.total_score,
            band_description: draft.band_description,
            criteria_scores: enforced.criteria_scores,
            scoring_summary: enforced.scoring_summary,
            highlights: draft.highlights,
            detailed_feedback: draft.detailed_feedback,
            grammar_corrections,
            vocabulary_enhancements: draft.vocabulary_enhancements,
            narrative_structure: draft.narrative_structure,
            timings: Timings { model_latency_ms },
            model_version,
            generated_at: Utc::now(),
            additional: draft.additional,
        }
    }
}

/// Parse, repair and validate raw generator content.
fn interpret(content: &str, essay_text: &str) -> Result<ScoreReportDraft, GenerativeError> {
    let mut value = parse_json(content).map_err(GenerativeError::Malformed)?;
    sanitize_spans(&mut value, essay_text);
    match validate_draft(value) {
        DraftValidation::Valid(draft) => Ok(*draft),
        DraftValidation::Invalid(reason) => Err(GenerativeError::Malformed(reason)),
    }
}
