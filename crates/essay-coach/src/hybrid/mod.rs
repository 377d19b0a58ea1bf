//! Hybrid submission path: a rule-based grammar check and a generative
//! evaluation run side by side, and their results are merged into one
//! rubric-compliant report with safe spans.
//!
//! Generator output is never trusted as-is. It is parsed, span-repaired and
//! validated against the report schema before the rubric enforcer pins every
//! criterion back onto its official maximum. Any failure on the generative
//! side produces a fallback report that still carries the grammar findings.

pub mod access;
pub mod domain;
pub(crate) mod fallback;
pub mod generative;
pub mod grammar;
pub mod orchestrator;
pub mod prompt;
pub mod router;
pub mod sanitizer;
pub mod schema;

#[cfg(test)]
mod tests;

pub use access::{AccessGate, OpenAccess, StaticTokenGate};
pub use domain::{
    BeforeAfter, CorrectionKind, CorrectionSeverity, DetailedFeedback, EvaluationOutcome,
    EvaluationReport, FallbackReport, GrammarCorrection, Highlight, HighlightKind,
    NarrativeStructure, ScoreReportDraft, TextSpan, Timings, VocabularyEnhancement,
};
pub use fallback::fallback_report;
pub use generative::{
    evaluator_from_config, validate_credential, CredentialError, GeneratedContent,
    GenerationRequest, GenerativeError, GenerativeEvaluator, OpenAiEvaluator,
    UnavailableEvaluator,
};
pub use grammar::{check_grammar, GrammarChecker, GrammarServiceError, LanguageToolClient};
pub use orchestrator::{EvaluationPhase, HybridOrchestrator};
pub use router::{evaluation_router, EvaluationRequest, EvaluationService, RealtimeScoreRequest};
pub use sanitizer::{sanitize_corrections, sanitize_spans, SpanRepairs};
pub use schema::{parse_json, validate_draft, DraftValidation};
