//! Keystroke-rate heuristic scoring: text metrics, four table-driven
//! criterion scorers, and a debounced session that diffs snapshots.

mod aggregator;
mod debounce;
mod lexicon;
mod mechanics;
mod metrics;
mod scorers;
mod session;
mod thresholds;

pub use aggregator::{
    compare_snapshots, score_text, CriterionBreakdown, CriterionLevels, RealtimeScore,
    RealtimeScoreAggregator, RealtimeScoreSnapshot, RealtimeUpdate, ScoreChange, ScoreDirection,
};
pub use debounce::DebounceScheduler;
pub use mechanics::{analyze_mechanics, MechanicsFinding, MechanicsReport, MechanicsSeverity};
pub use metrics::{paragraphs, sentences, word_count, MarkerCounts, TextMetrics};
pub use scorers::{HeuristicScorers, LevelComponent};
pub use session::RealtimeScoringSession;
pub use thresholds::{
    ErrorPenalty, GrammarThresholds, IdeasRule, IdeasThresholds, ScoringThresholds, StructureRule,
    StructureThresholds, VocabularyRule, VocabularyThresholds, WordCap, MAX_LEVEL, MIN_LEVEL,
};
