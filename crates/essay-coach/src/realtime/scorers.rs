use serde::Serialize;

use super::metrics::TextMetrics;
use super::thresholds::{ScoringThresholds, WordCap, MAX_LEVEL, MIN_LEVEL};
use crate::essay::TextType;
use crate::rubric::Criterion;

/// Level awarded for one criterion together with the adjustments behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelComponent {
    pub criterion: Criterion,
    pub level: u8,
    pub notes: Vec<String>,
}

/// Stateless scorers mapping text metrics onto 1-4 levels per criterion.
#[derive(Debug, Clone, Default)]
pub struct HeuristicScorers {
    thresholds: ScoringThresholds,
}

impl HeuristicScorers {
    pub fn new(thresholds: ScoringThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ScoringThresholds {
        &self.thresholds
    }

    /// Run all four scorers over one metrics pass, in rubric order.
    pub fn score_all(&self, metrics: &TextMetrics, text_type: TextType) -> [LevelComponent; 4] {
        [
            self.ideas_content(metrics, text_type),
            self.structure_organization(metrics, text_type),
            self.vocabulary_language(metrics),
            self.grammar_mechanics(metrics),
        ]
    }

    pub fn ideas_content(&self, metrics: &TextMetrics, text_type: TextType) -> LevelComponent {
        let thresholds = &self.thresholds.ideas;
        let markers = &metrics.markers;
        let mut notes = Vec::new();

        let mut level = thresholds
            .rules
            .iter()
            .filter(|rule| {
                metrics.word_count >= rule.min_words
                    && metrics.paragraph_count >= rule.min_paragraphs
                    && markers.transitions >= rule.min_transitions
                    && markers.sophistication >= rule.min_sophistication
                    && markers.creativity >= rule.min_creativity
            })
            .map(|rule| rule.level)
            .max()
            .unwrap_or(MIN_LEVEL);

        level = apply_word_caps(&thresholds.caps, metrics.word_count, level, &mut notes);

        if text_type.is_narrative() && markers.climax == 0 && markers.resolution == 0 {
            level = cap(
                level,
                thresholds.unresolved_narrative_cap,
                "narrative shows no climax or resolution",
                &mut notes,
            );
        }

        LevelComponent {
            criterion: Criterion::IdeasContent,
            level,
            notes,
        }
    }

    pub fn structure_organization(
        &self,
        metrics: &TextMetrics,
        text_type: TextType,
    ) -> LevelComponent {
        let thresholds = &self.thresholds.structure;
        let framed = metrics.has_opening && metrics.has_conclusion;
        let mut notes = Vec::new();

        let mut level = thresholds
            .rules
            .iter()
            .filter(|rule| {
                metrics.paragraph_count >= rule.min_paragraphs
                    && metrics.word_count >= rule.min_words
                    && metrics.markers.transitions >= rule.min_transitions
                    && (!rule.requires_framing || framed)
            })
            .map(|rule| rule.level)
            .max()
            .unwrap_or(MIN_LEVEL);

        level = apply_word_caps(&thresholds.caps, metrics.word_count, level, &mut notes);

        if text_type.is_narrative()
            && (metrics.markers.climax == 0 || metrics.markers.resolution == 0)
        {
            level = cap(
                level,
                thresholds.incomplete_narrative_cap,
                "narrative arc is missing a climax or a resolution",
                &mut notes,
            );
        }

        LevelComponent {
            criterion: Criterion::StructureOrganization,
            level,
            notes,
        }
    }

    pub fn vocabulary_language(&self, metrics: &TextMetrics) -> LevelComponent {
        let thresholds = &self.thresholds.vocabulary;
        let markers = &metrics.markers;
        let vivid = markers.descriptive_adjectives + markers.strong_verbs;
        let mut notes = Vec::new();

        let level = thresholds
            .rules
            .iter()
            .filter(|rule| {
                metrics.word_count >= rule.min_words
                    && metrics.lexical_diversity >= rule.min_diversity
                    && markers.advanced_vocabulary >= rule.min_advanced
                    && vivid >= rule.min_vivid
                    && markers.figurative >= rule.min_figurative
            })
            .map(|rule| rule.level)
            .max()
            .unwrap_or(MIN_LEVEL);

        let level = apply_word_caps(&thresholds.caps, metrics.word_count, level, &mut notes);

        LevelComponent {
            criterion: Criterion::LanguageVocab,
            level,
            notes,
        }
    }

    /// Starts at the top level and only ever deducts.
    pub fn grammar_mechanics(&self, metrics: &TextMetrics) -> LevelComponent {
        let thresholds = &self.thresholds.grammar;
        let mut notes = Vec::new();

        if metrics.is_empty() {
            notes.push("no text to assess".to_string());
            return LevelComponent {
                criterion: Criterion::SpellingGrammar,
                level: MIN_LEVEL,
                notes,
            };
        }

        let errors = metrics.mechanics.error_count();
        let mut level = thresholds
            .penalties
            .iter()
            .find(|penalty| errors >= penalty.min_errors)
            .map(|penalty| penalty.level)
            .unwrap_or(MAX_LEVEL);
        if errors > 0 {
            notes.push(format!("{errors} mechanics issue(s) found"));
        }

        let serious = metrics.mechanics.serious_count();
        if serious > 0 {
            level = cap(
                level,
                thresholds.serious_error_level,
                "tense errors detected",
                &mut notes,
            );
        }

        level = apply_word_caps(&thresholds.caps, metrics.word_count, level, &mut notes);

        if metrics.sentence_count < thresholds.min_sentences
            || metrics.average_sentence_words < thresholds.min_average_sentence_words
        {
            level = cap(
                level,
                thresholds.thin_text_cap,
                "too few or too short sentences to judge control",
                &mut notes,
            );
        }

        if metrics.sentence_count >= thresholds.monotone_min_sentences
            && metrics.sentence_length_variation() < thresholds.monotone_variation
            && level > MIN_LEVEL
        {
            level -= 1;
            notes.push("sentence lengths barely vary".to_string());
        }

        LevelComponent {
            criterion: Criterion::SpellingGrammar,
            level,
            notes,
        }
    }
}

fn cap(level: u8, max_level: u8, reason: &str, notes: &mut Vec<String>) -> u8 {
    if level > max_level {
        notes.push(format!("{reason}; capped at {max_level}"));
        max_level
    } else {
        level
    }
}

fn apply_word_caps(caps: &[WordCap], word_count: usize, level: u8, notes: &mut Vec<String>) -> u8 {
    let capped = WordCap::apply(caps, word_count, level);
    if capped < level {
        notes.push(format!("{word_count} words; capped at {capped}"));
    }
    capped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::mechanics::{MechanicsFinding, MechanicsReport, MechanicsSeverity};
    use crate::realtime::metrics::MarkerCounts;

    const FILLER: &str = "Students read many books in the quiet library each afternoon.";

    /// Three paragraphs of nine ten-word sentences, each opened by a transition.
    fn long_essay(transitions: [&str; 3]) -> String {
        transitions
            .iter()
            .map(|transition| {
                let body = vec![FILLER; 9].join(" ");
                format!("{transition}, {body}")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn metrics(word_count: usize) -> TextMetrics {
        TextMetrics {
            word_count,
            unique_word_count: word_count,
            lexical_diversity: 1.0,
            sentence_count: 6,
            sentence_word_counts: vec![6, 14, 22, 9, 17, 12],
            longest_sentence_chars: 120,
            shortest_sentence_chars: 30,
            average_sentence_words: 13.0,
            paragraph_count: 4,
            developed_paragraph_count: 4,
            has_opening: true,
            has_conclusion: true,
            markers: MarkerCounts::default(),
            mechanics: MechanicsReport::default(),
        }
    }

    fn finding(severity: MechanicsSeverity) -> MechanicsFinding {
        MechanicsFinding {
            rule_id: "test_rule",
            start: 0,
            end: 1,
            message: "issue".to_string(),
            severity,
        }
    }

    #[test]
    fn short_story_stays_at_the_floor() {
        let text = "Leo opened the ancient door. Suddenly, a cold wind rushed past him. \
                    He whispered, \"Who's there?\"";
        let metrics = TextMetrics::analyze(text);
        let component = HeuristicScorers::default().ideas_content(&metrics, TextType::Narrative);
        assert_eq!(component.level, 1);
    }

    #[test]
    fn thirty_word_essay_never_exceeds_level_two_for_ideas() {
        let mut rich = metrics(30);
        rich.markers = MarkerCounts {
            transitions: 6,
            sophistication: 6,
            creativity: 6,
            climax: 2,
            resolution: 2,
            ..MarkerCounts::default()
        };
        let component = HeuristicScorers::default().ideas_content(&rich, TextType::Persuasive);
        assert!(component.level <= 2);
    }

    #[test]
    fn developed_essay_reaches_level_three_for_ideas() {
        let text = long_essay(["Firstly", "However", "Finally"]);
        let metrics = TextMetrics::analyze(&text);
        assert!(metrics.word_count >= 250);
        assert_eq!(metrics.paragraph_count, 3);
        assert!(metrics.markers.transitions >= 3);

        let component = HeuristicScorers::default().ideas_content(&metrics, TextType::Narrative);
        assert!(component.level >= 3);
    }

    #[test]
    fn sophisticated_ideas_reach_the_top_level() {
        let mut rich = metrics(260);
        rich.markers.sophistication = 3;
        rich.markers.creativity = 2;
        rich.markers.resolution = 1;
        let component = HeuristicScorers::default().ideas_content(&rich, TextType::Narrative);
        assert_eq!(component.level, 4);
    }

    #[test]
    fn unresolved_narratives_are_capped() {
        let text = long_essay(["Firstly", "However", "Meanwhile"]);
        let metrics = TextMetrics::analyze(&text);
        let scorers = HeuristicScorers::default();

        let narrative = scorers.ideas_content(&metrics, TextType::Narrative);
        assert_eq!(narrative.level, 2);
        assert_eq!(narrative.notes.len(), 1);

        let persuasive = scorers.ideas_content(&metrics, TextType::Persuasive);
        assert_eq!(persuasive.level, 3);
    }

    #[test]
    fn structure_rewards_paragraphing_and_transitions() {
        let scorers = HeuristicScorers::default();

        let mut plain = metrics(260);
        plain.paragraph_count = 3;
        plain.markers.transitions = 2;
        assert_eq!(
            scorers.structure_organization(&plain, TextType::Persuasive).level,
            3
        );

        let mut crafted = metrics(380);
        crafted.markers.transitions = 4;
        assert_eq!(
            scorers.structure_organization(&crafted, TextType::Persuasive).level,
            4
        );

        crafted.has_conclusion = false;
        assert_eq!(
            scorers.structure_organization(&crafted, TextType::Persuasive).level,
            3
        );
    }

    #[test]
    fn structure_is_gated_by_length() {
        let mut short = metrics(90);
        short.markers.transitions = 6;
        let component =
            HeuristicScorers::default().structure_organization(&short, TextType::Persuasive);
        assert_eq!(component.level, 1);
    }

    #[test]
    fn structure_caps_narratives_without_resolution() {
        let mut story = metrics(380);
        story.markers.transitions = 4;
        story.markers.climax = 1;
        let component =
            HeuristicScorers::default().structure_organization(&story, TextType::Narrative);
        assert_eq!(component.level, 2);
    }

    #[test]
    fn vocabulary_climbs_with_diversity_and_markers() {
        let scorers = HeuristicScorers::default();

        let mut plain = metrics(120);
        plain.lexical_diversity = 0.4;
        assert_eq!(scorers.vocabulary_language(&plain).level, 1);

        plain.lexical_diversity = 0.55;
        assert_eq!(scorers.vocabulary_language(&plain).level, 2);

        plain.lexical_diversity = 0.65;
        plain.markers.descriptive_adjectives = 1;
        plain.markers.strong_verbs = 1;
        assert_eq!(scorers.vocabulary_language(&plain).level, 3);

        // 120 words keeps the top level out of reach.
        plain.lexical_diversity = 0.8;
        plain.markers.advanced_vocabulary = 5;
        plain.markers.strong_verbs = 5;
        assert_eq!(scorers.vocabulary_language(&plain).level, 3);
    }

    #[test]
    fn figurative_language_lifts_repetitive_vocabulary() {
        let text = format!(
            "{} It felt as if the shelves leaned in like a crowd.",
            long_essay(["Firstly", "However", "Finally"])
        );
        let metrics = TextMetrics::analyze(&text);
        assert!(metrics.lexical_diversity < 0.5);
        assert_eq!(metrics.markers.figurative, 2);

        let component = HeuristicScorers::default().vocabulary_language(&metrics);
        assert_eq!(component.level, 3);
    }

    #[test]
    fn grammar_deducts_for_each_error_step() {
        let scorers = HeuristicScorers::default();
        let mut text = metrics(200);
        assert_eq!(scorers.grammar_mechanics(&text).level, 4);

        for (errors, expected) in [(1, 3), (3, 2), (5, 1)] {
            text.mechanics.findings = vec![finding(MechanicsSeverity::Error); errors];
            assert_eq!(scorers.grammar_mechanics(&text).level, expected);
        }
    }

    #[test]
    fn serious_errors_force_the_lowest_level() {
        let mut text = metrics(200);
        text.mechanics.findings = vec![finding(MechanicsSeverity::Serious)];
        assert_eq!(HeuristicScorers::default().grammar_mechanics(&text).level, 1);
    }

    #[test]
    fn grammar_caps_thin_texts() {
        let scorers = HeuristicScorers::default();

        let short = metrics(80);
        assert_eq!(scorers.grammar_mechanics(&short).level, 2);

        let mut choppy = metrics(200);
        choppy.average_sentence_words = 5.0;
        assert_eq!(scorers.grammar_mechanics(&choppy).level, 2);
    }

    #[test]
    fn monotone_rhythm_costs_one_level() {
        let mut text = metrics(200);
        text.sentence_word_counts = vec![10, 10, 11, 10, 10, 10];
        assert_eq!(HeuristicScorers::default().grammar_mechanics(&text).level, 3);

        let repetitive = TextMetrics::analyze(&long_essay(["Firstly", "However", "Finally"]));
        assert_eq!(
            HeuristicScorers::default()
                .grammar_mechanics(&repetitive)
                .level,
            3
        );
    }

    #[test]
    fn empty_text_scores_the_floor_for_grammar() {
        let metrics = TextMetrics::analyze("");
        let component = HeuristicScorers::default().grammar_mechanics(&metrics);
        assert_eq!(component.level, 1);
    }
}
