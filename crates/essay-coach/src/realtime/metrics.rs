use serde::Serialize;
use std::collections::HashSet;

use super::lexicon::{
    MarkerList, ADVANCED_VOCABULARY, CLIMAX, CREATIVITY, DESCRIPTIVE_ADJECTIVES, FIGURATIVE,
    RESOLUTION, SOPHISTICATION, STRONG_VERBS, TRANSITIONS,
};
use super::mechanics::{analyze_mechanics, MechanicsReport};

/// Sentences shorter than this (trimmed, in characters) are ignored.
const MIN_SENTENCE_CHARS: usize = 10;
/// Paragraphs must exceed this many characters to count as developed.
const DEVELOPED_PARAGRAPH_CHARS: usize = 20;
/// Opening and closing sentences must exceed this many characters.
const FRAMING_SENTENCE_CHARS: usize = 15;

/// How many distinct entries of each marker list appear in the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarkerCounts {
    pub transitions: usize,
    pub sophistication: usize,
    pub creativity: usize,
    pub advanced_vocabulary: usize,
    pub descriptive_adjectives: usize,
    pub strong_verbs: usize,
    pub figurative: usize,
    pub climax: usize,
    pub resolution: usize,
}

/// Everything the heuristic scorers need, computed once per text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextMetrics {
    pub word_count: usize,
    pub unique_word_count: usize,
    pub lexical_diversity: f64,
    pub sentence_count: usize,
    pub sentence_word_counts: Vec<usize>,
    pub longest_sentence_chars: usize,
    pub shortest_sentence_chars: usize,
    pub average_sentence_words: f64,
    pub paragraph_count: usize,
    pub developed_paragraph_count: usize,
    pub has_opening: bool,
    pub has_conclusion: bool,
    pub markers: MarkerCounts,
    pub mechanics: MechanicsReport,
}

impl TextMetrics {
    pub fn analyze(text: &str) -> Self {
        let index = TokenIndex::new(text);
        let word_count = word_count(text);
        let unique_word_count = index.unique.len();

        let sentences = sentences(text);
        let sentence_word_counts: Vec<usize> = sentences
            .iter()
            .map(|sentence| sentence.split_whitespace().count())
            .collect();
        let sentence_chars: Vec<usize> = sentences
            .iter()
            .map(|sentence| sentence.chars().count())
            .collect();

        let paragraphs = paragraphs(text);
        let developed_paragraph_count = paragraphs
            .iter()
            .filter(|paragraph| paragraph.chars().count() > DEVELOPED_PARAGRAPH_CHARS)
            .count();

        let has_opening = sentence_chars
            .first()
            .is_some_and(|chars| *chars > FRAMING_SENTENCE_CHARS);
        let has_conclusion = sentence_chars.len() > 3
            && sentence_chars
                .last()
                .is_some_and(|chars| *chars > FRAMING_SENTENCE_CHARS);

        let markers = MarkerCounts {
            transitions: index.count_markers(TRANSITIONS),
            sophistication: index.count_markers(SOPHISTICATION),
            creativity: index.count_markers(CREATIVITY),
            advanced_vocabulary: index.count_markers(ADVANCED_VOCABULARY),
            descriptive_adjectives: index.count_markers(DESCRIPTIVE_ADJECTIVES),
            strong_verbs: index.count_markers(STRONG_VERBS),
            figurative: index.count_markers(FIGURATIVE),
            climax: index.count_markers(CLIMAX),
            resolution: index.count_markers(RESOLUTION),
        };

        Self {
            word_count,
            unique_word_count,
            lexical_diversity: lexical_diversity(&index),
            sentence_count: sentences.len(),
            average_sentence_words: word_count as f64 / sentences.len().max(1) as f64,
            longest_sentence_chars: sentence_chars.iter().copied().max().unwrap_or(0),
            shortest_sentence_chars: sentence_chars.iter().copied().min().unwrap_or(0),
            sentence_word_counts,
            paragraph_count: paragraphs.len(),
            developed_paragraph_count,
            has_opening,
            has_conclusion,
            markers,
            mechanics: analyze_mechanics(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// Coefficient of variation of sentence lengths in words; 0 when fewer
    /// than two sentences exist.
    pub fn sentence_length_variation(&self) -> f64 {
        let lengths = &self.sentence_word_counts;
        if lengths.len() < 2 {
            return 0.0;
        }
        let count = lengths.len() as f64;
        let mean = lengths.iter().sum::<usize>() as f64 / count;
        if mean == 0.0 {
            return 0.0;
        }
        let variance = lengths
            .iter()
            .map(|length| {
                let delta = *length as f64 - mean;
                delta * delta
            })
            .sum::<f64>()
            / count;
        variance.sqrt() / mean
    }
}

/// Whitespace-separated, non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Sentences split on `.`, `!` and `?`, trimmed, keeping those longer than
/// the minimum length.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

/// Paragraphs separated by one or more blank lines.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

fn lexical_diversity(index: &TokenIndex) -> f64 {
    if index.tokens.is_empty() {
        0.0
    } else {
        index.unique.len() as f64 / index.tokens.len() as f64
    }
}

/// Lowercased word tokens with surrounding punctuation stripped.
pub(crate) struct TokenIndex {
    tokens: Vec<String>,
    unique: HashSet<String>,
}

impl TokenIndex {
    pub(crate) fn new(text: &str) -> Self {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|raw| {
                raw.trim_matches(|ch: char| !ch.is_alphanumeric() && ch != '\'')
                    .trim_matches('\'')
                    .to_lowercase()
            })
            .filter(|token| !token.is_empty())
            .collect();
        let unique = tokens.iter().cloned().collect();
        Self { tokens, unique }
    }

    fn contains(&self, marker: &str) -> bool {
        let parts: Vec<&str> = marker.split_whitespace().collect();
        match parts.as_slice() {
            [] => false,
            [single] => self.unique.contains(*single),
            phrase => self
                .tokens
                .windows(phrase.len())
                .any(|window| window.iter().zip(phrase).all(|(token, part)| token.as_str() == *part)),
        }
    }

    /// Number of distinct markers from `list` that occur at least once.
    pub(crate) fn count_markers(&self, list: MarkerList) -> usize {
        list.iter().filter(|marker| self.contains(marker)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_sentences_and_paragraphs() {
        let text = "The storm arrived at dusk.\nIt rattled every window in town!\n\n\
                    By morning the streets were silent. All quiet.";
        let metrics = TextMetrics::analyze(text);

        assert_eq!(metrics.word_count, 19);
        assert_eq!(metrics.paragraph_count, 2);
        // "All quiet" is below the sentence length floor.
        assert_eq!(metrics.sentence_count, 3);
    }

    #[test]
    fn empty_text_yields_zeroed_metrics() {
        let metrics = TextMetrics::analyze("   \n\n  ");
        assert!(metrics.is_empty());
        assert_eq!(metrics.sentence_count, 0);
        assert_eq!(metrics.paragraph_count, 0);
        assert_eq!(metrics.lexical_diversity, 0.0);
        assert!(!metrics.has_opening);
    }

    #[test]
    fn lexical_diversity_ignores_case_and_punctuation() {
        let metrics = TextMetrics::analyze("Rain, rain. RAIN! sun");
        assert_eq!(metrics.unique_word_count, 2);
        assert!((metrics.lexical_diversity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn markers_match_whole_words_and_phrases() {
        let metrics = TextMetrics::analyze(
            "My friend waved. In addition, the sky looked like a painting. Afterwards we left.",
        );
        assert_eq!(metrics.markers.resolution, 0);
        assert_eq!(metrics.markers.transitions, 1);
        assert_eq!(metrics.markers.figurative, 1);
    }

    #[test]
    fn markers_count_distinct_entries_once() {
        let metrics = TextMetrics::analyze("Then then then, however, however.");
        assert_eq!(metrics.markers.transitions, 2);
    }

    #[test]
    fn sentence_length_variation_detects_monotone_rhythm() {
        let monotone = TextMetrics::analyze(
            "The cat sat on the mat. The dog lay on the rug. The bird sat on the twig.",
        );
        assert!(monotone.sentence_length_variation() < 0.05);

        let varied = TextMetrics::analyze(
            "The cat sat. Later that evening the dog dragged its blanket across the kitchen floor. \
             The bird sang softly from the window.",
        );
        assert!(varied.sentence_length_variation() > 0.3);
    }
}
