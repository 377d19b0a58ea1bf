use serde::{Deserialize, Serialize};

/// Highest heuristic level any scorer can award.
pub const MAX_LEVEL: u8 = 4;
pub const MIN_LEVEL: u8 = 1;

/// Essays shorter than `below_words` cannot exceed `max_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCap {
    pub below_words: usize,
    pub max_level: u8,
}

impl WordCap {
    pub(crate) fn apply(caps: &[WordCap], word_count: usize, level: u8) -> u8 {
        caps.iter()
            .filter(|cap| word_count < cap.below_words)
            .fold(level, |level, cap| level.min(cap.max_level))
    }
}

/// Awards `level` once every minimum is met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeasRule {
    pub min_words: usize,
    pub min_paragraphs: usize,
    pub min_transitions: usize,
    pub min_sophistication: usize,
    pub min_creativity: usize,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeasThresholds {
    pub rules: Vec<IdeasRule>,
    pub caps: Vec<WordCap>,
    /// Narratives with neither a climax nor a resolution marker stop here.
    pub unresolved_narrative_cap: u8,
}

impl Default for IdeasThresholds {
    fn default() -> Self {
        let rule = |min_words, min_paragraphs, min_transitions, min_sophistication, min_creativity, level| {
            IdeasRule {
                min_words,
                min_paragraphs,
                min_transitions,
                min_sophistication,
                min_creativity,
                level,
            }
        };

        Self {
            rules: vec![
                rule(50, 0, 0, 0, 0, 2),
                rule(150, 3, 3, 0, 0, 3),
                rule(200, 2, 0, 0, 0, 3),
                rule(250, 0, 0, 3, 2, 4),
            ],
            caps: vec![
                WordCap {
                    below_words: 50,
                    max_level: 1,
                },
                WordCap {
                    below_words: 100,
                    max_level: 2,
                },
                WordCap {
                    below_words: 150,
                    max_level: 3,
                },
            ],
            unresolved_narrative_cap: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRule {
    pub min_paragraphs: usize,
    pub min_words: usize,
    pub min_transitions: usize,
    /// Requires both an opening and a concluding sentence.
    pub requires_framing: bool,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureThresholds {
    pub rules: Vec<StructureRule>,
    pub caps: Vec<WordCap>,
    /// Narratives missing either a climax or a resolution marker stop here.
    pub incomplete_narrative_cap: u8,
}

impl Default for StructureThresholds {
    fn default() -> Self {
        let rule = |min_paragraphs, min_words, min_transitions, requires_framing, level| {
            StructureRule {
                min_paragraphs,
                min_words,
                min_transitions,
                requires_framing,
                level,
            }
        };

        Self {
            rules: vec![
                rule(2, 150, 0, false, 2),
                rule(3, 200, 0, true, 2),
                rule(3, 250, 2, false, 3),
                rule(4, 350, 4, true, 4),
            ],
            caps: vec![
                WordCap {
                    below_words: 100,
                    max_level: 1,
                },
                WordCap {
                    below_words: 200,
                    max_level: 2,
                },
            ],
            incomplete_narrative_cap: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VocabularyRule {
    pub min_words: usize,
    pub min_diversity: f64,
    pub min_advanced: usize,
    /// Descriptive adjectives plus strong verbs.
    pub min_vivid: usize,
    pub min_figurative: usize,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyThresholds {
    pub rules: Vec<VocabularyRule>,
    pub caps: Vec<WordCap>,
}

impl Default for VocabularyThresholds {
    fn default() -> Self {
        let rule = |min_words, min_diversity, min_advanced, min_vivid, min_figurative, level| {
            VocabularyRule {
                min_words,
                min_diversity,
                min_advanced,
                min_vivid,
                min_figurative,
                level,
            }
        };

        Self {
            rules: vec![
                rule(50, 0.5, 0, 0, 0, 2),
                rule(100, 0.6, 2, 0, 0, 3),
                rule(100, 0.6, 0, 2, 0, 3),
                rule(100, 0.0, 0, 0, 2, 3),
                rule(150, 0.7, 3, 3, 0, 4),
                rule(150, 0.0, 2, 0, 4, 4),
            ],
            caps: vec![
                WordCap {
                    below_words: 100,
                    max_level: 2,
                },
                WordCap {
                    below_words: 150,
                    max_level: 3,
                },
            ],
        }
    }
}

/// Mechanics errors at or above `min_errors` drop the level to `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPenalty {
    pub min_errors: usize,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarThresholds {
    pub penalties: Vec<ErrorPenalty>,
    /// Level forced by any serious tense slip.
    pub serious_error_level: u8,
    pub caps: Vec<WordCap>,
    /// Fewer sentences than this caps the level at `thin_text_cap`.
    pub min_sentences: usize,
    /// Average sentence length (words) below this caps the level at `thin_text_cap`.
    pub min_average_sentence_words: f64,
    pub thin_text_cap: u8,
    /// Sentence-length variation below this, across at least
    /// `monotone_min_sentences` sentences, costs one level.
    pub monotone_variation: f64,
    pub monotone_min_sentences: usize,
}

impl Default for GrammarThresholds {
    fn default() -> Self {
        Self {
            penalties: vec![
                ErrorPenalty {
                    min_errors: 5,
                    level: 1,
                },
                ErrorPenalty {
                    min_errors: 3,
                    level: 2,
                },
                ErrorPenalty {
                    min_errors: 1,
                    level: 3,
                },
            ],
            serious_error_level: 1,
            caps: vec![WordCap {
                below_words: 100,
                max_level: 2,
            }],
            min_sentences: 3,
            min_average_sentence_words: 8.0,
            thin_text_cap: 2,
            monotone_variation: 0.2,
            monotone_min_sentences: 4,
        }
    }
}

/// Every threshold the four heuristic scorers read, as data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringThresholds {
    pub ideas: IdeasThresholds,
    pub structure: StructureThresholds,
    pub vocabulary: VocabularyThresholds,
    pub grammar: GrammarThresholds,
}
