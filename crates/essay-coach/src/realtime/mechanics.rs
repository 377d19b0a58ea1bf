use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::lexicon::COMMON_MISSPELLINGS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanicsSeverity {
    Error,
    /// Tense slips that cap the mechanics level outright.
    Serious,
}

/// A local, offline mechanics issue found while the student types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MechanicsFinding {
    pub rule_id: &'static str,
    pub start: usize,
    pub end: usize,
    pub message: String,
    pub severity: MechanicsSeverity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MechanicsReport {
    pub findings: Vec<MechanicsFinding>,
}

impl MechanicsReport {
    pub fn error_count(&self) -> usize {
        self.findings.len()
    }

    pub fn serious_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity == MechanicsSeverity::Serious)
            .count()
    }
}

struct PatternRule {
    id: &'static str,
    pattern: Regex,
    message: &'static str,
    severity: MechanicsSeverity,
}

impl PatternRule {
    fn new(
        id: &'static str,
        pattern: &str,
        message: &'static str,
        severity: MechanicsSeverity,
    ) -> Option<Self> {
        match Regex::new(pattern) {
            Ok(pattern) => Some(Self {
                id,
                pattern,
                message,
                severity,
            }),
            Err(err) => {
                warn!(rule = id, error = %err, "mechanics rule disabled: pattern does not compile");
                None
            }
        }
    }
}

static PATTERN_RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    use MechanicsSeverity::{Error, Serious};

    [
        (
            "plural_subject_singular_verb",
            r"(?i)\b(?:dogs|cats|books|students|teachers)\s+(?:runs|goes|has|was|is)\b",
            "Plural subjects need plural verbs",
            Error,
        ),
        (
            "than_then",
            r"(?i)\bthan\s+then\b|\bthen\s+than\b",
            "Confused \"than\" and \"then\"",
            Error,
        ),
        (
            "your_youre",
            r"(?i)\byour\s+(?:going|coming|being)\b",
            "Should be \"you're\" (you are)",
            Error,
        ),
        (
            "space_before_comma",
            r"[A-Za-z]\s+,",
            "Remove the space before the comma",
            Error,
        ),
        (
            "missing_space_after_comma",
            r",[A-Za-z]",
            "Add a space after the comma",
            Error,
        ),
        (
            "doubled_period",
            r"(?:^|[^.])\.\.(?:[^.]|$)",
            "Use one period or a three-dot ellipsis",
            Error,
        ),
        (
            "lowercase_pronoun_i",
            r"(?:^|\s)i(?:\s|[,.!?]|$)",
            "Capitalise the pronoun \"I\"",
            Error,
        ),
        (
            "lowercase_sentence_start",
            r"[.!?]\s+[a-z]",
            "Start each sentence with a capital letter",
            Error,
        ),
        (
            "was_plus_base_verb",
            r"(?i)\bwas\s+confuse\b",
            "Use the past participle (\"was confused\")",
            Serious,
        ),
        (
            "present_tense_slip",
            r"(?i)\b(?:i|he|she)\s+(?:look|decide|lift|walk)\s+(?:out|to|at|the)\b",
            "Keep the narrative in the past tense",
            Serious,
        ),
    ]
    .into_iter()
    .filter_map(|(id, pattern, message, severity)| {
        PatternRule::new(id, pattern, message, severity)
    })
    .collect()
});

/// Run every local mechanics rule over `text`. Offsets are character offsets.
pub fn analyze_mechanics(text: &str) -> MechanicsReport {
    let mut findings = Vec::new();

    for rule in PATTERN_RULES.iter() {
        for found in rule.pattern.find_iter(text) {
            findings.push(MechanicsFinding {
                rule_id: rule.id,
                start: char_offset(text, found.start()),
                end: char_offset(text, found.end()),
                message: rule.message.to_string(),
                severity: rule.severity,
            });
        }
    }

    findings.extend(misspellings(text));
    findings.sort_by_key(|finding| (finding.start, finding.end));

    MechanicsReport { findings }
}

fn misspellings(text: &str) -> Vec<MechanicsFinding> {
    let mut findings = Vec::new();
    let mut offset = 0;

    for (index, ch) in text.char_indices() {
        let boundary = !ch.is_alphabetic();
        if boundary {
            if offset < index {
                push_misspelling(text, offset, index, &mut findings);
            }
            offset = index + ch.len_utf8();
        }
    }
    if offset < text.len() {
        push_misspelling(text, offset, text.len(), &mut findings);
    }

    findings
}

fn push_misspelling(text: &str, start: usize, end: usize, findings: &mut Vec<MechanicsFinding>) {
    let word = text[start..end].to_lowercase();
    if let Some((_, correction)) = COMMON_MISSPELLINGS
        .iter()
        .find(|(wrong, _)| *wrong == word.as_str())
    {
        findings.push(MechanicsFinding {
            rule_id: "common_misspelling",
            start: char_offset(text, start),
            end: char_offset(text, end),
            message: format!("Did you mean \"{correction}\"?"),
            severity: MechanicsSeverity::Error,
        });
    }
}

fn char_offset(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}
