use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::domain::{CorrectionKind, CorrectionSeverity, GrammarCorrection, TextSpan};
use crate::config::GrammarConfig;

/// Whitespace and quotation rules that are noise for student feedback.
const IGNORED_RULES: [&str; 3] = ["WHITESPACE_RULE", "COMMA_PARENTHESIS_WHITESPACE", "EN_QUOTES"];
const TYPOGRAPHY_CATEGORY: &str = "TYPOGRAPHY";

#[derive(Debug, thiserror::Error)]
pub enum GrammarServiceError {
    #[error("grammar service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("grammar service returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Rule-based grammar and spelling checker.
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    async fn check(&self, text: &str) -> Result<Vec<GrammarCorrection>, GrammarServiceError>;
}

/// Run `checker`, degrading any failure to an empty list.
pub async fn check_grammar(checker: &dyn GrammarChecker, text: &str) -> Vec<GrammarCorrection> {
    match checker.check(text).await {
        Ok(corrections) => corrections,
        Err(err) => {
            warn!(error = %err, "grammar check failed; continuing without corrections");
            Vec::new()
        }
    }
}

/// Client for the LanguageTool `/v2/check` endpoint.
#[derive(Debug, Clone)]
pub struct LanguageToolClient {
    http: Client,
    base_url: String,
    language: String,
}

impl LanguageToolClient {
    pub fn new(config: &GrammarConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl GrammarChecker for LanguageToolClient {
    async fn check(&self, text: &str) -> Result<Vec<GrammarCorrection>, GrammarServiceError> {
        let started = Instant::now();
        let response = self
            .http
            .post(format!("{}/v2/check", self.base_url))
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GrammarServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: CheckResponse = response.json().await?;
        let corrections = corrections_from_matches(text, payload.matches);
        info!(
            corrections = corrections.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "grammar check complete"
        );
        Ok(corrections)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub matches: Vec<RuleMatch>,
}

/// One LanguageTool match. Offsets are UTF-16 code units.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleMatch {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub length: usize,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    #[serde(default)]
    pub rule: MatchRule,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Replacement {
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub category: MatchCategory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchCategory {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl RuleMatch {
    fn is_ignored(&self) -> bool {
        IGNORED_RULES.contains(&self.rule.id.as_str())
            || (self.rule.category.id == TYPOGRAPHY_CATEGORY && self.rule.id.ends_with("_WHITESPACE"))
    }

    fn classify(&self) -> (CorrectionKind, CorrectionSeverity) {
        match self.rule.issue_type.as_deref() {
            Some("misspelling" | "typographical") => {
                (CorrectionKind::SpellingError, CorrectionSeverity::Error)
            }
            Some("style" | "non-standard") => {
                (CorrectionKind::StyleWarning, CorrectionSeverity::Warning)
            }
            _ => (CorrectionKind::GrammarError, CorrectionSeverity::Error),
        }
    }
}

/// Convert matches into corrections with character offsets, dropping noise
/// rules. Matches whose offsets do not land on character boundaries keep
/// their message with an empty span.
pub fn corrections_from_matches(text: &str, matches: Vec<RuleMatch>) -> Vec<GrammarCorrection> {
    matches
        .into_iter()
        .filter(|found| !found.is_ignored())
        .map(|found| {
            let position = char_span(text, found.offset, found.length).unwrap_or(TextSpan::EMPTY);
            let original: String = text
                .chars()
                .skip(position.start)
                .take(position.end - position.start)
                .collect();
            let (kind, severity) = found.classify();

            GrammarCorrection {
                original,
                suggestion: found
                    .replacements
                    .into_iter()
                    .next()
                    .map(|replacement| replacement.value),
                explanation: found.message,
                position,
                kind,
                severity,
                rule_id: found.rule.id,
                category: found.rule.category.name,
            }
        })
        .collect()
}

fn char_span(text: &str, utf16_offset: usize, utf16_length: usize) -> Option<TextSpan> {
    let start = char_index(text, utf16_offset)?;
    let end = char_index(text, utf16_offset.checked_add(utf16_length)?)?;
    Some(TextSpan::new(start, end))
}

fn char_index(text: &str, utf16_target: usize) -> Option<usize> {
    let mut units = 0;
    for (index, ch) in text.chars().enumerate() {
        if units == utf16_target {
            return Some(index);
        }
        if units > utf16_target {
            return None;
        }
        units += ch.len_utf16();
    }
    (units == utf16_target).then(|| text.chars().count())
}
