use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum trimmed length, in characters, accepted for a hybrid evaluation.
pub const MIN_ESSAY_CHARS: usize = 20;

/// Writing genre the student was asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextType {
    #[default]
    Narrative,
    Persuasive,
    Expository,
    Descriptive,
    Discursive,
    Recount,
    Diary,
    #[serde(other)]
    Other,
}

impl TextType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Narrative => "narrative",
            Self::Persuasive => "persuasive",
            Self::Expository => "expository",
            Self::Descriptive => "descriptive",
            Self::Discursive => "discursive",
            Self::Recount => "recount",
            Self::Diary => "diary",
            Self::Other => "other",
        }
    }

    pub const fn is_narrative(self) -> bool {
        matches!(self, Self::Narrative)
    }
}

impl fmt::Display for TextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextType {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "narrative" | "story" => Self::Narrative,
            "persuasive" => Self::Persuasive,
            "expository" | "informative" => Self::Expository,
            "descriptive" => Self::Descriptive,
            "discursive" => Self::Discursive,
            "recount" => Self::Recount,
            "diary" => Self::Diary,
            _ => Self::Other,
        })
    }
}

/// One essay as submitted for evaluation; never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Essay {
    pub text: String,
    pub text_type: TextType,
    pub prompt: String,
}

impl Essay {
    pub fn new(text: impl Into<String>, text_type: TextType, prompt: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            text_type,
            prompt: prompt.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Missing);
        }

        let actual = trimmed.chars().count();
        if actual < MIN_ESSAY_CHARS {
            return Err(ValidationError::TooShort {
                minimum: MIN_ESSAY_CHARS,
                actual,
            });
        }
        Ok(())
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Length in characters; the unit every span offset is measured in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Essay rejected before any downstream call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("essay content is missing")]
    Missing,
    #[error("essay content is too short (minimum {minimum} characters, got {actual})")]
    TooShort { minimum: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_and_short_essays() {
        let blank = Essay::new("   \n", TextType::Narrative, "");
        assert_eq!(blank.validate(), Err(ValidationError::Missing));

        let short = Essay::new("  The end.  ", TextType::Narrative, "");
        assert_eq!(
            short.validate(),
            Err(ValidationError::TooShort {
                minimum: MIN_ESSAY_CHARS,
                actual: 8
            })
        );
    }

    #[test]
    fn accepts_essay_at_minimum_length() {
        let essay = Essay::new("abcdefghij klmnopqrs", TextType::Persuasive, "");
        assert!(essay.validate().is_ok());
    }

    #[test]
    fn unknown_text_types_deserialize_as_other() {
        let parsed: TextType = serde_json::from_str("\"limerick\"").expect("parses");
        assert_eq!(parsed, TextType::Other);
        let parsed: TextType = serde_json::from_str("\"persuasive\"").expect("parses");
        assert_eq!(parsed, TextType::Persuasive);
    }

    #[test]
    fn parses_text_type_case_insensitively() {
        assert_eq!("Narrative".parse::<TextType>(), Ok(TextType::Narrative));
        assert_eq!("DIARY".parse::<TextType>(), Ok(TextType::Diary));
    }
}
