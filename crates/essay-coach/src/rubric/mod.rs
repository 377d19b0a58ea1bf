//! NSW Selective writing rubric: the four weighted criteria, their fixed maxima,
//! and the enforcement step that pins generated scores back onto them.

mod enforcer;
mod report;

pub use enforcer::{CriteriaDraft, CriterionDraft, EnforcedScores, RubricEnforcer};
pub use report::{CriteriaScores, CriterionScore, ScoringSummary, SummaryLine};

use serde::{Deserialize, Serialize};

/// Weighted total every report is expressed against.
pub const TOTAL_OUT_OF: f64 = 30.0;
/// Each criterion contributes four raw points to the secondary 16-point scale.
pub const RAW_POINTS_PER_CRITERION: f64 = 4.0;
pub const RAW_TOTAL_OUT_OF: f64 = 16.0;

/// Lowest and highest qualitative band.
pub const MIN_BAND: u8 = 1;
pub const MAX_BAND: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Criterion {
    IdeasContent,
    StructureOrganization,
    LanguageVocab,
    SpellingGrammar,
}

impl Criterion {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::IdeasContent,
            Self::StructureOrganization,
            Self::LanguageVocab,
            Self::SpellingGrammar,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::IdeasContent => "Ideas & Content",
            Self::StructureOrganization => "Structure & Organization",
            Self::LanguageVocab => "Vocabulary & Language",
            Self::SpellingGrammar => "Grammar & Mechanics",
        }
    }

    /// JSON key used by the generative report schema.
    pub const fn key(self) -> &'static str {
        match self {
            Self::IdeasContent => "ideasContent",
            Self::StructureOrganization => "structureOrganization",
            Self::LanguageVocab => "languageVocab",
            Self::SpellingGrammar => "spellingGrammar",
        }
    }

    pub const fn weighting(self) -> RubricWeight {
        match self {
            Self::IdeasContent => RUBRIC[0],
            Self::StructureOrganization => RUBRIC[1],
            Self::LanguageVocab => RUBRIC[2],
            Self::SpellingGrammar => RUBRIC[3],
        }
    }

    pub const fn out_of(self) -> f64 {
        self.weighting().out_of
    }
}

/// A single row of the official weighting table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricWeight {
    pub criterion: Criterion,
    pub out_of: f64,
    pub weight_percent: f64,
}

/// Official weighting: maxima sum to 30 and weights to 100.
pub const RUBRIC: [RubricWeight; 4] = [
    RubricWeight {
        criterion: Criterion::IdeasContent,
        out_of: 12.0,
        weight_percent: 40.0,
    },
    RubricWeight {
        criterion: Criterion::StructureOrganization,
        out_of: 6.0,
        weight_percent: 20.0,
    },
    RubricWeight {
        criterion: Criterion::LanguageVocab,
        out_of: 7.5,
        weight_percent: 25.0,
    },
    RubricWeight {
        criterion: Criterion::SpellingGrammar,
        out_of: 4.5,
        weight_percent: 15.0,
    },
];

/// Round half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Map a 0..=1 attainment fraction onto the 1-6 band scale.
pub fn band_for_fraction(fraction: f64) -> u8 {
    const CUTOFFS: [(f64, u8); 5] = [(0.9, 6), (0.75, 5), (0.6, 4), (0.45, 3), (0.25, 2)];

    if !fraction.is_finite() {
        return MIN_BAND;
    }
    CUTOFFS
        .iter()
        .find(|(cutoff, _)| fraction >= *cutoff)
        .map(|(_, band)| *band)
        .unwrap_or(MIN_BAND)
}

pub(crate) fn clamp_band(raw: f64) -> Option<u8> {
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(f64::from(MIN_BAND), f64::from(MAX_BAND)) as u8)
}
