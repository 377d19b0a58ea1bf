use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::essay::{Essay, TextType};
use crate::hybrid::domain::{CorrectionKind, CorrectionSeverity, GrammarCorrection, TextSpan};
use crate::hybrid::generative::{
    CredentialError, GeneratedContent, GenerationRequest, GenerativeError, GenerativeEvaluator,
    UnavailableEvaluator,
};
use crate::hybrid::grammar::{GrammarChecker, GrammarServiceError};
use crate::hybrid::{EvaluationService, HybridOrchestrator};

pub(super) const ESSAY_TEXT: &str =
    "The old lighthouse stood alone on the cliff. Every night its keeper climed the stairs.";

pub(super) fn essay() -> Essay {
    Essay::new(ESSAY_TEXT, TextType::Narrative, "Write about a journey")
}

pub(super) fn spelling_correction() -> GrammarCorrection {
    GrammarCorrection {
        original: "climed".to_string(),
        suggestion: Some("climbed".to_string()),
        explanation: "Possible spelling mistake found.".to_string(),
        position: TextSpan::new(68, 74),
        kind: CorrectionKind::SpellingError,
        severity: CorrectionSeverity::Error,
        rule_id: "MORFOLOGIK_RULE_EN_US".to_string(),
        category: "Possible Typo".to_string(),
    }
}

/// Generator output with a non-official maximum and one bad highlight span.
pub(super) fn draft_json() -> Value {
    json!({
        "overallBand": 4,
        "bandDescription": "Sound: clear ideas with an organised structure",
        "totalScore": 99,
        "criteriaScores": {
            "ideasContent": { "score": 8, "outOf": 10, "band": 4 },
            "structureOrganization": { "score": 4, "outOf": 6, "band": 4 },
            "languageVocab": { "score": 5, "outOf": 7.5, "band": 4 },
            "spellingGrammar": { "score": 3, "outOf": 4.5, "band": 4 }
        },
        "highlights": [
            {
                "type": "strength",
                "color": "green",
                "text": "The old lighthouse",
                "startIndex": 0,
                "endIndex": 18,
                "explanation": "A vivid opening image."
            },
            {
                "type": "improvement",
                "color": "amber",
                "text": "stairs",
                "startIndex": -5,
                "endIndex": 3,
                "explanation": "Show how the keeper feels."
            }
        ],
        "grammarCorrections": [
            { "original": "invented", "position": { "start": 0, "end": 3 } }
        ],
        "detailedFeedback": {
            "strengths": ["Strong setting"],
            "areasToImprove": ["Develop the keeper's feelings"],
            "nextSteps": ["Add a complication"]
        },
        "narrativeStructure": {
            "hasOrientation": true,
            "hasComplication": false,
            "hasClimax": false,
            "hasResolution": false,
            "structureNotes": "Orientation only"
        },
        "encouragement": "Keep writing!"
    })
}

/// Grammar checker returning a fixed result and counting calls.
#[derive(Default)]
pub(super) struct FakeGrammar {
    corrections: Vec<GrammarCorrection>,
    fail: bool,
    wait_for: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl FakeGrammar {
    pub(super) fn returning(corrections: Vec<GrammarCorrection>) -> Self {
        Self {
            corrections,
            ..Self::default()
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn waiting_for(mut self, generation_started: Arc<Notify>) -> Self {
        self.wait_for = Some(generation_started);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GrammarChecker for FakeGrammar {
    async fn check(&self, _text: &str) -> Result<Vec<GrammarCorrection>, GrammarServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(generation_started) = &self.wait_for {
            generation_started.notified().await;
        }
        if self.fail {
            return Err(GrammarServiceError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(self.corrections.clone())
    }
}

/// Generator replying with fixed content, optionally announcing that it has
/// been called.
pub(super) struct FakeGenerator {
    reply: Result<String, String>,
    started: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl FakeGenerator {
    pub(super) fn replying(content: impl Into<String>) -> Self {
        Self {
            reply: Ok(content.into()),
            started: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            started: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn signalling(mut self, started: Arc<Notify>) -> Self {
        self.started = Some(started);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeEvaluator for FakeGenerator {
    async fn evaluate(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(request.system.contains("OFFICIAL RUBRIC WEIGHTING"));
        if let Some(started) = &self.started {
            started.notify_one();
        }
        match &self.reply {
            Ok(content) => Ok(GeneratedContent {
                content: content.clone(),
                model: "fake-model".to_string(),
            }),
            Err(message) => Err(GenerativeError::Status {
                status: 500,
                body: message.clone(),
            }),
        }
    }
}

pub(super) fn orchestrator(
    grammar: Arc<dyn GrammarChecker>,
    generator: Arc<dyn GenerativeEvaluator>,
) -> HybridOrchestrator {
    HybridOrchestrator::new(grammar, generator)
}

pub(super) fn merged_orchestrator() -> HybridOrchestrator {
    orchestrator(
        Arc::new(FakeGrammar::returning(vec![spelling_correction()])),
        Arc::new(FakeGenerator::replying(draft_json().to_string())),
    )
}

pub(super) fn unavailable_orchestrator() -> HybridOrchestrator {
    orchestrator(
        Arc::new(FakeGrammar::returning(vec![spelling_correction()])),
        Arc::new(UnavailableEvaluator::new(CredentialError::Missing)),
    )
}

pub(super) fn open_service(orchestrator: HybridOrchestrator) -> Arc<EvaluationService> {
    Arc::new(EvaluationService::open(orchestrator))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
