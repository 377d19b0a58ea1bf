use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::access::{AccessGate, OpenAccess};
use super::orchestrator::HybridOrchestrator;
use crate::essay::{Essay, TextType};
use crate::realtime::score_text;

/// Orchestrator plus the entitlement gate in front of it.
pub struct EvaluationService {
    orchestrator: HybridOrchestrator,
    gate: Arc<dyn AccessGate>,
}

impl EvaluationService {
    pub fn new(orchestrator: HybridOrchestrator, gate: Arc<dyn AccessGate>) -> Self {
        Self { orchestrator, gate }
    }

    pub fn open(orchestrator: HybridOrchestrator) -> Self {
        Self::new(orchestrator, Arc::new(OpenAccess))
    }

    pub fn orchestrator(&self) -> &HybridOrchestrator {
        &self.orchestrator
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    #[serde(default)]
    pub essay_content: String,
    #[serde(default)]
    pub text_type: TextType,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeScoreRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub text_type: TextType,
}

/// Router exposing the submission and realtime scoring endpoints.
pub fn evaluation_router(service: Arc<EvaluationService>) -> Router {
    Router::new()
        .route("/api/v1/essays/evaluate", post(evaluate_handler))
        .route("/api/v1/essays/realtime-score", post(realtime_handler))
        .with_state(service)
}

pub(crate) async fn evaluate_handler(
    State(service): State<Arc<EvaluationService>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<EvaluationRequest>,
) -> Response {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if !service.gate.has_access(authorization) {
        info!("evaluation rejected by access gate");
        let payload = json!({
            "error": "an active subscription is required to request an evaluation",
        });
        return (StatusCode::FORBIDDEN, axum::Json(payload)).into_response();
    }

    let essay = Essay::new(request.essay_content, request.text_type, request.prompt);
    match service.orchestrator.evaluate(&essay).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn realtime_handler(
    State(service): State<Arc<EvaluationService>>,
    axum::Json(request): axum::Json<RealtimeScoreRequest>,
) -> Response {
    let score = score_text(
        service.orchestrator.scorers(),
        &request.text,
        request.text_type,
    );
    (StatusCode::OK, axum::Json(score)).into_response()
}
