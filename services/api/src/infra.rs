use essay_coach::config::AppConfig;
use essay_coach::error::AppError;
use essay_coach::essay::TextType;
use essay_coach::hybrid::{
    evaluator_from_config, EvaluationService, GrammarChecker, HybridOrchestrator,
    LanguageToolClient, StaticTokenGate,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wire the concrete grammar and generative clients from configuration.
pub(crate) fn build_orchestrator(config: &AppConfig) -> Result<HybridOrchestrator, AppError> {
    let grammar: Arc<dyn GrammarChecker> = Arc::new(LanguageToolClient::new(&config.grammar)?);
    let generator = evaluator_from_config(&config.generative)?;
    info!(
        grammar_url = %config.grammar.base_url,
        model = %config.generative.model,
        "evaluation clients configured"
    );
    Ok(HybridOrchestrator::new(grammar, generator))
}

pub(crate) fn build_service(config: &AppConfig) -> Result<EvaluationService, AppError> {
    let orchestrator = build_orchestrator(config)?;
    let gate = StaticTokenGate::from_config(&config.access);
    Ok(EvaluationService::new(orchestrator, gate))
}

pub(crate) fn read_essay(path: &Path) -> Result<String, AppError> {
    Ok(std::fs::read_to_string(path)?)
}

/// Strict variant of `TextType::from_str` for command-line input, where a
/// typo should be reported rather than scored as `other`.
pub(crate) fn parse_text_type(raw: &str) -> Result<TextType, String> {
    match raw.parse::<TextType>() {
        Ok(TextType::Other) if !raw.trim().eq_ignore_ascii_case("other") => {
            Err(format!("unsupported text type '{raw}'"))
        }
        Ok(text_type) => Ok(text_type),
        Err(never) => match never {},
    }
}
