use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use super::aggregator::{RealtimeScoreAggregator, RealtimeUpdate};
use super::debounce::DebounceScheduler;
use super::scorers::HeuristicScorers;
use crate::config::RealtimeConfig;
use crate::essay::TextType;

/// One student's editing session: text changes are debounced, scored, and
/// the resulting updates are published on a channel.
#[derive(Debug)]
pub struct RealtimeScoringSession {
    aggregator: Arc<Mutex<RealtimeScoreAggregator>>,
    scheduler: DebounceScheduler,
    updates: mpsc::UnboundedSender<RealtimeUpdate>,
    evaluations: Arc<AtomicUsize>,
}

impl RealtimeScoringSession {
    pub fn new(
        window: Duration,
        scorers: HeuristicScorers,
    ) -> (Self, mpsc::UnboundedReceiver<RealtimeUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        let session = Self {
            aggregator: Arc::new(Mutex::new(RealtimeScoreAggregator::new(scorers))),
            scheduler: DebounceScheduler::new(window),
            updates,
            evaluations: Arc::new(AtomicUsize::new(0)),
        };
        (session, receiver)
    }

    pub fn from_config(config: &RealtimeConfig) -> (Self, mpsc::UnboundedReceiver<RealtimeUpdate>) {
        Self::new(config.debounce(), HeuristicScorers::default())
    }

    /// Record the latest text; scoring happens once input pauses.
    pub fn text_changed(&self, text: impl Into<String>, text_type: TextType) {
        let text = text.into();
        let aggregator = Arc::clone(&self.aggregator);
        let updates = self.updates.clone();
        let evaluations = Arc::clone(&self.evaluations);

        self.scheduler.schedule(async move {
            let update = aggregator
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .update(&text, text_type);
            evaluations.fetch_add(1, Ordering::SeqCst);

            if updates.send(update).is_err() {
                debug!("realtime update dropped; receiver closed");
            }
        });
    }

    /// Abandon any evaluation still waiting for the window to elapse.
    pub fn cancel_pending(&self) -> bool {
        self.scheduler.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Evaluations actually run so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}
