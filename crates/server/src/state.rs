use std::sync::Arc;

use marquee_metadata::aggregate::Aggregator;
use marquee_metadata::provider::TextGenerator;
use sqlx::SqlitePool;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub aggregator: Arc<Aggregator>,
    /// `None` when no generative-text key is configured.
    pub writer: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    pub fn new(aggregator: Arc<Aggregator>, writer: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            db: aggregator.extras().pool().clone(),
            aggregator,
            writer,
        }
    }
}
