use std::sync::Arc;

use crate::agent::SentenceGeneratorAgent;
use crate::config::ServerConfig;
use crate::worker::PredictorHandle;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Built once at startup and never mutated afterwards; cloning is cheap
/// (everything is behind an `Arc` or a channel handle).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub predictor: PredictorHandle,
    pub agent: Arc<SentenceGeneratorAgent>,
}
