// Application state (AppState)

use crate::core::config::Config;
use crate::metrics::collector::Metrics;
use crate::stores::board_store::BoardStore;
use crate::wal::wal::Wal;
use std::sync::Arc;

/// Shared application state
///
/// Contains all shared components that are accessed by request handlers.
/// All fields are wrapped in Arc for efficient cloning across threads.
#[derive(Clone)]
pub struct AppState {
    /// Board store: one lock per board
    pub boards: Arc<BoardStore>,

    /// Metrics collector for tracking statistics
    pub metrics: Arc<Metrics>,

    /// Write-Ahead Log for persistence
    pub wal: Arc<Wal>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, wal: Wal) -> Self {
        let config = Arc::new(config);

        Self {
            boards: Arc::new(BoardStore::with_capacity(config.queue.board_capacity)),
            metrics: Arc::new(Metrics::new()),
            wal: Arc::new(wal),
            config,
        }
    }
}
