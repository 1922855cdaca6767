use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::{config::ExplorerConfig, utils::metrics::ExplorerMetrics};

/// Shared, read-only state handed to every page assembly.
#[derive(Clone)]
pub struct ExplorerContext {
    pub config: Arc<ExplorerConfig>,
    pub metrics: Arc<dyn ExplorerMetrics>,
    pub rpc_semaphore: Arc<Semaphore>,
}

impl ExplorerContext {
    pub fn new(config: Arc<ExplorerConfig>, metrics: Arc<dyn ExplorerMetrics>) -> Self {
        let rpc_semaphore = Arc::new(Semaphore::new(config.receipt_concurrency.max(1)));
        Self {
            config,
            metrics,
            rpc_semaphore,
        }
    }

    pub fn metrics(&self) -> &dyn ExplorerMetrics {
        self.metrics.as_ref()
    }
}
