use std::{net::SocketAddr, time::Duration};

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Why a block inside a page window was left out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockSkipReason {
    NotFound,
    Rpc,
}

/// Outcome of a token decimals lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecimalsLookup {
    Cached,
    Resolved,
    Failed,
}

/// Abstraction over explorer runtime metrics, allowing a no-op implementation when disabled.
pub trait ExplorerMetrics: Send + Sync {
    fn record_page_rendered(&self, duration: Duration, block_count: usize);
    fn record_block_skipped(&self, reason: BlockSkipReason);
    fn record_decimals_lookup(&self, lookup: DecimalsLookup);
    fn record_chain_head(&self, head: u64);
}

#[derive(Default)]
pub struct NoopExplorerMetrics;

impl NoopExplorerMetrics {
    pub fn new() -> Self {
        Self
    }
}

impl ExplorerMetrics for NoopExplorerMetrics {
    fn record_page_rendered(&self, _duration: Duration, _block_count: usize) {}

    fn record_block_skipped(&self, _reason: BlockSkipReason) {}

    fn record_decimals_lookup(&self, _lookup: DecimalsLookup) {}

    fn record_chain_head(&self, _head: u64) {}
}

pub struct PrometheusExplorerMetrics {
    network: String,
}

impl PrometheusExplorerMetrics {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
        }
    }
}

impl ExplorerMetrics for PrometheusExplorerMetrics {
    fn record_page_rendered(&self, duration: Duration, block_count: usize) {
        let network = self.network.clone();
        metrics::histogram!(
            "explorer_page_render_seconds",
            duration.as_secs_f64(),
            "network" => network.clone()
        );
        metrics::counter!(
            "explorer_pages_rendered_total",
            1,
            "network" => network.clone()
        );
        metrics::gauge!(
            "explorer_page_blocks",
            block_count as f64,
            "network" => network
        );
    }

    fn record_block_skipped(&self, reason: BlockSkipReason) {
        let network = self.network.clone();
        let reason_label = match reason {
            BlockSkipReason::NotFound => "not_found",
            BlockSkipReason::Rpc => "rpc_error",
        };
        metrics::counter!(
            "explorer_blocks_skipped_total",
            1,
            "network" => network,
            "reason" => reason_label
        );
    }

    fn record_decimals_lookup(&self, lookup: DecimalsLookup) {
        let network = self.network.clone();
        let outcome = match lookup {
            DecimalsLookup::Cached => "cached",
            DecimalsLookup::Resolved => "resolved",
            DecimalsLookup::Failed => "failed",
        };
        metrics::counter!(
            "explorer_decimals_lookups_total",
            1,
            "network" => network,
            "outcome" => outcome
        );
    }

    fn record_chain_head(&self, head: u64) {
        let network = self.network.clone();
        metrics::gauge!(
            "explorer_chain_head",
            head as f64,
            "network" => network
        );
    }
}

/// Serve `/metrics` on the given port. Must be called from within a tokio runtime.
pub fn install_prometheus_exporter(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    Ok(())
}
