use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use clap::Parser;
use rs_block_explorer::{
    api::{self, init_logging, views::HomePageView},
    chains::evm::EvmClient,
    cli::{Cli, Commands},
    config::AppConfig,
    core::provider::ChainDataProvider,
    explorer::{Explorer, ExplorerContext},
    utils::metrics::{
        ExplorerMetrics, NoopExplorerMetrics, PrometheusExplorerMetrics,
        install_prometheus_exporter,
    },
};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let cfg = AppConfig::load(&args.config)?;

    init_logging(&cfg)?;

    info!("✅ Configuration load successful");
    info!(rpc_url = %cfg.rpc.url, "RPC node");

    let metrics: Arc<dyn ExplorerMetrics> = if cfg.metrics.enable {
        install_prometheus_exporter(cfg.metrics.prometheus_exporter_port)?;
        info!(
            "📈 Prometheus exporter on port {}",
            cfg.metrics.prometheus_exporter_port
        );
        Arc::new(PrometheusExplorerMetrics::new(cfg.rpc.url.clone()))
    } else {
        Arc::new(NoopExplorerMetrics::new())
    };

    let client = EvmClient::new(&cfg.rpc.url, cfg.rpc.timeout_secs)?;
    let provider: Arc<dyn ChainDataProvider> = Arc::new(client);
    let context = ExplorerContext::new(Arc::new(cfg.explorer.clone()), metrics);
    let explorer = Arc::new(Explorer::new(provider, context));

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Page { page } => {
            let home = explorer.home_page(page).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&HomePageView::from(&home))?
            );
        }
        Commands::Serve => {
            let router = api::router(explorer);

            let listen_addr: SocketAddr = cfg.server.listen_addr.parse()?;
            let listener = tokio::net::TcpListener::bind(listen_addr).await?;
            info!("🚀 Explorer listening on {}", listener.local_addr()?);
            info!("💡 Press Ctrl+C to stop gracefully");

            axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(async {
                    match signal::ctrl_c().await {
                        Ok(()) => info!("📡 Shutdown signal received, stopping explorer"),
                        Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
                    }
                })
                .await?;

            info!("✨ Explorer exited successfully");
        }
    }

    Ok(())
}
