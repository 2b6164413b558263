use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tracing_subscriber::EnvFilter;

use crawlkit::cache::{InMemoryDedupeCache, InMemoryRobotsCache};
use crawlkit::config::{Cli, Config};
use crawlkit::coordinator::Coordinator;
use crawlkit::frontier::InMemoryFrontier;
use crawlkit::grpc::CrawlCoordinatorService;
use crawlkit::proto::crawl_coordinator_server::CrawlCoordinatorServer;
use crawlkit::store::InMemoryPageStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli).context("failed to load configuration")?;

    // In-memory adapters stand in for the durable frontier/page-store/cache
    // endpoints named in the config; wiring a Redis- or Kafka-backed
    // adapter in their place is a construction-time choice, not a change
    // to the coordinator.
    let frontier = Arc::new(InMemoryFrontier::new());
    let store = Arc::new(InMemoryPageStore::new());
    let dedupe = Arc::new(InMemoryDedupeCache::new());
    let robots = Arc::new(InMemoryRobotsCache::new());

    let coordinator = Arc::new(
        Coordinator::new(config.num_scrapers, frontier.clone(), store, dedupe, robots)
            .context("failed to construct coordinator")?,
    );

    let cancel = CancellationToken::new();

    let driver = {
        let coordinator = coordinator.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { coordinator.run(cancel).await })
    };

    // Seeds are pushed after the loop starts; the first pull may race the
    // first seed, but pull simply blocks, so this is benign.
    for seed in &config.seed_urls {
        if let Err(error) = frontier.push(seed).await {
            tracing::warn!(%seed, %error, "failed to seed URL");
        }
    }

    let addr = config.bind_addr.parse().context("invalid bind address")?;
    let service = CrawlCoordinatorService::new(coordinator);
    tracing::info!(%addr, "crawl coordinator listening");

    let serve = Server::builder()
        .add_service(CrawlCoordinatorServer::new(service))
        .serve_with_shutdown(addr, shutdown_signal());

    serve.await.context("gRPC server failed")?;

    cancel.cancel();
    driver.await.context("coordinator driver task panicked")?;

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");

    tokio::select! {
        _ = sigint.recv() => tracing::info!("received SIGINT, shutting down"),
        _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
    }
}
