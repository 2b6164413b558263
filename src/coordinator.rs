//! The driver loop: pulls URLs from the frontier, gates them on
//! dedupe/robots, leases a worker, and dispatches the scrape concurrently.
//! Pull is strictly sequential; dispatch is concurrent. Lease happens
//! after admission so denied URLs never consume worker time.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::cache::{DedupeCache, RobotsCache};
use crate::error::CrawlError;
use crate::frontier::Frontier;
use crate::politeness::{Admission, PolitenessGate};
use crate::pool::WorkerPool;
use crate::result_handler::ResultHandler;
use crate::store::PageStore;

pub struct Coordinator {
    frontier: Arc<dyn Frontier>,
    gate: PolitenessGate,
    pool: WorkerPool,
    handler: Arc<ResultHandler>,
}

impl Coordinator {
    /// Allocates `num_scrapers` scrapers eagerly and wires the gate and
    /// result handler to the given external clients. Seed URLs are the
    /// embedding program's responsibility to push before (or racing)
    /// `run` — pull simply blocks until one arrives.
    pub fn new(
        num_scrapers: usize,
        frontier: Arc<dyn Frontier>,
        store: Arc<dyn PageStore>,
        dedupe: Arc<dyn DedupeCache>,
        robots_cache: Arc<dyn RobotsCache>,
    ) -> Result<Self, CrawlError> {
        let gate = PolitenessGate::new(dedupe.clone(), robots_cache)
            .map_err(|error| CrawlError::Fatal(error.to_string()))?;
        let pool = WorkerPool::new(num_scrapers)
            .map_err(|error| CrawlError::Fatal(error.to_string()))?;
        let handler = Arc::new(ResultHandler::new(frontier.clone(), store, dedupe));
        Ok(Self {
            frontier,
            gate,
            pool,
            handler,
        })
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    pub fn pool_in_use(&self) -> usize {
        self.pool.in_use()
    }

    pub fn frontier(&self) -> &Arc<dyn Frontier> {
        &self.frontier
    }

    /// Runs the pull loop until `cancel` fires, then stops spawning new
    /// dispatch tasks and awaits the in-flight ones before returning.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn run(&self, cancel: CancellationToken) {
        let mut dispatched = JoinSet::new();

        loop {
            let url = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                pulled = self.frontier.pull() => pulled,
            };

            let url = match url {
                Ok(url) => url,
                Err(error) => {
                    tracing::warn!(%error, "error reading from frontier");
                    continue;
                }
            };

            match self.gate.admit(&url).await {
                Ok(Admission::Accept) => {}
                Ok(Admission::Drop(reason)) => {
                    tracing::info!(%url, reason = reason.as_str(), "dropped at admission");
                    continue;
                }
                Err(error) => {
                    tracing::warn!(%url, %error, "politeness gate error");
                    continue;
                }
            }

            let worker = match self.pool.lease().await {
                Ok(worker) => worker,
                Err(error) => {
                    tracing::error!(%url, %error, "failed to lease a worker");
                    continue;
                }
            };

            let pool = self.pool.clone();
            let handler = self.handler.clone();
            let dispatch_url = url.clone();
            dispatched.spawn(async move {
                match worker.scrape(&dispatch_url).await {
                    Ok(page) => {
                        if let Err(error) = handler.handle(page).await {
                            tracing::error!(url = %dispatch_url, %error, "result handler failed");
                        }
                    }
                    Err(error) => {
                        tracing::warn!(url = %dispatch_url, %error, "scrape failed");
                    }
                }
                pool.release(worker).await;
            });

            // Reap completed tasks without blocking the pull loop.
            while dispatched.try_join_next().is_some() {}
        }

        tracing::info!(pending = dispatched.len(), "draining in-flight dispatch tasks");
        while dispatched.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InMemoryDedupeCache, InMemoryRobotsCache};
    use crate::frontier::InMemoryFrontier;
    use crate::store::InMemoryPageStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn seed_to_scrape_to_store_and_fan_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<title>A</title><a href="/x">x</a>"#,
            ))
            .mount(&server)
            .await;

        let frontier = Arc::new(InMemoryFrontier::new());
        let store = Arc::new(InMemoryPageStore::new());
        let dedupe = Arc::new(InMemoryDedupeCache::new());
        let robots = Arc::new(InMemoryRobotsCache::new());

        let coordinator = Arc::new(
            Coordinator::new(
                1,
                frontier.clone() as Arc<dyn Frontier>,
                store.clone(),
                dedupe.clone(),
                robots,
            )
            .unwrap(),
        );

        let seed = server.uri();
        frontier.push(&seed).await.unwrap();

        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        let run_handle = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.run(cancel_clone).await }
        });

        // Give the loop time to pull, admit, scrape, and handle the seed.
        let discovered = tokio::time::timeout(std::time::Duration::from_secs(5), frontier.pull())
            .await
            .expect("expected the extracted link to be pushed")
            .unwrap();
        assert_eq!(discovered, format!("{}/x", seed));

        assert!(dedupe.has(&format!("{}/", seed)).await.unwrap());
        assert_eq!(store.pages().await.len(), 1);

        cancel.cancel();
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), run_handle).await;
    }
}
