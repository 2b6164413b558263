//! Write-mostly persistent store keyed by URL. Idempotency is not
//! required — duplicates from at-least-once delivery are tolerated.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::page::CrawledPage;

#[async_trait]
pub trait PageStore: Send + Sync {
    /// Writes one page. The store owns its own schema and encoding of
    /// headers and extracted URLs.
    async fn store(&self, page: &CrawledPage) -> Result<()>;
}

/// An in-process store, for tests and single-node deployments without a
/// Cassandra (or similar) backend wired up.
#[derive(Default)]
pub struct InMemoryPageStore {
    pages: Mutex<Vec<CrawledPage>>,
}

impl InMemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pages(&self) -> Vec<CrawledPage> {
        self.pages.lock().await.clone()
    }
}

#[async_trait]
impl PageStore for InMemoryPageStore {
    async fn store(&self, page: &CrawledPage) -> Result<()> {
        self.pages.lock().await.push(page.clone());
        Ok(())
    }
}
