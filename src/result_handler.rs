//! Persists a scraped page and feeds its discovered links back into the
//! frontier. No transactional coupling between the store write, the
//! frontier pushes, and the dedupe mark — this is at-least-once on
//! purpose; duplicates are absorbed downstream.

use std::sync::Arc;

use anyhow::Result;

use crate::cache::DedupeCache;
use crate::frontier::Frontier;
use crate::page::CrawledPage;
use crate::store::PageStore;

pub struct ResultHandler {
    frontier: Arc<dyn Frontier>,
    store: Arc<dyn PageStore>,
    dedupe: Arc<dyn DedupeCache>,
}

impl ResultHandler {
    pub fn new(frontier: Arc<dyn Frontier>, store: Arc<dyn PageStore>, dedupe: Arc<dyn DedupeCache>) -> Self {
        Self {
            frontier,
            store,
            dedupe,
        }
    }

    /// Only called after a successful scrape — never for a drop — so
    /// transient robots failures or fetch errors stay retryable via the
    /// frontier's at-least-once redelivery.
    #[tracing::instrument(skip(self, page), fields(url = %page.url, links = page.extracted_urls.len()))]
    pub async fn handle(&self, page: CrawledPage) -> Result<()> {
        if let Err(error) = self.store.store(&page).await {
            tracing::error!(url = %page.url, %error, "failed to persist page");
        }

        for link in &page.extracted_urls {
            if let Err(error) = self.frontier.push(link).await {
                tracing::error!(url = %page.url, link = %link, %error, "failed to push discovered link");
            }
        }

        self.dedupe.mark(&page.url).await?;
        Ok(())
    }
}
