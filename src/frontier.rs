//! The durable, partitioned queue of URL strings the coordinator pulls
//! from and pushes discovered links back into. At-least-once delivery:
//! duplicates are expected and absorbed downstream by the dedupe cache.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

#[async_trait]
pub trait Frontier: Send + Sync {
    /// Blocks until a URL is available. Cancel-safe: callers race this
    /// against a shutdown signal.
    async fn pull(&self) -> Result<String>;

    /// Appends a URL. May be batched internally by a real implementation.
    async fn push(&self, url: &str) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// An in-process frontier backed by an unbounded mpsc channel. Stands in
/// for a Kafka-backed queue in tests and single-process deployments: same
/// at-least-once contract, no external broker.
pub struct InMemoryFrontier {
    tx: mpsc::UnboundedSender<String>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
}

impl InMemoryFrontier {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: tokio::sync::Mutex::new(rx),
        }
    }
}

impl Default for InMemoryFrontier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Frontier for InMemoryFrontier {
    async fn pull(&self) -> Result<String> {
        let mut rx = self.rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("frontier channel closed"))
    }

    async fn push(&self, url: &str) -> Result<()> {
        self.tx
            .send(url.to_string())
            .map_err(|_| anyhow::anyhow!("frontier channel closed"))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_then_pull_round_trips() {
        let frontier = InMemoryFrontier::new();
        frontier.push("http://a.test/").await.unwrap();
        let url = frontier.pull().await.unwrap();
        assert_eq!(url, "http://a.test/");
    }
}
