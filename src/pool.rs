//! An elastic pool of [`Scraper`]s with lease/return semantics, floored at
//! its initial size and grown under starvation.
//!
//! The availability channel is the sole synchronization primitive between
//! lease and release in the common case. It is unbounded: the growth path
//! can add scrapers without growing a bounded channel's capacity in
//! lockstep, so `release` can never block waiting for a free permit. The
//! growth lock only serializes allocations triggered by starvation — it
//! never gates a normal lease/release round trip.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, Mutex};

use crate::scraper::Scraper;

/// How long `lease` waits for an available slot before growing the pool.
const LEASE_TIMEOUT: Duration = Duration::from_secs(30);

struct Inner {
    tx: mpsc::UnboundedSender<Scraper>,
    rx: Mutex<mpsc::UnboundedReceiver<Scraper>>,
    /// Serializes starvation-triggered growth only.
    growth_lock: Mutex<()>,
    size: AtomicUsize,
    in_use: AtomicUsize,
}

/// Elastic availability queue of [`Scraper`]s.
///
/// `N` (the capacity passed to [`WorkerPool::new`]) is a floor, not a
/// ceiling: sustained lease starvation grows the pool monotonically. The
/// pool never shrinks.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<Inner>,
}

impl WorkerPool {
    /// Eagerly allocates `n` scrapers and fills the availability channel.
    pub fn new(n: usize) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        for _ in 0..n {
            tx.send(Scraper::new()?)
                .expect("receiver held by self and never dropped");
        }
        Ok(Self {
            inner: Arc::new(Inner {
                tx,
                rx: Mutex::new(rx),
                growth_lock: Mutex::new(()),
                size: AtomicUsize::new(n),
                in_use: AtomicUsize::new(0),
            }),
        })
    }

    /// Leases a scraper, waiting up to 30s for one to free up before
    /// growing the pool. A scraper allocated on the starvation path is
    /// returned directly, never enqueued.
    #[tracing::instrument(skip(self))]
    pub async fn lease(&self) -> Result<Scraper> {
        let scraper = {
            let mut rx = self.inner.rx.lock().await;
            match tokio::time::timeout(LEASE_TIMEOUT, rx.recv()).await {
                Ok(Some(scraper)) => scraper,
                Ok(None) => unreachable!("pool sender is held by self and never dropped"),
                Err(_elapsed) => {
                    drop(rx);
                    tracing::warn!("worker pool starved for 30s, growing pool");
                    let _growth = self.inner.growth_lock.lock().await;
                    let scraper = Scraper::new()?;
                    self.inner.size.fetch_add(1, Ordering::SeqCst);
                    scraper
                }
            }
        };
        self.inner.in_use.fetch_add(1, Ordering::SeqCst);
        Ok(scraper)
    }

    /// Returns a leased scraper to the availability channel. Never blocks:
    /// the availability queue is unbounded, so a scraper allocated on the
    /// starvation path (`pool.rs` growth branch above) can always be
    /// returned here even though it bypassed the channel on its way out.
    pub async fn release(&self, scraper: Scraper) {
        self.inner.in_use.fetch_sub(1, Ordering::SeqCst);
        // Fails only if the receiver were dropped, which never happens
        // while the pool is alive.
        let _ = self.inner.tx.send(scraper);
    }

    /// Total scrapers ever allocated (initial N + starvation growth).
    pub fn size(&self) -> usize {
        self.inner.size.load(Ordering::SeqCst)
    }

    /// Scrapers currently leased out to dispatch tasks.
    pub fn in_use(&self) -> usize {
        self.inner.in_use.load(Ordering::SeqCst)
    }
}
