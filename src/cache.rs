//! TTL-keyed caches for dedupe and robots.txt bodies. Both are 24h TTL,
//! namespaced `crawled:<url>` / `robots:<origin>` to match the reference
//! key layout.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;

pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[async_trait]
pub trait DedupeCache: Send + Sync {
    async fn has(&self, url: &str) -> Result<bool>;
    /// Marks `url` as crawled, with a 24h TTL.
    async fn mark(&self, url: &str) -> Result<()>;
}

#[async_trait]
pub trait RobotsCache: Send + Sync {
    /// Returns the cached robots.txt body for `origin`, if present.
    async fn get(&self, origin: &str) -> Result<Option<String>>;
    /// Caches `body` for `origin` with a 24h TTL. `body` may be empty.
    async fn set(&self, origin: &str, body: &str) -> Result<()>;
}

/// In-memory TTL cache backing [`DedupeCache`], keyed `crawled:<url>`.
pub struct InMemoryDedupeCache {
    cache: Cache<String, ()>,
}

impl InMemoryDedupeCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().time_to_live(CACHE_TTL).build(),
        }
    }
}

impl Default for InMemoryDedupeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DedupeCache for InMemoryDedupeCache {
    async fn has(&self, url: &str) -> Result<bool> {
        Ok(self.cache.get(&dedupe_key(url)).await.is_some())
    }

    async fn mark(&self, url: &str) -> Result<()> {
        self.cache.insert(dedupe_key(url), ()).await;
        Ok(())
    }
}

/// In-memory TTL cache backing [`RobotsCache`], keyed `robots:<origin>`.
pub struct InMemoryRobotsCache {
    cache: Cache<String, String>,
}

impl InMemoryRobotsCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().time_to_live(CACHE_TTL).build(),
        }
    }
}

impl Default for InMemoryRobotsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RobotsCache for InMemoryRobotsCache {
    async fn get(&self, origin: &str) -> Result<Option<String>> {
        Ok(self.cache.get(&robots_key(origin)).await)
    }

    async fn set(&self, origin: &str, body: &str) -> Result<()> {
        self.cache.insert(robots_key(origin), body.to_string()).await;
        Ok(())
    }
}

fn dedupe_key(url: &str) -> String {
    format!("crawled:{url}")
}

fn robots_key(origin: &str) -> String {
    format!("robots:{origin}")
}

#[cfg(feature = "redis-cache")]
pub mod redis_backed {
    //! Networked adapters over a Redis endpoint, mirroring the reference
    //! implementation's `RedisCache` (`SetCrawledURL`/`HasCrawledURL`,
    //! `SetRobotsTXT`/`GetRobotsTXT`) key-for-key, including the 24h TTL
    //! and namespace prefixes.

    use super::*;
    use redis::AsyncCommands;

    pub struct RedisDedupeCache {
        client: redis::Client,
    }

    impl RedisDedupeCache {
        pub fn new(address: &str) -> Result<Self> {
            Ok(Self {
                client: redis::Client::open(address)?,
            })
        }
    }

    #[async_trait]
    impl DedupeCache for RedisDedupeCache {
        async fn has(&self, url: &str) -> Result<bool> {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let exists: bool = conn.exists(dedupe_key(url)).await?;
            Ok(exists)
        }

        async fn mark(&self, url: &str) -> Result<()> {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            conn.set_ex::<_, _, ()>(dedupe_key(url), "1", CACHE_TTL.as_secs())
                .await?;
            Ok(())
        }
    }

    pub struct RedisRobotsCache {
        client: redis::Client,
    }

    impl RedisRobotsCache {
        pub fn new(address: &str) -> Result<Self> {
            Ok(Self {
                client: redis::Client::open(address)?,
            })
        }
    }

    #[async_trait]
    impl RobotsCache for RedisRobotsCache {
        async fn get(&self, origin: &str) -> Result<Option<String>> {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let body: Option<String> = conn.get(robots_key(origin)).await?;
            Ok(body)
        }

        async fn set(&self, origin: &str, body: &str) -> Result<()> {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            conn.set_ex::<_, _, ()>(robots_key(origin), body, CACHE_TTL.as_secs())
                .await?;
            Ok(())
        }
    }
}
