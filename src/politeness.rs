//! Dedupe + robots.txt admission filter. `admit` short-circuits on the
//! first negative: dedupe (cheap, O(1)) is checked before robots (a
//! network-bound fetch), so a URL already in the dedupe cache issues zero
//! robots reads or fetches.

use std::sync::Arc;

use anyhow::Result;
use robotstxt::DefaultMatcher;
use url::Url;

use crate::cache::{DedupeCache, RobotsCache};

/// The agent name passed to the robots.txt evaluator. Deliberately
/// distinct from the scraper's fetch User-Agent — see the design notes
/// on the asymmetry this preserves from the reference implementation.
pub const ROBOTS_AGENT: &str = "MyBotAgent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Accept,
    Drop(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    AlreadyCrawled,
    InvalidUrl,
    RobotsFetchFailed,
    Disallowed,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::AlreadyCrawled => "already-crawled",
            DropReason::InvalidUrl => "invalid-url",
            DropReason::RobotsFetchFailed => "robots-fetch-failed",
            DropReason::Disallowed => "disallowed",
        }
    }
}

pub struct PolitenessGate {
    dedupe: Arc<dyn DedupeCache>,
    robots_cache: Arc<dyn RobotsCache>,
    http: reqwest::Client,
}

impl PolitenessGate {
    pub fn new(dedupe: Arc<dyn DedupeCache>, robots_cache: Arc<dyn RobotsCache>) -> Result<Self> {
        Ok(Self {
            dedupe,
            robots_cache,
            http: reqwest::Client::builder().build()?,
        })
    }

    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn admit(&self, url: &str) -> Result<Admission> {
        if self.dedupe.has(url).await? {
            tracing::info!(url, "dropping: already crawled");
            return Ok(Admission::Drop(DropReason::AlreadyCrawled));
        }

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(url, "dropping: unparseable URL");
                return Ok(Admission::Drop(DropReason::InvalidUrl));
            }
        };
        let Some(host) = parsed.host_str() else {
            tracing::warn!(url, "dropping: URL has no host");
            return Ok(Admission::Drop(DropReason::InvalidUrl));
        };
        let origin = format!("{}://{}", parsed.scheme(), host);

        let body = match self.robots_cache.get(&origin).await? {
            Some(body) => body,
            None => match self.fetch_robots(&origin).await {
                Ok(body) => {
                    self.robots_cache.set(&origin, &body).await?;
                    body
                }
                Err(error) => {
                    tracing::warn!(url, %error, "dropping: robots.txt fetch failed");
                    return Ok(Admission::Drop(DropReason::RobotsFetchFailed));
                }
            },
        };

        let allowed = DefaultMatcher::default().one_agent_allowed_by_robots(&body, ROBOTS_AGENT, url);
        if allowed {
            Ok(Admission::Accept)
        } else {
            tracing::info!(url, "dropping: disallowed by robots.txt");
            Ok(Admission::Drop(DropReason::Disallowed))
        }
    }

    async fn fetch_robots(&self, origin: &str) -> Result<String> {
        let robots_url = format!("{origin}/robots.txt");
        let response = self.http.get(&robots_url).send().await?;
        Ok(response.text().await?)
    }
}
