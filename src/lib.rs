//! Core of a distributed web crawler: a frontier-driven coordinator that
//! dedupes and politeness-checks URLs, dispatches scraping work across a
//! bounded, elastic worker pool, persists results, and feeds discovered
//! links back into the frontier.
//!
//! The frontier, page store, dedupe/robots cache, and protobuf facade are
//! external collaborators, specified here as narrow traits ([`Frontier`],
//! [`PageStore`], [`DedupeCache`], [`RobotsCache`]) with in-memory
//! adapters for single-process use and testing.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod frontier;
pub mod grpc;
pub mod page;
pub mod politeness;
pub mod pool;
pub mod result_handler;
pub mod scraper;
pub mod store;

pub mod proto {
    include!("crawler.rs");
}

pub use cache::{DedupeCache, InMemoryDedupeCache, InMemoryRobotsCache, RobotsCache};
pub use coordinator::Coordinator;
pub use error::CrawlError;
pub use frontier::{Frontier, InMemoryFrontier};
pub use page::CrawledPage;
pub use politeness::{Admission, DropReason, PolitenessGate};
pub use pool::WorkerPool;
pub use result_handler::ResultHandler;
pub use scraper::Scraper;
pub use store::{InMemoryPageStore, PageStore};
