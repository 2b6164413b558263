use thiserror::Error;

/// Error taxonomy at the library boundary. Internal plumbing (coordinator,
/// dispatch tasks) works in `anyhow::Result` and logs-and-continues per
/// component; this enum is what the handful of calls that *can* fail fatally
/// (constructing a `Coordinator`) actually return.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("transport error: {0}")]
    Transport(#[from] anyhow::Error),

    #[error("could not parse: {0}")]
    Parse(String),

    #[error("fatal startup error: {0}")]
    Fatal(String),
}
