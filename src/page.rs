use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The output of one scrape.
///
/// `extracted_urls` are always absolute, resolved against the request URL,
/// and retain source order with duplicates intact. If `status_code`
/// indicates success the `html` body is always present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrawledPage {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub status_code: u16,
    /// Header name (case preserved as received) to its list of values.
    pub headers: HashMap<String, Vec<String>>,
    pub html: String,
    pub title: String,
    pub description: String,
    pub extracted_urls: Vec<String>,
}

impl CrawledPage {
    pub fn new(url: String, status_code: u16) -> Self {
        Self {
            url,
            timestamp: Utc::now(),
            status_code,
            headers: HashMap::new(),
            html: String::new(),
            title: String::new(),
            description: String::new(),
            extracted_urls: Vec::new(),
        }
    }
}
