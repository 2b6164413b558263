//! Fetches a single URL and produces a structured [`CrawledPage`].
//!
//! A `Scraper` is a reusable fetch context — user-agent, headers, and
//! client all fixed at construction — but carries no state *between*
//! calls. Each `scrape` builds its own extraction accumulator from a
//! fresh HTML parse, so nothing leaks across calls the way a shared
//! collector would (see the per-call extraction state note in the
//! design docs).

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::page::CrawledPage;

const FETCH_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Max jitter applied before each request, smoothing bursts against a
/// single host.
const MAX_PRE_REQUEST_DELAY_MS: u64 = 50;

/// A single-URL HTTP fetcher. Safe to reuse serially; must not be driven
/// by two tasks concurrently (the worker pool enforces this via
/// lease/release).
#[derive(Clone)]
pub struct Scraper {
    client: Client,
}

impl Scraper {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Accept",
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert("Accept-Encoding", HeaderValue::from_static("gzip, deflate, br"));
        headers.insert("DNT", HeaderValue::from_static("1"));
        headers.insert("Connection", HeaderValue::from_static("keep-alive"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

        let client = Client::builder()
            .user_agent(FETCH_USER_AGENT)
            .default_headers(headers)
            .build()
            .context("failed to build scraper HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch `url` and extract title, description, and links in one pass
    /// over the response body. URL-revisit is permitted — de-dup is a
    /// politeness-gate decision, not this scraper's.
    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn scrape(&self, url: &str) -> Result<CrawledPage> {
        let request_url = Url::parse(url).with_context(|| format!("invalid URL: {url}"))?;

        let delay_ms = rand::thread_rng().gen_range(0..=MAX_PRE_REQUEST_DELAY_MS);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let response = self
            .client
            .get(request_url.clone())
            .send()
            .await
            .with_context(|| format!("fetch failed for {url}"))?;

        let status_code = response.status().as_u16();
        let headers = flatten_headers(response.headers());
        let html = response
            .text()
            .await
            .with_context(|| format!("failed to read response body for {url}"))?;

        let mut page = CrawledPage::new(request_url.to_string(), status_code);
        page.headers = headers;
        page.html = html.clone();
        extract(&html, &request_url, &mut page);

        Ok(page)
    }
}

fn flatten_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in headers.iter() {
        if let Ok(v) = value.to_str() {
            out.entry(name.as_str().to_string())
                .or_default()
                .push(v.to_string());
        }
    }
    out
}

/// Populates `page.title`, `page.description`, and `page.extracted_urls`
/// from one parse of `html`. Empty `href`s are dropped; duplicates are
/// retained in source order.
fn extract(html: &str, base: &Url, page: &mut CrawledPage) {
    let document = Html::parse_document(html);

    if let Ok(title_selector) = Selector::parse("title") {
        if let Some(title) = document.select(&title_selector).next() {
            page.title = title.text().collect::<String>();
        }
    }

    if let Ok(meta_selector) = Selector::parse(r#"meta[name="description"]"#) {
        if let Some(meta) = document.select(&meta_selector).next() {
            if let Some(content) = meta.value().attr("content") {
                page.description = content.to_string();
            }
        }
    }

    if let Ok(link_selector) = Selector::parse("a[href]") {
        page.extracted_urls = document
            .select(&link_selector)
            .filter_map(|el| el.value().attr("href"))
            .filter(|href| !href.is_empty())
            .filter_map(|href| base.join(href).ok())
            .map(|url| url.to_string())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn scrape_extracts_title_description_and_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><title>A</title>
                   <meta name="description" content="a page"></head>
                   <body><a href="/x">x</a><a href="/x">again</a></body></html>"#,
            ))
            .mount(&server)
            .await;

        let scraper = Scraper::new().unwrap();
        let page = scraper.scrape(&server.uri()).await.unwrap();

        assert_eq!(page.status_code, 200);
        assert_eq!(page.title, "A");
        assert_eq!(page.description, "a page");
        assert_eq!(
            page.extracted_urls,
            vec![format!("{}/x", server.uri()), format!("{}/x", server.uri())]
        );
    }

    #[tokio::test]
    async fn scrape_surfaces_transport_errors() {
        let scraper = Scraper::new().unwrap();
        let result = scraper.scrape("http://127.0.0.1:0/").await;
        assert!(result.is_err());
    }
}
