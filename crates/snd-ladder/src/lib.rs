// # Ladder Scraper
//
// Fetches the top of a region's ranked ladder from op.gg and returns the
// display names found there. The `ladder` command feeds these names into
// the history as new accounts.
//
// ## Architecture
//
// Ladder pages hold 50 rows each. Pages are fetched one after another and
// every `op.gg/summoner/userName=<name>"` link is collected. Names are
// URL-decoded and deduplicated in the order they were first seen.

use regex::Regex;
use snd_core::{Error, Region, Result};
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

/// Rows per ladder page
pub const PAGE_SIZE: usize = 50;

/// HTTP timeout for a single page
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

static NAME_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"op\.gg/summoner/userName=(.*?)""#).expect("name link pattern is valid")
});

/// Ladder scraper for one region
#[derive(Debug, Clone)]
pub struct OpGgLadder {
    /// Scheme and host, e.g. `http://euw.op.gg`
    base_url: String,

    client: reqwest::Client,
}

impl OpGgLadder {
    /// Create a scraper for a region's ladder
    pub fn new(region: Region) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: format!("http://{}.op.gg", region.ladder_subdomain()),
            client,
        })
    }

    /// Point the scraper at another host (local test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// URL of the page starting at row `start`
    fn page_url(&self, start: usize) -> String {
        format!("{}/ranking/ajax2/ladders/start={}", self.base_url, start)
    }

    /// Names of the top `size` ladder entries
    ///
    /// `size` is raised to at least one page and rounded down to whole
    /// pages. A page that cannot be fetched fails the whole call.
    pub async fn fetch(&self, size: usize) -> Result<Vec<String>> {
        let pages = size.max(PAGE_SIZE) / PAGE_SIZE;
        tracing::info!("Fetching {} ladder page(s) from {}", pages, self.base_url);

        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for page in 0..pages {
            let html = self.fetch_page(page * PAGE_SIZE).await?;
            for name in extract_names(&html) {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }

        tracing::debug!("Ladder yielded {} unique names", names.len());
        Ok(names)
    }

    async fn fetch_page(&self, start: usize) -> Result<String> {
        let url = self.page_url(start);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::provider(
                "op.gg",
                format!("HTTP error: {} for {}", response.status(), url),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response from {}: {}", url, e)))
    }
}

/// Every summoner name linked from a ladder page, in page order
///
/// Duplicates within the page are kept; [`OpGgLadder::fetch`] removes them.
pub fn extract_names(html: &str) -> Vec<String> {
    NAME_LINK
        .captures_iter(html)
        .filter_map(|caps| {
            let raw = caps.get(1)?.as_str();
            match decode_name(raw) {
                Some(name) => Some(name),
                None => {
                    tracing::warn!("Skipping undecodable ladder name: {}", raw);
                    None
                }
            }
        })
        .collect()
}

/// Form-decode a name: `+` is a space, then percent-decoding
fn decode_name(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|name| name.into_owned())
}
