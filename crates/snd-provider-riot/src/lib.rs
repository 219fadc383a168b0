// # Riot Games Provider
//
// This crate provides the Riot Games API implementation of `ProviderClient`.
//
// ## Behavior
//
// - One HTTP request per lookup, no retries and no caching
// - Fixed delay after every request to stay under the key's rate ceiling
// - HTTP timeout from `ProviderConfig` (30 seconds by default)
// - Status-specific errors for 401/403, 404, 429 and 5xx
//
// ## Security Requirements
//
// - The API key is sent in the `X-Riot-Token` header, never in the URL
// - The API key NEVER appears in logs or `Debug` output
// - Construction fails fast if the key is empty
//
// ## API Reference
//
// - Summoner by name: GET `/lol/summoner/v4/summoners/by-name/:name`
// - Summoner by id: GET `/lol/summoner/v4/summoners/:id`
// - League entries: GET `/lol/league/v4/entries/by-summoner/:id`
//
// Names and ids are percent-encoded before they go into a path.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use snd_core::config::ProviderConfig;
use snd_core::traits::ProviderClient;
use snd_core::{Error, Region, Result, UNRANKED};
use std::time::Duration;

const PROVIDER_NAME: &str = "riot";

/// Header carrying the API key
const API_KEY_HEADER: &str = "X-Riot-Token";

/// Queue whose entry is reported as the account's rank
const SOLO_QUEUE: &str = "RANKED_SOLO_5x5";

/// Riot Games API provider for one region
///
/// # Rate Limiting
///
/// Every request, successful or not, is followed by a sleep of the
/// configured request interval. Since the update cycle is sequential this
/// caps the request rate of the whole process.
pub struct RiotProvider {
    /// API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Scheme and host, e.g. `https://euw1.api.riotgames.com`
    base_url: String,

    /// Delay after every request
    interval: Duration,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for RiotProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiotProvider")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("interval", &self.interval)
            .finish()
    }
}

/// Summoner object (fields the tracker reads)
#[derive(Debug, Deserialize)]
struct SummonerDto {
    id: String,
    name: String,
}

/// One league entry of a summoner
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeagueEntryDto {
    queue_type: String,
    tier: String,
    rank: String,
    league_points: i64,
}

impl RiotProvider {
    /// Create a provider for a region
    ///
    /// # Errors
    ///
    /// - `Error::Config`: The API key is empty or the timeout is zero
    /// - `Error::Http`: The HTTP client could not be built
    pub fn new(region: Region, config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.trim().to_string(),
            base_url: format!("https://{}", region.api_host()),
            interval: config.request_interval(),
            client,
        })
    }

    /// Point the provider at another host (local test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Delay enforced after every request
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// GET a path and decode the JSON body, then wait out the rate interval
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        self.paced(self.send(&url)).await
    }

    /// Await a request, then sleep the rate interval whatever its outcome
    async fn paced<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        let result = request.await;
        tokio::time::sleep(self.interval).await;
        result
    }

    async fn send<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response from {}: {}", url, e)))?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), url, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e))
        })
    }
}

#[async_trait]
impl ProviderClient for RiotProvider {
    async fn resolve_id_by_name(&self, name: &str) -> Result<String> {
        let path = format!("/lol/summoner/v4/summoners/by-name/{}", normalize_name(name));
        let summoner: SummonerDto = self.get(&path).await.map_err(|e| match e {
            Error::NotFound(_) => Error::not_found(format!("Summoner {}", name)),
            other => other,
        })?;
        Ok(summoner.id)
    }

    async fn resolve_name_by_id(&self, external_id: &str) -> Result<String> {
        let path = format!("/lol/summoner/v4/summoners/{}", urlencoding::encode(external_id));
        let summoner: SummonerDto = self.get(&path).await?;
        Ok(summoner.name)
    }

    async fn fetch_rank(&self, external_id: &str) -> Result<String> {
        let path = format!(
            "/lol/league/v4/entries/by-summoner/{}",
            urlencoding::encode(external_id)
        );
        let entries: Vec<LeagueEntryDto> = self.get(&path).await?;
        Ok(format_rank(&entries))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Map a non-success HTTP status onto the error taxonomy
fn status_error(status: u16, url: &str, body: &str) -> Error {
    match status {
        401 | 403 => Error::auth(format!(
            "API key rejected (status {}). Check that the key is valid and not expired",
            status
        )),
        404 => Error::not_found(url.to_string()),
        429 => Error::rate_limited(format!("Rate limit exceeded (status {})", status)),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("Server error (transient): {} - {}", status, body),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("Unexpected response: {} - {}", status, body),
        ),
    }
}

/// Normalize a display name for lookup: lowercase, no whitespace, percent-encoded
fn normalize_name(name: &str) -> String {
    let compact: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    urlencoding::encode(&compact).into_owned()
}

/// Rank descriptor of the solo queue entry, or `UNRANKED`
fn format_rank(entries: &[LeagueEntryDto]) -> String {
    entries
        .iter()
        .find(|entry| entry.queue_type == SOLO_QUEUE)
        .map(|entry| format!("{} {} {}LP", entry.tier, entry.rank, entry.league_points))
        .unwrap_or_else(|| UNRANKED.to_string())
}
