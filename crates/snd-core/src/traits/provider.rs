// # Provider Client Trait
//
// Defines the interface for reading current account state from the remote
// game API.
//
// ## Implementations
//
// - Riot Games API: `snd-provider-riot` crate
//
// ## Usage
//
// ```rust,ignore
// use snd_core::ProviderClient;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* ProviderClient implementation */;
//
//     let id = provider.resolve_id_by_name("Hide on bush").await?;
//     let name = provider.resolve_name_by_id(&id).await?;
//     let rank = provider.resolve_rank_by_id(&id).await; // never fails
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::rank::UNRANKED;

/// Trait for provider client implementations
///
/// Providers are single-shot: one logical lookup per call, no retries and
/// no caching. The only policy they own is the request-rate ceiling of the
/// remote API: implementations must wait a fixed minimum delay after every
/// request they send.
///
/// ## Forbidden Capabilities
/// - ❌ Spawn tasks or threads (the update cycle is strictly sequential)
/// - ❌ Implement retry logic (a network failure is final for that request)
/// - ❌ Access the history store (owned by `HistoryEngine`)
/// - ❌ Decide whether a value is a change (owned by the detector)
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Resolve the provider-assigned account id for a display name
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The external id
    /// - `Err(Error::NotFound)`: No account has this name
    /// - `Err(Error)`: The request failed
    async fn resolve_id_by_name(&self, name: &str) -> Result<String, crate::Error>;

    /// Resolve the current display name of an account
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The current name
    /// - `Err(Error)`: The request failed or the account is unknown
    async fn resolve_name_by_id(&self, external_id: &str) -> Result<String, crate::Error>;

    /// Fetch the current rank descriptor of an account
    ///
    /// Returns `UNRANKED` when the account has no ranked entry, and an
    /// error when the lookup itself failed. Callers normally want
    /// [`ProviderClient::resolve_rank_by_id`] instead.
    async fn fetch_rank(&self, external_id: &str) -> Result<String, crate::Error>;

    /// Resolve the current rank descriptor of an account
    ///
    /// Never fails: any lookup error is logged and collapses to the
    /// `UNRANKED` sentinel, which the rank ordering treats as a valid
    /// worst-possible rank.
    async fn resolve_rank_by_id(&self, external_id: &str) -> String {
        match self.fetch_rank(external_id).await {
            Ok(rank) => rank,
            Err(e) => {
                tracing::warn!(
                    "Rank unavailable for {} ({}), using {}",
                    external_id,
                    e,
                    UNRANKED
                );
                UNRANKED.to_string()
            }
        }
    }

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
