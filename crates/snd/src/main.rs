// # snd - Summoner Name Database CLI
//
// This binary is a THIN integration layer:
// - Parse the command line and environment
// - Build the configuration, provider and store for one region
// - Run a single command against snd-core and print its result
//
// All history logic lives in snd-core.
//
// ## Configuration
//
// Every option can be given as a flag or through the environment:
//
// - `SND_API_KEY`: Riot API key
// - `SND_API_KEY_FILE`: File holding the API key (default `api_key.txt`)
// - `SND_KEY_TIER`: `production` (default) or `development`
// - `SND_REQUEST_INTERVAL_MS`: Override the delay after every API request
// - `DATABASE_DIR`: Directory of the `snd_<server>.json` stores (default `.`)
// - `SND_LOG_LEVEL`: trace, debug, info (default), warn or error
//
// ## Example
//
// ```bash
// export SND_API_KEY=RGAPI-...
// snd add euw "Hide on bush"
// snd update euw
// snd find euw bush
// ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use snd_core::config::{KeyTier, ProviderConfig, Region, SndConfig, StoreConfig};
use snd_core::traits::{HistoryStore, ProviderClient};
use snd_core::{HistoryEngine, HistoryQuery};
use snd_provider_riot::RiotProvider;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Command completed
/// - 1: Configuration error (missing key, rejected key, bad store directory)
/// - 2: Command error (lookup without a match, provider or store failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SndExitCode {
    /// Command completed (per-item failures in batches are only logged)
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The command itself failed
    CommandError = 2,
}

impl From<SndExitCode> for ExitCode {
    fn from(code: SndExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "snd",
    version,
    about = "Summoner Name Database: track name changes and peak ranks of game accounts"
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command
#[derive(Debug, Args)]
struct Settings {
    /// Riot API key
    #[arg(long, global = true, env = "SND_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// File holding the API key, read when no key is given directly
    #[arg(long, global = true, env = "SND_API_KEY_FILE", default_value = "api_key.txt")]
    api_key_file: PathBuf,

    /// API key tier, which sets the delay between requests
    #[arg(long, global = true, env = "SND_KEY_TIER", default_value = "production")]
    key_tier: KeyTier,

    /// Delay after every API request in milliseconds, overriding the key tier
    #[arg(long, global = true, env = "SND_REQUEST_INTERVAL_MS")]
    request_interval_ms: Option<u64>,

    /// Directory holding the per-server history files
    #[arg(long, global = true, env = "DATABASE_DIR", default_value = ".")]
    database_dir: PathBuf,

    /// Log level
    #[arg(long, global = true, env = "SND_LOG_LEVEL", default_value = "info")]
    log_level: Level,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add accounts by summoner name
    #[command(name = "add")]
    Add {
        server: Region,
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Add accounts by summoner id
    #[command(name = "add_id")]
    AddId {
        server: Region,
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Record name changes and new peak ranks of every tracked account
    #[command(name = "update")]
    Update { server: Region },

    /// Print the current name of every tracked account
    #[command(name = "list")]
    List { server: Region },

    /// Print the history of accounts that ever carried a matching name
    #[command(name = "find")]
    Find { server: Region, keyword: String },

    /// Print the history of one account
    #[command(name = "find_id")]
    FindId { server: Region, id: String },

    /// Print the current name of a summoner id
    #[command(name = "id2name")]
    IdToName { server: Region, id: String },

    /// Print the summoner id of a name
    #[command(name = "name2id")]
    NameToId { server: Region, name: String },

    /// Add the top of the ranked ladder
    #[cfg(feature = "ladder")]
    #[command(name = "ladder")]
    Ladder {
        server: Region,
        #[arg(default_value_t = 50)]
        size: usize,
    },
}

impl Command {
    fn server(&self) -> Region {
        match self {
            Command::Add { server, .. }
            | Command::AddId { server, .. }
            | Command::Update { server }
            | Command::List { server }
            | Command::Find { server, .. }
            | Command::FindId { server, .. }
            | Command::IdToName { server, .. }
            | Command::NameToId { server, .. } => *server,
            #[cfg(feature = "ladder")]
            Command::Ladder { server, .. } => *server,
        }
    }
}

impl Settings {
    /// The API key, from the flag/environment or else from the key file
    fn resolve_api_key(&self) -> snd_core::Result<String> {
        if let Some(key) = self.api_key.as_deref().map(str::trim)
            && !key.is_empty()
        {
            return Ok(key.to_string());
        }

        let key = std::fs::read_to_string(&self.api_key_file).map_err(|e| {
            snd_core::Error::config(format!(
                "No API key. Set SND_API_KEY or create {} ({})",
                self.api_key_file.display(),
                e
            ))
        })?;
        Ok(key.trim().to_string())
    }

    fn store(&self) -> StoreConfig {
        StoreConfig::File {
            dir: self.database_dir.clone(),
        }
    }

    /// Full configuration for commands that talk to the API
    fn snd_config(&self, region: Region) -> snd_core::Result<SndConfig> {
        let mut provider = ProviderConfig::new(self.resolve_api_key()?).with_key_tier(self.key_tier);
        if let Some(interval_ms) = self.request_interval_ms {
            provider = provider.with_request_interval_ms(interval_ms);
        }

        let config = SndConfig {
            region,
            provider,
            store: self.store(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration for read-only commands, which need no API key
    fn store_config(&self, region: Region) -> snd_core::Result<SndConfig> {
        let config = SndConfig::new(region, String::new()).with_store(self.store());
        config.store.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.settings.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SndExitCode::ConfigError.into();
    }

    // Requests are strictly sequential; one thread is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SndExitCode::CommandError.into();
        }
    };

    let code = rt.block_on(async {
        match run(cli).await {
            Ok(()) => SndExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                exit_code_for(&e)
            }
        }
    });

    code.into()
}

fn exit_code_for(err: &anyhow::Error) -> SndExitCode {
    match err.downcast_ref::<snd_core::Error>() {
        Some(snd_core::Error::Config(_)) | Some(snd_core::Error::Authentication(_)) => {
            SndExitCode::ConfigError
        }
        _ => SndExitCode::CommandError,
    }
}

/// Run one command
async fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings;
    let region = cli.command.server();

    match cli.command {
        Command::Add { names, .. } => {
            let engine = engine(&settings, region).await?;
            let report = engine.add_names(&names).await?;
            info!(
                "Added {} account(s), {} failed",
                report.added.len(),
                report.failed.len()
            );
        }
        Command::AddId { ids, .. } => {
            let engine = engine(&settings, region).await?;
            let report = engine.add_ids(&ids).await?;
            info!(
                "Added {} account(s), {} failed",
                report.added.len(),
                report.failed.len()
            );
        }
        Command::Update { .. } => {
            let engine = engine(&settings, region).await?;
            engine.run_update_cycle().await?;
        }
        Command::List { .. } => {
            let store = store(&settings, region).await?;
            for name in HistoryQuery::new(store.as_ref()).list_current_names().await? {
                println!("{}", name);
            }
        }
        Command::Find { keyword, .. } => {
            let store = store(&settings, region).await?;
            let timelines = HistoryQuery::new(store.as_ref())
                .find_by_name_substring(&keyword)
                .await?;
            for timeline in timelines {
                print!("{}", timeline);
            }
        }
        Command::FindId { id, .. } => {
            let store = store(&settings, region).await?;
            let timeline = HistoryQuery::new(store.as_ref())
                .find_by_external_id(&id)
                .await?;
            print!("{}", timeline);
        }
        Command::IdToName { id, .. } => {
            let provider = provider(&settings, region)?;
            println!("{}", provider.resolve_name_by_id(&id).await?);
        }
        Command::NameToId { name, .. } => {
            let provider = provider(&settings, region)?;
            println!("{}", provider.resolve_id_by_name(&name).await?);
        }
        #[cfg(feature = "ladder")]
        Command::Ladder { size, .. } => {
            // Key and store are checked before any page is scraped
            let engine = engine(&settings, region).await?;

            let names = snd_ladder::OpGgLadder::new(region)?.fetch(size).await?;
            info!("Ladder returned {} name(s)", names.len());

            let report = engine.add_names(&names).await?;
            info!(
                "Added {} account(s), {} failed",
                report.added.len(),
                report.failed.len()
            );
        }
    }

    Ok(())
}

fn provider(settings: &Settings, region: Region) -> Result<RiotProvider> {
    let config = settings.snd_config(region)?;
    Ok(RiotProvider::new(region, &config.provider)?)
}

async fn store(settings: &Settings, region: Region) -> Result<Box<dyn HistoryStore>> {
    let config = settings.store_config(region)?;
    Ok(snd_core::open_store(&config).await?)
}

async fn engine(settings: &Settings, region: Region) -> Result<HistoryEngine> {
    let config = settings.snd_config(region)?;
    let provider = RiotProvider::new(region, &config.provider)?;
    let store = snd_core::open_store(&config).await?;
    Ok(HistoryEngine::new(Box::new(provider), store, region))
}
