use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use lures_core::config::{CredentialStore, TomlCredentialStore};
use lures_core::provider::{WeatherProvider, openweather::OpenWeatherProvider};
use lures_core::refresh::{App, Trigger};
use lures_core::schedule;
use lures_core::shell::fetch::HttpAssetFetcher;
use lures_core::shell::store::FsBucketStore;
use lures_core::shell::{FetchOutcome, ShellCacheWorker, ShellManifest, Url};

use crate::render::TerminalSink;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "lures", version, about = "Daily fishing lure report")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Remove the stored API key.
    ClearKey,

    /// Fetch today's report once.
    Show,

    /// Fetch now, then refresh at every local midnight until interrupted.
    Watch,

    /// Maintain the offline app-shell cache.
    Shell {
        #[command(subcommand)]
        command: ShellCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ShellCommand {
    /// Install the current asset generation and purge stale ones.
    Sync {
        /// Origin the shell assets are served from.
        #[arg(long, default_value = "http://localhost:8080")]
        origin: String,
    },

    /// Run one URL through the cache-first fetch policy.
    Fetch {
        /// Absolute URL, or a path relative to the origin.
        url: String,

        #[arg(long, default_value = "http://localhost:8080")]
        origin: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::ClearKey => clear_key(),
            Command::Show => show().await,
            Command::Watch => watch().await,
            Command::Shell { command } => match command {
                ShellCommand::Sync { origin } => shell_sync(&origin).await,
                ShellCommand::Fetch { url, origin } => shell_fetch(&url, &origin).await,
            },
        }
    }
}

fn app() -> Result<App> {
    let store: Arc<dyn CredentialStore> = Arc::new(TomlCredentialStore::new()?);
    Ok(App::new(
        store,
        Box::new(|key| {
            Arc::new(OpenWeatherProvider::new(key.to_string())) as Arc<dyn WeatherProvider>
        }),
    ))
}

fn configure() -> Result<()> {
    let key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim().to_string();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    TomlCredentialStore::new()?.set(&key)?;
    println!("API key saved.");
    Ok(())
}

fn clear_key() -> Result<()> {
    TomlCredentialStore::new()?.delete()?;
    println!("API key cleared. Store a new one with `lures configure`.");
    Ok(())
}

async fn show() -> Result<()> {
    let mut app = app()?;
    let mut sink = TerminalSink;
    app.refresh(Trigger::Manual, &mut sink).await;
    Ok(())
}

async fn watch() -> Result<()> {
    let mut app = app()?;
    let mut sink = TerminalSink;

    app.refresh(Trigger::Manual, &mut sink).await;
    loop {
        schedule::sleep_until_daily_boundary().await;
        let outcome = app.refresh(Trigger::DailyBoundary, &mut sink).await;
        tracing::info!(?outcome, "daily refresh complete");
    }
}

fn shell_worker(origin: &str) -> Result<ShellCacheWorker<FsBucketStore, HttpAssetFetcher>> {
    let origin = Url::parse(origin).context("Invalid origin URL")?;
    Ok(ShellCacheWorker::new(
        ShellManifest::default(),
        origin,
        FsBucketStore::new()?,
        HttpAssetFetcher::new(),
    ))
}

async fn shell_sync(origin: &str) -> Result<()> {
    let mut worker = shell_worker(origin)?;
    worker.on_install().await?;
    worker.on_activate()?;
    println!("Shell cache generation {} is active.", worker.generation());
    Ok(())
}

async fn shell_fetch(url: &str, origin: &str) -> Result<()> {
    let worker = shell_worker(origin)?;
    let base = Url::parse(origin).context("Invalid origin URL")?;
    let url = Url::parse(url)
        .or_else(|_| base.join(url))
        .context("Invalid URL")?;

    match worker.on_fetch(&url).await? {
        FetchOutcome::NotIntercepted => println!("Cross-origin request; not intercepted."),
        FetchOutcome::Cached(body) => println!(
            "Served {} bytes from cache generation {}.",
            body.len(),
            worker.generation()
        ),
        FetchOutcome::Network(body) => {
            println!("Cache miss; fetched {} bytes from the network.", body.len());
        }
    }
    Ok(())
}
