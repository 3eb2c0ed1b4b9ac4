//! App-shell cache worker.
//!
//! An explicit three-state lifecycle object standing in for a browser
//! service worker: install populates a generation-tagged bucket with the
//! asset manifest (all or nothing), activate purges every other
//! generation, and fetch serves same-origin requests cache-first with a
//! network fallback. Cross-origin requests are not intercepted.

use anyhow::{Context, Result, anyhow};
pub use reqwest::Url;

pub mod fetch;
pub mod store;

use fetch::AssetFetcher;
use store::BucketStore;

/// Current cache generation tag. Any change to the asset list below must
/// come with a new tag so prior caches get invalidated on activation.
pub const SHELL_GENERATION: &str = "shell-v2";

/// Relative asset paths making up the app shell.
pub const SHELL_ASSETS: &[&str] = &[
    "/",
    "index.html",
    "app.js",
    "manifest.json",
    "icon-192.png",
    "icon-512.png",
];

/// The asset list for one cache generation, fixed at build time.
#[derive(Debug, Clone)]
pub struct ShellManifest {
    pub generation: String,
    pub assets: Vec<String>,
}

impl Default for ShellManifest {
    fn default() -> Self {
        Self {
            generation: SHELL_GENERATION.to_string(),
            assets: SHELL_ASSETS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Lifecycle position of the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Created; the manifest has not been cached yet.
    Installing,
    /// Install completed; stale generations still exist until activation.
    Installed,
    /// Serving; only the current generation remains.
    Active,
}

/// Where the bytes for one fetch came from.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Cross-origin request; left to default handling.
    NotIntercepted,
    /// Served from the current generation bucket.
    Cached(Vec<u8>),
    /// Cache miss, passed through to the network.
    Network(Vec<u8>),
}

pub struct ShellCacheWorker<S, F> {
    manifest: ShellManifest,
    origin: Url,
    store: S,
    fetcher: F,
    state: WorkerState,
}

/// Cache entry key for a URL: path plus query, so `/app.js?v=2` and
/// `/app.js` are distinct entries.
fn entry_key(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

impl<S: BucketStore, F: AssetFetcher> ShellCacheWorker<S, F> {
    pub fn new(manifest: ShellManifest, origin: Url, store: S, fetcher: F) -> Self {
        Self {
            manifest,
            origin,
            store,
            fetcher,
            state: WorkerState::Installing,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn generation(&self) -> &str {
        &self.manifest.generation
    }

    /// Fetch every manifest asset and populate the current generation
    /// bucket. Any asset failure aborts the whole install before the
    /// bucket is touched, leaving prior generations serving.
    pub async fn on_install(&mut self) -> Result<()> {
        if self.state != WorkerState::Installing {
            return Err(anyhow!("install has already completed for this worker"));
        }

        let mut bodies = Vec::with_capacity(self.manifest.assets.len());
        for asset in &self.manifest.assets {
            let url = self
                .origin
                .join(asset)
                .with_context(|| format!("Invalid shell asset path: {asset}"))?;
            let body = self
                .fetcher
                .fetch(&url)
                .await
                .with_context(|| format!("Failed to fetch shell asset: {asset}"))?;
            bodies.push((entry_key(&url), body));
        }

        for (entry, body) in &bodies {
            self.store.put(&self.manifest.generation, entry, body)?;
        }

        self.state = WorkerState::Installed;
        tracing::info!(
            generation = %self.manifest.generation,
            assets = self.manifest.assets.len(),
            "shell cache installed"
        );
        Ok(())
    }

    /// Delete every bucket that is not the current generation and start
    /// serving. Control is taken immediately; there is no deferred
    /// handover.
    pub fn on_activate(&mut self) -> Result<()> {
        if self.state != WorkerState::Installed {
            return Err(anyhow!("activate is only valid after a completed install"));
        }

        for tag in self.store.list()? {
            if tag != self.manifest.generation {
                self.store.delete(&tag)?;
                tracing::info!(%tag, "purged stale shell cache generation");
            }
        }

        self.state = WorkerState::Active;
        Ok(())
    }

    /// Resolve one request: same-origin requests are answered from the
    /// cache when possible, falling through to the network otherwise. A
    /// network failure on the fallback path propagates to the caller as
    /// an ordinary failed request.
    pub async fn on_fetch(&self, url: &Url) -> Result<FetchOutcome> {
        if url.origin() != self.origin.origin() {
            return Ok(FetchOutcome::NotIntercepted);
        }

        if let Some(body) = self.store.get(&self.manifest.generation, &entry_key(url))? {
            return Ok(FetchOutcome::Cached(body));
        }

        let body = self.fetcher.fetch(url).await?;
        Ok(FetchOutcome::Network(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use store::MemoryBucketStore;

    const ORIGIN: &str = "https://lures.example";

    /// Fetcher scripted by URL path; records every request it serves.
    #[derive(Debug, Default)]
    struct ScriptedFetcher {
        bodies: HashMap<String, Vec<u8>>,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn with_shell_assets() -> Self {
            let manifest = ShellManifest::default();
            let origin = Url::parse(ORIGIN).unwrap();
            let mut bodies = HashMap::new();
            for asset in &manifest.assets {
                let path = origin.join(asset).unwrap().path().to_string();
                bodies.insert(path.clone(), format!("body of {path}").into_bytes());
            }
            Self {
                bodies,
                ..Self::default()
            }
        }

        fn calls_for(&self, path: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.as_str() == path)
                .count()
        }
    }

    #[async_trait]
    impl AssetFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
            let path = url.path().to_string();
            self.calls.lock().unwrap().push(path.clone());
            if self.failing.contains(&path) {
                return Err(anyhow!("scripted failure for {path}"));
            }
            self.bodies
                .get(&path)
                .cloned()
                .ok_or_else(|| anyhow!("no scripted body for {path}"))
        }
    }

    fn worker(fetcher: ScriptedFetcher) -> ShellCacheWorker<MemoryBucketStore, ScriptedFetcher> {
        ShellCacheWorker::new(
            ShellManifest::default(),
            Url::parse(ORIGIN).unwrap(),
            MemoryBucketStore::default(),
            fetcher,
        )
    }

    fn url(path: &str) -> Url {
        Url::parse(ORIGIN).unwrap().join(path).unwrap()
    }

    #[tokio::test]
    async fn install_populates_exactly_the_manifest() {
        let mut worker = worker(ScriptedFetcher::with_shell_assets());

        worker.on_install().await.expect("install");
        assert_eq!(worker.state(), WorkerState::Installed);

        let mut cached = worker.store.entries(SHELL_GENERATION).expect("entries");
        cached.sort();
        let mut expected: Vec<String> = SHELL_ASSETS
            .iter()
            .map(|a| url(a).path().to_string())
            .collect();
        expected.sort();
        expected.dedup();
        assert_eq!(cached, expected);
    }

    #[tokio::test]
    async fn failed_asset_aborts_install_without_partial_population() {
        let mut fetcher = ScriptedFetcher::with_shell_assets();
        fetcher.failing.insert("/manifest.json".to_string());
        let mut worker = worker(fetcher);

        let err = worker.on_install().await.unwrap_err();
        assert!(err.to_string().contains("manifest.json"));
        assert_eq!(worker.state(), WorkerState::Installing);
        assert!(worker.store.list().expect("list").is_empty());

        // Without a completed install there is nothing to activate.
        assert!(worker.on_activate().is_err());
    }

    #[tokio::test]
    async fn activate_purges_every_stale_generation() {
        let mut worker = worker(ScriptedFetcher::with_shell_assets());
        worker.store.put("shell-v1", "/app.js", b"old").expect("seed");
        worker.store.put("shell-v0", "/app.js", b"older").expect("seed");

        worker.on_install().await.expect("install");
        worker.on_activate().expect("activate");

        assert_eq!(worker.state(), WorkerState::Active);
        assert_eq!(
            worker.store.list().expect("list"),
            vec![SHELL_GENERATION.to_string()]
        );
    }

    #[tokio::test]
    async fn cached_fetch_never_reaches_the_network() {
        let mut worker = worker(ScriptedFetcher::with_shell_assets());
        worker.on_install().await.expect("install");
        worker.on_activate().expect("activate");

        let installs = worker.fetcher.calls_for("/app.js");
        let outcome = worker.on_fetch(&url("app.js")).await.expect("fetch");

        assert_eq!(outcome, FetchOutcome::Cached(b"body of /app.js".to_vec()));
        assert_eq!(worker.fetcher.calls_for("/app.js"), installs);
    }

    #[tokio::test]
    async fn query_string_makes_a_distinct_cache_entry() {
        let mut worker = worker(ScriptedFetcher::with_shell_assets());
        worker.on_install().await.expect("install");
        worker.on_activate().expect("activate");

        // Same path with a query is not the cached asset; it goes to
        // the network.
        let outcome = worker.on_fetch(&url("app.js?v=2")).await.expect("fetch");
        assert_eq!(outcome, FetchOutcome::Network(b"body of /app.js".to_vec()));
    }

    #[tokio::test]
    async fn cache_miss_passes_through_to_network() {
        let mut fetcher = ScriptedFetcher::with_shell_assets();
        fetcher
            .bodies
            .insert("/data.json".to_string(), b"dynamic".to_vec());
        let mut worker = worker(fetcher);
        worker.on_install().await.expect("install");
        worker.on_activate().expect("activate");

        let outcome = worker.on_fetch(&url("data.json")).await.expect("fetch");
        assert_eq!(outcome, FetchOutcome::Network(b"dynamic".to_vec()));
    }

    #[tokio::test]
    async fn network_failure_on_miss_propagates() {
        let mut fetcher = ScriptedFetcher::with_shell_assets();
        fetcher.failing.insert("/data.json".to_string());
        let mut worker = worker(fetcher);
        worker.on_install().await.expect("install");
        worker.on_activate().expect("activate");

        assert!(worker.on_fetch(&url("data.json")).await.is_err());
    }

    #[tokio::test]
    async fn cross_origin_requests_are_not_intercepted() {
        let mut worker = worker(ScriptedFetcher::with_shell_assets());
        worker.on_install().await.expect("install");
        worker.on_activate().expect("activate");

        let other = Url::parse("https://api.openweathermap.org/data/2.5/weather").unwrap();
        let outcome = worker.on_fetch(&other).await.expect("fetch");

        assert_eq!(outcome, FetchOutcome::NotIntercepted);
        assert_eq!(worker.fetcher.calls_for("/data/2.5/weather"), 0);
    }
}
