//! The single refresh entry point and its trigger surface.
//!
//! Every way the report can be re-run (user action, the page coming back
//! into view, the daily boundary) funnels through [`App::refresh`] as an
//! explicit [`Trigger`]. Rate limiting on the manual trigger is a policy
//! value, not a wrapper closure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;

use crate::config::CredentialStore;
use crate::model::{DisplayRecord, Lake, default_lakes};
use crate::provider::WeatherProvider;
use crate::selector::{SelectorConfig, select_best};

/// Shown when no credential is stored; no network call is made.
pub const MISSING_KEY_NOTICE: &str =
    "No OpenWeather API key stored. Run `lures configure` and enter your key.";

/// Shown when every lake query failed. Retryable by any trigger.
pub const FETCH_FAILED_NOTICE: &str =
    "Error fetching weather. Check your API key or try again shortly.";

/// What caused a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Explicit user action; the only debounced trigger.
    Manual,
    /// The page (or window) became visible again.
    VisibilityResumed,
    /// Local midnight passed.
    DailyBoundary,
}

/// Rate limit on the manual trigger: a second manual refresh within the
/// window is dropped. Other triggers always pass.
#[derive(Debug)]
pub struct DebouncePolicy {
    window: Duration,
    last_manual: Option<Instant>,
}

impl DebouncePolicy {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_manual: None,
        }
    }

    pub fn admit(&mut self, trigger: Trigger, now: Instant) -> bool {
        if trigger != Trigger::Manual {
            return true;
        }
        match self.last_manual {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last_manual = Some(now);
                true
            }
        }
    }
}

impl Default for DebouncePolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(600))
    }
}

/// One-way write interface to the presentation layer.
pub trait RenderSink {
    fn render_report(&mut self, record: &DisplayRecord);
    fn render_notice(&mut self, notice: &str);
}

/// Result of one refresh invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Manual trigger arrived inside the debounce window; nothing ran.
    Debounced,
    /// No credential stored; no network call was attempted.
    MissingCredential,
    /// Every lake query failed.
    NoResult,
    /// A best lake was found and written to the sink.
    Reported(DisplayRecord),
}

/// Builds a provider from the credential read at refresh time.
pub type ProviderFactory = Box<dyn Fn(&str) -> Arc<dyn WeatherProvider> + Send + Sync>;

/// Application context: the credential capability, the provider seam, the
/// lake table and the selector tunables, passed explicitly to each
/// refresh instead of living in globals.
pub struct App {
    store: Arc<dyn CredentialStore>,
    provider_factory: ProviderFactory,
    lakes: Vec<Lake>,
    selector_cfg: SelectorConfig,
    debounce: DebouncePolicy,
}

impl App {
    /// Context with the fixed lake table and default tunables.
    pub fn new(store: Arc<dyn CredentialStore>, provider_factory: ProviderFactory) -> Self {
        Self {
            store,
            provider_factory,
            lakes: default_lakes(),
            selector_cfg: SelectorConfig::default(),
            debounce: DebouncePolicy::default(),
        }
    }

    pub fn with_lakes(mut self, lakes: Vec<Lake>) -> Self {
        self.lakes = lakes;
        self
    }

    pub fn with_selector_config(mut self, cfg: SelectorConfig) -> Self {
        self.selector_cfg = cfg;
        self
    }

    pub fn with_debounce(mut self, debounce: DebouncePolicy) -> Self {
        self.debounce = debounce;
        self
    }

    /// Run one refresh cycle for the given trigger, writing the report or
    /// a notice to the sink.
    pub async fn refresh(&mut self, trigger: Trigger, sink: &mut dyn RenderSink) -> RefreshOutcome {
        if !self.debounce.admit(trigger, Instant::now()) {
            tracing::debug!("manual refresh debounced");
            return RefreshOutcome::Debounced;
        }

        let api_key = match self.store.get() {
            Ok(Some(key)) => key,
            Ok(None) => {
                sink.render_notice(MISSING_KEY_NOTICE);
                return RefreshOutcome::MissingCredential;
            }
            Err(err) => {
                tracing::warn!(error = %err, "credential store read failed");
                sink.render_notice(MISSING_KEY_NOTICE);
                return RefreshOutcome::MissingCredential;
            }
        };

        tracing::info!(?trigger, lakes = self.lakes.len(), "refreshing report");
        let provider = (self.provider_factory)(&api_key);

        match select_best(provider, &self.lakes, &self.selector_cfg).await {
            Some(candidate) => {
                let record = DisplayRecord::from_candidate(&candidate, Local::now().date_naive());
                sink.render_report(&record);
                RefreshOutcome::Reported(record)
            }
            None => {
                sink.render_notice(FETCH_FAILED_NOTICE);
                RefreshOutcome::NoResult
            }
        }
    }
}
