//! Core library for the Daily Lures fishing report.
//!
//! This crate defines:
//! - The lake table, lure rules and the best-lake selection algorithm
//! - Credential handling for the weather provider
//! - The refresh entry point with its trigger and debounce surface
//! - The app-shell cache worker lifecycle
//!
//! It is used by `lures-cli`, but can also be reused by other binaries or
//! services.

pub mod config;
pub mod lures;
pub mod model;
pub mod provider;
pub mod refresh;
pub mod schedule;
pub mod selector;
pub mod shell;

pub use config::{CredentialStore, TomlCredentialStore};
pub use model::{Candidate, DisplayRecord, Lake, WeatherObservation, default_lakes};
pub use provider::WeatherProvider;
pub use refresh::{App, RefreshOutcome, RenderSink, Trigger};
pub use selector::{SelectorConfig, select_best};
pub use shell::{FetchOutcome, ShellCacheWorker, ShellManifest, WorkerState};
