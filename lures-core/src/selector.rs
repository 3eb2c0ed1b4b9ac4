//! The "best lake" selection algorithm.
//!
//! One weather query per lake runs as an independent task with its own
//! timeout; the join is settle-all, so a slow or failing lake degrades the
//! result set but never aborts its siblings. Successful observations are
//! reduced to the candidate whose estimated water temperature is closest
//! to the target.

use std::sync::Arc;
use std::time::Duration;

use crate::lures::pick_lure;
use crate::model::{Candidate, Lake};
use crate::provider::WeatherProvider;

/// Tunables for the selection run. The heuristic constants carry no
/// derivation; they are kept as configuration rather than baked into the
/// algorithm.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Ideal water temperature to fish, in Fahrenheit.
    pub target_water_temp_f: f64,
    /// Estimated air-to-water offset.
    pub water_offset_f: f64,
    /// Lower bound on the water estimate.
    pub water_floor_f: f64,
    /// Per-lake query time limit; a query past this is aborted and
    /// counted as failed.
    pub query_timeout: Duration,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            target_water_temp_f: 68.0,
            water_offset_f: 5.0,
            water_floor_f: 40.0,
            query_timeout: Duration::from_secs(8),
        }
    }
}

/// Water estimate: air minus the fixed offset, floored.
pub fn estimate_water_temp(air_temp_f: f64, cfg: &SelectorConfig) -> f64 {
    (air_temp_f - cfg.water_offset_f).max(cfg.water_floor_f)
}

/// Query every lake concurrently and return the candidate closest to the
/// target water temperature, or `None` when no query succeeded.
///
/// Never returns an error: individual query failures (network, HTTP
/// status, timeout, panic) only remove that lake from the running. Ties
/// on distance keep the earlier lake in input order.
pub async fn select_best(
    provider: Arc<dyn WeatherProvider>,
    lakes: &[Lake],
    cfg: &SelectorConfig,
) -> Option<Candidate> {
    let mut handles = Vec::with_capacity(lakes.len());
    for lake in lakes {
        let provider = Arc::clone(&provider);
        let lake = lake.clone();
        let timeout = cfg.query_timeout;

        handles.push(tokio::spawn(async move {
            match tokio::time::timeout(timeout, provider.observe(&lake)).await {
                Ok(Ok(obs)) => Some((lake, obs)),
                Ok(Err(err)) => {
                    tracing::debug!(lake = %lake.name, error = %err, "weather query failed");
                    None
                }
                Err(_) => {
                    tracing::debug!(lake = %lake.name, "weather query timed out");
                    None
                }
            }
        }));
    }

    // Await in input order so equal distances resolve to the earlier lake.
    let mut best: Option<(f64, Candidate)> = None;
    for handle in handles {
        let Ok(Some((lake, obs))) = handle.await else {
            continue;
        };

        let water = estimate_water_temp(obs.air_temp_f, cfg);
        let diff = (water - cfg.target_water_temp_f).abs();

        if best.as_ref().is_none_or(|(best_diff, _)| diff < *best_diff) {
            best = Some((
                diff,
                Candidate {
                    lake_name: lake.name,
                    air_temp_f: obs.air_temp_f,
                    water_temp_f: water,
                    condition: obs.condition,
                    lure: pick_lure(water).to_string(),
                },
            ));
        }
    }

    best.map(|(_, candidate)| candidate)
}
