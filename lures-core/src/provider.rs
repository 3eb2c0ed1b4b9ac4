use crate::model::{Lake, WeatherObservation};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of current weather for a single lake.
///
/// Implementations report failure through the returned `Result`; the
/// selector treats any error as "this lake is out of today's report" and
/// never lets it abort the batch.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn observe(&self, lake: &Lake) -> anyhow::Result<WeatherObservation>;
}
