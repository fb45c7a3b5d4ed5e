//! Data sources for profile and metrics records
//!
//! Every provider implements [`DataSource`]. Provider errors stop at
//! [`fetch_records`]: callers only ever see a record or its absence, plus an
//! [`Advisory`] explaining the absence.

pub mod fmp;
pub mod yahoo;

pub use fmp::FmpClient;
pub use yahoo::YahooFinanceClient;

use crate::config::{DataProvider, ScreenConfig};
use crate::error::Result;
use crate::model::{MetricsRecord, ProfileRecord};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

pub(crate) type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

pub(crate) const USER_AGENT: &str = concat!("moat-screen/", env!("CARGO_PKG_VERSION"));

/// A provider of per-symbol profile and metrics records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Which provider backs this source
    fn provider(&self) -> DataProvider;

    /// Fetch price, EPS and dividend yield
    async fn profile(&self, symbol: &str) -> Result<ProfileRecord>;

    /// Fetch ratios and composite scores
    async fn metrics(&self, symbol: &str) -> Result<MetricsRecord>;
}

/// Build the source selected by `config`
pub fn build_source(config: &ScreenConfig) -> Result<Arc<dyn DataSource>> {
    config.validate()?;
    let source: Arc<dyn DataSource> = match config.provider {
        DataProvider::Fmp => Arc::new(FmpClient::from_config(config)?),
        DataProvider::Yahoo => Arc::new(YahooFinanceClient::from_config(config)?),
    };
    Ok(source)
}

/// Which of the two records an advisory is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Profile,
    Metrics,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile => f.write_str("profile"),
            Self::Metrics => f.write_str("metrics"),
        }
    }
}

/// Per-symbol notice that a record could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub symbol: String,
    pub record: RecordKind,
    pub reason: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} unavailable ({})", self.symbol, self.record, self.reason)
    }
}

/// Outcome of fetching both records for one symbol
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedRecords {
    pub profile: Option<ProfileRecord>,
    pub metrics: Option<MetricsRecord>,
    pub advisories: Vec<Advisory>,
}

impl FetchedRecords {
    pub fn is_complete(&self) -> bool {
        self.profile.is_some() && self.metrics.is_some()
    }
}

/// Fetch profile then metrics for `symbol`, turning failures into advisories.
pub async fn fetch_records(source: &dyn DataSource, symbol: &str) -> FetchedRecords {
    let mut fetched = FetchedRecords::default();

    match source.profile(symbol).await {
        Ok(profile) => fetched.profile = Some(profile),
        Err(e) => fetched.advisories.push(advise(source, symbol, RecordKind::Profile, &e)),
    }

    match source.metrics(symbol).await {
        Ok(metrics) => fetched.metrics = Some(metrics),
        Err(e) => fetched.advisories.push(advise(source, symbol, RecordKind::Metrics, &e)),
    }

    fetched
}

fn advise(
    source: &dyn DataSource,
    symbol: &str,
    record: RecordKind,
    error: &crate::error::ScreenError,
) -> Advisory {
    tracing::warn!(
        "Failed to get {} for {} from {}: {}",
        record,
        symbol,
        source.provider(),
        error
    );
    Advisory {
        symbol: symbol.to_string(),
        record,
        reason: error.to_string(),
    }
}

pub(crate) fn rate_limiter(requests_per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Read a numeric field, defaulting to 0 when missing, null or unparsable.
///
/// Some providers send numbers as strings, so numeric strings are accepted.
pub(crate) fn number_or_zero(object: &Value, key: &str) -> f64 {
    optional_number(object, key).unwrap_or(0.0)
}

pub(crate) fn optional_number(object: &Value, key: &str) -> Option<f64> {
    let value = match object.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}
