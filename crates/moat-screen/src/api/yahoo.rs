//! Yahoo Finance client
//!
//! Everything goes through the `yahoo_finance_api` connector: the latest close
//! from the chart endpoint, EPS, dividends and ratios from the ticker summary.
//! The connector handles the cookie and crumb handshake the summary endpoint
//! requires. Yahoo does not report ROIC or any of the composite scores.

use super::{DataSource, SharedRateLimiter, rate_limiter};
use crate::config::{DataProvider, ScreenConfig};
use crate::error::{Result, ScreenError};
use crate::model::{Metric, MetricsRecord, ProfileRecord, percent_to_fraction};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use yahoo_finance_api as yahoo;

/// Yahoo Finance client
///
/// The connector is shared so the crumb fetched for the first symbol is
/// reused by the rest of the batch.
#[derive(Clone)]
pub struct YahooFinanceClient {
    connector: Arc<Mutex<yahoo::YahooConnector>>,
    timeout: Duration,
    rate_limiter: SharedRateLimiter,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(timeout: Duration, rate_limit: u32) -> Result<Self> {
        let connector = yahoo::YahooConnector::builder()
            .timeout(timeout)
            .build()
            .map_err(yahoo_error)?;

        Ok(Self {
            connector: Arc::new(Mutex::new(connector)),
            timeout,
            rate_limiter: rate_limiter(rate_limit),
        })
    }

    /// Create from a configuration
    pub fn from_config(config: &ScreenConfig) -> Result<Self> {
        Self::new(config.request_timeout, config.rate_limit_per_minute)
    }

    /// Get the latest close for a symbol
    pub async fn get_latest_price(&self, symbol: &str) -> Result<f64> {
        self.rate_limiter.until_ready().await;

        let connector = self.connector.lock().await;
        let response = self
            .bounded("quote", connector.get_latest_quotes(symbol, "1d"))
            .await?;

        let quote = response.last_quote().map_err(yahoo_error)?;
        Ok(quote.close)
    }

    /// Get the ticker summary (financial data, key statistics, summary detail)
    pub async fn get_summary(&self, symbol: &str) -> Result<yahoo::YSummaryData> {
        self.rate_limiter.until_ready().await;
        tracing::debug!("Fetching ticker summary for {}", symbol);

        let mut connector = self.connector.lock().await;
        let summary = self
            .bounded("summary", connector.get_ticker_info(symbol))
            .await?;

        summary_data(symbol, summary)
    }

    /// Get the profile record
    ///
    /// EPS and dividends are best effort: when the summary lookup fails the
    /// record still carries the price.
    pub async fn get_profile(&self, symbol: &str) -> Result<ProfileRecord> {
        let price = self.get_latest_price(symbol).await?;

        let summary = match self.get_summary(symbol).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::debug!("No key statistics for {}: {}", symbol, e);
                None
            }
        };

        Ok(parse_profile(price, summary.as_ref()))
    }

    /// Get the metrics record
    pub async fn get_metrics(&self, symbol: &str) -> Result<MetricsRecord> {
        let summary = self.get_summary(symbol).await?;
        parse_metrics(symbol, &summary)
    }

    async fn bounded<T>(
        &self,
        what: &str,
        request: impl Future<Output = std::result::Result<T, yahoo::YahooError>>,
    ) -> Result<T> {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| {
                ScreenError::YahooFinanceError(format!(
                    "{what} request timed out after {:?}",
                    self.timeout
                ))
            })?
            .map_err(yahoo_error)
    }
}

#[async_trait]
impl DataSource for YahooFinanceClient {
    fn provider(&self) -> DataProvider {
        DataProvider::Yahoo
    }

    async fn profile(&self, symbol: &str) -> Result<ProfileRecord> {
        self.get_profile(symbol).await
    }

    async fn metrics(&self, symbol: &str) -> Result<MetricsRecord> {
        self.get_metrics(symbol).await
    }
}

fn yahoo_error(e: yahoo::YahooError) -> ScreenError {
    ScreenError::YahooFinanceError(e.to_string())
}

fn summary_data(symbol: &str, summary: yahoo::YQuoteSummary) -> Result<yahoo::YSummaryData> {
    // errors arrive either at the top level or inside quoteSummary
    if let Some(description) = summary
        .finance
        .and_then(|finance| finance.error)
        .and_then(|error| error.description)
    {
        return Err(ScreenError::unavailable(symbol, description));
    }

    let quote_summary = summary
        .quote_summary
        .ok_or_else(|| ScreenError::unavailable(symbol, "unexpected payload shape"))?;

    if let Some(description) = quote_summary.error.and_then(|error| error.description) {
        return Err(ScreenError::unavailable(symbol, description));
    }

    quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ScreenError::unavailable(symbol, "empty payload"))
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn parse_profile(price: f64, summary: Option<&yahoo::YSummaryData>) -> ProfileRecord {
    let stats = summary.and_then(|s| s.default_key_statistics.as_ref());
    let detail = summary.and_then(|s| s.summary_detail.as_ref());

    let eps = finite(stats.and_then(|s| s.trailing_eps)).unwrap_or(0.0);
    let dividend_yield = finite(detail.and_then(|d| d.dividend_yield));
    let dividend_rate = finite(detail.and_then(|d| d.dividend_rate));

    ProfileRecord::new(price, eps, dividend_yield).with_dividend_per_share(dividend_rate)
}

fn parse_metrics(symbol: &str, summary: &yahoo::YSummaryData) -> Result<MetricsRecord> {
    let financial = summary
        .financial_data
        .as_ref()
        .ok_or_else(|| ScreenError::unavailable(symbol, "no financialData module"))?;
    let stats_margin = summary
        .default_key_statistics
        .as_ref()
        .and_then(|s| s.profit_margins);

    let ratio = |value: Option<f64>| finite(value).unwrap_or(0.0);

    Ok(MetricsRecord {
        net_margin: ratio(financial.profit_margins.or(stats_margin)),
        roic: 0.0,
        roe: ratio(financial.return_on_equity),
        // reported in percent
        debt_to_equity: percent_to_fraction(ratio(financial.debt_to_equity)),
        piotroski_score: Metric::Unavailable,
        altman_z_score: Metric::Unavailable,
        beneish_m_score: Metric::Unavailable,
    })
}
