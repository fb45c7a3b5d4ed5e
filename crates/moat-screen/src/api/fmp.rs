//! Financial Modeling Prep API client

use super::{DataSource, SharedRateLimiter, USER_AGENT, number_or_zero, optional_number, rate_limiter};
use crate::config::{DataProvider, ScreenConfig};
use crate::error::{Result, ScreenError};
use crate::model::{Metric, MetricsRecord, ProfileRecord, round2};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Financial Modeling Prep API client
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl FmpClient {
    /// Create a new FMP client
    ///
    /// # Arguments
    /// * `api_key` - FMP API key
    /// * `base_url` - API root, e.g. `https://financialmodelingprep.com/api/v3`
    /// * `timeout` - Timeout applied to each request
    /// * `rate_limit` - Maximum requests per minute
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        rate_limit: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: rate_limiter(rate_limit),
        })
    }

    /// Create from a validated configuration
    pub fn from_config(config: &ScreenConfig) -> Result<Self> {
        let api_key = config.fmp_api_key.clone().ok_or_else(|| {
            ScreenError::ConfigError("FMP API key required for the FMP provider".to_string())
        })?;

        Self::new(
            api_key,
            config.fmp_base_url.clone(),
            config.request_timeout,
            config.rate_limit_per_minute,
        )
    }

    /// Get the company profile record
    pub async fn get_profile(&self, symbol: &str) -> Result<ProfileRecord> {
        let data = self.get(symbol, &format!("profile/{symbol}"), &[]).await?;
        let record = first_record(symbol, &data)?;
        Ok(parse_profile(record))
    }

    /// Get the latest annual key metrics record
    pub async fn get_key_metrics(&self, symbol: &str) -> Result<MetricsRecord> {
        let data = self
            .get(
                symbol,
                &format!("key-metrics/{symbol}"),
                &[("period", "annual"), ("limit", "1")],
            )
            .await?;
        let record = first_record(symbol, &data)?;
        Ok(parse_metrics(record))
    }

    async fn get(&self, symbol: &str, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("GET {} for {}", url, symbol);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScreenError::HttpStatus {
                provider: DataProvider::Fmp.to_string(),
                symbol: symbol.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DataSource for FmpClient {
    fn provider(&self) -> DataProvider {
        DataProvider::Fmp
    }

    async fn profile(&self, symbol: &str) -> Result<ProfileRecord> {
        self.get_profile(symbol).await
    }

    async fn metrics(&self, symbol: &str) -> Result<MetricsRecord> {
        self.get_key_metrics(symbol).await
    }
}

/// FMP answers with an array; the first element is the record.
fn first_record<'a>(symbol: &str, data: &'a Value) -> Result<&'a Value> {
    // Check for API error messages
    if let Some(error) = data.get("Error Message").and_then(Value::as_str) {
        return Err(ScreenError::unavailable(symbol, error));
    }

    match data.as_array().and_then(|records| records.first()) {
        Some(record) if record.is_object() => Ok(record),
        Some(_) => Err(ScreenError::unavailable(symbol, "unexpected payload shape")),
        None => Err(ScreenError::unavailable(symbol, "empty payload")),
    }
}

fn parse_profile(record: &Value) -> ProfileRecord {
    let price = number_or_zero(record, "price");
    // lastDiv is the annual dividend per share
    let last_dividend = optional_number(record, "lastDiv");
    let dividend_yield = last_dividend
        .filter(|_| price > 0.0)
        .map(|dividend| dividend / price);

    ProfileRecord::new(price, number_or_zero(record, "eps"), dividend_yield)
        .with_dividend_per_share(last_dividend)
}

fn parse_metrics(record: &Value) -> MetricsRecord {
    // composites are only shown when FMP actually sent them
    let piotroski_score = optional_number(record, "piotroskiScore")
        .map_or(Metric::Unavailable, |score| {
            Metric::Reported(score.round().clamp(0.0, 9.0) as u8)
        });
    let altman_z_score = optional_number(record, "altmanZScore")
        .map_or(Metric::Unavailable, |score| Metric::Reported(round2(score)));

    MetricsRecord {
        net_margin: number_or_zero(record, "netProfitMargin"),
        roic: number_or_zero(record, "roic"),
        roe: number_or_zero(record, "roe"),
        debt_to_equity: number_or_zero(record, "debtToEquity"),
        piotroski_score,
        altman_z_score,
        beneish_m_score: Metric::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and return the API root pointing at it
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}/api/v3")
    }

    fn local_client(base_url: String) -> FmpClient {
        FmpClient::new("test_key", base_url, Duration::from_secs(5), 300).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = FmpClient::new(
            "test_key",
            "https://example.test/api/v3/",
            Duration::from_secs(10),
            300,
        )
        .unwrap();
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.base_url, "https://example.test/api/v3");
    }

    #[test]
    fn test_parse_profile() {
        let data = json!([{"symbol": "AAPL", "price": 200.0, "eps": 6.4, "lastDiv": 1.0}]);
        let profile = parse_profile(first_record("AAPL", &data).unwrap());

        assert_eq!(profile.price, 200.0);
        assert_eq!(profile.eps, 6.4);
        assert_eq!(profile.dividend_yield, Some(0.005));
    }

    #[test]
    fn test_parse_profile_defaults() {
        let data = json!([{"symbol": "ZZZZ"}]);
        let profile = parse_profile(first_record("ZZZZ", &data).unwrap());

        assert_eq!(profile.price, 0.0);
        assert_eq!(profile.eps, 0.0);
        assert_eq!(profile.dividend_yield, None);
    }

    #[test]
    fn test_parse_profile_dividend_without_price() {
        let data = json!([{"symbol": "KO", "lastDiv": 0.96}]);
        let profile = parse_profile(first_record("KO", &data).unwrap());

        assert_eq!(profile.dividend_yield, None);
        assert_eq!(profile.dividend_per_share, Some(0.96));
        assert!(profile.pays_dividend());
    }

    #[test]
    fn test_parse_metrics() {
        let data = json!([{
            "netProfitMargin": 0.253,
            "roic": 0.31,
            "roe": 1.6,
            "debtToEquity": 1.8,
            "piotroskiScore": 8,
            "altmanZScore": 9.87654
        }]);
        let metrics = parse_metrics(first_record("AAPL", &data).unwrap());

        assert_eq!(metrics.net_margin, 0.253);
        assert_eq!(metrics.roic, 0.31);
        assert_eq!(metrics.roe, 1.6);
        assert_eq!(metrics.debt_to_equity, 1.8);
        assert_eq!(metrics.piotroski_score, Metric::Reported(8));
        assert_eq!(metrics.altman_z_score, Metric::Reported(9.88));
        assert!(metrics.beneish_m_score.is_unavailable());
    }

    #[test]
    fn test_parse_metrics_defaults() {
        let data = json!([{"roic": null, "altmanZScore": null}]);
        let metrics = parse_metrics(first_record("ZZZZ", &data).unwrap());

        assert_eq!(metrics.net_margin, 0.0);
        assert_eq!(metrics.roic, 0.0);
        // missing composites are not shown as zero
        assert!(metrics.piotroski_score.is_unavailable());
        assert!(metrics.altman_z_score.is_unavailable());
        assert_eq!(metrics.altman_z_score.to_string(), "N/A");
    }

    #[test]
    fn test_parse_metrics_reported_zero_score() {
        let data = json!([{"piotroskiScore": 0, "altmanZScore": "0"}]);
        let metrics = parse_metrics(first_record("ZZZZ", &data).unwrap());

        assert_eq!(metrics.piotroski_score, Metric::Reported(0));
        assert_eq!(metrics.altman_z_score, Metric::Reported(0.0));
    }

    #[test]
    fn test_piotroski_clamped() {
        let data = json!([{"piotroskiScore": 12}]);
        let metrics = parse_metrics(first_record("ZZZZ", &data).unwrap());
        assert_eq!(metrics.piotroski_score, Metric::Reported(9));
    }

    #[test]
    fn test_unusable_payloads() {
        assert!(first_record("ZZZZ", &json!([])).is_err());
        assert!(first_record("ZZZZ", &json!({})).is_err());
        assert!(first_record("ZZZZ", &json!(["AAPL"])).is_err());

        let err = first_record("ZZZZ", &json!({"Error Message": "Invalid API KEY."})).unwrap_err();
        assert_eq!(err.to_string(), "Data not available for ZZZZ: Invalid API KEY.");
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let client = local_client(serve_once("500 Internal Server Error", "{}").await);

        let err = client.get_profile("AAPL").await.unwrap_err();
        assert!(matches!(
            err,
            ScreenError::HttpStatus { status: 500, ref symbol, .. } if symbol == "AAPL"
        ));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let client = local_client(serve_once("200 OK", "<html>maintenance</html>").await);

        let err = client.get_key_metrics("AAPL").await.unwrap_err();
        assert!(matches!(err, ScreenError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_empty_array_body() {
        let client = local_client(serve_once("200 OK", "[]").await);

        let err = client.get_profile("ZZZZ").await.unwrap_err();
        assert!(matches!(err, ScreenError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_profile_over_http() {
        let client = local_client(
            serve_once("200 OK", r#"[{"symbol": "KO", "price": 64.0, "eps": 2.47, "lastDiv": 1.94}]"#)
                .await,
        );

        let profile = client.get_profile("KO").await.unwrap();
        assert_eq!(profile.price, 64.0);
        assert_eq!(profile.eps, 2.47);
        assert!(profile.pays_dividend());
    }

    #[tokio::test]
    #[ignore] // Requires FMP_API_KEY and network access
    async fn test_get_profile() {
        let config = ScreenConfig::default().with_env_api_key();
        let client = FmpClient::from_config(&config).unwrap();
        let profile = client.get_profile("AAPL").await.unwrap();
        assert!(profile.price > 0.0);
    }
}
