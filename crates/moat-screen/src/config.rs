//! Configuration for screening runs

use crate::error::{Result, ScreenError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the Financial Modeling Prep credential
pub const FMP_API_KEY_ENV: &str = "FMP_API_KEY";

const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Data provider for profile and metrics records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataProvider {
    /// Financial Modeling Prep (default, requires API key)
    #[default]
    Fmp,
    /// Yahoo Finance (no API key, fewer metrics)
    Yahoo,
}

impl DataProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fmp => "FMP",
            Self::Yahoo => "Yahoo Finance",
        }
    }
}

impl std::fmt::Display for DataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a screening run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Provider queried for every symbol
    pub provider: DataProvider,

    /// Timeout applied to every provider request
    pub request_timeout: Duration,

    /// Maximum provider requests per minute
    pub rate_limit_per_minute: u32,

    /// Financial Modeling Prep API key
    pub fmp_api_key: Option<String>,

    /// Financial Modeling Prep API root
    pub fmp_base_url: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            provider: DataProvider::Fmp,
            request_timeout: Duration::from_secs(10),
            rate_limit_per_minute: 300,
            fmp_api_key: None,
            fmp_base_url: DEFAULT_FMP_BASE_URL.to_string(),
        }
    }
}

impl ScreenConfig {
    /// Create a new configuration builder
    pub fn builder() -> ScreenConfigBuilder {
        ScreenConfigBuilder::default()
    }

    /// Load the FMP API key from environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var(FMP_API_KEY_ENV) {
            self.fmp_api_key = Some(key);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.provider == DataProvider::Fmp
            && self.fmp_api_key.as_deref().is_none_or(|key| key.trim().is_empty())
        {
            return Err(ScreenError::ConfigError(format!(
                "FMP API key required when using the FMP provider (set {FMP_API_KEY_ENV})"
            )));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(ScreenError::ConfigError(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ScreenError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ScreenConfig
#[derive(Debug, Default)]
pub struct ScreenConfigBuilder {
    provider: Option<DataProvider>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    fmp_api_key: Option<String>,
    fmp_base_url: Option<String>,
}

impl ScreenConfigBuilder {
    /// Set the data provider
    pub fn provider(mut self, provider: DataProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set provider requests per minute
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set FMP API key
    pub fn fmp_api_key(mut self, key: impl Into<String>) -> Self {
        self.fmp_api_key = Some(key.into());
        self
    }

    /// Load FMP API key from environment unless one was set explicitly
    pub fn with_env_api_key(mut self) -> Self {
        if self.fmp_api_key.is_none() {
            self.fmp_api_key = std::env::var(FMP_API_KEY_ENV).ok();
        }
        self
    }

    /// Override the FMP API root
    pub fn fmp_base_url(mut self, url: impl Into<String>) -> Self {
        self.fmp_base_url = Some(url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ScreenConfig> {
        let defaults = ScreenConfig::default();

        let config = ScreenConfig {
            provider: self.provider.unwrap_or(defaults.provider),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
            fmp_api_key: self.fmp_api_key,
            fmp_base_url: self.fmp_base_url.unwrap_or(defaults.fmp_base_url),
        };

        config.validate()?;
        Ok(config)
    }
}
