//! Records fetched from a data provider

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker rendered for figures no provider reported
pub const UNAVAILABLE: &str = "N/A";

/// A figure that a provider may or may not report.
///
/// Providers that cannot supply a metric yield `Unavailable` instead of a
/// made-up constant, so exported sheets never show invented numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum Metric<T> {
    Reported(T),
    Unavailable,
}

impl<T> Metric<T> {
    pub fn reported(&self) -> Option<&T> {
        match self {
            Self::Reported(value) => Some(value),
            Self::Unavailable => None,
        }
    }

    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reported(value) => value.fmt(f),
            Self::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// Price data for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Latest price, never negative
    pub price: f64,
    /// Earnings per share
    pub eps: f64,
    /// Dividend yield as a fraction (0.02 == 2%)
    pub dividend_yield: Option<f64>,
    /// Annual dividend per share, when the provider reports it
    #[serde(default)]
    pub dividend_per_share: Option<f64>,
}

impl ProfileRecord {
    pub fn new(price: f64, eps: f64, dividend_yield: Option<f64>) -> Self {
        Self {
            price: price.max(0.0),
            eps,
            dividend_yield,
            dividend_per_share: None,
        }
    }

    pub fn with_dividend_per_share(mut self, dividend: Option<f64>) -> Self {
        self.dividend_per_share = dividend;
        self
    }

    /// True when either the yield or the per-share dividend is positive.
    ///
    /// A missing price leaves the yield undefined, but a reported dividend
    /// still counts.
    pub fn pays_dividend(&self) -> bool {
        self.dividend_yield.is_some_and(|y| y > 0.0)
            || self.dividend_per_share.is_some_and(|d| d > 0.0)
    }
}

/// Fundamental ratios and composite scores for one symbol.
///
/// Ratios are fractions (0.25 == 25%) regardless of how the provider reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub net_margin: f64,
    pub roic: f64,
    pub roe: f64,
    pub debt_to_equity: f64,
    /// Piotroski F-Score, 0 to 9
    pub piotroski_score: Metric<u8>,
    pub altman_z_score: Metric<f64>,
    pub beneish_m_score: Metric<f64>,
}

impl Default for MetricsRecord {
    fn default() -> Self {
        Self {
            net_margin: 0.0,
            roic: 0.0,
            roe: 0.0,
            debt_to_equity: 0.0,
            piotroski_score: Metric::Unavailable,
            altman_z_score: Metric::Unavailable,
            beneish_m_score: Metric::Unavailable,
        }
    }
}

/// Convert a ratio reported in percent (23.4) to a fraction (0.234)
pub fn percent_to_fraction(value: f64) -> f64 {
    value / 100.0
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
