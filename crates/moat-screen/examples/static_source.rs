//! Screening against a hand-written data source
//!
//! Any type implementing `DataSource` can drive the screener, which makes it
//! easy to replay saved provider data or plug in another vendor.
//!
//! ```bash
//! cargo run -p moat-screen --example static_source
//! ```

use async_trait::async_trait;
use moat_screen::{
    DataProvider, DataSource, Metric, MetricsRecord, MoatLists, ProfileRecord, ScreenError,
    Screener, parse_symbols,
};
use std::sync::Arc;

/// Serves fixed records for a few symbols
struct StaticSource;

#[async_trait]
impl DataSource for StaticSource {
    fn provider(&self) -> DataProvider {
        DataProvider::Fmp
    }

    async fn profile(&self, symbol: &str) -> moat_screen::Result<ProfileRecord> {
        match symbol {
            "NVDA" => Ok(ProfileRecord::new(181.6, 2.94, Some(0.0002))),
            "KO" => Ok(ProfileRecord::new(69.3, 2.47, Some(0.029))),
            _ => Err(ScreenError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "not in fixture".to_string(),
            }),
        }
    }

    async fn metrics(&self, symbol: &str) -> moat_screen::Result<MetricsRecord> {
        let metrics = match symbol {
            "NVDA" => MetricsRecord {
                net_margin: 0.558,
                roic: 0.74,
                roe: 0.91,
                debt_to_equity: 0.13,
                piotroski_score: Metric::Reported(7),
                altman_z_score: Metric::Reported(62.4),
                beneish_m_score: Metric::Unavailable,
            },
            "KO" => MetricsRecord {
                net_margin: 0.227,
                roic: 0.15,
                roe: 0.39,
                debt_to_equity: 1.6,
                piotroski_score: Metric::Reported(6),
                altman_z_score: Metric::Reported(3.1),
                beneish_m_score: Metric::Unavailable,
            },
            _ => MetricsRecord::default(),
        };
        Ok(metrics)
    }
}

#[tokio::main]
async fn main() -> moat_screen::Result<()> {
    let screener = Screener::new(Arc::new(StaticSource), MoatLists::default());
    let report = screener.run(&parse_symbols("nvda, ko\nzzzz")).await;

    for advisory in &report.advisories {
        eprintln!("advisory: {advisory}");
    }
    println!("{}", report.table.render());
    println!("{}", report.table.to_json()?);
    Ok(())
}
