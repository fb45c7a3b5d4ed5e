//! Moat and valuation screener
//!
//! This crate screens a list of ticker symbols against a financial-data
//! provider and produces one spreadsheet-ready row per symbol:
//!
//! - Ticker list parsing (comma or newline separated, deduplicated)
//! - Data sources for Financial Modeling Prep and Yahoo Finance behind one trait
//! - Moat classification from margins, returns and injectable company lists
//! - Row assembly with a fixed 20% margin of safety
//! - Table rendering and CSV export matching the spreadsheet template
//!
//! # Pipeline
//!
//! Each symbol flows through fetch → classify → assemble independently. A
//! symbol whose profile or metrics cannot be retrieved is dropped from the
//! table and reported as an [`Advisory`]; the batch always runs to the end.
//!
//! # Example
//!
//! ```rust,ignore
//! use moat_screen::{MoatLists, ScreenConfig, Screener, api::build_source, parse_symbols};
//!
//! #[tokio::main]
//! async fn main() -> moat_screen::Result<()> {
//!     let config = ScreenConfig::builder().with_env_api_key().build()?;
//!     let screener = Screener::new(build_source(&config)?, MoatLists::default());
//!
//!     let report = screener.run(&parse_symbols("NVDA, AAPL\nMSFT")).await;
//!     println!("{}", report.table.render());
//!     report.table.export_csv("moat_analysis.csv")?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod moat;
pub mod parser;
pub mod row;
pub mod screener;
pub mod table;

// Re-export main types for convenience
pub use api::{Advisory, DataSource, FetchedRecords, RecordKind, build_source, fetch_records};
pub use config::{DataProvider, ScreenConfig};
pub use error::{Result, ScreenError};
pub use model::{Metric, MetricsRecord, ProfileRecord};
pub use moat::{MoatAssessment, MoatLists, classify};
pub use parser::parse_symbols;
pub use row::{COLUMNS, ResultRow, assemble};
pub use screener::{BatchReport, Progress, Screener};
pub use table::ResultTable;
