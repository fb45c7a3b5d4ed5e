//! Batch screening
//!
//! Symbols are processed one at a time: fetch both records, classify, assemble
//! the row. A symbol with a missing record is dropped and reported through an
//! advisory; it never stops the batch.

use crate::api::{Advisory, DataSource, fetch_records};
use crate::moat::MoatLists;
use crate::row::{ResultRow, assemble};
use crate::table::ResultTable;
use serde::Serialize;
use std::sync::Arc;

/// Result of a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Number of symbols submitted
    pub requested: usize,
    pub table: ResultTable,
    pub advisories: Vec<Advisory>,
}

impl BatchReport {
    /// Symbols that produced no row
    pub fn dropped(&self) -> usize {
        self.requested - self.table.len()
    }
}

/// Progress notification emitted after each symbol
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub symbol: &'a str,
    /// Symbols finished so far, including this one
    pub completed: usize,
    pub total: usize,
    pub row: Option<&'a ResultRow>,
}

/// Runs the per-symbol pipeline against a data source
pub struct Screener {
    source: Arc<dyn DataSource>,
    lists: MoatLists,
}

impl Screener {
    pub fn new(source: Arc<dyn DataSource>, lists: MoatLists) -> Self {
        Self { source, lists }
    }

    pub fn lists(&self) -> &MoatLists {
        &self.lists
    }

    /// Screen one symbol, returning its row (if any) and advisories
    pub async fn screen(&self, symbol: &str) -> (Option<ResultRow>, Vec<Advisory>) {
        let fetched = fetch_records(self.source.as_ref(), symbol).await;
        let row = assemble(
            symbol,
            fetched.profile.as_ref(),
            fetched.metrics.as_ref(),
            &self.lists,
        );
        (row, fetched.advisories)
    }

    /// Screen every symbol in order
    pub async fn run(&self, symbols: &[String]) -> BatchReport {
        self.run_with_progress(symbols, |_| {}).await
    }

    /// Screen every symbol in order, calling `on_progress` after each one
    pub async fn run_with_progress<F>(&self, symbols: &[String], mut on_progress: F) -> BatchReport
    where
        F: FnMut(Progress<'_>),
    {
        tracing::info!(
            "Screening {} symbols with {}",
            symbols.len(),
            self.source.provider()
        );

        let mut report = BatchReport {
            requested: symbols.len(),
            ..Default::default()
        };

        for (index, symbol) in symbols.iter().enumerate() {
            let (row, advisories) = self.screen(symbol).await;
            report.advisories.extend(advisories);

            on_progress(Progress {
                symbol,
                completed: index + 1,
                total: symbols.len(),
                row: row.as_ref(),
            });

            match row {
                Some(row) => report.table.push(row),
                None => tracing::debug!("Dropped {} from results", symbol),
            }
        }

        tracing::info!(
            "Screened {} of {} symbols",
            report.table.len(),
            report.requested
        );
        report
    }
}
