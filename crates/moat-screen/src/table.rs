//! Result table rendering and export

use crate::error::Result;
use crate::row::{COLUMNS, ResultRow};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Byte-order mark so spreadsheet tools detect UTF-8 headers
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Ordered rows of one screening run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Symbols in row order
    pub fn symbols(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.symbol.as_str()).collect()
    }

    /// Render as a terminal table
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(COLUMNS);

        for row in &self.rows {
            table.add_row(row.cells());
        }

        table.to_string()
    }

    /// Write comma-separated values with a UTF-8 byte-order mark
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(UTF8_BOM)?;

        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(COLUMNS)?;
        for row in &self.rows {
            csv.write_record(row.cells())?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the CSV export to `path`
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        self.write_csv(file)?;
        tracing::info!("Exported {} rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Rows as a pretty-printed JSON array keyed by column name
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FromIterator<ResultRow> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ResultRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
