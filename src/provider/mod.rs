//! Market-data provider seam.
//!
//! The `HistoryProvider` trait abstracts the external data source so route
//! handlers can be exercised against a stub in tests. "No data for this
//! query" is not an error: an unknown ticker or a range with no trading days
//! yields an empty table, which the download handler turns into a redirect.

pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub use yahoo::YahooProvider;

/// Errors surfaced by a provider. These bubble up as server errors; the
/// "empty result" case is deliberately not here.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider transport error: {0}")]
    Transport(String),

    #[error("provider returned HTTP {code}")]
    Status { code: u16 },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// One column of a price table. `key` is the secondary label the provider
/// attaches to each column (the ticker the column belongs to); it is dropped
/// by `PriceTable::flatten_columns` before export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabel {
    pub field: String,
    pub key: Option<String>,
}

impl ColumnLabel {
    pub fn new(field: impl Into<String>, key: Option<String>) -> Self {
        Self {
            field: field.into(),
            key,
        }
    }
}

/// A single table cell. Price columns carry floats, volume carries an
/// integer, and missing values stay empty in the CSV output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Float(f64),
    Int(u64),
    Empty,
}

/// One row of the table, keyed by trading date.
#[derive(Debug, Clone)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub cells: Vec<Cell>,
}

/// Tabular price history as returned by a provider: a date index plus one
/// labelled column per field. Shape and naming come from the provider.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    pub columns: Vec<ColumnLabel>,
    pub rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Collapse hierarchical column labels to their top level.
    pub fn flatten_columns(&mut self) {
        for col in &mut self.columns {
            col.key = None;
        }
    }
}

/// The single capability the download path needs from the outside world.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Human-readable provider name, used in logs.
    fn name(&self) -> &str;

    /// Fetch daily price history for `ticker` over `[start, end)`.
    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, ProviderError>;
}
