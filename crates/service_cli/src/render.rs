//! Output rendering: Markdown tables, CSV and JSON.

use clap::ValueEnum;
use serde::Serialize;
use valuation_core::types::{ValuationError, ValuationResult};

use crate::{CliError, Result};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Markdown tables
    Markdown,
    /// Pretty-printed JSON
    Json,
    /// Comma-separated values
    Csv,
}

/// Rectangular text table shared by the Markdown and CSV renderers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Empty table with the given column headers.
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; it must have one cell per header.
    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    /// GitHub-flavoured Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("| {} |\n", self.headers.join(" | ")));
        out.push_str(&format!(
            "|{}\n",
            self.headers.iter().map(|_| "---|").collect::<String>()
        ));
        for row in &self.rows {
            out.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        out
    }

    /// CSV with a header record.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer.into_inner().map_err(|e| CliError::output(e.error()))?;
        String::from_utf8(bytes).map_err(CliError::output)
    }
}

/// Pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Two-decimal amount.
pub fn amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Fraction as a percentage.
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Error marker carrying the stable code.
pub fn error_cell(error: &ValuationError) -> String {
    format!("ERR({})", error.code())
}

/// Cell for an optional figure.
pub fn optional(value: Option<f64>, fmt: fn(f64) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| "n/a".to_string())
}

/// Cell for a model result: `fmt` on success, the error marker otherwise.
pub fn result_cell<T>(result: &ValuationResult<T>, fmt: impl Fn(&T) -> String) -> String {
    match result {
        Ok(value) => fmt(value),
        Err(e) => error_cell(e),
    }
}

/// Serialisable error marker.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorRecord {
    /// Stable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl From<&ValuationError> for ErrorRecord {
    fn from(e: &ValuationError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}
