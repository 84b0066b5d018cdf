//! CLI command implementations
//!
//! Each submodule implements a specific CLI command and returns the
//! rendered report; `main` prints it.

pub mod rank;
pub mod sweep;
pub mod value;

use serde::Deserialize;
use std::path::Path;
use tracing::info;
use valuation_risk::CompanyInput;

use crate::{CliError, Result};

/// Deal input file: the candidate companies to analyse.
#[derive(Debug, Clone, Deserialize)]
pub struct DealFile {
    /// Candidate companies
    pub companies: Vec<CompanyInput>,
}

impl DealFile {
    /// Company by symbol; the last entry wins for a repeated symbol.
    pub fn company(&self, symbol: &str) -> Result<&CompanyInput> {
        self.companies
            .iter()
            .rev()
            .find(|c| c.symbol == symbol)
            .ok_or_else(|| CliError::UnknownCompany(symbol.to_string()))
    }
}

/// Read and parse a deal file.
pub fn load_deal(path: &str) -> Result<DealFile> {
    if !Path::new(path).exists() {
        return Err(CliError::FileNotFound(path.to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let deal: DealFile = serde_json::from_str(&content).map_err(|source| CliError::DealFile {
        path: path.to_string(),
        source,
    })?;
    info!(path, companies = deal.companies.len(), "loaded deal file");
    Ok(deal)
}

/// Sample deal shipped with the crate, for command tests.
#[cfg(test)]
pub(crate) fn sample_deal_path() -> String {
    format!("{}/fixtures/sample_deal.json", env!("CARGO_MANIFEST_DIR"))
}
