//! Sweep command implementation
//!
//! Builds a sensitivity grid for one company. Ranges come from the
//! `[sweep]` section of the configuration, or the preset tables.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;
use tracing::info;
use valuation_core::types::{CalculationError, ValuationError};
use valuation_models::{DcfResult, IpoResult, LboResult};
use valuation_risk::sensitivity::{sweep, DcfInputs, IpoInputs, LboInputs};
use valuation_risk::SensitivityGrid;

use super::load_deal;
use crate::config::EngineConfig;
use crate::render::{amount, error_cell, percent, to_json, ErrorRecord, OutputFormat, Table};
use crate::{CliError, Result};

/// Model to sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SweepModel {
    /// Leveraged buyout
    Lbo,
    /// IPO offering
    Ipo,
    /// Discounted cash flow
    Dcf,
}

/// Named output column.
type Metric<R> = (&'static str, fn(&R) -> String);

fn grid_table<K: Display + Copy + Eq, R>(grid: &SensitivityGrid<K, R>, metrics: &[Metric<R>]) -> Table {
    let headers = grid
        .keys()
        .iter()
        .map(ToString::to_string)
        .chain(metrics.iter().map(|(name, _)| name.to_string()));
    let mut table = Table::new(headers);

    for cell in grid.cells() {
        let mut row: Vec<String> = cell.parameters.iter().map(|(_, v)| v.to_string()).collect();
        match &cell.result {
            Ok(result) => row.extend(metrics.iter().map(|(_, f)| f(result))),
            Err(e) => row.extend(metrics.iter().map(|_| error_cell(e))),
        }
        table.push_row(row);
    }
    table
}

#[derive(Serialize)]
struct CellRecord<'a, R> {
    parameters: Vec<(String, f64)>,
    result: Option<&'a R>,
    error: Option<ErrorRecord>,
}

fn grid_json<K: Display + Copy + Eq, R: Serialize>(grid: &SensitivityGrid<K, R>) -> Result<String> {
    let records: Vec<CellRecord<'_, R>> = grid
        .cells()
        .iter()
        .map(|cell| CellRecord {
            parameters: cell.parameters.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            result: cell.result.as_ref().ok(),
            error: cell.result.as_ref().err().map(ErrorRecord::from),
        })
        .collect();
    to_json(&records)
}

fn render<K: Display + Copy + Eq, R: Serialize>(
    grid: &SensitivityGrid<K, R>,
    metrics: &[Metric<R>],
    title: &str,
    format: OutputFormat,
) -> Result<String> {
    info!(cells = grid.len(), failures = grid.failure_count(), "sweep complete");
    match format {
        OutputFormat::Json => grid_json(grid),
        OutputFormat::Csv => grid_table(grid, metrics).to_csv(),
        OutputFormat::Markdown => Ok(format!(
            "# {}\n\n{}\n{} cells, {} failed\n",
            title,
            grid_table(grid, metrics).to_markdown(),
            grid.len(),
            grid.failure_count()
        )),
    }
}

/// Run the sweep command
pub fn run(
    input: &str,
    model: SweepModel,
    symbol: &str,
    config: &EngineConfig,
    format: OutputFormat,
) -> Result<String> {
    let deal = load_deal(input)?;
    let company = deal.company(symbol)?;
    let settings = config.analysis_settings();
    let invalid_range = |e: CalculationError| CliError::Valuation(ValuationError::from(e));

    match model {
        SweepModel::Lbo => {
            let ranges = config.sweep.lbo_ranges().map_err(invalid_range)?;
            let base = company.lbo_inputs(&settings)?;
            let grid = sweep(LboInputs::evaluate, &base, &ranges, &config.parallel);
            let metrics: [Metric<LboResult>; 4] = [
                ("IRR", |r| r.returns.irr.map(percent).unwrap_or_else(|| "n/a".to_string())),
                ("MOIC", |r| format!("{:.2}x", r.returns.moic)),
                ("Exit Equity", |r| amount(r.returns.exit_equity)),
                ("Meets Target", |r| match r.returns.meets_target_irr {
                    Some(true) => "yes".to_string(),
                    Some(false) => "no".to_string(),
                    None => "n/a".to_string(),
                }),
            ];
            render(&grid, &metrics, &format!("{} LBO Sensitivity", symbol), format)
        }
        SweepModel::Ipo => {
            let ranges = config.sweep.ipo_ranges().map_err(invalid_range)?;
            let base = company.ipo_inputs(&settings);
            let grid = sweep(IpoInputs::evaluate, &base, &ranges, &config.parallel);
            let metrics: [Metric<IpoResult>; 4] = [
                ("Price Low", |r| amount(r.offering.price_low)),
                ("Price Base", |r| amount(r.offering.price_base)),
                ("Price High", |r| amount(r.offering.price_high)),
                ("Float Shares", |r| amount(r.offering.float_shares)),
            ];
            render(&grid, &metrics, &format!("{} IPO Sensitivity", symbol), format)
        }
        SweepModel::Dcf => {
            let ranges = config.sweep.dcf_ranges().map_err(invalid_range)?;
            let base = company.dcf_inputs(&settings)?;
            let grid = sweep(DcfInputs::evaluate, &base, &ranges, &config.parallel);
            let metrics: [Metric<DcfResult>; 2] = [
                ("Enterprise Value", |r| amount(r.enterprise_value)),
                ("PV Terminal", |r| amount(r.present_value_terminal)),
            ];
            render(&grid, &metrics, &format!("{} DCF Sensitivity", symbol), format)
        }
    }
}
