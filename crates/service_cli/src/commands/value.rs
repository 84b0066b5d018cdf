//! Value command implementation
//!
//! Runs DCF, LBO and IPO for every company in the deal file.

use std::collections::BTreeMap;
use tracing::info;
use valuation_models::ipo::IpoMethod;
use valuation_risk::{analyze_companies, CompanyAnalysis};

use super::load_deal;
use crate::config::EngineConfig;
use crate::render::{amount, optional, percent, result_cell, to_json, OutputFormat, Table};
use crate::Result;

fn method_label(method: IpoMethod) -> &'static str {
    match method {
        IpoMethod::GrowthBlend => "growth blend",
        IpoMethod::MatureBlend => "mature blend",
        IpoMethod::RevenueMultiple => "revenue multiple",
        IpoMethod::EbitdaMultiple => "EBITDA multiple",
    }
}

/// One row per company.
pub fn valuation_table(analyses: &BTreeMap<String, CompanyAnalysis>) -> Table {
    let mut table = Table::new([
        "Symbol",
        "DCF EV",
        "LBO IRR",
        "LBO MOIC",
        "IPO Low",
        "IPO Base",
        "IPO High",
        "IPO Method",
        "EV/EBITDA",
    ]);

    for (symbol, a) in analyses {
        table.push_row(vec![
            symbol.clone(),
            result_cell(&a.dcf, |d| amount(d.enterprise_value)),
            result_cell(&a.lbo, |l| optional(l.returns.irr, percent)),
            result_cell(&a.lbo, |l| format!("{:.2}x", l.returns.moic)),
            result_cell(&a.ipo, |i| amount(i.offering.price_low)),
            result_cell(&a.ipo, |i| amount(i.offering.price_base)),
            result_cell(&a.ipo, |i| amount(i.offering.price_high)),
            result_cell(&a.ipo, |i| method_label(i.valuation.method).to_string()),
            optional(a.multiples.and_then(|m| m.ev_to_ebitda), |v| format!("{:.1}x", v)),
        ]);
    }
    table
}

/// Run the value command
pub fn run(input: &str, config: &EngineConfig, format: OutputFormat) -> Result<String> {
    let deal = load_deal(input)?;
    let analyses =
        analyze_companies(&deal.companies, &config.analysis_settings(), &config.parallel);

    let failures: usize = analyses.values().map(CompanyAnalysis::failure_count).sum();
    info!(companies = analyses.len(), failures, "valuation complete");

    match format {
        OutputFormat::Json => to_json(&analyses),
        OutputFormat::Markdown => Ok(format!(
            "# Valuation Summary\n\n{}",
            valuation_table(&analyses).to_markdown()
        )),
        OutputFormat::Csv => valuation_table(&analyses).to_csv(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sample_deal_path;

    #[test]
    fn test_markdown_summary() {
        let out =
            run(&sample_deal_path(), &EngineConfig::default(), OutputFormat::Markdown).unwrap();
        assert!(out.starts_with("# Valuation Summary"));

        let nova = out.lines().find(|l| l.starts_with("| NOVA |")).unwrap();
        assert!(!nova.contains("ERR("), "{}", nova);
        assert!(nova.contains("mature blend"));

        let pike = out.lines().find(|l| l.starts_with("| PIKE |")).unwrap();
        assert!(pike.contains("ERR(INSUFFICIENT_HISTORY)"));
        assert!(pike.contains("revenue multiple"));
    }

    #[test]
    fn test_csv_has_one_row_per_company() {
        let out = run(&sample_deal_path(), &EngineConfig::default(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Symbol,DCF EV,LBO IRR"));
        assert!(lines[1].starts_with("NOVA,"));
        assert!(lines[2].starts_with("ORBT,"));
        assert!(lines[3].starts_with("PIKE,"));
    }

    #[test]
    fn test_json_keeps_errors_per_model() {
        let out = run(&sample_deal_path(), &EngineConfig::default(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert!(value["NOVA"]["dcf"]["Ok"]["enterprise_value"].as_f64().unwrap() > 0.0);
        assert!(value["PIKE"]["dcf"]["Err"].is_object());
        assert!(value["PIKE"]["ipo"]["Ok"].is_object());
    }

    #[test]
    fn test_config_changes_results() {
        let base = run(&sample_deal_path(), &EngineConfig::default(), OutputFormat::Json).unwrap();

        let mut config = EngineConfig::default();
        config.dcf.wacc = 0.09;
        let cheaper = run(&sample_deal_path(), &config, OutputFormat::Json).unwrap();

        let ev = |s: &str| {
            let v: serde_json::Value = serde_json::from_str(s).unwrap();
            v["NOVA"]["dcf"]["Ok"]["enterprise_value"].as_f64().unwrap()
        };
        assert!(ev(&cheaper) > ev(&base));
    }
}
