//! Rank command implementation
//!
//! Analyses every company, ranks them as acquisition targets and prints
//! the recommendation.

use tracing::info;
use valuation_risk::{analyze_companies, recommend, Recommendation};

use super::load_deal;
use crate::config::EngineConfig;
use crate::render::{error_cell, to_json, OutputFormat, Table};
use crate::Result;

fn ranking_table(rec: &Recommendation) -> Table {
    let mut table = Table::new([
        "Rank",
        "Symbol",
        "Score",
        "Financial Health",
        "Growth Potential",
        "Risk Profile",
    ]);
    for card in &rec.ranking.cards {
        table.push_row(vec![
            card.rank.to_string(),
            card.symbol.clone(),
            format!("{:.4}", card.score),
            card.financial_health.to_string(),
            card.growth_potential.to_string(),
            card.risk_profile.to_string(),
        ]);
    }
    table
}

fn markdown(rec: &Recommendation) -> String {
    let mut out = String::from("# Target Ranking\n\n");
    out.push_str(&ranking_table(rec).to_markdown());

    if !rec.ranking.failures.is_empty() {
        out.push_str("\n## Not Ranked\n\n");
        for failure in &rec.ranking.failures {
            out.push_str(&format!(
                "- {}: {} {}\n",
                failure.symbol,
                error_cell(&failure.error),
                failure.error
            ));
        }
    }

    out.push_str("\n## Recommendation\n\n");
    match &rec.selected {
        Some(symbol) => {
            out.push_str(&format!("Recommended target: **{}**\n\n", symbol));
            for line in &rec.rationale {
                out.push_str(&format!("- {}\n", line));
            }
        }
        None => out.push_str("No company could be scored.\n"),
    }
    out
}

/// Run the rank command
pub fn run(input: &str, config: &EngineConfig, format: OutputFormat) -> Result<String> {
    let deal = load_deal(input)?;
    let analyses =
        analyze_companies(&deal.companies, &config.analysis_settings(), &config.parallel);
    let rec = recommend(&analyses);

    info!(
        ranked = rec.ranking.cards.len(),
        unranked = rec.ranking.failures.len(),
        selected = rec.selected.as_deref().unwrap_or("none"),
        "ranking complete"
    );

    match format {
        OutputFormat::Json => to_json(&rec),
        OutputFormat::Markdown => Ok(markdown(&rec)),
        OutputFormat::Csv => ranking_table(&rec).to_csv(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sample_deal_path;

    #[test]
    fn test_markdown_recommendation() {
        let out =
            run(&sample_deal_path(), &EngineConfig::default(), OutputFormat::Markdown).unwrap();

        assert!(out.contains("| 1 | NOVA |"));
        assert!(out.contains("| 2 | PIKE |"));
        assert!(out.contains("| 3 | ORBT |"));
        assert!(out.contains("Recommended target: **NOVA**"));
        assert!(out.contains("- Financial health: Strong"));
        assert!(!out.contains("## Not Ranked"));
    }

    #[test]
    fn test_csv_ranking() {
        let out = run(&sample_deal_path(), &EngineConfig::default(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Rank,Symbol,Score,Financial Health,Growth Potential,Risk Profile");
        assert!(lines[1].starts_with("1,NOVA,"));
        assert!(lines[3].ends_with("Moderate Risk"));
    }

    #[test]
    fn test_json_recommendation() {
        let out = run(&sample_deal_path(), &EngineConfig::default(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["selected"], "NOVA");
        assert_eq!(value["ranking"]["cards"].as_array().unwrap().len(), 3);
        assert!(value["rationale"].as_array().unwrap().len() >= 7);
    }
}
