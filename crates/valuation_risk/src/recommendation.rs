//! Final target recommendation.

use std::collections::BTreeMap;

use crate::ranking::{rank, Ranking, ScoreCard};
use crate::screening::CompanyAnalysis;

/// Ranked candidates and the case for the top one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Recommendation {
    /// Full ranking, including unscorable candidates
    pub ranking: Ranking,
    /// Symbol of the recommended target
    pub selected: Option<String>,
    /// Supporting facts for the selected target
    pub rationale: Vec<String>,
}

impl Recommendation {
    /// Score card of the recommended target.
    pub fn selected_card(&self) -> Option<&ScoreCard> {
        self.ranking.top()
    }

    /// Ranked candidates after the selected one.
    pub fn alternatives(&self) -> &[ScoreCard] {
        self.ranking.cards.get(1..).unwrap_or(&[])
    }
}

fn millions(value: f64) -> String {
    format!("${:.1}M", value / 1e6)
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn rationale(card: &ScoreCard, analysis: &CompanyAnalysis) -> Vec<String> {
    let market_cap = analysis
        .market_cap
        .map(millions)
        .unwrap_or_else(|| "unavailable".to_string());
    let dcf = match &analysis.dcf {
        Ok(d) => millions(d.enterprise_value),
        Err(e) => format!("unavailable ({})", e.code()),
    };

    let mut lines = vec![
        format!("Current market cap: {}", market_cap),
        format!("DCF valuation: {}", dcf),
        format!("Revenue growth: {}", percent(analysis.metrics.revenue_growth)),
        format!("EBITDA margin: {}", percent(analysis.metrics.ebitda_margin)),
        format!("Financial health: {}", card.financial_health),
        format!("Growth potential: {}", card.growth_potential),
        format!("Risk profile: {}", card.risk_profile),
    ];
    if let Some(irr) = analysis.lbo.as_ref().ok().and_then(|l| l.returns.irr) {
        lines.push(format!("LBO IRR: {}", percent(irr)));
    }
    lines
}

/// Rank every analysed company and argue for the best one.
///
/// `selected` is `None` when no company could be scored.
pub fn recommend(analyses: &BTreeMap<String, CompanyAnalysis>) -> Recommendation {
    let candidates: Vec<_> = analyses.values().map(CompanyAnalysis::candidate).collect();
    let ranking = rank(&candidates);

    let (selected, rationale) = match ranking
        .top()
        .and_then(|card| analyses.get(&card.symbol).map(|a| (card, a)))
    {
        Some((card, analysis)) => (Some(card.symbol.clone()), rationale(card, analysis)),
        None => (None, Vec::new()),
    };

    Recommendation {
        ranking,
        selected,
        rationale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ParallelConfig;
    use crate::screening::{analyze_companies, AnalysisSettings, CompanyInput};
    use valuation_core::types::{BalanceSheet, CapitalStructure, LatestMetrics, RawStatement};
    use valuation_models::comparables::MarketQuote;

    fn input(symbol: &str, margin: f64, growth: f64, fcf: Option<f64>) -> CompanyInput {
        let mut latest = RawStatement::new("2024").with_revenue(1.0e9);
        if let Some(fcf) = fcf {
            latest = latest.with_free_cash_flow(fcf).with_ebitda(2.0e8);
        }
        CompanyInput {
            symbol: symbol.to_string(),
            statements: vec![latest],
            capital_structure: CapitalStructure::new(2.0e9, 0.0, 1.0e8, 1.0e8),
            balance_sheet: BalanceSheet {
                total_debt: 3.0e8,
                total_assets: 1.0e9,
                ..Default::default()
            },
            metrics: LatestMetrics {
                ebitda_margin: margin,
                revenue_growth: growth,
                ..Default::default()
            },
            ipo: Default::default(),
            peers: Default::default(),
            quote: Some(MarketQuote {
                market_cap: 2.5e9,
                pe: None,
            }),
        }
    }

    #[test]
    fn test_selects_highest_score_with_rationale() {
        let inputs = vec![
            input("BETA", 0.10, 0.04, Some(1.2e8)),
            input("ALFA", 0.22, 0.18, Some(1.5e8)),
        ];
        let analyses =
            analyze_companies(&inputs, &AnalysisSettings::default(), &ParallelConfig::serial());
        let rec = recommend(&analyses);

        assert_eq!(rec.selected.as_deref(), Some("ALFA"));
        assert_eq!(rec.selected_card().unwrap().rank, 1);
        assert_eq!(rec.alternatives().len(), 1);
        assert_eq!(rec.alternatives()[0].symbol, "BETA");

        assert_eq!(rec.rationale[0], "Current market cap: $2500.0M");
        assert!(rec.rationale[1].starts_with("DCF valuation: $"));
        assert_eq!(rec.rationale[2], "Revenue growth: 18.0%");
        assert_eq!(rec.rationale[3], "EBITDA margin: 22.0%");
        assert_eq!(rec.rationale[4], "Financial health: Strong");
        assert_eq!(rec.rationale[5], "Growth potential: High");
        assert_eq!(rec.rationale[6], "Risk profile: Low Risk");
    }

    #[test]
    fn test_failed_dcf_is_named_in_rationale() {
        let analyses = analyze_companies(
            &[input("SOLO", 0.2, 0.1, None)],
            &AnalysisSettings::default(),
            &ParallelConfig::serial(),
        );
        let rec = recommend(&analyses);
        assert_eq!(rec.rationale[1], "DCF valuation: unavailable (INSUFFICIENT_HISTORY)");
    }

    #[test]
    fn test_nothing_rankable() {
        let mut bad = input("BAD", 0.2, 0.1, Some(1.0e8));
        bad.balance_sheet.total_assets = 0.0;
        let analyses =
            analyze_companies(&[bad], &AnalysisSettings::default(), &ParallelConfig::serial());

        let rec = recommend(&analyses);
        assert!(rec.selected.is_none());
        assert!(rec.rationale.is_empty());
        assert_eq!(rec.ranking.failures.len(), 1);
        assert!(rec.alternatives().is_empty());
    }
}
