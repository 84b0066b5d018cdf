//! Weighted scoring and ranking of acquisition targets.
//!
//! ```text
//! score = 0.4 * ebitda_margin + 0.4 * revenue_growth + 0.2 * (1 - debt / assets)
//! ```
//!
//! Candidates are ordered by score descending with ties broken by symbol
//! ascending, so the ranking is a total order and reruns are identical.

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;
use valuation_core::types::{BalanceSheet, CalculationError, LatestMetrics, ValuationError};

/// Weight of the EBITDA margin.
pub const PROFITABILITY_WEIGHT: f64 = 0.4;

/// Weight of revenue growth.
pub const GROWTH_WEIGHT: f64 = 0.4;

/// Weight of `1 - debt_to_assets`.
pub const LEVERAGE_WEIGHT: f64 = 0.2;

/// One company to score.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    /// Ticker symbol
    pub symbol: String,
    /// Latest headline ratios
    pub metrics: LatestMetrics,
    /// Latest balance sheet
    pub balance_sheet: BalanceSheet,
}

impl Candidate {
    /// Bundle a candidate.
    pub fn new(
        symbol: impl Into<String>,
        metrics: LatestMetrics,
        balance_sheet: BalanceSheet,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            metrics,
            balance_sheet,
        }
    }
}

/// EBITDA margin classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FinancialHealth {
    /// Margin above 15%
    Strong,
    /// Margin above 8%
    Moderate,
    /// Anything else
    Weak,
}

impl FinancialHealth {
    /// Classify an EBITDA margin.
    pub fn from_margin(ebitda_margin: f64) -> Self {
        if ebitda_margin > 0.15 {
            Self::Strong
        } else if ebitda_margin > 0.08 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

impl fmt::Display for FinancialHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strong => "Strong",
            Self::Moderate => "Moderate",
            Self::Weak => "Weak",
        })
    }
}

/// Revenue growth classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GrowthPotential {
    /// Growth above 15%
    High,
    /// Growth above 5%
    Moderate,
    /// Anything else
    Low,
}

impl GrowthPotential {
    /// Classify revenue growth.
    pub fn from_growth(revenue_growth: f64) -> Self {
        if revenue_growth > 0.15 {
            Self::High
        } else if revenue_growth > 0.05 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for GrowthPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
        })
    }
}

/// Balance sheet and margin risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskProfile {
    /// Debt above 60% of assets, or a negative margin
    High,
    /// Debt above 40% of assets
    Moderate,
    /// Anything else
    Low,
}

impl RiskProfile {
    /// Classify leverage and margin.
    pub fn assess(debt_to_assets: f64, ebitda_margin: f64) -> Self {
        if debt_to_assets > 0.6 || ebitda_margin < 0.0 {
            Self::High
        } else if debt_to_assets > 0.4 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "High Risk",
            Self::Moderate => "Moderate Risk",
            Self::Low => "Low Risk",
        })
    }
}

/// Score inputs as used in the formula.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreComponents {
    /// EBITDA margin
    pub profitability: f64,
    /// Revenue growth
    pub growth: f64,
    /// Debt over total assets
    pub leverage: f64,
}

impl ScoreComponents {
    /// Weighted score.
    pub fn score(&self) -> f64 {
        PROFITABILITY_WEIGHT * self.profitability
            + GROWTH_WEIGHT * self.growth
            + LEVERAGE_WEIGHT * (1.0 - self.leverage)
    }
}

/// Scored and labelled candidate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreCard {
    /// Ticker symbol
    pub symbol: String,
    /// Weighted score
    pub score: f64,
    /// Formula inputs
    pub components: ScoreComponents,
    /// Margin label
    pub financial_health: FinancialHealth,
    /// Growth label
    pub growth_potential: GrowthPotential,
    /// Risk label
    pub risk_profile: RiskProfile,
    /// 1-based position in the ranking
    pub rank: usize,
}

/// Candidate that could not be scored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankingFailure {
    /// Ticker symbol
    pub symbol: String,
    /// Why scoring failed
    pub error: ValuationError,
}

/// Ranked score cards plus the candidates that could not be scored.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ranking {
    /// Score cards, best first
    pub cards: Vec<ScoreCard>,
    /// Unscorable candidates, in input order
    pub failures: Vec<RankingFailure>,
}

impl Ranking {
    /// Highest-ranked card.
    pub fn top(&self) -> Option<&ScoreCard> {
        self.cards.first()
    }

    /// Card for `symbol`.
    pub fn card(&self, symbol: &str) -> Option<&ScoreCard> {
        self.cards.iter().find(|c| c.symbol == symbol)
    }
}

/// Score one candidate.
///
/// # Errors
///
/// `CalculationError::InvalidParameter` when total assets are not positive
/// or any input ratio is non-finite.
pub fn score_candidate(candidate: &Candidate) -> Result<ScoreComponents, ValuationError> {
    let leverage = candidate.balance_sheet.debt_to_assets().ok_or_else(|| {
        CalculationError::invalid_parameter(
            "total_assets",
            format!(
                "must be positive with finite debt, got assets {} and debt {}",
                candidate.balance_sheet.total_assets, candidate.balance_sheet.total_debt
            ),
        )
    })?;
    if !candidate.metrics.is_finite() {
        return Err(
            CalculationError::invalid_parameter("metrics", "ratios must be finite").into(),
        );
    }

    Ok(ScoreComponents {
        profitability: candidate.metrics.ebitda_margin,
        growth: candidate.metrics.revenue_growth,
        leverage,
    })
}

fn by_score_then_symbol(a: &ScoreCard, b: &ScoreCard) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.symbol.cmp(&b.symbol))
}

/// Score, label and order the candidates.
///
/// # Examples
/// ```
/// use valuation_core::types::{BalanceSheet, LatestMetrics};
/// use valuation_risk::ranking::{rank, Candidate};
///
/// let bs = BalanceSheet { total_debt: 20.0, total_assets: 100.0, ..Default::default() };
/// let metrics = LatestMetrics { ebitda_margin: 0.2, revenue_growth: 0.1, ..Default::default() };
///
/// let ranking = rank(&[
///     Candidate::new("BBB", metrics, bs),
///     Candidate::new("AAA", metrics, bs),
///     Candidate::new("ZZZ", metrics, BalanceSheet::default()),
/// ]);
///
/// let order: Vec<&str> = ranking.cards.iter().map(|c| c.symbol.as_str()).collect();
/// assert_eq!(order, ["AAA", "BBB"]);
/// assert_eq!(ranking.failures[0].symbol, "ZZZ");
/// ```
pub fn rank(candidates: &[Candidate]) -> Ranking {
    let mut ranking = Ranking::default();

    for candidate in candidates {
        match score_candidate(candidate) {
            Ok(components) => ranking.cards.push(ScoreCard {
                symbol: candidate.symbol.clone(),
                score: components.score(),
                components,
                financial_health: FinancialHealth::from_margin(components.profitability),
                growth_potential: GrowthPotential::from_growth(components.growth),
                risk_profile: RiskProfile::assess(components.leverage, components.profitability),
                rank: 0,
            }),
            Err(error) => {
                debug!(symbol = %candidate.symbol, %error, "candidate not ranked");
                ranking.failures.push(RankingFailure {
                    symbol: candidate.symbol.clone(),
                    error,
                });
            }
        }
    }

    ranking.cards.sort_by(by_score_then_symbol);
    for (i, card) in ranking.cards.iter_mut().enumerate() {
        card.rank = i + 1;
    }
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use valuation_core::types::ErrorCode;

    fn candidate(symbol: &str, margin: f64, growth: f64, debt: f64) -> Candidate {
        Candidate::new(
            symbol,
            LatestMetrics {
                ebitda_margin: margin,
                revenue_growth: growth,
                ..Default::default()
            },
            BalanceSheet {
                total_debt: debt,
                total_assets: 100.0,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_score_formula() {
        let ranking = rank(&[candidate("ACME", 0.25, 0.10, 30.0)]);
        let card = &ranking.cards[0];
        assert_relative_eq!(card.score, 0.4 * 0.25 + 0.4 * 0.10 + 0.2 * 0.7, epsilon = 1e-12);
        assert_eq!(card.rank, 1);
        assert_eq!(card.financial_health, FinancialHealth::Strong);
        assert_eq!(card.growth_potential, GrowthPotential::Moderate);
        assert_eq!(card.risk_profile, RiskProfile::Low);
    }

    #[test]
    fn test_order_by_score_descending() {
        let ranking = rank(&[
            candidate("LOW", 0.05, 0.0, 50.0),
            candidate("HIGH", 0.30, 0.20, 10.0),
            candidate("MID", 0.15, 0.10, 30.0),
        ]);
        let order: Vec<_> = ranking.cards.iter().map(|c| (c.symbol.as_str(), c.rank)).collect();
        assert_eq!(order, vec![("HIGH", 1), ("MID", 2), ("LOW", 3)]);
        assert_eq!(ranking.top().unwrap().symbol, "HIGH");
        assert_eq!(ranking.card("MID").unwrap().rank, 2);
    }

    #[test]
    fn test_label_thresholds_are_strict() {
        assert_eq!(FinancialHealth::from_margin(0.15), FinancialHealth::Moderate);
        assert_eq!(FinancialHealth::from_margin(0.08), FinancialHealth::Weak);
        assert_eq!(GrowthPotential::from_growth(0.15), GrowthPotential::Moderate);
        assert_eq!(GrowthPotential::from_growth(0.05), GrowthPotential::Low);
        assert_eq!(RiskProfile::assess(0.6, 0.1), RiskProfile::Moderate);
        assert_eq!(RiskProfile::assess(0.4, 0.1), RiskProfile::Low);
        assert_eq!(RiskProfile::assess(0.1, -0.01), RiskProfile::High);
        assert_eq!(RiskProfile::High.to_string(), "High Risk");
    }

    #[test]
    fn test_unscorable_candidates_are_reported() {
        let mut no_assets = candidate("NOAS", 0.2, 0.1, 10.0);
        no_assets.balance_sheet.total_assets = 0.0;
        let mut nan_metrics = candidate("NAN", 0.2, 0.1, 10.0);
        nan_metrics.metrics.revenue_growth = f64::NAN;

        let ranking = rank(&[no_assets, candidate("OK", 0.2, 0.1, 10.0), nan_metrics]);
        assert_eq!(ranking.cards.len(), 1);
        assert_eq!(ranking.failures.len(), 2);
        assert_eq!(ranking.failures[0].symbol, "NOAS");
        assert_eq!(ranking.failures[1].symbol, "NAN");
        assert_eq!(ranking.failures[0].error.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_empty_input() {
        let ranking = rank(&[]);
        assert!(ranking.cards.is_empty());
        assert!(ranking.top().is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_ties_ordered_by_symbol_and_reproducible(
            symbols in proptest::collection::hash_set("[A-Z]{1,4}", 2..12),
            margin in -0.2..0.5_f64,
            growth in -0.2..0.5_f64,
        ) {
            let candidates: Vec<Candidate> = symbols
                .iter()
                .map(|s| candidate(s, margin, growth, 25.0))
                .collect();
            let mut reversed = candidates.clone();
            reversed.reverse();

            let first = rank(&candidates);
            let second = rank(&reversed);
            prop_assert_eq!(&first, &second);

            let mut expected: Vec<&String> = symbols.iter().collect();
            expected.sort();
            let actual: Vec<&String> = first.cards.iter().map(|c| &c.symbol).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
