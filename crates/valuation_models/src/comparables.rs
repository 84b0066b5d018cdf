//! Trading multiples from a market quote.

use valuation_core::types::FinancialHistory;

/// Market quote for a listed company.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarketQuote {
    /// Equity market capitalisation
    pub market_cap: f64,
    /// Quoted price/earnings ratio
    pub pe: Option<f64>,
}

/// Headline trading multiples. A multiple is `None` when its denominator
/// is missing or zero.
///
/// Market capitalisation stands in for enterprise value in both EV
/// multiples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TradingMultiples {
    /// Market cap over latest EBITDA
    pub ev_to_ebitda: Option<f64>,
    /// Market cap over latest revenue
    pub ev_to_revenue: Option<f64>,
    /// Quoted P/E
    pub pe: Option<f64>,
}

fn ratio(numerator: f64, denominator: Option<f64>) -> Option<f64> {
    denominator
        .filter(|d| *d != 0.0 && d.is_finite())
        .map(|d| numerator / d)
        .filter(|m| m.is_finite())
}

/// Multiples on the most recent fiscal year.
///
/// # Examples
/// ```
/// use valuation_core::types::{FinancialHistory, FinancialSnapshot};
/// use valuation_models::comparables::{trading_multiples, MarketQuote};
///
/// let history = FinancialHistory::from_snapshots(vec![
///     FinancialSnapshot::reported("2024", 400.0, 80.0, 50.0),
/// ])
/// .unwrap();
/// let quote = MarketQuote { market_cap: 1200.0, pe: Some(18.0) };
///
/// let m = trading_multiples(&history, &quote);
/// assert_eq!(m.ev_to_ebitda, Some(15.0));
/// assert_eq!(m.ev_to_revenue, Some(3.0));
/// assert_eq!(m.pe, Some(18.0));
/// ```
pub fn trading_multiples(history: &FinancialHistory, quote: &MarketQuote) -> TradingMultiples {
    let latest = history.latest();
    TradingMultiples {
        ev_to_ebitda: ratio(quote.market_cap, latest.ebitda),
        ev_to_revenue: ratio(quote.market_cap, latest.revenue),
        pe: quote.pe.filter(|pe| pe.is_finite()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::types::FinancialSnapshot;

    #[test]
    fn test_zero_denominators_yield_none() {
        let history = FinancialHistory::from_snapshots(vec![FinancialSnapshot {
            ebitda: Some(0.0),
            revenue: None,
            ..FinancialSnapshot::reported("2024", 0.0, 0.0, 5.0)
        }])
        .unwrap();
        let quote = MarketQuote {
            market_cap: 500.0,
            pe: None,
        };

        let m = trading_multiples(&history, &quote);
        assert_eq!(m, TradingMultiples::default());
    }

    #[test]
    fn test_uses_latest_year_only() {
        let history = FinancialHistory::from_snapshots(vec![
            FinancialSnapshot::reported("2024", 100.0, 50.0, 5.0),
            FinancialSnapshot::reported("2023", 10.0, 5.0, 5.0),
        ])
        .unwrap();
        let quote = MarketQuote {
            market_cap: 500.0,
            pe: Some(f64::NAN),
        };

        let m = trading_multiples(&history, &quote);
        assert_eq!(m.ev_to_ebitda, Some(10.0));
        assert_eq!(m.ev_to_revenue, Some(5.0));
        assert_eq!(m.pe, None);
    }
}
