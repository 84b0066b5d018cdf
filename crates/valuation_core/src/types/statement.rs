//! Per-year financial statement records.
//!
//! - [`RawStatement`]: one fiscal year as delivered by the data-acquisition
//!   layer, every figure optional
//! - [`FinancialSnapshot`]: one normalised fiscal year
//! - [`FinancialHistory`]: the normalised, most-recent-first sequence for a
//!   single company
//!
//! All monetary figures are plain `f64` in the currency units of the input
//! statements.

use super::error::{DataError, ValuationResult};

/// One fiscal year of raw statement data.
///
/// # Examples
/// ```
/// use valuation_core::types::RawStatement;
///
/// let raw = RawStatement::new("2024")
///     .with_revenue(100.0)
///     .with_ebitda(20.0)
///     .with_free_cash_flow(14.0);
/// assert_eq!(raw.free_cash_flow, Some(14.0));
/// assert_eq!(raw.net_income, None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawStatement {
    /// Fiscal-year label
    pub date: String,
    /// Total revenue
    #[cfg_attr(feature = "serde", serde(default))]
    pub revenue: Option<f64>,
    /// EBITDA
    #[cfg_attr(feature = "serde", serde(default))]
    pub ebitda: Option<f64>,
    /// Net income
    #[cfg_attr(feature = "serde", serde(default))]
    pub net_income: Option<f64>,
    /// Reported free cash flow
    #[cfg_attr(feature = "serde", serde(default))]
    pub free_cash_flow: Option<f64>,
}

impl RawStatement {
    /// Create an empty record for the given fiscal year.
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Default::default()
        }
    }

    /// Set revenue.
    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = Some(revenue);
        self
    }

    /// Set EBITDA.
    pub fn with_ebitda(mut self, ebitda: f64) -> Self {
        self.ebitda = Some(ebitda);
        self
    }

    /// Set net income.
    pub fn with_net_income(mut self, net_income: f64) -> Self {
        self.net_income = Some(net_income);
        self
    }

    /// Set reported free cash flow.
    pub fn with_free_cash_flow(mut self, fcf: f64) -> Self {
        self.free_cash_flow = Some(fcf);
        self
    }
}

/// One normalised fiscal year.
///
/// `free_cash_flow` is either the reported figure or, when
/// `fcf_is_estimated` is set, the EBITDA-derived proxy. The proxy is a
/// heuristic and not a GAAP figure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinancialSnapshot {
    /// Fiscal-year label
    pub date: String,
    /// Total revenue
    pub revenue: Option<f64>,
    /// EBITDA
    pub ebitda: Option<f64>,
    /// Net income
    pub net_income: Option<f64>,
    /// Reported or estimated free cash flow
    pub free_cash_flow: Option<f64>,
    /// Whether `free_cash_flow` is the EBITDA proxy
    pub fcf_is_estimated: bool,
}

impl FinancialSnapshot {
    /// Snapshot with a reported free cash flow.
    pub fn reported(date: impl Into<String>, revenue: f64, ebitda: f64, fcf: f64) -> Self {
        Self {
            date: date.into(),
            revenue: Some(revenue),
            ebitda: Some(ebitda),
            net_income: None,
            free_cash_flow: Some(fcf),
            fcf_is_estimated: false,
        }
    }

    /// True when this year carries a free cash flow.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.free_cash_flow.is_some()
    }
}

/// Normalised statement history for one company, most recent year first.
///
/// Always holds at least one snapshot with a free cash flow.
///
/// # Examples
/// ```
/// use valuation_core::types::{FinancialHistory, FinancialSnapshot};
///
/// let history = FinancialHistory::from_snapshots(vec![
///     FinancialSnapshot::reported("2024", 120.0, 24.0, 16.0),
///     FinancialSnapshot::reported("2023", 100.0, 20.0, 14.0),
/// ])
/// .unwrap();
///
/// assert_eq!(history.latest().date, "2024");
/// assert!((history.revenue_growth().unwrap() - 0.2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinancialHistory {
    snapshots: Vec<FinancialSnapshot>,
}

impl FinancialHistory {
    /// Build a history from already-normalised snapshots.
    ///
    /// # Errors
    ///
    /// `DataError::InsufficientHistory` when no snapshot carries a free cash flow.
    pub fn from_snapshots(snapshots: Vec<FinancialSnapshot>) -> ValuationResult<Self> {
        if !snapshots.iter().any(FinancialSnapshot::is_usable) {
            return Err(DataError::InsufficientHistory {
                records: snapshots.len(),
            }
            .into());
        }
        Ok(Self { snapshots })
    }

    /// All snapshots, most recent first.
    pub fn snapshots(&self) -> &[FinancialSnapshot] {
        &self.snapshots
    }

    /// Most recent fiscal year.
    pub fn latest(&self) -> &FinancialSnapshot {
        // Non-empty by construction.
        &self.snapshots[0]
    }

    /// Number of fiscal years held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Free cash flows of every usable year, most recent first.
    pub fn available_fcfs(&self) -> Vec<f64> {
        self.snapshots
            .iter()
            .filter_map(|s| s.free_cash_flow)
            .collect()
    }

    /// True when any usable year relies on the EBITDA proxy.
    pub fn uses_estimated_fcf(&self) -> bool {
        self.snapshots
            .iter()
            .any(|s| s.is_usable() && s.fcf_is_estimated)
    }

    /// Trailing year-over-year revenue growth from the two most recent
    /// years that report revenue. `None` with fewer than two such years or
    /// a zero prior-year revenue.
    pub fn revenue_growth(&self) -> Option<f64> {
        let mut revenues = self.snapshots.iter().filter_map(|s| s.revenue);
        let current = revenues.next()?;
        let prior = revenues.next()?;
        if prior == 0.0 {
            return None;
        }
        Some((current - prior) / prior.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorCode;
    use approx::assert_relative_eq;

    fn estimated(date: &str, ebitda: f64) -> FinancialSnapshot {
        FinancialSnapshot {
            date: date.to_string(),
            revenue: None,
            ebitda: Some(ebitda),
            net_income: None,
            free_cash_flow: Some(ebitda * 0.7),
            fcf_is_estimated: true,
        }
    }

    #[test]
    fn test_from_snapshots_rejects_without_fcf() {
        let snapshot = FinancialSnapshot {
            free_cash_flow: None,
            ..FinancialSnapshot::reported("2024", 1.0, 1.0, 1.0)
        };
        let err = FinancialHistory::from_snapshots(vec![snapshot]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InsufficientHistory);

        let err = FinancialHistory::from_snapshots(Vec::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InsufficientHistory);
    }

    #[test]
    fn test_available_fcfs_preserves_order() {
        let history = FinancialHistory::from_snapshots(vec![
            FinancialSnapshot::reported("2024", 100.0, 20.0, 15.0),
            estimated("2023", 10.0),
            FinancialSnapshot::reported("2022", 80.0, 12.0, 9.0),
        ])
        .unwrap();

        let fcfs = history.available_fcfs();
        assert_eq!(fcfs.len(), 3);
        assert_relative_eq!(fcfs[0], 15.0);
        assert_relative_eq!(fcfs[1], 7.0);
        assert_relative_eq!(fcfs[2], 9.0);
        assert!(history.uses_estimated_fcf());
    }

    #[test]
    fn test_revenue_growth_requires_two_years() {
        let single = FinancialHistory::from_snapshots(vec![FinancialSnapshot::reported(
            "2024", 100.0, 20.0, 14.0,
        )])
        .unwrap();
        assert!(single.revenue_growth().is_none());

        let zero_prior = FinancialHistory::from_snapshots(vec![
            FinancialSnapshot::reported("2024", 100.0, 20.0, 14.0),
            FinancialSnapshot::reported("2023", 0.0, 20.0, 14.0),
        ])
        .unwrap();
        assert!(zero_prior.revenue_growth().is_none());
    }

    #[test]
    fn test_revenue_growth_skips_missing_revenue() {
        let history = FinancialHistory::from_snapshots(vec![
            FinancialSnapshot::reported("2024", 130.0, 20.0, 14.0),
            estimated("2023", 18.0),
            FinancialSnapshot::reported("2022", 100.0, 15.0, 11.0),
        ])
        .unwrap();
        assert_relative_eq!(history.revenue_growth().unwrap(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_raw_statement_builder() {
        let raw = RawStatement::new("2021")
            .with_revenue(10.0)
            .with_net_income(1.0);
        assert_eq!(raw.date, "2021");
        assert_eq!(raw.revenue, Some(10.0));
        assert_eq!(raw.net_income, Some(1.0));
        assert_eq!(raw.ebitda, None);
    }
}
