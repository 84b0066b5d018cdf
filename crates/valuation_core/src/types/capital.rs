//! Capital structure, balance sheet and headline ratio records.

/// Enterprise value split into debt and equity.
///
/// `debt + equity == enterprise_value` holds at construction. Models never
/// mutate a structure in place; derived structures are new values.
///
/// # Examples
/// ```
/// use valuation_core::types::CapitalStructure;
///
/// let cs = CapitalStructure::new(1000.0, 250.0, 50.0, 100.0);
/// assert_eq!(cs.equity(), 750.0);
///
/// let levered = cs.with_debt_ratio(0.7);
/// assert!((levered.debt() - 700.0).abs() < 1e-9);
/// assert!((levered.equity() - 300.0).abs() < 1e-9);
/// assert_eq!(cs.debt(), 250.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "CapitalStructureRecord"))]
pub struct CapitalStructure {
    enterprise_value: f64,
    debt: f64,
    equity: f64,
    cash: f64,
    shares_outstanding: f64,
}

impl CapitalStructure {
    /// Build a structure; equity is the residual `enterprise_value - debt`.
    pub fn new(enterprise_value: f64, debt: f64, cash: f64, shares_outstanding: f64) -> Self {
        Self {
            enterprise_value,
            debt,
            equity: enterprise_value - debt,
            cash,
            shares_outstanding,
        }
    }

    /// Same enterprise value financed with `debt_ratio` of debt.
    pub fn with_debt_ratio(&self, debt_ratio: f64) -> Self {
        let debt = self.enterprise_value * debt_ratio;
        Self::new(self.enterprise_value, debt, self.cash, self.shares_outstanding)
    }

    /// Enterprise value.
    #[inline]
    pub fn enterprise_value(&self) -> f64 {
        self.enterprise_value
    }

    /// Debt component.
    #[inline]
    pub fn debt(&self) -> f64 {
        self.debt
    }

    /// Equity component.
    #[inline]
    pub fn equity(&self) -> f64 {
        self.equity
    }

    /// Cash on the balance sheet.
    #[inline]
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Shares outstanding.
    #[inline]
    pub fn shares_outstanding(&self) -> f64 {
        self.shares_outstanding
    }

    /// True when every component is a finite number.
    ///
    /// ```
    /// use valuation_core::types::CapitalStructure;
    ///
    /// assert!(CapitalStructure::new(1000.0, 0.0, 50.0, 10.0).is_finite());
    /// assert!(!CapitalStructure::new(f64::NAN, 0.0, 50.0, 10.0).is_finite());
    /// ```
    pub fn is_finite(&self) -> bool {
        [
            self.enterprise_value,
            self.debt,
            self.cash,
            self.shares_outstanding,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct CapitalStructureRecord {
    enterprise_value: f64,
    #[serde(default)]
    debt: f64,
    #[serde(default)]
    cash: f64,
    #[serde(default)]
    shares_outstanding: f64,
}

#[cfg(feature = "serde")]
impl From<CapitalStructureRecord> for CapitalStructure {
    fn from(r: CapitalStructureRecord) -> Self {
        CapitalStructure::new(r.enterprise_value, r.debt, r.cash, r.shares_outstanding)
    }
}

/// Latest balance sheet figures.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BalanceSheet {
    /// Cash and cash equivalents
    pub cash: f64,
    /// Total debt
    pub total_debt: f64,
    /// Total assets
    pub total_assets: f64,
    /// Total liabilities
    pub total_liabilities: f64,
    /// Total shareholders' equity
    pub equity: f64,
}

impl BalanceSheet {
    /// Total debt over total assets; `None` when assets are not positive.
    ///
    /// ```
    /// use valuation_core::types::BalanceSheet;
    ///
    /// let bs = BalanceSheet { total_debt: 30.0, total_assets: 100.0, ..Default::default() };
    /// assert_eq!(bs.debt_to_assets(), Some(0.3));
    /// assert_eq!(BalanceSheet::default().debt_to_assets(), None);
    /// ```
    pub fn debt_to_assets(&self) -> Option<f64> {
        if self.total_assets > 0.0 && self.total_debt.is_finite() {
            Some(self.total_debt / self.total_assets)
        } else {
            None
        }
    }
}

/// Headline ratios for the most recent fiscal year, as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LatestMetrics {
    /// Year-over-year revenue growth
    pub revenue_growth: f64,
    /// Gross margin
    pub gross_margin: f64,
    /// EBITDA margin
    pub ebitda_margin: f64,
    /// Net profit margin
    pub net_margin: f64,
}

impl LatestMetrics {
    /// True when every ratio is finite.
    pub fn is_finite(&self) -> bool {
        self.revenue_growth.is_finite()
            && self.gross_margin.is_finite()
            && self.ebitda_margin.is_finite()
            && self.net_margin.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_capital_structure_identity() {
        let cs = CapitalStructure::new(1000.0, 400.0, 20.0, 50.0);
        assert_relative_eq!(cs.debt() + cs.equity(), cs.enterprise_value());
        assert_eq!(cs.cash(), 20.0);
        assert_eq!(cs.shares_outstanding(), 50.0);
    }

    #[test]
    fn test_with_debt_ratio_returns_new_value() {
        let cs = CapitalStructure::new(1000.0, 0.0, 0.0, 1.0);
        let levered = cs.with_debt_ratio(0.7);

        assert_relative_eq!(levered.equity(), 300.0, epsilon = 1e-9);
        assert_relative_eq!(levered.debt(), 700.0, epsilon = 1e-9);
        assert_relative_eq!(
            levered.debt() + levered.equity(),
            levered.enterprise_value()
        );
        assert_eq!(cs.equity(), 1000.0);
    }

    #[test]
    fn test_debt_to_assets_guards_zero_assets() {
        let bs = BalanceSheet {
            total_debt: 10.0,
            total_assets: 0.0,
            ..Default::default()
        };
        assert!(bs.debt_to_assets().is_none());

        let negative = BalanceSheet {
            total_debt: 10.0,
            total_assets: -5.0,
            ..Default::default()
        };
        assert!(negative.debt_to_assets().is_none());
    }

    #[test]
    fn test_latest_metrics_finite() {
        let mut m = LatestMetrics {
            revenue_growth: 0.1,
            ebitda_margin: 0.2,
            ..Default::default()
        };
        assert!(m.is_finite());
        m.ebitda_margin = f64::NAN;
        assert!(!m.is_finite());
    }
}
