//! Rule-of-thumb synergy estimate for a combination.

use valuation_core::types::FinancialHistory;

/// Revenue synergy as a share of combined revenue.
pub const REVENUE_SYNERGY_RATE: f64 = 0.05;

/// Cost synergy as a share of the target's revenue.
pub const COST_SYNERGY_RATE: f64 = 0.03;

/// Estimated annual synergies.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SynergyEstimate {
    /// Cross-selling upside on combined revenue
    pub revenue_synergy: f64,
    /// Operational efficiencies on the target's cost base
    pub cost_synergy: f64,
}

impl SynergyEstimate {
    /// Revenue plus cost synergy.
    pub fn total(&self) -> f64 {
        self.revenue_synergy + self.cost_synergy
    }
}

/// Synergies from the acquirer's and target's latest revenue.
///
/// ```
/// use valuation_models::synergy::estimate_synergies;
///
/// let s = estimate_synergies(1000.0, 200.0);
/// assert!((s.revenue_synergy - 60.0).abs() < 1e-9);
/// assert!((s.cost_synergy - 6.0).abs() < 1e-9);
/// ```
pub fn estimate_synergies(acquirer_revenue: f64, target_revenue: f64) -> SynergyEstimate {
    SynergyEstimate {
        revenue_synergy: (acquirer_revenue + target_revenue) * REVENUE_SYNERGY_RATE,
        cost_synergy: target_revenue * COST_SYNERGY_RATE,
    }
}

/// Synergies from two normalised histories; a missing latest revenue
/// counts as zero.
pub fn synergies_between(
    acquirer: &FinancialHistory,
    target: &FinancialHistory,
) -> SynergyEstimate {
    let revenue = |h: &FinancialHistory| h.latest().revenue.unwrap_or(0.0);
    estimate_synergies(revenue(acquirer), revenue(target))
}
