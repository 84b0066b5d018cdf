//! Statement normalisation.
//!
//! Converts raw per-year statement records into a [`FinancialHistory`].
//! When a year's free cash flow is missing or zero but EBITDA is present,
//! the free cash flow is estimated as `ebitda * fcf_proxy_ratio` and the
//! snapshot is tagged `fcf_is_estimated`. Years with neither figure stay in
//! the history (their revenue still feeds growth metrics) but are not
//! usable for cash-flow models.

use crate::types::{
    CalculationError, DataError, FinancialHistory, FinancialSnapshot, RawStatement,
    ValuationResult,
};
use tracing::{debug, warn};

/// Default EBITDA-to-FCF proxy ratio.
pub const DEFAULT_FCF_PROXY_RATIO: f64 = 0.7;

/// Default number of most recent fiscal years retained.
pub const DEFAULT_MAX_YEARS: usize = 5;

/// Normaliser settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NormalizerConfig {
    /// Number of most recent records kept
    pub max_years: usize,
    /// Multiplier applied to EBITDA when free cash flow is missing
    pub fcf_proxy_ratio: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_years: DEFAULT_MAX_YEARS,
            fcf_proxy_ratio: DEFAULT_FCF_PROXY_RATIO,
        }
    }
}

impl NormalizerConfig {
    /// Check the settings.
    pub fn validate(&self) -> Result<(), CalculationError> {
        if self.max_years == 0 {
            return Err(CalculationError::invalid_parameter(
                "max_years",
                "must be at least 1",
            ));
        }
        if !self.fcf_proxy_ratio.is_finite() || self.fcf_proxy_ratio <= 0.0 {
            return Err(CalculationError::invalid_parameter(
                "fcf_proxy_ratio",
                "must be a positive finite number",
            ));
        }
        Ok(())
    }
}

/// Non-finite figures are treated as missing.
#[inline]
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Present and non-zero.
#[inline]
fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

fn normalize_year(raw: &RawStatement, proxy_ratio: f64) -> FinancialSnapshot {
    let revenue = finite(raw.revenue);
    let ebitda = finite(raw.ebitda);
    let net_income = finite(raw.net_income);

    let (free_cash_flow, fcf_is_estimated) = match non_zero(finite(raw.free_cash_flow)) {
        Some(fcf) => (Some(fcf), false),
        None => match non_zero(ebitda) {
            Some(e) => (Some(e * proxy_ratio), true),
            None => (None, false),
        },
    };

    FinancialSnapshot {
        date: raw.date.clone(),
        revenue,
        ebitda,
        net_income,
        free_cash_flow,
        fcf_is_estimated,
    }
}

/// Normalise raw records (most recent first) into a [`FinancialHistory`].
///
/// # Errors
///
/// - `DataError::InsufficientHistory` when no year has a reported or
///   estimated free cash flow
/// - `CalculationError::InvalidParameter` for an invalid config
///
/// # Example
///
/// ```
/// use valuation_core::normalizer::{normalize, NormalizerConfig};
/// use valuation_core::types::{ErrorCode, RawStatement};
///
/// let raw = vec![RawStatement::new("2024").with_revenue(50.0)];
/// let err = normalize(&raw, &NormalizerConfig::default()).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::InsufficientHistory);
/// ```
pub fn normalize(
    raw: &[RawStatement],
    config: &NormalizerConfig,
) -> ValuationResult<FinancialHistory> {
    config.validate()?;

    let snapshots: Vec<FinancialSnapshot> = raw
        .iter()
        .take(config.max_years)
        .map(|r| normalize_year(r, config.fcf_proxy_ratio))
        .collect();

    let estimated = snapshots.iter().filter(|s| s.fcf_is_estimated).count();
    let usable = snapshots.iter().filter(|s| s.is_usable()).count();

    if usable == 0 {
        warn!(records = raw.len(), "no usable fiscal year in statement history");
        return Err(DataError::InsufficientHistory { records: raw.len() }.into());
    }

    debug!(
        years = snapshots.len(),
        usable,
        estimated,
        "normalised statement history"
    );

    FinancialHistory::from_snapshots(snapshots)
}
