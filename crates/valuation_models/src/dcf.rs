//! Discounted cash flow valuation.
//!
//! The base free cash flow is the arithmetic mean of every available FCF in
//! the history. It is grown at `growth_rate` for `horizon` years, each year
//! is discounted at `wacc`, and a Gordon growth terminal value on the final
//! projected year closes the valuation:
//!
//! ```text
//! fcf_t = base * (1 + g)^t                     t = 1..=horizon
//! TV    = fcf_h * (1 + g) / (wacc - g)
//! EV    = Σ fcf_t / (1 + wacc)^t + TV / (1 + wacc)^h
//! ```

use valuation_core::types::{CalculationError, DataError, FinancialHistory, ValuationResult};

use crate::MAX_PROJECTION_YEARS;

/// Default discount rate.
pub const DEFAULT_WACC: f64 = 0.12;

/// Default perpetual growth rate.
pub const DEFAULT_GROWTH_RATE: f64 = 0.03;

/// Default projection horizon in years.
pub const DEFAULT_HORIZON: usize = 5;

/// Inputs to [`dcf_with`].
///
/// # Examples
/// ```
/// use valuation_models::dcf::DcfParams;
///
/// let params = DcfParams::default().with_wacc(0.10);
/// assert_eq!(params.wacc, 0.10);
/// assert_eq!(params.horizon, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DcfParams {
    /// Weighted average cost of capital
    pub wacc: f64,
    /// Perpetual growth rate for projection and terminal value
    pub growth_rate: f64,
    /// Number of projected years
    pub horizon: usize,
}

impl Default for DcfParams {
    fn default() -> Self {
        Self {
            wacc: DEFAULT_WACC,
            growth_rate: DEFAULT_GROWTH_RATE,
            horizon: DEFAULT_HORIZON,
        }
    }
}

impl DcfParams {
    /// Set the discount rate.
    pub fn with_wacc(mut self, wacc: f64) -> Self {
        self.wacc = wacc;
        self
    }

    /// Set the growth rate.
    pub fn with_growth_rate(mut self, growth_rate: f64) -> Self {
        self.growth_rate = growth_rate;
        self
    }

    /// Set the projection horizon.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Check the parameters before any formula runs.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for a horizon outside `1..=MAX_PROJECTION_YEARS`,
    ///   a non-finite rate or
    ///   `wacc <= -1`
    /// - `InvalidSpread` when `wacc <= growth_rate`
    pub fn validate(&self) -> Result<(), CalculationError> {
        if self.horizon == 0 || self.horizon > MAX_PROJECTION_YEARS {
            return Err(CalculationError::invalid_parameter(
                "horizon",
                format!(
                    "must be between 1 and {} years, got {}",
                    MAX_PROJECTION_YEARS, self.horizon
                ),
            ));
        }
        if !self.wacc.is_finite() || self.wacc <= -1.0 {
            return Err(CalculationError::invalid_parameter(
                "wacc",
                format!("must be finite and greater than -1, got {}", self.wacc),
            ));
        }
        if !self.growth_rate.is_finite() {
            return Err(CalculationError::invalid_parameter(
                "growth_rate",
                "must be finite",
            ));
        }
        if self.wacc <= self.growth_rate {
            return Err(CalculationError::InvalidSpread {
                wacc: self.wacc,
                growth_rate: self.growth_rate,
            });
        }
        Ok(())
    }
}

/// Output of a DCF valuation.
///
/// `enterprise_value == present_value_fcf + present_value_terminal`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcfResult {
    /// Total enterprise value
    pub enterprise_value: f64,
    /// Sum of discounted projected cash flows
    pub present_value_fcf: f64,
    /// Discounted terminal value
    pub present_value_terminal: f64,
    /// Undiscounted terminal value at the horizon
    pub terminal_value: f64,
    /// Projected cash flows, one per horizon year
    pub projected_fcfs: Vec<f64>,
    /// Mean of the historical free cash flows used as the base
    pub historical_average_fcf: f64,
    /// Whether any historical FCF was the EBITDA proxy
    pub uses_estimated_fcf: bool,
}

/// DCF valuation with explicit rates.
///
/// # Examples
/// ```
/// use valuation_core::types::{FinancialHistory, FinancialSnapshot};
/// use valuation_models::dcf::dcf;
///
/// let history = FinancialHistory::from_snapshots(vec![
///     FinancialSnapshot::reported("2024", 100.0, 20.0, 14.0),
/// ])
/// .unwrap();
///
/// let result = dcf(&history, 0.12, 0.03, 5).unwrap();
/// assert_eq!(result.projected_fcfs.len(), 5);
/// assert!(result.enterprise_value > 0.0);
/// ```
///
/// # Errors
///
/// See [`dcf_with`].
pub fn dcf(
    history: &FinancialHistory,
    wacc: f64,
    growth_rate: f64,
    horizon: usize,
) -> ValuationResult<DcfResult> {
    dcf_with(
        history,
        &DcfParams {
            wacc,
            growth_rate,
            horizon,
        },
    )
}

/// DCF valuation from a parameter set.
///
/// # Errors
///
/// - `CalculationError::InvalidSpread` when `wacc <= growth_rate`
/// - `CalculationError::InvalidParameter` for a horizon of zero or above
///   [`MAX_PROJECTION_YEARS`], or `wacc <= -1`
/// - `DataError::NoCashFlow` when the history has no free cash flow
pub fn dcf_with(history: &FinancialHistory, params: &DcfParams) -> ValuationResult<DcfResult> {
    params.validate()?;

    let fcfs = history.available_fcfs();
    if fcfs.is_empty() {
        return Err(DataError::NoCashFlow("history has no free cash flow".to_string()).into());
    }
    let base_fcf = fcfs.iter().sum::<f64>() / fcfs.len() as f64;

    let growth = 1.0 + params.growth_rate;
    let discount = 1.0 + params.wacc;

    let mut projected_fcfs = Vec::with_capacity(params.horizon);
    let mut present_value_fcf = 0.0;
    for t in 1..=params.horizon {
        let exponent = t as i32;
        let fcf = base_fcf * growth.powi(exponent);
        present_value_fcf += fcf / discount.powi(exponent);
        projected_fcfs.push(fcf);
    }

    let final_fcf = projected_fcfs[params.horizon - 1];
    let terminal_value = final_fcf * growth / (params.wacc - params.growth_rate);
    let present_value_terminal = terminal_value / discount.powi(params.horizon as i32);

    Ok(DcfResult {
        enterprise_value: present_value_fcf + present_value_terminal,
        present_value_fcf,
        present_value_terminal,
        terminal_value,
        projected_fcfs,
        historical_average_fcf: base_fcf,
        uses_estimated_fcf: history.uses_estimated_fcf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use valuation_core::types::{ErrorCode, FinancialSnapshot};

    fn single_year() -> FinancialHistory {
        FinancialHistory::from_snapshots(vec![FinancialSnapshot::reported(
            "2024", 100.0, 20.0, 14.0,
        )])
        .unwrap()
    }

    #[test]
    fn test_single_year_projection() {
        let result = dcf(&single_year(), 0.12, 0.03, 5).unwrap();

        assert_eq!(result.projected_fcfs.len(), 5);
        for (i, fcf) in result.projected_fcfs.iter().enumerate() {
            assert_relative_eq!(*fcf, 14.0 * 1.03_f64.powi(i as i32 + 1), max_relative = 1e-12);
        }

        let expected_tv = result.projected_fcfs[4] * 1.03 / 0.09;
        assert_relative_eq!(result.terminal_value, expected_tv, max_relative = 1e-12);
        assert_relative_eq!(
            result.present_value_terminal,
            expected_tv / 1.12_f64.powi(5),
            max_relative = 1e-12
        );
        assert!(result.enterprise_value > 0.0);
        assert!(!result.uses_estimated_fcf);
    }

    #[test]
    fn test_reproducible_bit_for_bit() {
        let a = dcf(&single_year(), 0.12, 0.03, 5).unwrap();
        let b = dcf(&single_year(), 0.12, 0.03, 5).unwrap();
        assert_eq!(a.enterprise_value.to_bits(), b.enterprise_value.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_base_is_mean_of_history() {
        let history = FinancialHistory::from_snapshots(vec![
            FinancialSnapshot::reported("2024", 100.0, 20.0, 12.0),
            FinancialSnapshot::reported("2023", 90.0, 18.0, 8.0),
        ])
        .unwrap();
        let result = dcf(&history, 0.10, 0.0, 3).unwrap();

        assert_relative_eq!(result.historical_average_fcf, 10.0);
        for fcf in &result.projected_fcfs {
            assert_relative_eq!(*fcf, 10.0);
        }
    }

    #[test]
    fn test_equal_wacc_and_growth_is_invalid_spread() {
        let err = dcf(&single_year(), 0.05, 0.05, 5).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSpread);

        let err = dcf(&single_year(), 0.03, 0.05, 5).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSpread);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let err = dcf(&single_year(), 0.12, 0.03, 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_horizon_capped() {
        for horizon in [MAX_PROJECTION_YEARS + 1, usize::MAX] {
            let err = dcf(&single_year(), 0.12, 0.03, horizon).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidParameter);
        }

        let longest = dcf(&single_year(), 0.12, 0.03, MAX_PROJECTION_YEARS).unwrap();
        assert_eq!(longest.projected_fcfs.len(), MAX_PROJECTION_YEARS);
        assert!(longest.enterprise_value.is_finite());
    }

    #[test]
    fn test_wacc_at_minus_one_rejected() {
        let err = dcf(&single_year(), -1.0, -2.0, 5).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_non_finite_growth_rejected() {
        let err = dcf(&single_year(), 0.12, f64::NAN, 5).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_estimated_fcf_flag_propagates() {
        let history = FinancialHistory::from_snapshots(vec![FinancialSnapshot {
            date: "2024".to_string(),
            revenue: Some(100.0),
            ebitda: Some(20.0),
            net_income: None,
            free_cash_flow: Some(14.0),
            fcf_is_estimated: true,
        }])
        .unwrap();
        assert!(dcf(&history, 0.12, 0.03, 5).unwrap().uses_estimated_fcf);
    }

    #[test]
    fn test_params_builder_matches_positional() {
        let params = DcfParams::default()
            .with_wacc(0.11)
            .with_growth_rate(0.02)
            .with_horizon(7);
        assert_eq!(
            dcf_with(&single_year(), &params).unwrap(),
            dcf(&single_year(), 0.11, 0.02, 7).unwrap()
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_enterprise_value_identity(
            fcf in -500.0..500.0_f64,
            wacc in 0.02..0.30_f64,
            spread in 0.001..0.20_f64,
            horizon in 1usize..15,
        ) {
            let history = FinancialHistory::from_snapshots(vec![
                FinancialSnapshot::reported("2024", 100.0, 20.0, fcf),
            ])
            .unwrap();
            let growth = wacc - spread;
            let r = dcf(&history, wacc, growth, horizon).unwrap();

            let sum = r.present_value_fcf + r.present_value_terminal;
            let scale = r.enterprise_value.abs().max(1e-12);
            prop_assert!((r.enterprise_value - sum).abs() / scale <= 1e-6);
            prop_assert_eq!(r.projected_fcfs.len(), horizon);
        }
    }
}
