//! Net present value and internal rate of return.
//!
//! The IRR is the rate `r > -1` with `NPV(r) = Σ cf_t / (1 + r)^t = 0`.
//! Solving runs Newton-Raphson first (derivative from dual numbers under
//! `num-dual-mode`, analytic otherwise) and falls back to Brent's method on
//! a bracket found by doubling the upper bound. Both stages are bounded by
//! the iteration cap in [`SolverConfig`], so solving always terminates.
//!
//! Cash flows are rescaled by their largest magnitude before solving; the
//! IRR is scale-invariant and the absolute tolerance then behaves the same
//! for statements in units or in billions.

use super::solvers::{BrentSolver, NewtonRaphsonSolver, SolverConfig};
use crate::types::{ConvergenceError, SolverError};
use tracing::debug;

/// Lower end of the fallback bracket (a -99% return).
const BRACKET_LOW: f64 = -0.99;

/// Upper end limit for the fallback bracket search.
const BRACKET_HIGH_LIMIT: f64 = 1.0e6;

/// Net present value of `cash_flows` at `rate`; `cash_flows[0]` is undiscounted.
///
/// # Example
///
/// ```
/// use valuation_core::math::irr::npv;
///
/// let value = npv(0.1, &[-100.0, 110.0]);
/// assert!(value.abs() < 1e-12);
/// ```
pub fn npv(rate: f64, cash_flows: &[f64]) -> f64 {
    let discount = 1.0 / (1.0 + rate);
    let mut factor = 1.0;
    let mut total = 0.0;
    for &cf in cash_flows {
        total += cf * factor;
        factor *= discount;
    }
    total
}

/// Derivative of [`npv`] with respect to the rate.
#[cfg_attr(feature = "num-dual-mode", allow(dead_code))]
fn npv_derivative(rate: f64, cash_flows: &[f64]) -> f64 {
    let discount = 1.0 / (1.0 + rate);
    let mut factor = discount;
    let mut total = 0.0;
    for (t, &cf) in cash_flows.iter().enumerate() {
        total -= t as f64 * cf * factor;
        factor *= discount;
    }
    total
}

#[cfg(feature = "num-dual-mode")]
fn npv_dual(rate: num_dual::Dual64, cash_flows: &[f64]) -> num_dual::Dual64 {
    use num_dual::{Dual64, DualNum};

    let discount = (rate + 1.0).recip();
    let mut factor = Dual64::from(1.0);
    let mut total = Dual64::from(0.0);
    for &cf in cash_flows {
        total = total + factor * cf;
        factor = factor * discount;
    }
    total
}

/// True when the non-zero flows contain both signs.
fn has_sign_change(cash_flows: &[f64]) -> bool {
    let positive = cash_flows.iter().any(|&cf| cf > 0.0);
    let negative = cash_flows.iter().any(|&cf| cf < 0.0);
    positive && negative
}

/// Bounded IRR solver.
///
/// # Example
///
/// ```
/// use valuation_core::math::irr::IrrSolver;
///
/// let solver = IrrSolver::with_defaults();
/// let rate = solver.solve(&[-300.0, 40.0, 45.0, 50.0, 55.0, 60.0, 500.0]).unwrap();
/// assert!(rate > 0.0 && rate < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct IrrSolver {
    config: SolverConfig<f64>,
    initial_guess: f64,
}

impl Default for IrrSolver {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl IrrSolver {
    /// Solver with the given configuration and a 10% starting guess.
    pub fn new(config: SolverConfig<f64>) -> Self {
        Self {
            config,
            initial_guess: 0.1,
        }
    }

    /// Solver with the default 100-iteration cap.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Override the Newton starting point.
    pub fn with_initial_guess(mut self, guess: f64) -> Self {
        self.initial_guess = guess;
        self
    }

    /// Returns the solver configuration.
    pub fn config(&self) -> &SolverConfig<f64> {
        &self.config
    }

    /// Solve for the internal rate of return.
    ///
    /// # Errors
    ///
    /// - `ConvergenceError::NoSignChange` when the flows are all of one sign
    ///   (or fewer than two flows are given)
    /// - `ConvergenceError::NotConverged` / `Unstable` when neither Newton
    ///   nor the bracketed fallback converges within the iteration cap
    pub fn solve(&self, cash_flows: &[f64]) -> Result<f64, ConvergenceError> {
        if cash_flows.len() < 2 || !has_sign_change(cash_flows) {
            return Err(ConvergenceError::NoSignChange);
        }
        if cash_flows.iter().any(|cf| !cf.is_finite()) {
            return Err(ConvergenceError::Unstable(
                "cash flows contain non-finite values".to_string(),
            ));
        }

        let scale = cash_flows.iter().fold(0.0_f64, |acc, cf| acc.max(cf.abs()));
        let flows: Vec<f64> = cash_flows.iter().map(|cf| cf / scale).collect();

        let newton_error = match self.newton(&flows) {
            Ok(rate) if rate > -1.0 => return Ok(rate),
            Ok(rate) => SolverError::NumericalInstability(format!(
                "Newton converged outside the rate domain at {}",
                rate
            )),
            Err(e) => e,
        };

        debug!(error = %newton_error, "Newton IRR failed, falling back to Brent");

        let f = |r: f64| npv(r, &flows);
        let Some(high) = self.find_upper_bracket(&f) else {
            return Err(newton_error.into());
        };

        BrentSolver::new(self.config)
            .find_root(f, BRACKET_LOW, high)
            .map_err(ConvergenceError::from)
    }

    #[cfg(feature = "num-dual-mode")]
    fn newton(&self, flows: &[f64]) -> Result<f64, SolverError> {
        NewtonRaphsonSolver::new(self.config)
            .find_root_ad(|r| npv_dual(r, flows), self.initial_guess)
    }

    #[cfg(not(feature = "num-dual-mode"))]
    fn newton(&self, flows: &[f64]) -> Result<f64, SolverError> {
        NewtonRaphsonSolver::new(self.config).find_root(
            |r| npv(r, flows),
            |r| npv_derivative(r, flows),
            self.initial_guess,
        )
    }

    /// Double the upper bound from 1.0 until NPV changes sign against the
    /// lower bound. Bounded by `BRACKET_HIGH_LIMIT` (about 20 doublings).
    fn find_upper_bracket<F: Fn(f64) -> f64>(&self, f: &F) -> Option<f64> {
        let f_low = f(BRACKET_LOW);
        let mut high = 1.0;
        while high <= BRACKET_HIGH_LIMIT {
            if f_low * f(high) <= 0.0 {
                return Some(high);
            }
            high *= 2.0;
        }
        None
    }
}

/// Internal rate of return with the default solver.
///
/// # Example
///
/// ```
/// use valuation_core::math::irr::irr;
///
/// let rate = irr(&[-100.0, 0.0, 121.0]).unwrap();
/// assert!((rate - 0.1).abs() < 1e-9);
/// ```
pub fn irr(cash_flows: &[f64]) -> Result<f64, ConvergenceError> {
    IrrSolver::with_defaults().solve(cash_flows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_npv_at_zero_rate_is_sum() {
        let flows = [-100.0, 30.0, 40.0, 50.0];
        assert_relative_eq!(npv(0.0, &flows), 20.0);
    }

    #[test]
    fn test_npv_derivative_matches_finite_difference() {
        let flows = [-300.0, 40.0, 45.0, 50.0, 600.0];
        let h = 1e-6;
        let fd = (npv(0.15 + h, &flows) - npv(0.15 - h, &flows)) / (2.0 * h);
        assert_relative_eq!(npv_derivative(0.15, &flows), fd, max_relative = 1e-6);
    }

    #[test]
    fn test_irr_two_period() {
        let rate = irr(&[-100.0, 0.0, 121.0]).unwrap();
        assert_relative_eq!(rate, 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_irr_is_scale_invariant() {
        let small = [-3.0, 0.4, 0.45, 0.5, 6.0];
        let large: Vec<f64> = small.iter().map(|cf| cf * 1.0e9).collect();

        let r_small = irr(&small).unwrap();
        let r_large = irr(&large).unwrap();
        assert_relative_eq!(r_small, r_large, epsilon = 1e-9);
        assert!(npv(r_large, &large).abs() / 1.0e9 < 1e-8);
    }

    #[test]
    fn test_irr_negative_rate() {
        // Lose 40% over one period
        let rate = irr(&[-100.0, 60.0]).unwrap();
        assert_relative_eq!(rate, -0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_irr_very_high_rate_uses_fallback_range() {
        // 50x in one period => 4900%
        let rate = irr(&[-1.0, 50.0]).unwrap();
        assert_relative_eq!(rate, 49.0, max_relative = 1e-8);
    }

    #[test]
    fn test_irr_no_sign_change() {
        assert_eq!(irr(&[100.0, 50.0, 10.0]), Err(ConvergenceError::NoSignChange));
        assert_eq!(irr(&[-100.0, -50.0]), Err(ConvergenceError::NoSignChange));
        assert_eq!(irr(&[-100.0]), Err(ConvergenceError::NoSignChange));
        assert_eq!(irr(&[]), Err(ConvergenceError::NoSignChange));
    }

    #[test]
    fn test_irr_non_finite_flows() {
        assert!(matches!(
            irr(&[-100.0, f64::NAN, 150.0]),
            Err(ConvergenceError::Unstable(_))
        ));
    }

    #[test]
    fn test_iteration_cap_is_respected() {
        let config = SolverConfig::default()
            .with_tolerance(1e-300)
            .with_max_iterations(1);
        let solver = IrrSolver::new(config).with_initial_guess(5.0);
        let result = solver.solve(&[-100.0, 10.0, 10.0, 10.0, 150.0]);
        assert!(matches!(
            result,
            Err(ConvergenceError::NotConverged { iterations: 1 })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_irr_zeroes_npv(
            investment in 10.0..1000.0_f64,
            coupon in 0.0..200.0_f64,
            terminal in 50.0..5000.0_f64,
        ) {
            let flows = [-investment, coupon, coupon, coupon, terminal];
            let rate = irr(&flows).unwrap();
            prop_assert!(rate > -1.0);
            let scaled = npv(rate, &flows) / investment.max(terminal);
            prop_assert!(scaled.abs() < 1e-8, "npv {} at rate {}", scaled, rate);
        }
    }
}
