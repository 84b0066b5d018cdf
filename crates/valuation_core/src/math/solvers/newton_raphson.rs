//! Newton-Raphson iteration.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Slope below which a Newton step is refused.
const MIN_SLOPE: f64 = 1e-30;

/// Newton root finder, `x ← x - f(x) / f'(x)`.
///
/// Quadratic near a simple root, but free to wander off when the starting
/// point is poor. The IRR solver rejects roots at or below `-1` and retries
/// with [`BrentSolver`](super::BrentSolver).
///
/// # Example
///
/// ```
/// use valuation_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
///
/// let solver = NewtonRaphsonSolver::new(SolverConfig::default());
///
/// // 250 invested, 400 back after three years
/// let f = |r: f64| -250.0 + 400.0 / (1.0 + r).powi(3);
/// let df = |r: f64| -1200.0 / (1.0 + r).powi(4);
///
/// let rate = solver.find_root(f, df, 0.1).unwrap();
/// assert!((rate - (1.6_f64.cbrt() - 1.0)).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct NewtonRaphsonSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> NewtonRaphsonSolver<T> {
    /// Solver with the given stopping rule.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Solver with [`SolverConfig::default`].
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Stopping rule in use.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Root of `f` from `x0`, with the slope supplied by `df`.
    ///
    /// # Errors
    ///
    /// - `SolverError::DerivativeNearZero` on a flat step
    /// - `SolverError::NumericalInstability` when an iterate is not finite
    /// - `SolverError::MaxIterationsExceeded` when the cap is reached
    pub fn find_root<F, G>(&self, f: F, df: G, x0: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        self.iterate(x0, |x| (f(x), df(x)))
    }

    fn iterate<E>(&self, x0: T, mut eval: E) -> Result<T, SolverError>
    where
        E: FnMut(T) -> (T, T),
    {
        let min_slope = T::from(MIN_SLOPE).unwrap_or_else(T::min_positive_value);
        let mut x = x0;

        for _ in 0..self.config.max_iterations {
            let (value, slope) = eval(x);
            if self.config.converged(value) {
                return Ok(x);
            }
            if slope.abs() < min_slope {
                return Err(SolverError::DerivativeNearZero {
                    x: x.to_f64().unwrap_or(f64::NAN),
                });
            }

            x = x - value / slope;
            if !x.is_finite() {
                return Err(SolverError::NumericalInstability(
                    "Newton step left the finite range".to_string(),
                ));
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }
}

#[cfg(feature = "num-dual-mode")]
impl NewtonRaphsonSolver<f64> {
    /// Root of `f` from `x0`, differentiating `f` with dual numbers.
    ///
    /// One evaluation per step on `Dual64::new(x, 1.0)` gives the value in
    /// `re` and the slope in `eps`.
    ///
    /// # Example
    ///
    /// ```
    /// use num_dual::{Dual64, DualNum};
    /// use valuation_core::math::solvers::NewtonRaphsonSolver;
    ///
    /// let solver = NewtonRaphsonSolver::with_defaults();
    /// // 100 in, 50 and 75 back
    /// let f = |r: Dual64| {
    ///     let d = (r + 1.0).recip();
    ///     d * 50.0 + d * d * 75.0 - 100.0
    /// };
    ///
    /// let rate = solver.find_root_ad(f, 0.0).unwrap();
    /// assert!(rate > 0.15 && rate < 0.17);
    /// ```
    pub fn find_root_ad<F>(&self, f: F, x0: f64) -> Result<f64, SolverError>
    where
        F: Fn(num_dual::Dual64) -> num_dual::Dual64,
    {
        self.iterate(x0, |x| {
            let y = f(num_dual::Dual64::new(x, 1.0));
            (y.re, y.eps)
        })
    }
}
