//! Stopping rule shared by the root finders.

use num_traits::Float;

/// Default residual tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// When a root search stops.
///
/// A search succeeds once `|f(x)| < tolerance` and fails with
/// `SolverError::MaxIterationsExceeded` after `max_iterations` steps. A cap
/// of zero fails immediately; a non-positive tolerance never accepts a
/// residual, so only Brent's bracket collapse can end that search early.
///
/// # Example
///
/// ```
/// use valuation_core::math::solvers::SolverConfig;
///
/// let tight: SolverConfig<f64> = SolverConfig::default()
///     .with_tolerance(1e-13)
///     .with_max_iterations(250);
/// assert_eq!(tight.max_iterations, 250);
/// assert!(tight.converged(-5e-14));
/// assert!(!tight.converged(1e-12));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig<T: Float> {
    /// Residual below which a point counts as a root
    pub tolerance: T,
    /// Step budget
    pub max_iterations: usize,
}

impl<T: Float> Default for SolverConfig<T> {
    fn default() -> Self {
        Self {
            tolerance: T::from(DEFAULT_TOLERANCE).unwrap_or_else(T::epsilon),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Replace the residual tolerance.
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Replace the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// True when `residual` is small enough to stop.
    #[inline]
    pub fn converged(&self, residual: T) -> bool {
        residual.abs() < self.tolerance
    }
}
