//! Bounded root finders used by the IRR solver.
//!
//! - [`NewtonRaphsonSolver`]: derivative-driven, fast from a good start
//! - [`BrentSolver`]: bracketing, needs only a sign change
//!
//! Both stop after [`SolverConfig::max_iterations`] steps at the latest
//! (100 by default), so a buyout with an awkward cash-flow profile still
//! returns an error rather than spinning.
//!
//! ```
//! use valuation_core::math::solvers::{BrentSolver, NewtonRaphsonSolver, SolverConfig};
//!
//! let config = SolverConfig::default().with_max_iterations(50);
//! let f = |r: f64| -100.0 + 115.0 / (1.0 + r);
//!
//! let newton = NewtonRaphsonSolver::new(config)
//!     .find_root(f, |r| -115.0 / ((1.0 + r) * (1.0 + r)), 0.0)
//!     .unwrap();
//! let brent = BrentSolver::new(config).find_root(f, -0.5, 1.0).unwrap();
//! assert!((newton - 0.15).abs() < 1e-10);
//! assert!((brent - 0.15).abs() < 1e-9);
//! ```

mod brent;
mod config;
mod newton_raphson;

pub use brent::BrentSolver;
pub use config::SolverConfig;
pub use newton_raphson::NewtonRaphsonSolver;
