//! Numerical routines for cash-flow analysis.
//!
//! - [`solvers`]: Newton-Raphson and Brent root finders with bounded iterations
//! - [`irr`]: Net present value and internal rate of return built on the solvers

pub mod irr;
pub mod solvers;
