//! Core financial records and error types.
//!
//! This module provides:
//! - `statement`: Raw and normalised per-year statement records
//! - `capital`: Capital structure, balance sheet and headline ratios
//! - `error`: Structured error taxonomy for data, calculation and convergence failures
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`RawStatement`], [`FinancialSnapshot`], [`FinancialHistory`] from `statement`
//! - [`CapitalStructure`], [`BalanceSheet`], [`LatestMetrics`] from `capital`
//! - [`ValuationError`], [`DataError`], [`CalculationError`], [`ConvergenceError`],
//!   [`SolverError`], [`ErrorCode`], [`ValuationResult`] from `error`

pub mod capital;
pub mod error;
pub mod statement;

// Re-export commonly used types at module level
pub use capital::{BalanceSheet, CapitalStructure, LatestMetrics};
pub use error::{
    CalculationError, ConvergenceError, DataError, ErrorCode, SolverError, ValuationError,
    ValuationResult,
};
pub use statement::{FinancialHistory, FinancialSnapshot, RawStatement};
