//! # valuation_core: Foundation for the Deal Valuation Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! valuation_core is the bottom layer of the workspace, providing:
//! - Financial statement records: `RawStatement`, `FinancialSnapshot`,
//!   `FinancialHistory` (`types::statement`)
//! - Capital structure and balance sheet records (`types::capital`)
//! - Error taxonomy: `ValuationError`, `DataError`, `CalculationError`,
//!   `ConvergenceError`, `SolverError` (`types::error`)
//! - Statement normalisation with the EBITDA-derived FCF proxy (`normalizer`)
//! - Root-finding solvers and the IRR/NPV routines built on them (`math`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other valuation_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - num-dual: Dual numbers for the IRR derivative (optional)
//! - thiserror: Error derivation
//! - tracing: Diagnostic events for solver fallbacks
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use valuation_core::normalizer::{normalize, NormalizerConfig};
//! use valuation_core::types::RawStatement;
//!
//! let raw = vec![
//!     RawStatement::new("2024").with_revenue(100.0).with_ebitda(20.0),
//!     RawStatement::new("2023").with_revenue(90.0).with_free_cash_flow(12.0),
//! ];
//!
//! let history = normalize(&raw, &NormalizerConfig::default()).unwrap();
//! assert!(history.snapshots()[0].fcf_is_estimated);
//! assert_eq!(history.available_fcfs(), vec![14.0, 12.0]);
//! ```
//!
//! ## Feature Flags
//!
//! - `num-dual-mode` (default): Use num-dual for the NPV derivative in IRR solving
//! - `serde`: Enable serialisation for all records and errors

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod normalizer;
pub mod types;

pub use types::{
    BalanceSheet, CalculationError, CapitalStructure, ConvergenceError, DataError, ErrorCode,
    FinancialHistory, FinancialSnapshot, LatestMetrics, RawStatement, SolverError,
    ValuationError, ValuationResult,
};
