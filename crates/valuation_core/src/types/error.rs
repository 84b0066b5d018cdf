//! Failure taxonomy shared by every valuation model.
//!
//! This module provides:
//! - `DataError`: Insufficient or missing input data
//! - `CalculationError`: Mathematically invalid configurations
//! - `ConvergenceError`: Iterative solvers (IRR) that did not converge
//! - `ValuationError`: The union of the three, returned by every model
//! - `SolverError`: Errors from the root-finding solvers
//! - `ErrorCode`: Stable machine-readable codes for per-item error markers
//!
//! Every failure is local to the item that produced it. Batch analyses and
//! sensitivity sweeps store `Result<T, ValuationError>` per item instead of
//! aborting.

use std::fmt;
use thiserror::Error;

/// Stable error codes attached to every [`ValuationError`].
///
/// # Examples
/// ```
/// use valuation_core::types::{CalculationError, ErrorCode, ValuationError};
///
/// let err: ValuationError = CalculationError::ZeroEquity.into();
/// assert_eq!(err.code(), ErrorCode::ZeroEquity);
/// assert_eq!(err.code().as_str(), "ZERO_EQUITY");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ErrorCode {
    /// No usable fiscal year after normalisation
    InsufficientHistory,
    /// No free cash flow available for a cash-flow model
    NoCashFlow,
    /// Neither valuation multiple could be computed
    NoValuationBasis,
    /// A required statement field is absent
    MissingField,
    /// `wacc <= growth_rate` in a Gordon growth terminal value
    InvalidSpread,
    /// Zero equity contribution in a buyout
    ZeroEquity,
    /// Division by a zero denominator
    DivisionByZero,
    /// Parameter outside its valid domain
    InvalidParameter,
    /// Parameter name not recognised by a model
    UnknownParameter,
    /// Iterative solver hit its iteration cap or became unstable
    NotConverged,
    /// Cash-flow stream has no sign change, so no IRR exists
    NoSignChange,
}

impl ErrorCode {
    /// Upper snake case code, e.g. `INVALID_SPREAD`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InsufficientHistory => "INSUFFICIENT_HISTORY",
            ErrorCode::NoCashFlow => "NO_CASH_FLOW",
            ErrorCode::NoValuationBasis => "NO_VALUATION_BASIS",
            ErrorCode::MissingField => "MISSING_FIELD",
            ErrorCode::InvalidSpread => "INVALID_SPREAD",
            ErrorCode::ZeroEquity => "ZERO_EQUITY",
            ErrorCode::DivisionByZero => "DIVISION_BY_ZERO",
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::UnknownParameter => "UNKNOWN_PARAMETER",
            ErrorCode::NotConverged => "NOT_CONVERGED",
            ErrorCode::NoSignChange => "NO_SIGN_CHANGE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insufficient or missing input data.
///
/// # Examples
/// ```
/// use valuation_core::types::DataError;
///
/// let err = DataError::InsufficientHistory { records: 3 };
/// assert_eq!(
///     format!("{}", err),
///     "Insufficient history: no usable fiscal year among 3 records"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataError {
    /// No usable fiscal year remains after FCF substitution.
    #[error("Insufficient history: no usable fiscal year among {records} records")]
    InsufficientHistory {
        /// Number of raw records inspected
        records: usize,
    },

    /// No free cash flow to build a projection from.
    #[error("No cash flow: {0}")]
    NoCashFlow(String),

    /// Neither the revenue nor the EBITDA multiple is computable.
    #[error("No valuation basis: {0}")]
    NoValuationBasis(String),

    /// A required statement field is absent.
    #[error("Missing field: {field}")]
    MissingField {
        /// Field name
        field: String,
    },
}

/// Mathematically invalid model configuration.
///
/// # Examples
/// ```
/// use valuation_core::types::CalculationError;
///
/// let err = CalculationError::InvalidSpread { wacc: 0.1, growth_rate: 0.1 };
/// assert!(format!("{}", err).contains("wacc 0.1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalculationError {
    /// Discount rate does not exceed the perpetual growth rate.
    #[error("Invalid spread: wacc {wacc} must exceed growth rate {growth_rate}")]
    InvalidSpread {
        /// Discount rate
        wacc: f64,
        /// Perpetual growth rate
        growth_rate: f64,
    },

    /// Equity contribution is zero, so MOIC is undefined.
    #[error("Zero equity contribution")]
    ZeroEquity,

    /// A denominator was zero.
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Parameter outside its valid domain.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Parameter name not understood by the model.
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
}

impl CalculationError {
    /// Shorthand for [`CalculationError::InvalidParameter`].
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Iterative solver failure. Non-fatal for buyout results.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvergenceError {
    /// Iteration cap reached.
    #[error("Did not converge after {iterations} iterations")]
    NotConverged {
        /// Iterations attempted
        iterations: usize,
    },

    /// All cash flows share one sign; no rate sets NPV to zero.
    #[error("Cash flows have no sign change")]
    NoSignChange,

    /// Solver produced a non-finite or degenerate step.
    #[error("Numerical instability: {0}")]
    Unstable(String),
}

impl From<SolverError> for ConvergenceError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::MaxIterationsExceeded { iterations } => {
                ConvergenceError::NotConverged { iterations }
            }
            SolverError::NoBracket { .. } => ConvergenceError::NoSignChange,
            SolverError::DerivativeNearZero { x } => {
                ConvergenceError::Unstable(format!("derivative near zero at rate {}", x))
            }
            SolverError::NumericalInstability(msg) => ConvergenceError::Unstable(msg),
        }
    }
}

/// Any failure raised by a valuation model.
///
/// # Examples
/// ```
/// use valuation_core::types::{DataError, ErrorCode, ValuationError};
///
/// let err = ValuationError::from(DataError::NoCashFlow("empty".into()));
/// assert!(err.is_data());
/// assert_eq!(err.code(), ErrorCode::NoCashFlow);
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValuationError {
    /// Input data problem
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Invalid configuration for a formula
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Solver did not converge
    #[error("Convergence error: {0}")]
    Convergence(#[from] ConvergenceError),
}

impl ValuationError {
    /// Machine-readable code for error markers.
    pub fn code(&self) -> ErrorCode {
        match self {
            ValuationError::Data(e) => match e {
                DataError::InsufficientHistory { .. } => ErrorCode::InsufficientHistory,
                DataError::NoCashFlow(_) => ErrorCode::NoCashFlow,
                DataError::NoValuationBasis(_) => ErrorCode::NoValuationBasis,
                DataError::MissingField { .. } => ErrorCode::MissingField,
            },
            ValuationError::Calculation(e) => match e {
                CalculationError::InvalidSpread { .. } => ErrorCode::InvalidSpread,
                CalculationError::ZeroEquity => ErrorCode::ZeroEquity,
                CalculationError::DivisionByZero(_) => ErrorCode::DivisionByZero,
                CalculationError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
                CalculationError::UnknownParameter(_) => ErrorCode::UnknownParameter,
            },
            ValuationError::Convergence(e) => match e {
                ConvergenceError::NoSignChange => ErrorCode::NoSignChange,
                ConvergenceError::NotConverged { .. } | ConvergenceError::Unstable(_) => {
                    ErrorCode::NotConverged
                }
            },
        }
    }

    /// True for [`ValuationError::Data`].
    pub fn is_data(&self) -> bool {
        matches!(self, ValuationError::Data(_))
    }

    /// True for [`ValuationError::Calculation`].
    pub fn is_calculation(&self) -> bool {
        matches!(self, ValuationError::Calculation(_))
    }

    /// True for [`ValuationError::Convergence`].
    pub fn is_convergence(&self) -> bool {
        matches!(self, ValuationError::Convergence(_))
    }
}

/// Result alias used by every model.
pub type ValuationResult<T> = Result<T, ValuationError>;

/// Why a root finder stopped without a root.
///
/// Internal to the IRR path; models see these only after conversion into
/// [`ConvergenceError`].
///
/// # Examples
/// ```
/// use valuation_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 40 };
/// assert_eq!(err.to_string(), "No root within 40 iterations");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Iteration cap reached.
    #[error("No root within {iterations} iterations")]
    MaxIterationsExceeded {
        /// Cap that was hit
        iterations: usize,
    },

    /// Newton step with a flat slope.
    #[error("Flat slope at {x}")]
    DerivativeNearZero {
        /// Point of the refused step
        x: f64,
    },

    /// Bracket ends with the same sign.
    #[error("Bracket [{a}, {b}] has no sign change")]
    NoBracket {
        /// Lower end
        a: f64,
        /// Upper end
        b: f64,
    },

    /// Non-finite iterate or other breakdown.
    #[error("Solver breakdown: {0}")]
    NumericalInstability(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // DataError tests

    #[test]
    fn test_data_error_display() {
        let err = DataError::NoValuationBasis("revenue and ebitda are zero".to_string());
        assert_eq!(
            format!("{}", err),
            "No valuation basis: revenue and ebitda are zero"
        );

        let err = DataError::MissingField {
            field: "ebitda".to_string(),
        };
        assert_eq!(format!("{}", err), "Missing field: ebitda");
    }

    // CalculationError tests

    #[test]
    fn test_invalid_spread_display() {
        let err = CalculationError::InvalidSpread {
            wacc: 0.1,
            growth_rate: 0.12,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid spread: wacc 0.1 must exceed growth rate 0.12"
        );
    }

    #[test]
    fn test_invalid_parameter_helper() {
        let err = CalculationError::invalid_parameter("debt_ratio", "must be within [0, 1]");
        assert_eq!(
            format!("{}", err),
            "Invalid parameter debt_ratio: must be within [0, 1]"
        );
    }

    // ValuationError tests

    #[test]
    fn test_valuation_error_wraps_and_codes() {
        let cases: Vec<(ValuationError, ErrorCode)> = vec![
            (
                DataError::InsufficientHistory { records: 0 }.into(),
                ErrorCode::InsufficientHistory,
            ),
            (
                DataError::NoCashFlow("x".into()).into(),
                ErrorCode::NoCashFlow,
            ),
            (
                CalculationError::InvalidSpread {
                    wacc: 0.1,
                    growth_rate: 0.1,
                }
                .into(),
                ErrorCode::InvalidSpread,
            ),
            (
                CalculationError::DivisionByZero("shares".into()).into(),
                ErrorCode::DivisionByZero,
            ),
            (
                CalculationError::UnknownParameter("foo".into()).into(),
                ErrorCode::UnknownParameter,
            ),
            (
                ConvergenceError::NotConverged { iterations: 100 }.into(),
                ErrorCode::NotConverged,
            ),
            (ConvergenceError::NoSignChange.into(), ErrorCode::NoSignChange),
        ];

        for (err, code) in cases {
            assert_eq!(err.code(), code, "wrong code for {}", err);
        }
    }

    #[test]
    fn test_valuation_error_predicates() {
        let err: ValuationError = CalculationError::ZeroEquity.into();
        assert!(err.is_calculation());
        assert!(!err.is_data());
        assert!(!err.is_convergence());
        assert_eq!(
            format!("{}", err),
            "Calculation error: Zero equity contribution"
        );
    }

    #[test]
    fn test_error_trait_implementation() {
        let err: ValuationError = DataError::NoCashFlow("none".into()).into();
        let _: &dyn std::error::Error = &err;
    }

    // SolverError tests

    #[test]
    fn test_solver_error_no_bracket_display() {
        let err = SolverError::NoBracket { a: -0.99, b: 1.0 };
        assert_eq!(err.to_string(), "Bracket [-0.99, 1] has no sign change");
    }

    #[test]
    fn test_solver_error_into_convergence() {
        assert_eq!(
            ConvergenceError::from(SolverError::MaxIterationsExceeded { iterations: 7 }),
            ConvergenceError::NotConverged { iterations: 7 }
        );
        assert_eq!(
            ConvergenceError::from(SolverError::NoBracket { a: -0.9, b: 10.0 }),
            ConvergenceError::NoSignChange
        );
        assert!(matches!(
            ConvergenceError::from(SolverError::DerivativeNearZero { x: 0.5 }),
            ConvergenceError::Unstable(_)
        ));
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::NoValuationBasis.to_string(), "NO_VALUATION_BASIS");
        assert_eq!(ErrorCode::InsufficientHistory.as_str(), "INSUFFICIENT_HISTORY");
    }
}
