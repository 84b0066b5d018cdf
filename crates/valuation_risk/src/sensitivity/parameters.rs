//! Sweepable parameters and model inputs.
//!
//! Each model gets an input bundle (`LboInputs`, `IpoInputs`, `DcfInputs`)
//! and a typed key enum naming the fields a sweep may vary. Keys parse
//! from their snake_case names, so ranges read from configuration files or
//! the command line resolve to the same variants.

use std::fmt;
use std::str::FromStr;

use valuation_core::types::{
    CalculationError, CapitalStructure, FinancialHistory, ValuationResult,
};
use valuation_models::dcf::{dcf_with, DcfParams, DcfResult};
use valuation_models::ipo::{ipo_with, IpoMetrics, IpoParams, IpoResult, PeerMultiples};
use valuation_models::lbo::{lbo, LboParams, LboResult};
use valuation_models::MAX_PROJECTION_YEARS;

/// Model inputs that a sweep can vary one named field at a time.
pub trait Parameterized: Clone + Send + Sync {
    /// Typed parameter name.
    type Key: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync;

    /// Overwrite one field.
    ///
    /// # Errors
    ///
    /// `CalculationError::InvalidParameter` when `value` cannot represent
    /// the field (for example a fractional holding period).
    fn apply(&mut self, key: Self::Key, value: f64) -> Result<(), CalculationError>;
}

/// Convert a swept value to a whole number of years, at most
/// [`MAX_PROJECTION_YEARS`].
fn whole_years(name: &str, value: f64) -> Result<usize, CalculationError> {
    let max = MAX_PROJECTION_YEARS as f64;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > max {
        return Err(CalculationError::invalid_parameter(
            name,
            format!("must be a whole number of years up to {}, got {}", max, value),
        ));
    }
    Ok(value as usize)
}

macro_rules! parameter_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// snake_case name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CalculationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(CalculationError::UnknownParameter(other.to_string())),
                }
            }
        }
    };
}

/// Sweepable LBO assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LboParameter {
    /// `LboParams::holding_period`
    HoldingPeriod,
    /// `LboParams::debt_ratio`
    DebtRatio,
    /// `LboParams::interest_rate`
    InterestRate,
    /// `LboParams::fcf_growth_rate`
    FcfGrowthRate,
    /// `LboParams::debt_repayment_pct`
    DebtRepaymentPct,
    /// `LboParams::exit_multiple`
    ExitMultiple,
    /// `LboParams::exit_ebitda_growth`
    ExitEbitdaGrowth,
    /// `LboParams::target_irr`
    TargetIrr,
}

parameter_names!(LboParameter {
    HoldingPeriod => "holding_period",
    DebtRatio => "debt_ratio",
    InterestRate => "interest_rate",
    FcfGrowthRate => "fcf_growth_rate",
    DebtRepaymentPct => "debt_repayment_pct",
    ExitMultiple => "exit_multiple",
    ExitEbitdaGrowth => "exit_ebitda_growth",
    TargetIrr => "target_irr",
});

/// Sweepable IPO inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IpoParameter {
    /// `IpoParams::target_float`
    TargetFloat,
    /// `IpoParams::price_range_buffer`
    PriceRangeBuffer,
    /// `IpoMetrics::revenue_growth`
    RevenueGrowth,
    /// `IpoMetrics::total_debt`
    TotalDebt,
}

parameter_names!(IpoParameter {
    TargetFloat => "target_float",
    PriceRangeBuffer => "price_range_buffer",
    RevenueGrowth => "revenue_growth",
    TotalDebt => "total_debt",
});

/// Sweepable DCF inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DcfParameter {
    /// `DcfParams::wacc`
    Wacc,
    /// `DcfParams::growth_rate`
    GrowthRate,
    /// `DcfParams::horizon`
    Horizon,
}

parameter_names!(DcfParameter {
    Wacc => "wacc",
    GrowthRate => "growth_rate",
    Horizon => "horizon",
});

/// Everything the LBO model reads.
#[derive(Debug, Clone, PartialEq)]
pub struct LboInputs {
    /// Normalised history
    pub history: FinancialHistory,
    /// Entry capital structure
    pub capital_structure: CapitalStructure,
    /// Buyout assumptions
    pub params: LboParams,
}

impl LboInputs {
    /// Run the LBO model on these inputs.
    pub fn evaluate(&self) -> ValuationResult<LboResult> {
        lbo(&self.history, &self.capital_structure, &self.params)
    }
}

impl Parameterized for LboInputs {
    type Key = LboParameter;

    fn apply(&mut self, key: LboParameter, value: f64) -> Result<(), CalculationError> {
        let p = &mut self.params;
        match key {
            LboParameter::HoldingPeriod => p.holding_period = whole_years(key.as_str(), value)?,
            LboParameter::DebtRatio => p.debt_ratio = value,
            LboParameter::InterestRate => p.interest_rate = value,
            LboParameter::FcfGrowthRate => p.fcf_growth_rate = value,
            LboParameter::DebtRepaymentPct => p.debt_repayment_pct = value,
            LboParameter::ExitMultiple => p.exit_multiple = value,
            LboParameter::ExitEbitdaGrowth => p.exit_ebitda_growth = value,
            LboParameter::TargetIrr => p.target_irr = value,
        }
        Ok(())
    }
}

/// Everything the IPO model reads.
#[derive(Debug, Clone, PartialEq)]
pub struct IpoInputs {
    /// Company figures
    pub metrics: IpoMetrics,
    /// Peer set and sector multiples
    pub peers: PeerMultiples,
    /// Offering assumptions
    pub params: IpoParams,
}

impl IpoInputs {
    /// Run the IPO model on these inputs.
    pub fn evaluate(&self) -> ValuationResult<IpoResult> {
        ipo_with(&self.metrics, &self.peers, &self.params)
    }
}

impl Parameterized for IpoInputs {
    type Key = IpoParameter;

    fn apply(&mut self, key: IpoParameter, value: f64) -> Result<(), CalculationError> {
        match key {
            IpoParameter::TargetFloat => self.params.target_float = value,
            IpoParameter::PriceRangeBuffer => self.params.price_range_buffer = value,
            IpoParameter::RevenueGrowth => self.metrics.revenue_growth = value,
            IpoParameter::TotalDebt => self.metrics.total_debt = value,
        }
        Ok(())
    }
}

/// Everything the DCF model reads.
#[derive(Debug, Clone, PartialEq)]
pub struct DcfInputs {
    /// Normalised history
    pub history: FinancialHistory,
    /// Discounting assumptions
    pub params: DcfParams,
}

impl DcfInputs {
    /// Run the DCF model on these inputs.
    pub fn evaluate(&self) -> ValuationResult<DcfResult> {
        dcf_with(&self.history, &self.params)
    }
}

impl Parameterized for DcfInputs {
    type Key = DcfParameter;

    fn apply(&mut self, key: DcfParameter, value: f64) -> Result<(), CalculationError> {
        match key {
            DcfParameter::Wacc => self.params.wacc = value,
            DcfParameter::GrowthRate => self.params.growth_rate = value,
            DcfParameter::Horizon => self.params.horizon = whole_years(key.as_str(), value)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::types::{ErrorCode, FinancialSnapshot, ValuationError};

    fn history() -> FinancialHistory {
        FinancialHistory::from_snapshots(vec![FinancialSnapshot::reported(
            "2024", 500.0, 120.0, 80.0,
        )])
        .unwrap()
    }

    #[test]
    fn test_keys_round_trip_through_names() {
        for key in LboParameter::ALL {
            assert_eq!(key.as_str().parse::<LboParameter>().unwrap(), *key);
        }
        for key in IpoParameter::ALL {
            assert_eq!(key.to_string().parse::<IpoParameter>().unwrap(), *key);
        }
        for key in DcfParameter::ALL {
            assert_eq!(key.as_str().parse::<DcfParameter>().unwrap(), *key);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "leverage".parse::<LboParameter>().unwrap_err();
        assert_eq!(err, CalculationError::UnknownParameter("leverage".to_string()));
        assert_eq!(
            ValuationError::from(err).code(),
            ErrorCode::UnknownParameter
        );
    }

    #[test]
    fn test_apply_lbo() {
        let mut inputs = LboInputs {
            history: history(),
            capital_structure: CapitalStructure::new(1000.0, 0.0, 0.0, 1.0),
            params: LboParams::default(),
        };
        inputs.apply(LboParameter::ExitMultiple, 12.0).unwrap();
        inputs.apply(LboParameter::HoldingPeriod, 7.0).unwrap();
        assert_eq!(inputs.params.exit_multiple, 12.0);
        assert_eq!(inputs.params.holding_period, 7);

        let err = inputs.apply(LboParameter::HoldingPeriod, 2.5).unwrap_err();
        assert!(matches!(err, CalculationError::InvalidParameter { .. }));
    }

    #[test]
    fn test_apply_dcf_and_evaluate() {
        let mut inputs = DcfInputs {
            history: history(),
            params: DcfParams::default(),
        };
        inputs.apply(DcfParameter::GrowthRate, 0.12).unwrap();
        assert_eq!(inputs.evaluate().unwrap_err().code(), ErrorCode::InvalidSpread);

        assert!(inputs.apply(DcfParameter::Horizon, -1.0).is_err());
    }

    #[test]
    fn test_swept_years_are_capped() {
        let mut inputs = DcfInputs {
            history: history(),
            params: DcfParams::default(),
        };
        let longest = MAX_PROJECTION_YEARS as f64;
        inputs.apply(DcfParameter::Horizon, longest).unwrap();
        assert_eq!(inputs.params.horizon, MAX_PROJECTION_YEARS);

        for years in [longest + 1.0, 1e12, f64::MAX] {
            let err = inputs.apply(DcfParameter::Horizon, years).unwrap_err();
            assert!(matches!(err, CalculationError::InvalidParameter { .. }), "{}", years);
        }
        assert_eq!(inputs.params.horizon, MAX_PROJECTION_YEARS);

        let mut lbo_inputs = LboInputs {
            history: history(),
            capital_structure: CapitalStructure::new(1000.0, 0.0, 0.0, 1.0),
            params: LboParams::default(),
        };
        assert!(lbo_inputs.apply(LboParameter::HoldingPeriod, 1e9).is_err());
        assert_eq!(lbo_inputs.params.holding_period, LboParams::default().holding_period);
    }

    #[test]
    fn test_apply_ipo() {
        let mut inputs = IpoInputs {
            metrics: IpoMetrics {
                revenue: Some(100.0),
                shares_outstanding: 10.0,
                ..Default::default()
            },
            peers: PeerMultiples::default(),
            params: IpoParams::default(),
        };
        inputs.apply(IpoParameter::PriceRangeBuffer, 0.3).unwrap();
        inputs.apply(IpoParameter::TotalDebt, 50.0).unwrap();
        let result = inputs.evaluate().unwrap();
        assert!((result.valuation.equity_value - 1450.0).abs() < 1e-9);
    }
}
