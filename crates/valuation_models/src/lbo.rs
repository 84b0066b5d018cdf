//! Leveraged buyout model.
//!
//! The entry enterprise value is financed with `debt_ratio` of debt and the
//! rest as sponsor equity. Starting from the latest free cash flow, each
//! holding year grows the cash flow, sweeps `debt_repayment_pct` of it into
//! debt repayment (capped at the outstanding balance), charges interest on
//! the post-repayment balance and keeps the remainder as cash to equity.
//! At exit the grown EBITDA is capitalised at `exit_multiple` and the
//! residual debt is settled.
//!
//! The IRR is solved over
//! `[-equity, after_service_1, ..., after_service_n, exit_equity]`. A
//! non-converging IRR is reported on the result rather than failing it.

use tracing::debug;
use valuation_core::math::irr::IrrSolver;
use valuation_core::types::{
    CalculationError, CapitalStructure, ConvergenceError, DataError, FinancialHistory,
    ValuationResult,
};

use crate::MAX_PROJECTION_YEARS;

/// Buyout assumptions.
///
/// Defaults: five-year hold, 70% debt at 8%, 10% FCF growth, 30% cash
/// sweep, 10x exit on EBITDA grown 8% a year, 20% target IRR.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LboParams {
    /// Years between entry and exit
    pub holding_period: usize,
    /// Share of enterprise value financed with debt, in `[0, 1]`
    pub debt_ratio: f64,
    /// Annual interest rate on outstanding debt
    pub interest_rate: f64,
    /// Annual free cash flow growth
    pub fcf_growth_rate: f64,
    /// Share of each year's cash flow swept into repayment, in `[0, 1]`
    pub debt_repayment_pct: f64,
    /// Exit EV/EBITDA multiple
    pub exit_multiple: f64,
    /// Annual EBITDA growth up to exit
    pub exit_ebitda_growth: f64,
    /// Hurdle rate for `meets_target_irr`
    pub target_irr: f64,
    /// Floor each year's cash after debt service at minus the entry cash balance
    pub floor_at_available_cash: bool,
}

impl Default for LboParams {
    fn default() -> Self {
        Self {
            holding_period: 5,
            debt_ratio: 0.7,
            interest_rate: 0.08,
            fcf_growth_rate: 0.10,
            debt_repayment_pct: 0.30,
            exit_multiple: 10.0,
            exit_ebitda_growth: 0.08,
            target_irr: 0.20,
            floor_at_available_cash: false,
        }
    }
}

impl LboParams {
    /// Check the assumptions before any projection runs.
    pub fn validate(&self) -> Result<(), CalculationError> {
        if self.holding_period == 0 || self.holding_period > MAX_PROJECTION_YEARS {
            return Err(CalculationError::invalid_parameter(
                "holding_period",
                format!(
                    "must be between 1 and {} years, got {}",
                    MAX_PROJECTION_YEARS, self.holding_period
                ),
            ));
        }
        check_fraction("debt_ratio", self.debt_ratio)?;
        check_fraction("debt_repayment_pct", self.debt_repayment_pct)?;

        let rates = [
            ("interest_rate", self.interest_rate),
            ("fcf_growth_rate", self.fcf_growth_rate),
            ("exit_multiple", self.exit_multiple),
            ("exit_ebitda_growth", self.exit_ebitda_growth),
            ("target_irr", self.target_irr),
        ];
        for (name, value) in rates {
            if !value.is_finite() {
                return Err(CalculationError::invalid_parameter(name, "must be finite"));
            }
        }
        Ok(())
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), CalculationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CalculationError::invalid_parameter(
            name,
            format!("must lie in [0, 1], got {}", value),
        ));
    }
    Ok(())
}

/// Entry financing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PurchasePrice {
    /// Entry enterprise value
    pub enterprise_value: f64,
    /// Sponsor equity cheque
    pub equity_contribution: f64,
    /// Acquisition debt raised
    pub debt_financing: f64,
    /// Debt share of the purchase price
    pub debt_ratio: f64,
}

/// One holding year of the debt schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LboYear {
    /// 1-based holding year
    pub year: usize,
    /// Grown free cash flow before debt service
    pub free_cash_flow: f64,
    /// Debt repaid this year; negative when a cash shortfall draws debt
    pub debt_repayment: f64,
    /// Interest on the post-repayment balance
    pub interest_expense: f64,
    /// Debt outstanding at year end
    pub remaining_debt: f64,
    /// Cash to equity after interest and repayment
    pub fcf_after_debt_service: f64,
}

/// Holding-period projections.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LboProjections {
    /// Year-by-year debt schedule
    pub schedule: Vec<LboYear>,
    /// Cash to equity per year
    pub projected_fcf_after_debt_service: Vec<f64>,
    /// Debt outstanding at exit
    pub remaining_debt: f64,
    /// EBITDA in the exit year
    pub exit_ebitda: f64,
    /// Exit enterprise value
    pub exit_value: f64,
}

/// Sponsor returns.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LboReturns {
    /// Internal rate of return, when the solver converged
    pub irr: Option<f64>,
    /// Why the IRR is missing
    pub irr_error: Option<ConvergenceError>,
    /// Multiple on invested capital, `exit_equity / equity_contribution`
    pub moic: f64,
    /// Equity value at exit
    pub exit_equity: f64,
    /// Whether the IRR clears the target; `None` without an IRR
    pub meets_target_irr: Option<bool>,
}

/// Full buyout analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LboResult {
    /// Entry financing
    pub purchase_price: PurchasePrice,
    /// Debt schedule and exit
    pub projections: LboProjections,
    /// IRR and MOIC
    pub returns: LboReturns,
    /// Cash-flow stream the IRR was solved on
    pub cash_flows: Vec<f64>,
}

/// Run the buyout model with the default IRR solver.
///
/// # Examples
/// ```
/// use valuation_core::types::{CapitalStructure, FinancialHistory, FinancialSnapshot};
/// use valuation_models::lbo::{lbo, LboParams};
///
/// let history = FinancialHistory::from_snapshots(vec![
///     FinancialSnapshot::reported("2024", 500.0, 120.0, 80.0),
/// ])
/// .unwrap();
/// let cs = CapitalStructure::new(1000.0, 0.0, 50.0, 100.0);
///
/// let result = lbo(&history, &cs, &LboParams::default()).unwrap();
/// assert!((result.purchase_price.equity_contribution - 300.0).abs() < 1e-9);
/// assert!((result.purchase_price.debt_financing - 700.0).abs() < 1e-9);
/// assert!(result.returns.irr.is_some());
/// ```
///
/// # Errors
///
/// See [`lbo_with_solver`].
pub fn lbo(
    history: &FinancialHistory,
    capital_structure: &CapitalStructure,
    params: &LboParams,
) -> ValuationResult<LboResult> {
    lbo_with_solver(history, capital_structure, params, &IrrSolver::with_defaults())
}

/// Run the buyout model with a caller-supplied IRR solver.
///
/// # Errors
///
/// - `CalculationError::InvalidParameter` for invalid assumptions or a
///   non-finite capital structure
/// - `DataError::NoCashFlow` when the latest year has no free cash flow
/// - `DataError::MissingField` when the latest year has no EBITDA
/// - `CalculationError::ZeroEquity` when the equity contribution is zero
pub fn lbo_with_solver(
    history: &FinancialHistory,
    capital_structure: &CapitalStructure,
    params: &LboParams,
    solver: &IrrSolver,
) -> ValuationResult<LboResult> {
    params.validate()?;
    if !capital_structure.is_finite() {
        return Err(CalculationError::invalid_parameter(
            "capital_structure",
            format!(
                "must be finite, got enterprise value {} and cash {}",
                capital_structure.enterprise_value(),
                capital_structure.cash()
            ),
        )
        .into());
    }

    let latest = history.latest();
    let fcf = latest.free_cash_flow.ok_or_else(|| {
        DataError::NoCashFlow(format!("latest fiscal year {} has no free cash flow", latest.date))
    })?;
    let ebitda = latest.ebitda.ok_or_else(|| DataError::MissingField {
        field: "ebitda".to_string(),
    })?;

    let financing = capital_structure.with_debt_ratio(params.debt_ratio);
    let equity = financing.equity();
    if equity == 0.0 {
        return Err(CalculationError::ZeroEquity.into());
    }

    let cash_floor = -capital_structure.cash();
    let growth = 1.0 + params.fcf_growth_rate;

    let mut remaining_debt = financing.debt();
    let mut schedule = Vec::with_capacity(params.holding_period);
    for year in 0..params.holding_period {
        let grown_fcf = fcf * growth.powi(year as i32);
        let debt_repayment = (grown_fcf * params.debt_repayment_pct).min(remaining_debt);
        remaining_debt -= debt_repayment;
        let interest_expense = remaining_debt * params.interest_rate;

        let mut after_service = grown_fcf - interest_expense - debt_repayment;
        if params.floor_at_available_cash {
            after_service = after_service.max(cash_floor);
        }

        schedule.push(LboYear {
            year: year + 1,
            free_cash_flow: grown_fcf,
            debt_repayment,
            interest_expense,
            remaining_debt,
            fcf_after_debt_service: after_service,
        });
    }

    let exit_growth = (1.0 + params.exit_ebitda_growth).powi(params.holding_period as i32);
    let exit_ebitda = ebitda * exit_growth;
    let exit_value = exit_ebitda * params.exit_multiple;
    let exit_equity = exit_value - remaining_debt;

    let projected: Vec<f64> = schedule.iter().map(|y| y.fcf_after_debt_service).collect();

    let mut cash_flows = Vec::with_capacity(projected.len() + 2);
    cash_flows.push(-equity);
    cash_flows.extend_from_slice(&projected);
    cash_flows.push(exit_equity);

    let (irr, irr_error) = match solver.solve(&cash_flows) {
        Ok(rate) => (Some(rate), None),
        Err(e) => {
            debug!(error = %e, equity, exit_equity, "LBO IRR unavailable");
            (None, Some(e))
        }
    };

    Ok(LboResult {
        purchase_price: PurchasePrice {
            enterprise_value: financing.enterprise_value(),
            equity_contribution: equity,
            debt_financing: financing.debt(),
            debt_ratio: params.debt_ratio,
        },
        projections: LboProjections {
            schedule,
            projected_fcf_after_debt_service: projected,
            remaining_debt,
            exit_ebitda,
            exit_value,
        },
        returns: LboReturns {
            irr,
            irr_error,
            moic: exit_equity / equity,
            exit_equity,
            meets_target_irr: irr.map(|r| r >= params.target_irr),
        },
        cash_flows,
    })
}
