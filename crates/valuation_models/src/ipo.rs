//! IPO valuation from peer trading multiples.
//!
//! Two enterprise values are derived from the company's latest figures:
//!
//! - revenue times a sector P/E proxy
//! - EBITDA times a fixed 10x multiple
//!
//! High-growth companies (trailing revenue growth above 30%) weight the
//! revenue multiple 70/30; mature companies weight the EBITDA multiple
//! 70/30. The equity value per share sets the base offering price and a
//! symmetric buffer sets the range.

use std::collections::BTreeMap;
use valuation_core::types::{CalculationError, DataError, ValuationResult};

/// P/E used when neither a sector multiple nor a trailing P/E exists.
pub const DEFAULT_SECTOR_PE: f64 = 15.0;

/// Fixed EV/EBITDA multiple.
pub const EBITDA_MULTIPLE: f64 = 10.0;

/// Revenue growth above which the revenue multiple dominates the blend.
pub const HIGH_GROWTH_THRESHOLD: f64 = 0.30;

/// Default share of outstanding shares offered.
pub const DEFAULT_TARGET_FLOAT: f64 = 0.20;

/// Default half-width of the offering price range.
pub const DEFAULT_PRICE_RANGE_BUFFER: f64 = 0.15;

/// Latest figures for the company being floated.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IpoMetrics {
    /// Sector name used to look up the peer P/E
    pub sector: Option<String>,
    /// Latest revenue
    pub revenue: Option<f64>,
    /// Latest EBITDA
    pub ebitda: Option<f64>,
    /// Company's own trailing P/E
    pub trailing_pe: Option<f64>,
    /// Trailing revenue growth, as a fraction
    pub revenue_growth: f64,
    /// Trailing EBIT growth, reported alongside the comparables
    pub ebit_growth: Option<f64>,
    /// Total debt deducted from enterprise value
    pub total_debt: f64,
    /// Shares outstanding
    pub shares_outstanding: f64,
}

/// Peer set and sector multiples.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PeerMultiples {
    /// Peer ticker symbols
    pub peer_companies: Vec<String>,
    /// Sector name to P/E multiple
    pub sector_multiples: BTreeMap<String, f64>,
}

/// Where the sector P/E proxy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PeSource {
    /// Peer table entry for the company's sector
    Sector,
    /// Company's own trailing P/E
    Trailing,
    /// Fixed fallback of 15x
    Default,
}

/// How the enterprise value was formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IpoMethod {
    /// 70% revenue multiple, 30% EBITDA multiple
    GrowthBlend,
    /// 30% revenue multiple, 70% EBITDA multiple
    MatureBlend,
    /// Revenue multiple only
    RevenueMultiple,
    /// EBITDA multiple only
    EbitdaMultiple,
}

/// Offering assumptions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IpoParams {
    /// Share of outstanding shares offered, in `[0, 1]`
    pub target_float: f64,
    /// Relative half-width of the price range, non-negative
    pub price_range_buffer: f64,
}

impl Default for IpoParams {
    fn default() -> Self {
        Self {
            target_float: DEFAULT_TARGET_FLOAT,
            price_range_buffer: DEFAULT_PRICE_RANGE_BUFFER,
        }
    }
}

impl IpoParams {
    /// Check the offering assumptions.
    pub fn validate(&self) -> Result<(), CalculationError> {
        if !(0.0..=1.0).contains(&self.target_float) {
            return Err(CalculationError::invalid_parameter(
                "target_float",
                format!("must lie in [0, 1], got {}", self.target_float),
            ));
        }
        if !self.price_range_buffer.is_finite() || self.price_range_buffer < 0.0 {
            return Err(CalculationError::invalid_parameter(
                "price_range_buffer",
                format!("must be non-negative, got {}", self.price_range_buffer),
            ));
        }
        Ok(())
    }
}

/// Enterprise and equity value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IpoValuation {
    /// Blended enterprise value
    pub enterprise_value: f64,
    /// Enterprise value less total debt
    pub equity_value: f64,
    /// Implied EV/Revenue, when revenue is non-zero
    pub ev_revenue_multiple: Option<f64>,
    /// Implied EV/EBITDA, when EBITDA is non-zero
    pub ev_ebitda_multiple: Option<f64>,
    /// Blend used
    pub method: IpoMethod,
}

/// Offering size and price range.
///
/// `price_low <= price_base <= price_high`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IpoOffering {
    /// Shares outstanding
    pub shares_outstanding: f64,
    /// Shares offered
    pub float_shares: f64,
    /// Bottom of the range
    pub price_low: f64,
    /// Equity value per share
    pub price_base: f64,
    /// Top of the range
    pub price_high: f64,
}

/// Comparable-company context.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IpoComparables {
    /// P/E proxy applied to revenue
    pub sector_pe: f64,
    /// Origin of `sector_pe`
    pub pe_source: PeSource,
    /// True when no sector multiple was available
    pub sector_pe_is_default: bool,
    /// Peer ticker symbols
    pub peer_companies: Vec<String>,
    /// Trailing revenue growth
    pub revenue_growth: f64,
    /// Trailing EBIT growth
    pub ebit_growth: Option<f64>,
}

/// Full IPO valuation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IpoResult {
    /// Enterprise and equity value
    pub valuation: IpoValuation,
    /// Offering size and price range
    pub offering: IpoOffering,
    /// Comparable-company context
    pub comparables: IpoComparables,
}

/// Present, finite and non-zero.
fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Sector P/E from the peer table, the trailing P/E, or the fixed default.
pub fn sector_pe(metrics: &IpoMetrics, peers: &PeerMultiples) -> (f64, PeSource) {
    let from_sector = metrics
        .sector
        .as_ref()
        .and_then(|sector| peers.sector_multiples.get(sector).copied());

    if let Some(pe) = usable(from_sector) {
        (pe, PeSource::Sector)
    } else if let Some(pe) = usable(metrics.trailing_pe) {
        (pe, PeSource::Trailing)
    } else {
        (DEFAULT_SECTOR_PE, PeSource::Default)
    }
}

/// IPO valuation with explicit offering assumptions.
///
/// # Examples
/// ```
/// use valuation_models::ipo::{ipo, IpoMetrics, PeSource, PeerMultiples};
///
/// let metrics = IpoMetrics {
///     revenue: Some(200.0),
///     ebitda: Some(40.0),
///     revenue_growth: 0.1,
///     total_debt: 100.0,
///     shares_outstanding: 50.0,
///     ..Default::default()
/// };
/// let result = ipo(&metrics, &PeerMultiples::default(), 0.2, 0.15).unwrap();
///
/// assert_eq!(result.comparables.pe_source, PeSource::Default);
/// assert!(result.comparables.sector_pe_is_default);
/// assert!(result.offering.price_low <= result.offering.price_high);
/// ```
///
/// # Errors
///
/// See [`ipo_with`].
pub fn ipo(
    metrics: &IpoMetrics,
    peers: &PeerMultiples,
    target_float: f64,
    price_range_buffer: f64,
) -> ValuationResult<IpoResult> {
    ipo_with(
        metrics,
        peers,
        &IpoParams {
            target_float,
            price_range_buffer,
        },
    )
}

/// IPO valuation from an assumption set.
///
/// # Errors
///
/// - `CalculationError::InvalidParameter` for a negative buffer or a float
///   outside `[0, 1]`
/// - `CalculationError::DivisionByZero` when shares outstanding is zero
/// - `DataError::NoValuationBasis` when neither revenue nor EBITDA is usable
pub fn ipo_with(
    metrics: &IpoMetrics,
    peers: &PeerMultiples,
    params: &IpoParams,
) -> ValuationResult<IpoResult> {
    params.validate()?;

    let shares = metrics.shares_outstanding;
    if shares == 0.0 {
        return Err(
            CalculationError::DivisionByZero("shares outstanding is zero".to_string()).into(),
        );
    }
    if !shares.is_finite() {
        return Err(
            CalculationError::invalid_parameter("shares_outstanding", "must be finite").into(),
        );
    }

    let (pe, pe_source) = sector_pe(metrics, peers);
    let revenue = usable(metrics.revenue);
    let ebitda = usable(metrics.ebitda);

    let ev_revenue = revenue.map(|r| r * pe);
    let ev_ebitda = ebitda.map(|e| e * EBITDA_MULTIPLE);

    let (enterprise_value, method) = match (ev_revenue, ev_ebitda) {
        (Some(by_revenue), Some(by_ebitda)) => {
            if metrics.revenue_growth > HIGH_GROWTH_THRESHOLD {
                (0.7 * by_revenue + 0.3 * by_ebitda, IpoMethod::GrowthBlend)
            } else {
                (0.3 * by_revenue + 0.7 * by_ebitda, IpoMethod::MatureBlend)
            }
        }
        (Some(by_revenue), None) => (by_revenue, IpoMethod::RevenueMultiple),
        (None, Some(by_ebitda)) => (by_ebitda, IpoMethod::EbitdaMultiple),
        (None, None) => {
            return Err(DataError::NoValuationBasis(
                "neither revenue nor EBITDA is available".to_string(),
            )
            .into())
        }
    };

    let equity_value = enterprise_value - metrics.total_debt;
    let price_base = equity_value / shares;
    let half_width = price_base.abs() * params.price_range_buffer;

    Ok(IpoResult {
        valuation: IpoValuation {
            enterprise_value,
            equity_value,
            ev_revenue_multiple: revenue.map(|_| pe),
            ev_ebitda_multiple: ebitda.map(|_| EBITDA_MULTIPLE),
            method,
        },
        offering: IpoOffering {
            shares_outstanding: shares,
            float_shares: shares * params.target_float,
            price_low: price_base - half_width,
            price_base,
            price_high: price_base + half_width,
        },
        comparables: IpoComparables {
            sector_pe: pe,
            pe_source,
            sector_pe_is_default: pe_source != PeSource::Sector,
            peer_companies: peers.peer_companies.clone(),
            revenue_growth: metrics.revenue_growth,
            ebit_growth: metrics.ebit_growth,
        },
    })
}
