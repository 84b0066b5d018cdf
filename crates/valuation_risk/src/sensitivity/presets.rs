//! Preset sensitivity tables.
//!
//! Standard ranges for the buyout and offering tables that deal teams
//! review first:
//! - LBO: FCF growth x exit multiple x interest rate (125 cells)
//! - IPO: target float x price range buffer (25 cells)
//! - DCF: WACC x perpetual growth (20 cells)

use super::parameters::{DcfParameter, IpoParameter, LboParameter};
use super::sweeper::ParameterRanges;

/// FCF growth rates, 5% to 15%.
pub const LBO_FCF_GROWTH_RATES: [f64; 5] = [0.05, 0.08, 0.10, 0.12, 0.15];

/// Exit multiples, 8x to 16x.
pub const LBO_EXIT_MULTIPLES: [f64; 5] = [8.0, 10.0, 12.0, 14.0, 16.0];

/// Interest rates, 6% to 10%.
pub const LBO_INTEREST_RATES: [f64; 5] = [0.06, 0.07, 0.08, 0.09, 0.10];

/// Target floats, 15% to 35%.
pub const IPO_TARGET_FLOATS: [f64; 5] = [0.15, 0.20, 0.25, 0.30, 0.35];

/// Price range buffers, 10% to 30%.
pub const IPO_PRICE_RANGE_BUFFERS: [f64; 5] = [0.10, 0.15, 0.20, 0.25, 0.30];

/// Discount rates, 8% to 14%.
pub const DCF_WACCS: [f64; 4] = [0.08, 0.10, 0.12, 0.14];

/// Perpetual growth rates, 1% to 5%.
pub const DCF_GROWTH_RATES: [f64; 5] = [0.01, 0.02, 0.03, 0.04, 0.05];

/// FCF growth x exit multiple x interest rate.
pub fn lbo_preset_ranges() -> ParameterRanges<LboParameter> {
    ParameterRanges::new()
        .with(LboParameter::FcfGrowthRate, LBO_FCF_GROWTH_RATES.to_vec())
        .with(LboParameter::ExitMultiple, LBO_EXIT_MULTIPLES.to_vec())
        .with(LboParameter::InterestRate, LBO_INTEREST_RATES.to_vec())
}

/// Target float x price range buffer.
pub fn ipo_preset_ranges() -> ParameterRanges<IpoParameter> {
    ParameterRanges::new()
        .with(IpoParameter::TargetFloat, IPO_TARGET_FLOATS.to_vec())
        .with(IpoParameter::PriceRangeBuffer, IPO_PRICE_RANGE_BUFFERS.to_vec())
}

/// WACC x perpetual growth.
pub fn dcf_preset_ranges() -> ParameterRanges<DcfParameter> {
    ParameterRanges::new()
        .with(DcfParameter::Wacc, DCF_WACCS.to_vec())
        .with(DcfParameter::GrowthRate, DCF_GROWTH_RATES.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_sizes() {
        assert_eq!(lbo_preset_ranges().cell_count(), 125);
        assert_eq!(ipo_preset_ranges().cell_count(), 25);
        assert_eq!(dcf_preset_ranges().cell_count(), 20);
    }

    #[test]
    fn test_lbo_preset_order() {
        assert_eq!(
            lbo_preset_ranges().keys(),
            vec![
                LboParameter::FcfGrowthRate,
                LboParameter::ExitMultiple,
                LboParameter::InterestRate
            ]
        );
    }
}
