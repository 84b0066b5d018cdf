//! Sensitivity analysis over the valuation models.
//!
//! This module provides:
//! - `parameters`: Typed parameter keys and the model input bundles they vary
//! - `sweeper`: Cartesian sweeps with per-cell results
//! - `presets`: Standard LBO, IPO and DCF sensitivity tables
//!
//! # Example
//!
//! ```
//! use valuation_models::ipo::{IpoMetrics, IpoParams, PeerMultiples};
//! use valuation_risk::parallel::ParallelConfig;
//! use valuation_risk::sensitivity::{ipo_preset_ranges, sweep, IpoInputs};
//!
//! let base = IpoInputs {
//!     metrics: IpoMetrics {
//!         revenue: Some(200.0),
//!         ebitda: Some(40.0),
//!         total_debt: 100.0,
//!         shares_outstanding: 50.0,
//!         ..Default::default()
//!     },
//!     peers: PeerMultiples::default(),
//!     params: IpoParams::default(),
//! };
//!
//! let grid = sweep(IpoInputs::evaluate, &base, &ipo_preset_ranges(), &ParallelConfig::default());
//! assert_eq!(grid.len(), 25);
//! assert_eq!(grid.failure_count(), 0);
//! ```

pub mod parameters;
pub mod presets;
pub mod sweeper;

pub use parameters::{
    DcfInputs, DcfParameter, IpoInputs, IpoParameter, LboInputs, LboParameter, Parameterized,
};
pub use presets::{dcf_preset_ranges, ipo_preset_ranges, lbo_preset_ranges};
pub use sweeper::{sweep, ParameterRanges, SensitivityCell, SensitivityGrid};
