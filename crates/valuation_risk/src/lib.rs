//! # Valuation Risk (L3: Application)
//!
//! Sensitivity sweeps, target screening and ranking on top of the
//! valuation models.
//!
//! This crate provides:
//! - Cartesian sensitivity sweeps over LBO, IPO and DCF assumptions (`sensitivity`)
//! - Batch analysis of a candidate list through every model (`screening`)
//! - Weighted-score target ranking with qualitative labels (`ranking`)
//! - A recommended target with a supporting rationale (`recommendation`)
//! - Rayon-based parallel evaluation with a serial fallback (`parallel`)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           valuation_risk (L3)           │
//! ├─────────────────────────────────────────┤
//! │  sensitivity/   - keys, sweeps, presets │
//! │  screening      - per-company analysis  │
//! │  ranking        - scores and labels     │
//! │  recommendation - selected target       │
//! │  parallel       - Rayon utilities       │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │          valuation_models (L2)          │
//! │   DCF, LBO, IPO, comparables, synergy   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use valuation_core::types::{FinancialHistory, FinancialSnapshot, CapitalStructure};
//! use valuation_models::lbo::LboParams;
//! use valuation_risk::parallel::ParallelConfig;
//! use valuation_risk::sensitivity::{lbo_preset_ranges, sweep, LboInputs, LboParameter};
//!
//! let history = FinancialHistory::from_snapshots(vec![
//!     FinancialSnapshot::reported("2024", 1000.0, 200.0, 100.0),
//! ])
//! .unwrap();
//!
//! let base = LboInputs {
//!     history,
//!     capital_structure: CapitalStructure::new(2000.0, 0.0, 100.0, 100.0),
//!     params: LboParams::default(),
//! };
//!
//! let grid = sweep(LboInputs::evaluate, &base, &lbo_preset_ranges(), &ParallelConfig::default());
//! assert_eq!(grid.len(), 125);
//!
//! let best = grid
//!     .best_by(|r| Some(r.returns.moic))
//!     .and_then(|cell| cell.parameter(LboParameter::ExitMultiple));
//! assert_eq!(best, Some(16.0));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod parallel;
pub mod ranking;
pub mod recommendation;
pub mod screening;
pub mod sensitivity;

pub use parallel::{parallel_map, ParallelConfig};
pub use ranking::{rank, Candidate, Ranking, ScoreCard};
pub use recommendation::{recommend, Recommendation};
pub use screening::{
    analyze_companies, analyze_company, AnalysisSettings, CompanyAnalysis, CompanyInput,
};
pub use sensitivity::{sweep, ParameterRanges, SensitivityGrid};
