//! # Valuation Models (L2: Business Logic)
//!
//! Deal valuation models built on the records and solvers in
//! `valuation_core`.
//!
//! This crate provides:
//! - Discounted cash flow valuation with a Gordon growth terminal value (`dcf`)
//! - Leveraged buyout projections with cash-sweep amortisation, IRR and MOIC (`lbo`)
//! - IPO valuation from blended peer multiples with an offering price range (`ipo`)
//! - Trading multiples from a market quote (`comparables`)
//! - Rule-of-thumb synergy estimates (`synergy`)
//!
//! ## Design Principles
//!
//! - **Pure functions** over immutable inputs; no model mutates its arguments
//! - **Guards before formulas**: every precondition is checked up front and
//!   reported as a typed `ValuationError`
//! - **Parameter structs with defaults** so sweeps can vary one field at a time
//!
//! ## Usage Examples
//!
//! ```rust
//! use valuation_core::types::{CapitalStructure, FinancialHistory, FinancialSnapshot};
//! use valuation_models::{dcf::dcf, lbo::{lbo, LboParams}};
//!
//! let history = FinancialHistory::from_snapshots(vec![
//!     FinancialSnapshot::reported("2024", 500.0, 120.0, 80.0),
//! ])
//! .unwrap();
//!
//! let dcf = dcf(&history, 0.12, 0.03, 5).unwrap();
//! assert!(dcf.enterprise_value > 0.0);
//!
//! let cs = CapitalStructure::new(1000.0, 0.0, 50.0, 100.0);
//! let lbo = lbo(&history, &cs, &LboParams::default()).unwrap();
//! assert!(lbo.returns.moic > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

/// Longest projection horizon or holding period a model accepts, in years.
pub const MAX_PROJECTION_YEARS: usize = 100;

pub mod comparables;
pub mod dcf;
pub mod ipo;
pub mod lbo;
pub mod synergy;

pub use comparables::{trading_multiples, MarketQuote, TradingMultiples};
pub use dcf::{dcf, dcf_with, DcfParams, DcfResult};
pub use ipo::{ipo, ipo_with, IpoMetrics, IpoParams, IpoResult, PeSource, PeerMultiples};
pub use lbo::{lbo, lbo_with_solver, LboParams, LboResult};
pub use synergy::{estimate_synergies, SynergyEstimate};
