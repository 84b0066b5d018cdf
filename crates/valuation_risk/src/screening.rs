//! Per-company batch analysis.
//!
//! Each company's statements are normalised once and fed to the DCF, LBO
//! and IPO models independently. Every model outcome is kept as a
//! `Result`, so one company's missing cash flow never hides its IPO value
//! or another company's analysis. The batch is a pure aggregation into an
//! immutable `symbol -> CompanyAnalysis` map.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use valuation_core::normalizer::{normalize, NormalizerConfig};
use valuation_core::types::{
    BalanceSheet, CapitalStructure, FinancialHistory, LatestMetrics, RawStatement,
    ValuationResult,
};
use valuation_models::comparables::{trading_multiples, MarketQuote, TradingMultiples};
use valuation_models::dcf::{dcf_with, DcfParams, DcfResult};
use valuation_models::ipo::{ipo_with, IpoMetrics, IpoParams, IpoResult, PeerMultiples};
use valuation_models::lbo::{LboParams, LboResult};

use crate::parallel::{parallel_map, ParallelConfig};
use crate::ranking::Candidate;
use crate::sensitivity::{DcfInputs, IpoInputs, LboInputs};

/// Model settings shared by every company in a batch.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisSettings {
    /// Statement normalisation
    pub normalizer: NormalizerConfig,
    /// DCF assumptions
    pub dcf: DcfParams,
    /// LBO assumptions
    pub lbo: LboParams,
    /// IPO offering assumptions
    pub ipo: IpoParams,
}

/// Raw data for one company, as supplied by the data-acquisition layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanyInput {
    /// Ticker symbol
    pub symbol: String,
    /// Per-year statements, most recent first
    pub statements: Vec<RawStatement>,
    /// Entry capital structure for the buyout model
    pub capital_structure: CapitalStructure,
    /// Latest balance sheet
    #[cfg_attr(feature = "serde", serde(default))]
    pub balance_sheet: BalanceSheet,
    /// Latest headline ratios
    #[cfg_attr(feature = "serde", serde(default))]
    pub metrics: LatestMetrics,
    /// IPO figures; revenue and EBITDA default to the latest normalised year
    #[cfg_attr(feature = "serde", serde(default))]
    pub ipo: IpoMetrics,
    /// Peer set and sector multiples
    #[cfg_attr(feature = "serde", serde(default))]
    pub peers: PeerMultiples,
    /// Market quote, when listed
    #[cfg_attr(feature = "serde", serde(default))]
    pub quote: Option<MarketQuote>,
}

impl CompanyInput {
    /// Normalised statement history.
    pub fn history(&self, config: &NormalizerConfig) -> ValuationResult<FinancialHistory> {
        config.validate()?;
        normalize(&self.statements, config)
    }

    /// IPO figures with gaps filled from the statements and balance sheet.
    ///
    /// Missing revenue and EBITDA come from the latest normalised year and
    /// zero revenue growth from the trailing growth of the history. Zero
    /// shares outstanding and zero debt fall back to the capital structure
    /// and balance sheet.
    pub fn ipo_metrics(&self, history: Option<&FinancialHistory>) -> IpoMetrics {
        let mut metrics = self.ipo.clone();
        if let Some(history) = history {
            let latest = history.latest();
            metrics.revenue = metrics.revenue.or(latest.revenue);
            metrics.ebitda = metrics.ebitda.or(latest.ebitda);
            if metrics.revenue_growth == 0.0 {
                metrics.revenue_growth = history.revenue_growth().unwrap_or(0.0);
            }
        }
        if metrics.shares_outstanding == 0.0 {
            metrics.shares_outstanding = self.capital_structure.shares_outstanding();
        }
        if metrics.total_debt == 0.0 {
            metrics.total_debt = self.balance_sheet.total_debt;
        }
        metrics
    }

    /// Base inputs for an LBO sweep.
    pub fn lbo_inputs(&self, settings: &AnalysisSettings) -> ValuationResult<LboInputs> {
        Ok(LboInputs {
            history: self.history(&settings.normalizer)?,
            capital_structure: self.capital_structure,
            params: settings.lbo,
        })
    }

    /// Base inputs for a DCF sweep.
    pub fn dcf_inputs(&self, settings: &AnalysisSettings) -> ValuationResult<DcfInputs> {
        Ok(DcfInputs {
            history: self.history(&settings.normalizer)?,
            params: settings.dcf,
        })
    }

    /// Base inputs for an IPO sweep. Never fails; statement gaps only
    /// narrow the valuation basis.
    pub fn ipo_inputs(&self, settings: &AnalysisSettings) -> IpoInputs {
        let history = self.history(&settings.normalizer).ok();
        IpoInputs {
            metrics: self.ipo_metrics(history.as_ref()),
            peers: self.peers.clone(),
            params: settings.ipo,
        }
    }
}

/// All model outcomes for one company.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanyAnalysis {
    /// Ticker symbol
    pub symbol: String,
    /// Normalised history
    pub history: ValuationResult<FinancialHistory>,
    /// DCF valuation
    pub dcf: ValuationResult<DcfResult>,
    /// Buyout analysis
    pub lbo: ValuationResult<LboResult>,
    /// IPO valuation
    pub ipo: ValuationResult<IpoResult>,
    /// Trading multiples, when a quote and a history exist
    pub multiples: Option<TradingMultiples>,
    /// Latest headline ratios
    pub metrics: LatestMetrics,
    /// Latest balance sheet
    pub balance_sheet: BalanceSheet,
    /// Equity market capitalisation, when quoted
    pub market_cap: Option<f64>,
}

impl CompanyAnalysis {
    /// Ranking input for this company.
    pub fn candidate(&self) -> Candidate {
        Candidate::new(self.symbol.clone(), self.metrics, self.balance_sheet)
    }

    /// Number of failed models.
    pub fn failure_count(&self) -> usize {
        [self.dcf.is_err(), self.lbo.is_err(), self.ipo.is_err()]
            .iter()
            .filter(|failed| **failed)
            .count()
    }
}

/// Run every model for one company.
pub fn analyze_company(input: &CompanyInput, settings: &AnalysisSettings) -> CompanyAnalysis {
    let history = input.history(&settings.normalizer);

    let (dcf, lbo) = match &history {
        Ok(h) => (
            dcf_with(h, &settings.dcf),
            valuation_models::lbo::lbo(h, &input.capital_structure, &settings.lbo),
        ),
        Err(e) => (Err(e.clone()), Err(e.clone())),
    };

    let ipo = ipo_with(
        &input.ipo_metrics(history.as_ref().ok()),
        &input.peers,
        &settings.ipo,
    );

    let multiples = match (&history, &input.quote) {
        (Ok(h), Some(quote)) => Some(trading_multiples(h, quote)),
        _ => None,
    };

    let analysis = CompanyAnalysis {
        symbol: input.symbol.clone(),
        history,
        dcf,
        lbo,
        ipo,
        multiples,
        metrics: input.metrics,
        balance_sheet: input.balance_sheet,
        market_cap: input.quote.map(|q| q.market_cap),
    };

    let failures = analysis.failure_count();
    if failures > 0 {
        debug!(symbol = %analysis.symbol, failures, "company analysed with model failures");
    }
    analysis
}

/// Analyse every company, in parallel when the batch is large enough.
///
/// A symbol supplied more than once keeps its last entry.
pub fn analyze_companies(
    inputs: &[CompanyInput],
    settings: &AnalysisSettings,
    parallel: &ParallelConfig,
) -> BTreeMap<String, CompanyAnalysis> {
    let analyses = parallel_map(inputs, parallel, |input| analyze_company(input, settings));

    let mut by_symbol = BTreeMap::new();
    for analysis in analyses {
        if let Some(previous) = by_symbol.insert(analysis.symbol.clone(), analysis) {
            warn!(symbol = %previous.symbol, "duplicate company input, keeping the last entry");
        }
    }
    by_symbol
}
