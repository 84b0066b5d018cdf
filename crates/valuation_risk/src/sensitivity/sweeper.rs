//! Cartesian parameter sweeps.
//!
//! A sweep evaluates a model once per combination of the supplied
//! parameter values, first range outermost. Every cell carries its own
//! `Result`; a failing combination is recorded and the sweep continues.

use std::str::FromStr;

use tracing::debug;
use valuation_core::types::{CalculationError, ValuationResult};

use super::parameters::Parameterized;
use crate::parallel::{parallel_map, ParallelConfig};

/// Ordered parameter ranges.
///
/// Adding a key that is already present replaces its values in place, so
/// the iteration order of keys stays the order of first insertion.
///
/// # Examples
/// ```
/// use valuation_risk::sensitivity::{LboParameter, ParameterRanges};
///
/// let ranges = ParameterRanges::new()
///     .with(LboParameter::ExitMultiple, vec![8.0, 10.0, 12.0])
///     .with(LboParameter::InterestRate, vec![0.06, 0.08]);
/// assert_eq!(ranges.cell_count(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRanges<K> {
    ranges: Vec<(K, Vec<f64>)>,
}

impl<K> Default for ParameterRanges<K> {
    fn default() -> Self {
        Self { ranges: Vec::new() }
    }
}

impl<K: Copy + Eq> ParameterRanges<K> {
    /// Empty set of ranges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the values for `key`.
    pub fn with(mut self, key: K, values: Vec<f64>) -> Self {
        self.insert(key, values);
        self
    }

    /// Add or replace the values for `key`.
    pub fn insert(&mut self, key: K, values: Vec<f64>) {
        match self.ranges.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.ranges.push((key, values)),
        }
    }

    /// Keys in sweep order.
    pub fn keys(&self) -> Vec<K> {
        self.ranges.iter().map(|(k, _)| *k).collect()
    }

    /// Values for `key`.
    pub fn values(&self, key: K) -> Option<&[f64]> {
        self.ranges
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True when no range is set.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Product of the range cardinalities.
    pub fn cell_count(&self) -> usize {
        self.ranges.iter().map(|(_, v)| v.len()).product()
    }

    /// Iterate over `(key, values)` pairs in sweep order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &[f64])> {
        self.ranges.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Every combination, first range outermost.
    pub fn combinations(&self) -> Vec<Vec<(K, f64)>> {
        let mut combos: Vec<Vec<(K, f64)>> = vec![Vec::with_capacity(self.ranges.len())];
        for (key, values) in &self.ranges {
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for prefix in &combos {
                for &value in values {
                    let mut combo = prefix.clone();
                    combo.push((*key, value));
                    next.push(combo);
                }
            }
            combos = next;
        }
        combos
    }
}

impl<K> ParameterRanges<K>
where
    K: Copy + Eq + FromStr<Err = CalculationError>,
{
    /// Build ranges from parameter names.
    ///
    /// # Errors
    ///
    /// `CalculationError::UnknownParameter` for a name the model does not define.
    pub fn from_named<S, I>(named: I) -> Result<Self, CalculationError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, Vec<f64>)>,
    {
        let mut ranges = Self::new();
        for (name, values) in named {
            ranges.insert(name.as_ref().parse()?, values);
        }
        Ok(ranges)
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityCell<K, R> {
    /// Parameter values applied, in sweep order
    pub parameters: Vec<(K, f64)>,
    /// Model outcome
    pub result: ValuationResult<R>,
}

impl<K: Copy + Eq, R> SensitivityCell<K, R> {
    /// Value applied for `key` in this cell.
    pub fn parameter(&self, key: K) -> Option<f64> {
        self.parameters
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }
}

/// Sweep output: one cell per combination, in cartesian order.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityGrid<K, R> {
    keys: Vec<K>,
    cells: Vec<SensitivityCell<K, R>>,
}

impl<K: Copy + Eq, R> SensitivityGrid<K, R> {
    /// Swept keys, outermost first.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// All cells in cartesian order.
    pub fn cells(&self) -> &[SensitivityCell<K, R>] {
        &self.cells
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for a grid with no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells whose model run succeeded.
    pub fn successes(&self) -> impl Iterator<Item = (&[(K, f64)], &R)> {
        self.cells
            .iter()
            .filter_map(|c| c.result.as_ref().ok().map(|r| (c.parameters.as_slice(), r)))
    }

    /// Number of failed cells.
    pub fn failure_count(&self) -> usize {
        self.cells.iter().filter(|c| c.result.is_err()).count()
    }

    /// Cells whose model run failed.
    pub fn failures(&self) -> impl Iterator<Item = &SensitivityCell<K, R>> {
        self.cells.iter().filter(|c| c.result.is_err())
    }

    /// Successful cell with the largest metric. Cells where `metric`
    /// returns `None` or a non-finite value are skipped; ties keep the
    /// earliest cell.
    pub fn best_by<F>(&self, metric: F) -> Option<&SensitivityCell<K, R>>
    where
        F: Fn(&R) -> Option<f64>,
    {
        let mut best: Option<(&SensitivityCell<K, R>, f64)> = None;
        for cell in &self.cells {
            let Some(value) = cell.result.as_ref().ok().and_then(&metric) else {
                continue;
            };
            if !value.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((cell, value));
            }
        }
        best.map(|(cell, _)| cell)
    }
}

/// Evaluate `model_fn` over every combination of `ranges`.
///
/// Each cell clones `base`, applies its parameter values in order and runs
/// the model. A value the inputs reject is recorded as that cell's error.
///
/// # Examples
/// ```
/// use valuation_core::types::{CapitalStructure, FinancialHistory, FinancialSnapshot};
/// use valuation_models::lbo::LboParams;
/// use valuation_risk::parallel::ParallelConfig;
/// use valuation_risk::sensitivity::{sweep, LboInputs, LboParameter, ParameterRanges};
///
/// let base = LboInputs {
///     history: FinancialHistory::from_snapshots(vec![
///         FinancialSnapshot::reported("2024", 500.0, 120.0, 80.0),
///     ])
///     .unwrap(),
///     capital_structure: CapitalStructure::new(1000.0, 0.0, 50.0, 100.0),
///     params: LboParams::default(),
/// };
/// let ranges = ParameterRanges::new()
///     .with(LboParameter::ExitMultiple, vec![8.0, 12.0])
///     .with(LboParameter::DebtRatio, vec![0.5, 1.0]);
///
/// let grid = sweep(LboInputs::evaluate, &base, &ranges, &ParallelConfig::default());
/// assert_eq!(grid.len(), 4);
/// // debt_ratio = 1.0 leaves no equity
/// assert_eq!(grid.failure_count(), 2);
/// ```
pub fn sweep<I, R, F>(
    model_fn: F,
    base: &I,
    ranges: &ParameterRanges<I::Key>,
    config: &ParallelConfig,
) -> SensitivityGrid<I::Key, R>
where
    I: Parameterized,
    R: Send,
    F: Fn(&I) -> ValuationResult<R> + Sync + Send,
{
    let combinations = ranges.combinations();

    let results = parallel_map(&combinations, config, |combo| -> ValuationResult<R> {
        let mut inputs = base.clone();
        for &(key, value) in combo {
            inputs.apply(key, value)?;
        }
        model_fn(&inputs)
    });

    let cells: Vec<SensitivityCell<I::Key, R>> = combinations
        .into_iter()
        .zip(results)
        .map(|(parameters, result)| SensitivityCell { parameters, result })
        .collect();

    let failed = cells.iter().filter(|c| c.result.is_err()).count();
    debug!(cells = cells.len(), failed, "sensitivity sweep complete");

    SensitivityGrid {
        keys: ranges.keys(),
        cells,
    }
}
