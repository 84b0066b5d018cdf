//! Fan-out of independent valuations over Rayon.
//!
//! Sweep cells and per-company analyses are independent, so both fan out
//! over a Rayon pool. Small inputs run serially; the cutover is
//! [`ParallelConfig::parallel_threshold`].

use rayon::prelude::*;
use tracing::warn;

/// Minimum item count before work is spread across threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

/// Thread count and serial cutover for sweeps and batch analyses.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParallelConfig {
    /// Worker threads; 0 means one per available core
    pub num_threads: usize,
    /// Item count at which work leaves the calling thread
    pub parallel_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ParallelConfig {
    /// Explicit thread count and cutover.
    pub fn new(num_threads: usize, parallel_threshold: usize) -> Self {
        Self {
            num_threads,
            parallel_threshold,
        }
    }

    /// Configuration that always runs on the calling thread.
    pub fn serial() -> Self {
        Self::new(1, usize::MAX)
    }

    /// Thread count after resolving 0 to the number of cores.
    pub fn effective_threads(&self) -> usize {
        if self.num_threads == 0 {
            num_cpus::get()
        } else {
            self.num_threads
        }
    }

    /// True when `len` items should be spread across threads.
    #[inline]
    pub fn fans_out(&self, len: usize) -> bool {
        len >= self.parallel_threshold && self.effective_threads() > 1
    }
}

/// Maps each item through `mapper`, in parallel when the configuration
/// allows it. Output order always matches input order.
///
/// # Example
///
/// ```
/// use valuation_risk::parallel::{parallel_map, ParallelConfig};
///
/// let items: Vec<u32> = (0..100).collect();
/// let squares = parallel_map(&items, &ParallelConfig::new(4, 10), |x| x * x);
/// assert_eq!(squares[9], 81);
/// ```
pub fn parallel_map<T, R, F>(items: &[T], config: &ParallelConfig, mapper: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if !config.fans_out(items.len()) {
        return items.iter().map(mapper).collect();
    }

    if config.num_threads == 0 {
        return items.par_iter().map(mapper).collect();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build()
    {
        Ok(pool) => pool.install(|| items.par_iter().map(&mapper).collect()),
        Err(e) => {
            warn!(error = %e, "thread pool unavailable, using the global pool");
            items.par_iter().map(mapper).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_map_preserves_order() {
        let items: Vec<i32> = (0..1000).collect();
        let doubled = parallel_map(&items, &ParallelConfig::new(4, 1), |&x| x * 2);

        assert_eq!(doubled.len(), 1000);
        assert!(doubled.iter().enumerate().all(|(i, &v)| v == 2 * i as i32));
    }

    #[test]
    fn test_serial_below_threshold() {
        let items = vec![1, 2, 3];
        let config = ParallelConfig::new(4, 10);
        assert!(!config.fans_out(items.len()));
        assert_eq!(parallel_map(&items, &config, |&x| x + 1), vec![2, 3, 4]);
    }

    #[test]
    fn test_global_pool_path() {
        let items: Vec<u64> = (0..64).collect();
        let out = parallel_map(&items, &ParallelConfig::new(0, 1), |&x| x * x);
        assert_eq!(out[63], 63 * 63);
    }

    #[test]
    fn test_default_uses_every_core() {
        let config = ParallelConfig::default();
        assert_eq!(config.num_threads, 0);
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        assert!(config.effective_threads() >= 1);
    }

    #[test]
    fn test_single_thread_never_parallelizes() {
        let config = ParallelConfig::new(1, 0);
        assert!(!config.fans_out(1_000_000));
        assert!(!ParallelConfig::serial().fans_out(1_000_000));
    }
}
