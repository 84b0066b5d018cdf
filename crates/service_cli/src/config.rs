//! Engine configuration.
//!
//! Loads model defaults, parallelism and sweep ranges from a TOML file
//! with environment variable overrides. A missing file means defaults.
//!
//! ```toml
//! log_level = "info"
//!
//! [dcf]
//! wacc = 0.10
//!
//! [parallel]
//! num_threads = 4
//!
//! [[sweep.lbo]]
//! parameter = "exit_multiple"
//! values = [8.0, 10.0, 12.0]
//! ```

use serde::Deserialize;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use valuation_core::normalizer::NormalizerConfig;
use valuation_core::types::CalculationError;
use valuation_models::{DcfParams, IpoParams, LboParams};
use valuation_risk::sensitivity::{
    dcf_preset_ranges, ipo_preset_ranges, lbo_preset_ranges, DcfParameter, IpoParameter,
    LboParameter,
};
use valuation_risk::{AnalysisSettings, ParallelConfig, ParameterRanges};

/// Log level environment override
pub const ENV_LOG_LEVEL: &str = "DEALVAL_LOG_LEVEL";

/// Worker thread count environment override
pub const ENV_THREADS: &str = "DEALVAL_THREADS";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One swept parameter.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RangeSpec {
    /// Parameter name, e.g. `exit_multiple`
    pub parameter: String,
    /// Values to try
    pub values: Vec<f64>,
}

/// Sweep ranges per model. An empty list selects the preset table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    /// LBO ranges
    pub lbo: Vec<RangeSpec>,
    /// IPO ranges
    pub ipo: Vec<RangeSpec>,
    /// DCF ranges
    pub dcf: Vec<RangeSpec>,
}

fn resolve<K>(
    specs: &[RangeSpec],
    preset: fn() -> ParameterRanges<K>,
) -> Result<ParameterRanges<K>, CalculationError>
where
    K: Copy + Eq + FromStr<Err = CalculationError>,
{
    if specs.is_empty() {
        return Ok(preset());
    }
    ParameterRanges::from_named(specs.iter().map(|s| (s.parameter.as_str(), s.values.clone())))
}

impl SweepConfig {
    /// LBO ranges, or the preset table.
    pub fn lbo_ranges(&self) -> Result<ParameterRanges<LboParameter>, CalculationError> {
        resolve(&self.lbo, lbo_preset_ranges)
    }

    /// IPO ranges, or the preset table.
    pub fn ipo_ranges(&self) -> Result<ParameterRanges<IpoParameter>, CalculationError> {
        resolve(&self.ipo, ipo_preset_ranges)
    }

    /// DCF ranges, or the preset table.
    pub fn dcf_ranges(&self) -> Result<ParameterRanges<DcfParameter>, CalculationError> {
        resolve(&self.dcf, dcf_preset_ranges)
    }

    fn validate_into(&self, errors: &mut Vec<String>) {
        for (section, ranges) in [("lbo", &self.lbo), ("ipo", &self.ipo), ("dcf", &self.dcf)] {
            for range in ranges {
                if range.values.is_empty() {
                    errors.push(format!("[sweep.{}] {} has no values", section, range.parameter));
                }
                if range.values.iter().any(|v| !v.is_finite()) {
                    errors.push(format!(
                        "[sweep.{}] {} has a non-finite value",
                        section, range.parameter
                    ));
                }
            }
        }
        push_err(errors, "sweep.lbo", self.lbo_ranges().map(drop));
        push_err(errors, "sweep.ipo", self.ipo_ranges().map(drop));
        push_err(errors, "sweep.dcf", self.dcf_ranges().map(drop));
    }
}

fn push_err<E: Display>(errors: &mut Vec<String>, section: &str, result: Result<(), E>) {
    if let Err(e) = result {
        errors.push(format!("[{}] {}", section, e));
    }
}

/// Engine configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level
    pub log_level: String,
    /// Statement normalisation
    pub normalizer: NormalizerConfig,
    /// DCF defaults
    pub dcf: DcfParams,
    /// LBO defaults
    pub lbo: LboParams,
    /// IPO defaults
    pub ipo: IpoParams,
    /// Worker threads and serial threshold
    pub parallel: ParallelConfig,
    /// Sweep ranges
    pub sweep: SweepConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            normalizer: NormalizerConfig::default(),
            dcf: DcfParams::default(),
            lbo: LboParams::default(),
            ipo: IpoParams::default(),
            parallel: ParallelConfig::default(),
            sweep: SweepConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read `path` as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path`, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `DEALVAL_LOG_LEVEL` and `DEALVAL_THREADS` when set.
    pub fn with_env_override(mut self) -> Self {
        if let Ok(log_level) = std::env::var(ENV_LOG_LEVEL) {
            self.log_level = log_level;
        }

        if let Ok(threads) = std::env::var(ENV_THREADS) {
            if let Ok(n) = threads.trim().parse() {
                self.parallel.num_threads = n;
            }
        }

        self
    }

    /// Validate the configuration, reporting every problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "[log] unknown level '{}', expected one of {:?}",
                self.log_level, VALID_LOG_LEVELS
            ));
        }

        push_err(&mut errors, "normalizer", self.normalizer.validate());
        push_err(&mut errors, "dcf", self.dcf.validate());
        push_err(&mut errors, "lbo", self.lbo.validate());
        push_err(&mut errors, "ipo", self.ipo.validate());
        self.sweep.validate_into(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from file (or defaults) with environment overrides and validate
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_or_default(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }

    /// Model settings for batch analysis
    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            normalizer: self.normalizer,
            dcf: self.dcf,
            lbo: self.lbo,
            ipo: self.ipo,
        }
    }
}

/// Failure loading or checking `dealval.toml`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(String),
    /// File is not valid configuration TOML
    #[error("Parse error: {0}")]
    Parse(String),
    /// Validation error
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn validation_errors(config: &EngineConfig) -> Vec<String> {
        match config.validate() {
            Err(ConfigError::Validation(errors)) => errors,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config_validates() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.analysis_settings(), AnalysisSettings::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            log_level = "debug"

            [dcf]
            wacc = 0.10

            [lbo]
            exit_multiple = 12.0
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_relative_eq!(config.dcf.wacc, 0.10);
        assert_relative_eq!(config.dcf.growth_rate, DcfParams::default().growth_rate);
        assert_relative_eq!(config.lbo.exit_multiple, 12.0);
        assert_relative_eq!(config.lbo.debt_ratio, LboParams::default().debt_ratio);
        assert_eq!(config.parallel, ParallelConfig::default());
    }

    #[test]
    fn test_sweep_ranges_from_toml() {
        let config = EngineConfig::from_toml(
            r#"
            [[sweep.lbo]]
            parameter = "exit_multiple"
            values = [8.0, 12.0]

            [[sweep.lbo]]
            parameter = "debt_ratio"
            values = [0.5, 0.6, 0.7]
            "#,
        )
        .unwrap();

        let lbo = config.sweep.lbo_ranges().unwrap();
        assert_eq!(lbo.keys(), vec![LboParameter::ExitMultiple, LboParameter::DebtRatio]);
        assert_eq!(lbo.cell_count(), 6);

        // unset models fall back to presets
        assert_eq!(config.sweep.ipo_ranges().unwrap().cell_count(), 25);
        assert_eq!(config.sweep.dcf_ranges().unwrap().cell_count(), 20);
    }

    #[test]
    fn test_validate_unknown_sweep_parameter() {
        let mut config = EngineConfig::default();
        config.sweep.ipo.push(RangeSpec {
            parameter: "discount".to_string(),
            values: vec![0.1],
        });

        let errors = validation_errors(&config);
        assert!(errors.iter().any(|e| e.starts_with("[sweep.ipo]") && e.contains("discount")));
    }

    #[test]
    fn test_all_problems_reported_together() {
        let mut config = EngineConfig::default();
        config.log_level = "loud".to_string();
        config.dcf.wacc = 0.02;
        config.lbo.debt_ratio = 1.5;
        config.sweep.dcf.push(RangeSpec {
            parameter: "wacc".to_string(),
            values: vec![],
        });

        let errors = validation_errors(&config);
        assert_eq!(errors.len(), 4, "{:?}", errors);
        assert!(errors[0].starts_with("[log]"));
        assert!(errors[1].starts_with("[dcf]"));
        assert!(errors[2].starts_with("[lbo]"));
        assert!(errors[3].starts_with("[sweep.dcf]"));
    }

    #[test]
    fn test_every_tracing_level_is_accepted() {
        for level in &["trace", "debug", "info", "warn", "error", "INFO"] {
            let config = EngineConfig {
                log_level: level.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "level {} rejected", level);
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parallel]\nnum_threads = 2\nparallel_threshold = 1").unwrap();

        let config = EngineConfig::load_or_default(file.path()).unwrap();
        assert_eq!(config.parallel, ParallelConfig::new(2, 1));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dcf\nwacc = ").unwrap();

        let err = EngineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_override() {
        std::env::set_var(ENV_THREADS, "3");
        std::env::set_var(ENV_LOG_LEVEL, "warn");
        let config = EngineConfig::default().with_env_override();
        std::env::remove_var(ENV_THREADS);
        std::env::remove_var(ENV_LOG_LEVEL);

        assert_eq!(config.parallel.num_threads, 3);
        assert_eq!(config.log_level, "warn");
    }
}
