//! Configuration for golden generation.
//!
//! Settings can be loaded from YAML or JSON. Every field has a default, so an
//! empty file is a valid configuration.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! generator:
//!   log_level: info
//!   default_ticks: 64
//!   missing_inputs: reject     # or treat_as_low
//!   pass_threshold: 0.98
//!
//! levels:
//!   dir: levels
//!   dry_run: false
//!
//! timing:
//!   CX74:
//!     stability_ticks: 4
//!   CX279:
//!     warmup_ticks: 3
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::grade::DEFAULT_PASS_THRESHOLD;
use crate::kernel::MissingInputPolicy;
use crate::model::TimingHints;
use crate::registry::ModelRegistry;
use crate::types::ComponentId;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Simulation and grading parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorParams {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Tick count used when a level has no input waveforms
    #[serde(default = "default_ticks")]
    pub default_ticks: usize,

    /// Handling of declared inputs without a waveform
    #[serde(default)]
    pub missing_inputs: MissingInputPolicy,

    /// Minimum accuracy for a passing grade
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ticks() -> usize {
    64
}

fn default_pass_threshold() -> f64 {
    DEFAULT_PASS_THRESHOLD
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_ticks: default_ticks(),
            missing_inputs: MissingInputPolicy::default(),
            pass_threshold: default_pass_threshold(),
        }
    }
}

/// Where level files live and whether to rewrite them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelParams {
    #[serde(default = "default_levels_dir")]
    pub dir: PathBuf,

    /// Report changes without writing files
    #[serde(default)]
    pub dry_run: bool,
}

fn default_levels_dir() -> PathBuf {
    PathBuf::from("levels")
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            dir: default_levels_dir(),
            dry_run: false,
        }
    }
}

/// Partial replacement of a component's timing hints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup_ticks: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability_ticks: Option<usize>,
}

impl TimingOverride {
    /// Applies the fields that are set on top of `base`.
    pub fn merge(&self, base: TimingHints) -> TimingHints {
        TimingHints::new(
            self.warmup_ticks.unwrap_or(base.warmup_ticks),
            self.stability_ticks.unwrap_or(base.stability_ticks),
        )
    }
}

/// Complete configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub generator: GeneratorParams,

    #[serde(default)]
    pub levels: LevelParams,

    /// Timing overrides by component identifier
    #[serde(default)]
    pub timing: BTreeMap<ComponentId, TimingOverride>,
}

impl GeneratorConfig {
    /// Creates a configuration with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        // serde_yaml reads an empty document as unit, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: GeneratorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Checks values that do not depend on the registry.
    pub fn validate(&self) -> ConfigResult<()> {
        let params = &self.generator;

        if !LOG_LEVELS.contains(&params.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level: {}",
                params.log_level
            )));
        }
        if params.default_ticks == 0 {
            return Err(ConfigError::Validation(
                "default_ticks must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&params.pass_threshold) {
            return Err(ConfigError::Validation(format!(
                "pass_threshold must be within [0, 1], got {}",
                params.pass_threshold
            )));
        }
        Ok(())
    }

    /// Applies the timing overrides to `registry`.
    ///
    /// # Errors
    /// `Validation` if an override names a component the registry lacks; no
    /// override is applied in that case.
    pub fn apply_to(&self, registry: &mut ModelRegistry) -> ConfigResult<()> {
        if let Some(id) = self.timing.keys().find(|id| !registry.contains(id)) {
            return Err(ConfigError::Validation(format!(
                "Timing override for unknown component: {id}"
            )));
        }

        for (id, timing) in &self.timing {
            if let Some(base) = registry.describe(id).map(|desc| desc.timing) {
                let merged = timing.merge(base);
                tracing::debug!(component = %id, ?merged, "timing override");
                registry.override_timing(id, merged);
            }
        }
        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating a `GeneratorConfig` programmatically.
#[derive(Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.generator.log_level = level.into();
        self
    }

    pub fn default_ticks(mut self, ticks: usize) -> Self {
        self.config.generator.default_ticks = ticks;
        self
    }

    pub fn missing_inputs(mut self, policy: MissingInputPolicy) -> Self {
        self.config.generator.missing_inputs = policy;
        self
    }

    pub fn pass_threshold(mut self, threshold: f64) -> Self {
        self.config.generator.pass_threshold = threshold;
        self
    }

    /// Sets the levels directory.
    pub fn levels_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.levels.dir = dir.into();
        self
    }

    pub fn dry_run(mut self, enable: bool) -> Self {
        self.config.levels.dry_run = enable;
        self
    }

    /// Adds a timing override for one component.
    pub fn timing(mut self, component: impl Into<ComponentId>, timing: TimingOverride) -> Self {
        self.config.timing.insert(component.into(), timing);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<GeneratorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
