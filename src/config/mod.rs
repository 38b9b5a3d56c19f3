//! Configuration module for sumpipe-rs
//!
//! Holds everything an orchestrator needs to build a run:
//! - Channel capacities for each pipeline shape
//! - The square threshold
//! - The default run mode and an optional run deadline
//!
//! # Files
//!
//! A config file is TOML unless its extension is `.json`:
//!
//! ```toml
//! threshold = 100000
//! default_mode = "persistent"
//! run_timeout_ms = 5000
//!
//! [persistent]
//! input = 0
//! filtered = 0
//! squared = 0
//! results = 0
//! ```
//!
//! Missing keys fall back to their defaults.

use crate::error::{Result, ResultExt, SumPipeError};
use crate::pipeline::primitives::SQUARE_THRESHOLD;
use crate::types::RunMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default `tracing` filter for drivers that install a subscriber
pub const DEFAULT_LOG_FILTER: &str = "info,sumpipe_rs=debug";

// ==================== Channel Capacities ====================

/// Capacity of each channel in a pipeline. `0` means rendezvous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelCapacities {
    /// Feeder/orchestrator → even filter
    pub input: usize,
    /// Even filter → square threshold
    pub filtered: usize,
    /// Square threshold → accumulator
    pub squared: usize,
    /// Accumulator → orchestrator (per-value mode only)
    pub results: usize,
}

impl ChannelCapacities {
    /// Every channel is a rendezvous point.
    pub const fn rendezvous() -> Self {
        Self {
            input: 0,
            filtered: 0,
            squared: 0,
            results: 0,
        }
    }

    /// Unbuffered input, one slot on every downstream channel.
    pub const fn per_value() -> Self {
        Self {
            input: 0,
            filtered: 1,
            squared: 1,
            results: 1,
        }
    }
}

impl Default for ChannelCapacities {
    fn default() -> Self {
        Self::rendezvous()
    }
}

// ==================== Pipeline Config ====================

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Squares at or above this are filtered out
    pub threshold: i64,

    /// Mode used by [`Pipeline::run_default`](crate::pipeline::Pipeline::run_default)
    pub default_mode: RunMode,

    /// Deadline for a persistent run, in milliseconds
    pub run_timeout_ms: Option<u64>,

    /// `tracing` filter directive for drivers
    pub log_filter: String,

    /// Channel capacities for persistent runs
    pub persistent: ChannelCapacities,

    /// Channel capacities for each per-value trip
    pub per_value: ChannelCapacities,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: SQUARE_THRESHOLD,
            default_mode: RunMode::default(),
            run_timeout_ms: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            persistent: ChannelCapacities::rendezvous(),
            per_value: ChannelCapacities::per_value(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_persistent_capacities(mut self, capacities: ChannelCapacities) -> Self {
        self.persistent = capacities;
        self
    }

    pub fn with_per_value_capacities(mut self, capacities: ChannelCapacities) -> Self {
        self.per_value = capacities;
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_ms.map(Duration::from_millis)
    }

    /// Reject settings that cannot produce a meaningful run
    pub fn validate(&self) -> Result<()> {
        if self.threshold <= 0 {
            return Err(SumPipeError::Config(format!(
                "threshold must be positive, got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SumPipeError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(SumPipeError::from)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config: Self = if is_json(path) {
            serde_json::from_str(&content).map_err(|e| {
                SumPipeError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        } else {
            toml::from_str(&content).map_err(|e| {
                SumPipeError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        };

        config.validate()?;
        tracing::debug!("Loaded pipeline config from {:?}", path);
        Ok(config)
    }

    /// Load a config file, returning defaults if any error occurs
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load pipeline config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save to disk in the format implied by the extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(SumPipeError::from)
                    .context("Failed to create config directory")?;
            }
        }

        let content = if is_json(path) {
            serde_json::to_string_pretty(self)
                .map_err(|e| SumPipeError::Serialization(e.to_string()))?
        } else {
            toml::to_string_pretty(self).map_err(|e| SumPipeError::Serialization(e.to_string()))?
        };

        std::fs::write(path, content)
            .map_err(SumPipeError::from)
            .with_context(|| format!("Failed to write config file {:?}", path))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
