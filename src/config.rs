//! Engine configuration: threshold, fast-compare and resource limits
//!
//! The settings are owned by the caller. The engine never looks for a
//! configuration file on its own; callers build an [`EngineConfig`] in code
//! or load one explicitly from TOML:
//!
//! ```toml
//! similarity_threshold = 75.0
//! fast_compare = true
//! max_alignment_cells = 10000000
//! min_highlight_tokens = 4
//! worker_threads = 8
//! ```

use crate::scoring::DEFAULT_MAX_ALIGNMENT_CELLS;
use crate::{TwinscanError, TwinscanResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Report threshold on the combined score, inclusive (0-100)
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,

    /// Skip the LCS for pairs that provably cannot reach the threshold
    #[serde(default)]
    pub fast_compare: bool,

    /// Ceiling on `tokens_a × tokens_b`; larger pairs are skipped
    #[serde(default = "default_max_cells")]
    pub max_alignment_cells: u64,

    /// Smallest number of matched tokens a highlight region may cover
    #[serde(default = "default_min_highlight_tokens")]
    pub min_highlight_tokens: usize,

    /// Worker pool size; `None` uses one worker per available core
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

fn default_threshold() -> f32 {
    70.0
}
fn default_max_cells() -> u64 {
    DEFAULT_MAX_ALIGNMENT_CELLS
}
fn default_min_highlight_tokens() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_threshold(),
            fast_compare: false,
            max_alignment_cells: default_max_cells(),
            min_highlight_tokens: default_min_highlight_tokens(),
            worker_threads: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> TwinscanResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| TwinscanError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: &Path) -> TwinscanResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_fast_compare(mut self, enabled: bool) -> Self {
        self.fast_compare = enabled;
        self
    }

    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = Some(workers);
        self
    }

    pub fn validate(&self) -> TwinscanResult<()> {
        let t = self.similarity_threshold;
        if !(0.0..=100.0).contains(&t) {
            return Err(TwinscanError::ConfigError(format!(
                "similarity_threshold must be within 0-100, got {}",
                t
            )));
        }
        if self.max_alignment_cells == 0 {
            return Err(TwinscanError::ConfigError(
                "max_alignment_cells must be positive".into(),
            ));
        }
        if self.min_highlight_tokens == 0 {
            return Err(TwinscanError::ConfigError(
                "min_highlight_tokens must be at least 1".into(),
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(TwinscanError::ConfigError(
                "worker_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
