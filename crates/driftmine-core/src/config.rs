//! Mining-loop configuration.

use serde::{Deserialize, Serialize};

/// Parameters for the windowed mining loop.
///
/// Validated once before any pane is processed; every out-of-range parameter
/// is fatal up front rather than mid-stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Transactions per pane.
    pub pane_size: usize,
    /// Minimum support for frequent items and mined itemsets.
    pub min_support: u64,
    /// Drift trigger threshold, in (0, 1].
    pub drift_threshold: f64,
    /// Initial window width in panes; the initial checkpoint tid is
    /// `pane_size * initial_window_panes`.
    pub initial_window_panes: usize,
    /// Longest itemset the miner will enumerate.
    pub max_itemset_length: usize,
    /// Optional cap on window growth: when more than this many panes
    /// accumulate without a drift trigger, the window is forcibly collapsed.
    /// `None` lets the pre-checkpoint baseline grow without bound.
    pub max_window_panes: Option<usize>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            pane_size: 5,
            min_support: 2,
            drift_threshold: 0.3,
            initial_window_panes: 1,
            max_itemset_length: 3,
            max_window_panes: None,
        }
    }
}

impl MinerConfig {
    /// Check every parameter range; called by the controller before any
    /// processing starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pane_size == 0 {
            return Err(ConfigError::PaneSize);
        }
        if self.min_support == 0 {
            return Err(ConfigError::MinSupport);
        }
        if !(self.drift_threshold > 0.0 && self.drift_threshold <= 1.0) {
            return Err(ConfigError::DriftThreshold(self.drift_threshold));
        }
        if self.initial_window_panes == 0 {
            return Err(ConfigError::InitialWindow);
        }
        if self.max_itemset_length == 0 {
            return Err(ConfigError::MaxItemsetLength);
        }
        if self.max_window_panes == Some(0) {
            return Err(ConfigError::MaxWindow);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("pane_size must be at least 1")]
    PaneSize,
    #[error("min_support must be at least 1")]
    MinSupport,
    #[error("drift_threshold must be in (0, 1], got {0}")]
    DriftThreshold(f64),
    #[error("initial_window_panes must be at least 1")]
    InitialWindow,
    #[error("max_itemset_length must be at least 1")]
    MaxItemsetLength,
    #[error("max_window_panes must be at least 1 when set")]
    MaxWindow,
}
