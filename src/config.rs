//! Search configuration for the two searchers.
//!
//! Defaults live in [`crate::constants`]; the CLI builds these structs from
//! its flags and calls `validate()` before any search runs.

use std::time::Duration;

use crate::constants::{DEFAULT_DEPTH, DEFAULT_EXPLORATION, DEFAULT_TIMEOUT_SECS};

/// Errors raised for out-of-range configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("search depth must be >= 1")]
    ZeroDepth,
    #[error("iteration budget must be >= 1")]
    ZeroIterations,
    #[error("timeout must be a positive, finite number of seconds (got {0})")]
    InvalidTimeout(f64),
    #[error("exploration constant must be positive and finite (got {0})")]
    InvalidExploration(f64),
}

/// Alpha-beta settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimaxConfig {
    /// Plies searched below the current position.
    pub depth: u32,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        Self { depth: DEFAULT_DEPTH }
    }
}

impl MinimaxConfig {
    pub fn with_depth(depth: u32) -> Self {
        Self { depth }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}

/// How long one MCTS run may continue. Exactly one bound applies per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBudget {
    /// Run exactly this many select/simulate/backpropagate iterations.
    Iterations(u32),
    /// Keep iterating until this much wall-clock time has passed. The clock
    /// is only checked between iterations.
    Timeout(Duration),
}

impl SearchBudget {
    /// Build a timeout budget from seconds, rejecting zero, negative and
    /// non-finite values.
    pub fn from_secs(secs: f64) -> Result<Self, ConfigError> {
        if secs.is_nan() || secs <= 0.0 {
            return Err(ConfigError::InvalidTimeout(secs));
        }
        Duration::try_from_secs_f64(secs)
            .map(SearchBudget::Timeout)
            .map_err(|_| ConfigError::InvalidTimeout(secs))
    }
}

/// MCTS settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MctsConfig {
    pub budget: SearchBudget,
    /// UCT exploration constant `C`.
    pub exploration: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            budget: SearchBudget::Timeout(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS)),
            exploration: DEFAULT_EXPLORATION,
        }
    }
}

impl MctsConfig {
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            budget: SearchBudget::Iterations(iterations),
            ..Self::default()
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            budget: SearchBudget::Timeout(timeout),
            ..Self::default()
        }
    }

    pub fn exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.budget {
            SearchBudget::Iterations(0) => return Err(ConfigError::ZeroIterations),
            SearchBudget::Timeout(limit) if limit.is_zero() => {
                return Err(ConfigError::InvalidTimeout(0.0));
            }
            _ => {}
        }
        if !(self.exploration.is_finite() && self.exploration > 0.0) {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        Ok(())
    }
}
