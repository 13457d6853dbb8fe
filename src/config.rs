use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::deadlock::{DetectorKind, EliminationMode};

/// Simulation configuration as read from YAML
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub deadlock: DeadlockConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        // Validate general settings
        if self.general.steps == 0 {
            return Err(ValidationError::InvalidGeneral(
                "steps must be greater than zero".to_string(),
            ));
        }
        if let Some(level) = &self.general.log_level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ValidationError::InvalidGeneral(format!(
                    "unknown log_level '{}', expected one of {:?}",
                    level, LOG_LEVELS
                )));
            }
        }

        // Validate system shape
        if self.system.processes == 0 {
            return Err(ValidationError::InvalidSystem(
                "processes must be greater than zero".to_string(),
            ));
        }
        if self.system.available.is_empty() {
            return Err(ValidationError::InvalidSystem(
                "available must list at least one resource type".to_string(),
            ));
        }

        // Validate policy
        let probability = self.policy.request_probability;
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(ValidationError::InvalidPolicy(format!(
                "request_probability must be within [0, 1], got {}",
                probability
            )));
        }

        Ok(())
    }

    /// Number of resource types, derived from the initial available vector
    pub fn num_resources(&self) -> usize {
        self.system.available.len()
    }
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Run-wide settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    pub steps: u64,
    /// Fixed RNG seed; fresh entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Pause between steps, e.g. "500ms"
    #[serde(with = "humantime_serde")]
    pub step_delay: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Shape of the simulated system
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SystemConfig {
    pub processes: usize,
    /// Initial free units per resource type
    pub available: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DeadlockConfig {
    pub detector: DetectorKind,
    pub elimination: EliminationMode,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PolicyConfig {
    /// Chance that a process requests rather than releases
    pub request_probability: f64,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid system configuration: {0}")]
    InvalidSystem(String),
    #[error("Invalid policy configuration: {0}")]
    InvalidPolicy(String),
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            steps: 10,
            seed: None,
            step_delay: Duration::ZERO,
            log_level: Some("info".to_string()),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            processes: 5,
            available: vec![3, 3, 2],
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            request_probability: 0.5,
        }
    }
}
