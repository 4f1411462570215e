// ABOUTME: Auto-regulation configuration tree with environment overrides and validation
// ABOUTME: Every tunable the algorithms read lives here; nothing is hard-coded in the engines
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Auto-Regulation Configuration Module
//!
//! Configuration is organized into domain-specific modules:
//! - `fatigue` - Feedback weights, aggregation window, trend and deload thresholds
//! - `progression` - Recovery floor, volume steps, deload factor, block length
//! - `distribution` - Method fatigue coefficients, phase multipliers, derating
//!
//! Concurrency settings for the weekly commit sit directly on the root type.

pub mod distribution;
pub mod error;
pub mod fatigue;
pub mod progression;

pub use distribution::{DistributionTuning, MethodCoefficients, PhaseMultipliers};
pub use error::ConfigError;
pub use fatigue::{FatigueConfig, FatigueWeights};
pub use progression::{ProgressionConfig, DELOAD_FACTOR_MAX, DELOAD_FACTOR_MIN};

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stimulus_core::constants::{fatigue as fatigue_scale, scales};

/// Tolerance when comparing the weight sum to the normalization constant
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Optimistic-concurrency retry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Attempts before a version conflict is surfaced to the caller
    pub max_update_attempts: u32,
    /// Backoff before the first retry, doubled on each further retry
    pub base_backoff_ms: u64,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_update_attempts: 3,
            base_backoff_ms: 10,
        }
    }
}

/// Root configuration for all auto-regulation algorithms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoRegulationConfig {
    /// Fatigue aggregation
    pub fatigue: FatigueConfig,
    /// Weekly progression
    pub progression: ProgressionConfig,
    /// Special-method distribution
    pub distribution: DistributionTuning,
    /// Weekly commit retry
    pub concurrency: ConcurrencyConfig,
}

impl AutoRegulationConfig {
    /// Load configuration from defaults plus `STIMULUS_*` environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.float_tunables().iter().all(|value| value.is_finite()) {
            return Err(ConfigError::ValueOutOfRange(
                "fractional tunables must be finite numbers",
            ));
        }
        self.validate_fatigue()?;
        self.validate_progression()?;
        self.validate_distribution()?;

        if self.concurrency.max_update_attempts == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "max_update_attempts must be at least 1",
            ));
        }
        Ok(())
    }

    fn float_tunables(&self) -> [f64; 19] {
        let f = &self.fatigue;
        let w = &f.weights;
        let c = &self.distribution.fatigue_coefficients;
        let p = &self.distribution.phase_multipliers;
        [
            w.soreness,
            w.energy,
            w.sleep,
            w.effort,
            w.pump,
            f.normalization_constant,
            f.deload_threshold,
            f.neutral_fatigue,
            f.trend_delta,
            self.progression.deload_factor,
            self.progression.smoothing_factor,
            c.myo_rep_match,
            c.myo_rep_no_match,
            c.drop_set,
            c.superset,
            c.giant_set,
            p.accumulation,
            p.intensification,
            p.deload,
        ]
    }

    fn validate_fatigue(&self) -> Result<(), ConfigError> {
        let fatigue = &self.fatigue;
        let w = &fatigue.weights;
        if [w.soreness, w.energy, w.sleep, w.effort, w.pump]
            .iter()
            .any(|weight| *weight < 0.0)
        {
            return Err(ConfigError::InvalidWeights("fatigue weights must be non-negative"));
        }
        if fatigue.normalization_constant <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "normalization_constant must be positive",
            ));
        }
        if (w.sum() - fatigue.normalization_constant).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeights(
                "fatigue weights must sum to the normalization constant",
            ));
        }
        if fatigue.window_days == 0 || fatigue.max_window_sessions == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "window_days and max_window_sessions must be at least 1",
            ));
        }
        let scale = fatigue_scale::FATIGUE_MIN..=fatigue_scale::FATIGUE_MAX;
        if !scale.contains(&fatigue.deload_threshold) || !scale.contains(&fatigue.neutral_fatigue)
        {
            return Err(ConfigError::InvalidRange(
                "deload_threshold and neutral_fatigue must be within 0-10",
            ));
        }
        if fatigue.trend_delta < 0.0 {
            return Err(ConfigError::ValueOutOfRange("trend_delta must be non-negative"));
        }
        if fatigue.sustained_mrv_windows == 0 || fatigue.min_confident_records == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "sustained_mrv_windows and min_confident_records must be at least 1",
            ));
        }
        Ok(())
    }

    fn validate_progression(&self) -> Result<(), ConfigError> {
        let progression = &self.progression;
        let levels = scales::LEVEL_MIN..=scales::LEVEL_MAX;
        if !levels.contains(&progression.recovery_floor)
            || !levels.contains(&progression.reset_recovery_level)
            || !levels.contains(&progression.reset_adaptation_level)
        {
            return Err(ConfigError::InvalidRange(
                "recovery_floor and reset levels must be within 1-10",
            ));
        }
        if !in_open_range(progression.deload_factor, DELOAD_FACTOR_MIN, DELOAD_FACTOR_MAX) {
            return Err(ConfigError::InvalidRange(
                "deload_factor must be strictly between 0.4 and 0.6",
            ));
        }
        if progression.small_step_sets > progression.large_step_sets {
            return Err(ConfigError::InvalidRange(
                "small_step_sets must not exceed large_step_sets",
            ));
        }
        if progression.max_block_weeks == 0 {
            return Err(ConfigError::ValueOutOfRange("max_block_weeks must be at least 1"));
        }
        if !in_unit_interval(progression.smoothing_factor) {
            return Err(ConfigError::InvalidRange(
                "smoothing_factor must be in (0, 1]",
            ));
        }
        Ok(())
    }

    fn validate_distribution(&self) -> Result<(), ConfigError> {
        let c = &self.distribution.fatigue_coefficients;
        if [c.myo_rep_match, c.myo_rep_no_match, c.drop_set, c.superset, c.giant_set]
            .iter()
            .any(|coefficient| *coefficient <= 0.0)
        {
            return Err(ConfigError::ValueOutOfRange(
                "method fatigue coefficients must be positive",
            ));
        }
        let p = &self.distribution.phase_multipliers;
        if [p.accumulation, p.intensification, p.deload]
            .iter()
            .any(|multiplier| *multiplier < 0.0)
        {
            return Err(ConfigError::ValueOutOfRange(
                "phase multipliers must be non-negative",
            ));
        }
        if !in_unit_interval(self.distribution.experience_derating_factor) {
            return Err(ConfigError::InvalidRange(
                "experience_derating_factor must be in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Helper function to parse and apply an environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Fatigue weights and window
        let weights = &mut self.fatigue.weights;
        Self::apply_env_var("STIMULUS_FATIGUE_WEIGHT_SORENESS", &mut weights.soreness)?;
        Self::apply_env_var("STIMULUS_FATIGUE_WEIGHT_ENERGY", &mut weights.energy)?;
        Self::apply_env_var("STIMULUS_FATIGUE_WEIGHT_SLEEP", &mut weights.sleep)?;
        Self::apply_env_var("STIMULUS_FATIGUE_WEIGHT_EFFORT", &mut weights.effort)?;
        Self::apply_env_var("STIMULUS_FATIGUE_WEIGHT_PUMP", &mut weights.pump)?;
        Self::apply_env_var(
            "STIMULUS_FATIGUE_NORMALIZATION",
            &mut self.fatigue.normalization_constant,
        )?;
        Self::apply_env_var("STIMULUS_FATIGUE_WINDOW_DAYS", &mut self.fatigue.window_days)?;
        Self::apply_env_var(
            "STIMULUS_FATIGUE_MAX_WINDOW_SESSIONS",
            &mut self.fatigue.max_window_sessions,
        )?;
        Self::apply_env_var("STIMULUS_FATIGUE_TREND_DELTA", &mut self.fatigue.trend_delta)?;
        Self::apply_env_var(
            "STIMULUS_FATIGUE_DELOAD_THRESHOLD",
            &mut self.fatigue.deload_threshold,
        )?;

        // Progression
        Self::apply_env_var(
            "STIMULUS_PROGRESSION_RECOVERY_FLOOR",
            &mut self.progression.recovery_floor,
        )?;
        Self::apply_env_var(
            "STIMULUS_PROGRESSION_DELOAD_FACTOR",
            &mut self.progression.deload_factor,
        )?;
        Self::apply_env_var(
            "STIMULUS_PROGRESSION_MAX_BLOCK_WEEKS",
            &mut self.progression.max_block_weeks,
        )?;
        Self::apply_env_var(
            "STIMULUS_PROGRESSION_SMOOTHING_FACTOR",
            &mut self.progression.smoothing_factor,
        )?;

        // Distribution
        Self::apply_env_var(
            "STIMULUS_DISTRIBUTION_DERATING_FACTOR",
            &mut self.distribution.experience_derating_factor,
        )?;

        // Concurrency
        Self::apply_env_var(
            "STIMULUS_MAX_UPDATE_ATTEMPTS",
            &mut self.concurrency.max_update_attempts,
        )?;
        Self::apply_env_var(
            "STIMULUS_UPDATE_BACKOFF_MS",
            &mut self.concurrency.base_backoff_ms,
        )?;

        Ok(self)
    }
}

/// `low < value < high`; false for NaN
fn in_open_range(value: f64, low: f64, high: f64) -> bool {
    value > low && value < high
}

/// `0 < value <= 1`; false for NaN
fn in_unit_interval(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}
