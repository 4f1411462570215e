// ABOUTME: Mesocycle progression tunables: recovery floor, volume steps, deload factor, block length
// ABOUTME: Also carries the smoothing factor and the levels restored after a deload week
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Exclusive lower bound for the deload factor
pub const DELOAD_FACTOR_MIN: f64 = 0.4;
/// Exclusive upper bound for the deload factor
pub const DELOAD_FACTOR_MAX: f64 = 0.6;

/// Weekly progression settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Recovery level below which volume stops rising
    pub recovery_floor: u8,
    /// Sets added when recovery is comfortably above the floor
    pub large_step_sets: u32,
    /// Sets added when recovery is at or just above the floor
    pub small_step_sets: u32,
    /// Margin above the floor that earns the large step
    pub large_step_margin: u8,
    /// Deload volume as a fraction of MEV
    pub deload_factor: f64,
    /// Accumulation plus intensification weeks before a forced deload
    pub max_block_weeks: u32,
    /// Exponential smoothing factor for recovery/adaptation levels
    pub smoothing_factor: f64,
    /// Minimum recovery level after a completed deload
    pub reset_recovery_level: u8,
    /// Minimum adaptation level after a completed deload
    pub reset_adaptation_level: u8,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            recovery_floor: 5,
            large_step_sets: 2,
            small_step_sets: 1,
            large_step_margin: 2,
            deload_factor: 0.5,
            max_block_weeks: 5,
            smoothing_factor: 0.5,
            reset_recovery_level: 8,
            reset_adaptation_level: 6,
        }
    }
}

impl ProgressionConfig {
    /// Weeks in a block including the deload week
    #[must_use]
    pub const fn total_block_weeks(&self) -> u32 {
        self.max_block_weeks + 1
    }
}
