// ABOUTME: Fatigue aggregation tunables: score weights, window bounds, trend and deload thresholds
// ABOUTME: Defaults produce a 0-10 fatigue scale from 1-10 subjective feedback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Fatigue Aggregation Configuration
//!
//! `record_fatigue = w1*soreness + w2*(10-energy) + w3*(10-sleep) + w4*effort - w5*pump`,
//! divided by the normalization constant. The weights must sum to that constant.

use serde::{Deserialize, Serialize};

/// Weights applied to each feedback score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueWeights {
    /// w1, muscle soreness
    pub soreness: f64,
    /// w2, inverted energy level
    pub energy: f64,
    /// w3, inverted sleep quality
    pub sleep: f64,
    /// w4, perceived effort
    pub effort: f64,
    /// w5, pump quality (subtracted)
    pub pump: f64,
}

impl FatigueWeights {
    /// Sum of all five weights
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.soreness + self.energy + self.sleep + self.effort + self.pump
    }
}

impl Default for FatigueWeights {
    fn default() -> Self {
        Self {
            soreness: 0.30,
            energy: 0.20,
            sleep: 0.15,
            effort: 0.20,
            pump: 0.15,
        }
    }
}

/// Aggregation window, trend, and deload settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueConfig {
    /// Per-score weights
    pub weights: FatigueWeights,
    /// Constant the weights must sum to
    pub normalization_constant: f64,
    /// Window length in days
    pub window_days: u32,
    /// Maximum sessions kept in the window (newest first)
    pub max_window_sessions: usize,
    /// Minimum fatigue difference between halves to call a trend
    pub trend_delta: f64,
    /// Overall fatigue at or above which a deload is recommended
    pub deload_threshold: f64,
    /// Consecutive weekly evaluations at or above MRV that trigger a deload
    pub sustained_mrv_windows: u32,
    /// Records needed before a snapshot leaves low confidence
    pub min_confident_records: usize,
    /// Fatigue reported when the window is empty
    pub neutral_fatigue: f64,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            weights: FatigueWeights::default(),
            normalization_constant: 1.0,
            window_days: 14,
            max_window_sessions: 6,
            trend_delta: 0.5,
            deload_threshold: 7.0,
            sustained_mrv_windows: 2,
            min_confident_records: 2,
            neutral_fatigue: 5.0,
        }
    }
}
