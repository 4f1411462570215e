// ABOUTME: Derived fatigue and recovery signals produced by the auto-regulation aggregator
// ABOUTME: Recomputed on demand from the feedback window; never the source of truth
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::muscle::MuscleGroupId;
use crate::warnings::EngineWarning;

/// Direction of fatigue between the older and newer half of the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryTrend {
    /// Recent fatigue lower than prior by more than the trend delta
    Improving,
    /// Within the trend delta
    Stable,
    /// Recent fatigue higher than prior by more than the trend delta
    Declining,
}

/// How much evidence backs a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataConfidence {
    /// Too few records; the snapshot is close to neutral
    Low,
    /// Some records
    Moderate,
    /// Enough records to trust trend and fatigue
    High,
}

/// Why a deload was recommended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum DeloadTrigger {
    /// Overall fatigue reached the deload threshold
    OverallFatigue,
    /// A muscle stayed at or above MRV for consecutive evaluation windows
    SustainedMrv {
        /// Muscle at MRV
        muscle_group: MuscleGroupId,
        /// Consecutive windows including the current one
        windows: u32,
    },
}

/// Fatigue attributed to one muscle group over the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleGroupFatigue {
    /// Muscle group
    pub muscle_group: MuscleGroupId,
    /// Volume-weighted fatigue score (0-10)
    pub fatigue: f64,
    /// Contribution-weighted sets accumulated over the window
    pub weighted_sets: f64,
    /// `current_volume / mrv` for the muscle's landmark row
    pub volume_to_mrv_ratio: f64,
    /// Volume-weighted mean pump quality (1-10), the stimulus estimate
    pub stimulus_score: f64,
}

/// Fatigue/recovery state of one athlete at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueSnapshot {
    /// Athlete
    pub user_id: Uuid,
    /// End of the aggregation window
    pub as_of: DateTime<Utc>,
    /// Number of feedback records aggregated
    pub records_in_window: usize,
    /// Contribution-weighted overall fatigue (0-10)
    pub overall_fatigue: f64,
    /// Fatigue direction across the window
    pub recovery_trend: RecoveryTrend,
    /// Whether a deload is recommended
    pub deload_recommended: bool,
    /// Conditions that triggered the recommendation
    pub deload_triggers: Vec<DeloadTrigger>,
    /// Consecutive weekly evaluations, including this one, at or above the deload threshold
    pub consecutive_high_fatigue_windows: u32,
    /// Evidence level
    pub confidence: DataConfidence,
    /// Per-muscle breakdown, catalog order
    pub muscle_group_fatigue: Vec<MuscleGroupFatigue>,
    /// Recovered data problems
    pub warnings: Vec<EngineWarning>,
}

impl FatigueSnapshot {
    /// Fatigue score for one muscle, if it received any stimulus in the window
    #[must_use]
    pub fn fatigue_for(&self, muscle: MuscleGroupId) -> Option<f64> {
        self.muscle_fatigue(muscle).map(|m| m.fatigue)
    }

    /// Per-muscle row, if the muscle received any stimulus in the window
    #[must_use]
    pub fn muscle_fatigue(&self, muscle: MuscleGroupId) -> Option<&MuscleGroupFatigue> {
        self.muscle_group_fatigue
            .iter()
            .find(|m| m.muscle_group == muscle)
    }

    /// Whether the snapshot was built without enough evidence to trust it
    #[must_use]
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == DataConfidence::Low
    }
}
