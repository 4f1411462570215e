// ABOUTME: Per-user mesocycle phase state machine value and weekly advance results
// ABOUTME: Persisted with an explicit version so concurrent weekly recomputes are detected
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::landmark::Landmarks;
use super::muscle::MuscleGroupId;
use crate::constants::onboarding;
use crate::errors::AppError;
use crate::warnings::EngineWarning;

/// Phase of a training block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MesocyclePhase {
    /// Volume ramps from MEV toward MAV
    #[default]
    Accumulation,
    /// Volume held; load and effort progress instead
    Intensification,
    /// One low-volume recovery week
    Deload,
}

impl MesocyclePhase {
    /// Convert to storage string representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accumulation => "accumulation",
            Self::Intensification => "intensification",
            Self::Deload => "deload",
        }
    }
}

impl fmt::Display for MesocyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MesocyclePhase {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accumulation" => Ok(Self::Accumulation),
            "intensification" => Ok(Self::Intensification),
            "deload" => Ok(Self::Deload),
            other => Err(AppError::invalid_input(format!(
                "Unknown mesocycle phase: '{other}'"
            ))),
        }
    }
}

/// Owned state-machine value for one athlete's training block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MesocycleState {
    /// Athlete
    pub user_id: Uuid,
    /// Current phase
    pub phase: MesocyclePhase,
    /// Block counter, starting at 1
    pub block_number: u32,
    /// Week of the block being trained, starting at 1
    pub week_in_block: u32,
    /// Weeks spent in the current phase, starting at 1
    pub weeks_in_phase: u32,
    /// Consecutive weekly evaluations at or above the deload threshold
    pub consecutive_high_fatigue_windows: u32,
    /// Consecutive weekly evaluations each muscle spent at or above MRV
    pub mrv_streaks: BTreeMap<MuscleGroupId, u32>,
    /// When the last weekly advance ran
    pub last_advanced_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version
    pub version: u64,
    /// Time of the last write
    pub updated_at: DateTime<Utc>,
}

impl MesocycleState {
    /// Initial state for a newly onboarded athlete
    #[must_use]
    pub const fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            phase: MesocyclePhase::Accumulation,
            block_number: 1,
            week_in_block: 1,
            weeks_in_phase: 1,
            consecutive_high_fatigue_windows: 0,
            mrv_streaks: BTreeMap::new(),
            last_advanced_at: None,
            version: onboarding::INITIAL_VERSION,
            updated_at: now,
        }
    }

    /// Persisted MRV streak for a muscle
    #[must_use]
    pub fn mrv_streak(&self, muscle: MuscleGroupId) -> u32 {
        self.mrv_streaks.get(&muscle).copied().unwrap_or(0)
    }

    /// Whether the weekly advance already ran in the ISO week containing `as_of`
    #[must_use]
    pub fn advanced_in_week_of(&self, as_of: DateTime<Utc>) -> bool {
        self.last_advanced_at
            .is_some_and(|last| last.iso_week() == as_of.iso_week())
    }
}

/// Why the phase changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    /// Aggregated feedback recommended a deload
    DeloadRecommended,
    /// The block reached its maximum length
    BlockLengthReached,
    /// A muscle reached MAV without enough recovery to keep progressing
    RecoveryExhausted,
    /// A muscle reached MAV while still recovering; switch to intensity
    MavReached,
    /// The single deload week finished
    DeloadCompleted,
}

/// A phase change produced by a weekly advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// Phase before
    pub from: MesocyclePhase,
    /// Phase after
    pub to: MesocyclePhase,
    /// Trigger
    pub reason: TransitionReason,
    /// Muscle that triggered it, for muscle-scoped triggers
    pub muscle_group: Option<MuscleGroupId>,
}

/// Next-week prescription for one muscle group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuscleTarget {
    /// Muscle group
    pub muscle_group: MuscleGroupId,
    /// Volume of the week that just finished
    pub previous_volume: u32,
    /// Volume prescribed for the coming week
    pub target_volume: u32,
    /// Landmarks the target was clamped against
    pub landmarks: Landmarks,
    /// Updated recovery level
    pub recovery_level: u8,
    /// Updated adaptation level
    pub adaptation_level: u8,
}

/// Result of `advance_mesocycle_week`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAdvance {
    /// Athlete
    pub user_id: Uuid,
    /// Phase for the coming week
    pub phase: MesocyclePhase,
    /// Phase transition, if one happened
    pub transition: Option<PhaseTransition>,
    /// Block counter for the coming week
    pub block_number: u32,
    /// Week of the block for the coming week
    pub week_in_block: u32,
    /// Per-muscle targets, catalog order
    pub targets: Vec<MuscleTarget>,
    /// True when this week's advance had already run and nothing changed
    pub already_applied: bool,
    /// Version of the persisted state after the advance
    pub state_version: u64,
    /// Recovered data problems
    pub warnings: Vec<EngineWarning>,
}

impl WeeklyAdvance {
    /// Target for one muscle group
    #[must_use]
    pub fn target_for(&self, muscle: MuscleGroupId) -> Option<&MuscleTarget> {
        self.targets.iter().find(|t| t.muscle_group == muscle)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_same_iso_week_detection() {
        let monday = DateTime::parse_from_rfc3339("2025-03-03T08:00:00Z")
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        let mut state = MesocycleState::new(Uuid::new_v4(), monday);
        assert!(!state.advanced_in_week_of(monday));

        state.last_advanced_at = Some(monday);
        assert!(state.advanced_in_week_of(monday + Duration::days(4)));
        assert!(!state.advanced_in_week_of(monday + Duration::days(7)));
    }

    #[test]
    fn test_phase_parse() {
        assert_eq!(
            "Deload".parse::<MesocyclePhase>().ok(),
            Some(MesocyclePhase::Deload)
        );
        assert!("peaking".parse::<MesocyclePhase>().is_err());
    }
}
