// ABOUTME: Mesocycle phase state machine and weekly per-muscle target volume planner
// ABOUTME: Pure planning step; persistence applies the returned plan in one per-user commit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Mesocycle progression engine
//!
//! Phases run `Accumulation -> Intensification -> Deload -> Accumulation`.
//! Transitions out of a training phase are evaluated on the state entering
//! the week, in this order:
//!
//! 1. the fatigue snapshot recommends a deload
//! 2. the block has reached its maximum length
//! 3. a muscle reached MAV with recovery below the floor
//! 4. (accumulation only) a muscle reached MAV with recovery at or above the floor
//!
//! A deload always lasts exactly one week.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use stimulus_core::constants::scales;
use stimulus_core::models::{
    FatigueSnapshot, LandmarkUpdate, Landmarks, MesocyclePhase, MesocycleState, MuscleGroupId,
    MuscleTarget, PhaseTransition, TransitionReason, VolumeLandmark, WeeklyAdvance,
};
use stimulus_core::warnings::IntegrityIssue;
use stimulus_core::{EngineWarning, MuscleGroupCatalog};
use tracing::{info, warn};

use crate::config::ProgressionConfig;

/// Landmark row as the engine sees it entering the week
#[derive(Debug, Clone)]
struct EffectiveRow {
    stored: VolumeLandmark,
    landmarks: Landmarks,
    recovery_level: u8,
}

impl EffectiveRow {
    fn at_mav(&self) -> bool {
        self.stored.current_volume >= self.landmarks.mav
    }
}

/// Output of [`MesocycleProgressionEngine::plan_week`]
#[derive(Debug, Clone)]
pub struct WeekPlan {
    /// Phase state to persist (version already bumped)
    pub state: MesocycleState,
    /// Landmark rows to persist (versions already bumped)
    pub landmarks: Vec<VolumeLandmark>,
    /// Result returned to the caller
    pub advance: WeeklyAdvance,
}

/// Weekly phase and volume planner
#[derive(Debug, Clone, Default)]
pub struct MesocycleProgressionEngine {
    config: ProgressionConfig,
}

impl MesocycleProgressionEngine {
    /// Create an engine with the given tunables
    #[must_use]
    pub const fn new(config: ProgressionConfig) -> Self {
        Self { config }
    }

    /// Tunables in use
    #[must_use]
    pub const fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    /// Plan the coming week from the state entering it
    ///
    /// Missing or corrupted landmark rows are replaced with catalog defaults
    /// for that muscle only and reported as warnings.
    #[must_use]
    pub fn plan_week(
        &self,
        state: &MesocycleState,
        rows: &[VolumeLandmark],
        snapshot: &FatigueSnapshot,
        as_of: DateTime<Utc>,
    ) -> WeekPlan {
        let mut warnings = Vec::new();
        let effective = resolve_rows(state, rows, as_of, &mut warnings);

        let transition = self.decide_transition(state.phase, snapshot, state, &effective);
        let next_phase = transition.map_or(state.phase, |t| t.to);
        let leaving_deload = state.phase == MesocyclePhase::Deload;

        let mut landmarks = Vec::with_capacity(effective.len());
        let mut targets = Vec::with_capacity(effective.len());
        let mut mrv_streaks = state.mrv_streaks.clone();

        for row in &effective {
            let muscle = row.stored.muscle_group;
            if row.stored.current_volume >= row.landmarks.mrv {
                *mrv_streaks.entry(muscle).or_insert(0) += 1;
            } else {
                mrv_streaks.remove(&muscle);
            }

            let target = self.target_volume(next_phase, leaving_deload, row);
            let (recovery_level, adaptation_level) =
                self.smoothed_levels(row, snapshot, leaving_deload);

            let update = LandmarkUpdate {
                landmarks: None,
                current_volume: Some(target),
                target_volume: Some(target),
                recovery_level: Some(recovery_level),
                adaptation_level: Some(adaptation_level),
            };
            let (updated, row_warnings) = row.stored.apply_update(
                &update,
                MuscleGroupCatalog::default_landmarks(muscle),
                as_of,
            );
            for warning in &row_warnings {
                warn!(user_id = %state.user_id, muscle_group = %muscle, "{}", warning.detail());
            }
            warnings.extend(row_warnings);

            targets.push(MuscleTarget {
                muscle_group: muscle,
                previous_volume: row.stored.current_volume,
                target_volume: updated.target_volume,
                landmarks: updated.landmarks,
                recovery_level: updated.recovery_level,
                adaptation_level: updated.adaptation_level,
            });
            landmarks.push(updated);
        }

        let next_state = next_state(state, transition, snapshot, mrv_streaks, as_of);
        if let Some(t) = transition {
            info!(
                user_id = %state.user_id,
                from = %t.from,
                to = %t.to,
                reason = ?t.reason,
                block = next_state.block_number,
                "mesocycle phase transition"
            );
        }

        let advance = WeeklyAdvance {
            user_id: state.user_id,
            phase: next_state.phase,
            transition,
            block_number: next_state.block_number,
            week_in_block: next_state.week_in_block,
            targets,
            already_applied: false,
            state_version: next_state.version,
            warnings,
        };
        WeekPlan {
            state: next_state,
            landmarks,
            advance,
        }
    }

    /// Result for a week whose advance already ran: the stored prescription, unchanged
    #[must_use]
    pub fn replay(state: &MesocycleState, rows: &[VolumeLandmark]) -> WeeklyAdvance {
        let targets = MuscleGroupId::ALL
            .into_iter()
            .filter_map(|muscle| rows.iter().find(|r| r.muscle_group == muscle))
            .map(|row| MuscleTarget {
                muscle_group: row.muscle_group,
                previous_volume: row.current_volume,
                target_volume: row.target_volume,
                landmarks: row.landmarks,
                recovery_level: row.recovery_level,
                adaptation_level: row.adaptation_level,
            })
            .collect();
        WeeklyAdvance {
            user_id: state.user_id,
            phase: state.phase,
            transition: None,
            block_number: state.block_number,
            week_in_block: state.week_in_block,
            targets,
            already_applied: true,
            state_version: state.version,
            warnings: Vec::new(),
        }
    }

    fn decide_transition(
        &self,
        phase: MesocyclePhase,
        snapshot: &FatigueSnapshot,
        state: &MesocycleState,
        rows: &[EffectiveRow],
    ) -> Option<PhaseTransition> {
        let transition_to = |to, reason, muscle_group| {
            Some(PhaseTransition {
                from: phase,
                to,
                reason,
                muscle_group,
            })
        };

        if phase == MesocyclePhase::Deload {
            return transition_to(MesocyclePhase::Accumulation, TransitionReason::DeloadCompleted, None);
        }
        if snapshot.deload_recommended {
            return transition_to(MesocyclePhase::Deload, TransitionReason::DeloadRecommended, None);
        }
        if state.week_in_block >= self.config.max_block_weeks {
            return transition_to(MesocyclePhase::Deload, TransitionReason::BlockLengthReached, None);
        }
        let floor = self.config.recovery_floor;
        if let Some(row) = rows
            .iter()
            .find(|r| r.at_mav() && r.recovery_level < floor)
        {
            return transition_to(
                MesocyclePhase::Deload,
                TransitionReason::RecoveryExhausted,
                Some(row.stored.muscle_group),
            );
        }
        if phase == MesocyclePhase::Accumulation {
            if let Some(row) = rows
                .iter()
                .find(|r| r.at_mav() && r.recovery_level >= floor)
            {
                return transition_to(
                    MesocyclePhase::Intensification,
                    TransitionReason::MavReached,
                    Some(row.stored.muscle_group),
                );
            }
        }
        None
    }

    fn target_volume(&self, phase: MesocyclePhase, leaving_deload: bool, row: &EffectiveRow) -> u32 {
        let landmarks = row.landmarks;
        let current = row.stored.current_volume;
        let target = match phase {
            MesocyclePhase::Accumulation if leaving_deload => landmarks.mev,
            MesocyclePhase::Accumulation => {
                (current + self.step_size(row.recovery_level)).min(landmarks.mav)
            }
            MesocyclePhase::Intensification => current,
            MesocyclePhase::Deload => {
                (f64::from(landmarks.mev) * self.config.deload_factor).round() as u32
            }
        };
        landmarks.clamp_volume(target)
    }

    /// Sets added this week for a muscle in accumulation
    #[must_use]
    pub fn step_size(&self, recovery_level: u8) -> u32 {
        let floor = self.config.recovery_floor;
        if recovery_level >= floor.saturating_add(self.config.large_step_margin) {
            self.config.large_step_sets
        } else if recovery_level >= floor {
            self.config.small_step_sets
        } else {
            0
        }
    }

    fn smoothed_levels(
        &self,
        row: &EffectiveRow,
        snapshot: &FatigueSnapshot,
        leaving_deload: bool,
    ) -> (u8, u8) {
        let (mut recovery, mut adaptation) = snapshot
            .muscle_fatigue(row.stored.muscle_group)
            .map_or(
                (row.recovery_level, row.stored.adaptation_level),
                |observed| {
                    (
                        self.smooth(row.recovery_level, scales::LEVEL_MAX_F64 - observed.fatigue),
                        self.smooth(row.stored.adaptation_level, observed.stimulus_score),
                    )
                },
            );
        if leaving_deload {
            recovery = recovery.max(self.config.reset_recovery_level);
            adaptation = adaptation.max(self.config.reset_adaptation_level);
        }
        (recovery, adaptation)
    }

    fn smooth(&self, previous: u8, observed: f64) -> u8 {
        let alpha = self.config.smoothing_factor;
        let blended = alpha.mul_add(observed, (1.0 - alpha) * f64::from(previous));
        blended
            .round()
            .clamp(f64::from(scales::LEVEL_MIN), f64::from(scales::LEVEL_MAX)) as u8
    }
}

fn next_state(
    state: &MesocycleState,
    transition: Option<PhaseTransition>,
    snapshot: &FatigueSnapshot,
    mrv_streaks: BTreeMap<MuscleGroupId, u32>,
    as_of: DateTime<Utc>,
) -> MesocycleState {
    let (phase, block_number, week_in_block, weeks_in_phase) = match transition {
        Some(t) if t.reason == TransitionReason::DeloadCompleted => {
            (t.to, state.block_number + 1, 1, 1)
        }
        Some(t) => (t.to, state.block_number, state.week_in_block + 1, 1),
        None => (
            state.phase,
            state.block_number,
            state.week_in_block + 1,
            state.weeks_in_phase + 1,
        ),
    };
    MesocycleState {
        user_id: state.user_id,
        phase,
        block_number,
        week_in_block,
        weeks_in_phase,
        consecutive_high_fatigue_windows: snapshot.consecutive_high_fatigue_windows,
        mrv_streaks,
        last_advanced_at: Some(as_of),
        version: state.version + 1,
        updated_at: as_of,
    }
}

/// One effective row per catalog muscle, substituting defaults where data is missing or broken
fn resolve_rows(
    state: &MesocycleState,
    rows: &[VolumeLandmark],
    now: DateTime<Utc>,
    warnings: &mut Vec<EngineWarning>,
) -> Vec<EffectiveRow> {
    MuscleGroupId::ALL
        .into_iter()
        .map(|muscle| {
            let default = MuscleGroupCatalog::default_landmarks(muscle);
            let stored = rows
                .iter()
                .find(|r| r.muscle_group == muscle)
                .cloned()
                .unwrap_or_else(|| {
                    warn!(user_id = %state.user_id, muscle_group = %muscle, "landmark row missing, using catalog defaults");
                    warnings.push(EngineWarning::integrity(
                        IntegrityIssue::MissingLandmark,
                        Some(muscle),
                        "no landmark row; catalog defaults used",
                    ));
                    VolumeLandmark::from_defaults(state.user_id, muscle, default, now)
                });
            let landmarks = if stored.landmarks.is_ordered() {
                stored.landmarks
            } else {
                default
            };
            let recovery_level = stored
                .recovery_level
                .clamp(scales::LEVEL_MIN, scales::LEVEL_MAX);
            EffectiveRow {
                stored,
                landmarks,
                recovery_level,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use stimulus_core::models::{DataConfidence, RecoveryTrend};
    use uuid::Uuid;

    use super::*;

    fn snapshot(user_id: Uuid, deload: bool) -> FatigueSnapshot {
        FatigueSnapshot {
            user_id,
            as_of: Utc::now(),
            records_in_window: 0,
            overall_fatigue: 5.0,
            recovery_trend: RecoveryTrend::Stable,
            deload_recommended: deload,
            deload_triggers: Vec::new(),
            consecutive_high_fatigue_windows: 0,
            confidence: DataConfidence::Low,
            muscle_group_fatigue: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn default_rows(user_id: Uuid) -> Vec<VolumeLandmark> {
        MuscleGroupCatalog::all()
            .iter()
            .map(|m| VolumeLandmark::from_defaults(user_id, m.id, m.default_landmarks, Utc::now()))
            .collect()
    }

    #[test]
    fn test_step_size_by_recovery() {
        let engine = MesocycleProgressionEngine::default();
        assert_eq!(engine.step_size(9), 2);
        assert_eq!(engine.step_size(7), 2);
        assert_eq!(engine.step_size(5), 1);
        assert_eq!(engine.step_size(4), 0);
    }

    #[test]
    fn test_accumulation_adds_sets_capped_at_mav() {
        let engine = MesocycleProgressionEngine::default();
        let user = Uuid::new_v4();
        let state = MesocycleState::new(user, Utc::now());
        let mut rows = default_rows(user);
        rows[0].current_volume = 15;
        rows[0].recovery_level = 8;

        let plan = engine.plan_week(&state, &rows, &snapshot(user, false), Utc::now());
        assert!(plan.advance.transition.is_none());
        assert_eq!(plan.advance.phase, MesocyclePhase::Accumulation);
        let chest = plan.advance.target_for(MuscleGroupId::Chest);
        assert_eq!(chest.map(|t| t.target_volume), Some(16));
        assert_eq!(plan.state.week_in_block, 2);
        assert_eq!(plan.state.version, state.version + 1);
    }

    #[test]
    fn test_deload_recommendation_wins() {
        let engine = MesocycleProgressionEngine::default();
        let user = Uuid::new_v4();
        let state = MesocycleState::new(user, Utc::now());
        let plan = engine.plan_week(&state, &default_rows(user), &snapshot(user, true), Utc::now());

        let transition = plan.advance.transition;
        assert_eq!(transition.map(|t| t.reason), Some(TransitionReason::DeloadRecommended));
        for target in &plan.advance.targets {
            assert!(target.target_volume <= target.landmarks.mev);
        }
    }

    #[test]
    fn test_deload_lasts_one_week_and_resets_to_mev() {
        let engine = MesocycleProgressionEngine::default();
        let user = Uuid::new_v4();
        let mut state = MesocycleState::new(user, Utc::now());
        state.phase = MesocyclePhase::Deload;
        state.week_in_block = 6;
        let mut rows = default_rows(user);
        for row in &mut rows {
            row.current_volume = (row.landmarks.mev / 2).max(row.landmarks.mv);
            row.recovery_level = 3;
        }

        let plan = engine.plan_week(&state, &rows, &snapshot(user, false), Utc::now());
        assert_eq!(plan.advance.phase, MesocyclePhase::Accumulation);
        assert_eq!(plan.state.block_number, 2);
        assert_eq!(plan.state.week_in_block, 1);
        for target in &plan.advance.targets {
            assert_eq!(target.target_volume, target.landmarks.mev);
            assert!(target.recovery_level >= 8);
        }
    }

    #[test]
    fn test_block_length_forces_deload() {
        let engine = MesocycleProgressionEngine::default();
        let user = Uuid::new_v4();
        let mut state = MesocycleState::new(user, Utc::now());
        state.phase = MesocyclePhase::Intensification;
        state.week_in_block = engine.config().max_block_weeks;

        let plan = engine.plan_week(&state, &default_rows(user), &snapshot(user, false), Utc::now());
        assert_eq!(
            plan.advance.transition.map(|t| t.reason),
            Some(TransitionReason::BlockLengthReached)
        );
    }

    #[test]
    fn test_corrupted_row_replaced_for_that_muscle_only() {
        let engine = MesocycleProgressionEngine::default();
        let user = Uuid::new_v4();
        let state = MesocycleState::new(user, Utc::now());
        let mut rows = default_rows(user);
        rows[3].landmarks = Landmarks::new(20, 10, 5, 1);
        rows.remove(5);

        let plan = engine.plan_week(&state, &rows, &snapshot(user, false), Utc::now());
        assert_eq!(plan.advance.targets.len(), MuscleGroupId::ALL.len());
        let biceps = plan.advance.target_for(MuscleGroupId::Biceps);
        assert_eq!(
            biceps.map(|t| t.landmarks),
            Some(MuscleGroupCatalog::default_landmarks(MuscleGroupId::Biceps))
        );
        assert!(plan.advance.warnings.iter().any(|w| w.muscle_group() == Some(MuscleGroupId::Biceps)));
        assert!(plan.advance.warnings.iter().any(|w| w.muscle_group() == Some(MuscleGroupId::Quads)));
        assert!(plan.landmarks.iter().all(VolumeLandmark::is_consistent));
    }
}
