// ABOUTME: Post-session subjective feedback and the exercise-to-muscle contribution mapping
// ABOUTME: Append-only records consumed by the auto-regulation aggregator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::muscle::MuscleGroupId;
use crate::constants::{percentages, scales};
use crate::errors::{AppError, AppResult};

/// Subjective scores collected once after a session (each 1-10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRegulationFeedback {
    /// Quality of the pump; the only score that lowers fatigue
    pub pump_quality: u8,
    /// Residual soreness going into the session
    pub muscle_soreness: u8,
    /// Perceived effort of the session
    pub perceived_effort: u8,
    /// Energy level during the session
    pub energy_level: u8,
    /// Sleep quality the night before
    pub sleep_quality: u8,
}

impl AutoRegulationFeedback {
    /// Validate every score is within 1-10
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` naming the first out-of-range score
    pub fn validate(&self) -> AppResult<()> {
        let scores = [
            ("pump_quality", self.pump_quality),
            ("muscle_soreness", self.muscle_soreness),
            ("perceived_effort", self.perceived_effort),
            ("energy_level", self.energy_level),
            ("sleep_quality", self.sleep_quality),
        ];
        for (name, value) in scores {
            if !(scales::LEVEL_MIN..=scales::LEVEL_MAX).contains(&value) {
                return Err(AppError::invalid_input(format!(
                    "{name} must be between 1 and 10, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Whether a muscle is a prime mover or a synergist for an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionRole {
    /// Prime mover
    Primary,
    /// Synergist
    Secondary,
}

/// Movement type, used to scope special-method allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    /// Multi-joint free-weight movement
    Compound,
    /// Single-joint movement
    Isolation,
    /// Machine or cable movement
    Machine,
}

/// Share of an exercise's stimulus attributed to one muscle group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MuscleContribution {
    /// Muscle group receiving the stimulus
    pub muscle_group: MuscleGroupId,
    /// Prime mover or synergist
    pub role: ContributionRole,
    /// Contribution percentage (0-100)
    pub percentage: f64,
}

/// One logged exercise with its muscle mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseContribution {
    /// Exercise identifier from the catalog owned by the logging subsystem
    pub exercise_id: String,
    /// Movement type
    pub exercise_type: ExerciseType,
    /// Working sets performed
    pub sets: u32,
    /// Muscles trained and their shares
    pub muscles: Vec<MuscleContribution>,
}

/// Feedback for one completed session, linked to the session's exercises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFeedback {
    /// Record identifier
    pub id: Uuid,
    /// Athlete the session belongs to
    pub user_id: Uuid,
    /// Session identifier in the logging subsystem
    pub session_id: Uuid,
    /// When the feedback was recorded
    pub recorded_at: DateTime<Utc>,
    /// Subjective scores
    pub feedback: AutoRegulationFeedback,
    /// Exercises performed in the session
    pub exercises: Vec<ExerciseContribution>,
}

impl SessionFeedback {
    /// Validate scores and contribution percentages
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` if any score is outside 1-10 or any
    /// contribution percentage is outside 0-100
    pub fn validate(&self) -> AppResult<()> {
        self.feedback.validate()?;
        for exercise in &self.exercises {
            for contribution in &exercise.muscles {
                if !(0.0..=percentages::PERCENT_MAX).contains(&contribution.percentage) {
                    return Err(AppError::invalid_input(format!(
                        "contribution of {} to {} must be between 0 and 100, got {}",
                        exercise.exercise_id, contribution.muscle_group, contribution.percentage
                    )));
                }
            }
        }
        Ok(())
    }

    /// Weighted set volume this session delivered to a muscle group
    ///
    /// Sum over exercises of `sets x percentage / 100`.
    #[must_use]
    pub fn weighted_sets_for(&self, muscle: MuscleGroupId) -> f64 {
        self.exercises
            .iter()
            .flat_map(|exercise| {
                exercise
                    .muscles
                    .iter()
                    .filter(move |c| c.muscle_group == muscle)
                    .map(move |c| {
                        f64::from(exercise.sets) * c.percentage / percentages::PERCENT_DIVISOR
                    })
            })
            .sum()
    }

    /// Muscle groups touched by this session, deduplicated in first-seen order
    #[must_use]
    pub fn muscle_groups(&self) -> Vec<MuscleGroupId> {
        let mut seen = Vec::new();
        for contribution in self.exercises.iter().flat_map(|e| e.muscles.iter()) {
            if !seen.contains(&contribution.muscle_group) {
                seen.push(contribution.muscle_group);
            }
        }
        seen
    }
}
