// ABOUTME: Special training methods, distribution strategies, constraints, and resolved allocations
// ABOUTME: Sealed enums over methods and experience levels so allocation matching is exhaustive
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};

use super::feedback::ExerciseType;
use super::mesocycle::MesocyclePhase;
use super::muscle::MuscleGroupId;
use crate::constants::{fatigue, percentages, schedule};
use crate::errors::{AppError, AppResult};
use crate::warnings::EngineWarning;

/// High-intensity technique applied to a share of a muscle's weekly sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMethod {
    /// Myo-reps where each mini-set must match the activation set's reps
    MyoRepMatch,
    /// Classic myo-reps with a fixed number of mini-sets
    MyoRepNoMatch,
    /// Load reductions taken immediately after failure
    DropSet,
    /// Two exercises back to back
    Superset,
    /// Three or more exercises back to back
    GiantSet,
}

impl SpecialMethod {
    /// Every method
    pub const ALL: [Self; 5] = [
        Self::MyoRepMatch,
        Self::MyoRepNoMatch,
        Self::DropSet,
        Self::Superset,
        Self::GiantSet,
    ];

    /// Storage/display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MyoRepMatch => "myo_rep_match",
            Self::MyoRepNoMatch => "myo_rep_no_match",
            Self::DropSet => "drop_set",
            Self::Superset => "superset",
            Self::GiantSet => "giant_set",
        }
    }
}

impl fmt::Display for SpecialMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training experience, ordered from least to most experienced
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    /// Under a year of consistent training
    Beginner,
    /// One to three years
    #[default]
    Intermediate,
    /// Three or more years
    Advanced,
    /// Competitive physique athletes
    Elite,
}

impl ExperienceLevel {
    /// Storage/display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Elite => "elite",
        }
    }

    /// Parse a level name
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for unrecognized names
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "elite" => Ok(Self::Elite),
            other => Err(AppError::invalid_input(format!(
                "Unknown experience level: '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One method entry of a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialMethodAllocation {
    /// Technique
    pub method: SpecialMethod,
    /// Share of the muscle's weekly sets (0-100) before adjustments
    pub percentage: f64,
    /// Block weeks (1-based) the allocation applies to
    pub target_weeks: Vec<u32>,
    /// Exercise types the technique may be applied to
    pub exercise_types: Vec<ExerciseType>,
    /// Muscle groups the technique targets
    pub muscle_groups: Vec<MuscleGroupId>,
    /// Why the technique is used
    pub rationale: String,
}

/// Named allocation plan for a target population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStrategy {
    /// Unique name (matched case-insensitively)
    pub name: String,
    /// Short description
    pub description: String,
    /// Experience level the plan is written for
    pub target_population: ExperienceLevel,
    /// Ordered allocations
    pub allocations: Vec<SpecialMethodAllocation>,
}

impl DistributionStrategy {
    /// Validate strategy configuration data
    ///
    /// # Errors
    ///
    /// Returns `AppError::config` for an empty name, an allocation percentage
    /// outside 0-100, or an allocation without weeks, muscles, or exercise types
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::config("strategy name must not be empty"));
        }
        for allocation in &self.allocations {
            let context = format!("strategy {} / {}", self.name, allocation.method);
            if !(0.0..=percentages::PERCENT_MAX).contains(&allocation.percentage) {
                return Err(AppError::config(format!(
                    "{context}: percentage {} outside 0-100",
                    allocation.percentage
                )));
            }
            if allocation.target_weeks.is_empty() || allocation.target_weeks.contains(&0) {
                return Err(AppError::config(format!(
                    "{context}: target weeks must be non-empty and 1-based"
                )));
            }
            if allocation.muscle_groups.is_empty() {
                return Err(AppError::config(format!(
                    "{context}: at least one muscle group required"
                )));
            }
            if allocation.exercise_types.is_empty() {
                return Err(AppError::config(format!(
                    "{context}: at least one exercise type required"
                )));
            }
        }
        Ok(())
    }
}

/// Hard limits applied to a strategy's output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionConstraints {
    /// Maximum distinct methods in one session for one muscle
    pub max_methods_per_session: u32,
    /// Maximum distinct methods in one week for one muscle
    pub max_methods_per_week: u32,
    /// Share of weekly sets that must stay regular (0-100)
    pub min_regular_sets_percentage: f64,
    /// Muscle fatigue (0-10) above which all methods are suppressed
    pub fatigue_threshold: f64,
    /// Trainee experience
    pub experience_level: ExperienceLevel,
    /// Sessions per week each muscle is trained in
    pub sessions_per_week: u32,
}

impl Default for DistributionConstraints {
    fn default() -> Self {
        Self {
            max_methods_per_session: 1,
            max_methods_per_week: 3,
            min_regular_sets_percentage: 60.0,
            fatigue_threshold: 8.0,
            experience_level: ExperienceLevel::Intermediate,
            sessions_per_week: 2,
        }
    }
}

impl DistributionConstraints {
    /// Reject malformed constraints
    ///
    /// # Errors
    ///
    /// Returns `AppError::config` for method caps outside 1 to the number of
    /// special methods, sessions outside 1-7, a regular-set percentage
    /// outside 0-100, or a fatigue threshold outside 0-10
    pub fn validate(&self) -> AppResult<()> {
        let method_caps = 1..=SpecialMethod::ALL.len() as u32;
        if !method_caps.contains(&self.max_methods_per_session)
            || !method_caps.contains(&self.max_methods_per_week)
        {
            return Err(AppError::config(format!(
                "max special methods per session ({}) and per week ({}) must be within {}-{}",
                self.max_methods_per_session,
                self.max_methods_per_week,
                method_caps.start(),
                method_caps.end()
            )));
        }
        if !(1..=schedule::MAX_SESSIONS_PER_WEEK).contains(&self.sessions_per_week) {
            return Err(AppError::config(format!(
                "sessions_per_week {} outside 1-{}",
                self.sessions_per_week,
                schedule::MAX_SESSIONS_PER_WEEK
            )));
        }
        if !(0.0..=percentages::PERCENT_MAX).contains(&self.min_regular_sets_percentage) {
            return Err(AppError::config(format!(
                "min_regular_sets_percentage {} outside 0-100",
                self.min_regular_sets_percentage
            )));
        }
        if !(fatigue::FATIGUE_MIN..=fatigue::FATIGUE_MAX).contains(&self.fatigue_threshold) {
            return Err(AppError::config(format!(
                "fatigue_threshold {} outside 0-10",
                self.fatigue_threshold
            )));
        }
        Ok(())
    }

    /// Largest summed special-method percentage a muscle may receive
    #[must_use]
    pub fn special_method_ceiling(&self) -> f64 {
        percentages::PERCENT_MAX - self.min_regular_sets_percentage
    }

    /// Effective distinct-method cap per muscle and week
    #[must_use]
    pub fn weekly_method_cap(&self) -> usize {
        let session_bound = self
            .max_methods_per_session
            .saturating_mul(self.sessions_per_week);
        self.max_methods_per_week.min(session_bound) as usize
    }
}

/// A method as resolved for one muscle in one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAllocation {
    /// Technique
    pub method: SpecialMethod,
    /// Final share of the muscle's weekly sets
    pub percentage: f64,
    /// Exercise types the technique may be applied to
    pub exercise_types: Vec<ExerciseType>,
}

/// All methods resolved for one muscle group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleGroupAllocation {
    /// Muscle group
    pub muscle_group: MuscleGroupId,
    /// Muscle fatigue used for suppression decisions
    pub fatigue: f64,
    /// Muscle adaptation level
    pub adaptation_level: u8,
    /// Resolved methods, highest percentage first
    pub methods: Vec<ResolvedAllocation>,
    /// Sum of method percentages
    pub total_percentage: f64,
    /// Methods per training session of the week
    pub sessions: Vec<Vec<SpecialMethod>>,
}

/// Distribution resolved for one phase/week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpecificDistribution {
    /// Phase
    pub phase: MesocyclePhase,
    /// Week of the block (1-based)
    pub week: u32,
    /// Total weeks in the block including deload
    pub total_weeks: u32,
    /// Overall fatigue level the distribution was computed under
    pub fatigue_level: f64,
    /// Mean adaptation level across muscles
    pub adaptation_level: f64,
    /// Per-muscle allocations, catalog order
    pub allocations: Vec<MuscleGroupAllocation>,
}

/// Output of the special-method distribution engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionResult {
    /// Strategy name
    pub strategy: String,
    /// Strategy target population
    pub target_population: ExperienceLevel,
    /// Weekly distribution
    pub distribution: PhaseSpecificDistribution,
    /// Sum of every resolved method percentage across muscles
    pub total_special_method_percentage: f64,
    /// `sum(adjusted percentage x fatigue coefficient)`
    pub expected_fatigue_impact: f64,
    /// Scientific and phase rationale for the allocations kept
    pub justifications: Vec<String>,
    /// Constraint and data adjustments
    pub warnings: Vec<EngineWarning>,
}

impl DistributionResult {
    /// Allocation for one muscle group, if it received any method
    #[must_use]
    pub fn allocation_for(&self, muscle: MuscleGroupId) -> Option<&MuscleGroupAllocation> {
        self.distribution
            .allocations
            .iter()
            .find(|a| a.muscle_group == muscle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_experience_levels_are_ordered() {
        assert!(ExperienceLevel::Beginner < ExperienceLevel::Intermediate);
        assert!(ExperienceLevel::Advanced < ExperienceLevel::Elite);
    }

    #[test]
    fn test_weekly_cap_respects_session_bound() {
        let constraints = DistributionConstraints {
            max_methods_per_session: 1,
            max_methods_per_week: 4,
            sessions_per_week: 2,
            ..DistributionConstraints::default()
        };
        assert_eq!(constraints.weekly_method_cap(), 2);
    }

    #[test]
    fn test_malformed_constraints_rejected() {
        let zero_cap = DistributionConstraints {
            max_methods_per_week: 0,
            ..DistributionConstraints::default()
        };
        assert!(zero_cap.validate().is_err());

        let bad_percentage = DistributionConstraints {
            min_regular_sets_percentage: 140.0,
            ..DistributionConstraints::default()
        };
        assert!(bad_percentage.validate().is_err());

        assert!(DistributionConstraints::default().validate().is_ok());
    }

    #[test]
    fn test_schedule_and_cap_bounds() {
        let huge_schedule = DistributionConstraints {
            sessions_per_week: 1 << 31,
            max_methods_per_week: 2,
            ..DistributionConstraints::default()
        };
        let error = huge_schedule.validate().unwrap_err();
        assert_eq!(error.code, ErrorCode::ConfigInvalid);

        let daily = DistributionConstraints {
            sessions_per_week: schedule::MAX_SESSIONS_PER_WEEK,
            ..DistributionConstraints::default()
        };
        assert!(daily.validate().is_ok());

        let eight_days = DistributionConstraints {
            sessions_per_week: schedule::MAX_SESSIONS_PER_WEEK + 1,
            ..DistributionConstraints::default()
        };
        assert!(eight_days.validate().is_err());

        let too_many_methods = DistributionConstraints {
            max_methods_per_session: SpecialMethod::ALL.len() as u32 + 1,
            ..DistributionConstraints::default()
        };
        assert!(too_many_methods.validate().is_err());
    }
}
