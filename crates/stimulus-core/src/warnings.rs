// ABOUTME: Recoverable warnings reported next to valid engine results
// ABOUTME: Covers data-integrity substitutions and constraint-driven scaling or dropping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{ExperienceLevel, MuscleGroupId, SpecialMethod};

/// What kind of data problem was recovered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// Landmarks violated `mv <= mev <= mav <= mrv`
    LandmarkOrdering,
    /// No landmark row existed where one was expected
    MissingLandmark,
    /// No feedback records fell inside the aggregation window
    NoFeedbackInWindow,
    /// A recovery or adaptation level was outside 1-10
    LevelOutOfRange,
}

/// Which distribution constraint forced an adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintIssue {
    /// Muscle fatigue above the constraint threshold suppressed all methods
    FatigueSuppressed {
        /// Observed muscle fatigue
        fatigue: f64,
        /// Configured threshold
        threshold: f64,
    },
    /// Summed percentages exceeded `100 - minimum regular sets` and were scaled
    RegularSetCeiling {
        /// Sum before scaling
        raw_percentage: f64,
        /// Permitted ceiling
        ceiling: f64,
    },
    /// More distinct methods than the cap; lowest-percentage ones dropped
    MethodCapExceeded {
        /// Effective cap
        cap: usize,
        /// Methods removed
        dropped: Vec<SpecialMethod>,
    },
    /// Trainee experience below the strategy's target population
    ExperienceBelowTarget {
        /// Trainee experience
        experience: ExperienceLevel,
        /// Strategy target population
        required: ExperienceLevel,
        /// Factor applied to every allocation
        derating_factor: f64,
    },
}

/// Recoverable warning surfaced alongside a valid result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum EngineWarning {
    /// Bad or missing data replaced with safe defaults
    DataIntegrity {
        /// Issue type
        issue: IntegrityIssue,
        /// Affected muscle group, if scoped to one
        muscle_group: Option<MuscleGroupId>,
        /// Human-readable detail
        detail: String,
    },
    /// Strategy output adjusted to satisfy constraints
    ConstraintViolation {
        /// Constraint that forced the adjustment
        issue: ConstraintIssue,
        /// Affected muscle group, if scoped to one
        muscle_group: Option<MuscleGroupId>,
        /// Human-readable detail
        detail: String,
    },
}

impl EngineWarning {
    /// Build a data-integrity warning
    pub fn integrity(
        issue: IntegrityIssue,
        muscle_group: Option<MuscleGroupId>,
        detail: impl Into<String>,
    ) -> Self {
        Self::DataIntegrity {
            issue,
            muscle_group,
            detail: detail.into(),
        }
    }

    /// Build a constraint-violation warning
    pub fn constraint(
        issue: ConstraintIssue,
        muscle_group: Option<MuscleGroupId>,
        detail: impl Into<String>,
    ) -> Self {
        Self::ConstraintViolation {
            issue,
            muscle_group,
            detail: detail.into(),
        }
    }

    /// Whether this is a data-integrity warning
    #[must_use]
    pub const fn is_data_integrity(&self) -> bool {
        matches!(self, Self::DataIntegrity { .. })
    }

    /// Muscle group the warning is scoped to
    #[must_use]
    pub const fn muscle_group(&self) -> Option<MuscleGroupId> {
        match self {
            Self::DataIntegrity { muscle_group, .. }
            | Self::ConstraintViolation { muscle_group, .. } => *muscle_group,
        }
    }

    /// Human-readable detail
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::DataIntegrity { detail, .. } | Self::ConstraintViolation { detail, .. } => detail,
        }
    }
}

impl fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = match self {
            Self::DataIntegrity { .. } => "data_integrity",
            Self::ConstraintViolation { .. } => "constraint_violation",
        };
        match self.muscle_group() {
            Some(muscle) => write!(f, "[{category}] {muscle}: {}", self.detail()),
            None => write!(f, "[{category}] {}", self.detail()),
        }
    }
}
