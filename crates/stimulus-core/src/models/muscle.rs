// ABOUTME: Muscle group identity, training category, and body region enumerations
// ABOUTME: Closed enums so catalog lookups and storage keys are checked at compile time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Identity of a trainable muscle group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroupId {
    /// Pectorals
    Chest,
    /// Lats and upper back
    Back,
    /// Side and rear deltoids
    Shoulders,
    /// Elbow flexors
    Biceps,
    /// Elbow extensors
    Triceps,
    /// Knee extensors
    Quads,
    /// Knee flexors and hip extensors
    Hamstrings,
    /// Gluteal complex
    Glutes,
    /// Gastrocnemius and soleus
    Calves,
    /// Abdominals
    Abs,
    /// Upper trapezius
    Traps,
    /// Wrist flexors and extensors
    Forearms,
}

impl MuscleGroupId {
    /// Every muscle group, in catalog order
    pub const ALL: [Self; 12] = [
        Self::Chest,
        Self::Back,
        Self::Shoulders,
        Self::Biceps,
        Self::Triceps,
        Self::Quads,
        Self::Hamstrings,
        Self::Glutes,
        Self::Calves,
        Self::Abs,
        Self::Traps,
        Self::Forearms,
    ];

    /// Convert to storage string representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chest => "chest",
            Self::Back => "back",
            Self::Shoulders => "shoulders",
            Self::Biceps => "biceps",
            Self::Triceps => "triceps",
            Self::Quads => "quads",
            Self::Hamstrings => "hamstrings",
            Self::Glutes => "glutes",
            Self::Calves => "calves",
            Self::Abs => "abs",
            Self::Traps => "traps",
            Self::Forearms => "forearms",
        }
    }
}

impl fmt::Display for MuscleGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MuscleGroupId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|muscle| muscle.as_str() == normalized)
            .ok_or_else(|| {
                AppError::invalid_input(format!("Unknown muscle group: '{s}'"))
                    .with_resource_id(s)
            })
    }
}

/// Training split category a muscle group belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleCategory {
    /// Pressing musculature
    Push,
    /// Pulling musculature
    Pull,
    /// Lower body and trunk
    Legs,
}

/// Body region a muscle group sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    /// Arms, shoulders, chest, and back
    Upper,
    /// Hips and legs
    Lower,
    /// Trunk
    Core,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_id() {
        for muscle in MuscleGroupId::ALL {
            assert_eq!(muscle.as_str().parse::<MuscleGroupId>().ok(), Some(muscle));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(" Chest ".parse::<MuscleGroupId>().ok(), Some(MuscleGroupId::Chest));
        assert!("neck".parse::<MuscleGroupId>().is_err());
    }
}
