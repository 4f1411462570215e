// ABOUTME: Static muscle-group reference data with default volume landmarks
// ABOUTME: Read-only at runtime; the fallback for missing or corrupted landmark rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Muscle-group catalog
//!
//! Default landmarks follow the Renaissance Periodization published weekly
//! set ranges for an intermediate lifter.

use serde::Serialize;

use crate::models::{BodyRegion, Landmarks, MuscleCategory, MuscleGroupId};

/// Immutable reference row for one muscle group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MuscleGroup {
    /// Identity
    pub id: MuscleGroupId,
    /// Human-readable name
    pub display_name: &'static str,
    /// Split category
    pub category: MuscleCategory,
    /// Body region
    pub region: BodyRegion,
    /// 1 = primary mover, 3 = accessory
    pub priority: u8,
    /// Default landmarks applied at onboarding and on data corruption
    pub default_landmarks: Landmarks,
}

const fn row(
    id: MuscleGroupId,
    display_name: &'static str,
    category: MuscleCategory,
    region: BodyRegion,
    priority: u8,
    landmarks: (u32, u32, u32, u32),
) -> MuscleGroup {
    MuscleGroup {
        id,
        display_name,
        category,
        region,
        priority,
        default_landmarks: Landmarks::new(landmarks.0, landmarks.1, landmarks.2, landmarks.3),
    }
}

static MUSCLE_GROUPS: [MuscleGroup; 12] = [
    row(MuscleGroupId::Chest, "Chest", MuscleCategory::Push, BodyRegion::Upper, 1, (8, 10, 16, 22)),
    row(MuscleGroupId::Back, "Back", MuscleCategory::Pull, BodyRegion::Upper, 1, (8, 10, 18, 25)),
    row(MuscleGroupId::Shoulders, "Shoulders", MuscleCategory::Push, BodyRegion::Upper, 2, (6, 8, 19, 26)),
    row(MuscleGroupId::Biceps, "Biceps", MuscleCategory::Pull, BodyRegion::Upper, 2, (5, 8, 17, 26)),
    row(MuscleGroupId::Triceps, "Triceps", MuscleCategory::Push, BodyRegion::Upper, 2, (4, 6, 12, 18)),
    row(MuscleGroupId::Quads, "Quadriceps", MuscleCategory::Legs, BodyRegion::Lower, 1, (6, 8, 15, 20)),
    row(MuscleGroupId::Hamstrings, "Hamstrings", MuscleCategory::Legs, BodyRegion::Lower, 1, (3, 4, 12, 20)),
    row(MuscleGroupId::Glutes, "Glutes", MuscleCategory::Legs, BodyRegion::Lower, 2, (0, 0, 8, 16)),
    row(MuscleGroupId::Calves, "Calves", MuscleCategory::Legs, BodyRegion::Lower, 3, (6, 8, 14, 20)),
    row(MuscleGroupId::Abs, "Abdominals", MuscleCategory::Legs, BodyRegion::Core, 3, (0, 6, 20, 25)),
    row(MuscleGroupId::Traps, "Trapezius", MuscleCategory::Pull, BodyRegion::Upper, 3, (0, 0, 16, 26)),
    row(MuscleGroupId::Forearms, "Forearms", MuscleCategory::Pull, BodyRegion::Upper, 3, (0, 2, 12, 25)),
];

/// Read-only catalog of every muscle group
#[derive(Debug, Clone, Copy, Default)]
pub struct MuscleGroupCatalog;

impl MuscleGroupCatalog {
    /// Every row, in catalog order
    #[must_use]
    pub fn all() -> &'static [MuscleGroup] {
        &MUSCLE_GROUPS
    }

    /// Row for a muscle group
    #[must_use]
    pub fn get(id: MuscleGroupId) -> &'static MuscleGroup {
        // MUSCLE_GROUPS is laid out in MuscleGroupId::ALL order
        &MUSCLE_GROUPS[id as usize]
    }

    /// Default landmarks for a muscle group
    #[must_use]
    pub fn default_landmarks(id: MuscleGroupId) -> Landmarks {
        Self::get(id).default_landmarks
    }

    /// Muscle groups in a split category
    pub fn by_category(category: MuscleCategory) -> impl Iterator<Item = &'static MuscleGroup> {
        MUSCLE_GROUPS.iter().filter(move |m| m.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_default_is_ordered() {
        for group in MuscleGroupCatalog::all() {
            assert!(
                group.default_landmarks.is_ordered(),
                "{} defaults out of order",
                group.id
            );
        }
    }

    #[test]
    fn test_rows_follow_id_order() {
        for (index, id) in MuscleGroupId::ALL.into_iter().enumerate() {
            assert_eq!(MuscleGroupCatalog::all()[index].id, id);
            assert_eq!(MuscleGroupCatalog::get(id).id, id);
        }
    }

    #[test]
    fn test_category_lookup() {
        let push: Vec<_> = MuscleGroupCatalog::by_category(MuscleCategory::Push)
            .map(|m| m.id)
            .collect();
        assert_eq!(
            push,
            vec![MuscleGroupId::Chest, MuscleGroupId::Shoulders, MuscleGroupId::Triceps]
        );
        assert_eq!(
            MuscleGroupCatalog::default_landmarks(MuscleGroupId::Abs),
            Landmarks::new(0, 6, 20, 25)
        );
    }
}
