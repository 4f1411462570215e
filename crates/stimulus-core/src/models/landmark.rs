// ABOUTME: Per-user volume landmark rows (MV/MEV/MAV/MRV) with current and target volume
// ABOUTME: Owns the ordering invariant and the clamping rules applied on every update
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::muscle::MuscleGroupId;
use crate::constants::{onboarding, scales};
use crate::warnings::{EngineWarning, IntegrityIssue};

/// Weekly set-count landmarks for one muscle group
///
/// Must satisfy `mv <= mev <= mav <= mrv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmarks {
    /// Maintenance volume
    pub mv: u32,
    /// Minimum effective volume
    pub mev: u32,
    /// Maximum adaptive volume
    pub mav: u32,
    /// Maximum recoverable volume
    pub mrv: u32,
}

impl Landmarks {
    /// Create a landmark set (ordering is not checked here; see [`Self::is_ordered`])
    #[must_use]
    pub const fn new(mv: u32, mev: u32, mav: u32, mrv: u32) -> Self {
        Self { mv, mev, mav, mrv }
    }

    /// Whether `mv <= mev <= mav <= mrv` holds
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.mv <= self.mev && self.mev <= self.mav && self.mav <= self.mrv
    }

    /// Clamp a weekly set count into `[mv, mrv]`
    #[must_use]
    pub fn clamp_volume(&self, sets: u32) -> u32 {
        sets.clamp(self.mv, self.mrv.max(self.mv))
    }
}

/// Mutable per-user, per-muscle training state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeLandmark {
    /// Owner of the row
    pub user_id: Uuid,
    /// Muscle group the row describes
    pub muscle_group: MuscleGroupId,
    /// Current landmarks
    #[serde(flatten)]
    pub landmarks: Landmarks,
    /// Weekly sets prescribed for (or reported for) the current week
    pub current_volume: u32,
    /// Weekly sets targeted for the coming week
    pub target_volume: u32,
    /// Smoothed recovery estimate (1-10)
    pub recovery_level: u8,
    /// Smoothed adaptation estimate (1-10)
    pub adaptation_level: u8,
    /// Optimistic concurrency version, bumped on every write
    pub version: u64,
    /// Time of the last write
    pub updated_at: DateTime<Utc>,
}

/// Proposed changes to a landmark row; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkUpdate {
    /// Replacement landmarks (rejected if they break the ordering invariant)
    pub landmarks: Option<Landmarks>,
    /// New current weekly volume
    pub current_volume: Option<u32>,
    /// New target weekly volume
    pub target_volume: Option<u32>,
    /// New recovery level
    pub recovery_level: Option<u8>,
    /// New adaptation level
    pub adaptation_level: Option<u8>,
}

impl LandmarkUpdate {
    /// Update touching only the prescribed volumes
    #[must_use]
    pub const fn volumes(current_volume: u32, target_volume: u32) -> Self {
        Self {
            landmarks: None,
            current_volume: Some(current_volume),
            target_volume: Some(target_volume),
            recovery_level: None,
            adaptation_level: None,
        }
    }
}

impl VolumeLandmark {
    /// Fresh row seeded from catalog defaults at onboarding
    #[must_use]
    pub const fn from_defaults(
        user_id: Uuid,
        muscle_group: MuscleGroupId,
        landmarks: Landmarks,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            muscle_group,
            landmarks,
            current_volume: landmarks.mev,
            target_volume: landmarks.mev,
            recovery_level: onboarding::INITIAL_RECOVERY_LEVEL,
            adaptation_level: onboarding::INITIAL_ADAPTATION_LEVEL,
            version: onboarding::INITIAL_VERSION,
            updated_at: now,
        }
    }

    /// Whether every row invariant holds
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let levels = scales::LEVEL_MIN..=scales::LEVEL_MAX;
        self.landmarks.is_ordered()
            && self.landmarks.mv <= self.target_volume
            && self.target_volume <= self.landmarks.mrv
            && self.current_volume <= self.landmarks.mrv
            && levels.contains(&self.recovery_level)
            && levels.contains(&self.adaptation_level)
    }

    /// Ratio of current weekly volume to MRV
    #[must_use]
    pub fn mrv_ratio(&self) -> f64 {
        if self.landmarks.mrv == 0 {
            return 0.0;
        }
        f64::from(self.current_volume) / f64::from(self.landmarks.mrv)
    }

    /// Apply an update, re-validating and clamping every field
    ///
    /// Ordering-violating landmark proposals are rejected and the previous
    /// landmarks kept; if the previous landmarks are themselves broken the
    /// catalog default is substituted. Volumes are clamped so that
    /// `mv <= target <= mrv` and `current <= mrv`, levels into 1-10. The
    /// returned row carries `version + 1`.
    #[must_use]
    pub fn apply_update(
        &self,
        update: &LandmarkUpdate,
        catalog_default: Landmarks,
        now: DateTime<Utc>,
    ) -> (Self, Vec<EngineWarning>) {
        let mut warnings = Vec::new();

        let mut landmarks = if self.landmarks.is_ordered() {
            self.landmarks
        } else {
            warnings.push(EngineWarning::integrity(
                IntegrityIssue::LandmarkOrdering,
                Some(self.muscle_group),
                format!(
                    "stored landmarks {:?} violate mv<=mev<=mav<=mrv; catalog defaults substituted",
                    self.landmarks
                ),
            ));
            catalog_default
        };

        if let Some(proposed) = update.landmarks {
            if proposed.is_ordered() {
                landmarks = proposed;
            } else {
                warnings.push(EngineWarning::integrity(
                    IntegrityIssue::LandmarkOrdering,
                    Some(self.muscle_group),
                    format!("proposed landmarks {proposed:?} rejected: ordering violated"),
                ));
            }
        }

        let target_volume =
            landmarks.clamp_volume(update.target_volume.unwrap_or(self.target_volume));
        let current_volume = update
            .current_volume
            .unwrap_or(self.current_volume)
            .min(landmarks.mrv);

        let recovery_level = self.clamp_level(
            update.recovery_level.unwrap_or(self.recovery_level),
            "recovery_level",
            &mut warnings,
        );
        let adaptation_level = self.clamp_level(
            update.adaptation_level.unwrap_or(self.adaptation_level),
            "adaptation_level",
            &mut warnings,
        );

        let updated = Self {
            user_id: self.user_id,
            muscle_group: self.muscle_group,
            landmarks,
            current_volume,
            target_volume,
            recovery_level,
            adaptation_level,
            version: self.version + 1,
            updated_at: now,
        };
        (updated, warnings)
    }

    fn clamp_level(&self, level: u8, field: &str, warnings: &mut Vec<EngineWarning>) -> u8 {
        let clamped = level.clamp(scales::LEVEL_MIN, scales::LEVEL_MAX);
        if clamped != level {
            warnings.push(EngineWarning::integrity(
                IntegrityIssue::LevelOutOfRange,
                Some(self.muscle_group),
                format!("{field} {level} outside 1-10, clamped to {clamped}"),
            ));
        }
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> VolumeLandmark {
        VolumeLandmark::from_defaults(
            Uuid::new_v4(),
            MuscleGroupId::Chest,
            Landmarks::new(8, 10, 16, 22),
            Utc::now(),
        )
    }

    #[test]
    fn test_target_is_clamped_into_mv_mrv() {
        let base = row();
        let default = base.landmarks;

        let (high, _) = base.apply_update(&LandmarkUpdate::volumes(40, 40), default, Utc::now());
        assert_eq!(high.target_volume, 22);
        assert_eq!(high.current_volume, 22);

        let (low, _) = base.apply_update(&LandmarkUpdate::volumes(0, 0), default, Utc::now());
        assert_eq!(low.target_volume, 8);
        assert_eq!(low.current_volume, 0);
        assert!(low.is_consistent());
    }

    #[test]
    fn test_unordered_proposal_is_rejected_and_previous_kept() {
        let base = row();
        let update = LandmarkUpdate {
            landmarks: Some(Landmarks::new(12, 10, 16, 22)),
            ..LandmarkUpdate::default()
        };
        let (updated, warnings) = base.apply_update(&update, base.landmarks, Utc::now());
        assert_eq!(updated.landmarks, base.landmarks);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].is_data_integrity());
        assert_eq!(updated.version, base.version + 1);
    }

    #[test]
    fn test_corrupted_stored_landmarks_fall_back_to_catalog() {
        let mut base = row();
        base.landmarks = Landmarks::new(30, 10, 5, 2);
        let default = Landmarks::new(8, 10, 16, 22);
        let (updated, warnings) = base.apply_update(&LandmarkUpdate::default(), default, Utc::now());
        assert_eq!(updated.landmarks, default);
        assert!(updated.is_consistent());
        assert!(!warnings.is_empty());
    }

    #[test]
    fn test_levels_are_clamped() {
        let base = row();
        let update = LandmarkUpdate {
            recovery_level: Some(0),
            adaptation_level: Some(14),
            ..LandmarkUpdate::default()
        };
        let (updated, warnings) = base.apply_update(&update, base.landmarks, Utc::now());
        assert_eq!(updated.recovery_level, 1);
        assert_eq!(updated.adaptation_level, 10);
        assert_eq!(warnings.len(), 2);
    }
}
