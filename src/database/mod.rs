// ABOUTME: Persistence abstraction for per-user training state and session feedback
// ABOUTME: Optimistically versioned landmark and phase-state storage with SQLite and in-memory backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Training State Storage
//!
//! Every landmark row and every phase state carries a `version`. Writers pass
//! the version they read; a store rejects the write with
//! `ErrorCode::ConcurrentUpdateConflict` when the stored version moved on.
//! The weekly recompute writes the phase state and all landmark rows of one
//! user in a single atomic [`WeekCommit`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stimulus_core::models::{
    LandmarkUpdate, MesocycleState, MuscleGroupId, SessionFeedback, VolumeLandmark,
};
use stimulus_core::warnings::IntegrityIssue;
use stimulus_core::{AppError, AppResult, EngineWarning, MuscleGroupCatalog};
use tracing::warn;
use uuid::Uuid;

/// In-memory backend
pub mod memory;
/// SQLite backend
pub mod sqlite;
/// Transaction guard and conflict retry
pub mod transactions;

pub use memory::InMemoryTrainingStore;
pub use sqlite::SqliteTrainingStore;
pub use transactions::{retry_on_conflict, SqliteTransactionGuard, TransactionGuard};

/// A landmark row after a successful write
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkChange {
    /// Row as persisted
    pub landmark: VolumeLandmark,
    /// Values that were rejected or clamped while applying the update
    pub warnings: Vec<EngineWarning>,
}

/// One landmark row written by a weekly commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandmarkWrite {
    /// New row contents (version already bumped)
    pub row: VolumeLandmark,
    /// Version the row had when it was read; 0 for a row that was never stored
    pub expected_version: u64,
}

/// Everything the weekly advance persists for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekCommit {
    /// New phase state (version already bumped)
    pub state: MesocycleState,
    /// Version the state had when it was read
    pub expected_state_version: u64,
    /// Landmark rows to write
    pub landmarks: Vec<LandmarkWrite>,
}

impl WeekCommit {
    /// Pair planned rows with the versions they were planned from
    #[must_use]
    pub fn new(
        state: MesocycleState,
        expected_state_version: u64,
        planned: Vec<VolumeLandmark>,
        read: &[VolumeLandmark],
    ) -> Self {
        let landmarks = planned
            .into_iter()
            .map(|row| {
                let expected_version = read
                    .iter()
                    .find(|r| r.muscle_group == row.muscle_group)
                    .map_or(0, |r| r.version);
                LandmarkWrite {
                    row,
                    expected_version,
                }
            })
            .collect();
        Self {
            state,
            expected_state_version,
            landmarks,
        }
    }

    /// User the commit belongs to
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.state.user_id
    }
}

/// Per-user landmark and phase-state persistence
#[async_trait]
pub trait TrainingStateStore: Send + Sync {
    /// All landmark rows of a user, catalog order
    ///
    /// A user without rows is onboarded with catalog defaults first.
    async fn landmarks(&self, user_id: Uuid) -> AppResult<Vec<VolumeLandmark>>;

    /// One landmark row, onboarding the user if needed
    ///
    /// A muscle missing from an onboarded user is recreated from catalog
    /// defaults, so this never reports the row as absent.
    async fn landmark(&self, user_id: Uuid, muscle: MuscleGroupId) -> AppResult<VolumeLandmark>;

    /// Apply an update to one row if its stored version equals `expected_version`
    ///
    /// A missing row is recreated at version 0 first and the change carries a
    /// `MissingLandmark` warning.
    async fn update_landmark(
        &self,
        user_id: Uuid,
        muscle: MuscleGroupId,
        update: &LandmarkUpdate,
        expected_version: u64,
    ) -> AppResult<LandmarkChange>;

    /// Phase state of a user, creating the initial state on first access
    async fn mesocycle_state(&self, user_id: Uuid) -> AppResult<MesocycleState>;

    /// Atomically persist a weekly advance
    ///
    /// Either every row and the state are written or nothing is.
    async fn commit_week(&self, commit: &WeekCommit) -> AppResult<()>;

    /// Users with any stored training state or feedback
    async fn users(&self) -> AppResult<Vec<Uuid>>;
}

/// Append-only session feedback feed
#[async_trait]
pub trait FeedbackSource: Send + Sync {
    /// Append one feedback record
    async fn record_feedback(&self, feedback: &SessionFeedback) -> AppResult<()>;

    /// Records of a user with `from < recorded_at <= to`, oldest first
    async fn feedback_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<SessionFeedback>>;
}

/// Fresh landmark rows for every catalog muscle
pub(crate) fn onboarding_rows(user_id: Uuid, now: DateTime<Utc>) -> Vec<VolumeLandmark> {
    MuscleGroupCatalog::all()
        .iter()
        .map(|muscle| {
            VolumeLandmark::from_defaults(user_id, muscle.id, muscle.default_landmarks, now)
        })
        .collect()
}

/// Catalog-default row standing in for one missing from an onboarded user
pub(crate) fn reseeded_row(
    user_id: Uuid,
    muscle: MuscleGroupId,
    now: DateTime<Utc>,
) -> (VolumeLandmark, EngineWarning) {
    warn!(user_id = %user_id, muscle_group = %muscle, "landmark row missing; reseeding catalog defaults");
    let row = VolumeLandmark::from_defaults(
        user_id,
        muscle,
        MuscleGroupCatalog::default_landmarks(muscle),
        now,
    );
    let warning = EngineWarning::integrity(
        IntegrityIssue::MissingLandmark,
        Some(muscle),
        "no stored landmark row; recreated from catalog defaults",
    );
    (row, warning)
}

/// Apply `update` to `current` after checking the caller's version
pub(crate) fn versioned_update(
    current: &VolumeLandmark,
    update: &LandmarkUpdate,
    expected_version: u64,
    now: DateTime<Utc>,
) -> AppResult<LandmarkChange> {
    if current.version != expected_version {
        return Err(AppError::conflict(
            format!("landmark {}", current.muscle_group),
            expected_version,
            current.version,
        )
        .with_user_id(current.user_id));
    }
    let (landmark, warnings) = current.apply_update(
        update,
        MuscleGroupCatalog::default_landmarks(current.muscle_group),
        now,
    );
    Ok(LandmarkChange { landmark, warnings })
}
