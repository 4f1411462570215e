// ABOUTME: Process-local training state store backed by sharded concurrent maps
// ABOUTME: Same versioning semantics as the SQLite backend; used by tests and ephemeral runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use stimulus_core::models::{
    LandmarkUpdate, MesocycleState, MuscleGroupId, SessionFeedback, VolumeLandmark,
};
use stimulus_core::{AppError, AppResult};
use tracing::debug;
use uuid::Uuid;

use super::{
    onboarding_rows, reseeded_row, versioned_update, FeedbackSource, LandmarkChange, TrainingStateStore,
    WeekCommit,
};

/// Everything stored for one user; mutated only under the map's entry lock
#[derive(Debug, Clone)]
struct UserRecord {
    landmarks: BTreeMap<MuscleGroupId, VolumeLandmark>,
    state: MesocycleState,
}

impl UserRecord {
    fn onboard(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            landmarks: onboarding_rows(user_id, now)
                .into_iter()
                .map(|row| (row.muscle_group, row))
                .collect(),
            state: MesocycleState::new(user_id, now),
        }
    }
}

/// In-memory [`TrainingStateStore`] and [`FeedbackSource`]
///
/// `DashMap` shards give each user an independent lock, so writers for
/// different users never contend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrainingStore {
    users: Arc<DashMap<Uuid, UserRecord>>,
    feedback: Arc<DashMap<Uuid, Vec<SessionFeedback>>>,
}

impl InMemoryTrainingStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a landmark row as-is, bypassing validation and version checks
    ///
    /// Intended for imports and fixtures that reproduce rows written by
    /// older releases.
    pub fn import_landmark(&self, row: VolumeLandmark) {
        let mut record = self
            .users
            .entry(row.user_id)
            .or_insert_with(|| UserRecord::onboard(row.user_id, row.updated_at));
        record.landmarks.insert(row.muscle_group, row);
    }

    /// Remove a landmark row, leaving the rest of the user's state intact
    pub fn remove_landmark(&self, user_id: Uuid, muscle: MuscleGroupId) -> Option<VolumeLandmark> {
        self.users
            .get_mut(&user_id)
            .and_then(|mut record| record.landmarks.remove(&muscle))
    }

    /// Store a phase state as-is, bypassing version checks
    pub fn import_state(&self, state: MesocycleState) {
        let mut record = self
            .users
            .entry(state.user_id)
            .or_insert_with(|| UserRecord::onboard(state.user_id, state.updated_at));
        record.state = state;
    }
}

#[async_trait]
impl TrainingStateStore for InMemoryTrainingStore {
    async fn landmarks(&self, user_id: Uuid) -> AppResult<Vec<VolumeLandmark>> {
        let record = self
            .users
            .entry(user_id)
            .or_insert_with(|| UserRecord::onboard(user_id, Utc::now()));
        Ok(record.landmarks.values().cloned().collect())
    }

    async fn landmark(&self, user_id: Uuid, muscle: MuscleGroupId) -> AppResult<VolumeLandmark> {
        let now = Utc::now();
        let mut record = self
            .users
            .entry(user_id)
            .or_insert_with(|| UserRecord::onboard(user_id, now));
        let row = record
            .landmarks
            .entry(muscle)
            .or_insert_with(|| reseeded_row(user_id, muscle, now).0);
        Ok(row.clone())
    }

    async fn update_landmark(
        &self,
        user_id: Uuid,
        muscle: MuscleGroupId,
        update: &LandmarkUpdate,
        expected_version: u64,
    ) -> AppResult<LandmarkChange> {
        let now = Utc::now();
        let mut record = self
            .users
            .entry(user_id)
            .or_insert_with(|| UserRecord::onboard(user_id, now));
        let mut warnings = Vec::new();
        let current = match record.landmarks.get(&muscle) {
            Some(row) => row.clone(),
            None => {
                let (row, warning) = reseeded_row(user_id, muscle, now);
                warnings.push(warning);
                row
            }
        };
        let mut change = versioned_update(&current, update, expected_version, now)?;
        record.landmarks.insert(muscle, change.landmark.clone());
        warnings.append(&mut change.warnings);
        change.warnings = warnings;
        debug!(user_id = %user_id, muscle_group = %muscle, version = change.landmark.version, "landmark updated");
        Ok(change)
    }

    async fn mesocycle_state(&self, user_id: Uuid) -> AppResult<MesocycleState> {
        let record = self
            .users
            .entry(user_id)
            .or_insert_with(|| UserRecord::onboard(user_id, Utc::now()));
        Ok(record.state.clone())
    }

    async fn commit_week(&self, commit: &WeekCommit) -> AppResult<()> {
        let user_id = commit.user_id();
        let mut record = self
            .users
            .entry(user_id)
            .or_insert_with(|| UserRecord::onboard(user_id, commit.state.updated_at));

        // validate everything before touching anything
        if record.state.version != commit.expected_state_version {
            return Err(AppError::conflict(
                "mesocycle state",
                commit.expected_state_version,
                record.state.version,
            )
            .with_user_id(user_id));
        }
        for write in &commit.landmarks {
            let stored = record
                .landmarks
                .get(&write.row.muscle_group)
                .map_or(0, |row| row.version);
            if stored != write.expected_version {
                return Err(AppError::conflict(
                    format!("landmark {}", write.row.muscle_group),
                    write.expected_version,
                    stored,
                )
                .with_user_id(user_id));
            }
        }

        record.state = commit.state.clone();
        for write in &commit.landmarks {
            record
                .landmarks
                .insert(write.row.muscle_group, write.row.clone());
        }
        debug!(user_id = %user_id, state_version = commit.state.version, "week committed");
        Ok(())
    }

    async fn users(&self) -> AppResult<Vec<Uuid>> {
        let mut users: Vec<Uuid> = self.users.iter().map(|entry| *entry.key()).collect();
        for entry in self.feedback.iter() {
            if !users.contains(entry.key()) {
                users.push(*entry.key());
            }
        }
        users.sort_unstable();
        Ok(users)
    }
}

#[async_trait]
impl FeedbackSource for InMemoryTrainingStore {
    async fn record_feedback(&self, feedback: &SessionFeedback) -> AppResult<()> {
        feedback.validate()?;
        let mut records = self.feedback.entry(feedback.user_id).or_default();
        if records.iter().any(|r| r.id == feedback.id) {
            return Err(AppError::invalid_input(format!(
                "feedback record {} already stored",
                feedback.id
            )));
        }
        records.push(feedback.clone());
        Ok(())
    }

    async fn feedback_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<SessionFeedback>> {
        let mut window: Vec<SessionFeedback> = self
            .feedback
            .get(&user_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.recorded_at > from && r.recorded_at <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        window.sort_by_key(|r| r.recorded_at);
        Ok(window)
    }
}
