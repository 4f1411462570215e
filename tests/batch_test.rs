// ABOUTME: Integration tests for the weekly batch advance across all users
// ABOUTME: One user's storage failure is reported without stopping the rest of the batch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::{as_of, fresh_scores, recent_sessions, test_config};
use stimulus_engine::database::{
    FeedbackSource, InMemoryTrainingStore, LandmarkChange, TrainingStateStore, WeekCommit,
};
use stimulus_engine::errors::{AppError, AppResult, ErrorCode};
use stimulus_engine::models::{
    LandmarkUpdate, MesocycleState, MuscleGroupId, SessionFeedback, VolumeLandmark,
};
use stimulus_engine::service::TrainingCoreService;
use uuid::Uuid;

/// In-memory store whose weekly commits fail for one user
struct FailingCommitStore {
    inner: InMemoryTrainingStore,
    broken_user: Uuid,
}

#[async_trait]
impl TrainingStateStore for FailingCommitStore {
    async fn landmarks(&self, user_id: Uuid) -> AppResult<Vec<VolumeLandmark>> {
        self.inner.landmarks(user_id).await
    }

    async fn landmark(&self, user_id: Uuid, muscle: MuscleGroupId) -> AppResult<VolumeLandmark> {
        self.inner.landmark(user_id, muscle).await
    }

    async fn update_landmark(
        &self,
        user_id: Uuid,
        muscle: MuscleGroupId,
        update: &LandmarkUpdate,
        expected_version: u64,
    ) -> AppResult<LandmarkChange> {
        self.inner
            .update_landmark(user_id, muscle, update, expected_version)
            .await
    }

    async fn mesocycle_state(&self, user_id: Uuid) -> AppResult<MesocycleState> {
        self.inner.mesocycle_state(user_id).await
    }

    async fn commit_week(&self, commit: &WeekCommit) -> AppResult<()> {
        if commit.user_id() == self.broken_user {
            return Err(AppError::database("disk I/O error"));
        }
        self.inner.commit_week(commit).await
    }

    async fn users(&self) -> AppResult<Vec<Uuid>> {
        self.inner.users().await
    }
}

#[async_trait]
impl FeedbackSource for FailingCommitStore {
    async fn record_feedback(&self, feedback: &SessionFeedback) -> AppResult<()> {
        self.inner.record_feedback(feedback).await
    }

    async fn feedback_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<SessionFeedback>> {
        self.inner.feedback_between(user_id, from, to).await
    }
}

#[tokio::test]
async fn test_batch_advances_every_known_user() {
    let (_, service) = common::memory_service();
    let onboarded = Uuid::new_v4();
    let with_feedback = Uuid::new_v4();
    service.landmarks(onboarded).await.unwrap();
    for record in recent_sessions(with_feedback, 2, fresh_scores(), MuscleGroupId::Chest) {
        service.record_feedback(&record).await.unwrap();
    }

    let report = service.advance_all_users(as_of()).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(report.total, 2);
    assert_eq!(report.advanced.len(), 2);
    assert!(report.advanced.iter().all(|a| !a.already_applied));

    let rerun = service
        .advance_all_users(as_of() + Duration::hours(6))
        .await
        .unwrap();
    assert!(rerun.advanced.iter().all(|a| a.already_applied));
}

#[tokio::test]
async fn test_one_failing_user_does_not_stop_the_batch() {
    common::init_test_logging();
    let broken_user = Uuid::new_v4();
    let store = Arc::new(FailingCommitStore {
        inner: InMemoryTrainingStore::new(),
        broken_user,
    });
    let service = TrainingCoreService::new(Arc::clone(&store), test_config());
    let healthy: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    for user in healthy.iter().chain([&broken_user]) {
        service.landmarks(*user).await.unwrap();
    }

    let report = service.advance_all_users(as_of()).await.unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.total, 4);
    assert_eq!(report.advanced.len(), 3);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.user_id, broken_user);
    assert_eq!(failure.code, ErrorCode::DatabaseError);
    assert!(!failure.retryable);

    for user in &healthy {
        assert_eq!(service.mesocycle_state(*user).await.unwrap().version, 1);
    }
    assert_eq!(service.mesocycle_state(broken_user).await.unwrap().version, 0);
}
