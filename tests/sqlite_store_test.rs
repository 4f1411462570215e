// ABOUTME: Integration tests for the SQLite training state store
// ABOUTME: Covers versioned writes, atomic weekly commits, feedback ranges, and file persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration;
use common::{as_of, fresh_scores, session};
use stimulus_engine::database::{
    FeedbackSource, LandmarkWrite, SqliteTrainingStore, TrainingStateStore, WeekCommit,
};
use stimulus_engine::errors::ErrorCode;
use stimulus_engine::models::{LandmarkUpdate, MesocyclePhase, MuscleGroupId};
use tempfile::TempDir;
use uuid::Uuid;

async fn memory_store() -> SqliteTrainingStore {
    common::init_test_logging();
    SqliteTrainingStore::connect("sqlite::memory:").await.unwrap()
}

#[tokio::test]
async fn test_onboarding_persists_initial_state() {
    let store = memory_store().await;
    let user = Uuid::new_v4();

    let rows = store.landmarks(user).await.unwrap();
    assert_eq!(rows.len(), MuscleGroupId::ALL.len());
    let muscles: Vec<MuscleGroupId> = rows.iter().map(|r| r.muscle_group).collect();
    assert_eq!(muscles, MuscleGroupId::ALL.to_vec());

    let state = store.mesocycle_state(user).await.unwrap();
    assert_eq!(state.phase, MesocyclePhase::Accumulation);
    assert_eq!(state.block_number, 1);
    assert_eq!(state.week_in_block, 1);
    assert_eq!(state.version, 0);
    assert!(state.last_advanced_at.is_none());
    assert_eq!(store.users().await.unwrap(), vec![user]);
}

#[tokio::test]
async fn test_stale_landmark_write_conflicts() {
    let store = memory_store().await;
    let user = Uuid::new_v4();
    let update = LandmarkUpdate::volumes(12, 12);

    let change = store
        .update_landmark(user, MuscleGroupId::Back, &update, 0)
        .await
        .unwrap();
    assert_eq!(change.landmark.version, 1);

    let error = store
        .update_landmark(user, MuscleGroupId::Back, &update, 0)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ConcurrentUpdateConflict);
    assert!(error.is_retryable());

    let stored = store.landmark(user, MuscleGroupId::Back).await.unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.current_volume, 12);
}

#[tokio::test]
async fn test_week_commit_is_all_or_nothing() {
    let store = memory_store().await;
    let user = Uuid::new_v4();
    let state = store.mesocycle_state(user).await.unwrap();
    let rows = store.landmarks(user).await.unwrap();

    let mut next_state = state.clone();
    next_state.week_in_block = 2;
    next_state.version = 1;
    let mut landmarks: Vec<LandmarkWrite> = rows
        .iter()
        .map(|row| {
            let mut next = row.clone();
            next.current_volume = row.landmarks.mav;
            next.version = row.version + 1;
            LandmarkWrite {
                row: next,
                expected_version: row.version,
            }
        })
        .collect();
    // last row was read at a version that has since moved on
    let last = landmarks.len() - 1;
    landmarks[last].expected_version = 7;
    let commit = WeekCommit {
        state: next_state,
        expected_state_version: 0,
        landmarks,
    };

    let error = store.commit_week(&commit).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ConcurrentUpdateConflict);

    let state_after = store.mesocycle_state(user).await.unwrap();
    assert_eq!(state_after.version, 0);
    assert_eq!(state_after.week_in_block, 1);
    for (before, after) in rows.iter().zip(store.landmarks(user).await.unwrap()) {
        assert_eq!(before.version, after.version);
        assert_eq!(before.current_volume, after.current_volume);
    }
}

#[tokio::test]
async fn test_week_commit_against_moved_state_conflicts() {
    let store = memory_store().await;
    let user = Uuid::new_v4();
    let state = store.mesocycle_state(user).await.unwrap();
    let rows = store.landmarks(user).await.unwrap();

    let mut first = state.clone();
    first.version = 1;
    store
        .commit_week(&WeekCommit::new(first, 0, Vec::new(), &rows))
        .await
        .unwrap();

    let mut second = state;
    second.version = 1;
    let error = store
        .commit_week(&WeekCommit::new(second, 0, Vec::new(), &rows))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ConcurrentUpdateConflict);
    assert_eq!(store.mesocycle_state(user).await.unwrap().version, 1);
}

#[tokio::test]
async fn test_feedback_range_excludes_start_and_includes_end() {
    let store = memory_store().await;
    let user = Uuid::new_v4();
    let from = as_of() - Duration::days(14);
    let at_start = session(user, from, fresh_scores(), MuscleGroupId::Chest, 3);
    let inside = session(user, from + Duration::days(3), fresh_scores(), MuscleGroupId::Chest, 3);
    let at_end = session(user, as_of(), fresh_scores(), MuscleGroupId::Back, 3);
    let other_user = session(Uuid::new_v4(), as_of(), fresh_scores(), MuscleGroupId::Back, 3);
    for record in [&at_end, &at_start, &inside, &other_user] {
        store.record_feedback(record).await.unwrap();
    }

    let window = store.feedback_between(user, from, as_of()).await.unwrap();
    let ids: Vec<Uuid> = window.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![inside.id, at_end.id]);
    assert_eq!(window[1], at_end);
}

#[tokio::test]
async fn test_file_database_survives_reconnect() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("stimulus.db").display());
    let user = Uuid::new_v4();

    {
        let store = SqliteTrainingStore::connect(&url).await.unwrap();
        store
            .update_landmark(user, MuscleGroupId::Glutes, &LandmarkUpdate::volumes(6, 6), 0)
            .await
            .unwrap();
        store.pool().close().await;
    }

    let reopened = SqliteTrainingStore::connect(&url).await.unwrap();
    let glutes = reopened.landmark(user, MuscleGroupId::Glutes).await.unwrap();
    assert_eq!(glutes.version, 1);
    assert_eq!(glutes.current_volume, 6);
}

#[tokio::test]
async fn test_advance_round_trips_mrv_streaks() {
    let (store, service) = common::sqlite_service().await;
    let user = Uuid::new_v4();
    let update = LandmarkUpdate {
        current_volume: Some(22),
        recovery_level: Some(9),
        ..LandmarkUpdate::default()
    };
    store
        .update_landmark(user, MuscleGroupId::Chest, &update, 0)
        .await
        .unwrap();

    service
        .advance_mesocycle_week_at(user, as_of())
        .await
        .unwrap();

    let state = store.mesocycle_state(user).await.unwrap();
    assert_eq!(state.mrv_streak(MuscleGroupId::Chest), 1);
    assert_eq!(state.mrv_streak(MuscleGroupId::Back), 0);
    assert_eq!(state.version, 1);
}
