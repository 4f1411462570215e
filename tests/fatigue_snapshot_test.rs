// ABOUTME: Integration tests for fatigue snapshots computed through the service facade
// ABOUTME: Covers fresh and empty windows, deload triggers, and feedback validation on both backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration;
use common::{as_of, exhausted_scores, fresh_scores, recent_sessions, scores, session};
use stimulus_engine::errors::{EngineWarning, ErrorCode, IntegrityIssue};
use stimulus_engine::models::{DataConfidence, DeloadTrigger, MuscleGroupId, RecoveryTrend};
use uuid::Uuid;

const EPSILON: f64 = 1e-9;

#[tokio::test]
async fn test_well_recovered_sessions_give_low_fatigue() {
    let (_, service) = common::memory_service();
    let user = Uuid::new_v4();
    for record in recent_sessions(user, 3, fresh_scores(), MuscleGroupId::Chest) {
        service.record_feedback(&record).await.unwrap();
    }

    let snapshot = service
        .compute_fatigue_snapshot_at(user, as_of())
        .await
        .unwrap();

    assert_eq!(snapshot.records_in_window, 3);
    assert!(snapshot.overall_fatigue < 4.0);
    assert!((snapshot.overall_fatigue - 1.35).abs() < EPSILON);
    assert!(!snapshot.deload_recommended);
    assert!(snapshot.deload_triggers.is_empty());
    assert_eq!(snapshot.recovery_trend, RecoveryTrend::Stable);
    assert_eq!(snapshot.confidence, DataConfidence::Moderate);
    let chest = snapshot.fatigue_for(MuscleGroupId::Chest).unwrap();
    assert!((chest - snapshot.overall_fatigue).abs() < EPSILON);
    assert!(snapshot.fatigue_for(MuscleGroupId::Quads).is_none());
}

#[tokio::test]
async fn test_sqlite_backend_gives_same_snapshot() {
    let (_, service) = common::sqlite_service().await;
    let user = Uuid::new_v4();
    for record in recent_sessions(user, 3, fresh_scores(), MuscleGroupId::Chest) {
        service.record_feedback(&record).await.unwrap();
    }

    let snapshot = service
        .compute_fatigue_snapshot_at(user, as_of())
        .await
        .unwrap();
    assert_eq!(snapshot.records_in_window, 3);
    assert!((snapshot.overall_fatigue - 1.35).abs() < EPSILON);
}

#[tokio::test]
async fn test_empty_window_gives_neutral_snapshot() {
    let (_, service) = common::memory_service();
    let user = Uuid::new_v4();

    let snapshot = service
        .compute_fatigue_snapshot_at(user, as_of())
        .await
        .unwrap();

    assert_eq!(snapshot.records_in_window, 0);
    assert!((snapshot.overall_fatigue - 5.0).abs() < EPSILON);
    assert_eq!(snapshot.recovery_trend, RecoveryTrend::Stable);
    assert_eq!(snapshot.confidence, DataConfidence::Low);
    assert!(!snapshot.deload_recommended);
    assert!(snapshot.warnings.iter().any(|w| matches!(
        w,
        EngineWarning::DataIntegrity {
            issue: IntegrityIssue::NoFeedbackInWindow,
            ..
        }
    )));
}

#[tokio::test]
async fn test_records_outside_window_are_ignored() {
    let (_, service) = common::memory_service();
    let user = Uuid::new_v4();
    let stale = session(
        user,
        as_of() - Duration::days(20),
        exhausted_scores(),
        MuscleGroupId::Back,
        6,
    );
    let future = session(
        user,
        as_of() + Duration::hours(1),
        exhausted_scores(),
        MuscleGroupId::Back,
        6,
    );
    service.record_feedback(&stale).await.unwrap();
    service.record_feedback(&future).await.unwrap();

    let snapshot = service
        .compute_fatigue_snapshot_at(user, as_of())
        .await
        .unwrap();
    assert_eq!(snapshot.records_in_window, 0);
    assert!((snapshot.overall_fatigue - 5.0).abs() < EPSILON);
}

#[tokio::test]
async fn test_high_fatigue_recommends_deload() {
    let (_, service) = common::memory_service();
    let user = Uuid::new_v4();
    for record in recent_sessions(user, 3, exhausted_scores(), MuscleGroupId::Quads) {
        service.record_feedback(&record).await.unwrap();
    }

    let snapshot = service
        .compute_fatigue_snapshot_at(user, as_of())
        .await
        .unwrap();
    assert!(snapshot.overall_fatigue >= 7.0);
    assert!(snapshot.deload_recommended);
    assert!(snapshot
        .deload_triggers
        .contains(&DeloadTrigger::OverallFatigue));
    assert_eq!(snapshot.consecutive_high_fatigue_windows, 1);
}

#[tokio::test]
async fn test_worsening_feedback_is_declining_trend() {
    let (_, service) = common::memory_service();
    let user = Uuid::new_v4();
    let feedback = [
        fresh_scores(),
        fresh_scores(),
        exhausted_scores(),
        exhausted_scores(),
    ];
    for (days, scores) in (1..=4).rev().zip(feedback) {
        let record = session(
            user,
            as_of() - Duration::days(days),
            scores,
            MuscleGroupId::Biceps,
            3,
        );
        service.record_feedback(&record).await.unwrap();
    }

    let snapshot = service
        .compute_fatigue_snapshot_at(user, as_of())
        .await
        .unwrap();
    assert_eq!(snapshot.recovery_trend, RecoveryTrend::Declining);
    assert_eq!(snapshot.confidence, DataConfidence::High);
}

#[tokio::test]
async fn test_out_of_range_scores_are_rejected() {
    let (_, service) = common::memory_service();
    let user = Uuid::new_v4();
    let record = session(
        user,
        as_of(),
        scores(11, 5, 5, 5, 5),
        MuscleGroupId::Chest,
        3,
    );

    let error = service.record_feedback(&record).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);

    let snapshot = service
        .compute_fatigue_snapshot_at(user, as_of())
        .await
        .unwrap();
    assert_eq!(snapshot.records_in_window, 0);
}

#[tokio::test]
async fn test_duplicate_feedback_is_rejected() {
    let (_, service) = common::sqlite_service().await;
    let user = Uuid::new_v4();
    let record = session(user, as_of(), fresh_scores(), MuscleGroupId::Chest, 3);

    service.record_feedback(&record).await.unwrap();
    let error = service.record_feedback(&record).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
}
