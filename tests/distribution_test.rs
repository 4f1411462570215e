// ABOUTME: Integration tests for weekly special-method distribution through the service facade
// ABOUTME: Covers method caps, regular-set ceilings, fatigue suppression, and strategy lookup errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration;
use common::{as_of, exhausted_scores, recent_sessions};
use stimulus_engine::database::TrainingStateStore;
use stimulus_engine::errors::{ConstraintIssue, EngineWarning, ErrorCode};
use stimulus_engine::models::{
    DistributionConstraints, ExperienceLevel, MesocyclePhase, MesocycleState, MuscleGroupId,
    SpecialMethod,
};
use uuid::Uuid;

const EPSILON: f64 = 1e-9;

fn state_in_week(user: Uuid, phase: MesocyclePhase, week: u32) -> MesocycleState {
    let mut state = MesocycleState::new(user, as_of() - Duration::days(21));
    state.phase = phase;
    state.week_in_block = week;
    state
}

fn constraint_issues(warnings: &[EngineWarning], muscle: MuscleGroupId) -> Vec<&ConstraintIssue> {
    warnings
        .iter()
        .filter_map(|w| match w {
            EngineWarning::ConstraintViolation {
                issue,
                muscle_group: Some(m),
                ..
            } if *m == muscle => Some(issue),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_weekly_cap_keeps_two_methods_and_reports_dropped() {
    let (store, service) = common::memory_service();
    let user = Uuid::new_v4();
    store.import_state(state_in_week(user, MesocyclePhase::Accumulation, 3));
    let constraints = DistributionConstraints {
        max_methods_per_week: 2,
        ..DistributionConstraints::default()
    };

    let result = service
        .distribute_special_methods_at(user, "BALANCED", &constraints, as_of())
        .await
        .unwrap();

    let chest = result.allocation_for(MuscleGroupId::Chest).unwrap();
    let kept: Vec<SpecialMethod> = chest.methods.iter().map(|m| m.method).collect();
    assert_eq!(kept, vec![SpecialMethod::Superset, SpecialMethod::MyoRepMatch]);

    let dropped = constraint_issues(&result.warnings, MuscleGroupId::Chest)
        .into_iter()
        .find_map(|issue| match issue {
            ConstraintIssue::MethodCapExceeded { cap, dropped } => Some((*cap, dropped.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(dropped.0, 2);
    assert_eq!(dropped.1, vec![SpecialMethod::DropSet, SpecialMethod::GiantSet]);
}

#[tokio::test]
async fn test_allocations_respect_ceiling_and_session_cap() {
    let (store, service) = common::memory_service();
    let user = Uuid::new_v4();
    store.import_state(state_in_week(user, MesocyclePhase::Intensification, 3));
    let constraints = DistributionConstraints {
        max_methods_per_session: 1,
        max_methods_per_week: 3,
        min_regular_sets_percentage: 75.0,
        sessions_per_week: 3,
        ..DistributionConstraints::default()
    };

    let result = service
        .distribute_special_methods_at(user, "balanced", &constraints, as_of())
        .await
        .unwrap();

    let mut total = 0.0;
    for allocation in &result.distribution.allocations {
        assert!(allocation.total_percentage <= 25.0 + EPSILON);
        assert!(allocation.methods.len() <= 3);
        assert_eq!(allocation.sessions.len(), 3);
        for session in &allocation.sessions {
            assert!(session.len() <= 1);
        }
        total += allocation.total_percentage;
    }
    assert!((result.total_special_method_percentage - total).abs() < EPSILON);
    assert_eq!(result.distribution.phase, MesocyclePhase::Intensification);
    assert_eq!(result.distribution.week, 3);
    assert_eq!(result.distribution.total_weeks, 6);
    assert!(!result.justifications.is_empty());
}

#[tokio::test]
async fn test_fatigued_muscle_gets_no_methods() {
    let (store, service) = common::memory_service();
    let user = Uuid::new_v4();
    store.import_state(state_in_week(user, MesocyclePhase::Accumulation, 3));
    for record in recent_sessions(user, 3, exhausted_scores(), MuscleGroupId::Chest) {
        service.record_feedback(&record).await.unwrap();
    }
    let constraints = DistributionConstraints {
        fatigue_threshold: 7.5,
        ..DistributionConstraints::default()
    };

    let result = service
        .distribute_special_methods_at(user, "BALANCED", &constraints, as_of())
        .await
        .unwrap();

    let chest = result.allocation_for(MuscleGroupId::Chest).unwrap();
    assert!(chest.methods.is_empty());
    assert!(chest.total_percentage.abs() < EPSILON);
    assert!(constraint_issues(&result.warnings, MuscleGroupId::Chest)
        .iter()
        .any(|issue| matches!(issue, ConstraintIssue::FatigueSuppressed { .. })));
}

#[tokio::test]
async fn test_underqualified_trainee_is_derated() {
    let (store, service) = common::memory_service();
    let user = Uuid::new_v4();
    store.import_state(state_in_week(user, MesocyclePhase::Accumulation, 2));
    let intermediate = DistributionConstraints::default();
    let beginner = DistributionConstraints {
        experience_level: ExperienceLevel::Beginner,
        ..DistributionConstraints::default()
    };

    let full = service
        .distribute_special_methods_at(user, "BALANCED", &intermediate, as_of())
        .await
        .unwrap();
    let derated = service
        .distribute_special_methods_at(user, "BALANCED", &beginner, as_of())
        .await
        .unwrap();

    assert!(derated.warnings.iter().any(|w| matches!(
        w,
        EngineWarning::ConstraintViolation {
            issue: ConstraintIssue::ExperienceBelowTarget { .. },
            ..
        }
    )));
    assert!(
        derated.total_special_method_percentage < full.total_special_method_percentage
    );
}

#[tokio::test]
async fn test_unknown_strategy_reads_no_state() {
    let (store, service) = common::memory_service();
    let user = Uuid::new_v4();

    let error = service
        .distribute_special_methods_at(user, "HYPERDRIVE", &DistributionConstraints::default(), as_of())
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::UnknownStrategy);
    assert!(error.message.contains("BALANCED"));
    assert!(store.users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_constraints_are_rejected_before_reads() {
    let (store, service) = common::memory_service();
    let user = Uuid::new_v4();
    let constraints = DistributionConstraints {
        max_methods_per_week: 0,
        ..DistributionConstraints::default()
    };

    let error = service
        .distribute_special_methods_at(user, "BALANCED", &constraints, as_of())
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(store.users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unbounded_session_count_is_rejected() {
    let (store, service) = common::memory_service();
    let user = Uuid::new_v4();
    let constraints = DistributionConstraints {
        sessions_per_week: 1 << 31,
        max_methods_per_week: 2,
        ..DistributionConstraints::default()
    };

    let error = service
        .distribute_special_methods_at(user, "BALANCED", &constraints, as_of())
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("sessions_per_week"));
    assert!(store.users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_distribution_is_deterministic() {
    let (store, service) = common::memory_service();
    let user = Uuid::new_v4();
    store.import_state(state_in_week(user, MesocyclePhase::Accumulation, 4));
    let constraints = DistributionConstraints::default();

    let first = service
        .distribute_special_methods_at(user, "AGGRESSIVE", &constraints, as_of())
        .await
        .unwrap();
    let second = service
        .distribute_special_methods_at(user, "aggressive", &constraints, as_of())
        .await
        .unwrap();
    assert_eq!(first, second);
}
