// ABOUTME: Integration tests for concurrent writers on the same user
// ABOUTME: Verifies optimistic versioning yields exactly one weekly advance and no lost updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::as_of;
use stimulus_engine::database::{FeedbackSource, TrainingStateStore};
use stimulus_engine::models::{MuscleGroupId, WeeklyAdvance};
use stimulus_engine::service::TrainingCoreService;
use tokio::task::JoinSet;
use uuid::Uuid;

async fn race_advances<S>(service: Arc<TrainingCoreService<S>>, user: Uuid) -> Vec<WeeklyAdvance>
where
    S: TrainingStateStore + FeedbackSource + 'static,
{
    let mut tasks = JoinSet::new();
    for _ in 0..4 {
        let service = Arc::clone(&service);
        tasks.spawn(async move { service.advance_mesocycle_week_at(user, as_of()).await });
    }
    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.unwrap().unwrap());
    }
    results
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_advances_apply_once_in_memory() {
    let (_, service) = common::memory_service();
    let service = Arc::new(service);
    let user = Uuid::new_v4();
    service.landmarks(user).await.unwrap();

    let results = race_advances(Arc::clone(&service), user).await;

    let applied = results.iter().filter(|a| !a.already_applied).count();
    assert_eq!(applied, 1);
    assert!(results.iter().all(|a| a.week_in_block == 2));
    let state = service.mesocycle_state(user).await.unwrap();
    assert_eq!(state.version, 1);
    assert_eq!(state.week_in_block, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_advances_apply_once_in_sqlite() {
    let (_, service) = common::sqlite_service().await;
    let service = Arc::new(service);
    let user = Uuid::new_v4();
    service.landmarks(user).await.unwrap();

    let results = race_advances(Arc::clone(&service), user).await;

    assert_eq!(results.iter().filter(|a| !a.already_applied).count(), 1);
    let chest = service
        .store()
        .landmark(user, MuscleGroupId::Chest)
        .await
        .unwrap();
    assert_eq!(chest.version, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_volume_reports_are_not_lost() {
    let (_, service) = common::memory_service();
    let service = Arc::new(service);
    let user = Uuid::new_v4();
    service.landmarks(user).await.unwrap();

    let mut tasks = JoinSet::new();
    for sets in 10..14 {
        let service = Arc::clone(&service);
        tasks.spawn(async move {
            service
                .record_performed_volume(user, MuscleGroupId::Back, sets)
                .await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    let back = service
        .store()
        .landmark(user, MuscleGroupId::Back)
        .await
        .unwrap();
    assert_eq!(back.version, 4);
    assert!((10..14).contains(&back.current_volume));
}
