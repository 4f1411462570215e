// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides store/service construction, fixed clocks, and session feedback builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::too_many_arguments
)]
//! Shared test utilities for `stimulus_engine`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::env;
use std::sync::{Arc, Once};

use chrono::{DateTime, Duration, TimeZone, Utc};
use stimulus_engine::config::AutoRegulationConfig;
use stimulus_engine::database::{InMemoryTrainingStore, SqliteTrainingStore};
use stimulus_engine::models::{
    AutoRegulationFeedback, ContributionRole, ExerciseContribution, ExerciseType,
    MuscleContribution, MuscleGroupId, SessionFeedback,
};
use stimulus_engine::service::TrainingCoreService;
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Wednesday noon, far from ISO week boundaries
pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap()
}

/// Engine config with millisecond backoff so conflict tests stay fast
pub fn test_config() -> AutoRegulationConfig {
    let mut config = AutoRegulationConfig::default();
    config.concurrency.base_backoff_ms = 1;
    config.concurrency.max_update_attempts = 5;
    config
}

/// In-memory store plus a service over it
pub fn memory_service() -> (
    Arc<InMemoryTrainingStore>,
    TrainingCoreService<InMemoryTrainingStore>,
) {
    init_test_logging();
    let store = Arc::new(InMemoryTrainingStore::new());
    let service = TrainingCoreService::new(Arc::clone(&store), test_config());
    (store, service)
}

/// `SQLite` in-memory store plus a service over it
pub async fn sqlite_service() -> (
    Arc<SqliteTrainingStore>,
    TrainingCoreService<SqliteTrainingStore>,
) {
    init_test_logging();
    let store = Arc::new(SqliteTrainingStore::connect("sqlite::memory:").await.unwrap());
    let service = TrainingCoreService::new(Arc::clone(&store), test_config());
    (store, service)
}

/// Subjective scores in field order pump, soreness, effort, energy, sleep
pub const fn scores(
    pump: u8,
    soreness: u8,
    effort: u8,
    energy: u8,
    sleep: u8,
) -> AutoRegulationFeedback {
    AutoRegulationFeedback {
        pump_quality: pump,
        muscle_soreness: soreness,
        perceived_effort: effort,
        energy_level: energy,
        sleep_quality: sleep,
    }
}

/// Well-recovered session
pub const fn fresh_scores() -> AutoRegulationFeedback {
    scores(9, 2, 8, 9, 8)
}

/// Session that scores 8.0 fatigue with default weights
pub const fn exhausted_scores() -> AutoRegulationFeedback {
    scores(1, 10, 10, 1, 1)
}

/// One-exercise session training `muscle` as prime mover
pub fn session(
    user_id: Uuid,
    recorded_at: DateTime<Utc>,
    feedback: AutoRegulationFeedback,
    muscle: MuscleGroupId,
    sets: u32,
) -> SessionFeedback {
    SessionFeedback {
        id: Uuid::new_v4(),
        user_id,
        session_id: Uuid::new_v4(),
        recorded_at,
        feedback,
        exercises: vec![ExerciseContribution {
            exercise_id: format!("{muscle}_exercise"),
            exercise_type: ExerciseType::Isolation,
            sets,
            muscles: vec![MuscleContribution {
                muscle_group: muscle,
                role: ContributionRole::Primary,
                percentage: 100.0,
            }],
        }],
    }
}

/// `count` sessions on consecutive days ending one day before `as_of()`
pub fn recent_sessions(
    user_id: Uuid,
    count: i64,
    feedback: AutoRegulationFeedback,
    muscle: MuscleGroupId,
) -> Vec<SessionFeedback> {
    (1..=count)
        .rev()
        .map(|days| session(user_id, as_of() - Duration::days(days), feedback, muscle, 4))
        .collect()
}
