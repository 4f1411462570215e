// ABOUTME: Demo data seeding for stimulus-cli
// ABOUTME: Records a push/pull/legs week of session feedback and the matching performed volume
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::{Duration, Utc};
use serde_json::json;
use stimulus_engine::database::{FeedbackSource, TrainingStateStore};
use stimulus_engine::models::{
    AutoRegulationFeedback, ContributionRole, ExerciseContribution, ExerciseType,
    MuscleContribution, MuscleGroupId, SessionFeedback,
};
use stimulus_engine::service::TrainingCoreService;
use tracing::info;
use uuid::Uuid;

use super::print_json;

fn contribution(
    muscle_group: MuscleGroupId,
    role: ContributionRole,
    percentage: f64,
) -> MuscleContribution {
    MuscleContribution {
        muscle_group,
        role,
        percentage,
    }
}

fn exercise(
    exercise_id: &str,
    exercise_type: ExerciseType,
    sets: u32,
    muscles: Vec<MuscleContribution>,
) -> ExerciseContribution {
    ExerciseContribution {
        exercise_id: exercise_id.to_owned(),
        exercise_type,
        sets,
        muscles,
    }
}

fn demo_week() -> Vec<(i64, AutoRegulationFeedback, Vec<ExerciseContribution>)> {
    use ContributionRole::{Primary, Secondary};
    use MuscleGroupId::{Back, Biceps, Chest, Glutes, Hamstrings, Quads, Shoulders, Triceps};

    let push = vec![
        exercise(
            "barbell_bench_press",
            ExerciseType::Compound,
            4,
            vec![
                contribution(Chest, Primary, 100.0),
                contribution(Triceps, Secondary, 50.0),
                contribution(Shoulders, Secondary, 30.0),
            ],
        ),
        exercise(
            "cable_lateral_raise",
            ExerciseType::Machine,
            3,
            vec![contribution(Shoulders, Primary, 100.0)],
        ),
    ];
    let pull = vec![
        exercise(
            "chest_supported_row",
            ExerciseType::Machine,
            4,
            vec![
                contribution(Back, Primary, 100.0),
                contribution(Biceps, Secondary, 40.0),
            ],
        ),
        exercise(
            "incline_curl",
            ExerciseType::Isolation,
            3,
            vec![contribution(Biceps, Primary, 100.0)],
        ),
    ];
    let legs = vec![
        exercise(
            "back_squat",
            ExerciseType::Compound,
            4,
            vec![
                contribution(Quads, Primary, 100.0),
                contribution(Glutes, Secondary, 60.0),
            ],
        ),
        exercise(
            "romanian_deadlift",
            ExerciseType::Compound,
            3,
            vec![
                contribution(Hamstrings, Primary, 100.0),
                contribution(Glutes, Secondary, 50.0),
            ],
        ),
    ];

    let scores = |pump, soreness, effort, energy, sleep| AutoRegulationFeedback {
        pump_quality: pump,
        muscle_soreness: soreness,
        perceived_effort: effort,
        energy_level: energy,
        sleep_quality: sleep,
    };
    vec![
        (5, scores(7, 4, 7, 7, 7), push),
        (3, scores(6, 5, 7, 6, 6), pull),
        (1, scores(6, 6, 8, 6, 6), legs),
    ]
}

/// Record the demo week for `user_id` and print the resulting snapshot
pub async fn seed<S>(service: &TrainingCoreService<S>, user_id: Uuid) -> Result<()>
where
    S: TrainingStateStore + FeedbackSource + 'static,
{
    let now = Utc::now();
    let mut recorded = 0_usize;
    for (days_ago, feedback, exercises) in demo_week() {
        let record = SessionFeedback {
            id: Uuid::new_v4(),
            user_id,
            session_id: Uuid::new_v4(),
            recorded_at: now - Duration::days(days_ago),
            feedback,
            exercises,
        };
        service.record_feedback(&record).await?;
        recorded += 1;
    }
    info!(user_id = %user_id, sessions = recorded, "demo week recorded");

    let snapshot = service.compute_fatigue_snapshot(user_id).await?;
    print_json(&json!({
        "user_id": user_id,
        "sessions_recorded": recorded,
        "snapshot": snapshot,
    }))
}
