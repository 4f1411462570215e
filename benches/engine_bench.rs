// ABOUTME: Criterion benchmarks for the auto-regulation algorithms
// ABOUTME: Measures fatigue aggregation over feedback windows and weekly method distribution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the auto-regulation algorithms.
//!
//! Measures how fatigue aggregation scales with feedback history size and
//! how long one weekly special-method distribution takes per strategy.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]
#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stimulus_engine::models::{
    AutoRegulationFeedback, ContributionRole, DistributionConstraints, ExerciseContribution,
    ExerciseType, MesocyclePhase, MesocycleState, MuscleContribution, MuscleGroupId,
    SessionFeedback, VolumeLandmark,
};
use stimulus_engine::{MuscleGroupCatalog, StrategyCatalog};
use stimulus_intelligence::{
    AggregationInput, AutoRegulationAggregator, BlockPosition, DistributionRequest,
    MuscleReadiness, SpecialMethodDistributionEngine,
};
use uuid::Uuid;

fn bench_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap()
}

/// Feedback history with one session every 12 hours, rotating through the catalog
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn generate_feedback(user_id: Uuid, count: usize) -> Vec<SessionFeedback> {
    let muscles = MuscleGroupId::ALL;
    (0..count)
        .map(|index| {
            let primary = muscles[index % muscles.len()];
            let secondary = muscles[(index + 3) % muscles.len()];
            let score = |offset: usize| 1 + ((index + offset) % 10) as u8;
            SessionFeedback {
                id: Uuid::new_v4(),
                user_id,
                session_id: Uuid::new_v4(),
                recorded_at: bench_now() - Duration::hours(12 * (index as i64 + 1)),
                feedback: AutoRegulationFeedback {
                    pump_quality: score(0),
                    muscle_soreness: score(3),
                    perceived_effort: score(5),
                    energy_level: score(7),
                    sleep_quality: score(2),
                },
                exercises: vec![ExerciseContribution {
                    exercise_id: format!("bench_exercise_{index}"),
                    exercise_type: ExerciseType::Compound,
                    sets: 3 + (index % 3) as u32,
                    muscles: vec![
                        MuscleContribution {
                            muscle_group: primary,
                            role: ContributionRole::Primary,
                            percentage: 70.0,
                        },
                        MuscleContribution {
                            muscle_group: secondary,
                            role: ContributionRole::Secondary,
                            percentage: 30.0,
                        },
                    ],
                }],
            }
        })
        .collect()
}

fn onboarded_rows(user_id: Uuid) -> Vec<VolumeLandmark> {
    MuscleGroupCatalog::all()
        .iter()
        .map(|m| VolumeLandmark::from_defaults(user_id, m.id, m.default_landmarks, bench_now()))
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let aggregator = AutoRegulationAggregator::default();
    let user_id = Uuid::new_v4();
    let landmarks = onboarded_rows(user_id);
    let state = MesocycleState::new(user_id, bench_now());

    let mut group = c.benchmark_group("aggregate");
    for size in [0_usize, 6, 60, 600] {
        let records = generate_feedback(user_id, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let input = AggregationInput {
                    user_id,
                    as_of: bench_now(),
                    records,
                    landmarks: &landmarks,
                    state: Some(&state),
                };
                black_box(aggregator.aggregate(black_box(&input)))
            });
        });
    }
    group.finish();
}

fn bench_distribute(c: &mut Criterion) {
    let engine = SpecialMethodDistributionEngine::default();
    let catalog = StrategyCatalog::builtin();
    let constraints = DistributionConstraints::default();
    let readiness: Vec<MuscleReadiness> = MuscleGroupId::ALL
        .into_iter()
        .enumerate()
        .map(|(index, muscle_group)| MuscleReadiness {
            muscle_group,
            fatigue: 3.0 + (index % 5) as f64,
            adaptation_level: 5,
        })
        .collect();

    let mut group = c.benchmark_group("distribute");
    for strategy in catalog.strategies() {
        let request = DistributionRequest {
            strategy,
            constraints: &constraints,
            position: BlockPosition {
                phase: MesocyclePhase::Accumulation,
                week: 3,
                total_weeks: 6,
            },
            overall_fatigue: 5.0,
            readiness: &readiness,
        };
        group.bench_function(strategy.name.as_str(), |b| {
            b.iter(|| black_box(engine.distribute(black_box(&request)).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_distribute);
criterion_main!(benches);
