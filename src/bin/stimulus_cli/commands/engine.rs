// ABOUTME: Snapshot, advance, distribute, and strategy listing commands
// ABOUTME: Thin wrappers that run one service operation and print its JSON result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::{bail, Result};
use chrono::Utc;
use serde::Serialize;
use stimulus_engine::database::{FeedbackSource, TrainingStateStore};
use stimulus_engine::models::{DistributionConstraints, ExperienceLevel};
use stimulus_engine::service::TrainingCoreService;
use tracing::warn;
use uuid::Uuid;

use super::print_json;

/// Distribution constraints as given on the command line
pub struct ConstraintArgs {
    pub max_per_session: u32,
    pub max_per_week: u32,
    pub min_regular: f64,
    pub fatigue_threshold: f64,
    pub experience: ExperienceLevel,
    pub sessions: u32,
}

impl From<ConstraintArgs> for DistributionConstraints {
    fn from(args: ConstraintArgs) -> Self {
        Self {
            max_methods_per_session: args.max_per_session,
            max_methods_per_week: args.max_per_week,
            min_regular_sets_percentage: args.min_regular,
            fatigue_threshold: args.fatigue_threshold,
            experience_level: args.experience,
            sessions_per_week: args.sessions,
        }
    }
}

#[derive(Serialize)]
struct StrategySummary<'a> {
    name: &'a str,
    target_population: ExperienceLevel,
    methods: usize,
    description: &'a str,
}

pub async fn snapshot<S>(service: &TrainingCoreService<S>, user_id: Uuid) -> Result<()>
where
    S: TrainingStateStore + FeedbackSource + 'static,
{
    let snapshot = service.compute_fatigue_snapshot(user_id).await?;
    print_json(&snapshot)
}

pub async fn advance<S>(
    service: &TrainingCoreService<S>,
    user_id: Option<Uuid>,
    all: bool,
) -> Result<()>
where
    S: TrainingStateStore + FeedbackSource + 'static,
{
    if all {
        let report = service.advance_all_users(Utc::now()).await?;
        if !report.is_clean() {
            warn!(failures = report.failures.len(), "some users were not advanced");
        }
        return print_json(&report);
    }
    let Some(user_id) = user_id else {
        bail!("either --user or --all is required");
    };
    let advance = service.advance_mesocycle_week(user_id).await?;
    print_json(&advance)
}

pub async fn distribute<S>(
    service: &TrainingCoreService<S>,
    user_id: Uuid,
    strategy: &str,
    constraints: ConstraintArgs,
) -> Result<()>
where
    S: TrainingStateStore + FeedbackSource + 'static,
{
    let constraints = DistributionConstraints::from(constraints);
    let result = service
        .distribute_special_methods(user_id, strategy, &constraints)
        .await?;
    print_json(&result)
}

pub fn strategies<S>(service: &TrainingCoreService<S>) -> Result<()>
where
    S: TrainingStateStore + FeedbackSource + 'static,
{
    let summaries: Vec<StrategySummary<'_>> = service
        .strategies()
        .strategies()
        .iter()
        .map(|s| StrategySummary {
            name: &s.name,
            target_population: s.target_population,
            methods: s.allocations.len(),
            description: &s.description,
        })
        .collect();
    print_json(&summaries)
}
