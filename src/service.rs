// ABOUTME: Training core facade exposing fatigue snapshots, weekly advances, and method distribution
// ABOUTME: Reads stored state, runs the pure engines, and persists results with bounded conflict retry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Training Core Service
//!
//! The enclosing application talks to this facade only. Three operations make
//! up the contract:
//!
//! - [`TrainingCoreService::compute_fatigue_snapshot`]
//! - [`TrainingCoreService::advance_mesocycle_week`]
//! - [`TrainingCoreService::distribute_special_methods`]
//!
//! The remaining methods cover feedback ingestion, landmark edits, and the
//! weekly batch run.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stimulus_core::models::{
    DistributionConstraints, DistributionResult, FatigueSnapshot, LandmarkUpdate,
    MesocycleState, MuscleGroupId, SessionFeedback, VolumeLandmark, WeeklyAdvance,
};
use stimulus_core::{AppResult, ErrorCode};
use stimulus_intelligence::{
    AggregationInput, AutoRegulationAggregator, AutoRegulationConfig, BlockPosition,
    DistributionRequest, MesocycleProgressionEngine, MuscleReadiness,
    SpecialMethodDistributionEngine, StrategyCatalog,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::database::{
    retry_on_conflict, FeedbackSource, LandmarkChange, TrainingStateStore, WeekCommit,
};
use crate::logging::EngineLogger;

/// One user the weekly batch could not advance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// Athlete
    pub user_id: Uuid,
    /// Error code of the final attempt
    pub code: ErrorCode,
    /// Error message of the final attempt
    pub message: String,
    /// Whether re-running the batch for this user may succeed
    pub retryable: bool,
}

/// Outcome of [`TrainingCoreService::advance_all_users`]
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Instant the batch advanced to
    pub as_of: DateTime<Utc>,
    /// Users attempted
    pub total: usize,
    /// Successful advances, including weeks that had already been applied
    pub advanced: Vec<WeeklyAdvance>,
    /// Users that failed
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Whether every user advanced
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Facade over the store and the auto-regulation engines
pub struct TrainingCoreService<S> {
    store: Arc<S>,
    config: AutoRegulationConfig,
    aggregator: AutoRegulationAggregator,
    progression: MesocycleProgressionEngine,
    distribution: SpecialMethodDistributionEngine,
    strategies: StrategyCatalog,
}

impl<S> TrainingCoreService<S>
where
    S: TrainingStateStore + FeedbackSource,
{
    /// Service with the built-in strategy catalog
    #[must_use]
    pub fn new(store: Arc<S>, config: AutoRegulationConfig) -> Self {
        Self {
            aggregator: AutoRegulationAggregator::new(config.fatigue.clone()),
            progression: MesocycleProgressionEngine::new(config.progression.clone()),
            distribution: SpecialMethodDistributionEngine::new(config.distribution.clone()),
            strategies: StrategyCatalog::builtin(),
            store,
            config,
        }
    }

    /// Replace the strategy catalog
    #[must_use]
    pub fn with_strategies(mut self, strategies: StrategyCatalog) -> Self {
        self.strategies = strategies;
        self
    }

    /// Underlying store
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tunables in use
    #[must_use]
    pub const fn config(&self) -> &AutoRegulationConfig {
        &self.config
    }

    /// Registered distribution strategies
    #[must_use]
    pub const fn strategies(&self) -> &StrategyCatalog {
        &self.strategies
    }

    /// Current fatigue and recovery signals of a user
    ///
    /// # Errors
    ///
    /// Returns a database error if stored state cannot be read
    pub async fn compute_fatigue_snapshot(&self, user_id: Uuid) -> AppResult<FatigueSnapshot> {
        self.compute_fatigue_snapshot_at(user_id, Utc::now()).await
    }

    /// Fatigue snapshot for the window ending at `as_of`
    ///
    /// # Errors
    ///
    /// Returns a database error if stored state cannot be read
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn compute_fatigue_snapshot_at(
        &self,
        user_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> AppResult<FatigueSnapshot> {
        let started = Instant::now();
        let landmarks = self.store.landmarks(user_id).await?;
        let state = self.store.mesocycle_state(user_id).await?;
        let snapshot = self.snapshot_from(user_id, as_of, &landmarks, &state).await?;
        EngineLogger::log_operation(
            "compute_fatigue_snapshot",
            user_id,
            elapsed_ms(started),
            snapshot.warnings.len(),
        );
        Ok(snapshot)
    }

    /// Advance a user's mesocycle by one week
    ///
    /// # Errors
    ///
    /// Returns a retryable `ConcurrentUpdateConflict` if concurrent writers
    /// kept winning for every configured attempt, or a database error
    pub async fn advance_mesocycle_week(&self, user_id: Uuid) -> AppResult<WeeklyAdvance> {
        self.advance_mesocycle_week_at(user_id, Utc::now()).await
    }

    /// Weekly advance evaluated at `as_of`
    ///
    /// Running it again in the same ISO week returns the stored prescription
    /// with `already_applied = true` and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns a retryable `ConcurrentUpdateConflict` once the retry budget is
    /// spent, or a database error
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn advance_mesocycle_week_at(
        &self,
        user_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> AppResult<WeeklyAdvance> {
        let started = Instant::now();
        let advance = retry_on_conflict(
            || self.try_advance(user_id, as_of),
            &self.config.concurrency,
        )
        .await?;
        EngineLogger::log_operation(
            "advance_mesocycle_week",
            user_id,
            elapsed_ms(started),
            advance.warnings.len(),
        );
        Ok(advance)
    }

    /// One read-plan-commit attempt
    async fn try_advance(&self, user_id: Uuid, as_of: DateTime<Utc>) -> AppResult<WeeklyAdvance> {
        let state = self.store.mesocycle_state(user_id).await?;
        let landmarks = self.store.landmarks(user_id).await?;
        if state.advanced_in_week_of(as_of) {
            info!(user_id = %user_id, "weekly advance already applied this week");
            return Ok(MesocycleProgressionEngine::replay(&state, &landmarks));
        }

        let snapshot = self.snapshot_from(user_id, as_of, &landmarks, &state).await?;
        let plan = self
            .progression
            .plan_week(&state, &landmarks, &snapshot, as_of);
        let commit = WeekCommit::new(plan.state, state.version, plan.landmarks, &landmarks);
        self.store.commit_week(&commit).await?;

        let mut advance = plan.advance;
        let mut warnings = snapshot.warnings;
        warnings.append(&mut advance.warnings);
        advance.warnings = warnings;
        Ok(advance)
    }

    /// Weekly special-method allocation for a user
    ///
    /// # Errors
    ///
    /// Returns `UnknownStrategy` or `ConfigInvalid` before any stored state is
    /// read, or a database error
    pub async fn distribute_special_methods(
        &self,
        user_id: Uuid,
        strategy_name: &str,
        constraints: &DistributionConstraints,
    ) -> AppResult<DistributionResult> {
        self.distribute_special_methods_at(user_id, strategy_name, constraints, Utc::now())
            .await
    }

    /// Special-method allocation using the fatigue window ending at `as_of`
    ///
    /// # Errors
    ///
    /// Returns `UnknownStrategy` or `ConfigInvalid` before any stored state is
    /// read, or a database error
    #[instrument(skip_all, fields(user_id = %user_id, strategy = %strategy_name))]
    pub async fn distribute_special_methods_at(
        &self,
        user_id: Uuid,
        strategy_name: &str,
        constraints: &DistributionConstraints,
        as_of: DateTime<Utc>,
    ) -> AppResult<DistributionResult> {
        let started = Instant::now();
        let strategy = self.strategies.get(strategy_name)?;
        constraints.validate()?;

        let state = self.store.mesocycle_state(user_id).await?;
        let landmarks = self.store.landmarks(user_id).await?;
        let snapshot = self.snapshot_from(user_id, as_of, &landmarks, &state).await?;

        let readiness: Vec<MuscleReadiness> = landmarks
            .iter()
            .map(|row| MuscleReadiness {
                muscle_group: row.muscle_group,
                fatigue: snapshot
                    .fatigue_for(row.muscle_group)
                    .unwrap_or(snapshot.overall_fatigue),
                adaptation_level: row.adaptation_level,
            })
            .collect();
        let request = DistributionRequest {
            strategy,
            constraints,
            position: BlockPosition {
                phase: state.phase,
                week: state.week_in_block,
                total_weeks: self.config.progression.total_block_weeks(),
            },
            overall_fatigue: snapshot.overall_fatigue,
            readiness: &readiness,
        };
        let result = self.distribution.distribute(&request)?;
        EngineLogger::log_operation(
            "distribute_special_methods",
            user_id,
            elapsed_ms(started),
            result.warnings.len(),
        );
        Ok(result)
    }

    /// Validate and append a session feedback record
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for out-of-range scores or percentages, or a
    /// database error
    pub async fn record_feedback(&self, feedback: &SessionFeedback) -> AppResult<()> {
        feedback.validate()?;
        self.store.record_feedback(feedback).await?;
        info!(
            user_id = %feedback.user_id,
            session_id = %feedback.session_id,
            exercises = feedback.exercises.len(),
            "session feedback recorded"
        );
        Ok(())
    }

    /// All landmark rows of a user
    ///
    /// # Errors
    ///
    /// Returns a database error if stored state cannot be read
    pub async fn landmarks(&self, user_id: Uuid) -> AppResult<Vec<VolumeLandmark>> {
        self.store.landmarks(user_id).await
    }

    /// Current phase state of a user
    ///
    /// # Errors
    ///
    /// Returns a database error if stored state cannot be read
    pub async fn mesocycle_state(&self, user_id: Uuid) -> AppResult<MesocycleState> {
        self.store.mesocycle_state(user_id).await
    }

    /// Edit one landmark row at the version the caller read
    ///
    /// Conflicts are returned as-is; the caller decides whether its edit
    /// still applies to the newer row.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentUpdateConflict` if the row moved past
    /// `expected_version`, or a database error
    pub async fn update_landmark(
        &self,
        user_id: Uuid,
        muscle: MuscleGroupId,
        update: &LandmarkUpdate,
        expected_version: u64,
    ) -> AppResult<LandmarkChange> {
        self.store
            .update_landmark(user_id, muscle, update, expected_version)
            .await
    }

    /// Report the weekly sets actually completed for a muscle
    ///
    /// # Errors
    ///
    /// Returns a retryable conflict once the retry budget is spent, or a
    /// database error
    pub async fn record_performed_volume(
        &self,
        user_id: Uuid,
        muscle: MuscleGroupId,
        sets: u32,
    ) -> AppResult<LandmarkChange> {
        let update = LandmarkUpdate {
            current_volume: Some(sets),
            ..LandmarkUpdate::default()
        };
        retry_on_conflict(
            || async {
                let row = self.store.landmark(user_id, muscle).await?;
                self.store
                    .update_landmark(user_id, muscle, &update, row.version)
                    .await
            },
            &self.config.concurrency,
        )
        .await
    }

    /// Advance every known user; one user's failure never stops the batch
    ///
    /// # Errors
    ///
    /// Returns a database error only if the user list cannot be read
    pub async fn advance_all_users(&self, as_of: DateTime<Utc>) -> AppResult<BatchReport> {
        let started = Instant::now();
        let users = self.store.users().await?;
        let mut report = BatchReport {
            as_of,
            total: users.len(),
            advanced: Vec::with_capacity(users.len()),
            failures: Vec::new(),
        };

        for user_id in users {
            match self.advance_mesocycle_week_at(user_id, as_of).await {
                Ok(advance) => report.advanced.push(advance),
                Err(e) => {
                    error!(user_id = %user_id, code = ?e.code, error = %e, "weekly advance failed");
                    report.failures.push(BatchFailure {
                        user_id,
                        code: e.code,
                        message: e.message.clone(),
                        retryable: e.is_retryable(),
                    });
                }
            }
        }

        EngineLogger::log_batch(
            report.total,
            report.advanced.len(),
            report.failures.len(),
            elapsed_ms(started),
        );
        Ok(report)
    }

    async fn snapshot_from(
        &self,
        user_id: Uuid,
        as_of: DateTime<Utc>,
        landmarks: &[VolumeLandmark],
        state: &MesocycleState,
    ) -> AppResult<FatigueSnapshot> {
        let records = self
            .store
            .feedback_between(user_id, self.aggregator.window_start(as_of), as_of)
            .await?;
        Ok(self.aggregator.aggregate(&AggregationInput {
            user_id,
            as_of,
            records: &records,
            landmarks,
            state: Some(state),
        }))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
