// ABOUTME: Aggregates post-session subjective feedback into per-muscle and overall fatigue signals
// ABOUTME: Produces recovery trend, deload recommendation, and confidence over a rolling window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Auto-regulation aggregator
//!
//! Each feedback record is scored with
//! `w1*soreness + w2*(10-energy) + w3*(10-sleep) + w4*effort - w5*pump`,
//! distributed to muscle groups by contribution-weighted sets, and averaged
//! over the window. Pump quality is the only score that lowers fatigue.
//!
//! # Scientific References
//!
//! - Israetel, M., Hoffmann, J., Smith, C.W. (2017). *Scientific Principles of Hypertrophy Training*. Renaissance Periodization.
//! - Helms, E.R., et al. (2016). "Application of the repetitions in reserve-based rating of perceived exertion scale." *Strength Cond J*, 38(4), 42-49.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use stimulus_core::constants::{fatigue as fatigue_scale, scales};
use stimulus_core::models::{
    AutoRegulationFeedback, DataConfidence, DeloadTrigger, FatigueSnapshot, MesocycleState,
    MuscleGroupFatigue, MuscleGroupId, RecoveryTrend, SessionFeedback, VolumeLandmark,
};
use stimulus_core::warnings::IntegrityIssue;
use stimulus_core::{EngineWarning, MuscleGroupCatalog};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::FatigueConfig;

#[derive(Debug, Default, Clone, Copy)]
struct MuscleAccumulator {
    weighted_sets: f64,
    fatigue_sum: f64,
    pump_sum: f64,
}

/// Everything the aggregator reads for one athlete
#[derive(Debug, Clone, Copy)]
pub struct AggregationInput<'a> {
    /// Athlete
    pub user_id: Uuid,
    /// End of the window
    pub as_of: DateTime<Utc>,
    /// Candidate feedback records (filtered to the window here)
    pub records: &'a [SessionFeedback],
    /// The athlete's landmark rows
    pub landmarks: &'a [VolumeLandmark],
    /// Persisted phase state carrying the streak counters
    pub state: Option<&'a MesocycleState>,
}

/// Stateless fatigue aggregator
#[derive(Debug, Clone, Default)]
pub struct AutoRegulationAggregator {
    config: FatigueConfig,
}

impl AutoRegulationAggregator {
    /// Create an aggregator with the given tunables
    #[must_use]
    pub const fn new(config: FatigueConfig) -> Self {
        Self { config }
    }

    /// Tunables in use
    #[must_use]
    pub const fn config(&self) -> &FatigueConfig {
        &self.config
    }

    /// Earliest instant (exclusive) a record may have to fall in the window ending at `as_of`
    #[must_use]
    pub fn window_start(&self, as_of: DateTime<Utc>) -> DateTime<Utc> {
        as_of - Duration::days(i64::from(self.config.window_days))
    }

    /// Fatigue score (0-10) of a single feedback record
    #[must_use]
    pub fn record_fatigue(&self, feedback: &AutoRegulationFeedback) -> f64 {
        let w = &self.config.weights;
        let raw = w.effort.mul_add(
            f64::from(feedback.perceived_effort),
            w.soreness.mul_add(
                f64::from(feedback.muscle_soreness),
                w.energy * (scales::LEVEL_MAX_F64 - f64::from(feedback.energy_level))
                    + w.sleep * (scales::LEVEL_MAX_F64 - f64::from(feedback.sleep_quality)),
            ),
        ) - w.pump * f64::from(feedback.pump_quality);
        (raw / self.config.normalization_constant)
            .clamp(fatigue_scale::FATIGUE_MIN, fatigue_scale::FATIGUE_MAX)
    }

    /// Records inside `(as_of - window_days, as_of]`, newest `max_window_sessions`, oldest first
    #[must_use]
    pub fn select_window<'a>(
        &self,
        records: &'a [SessionFeedback],
        as_of: DateTime<Utc>,
    ) -> Vec<&'a SessionFeedback> {
        let start = self.window_start(as_of);
        let mut window: Vec<&SessionFeedback> = records
            .iter()
            .filter(|r| r.recorded_at > start && r.recorded_at <= as_of)
            .collect();
        window.sort_by_key(|r| r.recorded_at);
        let excess = window.len().saturating_sub(self.config.max_window_sessions);
        window.drain(..excess);
        window
    }

    /// Build a fatigue snapshot; never fails
    #[must_use]
    pub fn aggregate(&self, input: &AggregationInput<'_>) -> FatigueSnapshot {
        let window = self.select_window(input.records, input.as_of);
        if window.is_empty() {
            return self.neutral_snapshot(input.user_id, input.as_of);
        }

        let record_scores: Vec<f64> = window
            .iter()
            .map(|r| self.record_fatigue(&r.feedback))
            .collect();

        let mut accumulators: BTreeMap<MuscleGroupId, MuscleAccumulator> = BTreeMap::new();
        let mut record_sets = vec![0.0; window.len()];
        for ((record, score), record_total) in
            window.iter().zip(&record_scores).zip(record_sets.iter_mut())
        {
            for muscle in record.muscle_groups() {
                let sets = record.weighted_sets_for(muscle);
                if sets <= 0.0 {
                    continue;
                }
                *record_total += sets;
                let acc = accumulators.entry(muscle).or_default();
                acc.weighted_sets += sets;
                acc.fatigue_sum += score * sets;
                acc.pump_sum += f64::from(record.feedback.pump_quality) * sets;
            }
        }

        let muscle_group_fatigue: Vec<MuscleGroupFatigue> = accumulators
            .iter()
            .map(|(&muscle, acc)| MuscleGroupFatigue {
                muscle_group: muscle,
                fatigue: acc.fatigue_sum / acc.weighted_sets,
                weighted_sets: acc.weighted_sets,
                volume_to_mrv_ratio: mrv_ratio(input.landmarks, muscle),
                stimulus_score: acc.pump_sum / acc.weighted_sets,
            })
            .collect();

        let overall_fatigue = set_weighted_mean(&record_scores, &record_sets);

        let consecutive_high_fatigue_windows = if overall_fatigue >= self.config.deload_threshold {
            input
                .state
                .map_or(0, |s| s.consecutive_high_fatigue_windows)
                + 1
        } else {
            0
        };

        let mut deload_triggers = Vec::new();
        if overall_fatigue >= self.config.deload_threshold {
            deload_triggers.push(DeloadTrigger::OverallFatigue);
        }
        deload_triggers.extend(self.sustained_mrv_triggers(input));

        let snapshot = FatigueSnapshot {
            user_id: input.user_id,
            as_of: input.as_of,
            records_in_window: window.len(),
            overall_fatigue,
            recovery_trend: self.trend(&record_scores),
            deload_recommended: !deload_triggers.is_empty(),
            deload_triggers,
            consecutive_high_fatigue_windows,
            confidence: self.confidence(window.len()),
            muscle_group_fatigue,
            warnings: Vec::new(),
        };
        debug!(
            user_id = %snapshot.user_id,
            records = snapshot.records_in_window,
            overall_fatigue = snapshot.overall_fatigue,
            deload = snapshot.deload_recommended,
            "fatigue snapshot computed"
        );
        snapshot
    }

    fn neutral_snapshot(&self, user_id: Uuid, as_of: DateTime<Utc>) -> FatigueSnapshot {
        warn!(user_id = %user_id, "no feedback in aggregation window, returning neutral snapshot");
        FatigueSnapshot {
            user_id,
            as_of,
            records_in_window: 0,
            overall_fatigue: self.config.neutral_fatigue,
            recovery_trend: RecoveryTrend::Stable,
            deload_recommended: false,
            deload_triggers: Vec::new(),
            consecutive_high_fatigue_windows: 0,
            confidence: DataConfidence::Low,
            muscle_group_fatigue: Vec::new(),
            warnings: vec![EngineWarning::integrity(
                IntegrityIssue::NoFeedbackInWindow,
                None,
                format!(
                    "no feedback in the last {} days; neutral fatigue {} assumed",
                    self.config.window_days, self.config.neutral_fatigue
                ),
            )],
        }
    }

    /// Muscles at or above MRV now whose persisted streak completes the sustained window count
    fn sustained_mrv_triggers(&self, input: &AggregationInput<'_>) -> Vec<DeloadTrigger> {
        input
            .landmarks
            .iter()
            .filter_map(|row| {
                let landmarks = if row.landmarks.is_ordered() {
                    row.landmarks
                } else {
                    MuscleGroupCatalog::default_landmarks(row.muscle_group)
                };
                if row.current_volume < landmarks.mrv {
                    return None;
                }
                let windows = input.state.map_or(0, |s| s.mrv_streak(row.muscle_group)) + 1;
                (windows >= self.config.sustained_mrv_windows).then_some(
                    DeloadTrigger::SustainedMrv {
                        muscle_group: row.muscle_group,
                        windows,
                    },
                )
            })
            .collect()
    }

    /// Compare the recent half of the window against the prior half
    ///
    /// With an odd count the middle record belongs to the recent half.
    #[must_use]
    pub fn trend(&self, ordered_scores: &[f64]) -> RecoveryTrend {
        if ordered_scores.len() < 2 {
            return RecoveryTrend::Stable;
        }
        let (prior, recent) = ordered_scores.split_at(ordered_scores.len() / 2);
        let delta = mean(recent) - mean(prior);
        if delta > self.config.trend_delta {
            RecoveryTrend::Declining
        } else if delta < -self.config.trend_delta {
            RecoveryTrend::Improving
        } else {
            RecoveryTrend::Stable
        }
    }

    fn confidence(&self, records: usize) -> DataConfidence {
        let min = self.config.min_confident_records;
        if records < min {
            DataConfidence::Low
        } else if records < min * 2 {
            DataConfidence::Moderate
        } else {
            DataConfidence::High
        }
    }
}

fn mrv_ratio(landmarks: &[VolumeLandmark], muscle: MuscleGroupId) -> f64 {
    landmarks
        .iter()
        .find(|row| row.muscle_group == muscle)
        .map_or(0.0, VolumeLandmark::mrv_ratio)
}

/// Record scores weighted by each record's weighted sets
///
/// A record without contribution data weighs as much as the average record
/// that has some; with no contribution data at all this is the plain mean.
fn set_weighted_mean(scores: &[f64], sets: &[f64]) -> f64 {
    let with_data: Vec<f64> = sets.iter().copied().filter(|s| *s > 0.0).collect();
    if with_data.is_empty() {
        return mean(scores);
    }
    let fallback_weight = mean(&with_data);
    let (weighted, total) = scores
        .iter()
        .zip(sets)
        .fold((0.0, 0.0), |(weighted, total), (score, &record_sets)| {
            let weight = if record_sets > 0.0 {
                record_sets
            } else {
                fallback_weight
            };
            (score.mul_add(weight, weighted), total + weight)
        });
    weighted / total
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
