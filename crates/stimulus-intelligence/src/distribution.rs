// ABOUTME: Resolves a distribution strategy into a constrained weekly special-method allocation
// ABOUTME: Pure and deterministic: week filter, phase scaling, suppression, ceiling, cap, derating, layout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Special-method distribution engine
//!
//! Allocation steps, applied per muscle group in this order:
//!
//! 1. keep allocations whose target weeks include the current week
//! 2. `adjusted = percentage x fatigue_coefficient[method] x phase_multiplier[phase]`
//! 3. suppress every method for a muscle whose fatigue exceeds the constraint threshold
//! 4. scale down to `100 - min_regular_sets_percentage` (factor = ceiling / raw sum)
//! 5. drop the lowest-percentage methods beyond the weekly distinct-method cap
//! 6. derate when the trainee is below the strategy's target population
//! 7. lay the surviving methods out round-robin over the week's sessions

use std::collections::BTreeMap;

use stimulus_core::constants::onboarding;
use stimulus_core::models::{
    DistributionConstraints, DistributionResult, DistributionStrategy, ExerciseType,
    MesocyclePhase, MuscleGroupAllocation, MuscleGroupId, PhaseSpecificDistribution,
    ResolvedAllocation, SpecialMethod,
};
use stimulus_core::warnings::ConstraintIssue;
use stimulus_core::{AppResult, EngineWarning};
use tracing::warn;

use crate::config::DistributionTuning;

/// Fatigue and adaptation of one muscle, as fed from the snapshot and landmark rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MuscleReadiness {
    /// Muscle group
    pub muscle_group: MuscleGroupId,
    /// Fatigue (0-10)
    pub fatigue: f64,
    /// Adaptation level (1-10)
    pub adaptation_level: u8,
}

/// Where in the block the distribution is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPosition {
    /// Current phase
    pub phase: MesocyclePhase,
    /// Week of the block (1-based)
    pub week: u32,
    /// Weeks in the block including deload
    pub total_weeks: u32,
}

/// Inputs for one distribution
#[derive(Debug, Clone, Copy)]
pub struct DistributionRequest<'a> {
    /// Strategy to resolve
    pub strategy: &'a DistributionStrategy,
    /// Hard constraints
    pub constraints: &'a DistributionConstraints,
    /// Phase and week
    pub position: BlockPosition,
    /// Overall fatigue; used for muscles missing from `readiness`
    pub overall_fatigue: f64,
    /// Per-muscle readiness
    pub readiness: &'a [MuscleReadiness],
}

#[derive(Debug, Clone)]
struct Candidate {
    method: SpecialMethod,
    percentage: f64,
    exercise_types: Vec<ExerciseType>,
    rationale: String,
}

/// Pure special-method allocator
#[derive(Debug, Clone, Default)]
pub struct SpecialMethodDistributionEngine {
    tuning: DistributionTuning,
}

impl SpecialMethodDistributionEngine {
    /// Create an engine with the given tunables
    #[must_use]
    pub const fn new(tuning: DistributionTuning) -> Self {
        Self { tuning }
    }

    /// Tunables in use
    #[must_use]
    pub const fn tuning(&self) -> &DistributionTuning {
        &self.tuning
    }

    /// Resolve a strategy for one week
    ///
    /// # Errors
    ///
    /// Returns `AppError::config` if the constraints or the strategy are malformed
    pub fn distribute(&self, request: &DistributionRequest<'_>) -> AppResult<DistributionResult> {
        request.constraints.validate()?;
        request.strategy.validate()?;

        let constraints = request.constraints;
        let position = request.position;
        let mut warnings = Vec::new();

        let derating = if constraints.experience_level < request.strategy.target_population {
            let factor = self.tuning.experience_derating_factor;
            warnings.push(EngineWarning::constraint(
                ConstraintIssue::ExperienceBelowTarget {
                    experience: constraints.experience_level,
                    required: request.strategy.target_population,
                    derating_factor: factor,
                },
                None,
                format!(
                    "{} trainee on a {} strategy; allocations scaled by {factor}",
                    constraints.experience_level, request.strategy.target_population
                ),
            ));
            Some(factor)
        } else {
            None
        };

        let mut allocations = Vec::new();
        let mut justifications = vec![phase_rationale(position)];
        let mut total = 0.0;
        let mut impact = 0.0;

        for (muscle, candidates) in self.candidates_by_muscle(request) {
            let readiness = readiness_for(request, muscle);
            let resolved =
                self.resolve_muscle(muscle, readiness.fatigue, candidates, constraints, derating, &mut warnings);

            for candidate in &resolved {
                total += candidate.percentage;
                impact += candidate.percentage
                    * self.tuning.fatigue_coefficients.for_method(candidate.method);
                if !justifications.contains(&candidate.rationale) {
                    justifications.push(candidate.rationale.clone());
                }
            }

            let sessions = layout_sessions(&resolved, constraints);
            let methods: Vec<ResolvedAllocation> = resolved
                .into_iter()
                .map(|c| ResolvedAllocation {
                    method: c.method,
                    percentage: c.percentage,
                    exercise_types: c.exercise_types,
                })
                .collect();
            allocations.push(MuscleGroupAllocation {
                muscle_group: muscle,
                fatigue: readiness.fatigue,
                adaptation_level: readiness.adaptation_level,
                total_percentage: methods.iter().map(|m| m.percentage).sum(),
                methods,
                sessions,
            });
        }

        for warning in &warnings {
            warn!(strategy = %request.strategy.name, "{warning}");
        }

        Ok(DistributionResult {
            strategy: request.strategy.name.clone(),
            target_population: request.strategy.target_population,
            distribution: PhaseSpecificDistribution {
                phase: position.phase,
                week: position.week,
                total_weeks: position.total_weeks,
                fatigue_level: request.overall_fatigue,
                adaptation_level: mean_adaptation(request.readiness),
                allocations,
            },
            total_special_method_percentage: total,
            expected_fatigue_impact: impact,
            justifications,
            warnings,
        })
    }

    /// Steps 1-2: week filter and phase/fatigue adjustment, grouped per muscle in catalog order
    fn candidates_by_muscle(
        &self,
        request: &DistributionRequest<'_>,
    ) -> BTreeMap<MuscleGroupId, Vec<Candidate>> {
        let phase_multiplier = self
            .tuning
            .phase_multipliers
            .for_phase(request.position.phase);
        let mut grouped: BTreeMap<MuscleGroupId, Vec<Candidate>> = BTreeMap::new();

        for allocation in request
            .strategy
            .allocations
            .iter()
            .filter(|a| a.target_weeks.contains(&request.position.week))
        {
            let adjusted = allocation.percentage
                * self.tuning.fatigue_coefficients.for_method(allocation.method)
                * phase_multiplier;
            for &muscle in &allocation.muscle_groups {
                let candidates = grouped.entry(muscle).or_default();
                if let Some(existing) = candidates.iter_mut().find(|c| c.method == allocation.method) {
                    existing.percentage += adjusted;
                    for exercise_type in &allocation.exercise_types {
                        if !existing.exercise_types.contains(exercise_type) {
                            existing.exercise_types.push(*exercise_type);
                        }
                    }
                } else {
                    candidates.push(Candidate {
                        method: allocation.method,
                        percentage: adjusted,
                        exercise_types: allocation.exercise_types.clone(),
                        rationale: allocation.rationale.clone(),
                    });
                }
            }
        }
        grouped
    }

    /// Steps 3-6 for one muscle
    fn resolve_muscle(
        &self,
        muscle: MuscleGroupId,
        fatigue: f64,
        mut candidates: Vec<Candidate>,
        constraints: &DistributionConstraints,
        derating: Option<f64>,
        warnings: &mut Vec<EngineWarning>,
    ) -> Vec<Candidate> {
        if fatigue > constraints.fatigue_threshold {
            warnings.push(EngineWarning::constraint(
                ConstraintIssue::FatigueSuppressed {
                    fatigue,
                    threshold: constraints.fatigue_threshold,
                },
                Some(muscle),
                format!(
                    "fatigue {fatigue:.1} above threshold {:.1}; special methods suppressed",
                    constraints.fatigue_threshold
                ),
            ));
            return Vec::new();
        }

        let ceiling = constraints.special_method_ceiling();
        let raw: f64 = candidates.iter().map(|c| c.percentage).sum();
        if raw > ceiling {
            let factor = if raw > 0.0 { ceiling / raw } else { 0.0 };
            for candidate in &mut candidates {
                candidate.percentage *= factor;
            }
            warnings.push(EngineWarning::constraint(
                ConstraintIssue::RegularSetCeiling {
                    raw_percentage: raw,
                    ceiling,
                },
                Some(muscle),
                format!("special methods at {raw:.1}% scaled to the {ceiling:.1}% ceiling"),
            ));
        }

        candidates.sort_by(|a, b| {
            b.percentage
                .total_cmp(&a.percentage)
                .then_with(|| a.method.cmp(&b.method))
        });
        let cap = constraints.weekly_method_cap();
        if candidates.len() > cap {
            let dropped: Vec<SpecialMethod> =
                candidates.split_off(cap).into_iter().map(|c| c.method).collect();
            let names: Vec<&str> = dropped.iter().map(|m| m.as_str()).collect();
            warnings.push(EngineWarning::constraint(
                ConstraintIssue::MethodCapExceeded {
                    cap,
                    dropped: dropped.clone(),
                },
                Some(muscle),
                format!("{cap} distinct methods allowed; dropped {}", names.join(", ")),
            ));
        }

        if let Some(factor) = derating {
            for candidate in &mut candidates {
                candidate.percentage *= factor;
            }
        }
        candidates
    }
}

/// Step 7: assign methods to sessions round-robin, at most `max_methods_per_session` each
fn layout_sessions(
    resolved: &[Candidate],
    constraints: &DistributionConstraints,
) -> Vec<Vec<SpecialMethod>> {
    let mut sessions = vec![Vec::new(); constraints.sessions_per_week as usize];
    let slots = sessions.len();
    for (index, candidate) in resolved.iter().enumerate() {
        sessions[index % slots].push(candidate.method);
    }
    sessions
}

fn readiness_for(request: &DistributionRequest<'_>, muscle: MuscleGroupId) -> MuscleReadiness {
    request
        .readiness
        .iter()
        .find(|r| r.muscle_group == muscle)
        .copied()
        .unwrap_or(MuscleReadiness {
            muscle_group: muscle,
            fatigue: request.overall_fatigue,
            adaptation_level: onboarding::INITIAL_ADAPTATION_LEVEL,
        })
}

fn mean_adaptation(readiness: &[MuscleReadiness]) -> f64 {
    if readiness.is_empty() {
        return f64::from(onboarding::INITIAL_ADAPTATION_LEVEL);
    }
    readiness
        .iter()
        .map(|r| f64::from(r.adaptation_level))
        .sum::<f64>()
        / readiness.len() as f64
}

fn phase_rationale(position: BlockPosition) -> String {
    match position.phase {
        MesocyclePhase::Accumulation => format!(
            "Week {} of {}: accumulation; special methods add stimulus while volume ramps toward MAV",
            position.week, position.total_weeks
        ),
        MesocyclePhase::Intensification => format!(
            "Week {} of {}: intensification; volume is held so methods are weighted up to drive effort",
            position.week, position.total_weeks
        ),
        MesocyclePhase::Deload => format!(
            "Week {} of {}: deload; methods scaled down to let accumulated fatigue dissipate",
            position.week, position.total_weeks
        ),
    }
}
