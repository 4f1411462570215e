// ABOUTME: Named special-method distribution strategies, built-in and loaded from JSON
// ABOUTME: Case-insensitive lookup; unknown names are configuration errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Strategy catalog
//!
//! Built-in strategies, one per experience level:
//!
//! | Name | Population | Character |
//! |------|------------|-----------|
//! | `CONSERVATIVE` | beginner | low-fatigue myo-reps and late-block drop sets |
//! | `BALANCED` | intermediate | all methods, peaking mid-block |
//! | `AGGRESSIVE` | advanced | high method share every week |
//! | `SPECIALIZATION` | elite | concentrated on lagging small muscle groups |
//!
//! # Scientific References
//!
//! - Schoenfeld, B.J. (2011). "The use of specialized training techniques to maximize muscle hypertrophy." *Strength Cond J*, 33(4), 60-65.
//! - Fagerli, B. (2006). Myo-reps: rest-pause activation sets for hypertrophy.
//! - Krzysztofik, M., et al. (2019). "Maximizing muscle hypertrophy: a systematic review of advanced resistance training techniques." *Int J Environ Res Public Health*, 16(24), 4897.

use stimulus_core::models::{
    DistributionStrategy, ExerciseType, ExperienceLevel, MuscleGroupId, SpecialMethod,
    SpecialMethodAllocation,
};
use stimulus_core::{AppError, AppResult};
use tracing::debug;

/// Lookup table of distribution strategies
#[derive(Debug, Clone)]
pub struct StrategyCatalog {
    strategies: Vec<DistributionStrategy>,
}

impl Default for StrategyCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StrategyCatalog {
    /// Catalog holding only the built-in strategies
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            strategies: vec![conservative(), balanced(), aggressive(), specialization()],
        }
    }

    /// Parse and validate a JSON array of strategies
    ///
    /// # Errors
    ///
    /// Returns `AppError::SerializationError` for malformed JSON and
    /// `AppError::config` for a strategy failing validation
    pub fn from_json(json: &str) -> AppResult<Self> {
        let strategies: Vec<DistributionStrategy> = serde_json::from_str(json)?;
        for strategy in &strategies {
            strategy.validate()?;
        }
        Ok(Self { strategies })
    }

    /// Add strategies, replacing any with the same (case-insensitive) name
    ///
    /// # Errors
    ///
    /// Returns `AppError::config` if any strategy fails validation
    pub fn extend(
        &mut self,
        strategies: impl IntoIterator<Item = DistributionStrategy>,
    ) -> AppResult<()> {
        for strategy in strategies {
            strategy.validate()?;
            self.strategies
                .retain(|existing| !existing.name.eq_ignore_ascii_case(&strategy.name));
            debug!(strategy = %strategy.name, "strategy registered");
            self.strategies.push(strategy);
        }
        Ok(())
    }

    /// Look up a strategy by name, ignoring case
    ///
    /// # Errors
    ///
    /// Returns `AppError::unknown_strategy` when no strategy has that name
    pub fn get(&self, name: &str) -> AppResult<&DistributionStrategy> {
        let wanted = name.trim();
        self.strategies
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::unknown_strategy(wanted, &self.names()))
    }

    /// Registered strategy names
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name.clone()).collect()
    }

    /// Every registered strategy
    #[must_use]
    pub fn strategies(&self) -> &[DistributionStrategy] {
        &self.strategies
    }
}

fn allocation(
    method: SpecialMethod,
    percentage: f64,
    target_weeks: &[u32],
    exercise_types: &[ExerciseType],
    muscle_groups: &[MuscleGroupId],
    rationale: &str,
) -> SpecialMethodAllocation {
    SpecialMethodAllocation {
        method,
        percentage,
        target_weeks: target_weeks.to_vec(),
        exercise_types: exercise_types.to_vec(),
        muscle_groups: muscle_groups.to_vec(),
        rationale: rationale.to_owned(),
    }
}

fn conservative() -> DistributionStrategy {
    use ExerciseType::{Isolation, Machine};
    use MuscleGroupId::{Back, Biceps, Calves, Chest, Quads, Shoulders, Triceps};

    DistributionStrategy {
        name: "CONSERVATIVE".to_owned(),
        description: "Introductory exposure to low-skill techniques on stable exercises".to_owned(),
        target_population: ExperienceLevel::Beginner,
        allocations: vec![
            allocation(
                SpecialMethod::MyoRepNoMatch,
                10.0,
                &[2, 3, 4],
                &[Isolation, Machine],
                &[Biceps, Triceps, Shoulders, Calves],
                "Myo-reps on small isolation work accumulate effective reps with little systemic fatigue",
            ),
            allocation(
                SpecialMethod::DropSet,
                5.0,
                &[4, 5],
                &[Machine],
                &[Chest, Back, Quads],
                "Single machine drop sets late in the block extend sets past failure safely",
            ),
        ],
    }
}

fn balanced() -> DistributionStrategy {
    use ExerciseType::{Compound, Isolation, Machine};
    use MuscleGroupId::{
        Abs, Back, Biceps, Calves, Chest, Glutes, Hamstrings, Quads, Shoulders, Triceps,
    };

    DistributionStrategy {
        name: "BALANCED".to_owned(),
        description: "Every technique represented, concentrated in the middle of the block".to_owned(),
        target_population: ExperienceLevel::Intermediate,
        allocations: vec![
            allocation(
                SpecialMethod::Superset,
                20.0,
                &[1, 2, 3],
                &[Compound, Isolation],
                &[Chest, Back, Biceps, Triceps],
                "Antagonist supersets raise session density without reducing load on either muscle",
            ),
            allocation(
                SpecialMethod::MyoRepNoMatch,
                12.0,
                &[1, 2],
                &[Isolation],
                &[Hamstrings, Glutes, Calves],
                "Early-block myo-reps build effective reps while volume is still near MEV",
            ),
            allocation(
                SpecialMethod::MyoRepMatch,
                15.0,
                &[2, 3, 4],
                &[Isolation, Machine],
                &[Chest, Shoulders, Biceps, Triceps, Calves],
                "Rep-matched myo-reps keep effort high as volume approaches MAV",
            ),
            allocation(
                SpecialMethod::DropSet,
                10.0,
                &[3, 4, 5],
                &[Isolation, Machine],
                &[Chest, Shoulders, Biceps, Triceps, Quads],
                "Drop sets extend sets beyond failure once work capacity has adapted",
            ),
            allocation(
                SpecialMethod::GiantSet,
                8.0,
                &[3, 5],
                &[Machine],
                &[Chest, Shoulders, Abs],
                "Giant sets stack metabolic stress on machine work where technique holds under fatigue",
            ),
        ],
    }
}

fn aggressive() -> DistributionStrategy {
    use ExerciseType::{Compound, Isolation, Machine};
    use MuscleGroupId::{
        Back, Biceps, Calves, Chest, Glutes, Hamstrings, Quads, Shoulders, Triceps,
    };

    DistributionStrategy {
        name: "AGGRESSIVE".to_owned(),
        description: "High technique share throughout the block for well-trained lifters".to_owned(),
        target_population: ExperienceLevel::Advanced,
        allocations: vec![
            allocation(
                SpecialMethod::MyoRepMatch,
                20.0,
                &[1, 2, 3, 4, 5],
                &[Isolation, Machine],
                &[Chest, Back, Shoulders, Biceps, Triceps, Calves],
                "Advanced lifters need rep-matched myo-reps to keep stimulus per set high",
            ),
            allocation(
                SpecialMethod::MyoRepNoMatch,
                15.0,
                &[1, 2, 3],
                &[Isolation, Machine],
                &[Quads, Hamstrings, Glutes],
                "Lower-body myo-reps limit axial loading while accumulating effective reps",
            ),
            allocation(
                SpecialMethod::DropSet,
                15.0,
                &[2, 3, 4, 5],
                &[Isolation, Machine],
                &[Chest, Shoulders, Biceps, Triceps, Quads],
                "Drop sets push already-adapted muscles past mechanical failure",
            ),
            allocation(
                SpecialMethod::Superset,
                20.0,
                &[1, 2, 3, 4],
                &[Compound, Isolation],
                &[Chest, Back, Biceps, Triceps, Hamstrings, Quads],
                "Supersets fit higher weekly volume into the same session time",
            ),
            allocation(
                SpecialMethod::GiantSet,
                12.0,
                &[3, 4, 5],
                &[Machine],
                &[Shoulders, Calves],
                "Giant sets saturate small, fatigue-resistant muscles",
            ),
        ],
    }
}

fn specialization() -> DistributionStrategy {
    use ExerciseType::{Compound, Isolation, Machine};
    use MuscleGroupId::{Biceps, Calves, Shoulders, Triceps};

    DistributionStrategy {
        name: "SPECIALIZATION".to_owned(),
        description: "Concentrated technique work on lagging arms, delts, and calves".to_owned(),
        target_population: ExperienceLevel::Elite,
        allocations: vec![
            allocation(
                SpecialMethod::MyoRepMatch,
                25.0,
                &[1, 2, 3, 4, 5],
                &[Isolation, Machine],
                &[Shoulders, Biceps, Calves],
                "Specialized muscles get maximal effective reps every week of the block",
            ),
            allocation(
                SpecialMethod::DropSet,
                20.0,
                &[2, 3, 4, 5],
                &[Isolation, Machine],
                &[Shoulders, Biceps, Triceps, Calves],
                "Drop sets add overload where further sets would exceed recoverable volume",
            ),
            allocation(
                SpecialMethod::Superset,
                15.0,
                &[1, 2, 3],
                &[Compound, Isolation],
                &[Biceps, Triceps],
                "Arm supersets double arm volume per unit of session time",
            ),
            allocation(
                SpecialMethod::GiantSet,
                15.0,
                &[4, 5],
                &[Machine],
                &[Shoulders],
                "Late-block delt giant sets accumulate metabolic stress before the deload",
            ),
        ],
    }
}
