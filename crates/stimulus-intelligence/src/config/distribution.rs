// ABOUTME: Special-method distribution tunables: fatigue coefficients, phase multipliers, derating
// ABOUTME: Coefficient lookup is an exhaustive match so a new method cannot be left unweighted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use stimulus_core::models::{MesocyclePhase, SpecialMethod};

/// Relative fatigue cost of each special method versus a straight set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodCoefficients {
    /// Myo-rep match
    pub myo_rep_match: f64,
    /// Myo-rep no-match
    pub myo_rep_no_match: f64,
    /// Drop set
    pub drop_set: f64,
    /// Superset
    pub superset: f64,
    /// Giant set
    pub giant_set: f64,
}

impl Default for MethodCoefficients {
    fn default() -> Self {
        Self {
            myo_rep_match: 1.4,
            myo_rep_no_match: 1.3,
            drop_set: 1.5,
            superset: 1.1,
            giant_set: 1.6,
        }
    }
}

impl MethodCoefficients {
    /// Coefficient for a method
    #[must_use]
    pub const fn for_method(&self, method: SpecialMethod) -> f64 {
        match method {
            SpecialMethod::MyoRepMatch => self.myo_rep_match,
            SpecialMethod::MyoRepNoMatch => self.myo_rep_no_match,
            SpecialMethod::DropSet => self.drop_set,
            SpecialMethod::Superset => self.superset,
            SpecialMethod::GiantSet => self.giant_set,
        }
    }
}

/// Allocation multiplier per phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseMultipliers {
    /// Accumulation
    pub accumulation: f64,
    /// Intensification
    pub intensification: f64,
    /// Deload
    pub deload: f64,
}

impl Default for PhaseMultipliers {
    fn default() -> Self {
        Self {
            accumulation: 1.0,
            intensification: 1.3,
            deload: 0.4,
        }
    }
}

impl PhaseMultipliers {
    /// Multiplier for a phase
    #[must_use]
    pub const fn for_phase(&self, phase: MesocyclePhase) -> f64 {
        match phase {
            MesocyclePhase::Accumulation => self.accumulation,
            MesocyclePhase::Intensification => self.intensification,
            MesocyclePhase::Deload => self.deload,
        }
    }
}

/// Distribution engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionTuning {
    /// Fatigue cost per method
    pub fatigue_coefficients: MethodCoefficients,
    /// Allocation scaling per phase
    pub phase_multipliers: PhaseMultipliers,
    /// Factor applied when the trainee is below the strategy's population
    pub experience_derating_factor: f64,
}

impl Default for DistributionTuning {
    fn default() -> Self {
        Self {
            fatigue_coefficients: MethodCoefficients::default(),
            phase_multipliers: PhaseMultipliers::default(),
            experience_derating_factor: 0.7,
        }
    }
}
