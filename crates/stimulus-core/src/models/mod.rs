// ABOUTME: Core data models for the training-volume and auto-regulation engine
// ABOUTME: Re-exports muscle, landmark, feedback, fatigue, mesocycle, and distribution types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Plain data carried between the catalog, the persistence layer, and the
//! algorithms. Behaviour lives in `stimulus-intelligence`; the only logic kept
//! here is what protects a type's own invariants (landmark ordering, score
//! ranges).

mod distribution;
mod fatigue;
mod feedback;
mod landmark;
mod mesocycle;
mod muscle;

pub use distribution::{
    DistributionConstraints, DistributionResult, DistributionStrategy, ExperienceLevel,
    MuscleGroupAllocation, PhaseSpecificDistribution, ResolvedAllocation, SpecialMethod,
    SpecialMethodAllocation,
};
pub use fatigue::{
    DataConfidence, DeloadTrigger, FatigueSnapshot, MuscleGroupFatigue, RecoveryTrend,
};
pub use feedback::{
    AutoRegulationFeedback, ContributionRole, ExerciseContribution, ExerciseType,
    MuscleContribution, SessionFeedback,
};
pub use landmark::{LandmarkUpdate, Landmarks, VolumeLandmark};
pub use mesocycle::{
    MesocyclePhase, MesocycleState, MuscleTarget, PhaseTransition, TransitionReason,
    WeeklyAdvance,
};
pub use muscle::{BodyRegion, MuscleCategory, MuscleGroupId};
