// ABOUTME: Auto-regulation algorithms for the Stimulus training-volume engine
// ABOUTME: Fatigue aggregation, mesocycle progression, special-method distribution, strategy catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Stimulus Intelligence
//!
//! Pure, deterministic algorithms. Nothing in this crate performs I/O; the
//! root crate feeds it stored state and persists what it returns.
//!
//! ## Modules
//!
//! - **config**: Tunable constants with environment overrides and validation
//! - **aggregator**: Feedback window to fatigue snapshot
//! - **progression**: Phase state machine and weekly target volumes
//! - **distribution**: Strategy plus constraints to a weekly method allocation
//! - **strategies**: Built-in and JSON-loaded distribution strategies

/// Tunable configuration
pub mod config;

/// Auto-regulation aggregator
pub mod aggregator;

/// Mesocycle progression engine
pub mod progression;

/// Special-method distribution engine
pub mod distribution;

/// Distribution strategy catalog
pub mod strategies;

pub use aggregator::{AggregationInput, AutoRegulationAggregator};
pub use config::{AutoRegulationConfig, ConfigError};
pub use distribution::{
    BlockPosition, DistributionRequest, MuscleReadiness, SpecialMethodDistributionEngine,
};
pub use progression::{MesocycleProgressionEngine, WeekPlan};
pub use strategies::StrategyCatalog;
