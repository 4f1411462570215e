// ABOUTME: Main library entry point for the Stimulus training-volume and auto-regulation engine
// ABOUTME: Persistence, the service facade, configuration, and logging around the pure engines
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Stimulus Engine
//!
//! Weekly training-volume prescription for hypertrophy training. Per-user
//! volume landmarks (MV/MEV/MAV/MRV) are combined with post-session feedback
//! to decide when to add sets, when to hold, and when to deload, and to lay
//! out intensity techniques (myo-reps, drop sets, supersets, giant sets)
//! across the week.
//!
//! ## Architecture
//!
//! - **`stimulus-core`**: errors, warnings, domain models, muscle-group catalog
//! - **`stimulus-intelligence`**: pure aggregation, progression, and distribution engines
//! - **database**: versioned per-user state in `SQLite` or memory
//! - **service**: [`service::TrainingCoreService`], the facade callers use
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use stimulus_engine::config::AutoRegulationConfig;
//! use stimulus_engine::database::SqliteTrainingStore;
//! use stimulus_engine::errors::AppResult;
//! use stimulus_engine::service::TrainingCoreService;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let store = Arc::new(SqliteTrainingStore::connect("sqlite::memory:").await?);
//!     let service = TrainingCoreService::new(store, AutoRegulationConfig::default());
//!
//!     let user_id = Uuid::new_v4();
//!     let advance = service.advance_mesocycle_week(user_id).await?;
//!     println!("{} week {}", advance.phase, advance.week_in_block);
//!     Ok(())
//! }
//! ```

/// Environment and tunable configuration
pub mod config;

/// Training state persistence
pub mod database;

/// Error types
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Service facade over store and engines
pub mod service;

pub use stimulus_core::{models, MuscleGroupCatalog};
pub use stimulus_intelligence::StrategyCatalog;
