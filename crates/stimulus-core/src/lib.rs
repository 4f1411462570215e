// ABOUTME: Core types and constants for the Stimulus training-volume engine
// ABOUTME: Foundation crate with error handling, warnings, domain models, and catalog data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Stimulus Core
//!
//! Foundation crate providing shared types for the training-volume and
//! auto-regulation engine. This crate is designed to change infrequently,
//! enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **warnings**: Recoverable data-integrity and constraint warnings
//! - **constants**: Scale bounds and default values shared across crates
//! - **models**: Muscle groups, landmarks, feedback, phases, and special methods
//! - **catalog**: Static muscle-group reference data with default landmarks

/// Unified error handling system with standard error codes
pub mod errors;

/// Recoverable warnings surfaced alongside valid results
pub mod warnings;

/// Application constants organized by domain
pub mod constants;

/// Core domain models
pub mod models;

/// Static muscle-group catalog
pub mod catalog;

pub use catalog::{MuscleGroup, MuscleGroupCatalog};
pub use errors::{AppError, AppResult, ErrorCode};
pub use warnings::EngineWarning;
