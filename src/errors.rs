// ABOUTME: Error types for the training engine service layer
// ABOUTME: Re-exports the unified AppError family defined in stimulus-core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! Stores and the service return [`AppResult`]. Recoverable data problems
//! never become errors; they travel as [`EngineWarning`]s inside results.

pub use stimulus_core::errors::{AppError, AppResult, ErrorCode, ErrorContext};
pub use stimulus_core::warnings::{ConstraintIssue, EngineWarning, IntegrityIssue};
