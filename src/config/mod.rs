// ABOUTME: Configuration module for the training engine service
// ABOUTME: Environment settings here; algorithm tunables live in stimulus-intelligence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment and service configuration
pub mod environment;

pub use environment::{DatabaseUrl, Environment, LogLevel, ServerConfig};
pub use stimulus_intelligence::config::{AutoRegulationConfig, ConfigError};
