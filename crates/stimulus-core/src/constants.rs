// ABOUTME: Constants shared across the training-volume engine crates
// ABOUTME: Scale bounds for subjective scores, fatigue, percentages, and onboarding defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single
//! flat list.

/// Bounds of the 1-10 subjective scales (feedback scores, recovery/adaptation levels)
pub mod scales {
    /// Lowest value on a subjective 1-10 scale
    pub const LEVEL_MIN: u8 = 1;
    /// Highest value on a subjective 1-10 scale
    pub const LEVEL_MAX: u8 = 10;
    /// Upper bound of the 1-10 scale as a float, used for inversions (`10 - energy`)
    pub const LEVEL_MAX_F64: f64 = 10.0;
}

/// Fatigue score bounds
pub mod fatigue {
    /// Lowest possible fatigue score
    pub const FATIGUE_MIN: f64 = 0.0;
    /// Highest possible fatigue score
    pub const FATIGUE_MAX: f64 = 10.0;
}

/// Percentage bounds
pub mod percentages {
    /// Full share of a muscle group's weekly sets
    pub const PERCENT_MAX: f64 = 100.0;
    /// Divisor turning a contribution percentage into a fraction
    pub const PERCENT_DIVISOR: f64 = 100.0;
}

/// Weekly training schedule bounds
pub mod schedule {
    /// Most sessions a muscle group can be trained in per week
    pub const MAX_SESSIONS_PER_WEEK: u32 = 7;
}

/// Values applied when a user is onboarded
pub mod onboarding {
    /// Initial recovery level for a fresh landmark row
    pub const INITIAL_RECOVERY_LEVEL: u8 = 7;
    /// Initial adaptation level for a fresh landmark row
    pub const INITIAL_ADAPTATION_LEVEL: u8 = 5;
    /// Version of a row that has never been written
    pub const INITIAL_VERSION: u64 = 0;
}
