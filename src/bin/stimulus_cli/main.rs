// ABOUTME: Stimulus CLI - command-line front end for the training-volume engine
// ABOUTME: Computes fatigue snapshots, advances mesocycles, and distributes special methods
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Fatigue and recovery signals for a user
//! stimulus-cli snapshot --user 6f1c0f4e-3a56-4a8e-9d0b-5f8a2e1c7b90
//!
//! # Advance one user, or every known user, by one week
//! stimulus-cli advance --user 6f1c0f4e-3a56-4a8e-9d0b-5f8a2e1c7b90
//! stimulus-cli advance --all
//!
//! # Special-method allocation for this week
//! stimulus-cli distribute --user 6f1c0f4e-3a56-4a8e-9d0b-5f8a2e1c7b90 --strategy balanced
//!
//! # Registered distribution strategies
//! stimulus-cli strategies
//!
//! # Populate a user with a week of sample sessions
//! stimulus-cli seed-demo --user 6f1c0f4e-3a56-4a8e-9d0b-5f8a2e1c7b90
//! ```

mod commands;

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stimulus_engine::config::{AutoRegulationConfig, DatabaseUrl, ServerConfig};
use stimulus_engine::database::{
    FeedbackSource, InMemoryTrainingStore, SqliteTrainingStore, TrainingStateStore,
};
use stimulus_engine::logging::LoggingConfig;
use stimulus_engine::models::ExperienceLevel;
use stimulus_engine::service::TrainingCoreService;
use stimulus_engine::StrategyCatalog;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "stimulus-cli",
    about = "Stimulus training-volume engine CLI",
    long_about = "Weekly volume prescription, fatigue monitoring, and special-method planning for hypertrophy training."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override (`sqlite:<path>`, `sqlite::memory:`, or `memory`)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Compute the current fatigue snapshot of a user
    Snapshot {
        /// User ID
        #[arg(long)]
        user: Uuid,
    },

    /// Advance the mesocycle by one week
    Advance {
        /// User ID
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        user: Option<Uuid>,

        /// Advance every user with stored state
        #[arg(long)]
        all: bool,
    },

    /// Distribute special methods for the current week
    Distribute {
        /// User ID
        #[arg(long)]
        user: Uuid,

        /// Strategy name (case-insensitive)
        #[arg(long, default_value = "BALANCED")]
        strategy: String,

        /// Maximum distinct methods per session and muscle
        #[arg(long, default_value = "1")]
        max_per_session: u32,

        /// Maximum distinct methods per week and muscle
        #[arg(long, default_value = "3")]
        max_per_week: u32,

        /// Minimum share of regular sets (0-100)
        #[arg(long, default_value = "60")]
        min_regular: f64,

        /// Muscle fatigue above which methods are suppressed (0-10)
        #[arg(long, default_value = "8")]
        fatigue_threshold: f64,

        /// Experience level (beginner, intermediate, advanced, elite)
        #[arg(long, default_value = "intermediate")]
        experience: String,

        /// Sessions per week each muscle is trained
        #[arg(long, default_value = "2")]
        sessions: u32,
    },

    /// List registered distribution strategies
    Strategies,

    /// Record a week of sample sessions for a user
    SeedDemo {
        /// User ID (random if omitted)
        #[arg(long)]
        user: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    logging.init()?;

    let mut server_config = ServerConfig::from_env()?;
    if let Some(url) = &cli.database_url {
        server_config.database =
            DatabaseUrl::parse_url(url).context("Invalid --database-url value")?;
    }

    let engine_config = AutoRegulationConfig::load().context("Invalid engine configuration")?;
    let strategies = load_strategies(&server_config)?;

    info!(database = %server_config.database, "Stimulus CLI");

    match &server_config.database {
        DatabaseUrl::InProcess => {
            let store = Arc::new(InMemoryTrainingStore::new());
            let service =
                TrainingCoreService::new(store, engine_config).with_strategies(strategies);
            run(&service, cli.command).await
        }
        url => {
            if let DatabaseUrl::SQLite { path } = url {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create database directory {}", parent.display())
                    })?;
                }
            }
            let store = Arc::new(SqliteTrainingStore::connect(&url.to_connection_string()).await?);
            let service =
                TrainingCoreService::new(store, engine_config).with_strategies(strategies);
            run(&service, cli.command).await
        }
    }
}

/// Built-in strategies plus any from `STRATEGY_TABLE_PATH`
fn load_strategies(config: &ServerConfig) -> Result<StrategyCatalog> {
    let mut catalog = StrategyCatalog::builtin();
    if let Some(path) = &config.strategy_table_path {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read strategy table {}", path.display()))?;
        let table = StrategyCatalog::from_json(&json)?;
        catalog.extend(table.strategies().iter().cloned())?;
        info!(path = %path.display(), strategies = table.strategies().len(), "strategy table loaded");
    }
    Ok(catalog)
}

async fn run<S>(service: &TrainingCoreService<S>, command: Command) -> Result<()>
where
    S: TrainingStateStore + FeedbackSource + 'static,
{
    match command {
        Command::Snapshot { user } => commands::engine::snapshot(service, user).await,
        Command::Advance { user, all } => commands::engine::advance(service, user, all).await,
        Command::Distribute {
            user,
            strategy,
            max_per_session,
            max_per_week,
            min_regular,
            fatigue_threshold,
            experience,
            sessions,
        } => {
            let constraints = commands::engine::ConstraintArgs {
                max_per_session,
                max_per_week,
                min_regular,
                fatigue_threshold,
                experience: ExperienceLevel::parse(&experience)?,
                sessions,
            };
            commands::engine::distribute(service, user, &strategy, constraints).await
        }
        Command::Strategies => commands::engine::strategies(service),
        Command::SeedDemo { user } => {
            commands::demo::seed(service, user.unwrap_or_else(Uuid::new_v4)).await
        }
    }
}
