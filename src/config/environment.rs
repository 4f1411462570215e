// ABOUTME: Environment configuration for the training engine service and its batch binary
// ABOUTME: Parses the storage backend, strategy table location, environment, and log level
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration

use std::env;
use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, Level};

/// Default location of the SQLite database file
pub const DEFAULT_DATABASE_PATH: &str = "./data/stimulus.db";

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational
    #[default]
    Info,
    /// Debugging detail
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Storage backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database file
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory SQLite (schema recreated per pool)
    SqliteMemory,
    /// Process-local store without SQL
    InProcess,
}

impl DatabaseUrl {
    /// Parse a `DATABASE_URL` value
    ///
    /// `memory` selects the process-local store, `sqlite::memory:` an
    /// in-memory SQLite pool, `sqlite:<path>` or a bare path a database file.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty value or an unsupported scheme
    pub fn parse_url(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            anyhow::bail!("DATABASE_URL must not be empty");
        }
        if trimmed.eq_ignore_ascii_case("memory") {
            return Ok(Self::InProcess);
        }
        if let Some(path) = trimmed.strip_prefix("sqlite:") {
            if path == ":memory:" {
                return Ok(Self::SqliteMemory);
            }
            return Ok(Self::SQLite {
                path: PathBuf::from(path.trim_start_matches("//")),
            });
        }
        if trimmed.contains("://") {
            anyhow::bail!("unsupported DATABASE_URL scheme: {trimmed}");
        }
        Ok(Self::SQLite {
            path: PathBuf::from(trimmed),
        })
    }

    /// Convert to a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}?mode=rwc", path.display()),
            Self::SqliteMemory => "sqlite::memory:".to_owned(),
            Self::InProcess => "memory".to_owned(),
        }
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Storage backend
    pub database: DatabaseUrl,
    /// Optional JSON file with additional distribution strategies
    pub strategy_table_path: Option<PathBuf>,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is malformed or
    /// `STRATEGY_TABLE_PATH` points to a missing file
    pub fn from_env() -> Result<Self> {
        let database = match env::var("DATABASE_URL") {
            Ok(url) => DatabaseUrl::parse_url(&url).context("Invalid DATABASE_URL value")?,
            Err(_) => DatabaseUrl::default(),
        };

        let strategy_table_path = match env::var("STRATEGY_TABLE_PATH") {
            Ok(path) if !path.trim().is_empty() => {
                let path = PathBuf::from(path);
                if !path.is_file() {
                    anyhow::bail!("STRATEGY_TABLE_PATH {} is not a file", path.display());
                }
                Some(path)
            }
            _ => None,
        };

        let config = Self {
            database,
            strategy_table_path,
            environment: Environment::from_str_or_default(
                &env::var("ENVIRONMENT").unwrap_or_default(),
            ),
            log_level: LogLevel::from_str_or_default(
                &env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned()),
            ),
        };
        info!(
            database = %config.database,
            environment = ?config.environment,
            "configuration loaded from environment"
        );
        Ok(config)
    }
}
