// ABOUTME: SQLite implementation of training state storage using sqlx
// ABOUTME: Versioned UPDATE ... WHERE version = ? writes inside RAII-guarded transactions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! `SQLite` training state store
//!
//! Tables:
//! - `volume_landmarks`: one row per (user, muscle group)
//! - `mesocycle_states`: one row per user, MRV streaks as JSON
//! - `session_feedback`: append-only, scores and exercises as JSON

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::pool::PoolConnection;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool};
use stimulus_core::models::{
    LandmarkUpdate, Landmarks, MesocyclePhase, MesocycleState, MuscleGroupId, SessionFeedback,
    VolumeLandmark,
};
use stimulus_core::{AppError, AppResult};
use tracing::{debug, info};
use uuid::Uuid;

use super::transactions::SqliteTransactionGuard;
use super::{
    onboarding_rows, reseeded_row, versioned_update, FeedbackSource, LandmarkChange, TrainingStateStore,
    WeekCommit,
};

/// How long a writer waits for a competing transaction before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool size for file databases; in-memory databases need exactly one connection
const MAX_FILE_CONNECTIONS: u32 = 5;

const LANDMARK_COLUMNS: &str = "user_id, muscle_group, mv, mev, mav, mrv, current_volume, \
     target_volume, recovery_level, adaptation_level, version, updated_at";

const STATE_COLUMNS: &str = "user_id, phase, block_number, week_in_block, weeks_in_phase, \
     consecutive_high_fatigue_windows, mrv_streaks, last_advanced_at, version, updated_at";

/// `SQLite`-backed [`TrainingStateStore`] and [`FeedbackSource`]
#[derive(Debug, Clone)]
pub struct SqliteTrainingStore {
    pool: SqlitePool,
}

impl SqliteTrainingStore {
    /// Connect to a `sqlite:` URL and create the schema
    ///
    /// `sqlite::memory:` gets a single-connection pool so every query sees
    /// the same database.
    ///
    /// # Errors
    ///
    /// Returns a database error if the URL is invalid, the file cannot be
    /// opened, or a migration fails
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::database(format!("Invalid SQLite URL {database_url}: {e}")))?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            // the database lives only as long as its single connection
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            pool_options = pool_options.max_connections(MAX_FILE_CONNECTIONS);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open {database_url}: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;
        info!(database_url = %database_url, "SQLite training store ready");
        Ok(store)
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns a database error if a statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS volume_landmarks (
                user_id TEXT NOT NULL,
                muscle_group TEXT NOT NULL,
                mv INTEGER NOT NULL,
                mev INTEGER NOT NULL,
                mav INTEGER NOT NULL,
                mrv INTEGER NOT NULL,
                current_volume INTEGER NOT NULL,
                target_volume INTEGER NOT NULL,
                recovery_level INTEGER NOT NULL,
                adaptation_level INTEGER NOT NULL,
                version INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, muscle_group)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| migration_error("volume_landmarks", &e))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS mesocycle_states (
                user_id TEXT PRIMARY KEY,
                phase TEXT NOT NULL CHECK (phase IN ('accumulation', 'intensification', 'deload')),
                block_number INTEGER NOT NULL,
                week_in_block INTEGER NOT NULL,
                weeks_in_phase INTEGER NOT NULL,
                consecutive_high_fatigue_windows INTEGER NOT NULL DEFAULT 0,
                mrv_streaks TEXT NOT NULL DEFAULT '{}',
                last_advanced_at TEXT,
                version INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| migration_error("mesocycle_states", &e))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS session_feedback (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                session_id TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                recorded_at_ms INTEGER NOT NULL,
                feedback TEXT NOT NULL,
                exercises TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| migration_error("session_feedback", &e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_session_feedback_user_time \
             ON session_feedback(user_id, recorded_at_ms)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| migration_error("idx_session_feedback_user_time", &e))?;

        debug!("training store schema up to date");
        Ok(())
    }

    /// Store a landmark row as-is, bypassing validation and version checks
    ///
    /// # Errors
    ///
    /// Returns a database error if the write fails
    pub async fn import_landmark(&self, row: &VolumeLandmark) -> AppResult<()> {
        let mut conn = self.acquire().await?;
        insert_landmark(&mut conn, row, "INSERT OR REPLACE").await?;
        Ok(())
    }

    async fn acquire(&self) -> AppResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))
    }

    async fn begin(&self) -> AppResult<SqliteTransactionGuard<'static>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        Ok(SqliteTransactionGuard::new(tx))
    }
}

/// Seed catalog defaults for a user with no landmark rows at all
///
/// A user missing only some rows keeps the gap until that row is read or
/// written on its own; the progression engine reports and substitutes it.
async fn ensure_onboarded(conn: &mut SqliteConnection, user_id: Uuid) -> AppResult<()> {
    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM volume_landmarks WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&mut *conn)
            .await
            .map_err(query_error("count landmarks"))?;
    if existing > 0 {
        return Ok(());
    }
    for row in onboarding_rows(user_id, Utc::now()) {
        insert_landmark(conn, &row, "INSERT OR IGNORE").await?;
    }
    info!(user_id = %user_id, "user onboarded with catalog landmarks");
    Ok(())
}

fn migration_error(table: &str, error: &sqlx::Error) -> AppError {
    AppError::database(format!("Failed to create {table}: {error}"))
}

fn query_error(action: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| AppError::database(format!("Failed to {action}: {e}"))
}

fn column_u32(row: &SqliteRow, column: &str) -> AppResult<u32> {
    let value: i64 = row.try_get(column).map_err(query_error("read column"))?;
    u32::try_from(value)
        .map_err(|_| AppError::database(format!("column {column} holds invalid value {value}")))
}

fn column_u8(row: &SqliteRow, column: &str) -> AppResult<u8> {
    let value: i64 = row.try_get(column).map_err(query_error("read column"))?;
    // out-of-range levels are clamped by the engine, not rejected here
    Ok(value.clamp(0, i64::from(u8::MAX)) as u8)
}

fn column_u64(row: &SqliteRow, column: &str) -> AppResult<u64> {
    let value: i64 = row.try_get(column).map_err(query_error("read column"))?;
    u64::try_from(value)
        .map_err(|_| AppError::database(format!("column {column} holds invalid value {value}")))
}

/// Versions are stored as `INTEGER`, which is signed in `SQLite`
fn version_column(version: u64) -> AppResult<i64> {
    i64::try_from(version)
        .map_err(|_| AppError::database(format!("version {version} exceeds INTEGER range")))
}

fn column_uuid(row: &SqliteRow, column: &str) -> AppResult<Uuid> {
    let value: String = row.try_get(column).map_err(query_error("read column"))?;
    Uuid::parse_str(&value)
        .map_err(|e| AppError::database(format!("column {column} holds invalid UUID: {e}")))
}

fn row_to_landmark(row: &SqliteRow) -> AppResult<VolumeLandmark> {
    let muscle: String = row
        .try_get("muscle_group")
        .map_err(query_error("read muscle_group"))?;
    Ok(VolumeLandmark {
        user_id: column_uuid(row, "user_id")?,
        muscle_group: muscle.parse::<MuscleGroupId>()?,
        landmarks: Landmarks::new(
            column_u32(row, "mv")?,
            column_u32(row, "mev")?,
            column_u32(row, "mav")?,
            column_u32(row, "mrv")?,
        ),
        current_volume: column_u32(row, "current_volume")?,
        target_volume: column_u32(row, "target_volume")?,
        recovery_level: column_u8(row, "recovery_level")?,
        adaptation_level: column_u8(row, "adaptation_level")?,
        version: column_u64(row, "version")?,
        updated_at: row
            .try_get("updated_at")
            .map_err(query_error("read updated_at"))?,
    })
}

fn row_to_state(row: &SqliteRow) -> AppResult<MesocycleState> {
    let phase: String = row.try_get("phase").map_err(query_error("read phase"))?;
    let streaks: String = row
        .try_get("mrv_streaks")
        .map_err(query_error("read mrv_streaks"))?;
    let mrv_streaks: BTreeMap<MuscleGroupId, u32> = serde_json::from_str(&streaks)?;
    Ok(MesocycleState {
        user_id: column_uuid(row, "user_id")?,
        phase: phase.parse::<MesocyclePhase>()?,
        block_number: column_u32(row, "block_number")?,
        week_in_block: column_u32(row, "week_in_block")?,
        weeks_in_phase: column_u32(row, "weeks_in_phase")?,
        consecutive_high_fatigue_windows: column_u32(row, "consecutive_high_fatigue_windows")?,
        mrv_streaks,
        last_advanced_at: row
            .try_get("last_advanced_at")
            .map_err(query_error("read last_advanced_at"))?,
        version: column_u64(row, "version")?,
        updated_at: row
            .try_get("updated_at")
            .map_err(query_error("read updated_at"))?,
    })
}

fn row_to_feedback(row: &SqliteRow) -> AppResult<SessionFeedback> {
    let feedback: String = row.try_get("feedback").map_err(query_error("read feedback"))?;
    let exercises: String = row
        .try_get("exercises")
        .map_err(query_error("read exercises"))?;
    Ok(SessionFeedback {
        id: column_uuid(row, "id")?,
        user_id: column_uuid(row, "user_id")?,
        session_id: column_uuid(row, "session_id")?,
        recorded_at: row
            .try_get("recorded_at")
            .map_err(query_error("read recorded_at"))?,
        feedback: serde_json::from_str(&feedback)?,
        exercises: serde_json::from_str(&exercises)?,
    })
}

/// Insert a landmark row; `verb` selects the conflict behaviour (`INSERT OR IGNORE`, ...)
async fn insert_landmark(
    conn: &mut SqliteConnection,
    row: &VolumeLandmark,
    verb: &str,
) -> AppResult<u64> {
    let result = sqlx::query(&format!(
        "{verb} INTO volume_landmarks ({LANDMARK_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(row.user_id.to_string())
    .bind(row.muscle_group.as_str())
    .bind(i64::from(row.landmarks.mv))
    .bind(i64::from(row.landmarks.mev))
    .bind(i64::from(row.landmarks.mav))
    .bind(i64::from(row.landmarks.mrv))
    .bind(i64::from(row.current_volume))
    .bind(i64::from(row.target_volume))
    .bind(i64::from(row.recovery_level))
    .bind(i64::from(row.adaptation_level))
    .bind(version_column(row.version)?)
    .bind(row.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(query_error("insert landmark"))?;
    Ok(result.rows_affected())
}

/// Versioned landmark write; returns rows affected (0 on a version mismatch)
async fn update_landmark_row(
    conn: &mut SqliteConnection,
    row: &VolumeLandmark,
    expected_version: u64,
) -> AppResult<u64> {
    let result = sqlx::query(
        r"
        UPDATE volume_landmarks
        SET mv = ?, mev = ?, mav = ?, mrv = ?, current_volume = ?, target_volume = ?,
            recovery_level = ?, adaptation_level = ?, version = ?, updated_at = ?
        WHERE user_id = ? AND muscle_group = ? AND version = ?
        ",
    )
    .bind(i64::from(row.landmarks.mv))
    .bind(i64::from(row.landmarks.mev))
    .bind(i64::from(row.landmarks.mav))
    .bind(i64::from(row.landmarks.mrv))
    .bind(i64::from(row.current_volume))
    .bind(i64::from(row.target_volume))
    .bind(i64::from(row.recovery_level))
    .bind(i64::from(row.adaptation_level))
    .bind(version_column(row.version)?)
    .bind(row.updated_at)
    .bind(row.user_id.to_string())
    .bind(row.muscle_group.as_str())
    .bind(version_column(expected_version)?)
    .execute(&mut *conn)
    .await
    .map_err(query_error("update landmark"))?;
    Ok(result.rows_affected())
}

async fn fetch_landmark(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    muscle: MuscleGroupId,
) -> AppResult<Option<VolumeLandmark>> {
    let row = sqlx::query(&format!(
        "SELECT {LANDMARK_COLUMNS} FROM volume_landmarks WHERE user_id = ? AND muscle_group = ?"
    ))
    .bind(user_id.to_string())
    .bind(muscle.as_str())
    .fetch_optional(&mut *conn)
    .await
    .map_err(query_error("load landmark"))?;
    row.as_ref().map(row_to_landmark).transpose()
}

async fn fetch_state(
    conn: &mut SqliteConnection,
    user_id: Uuid,
) -> AppResult<Option<MesocycleState>> {
    let row = sqlx::query(&format!(
        "SELECT {STATE_COLUMNS} FROM mesocycle_states WHERE user_id = ?"
    ))
    .bind(user_id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(query_error("load mesocycle state"))?;
    row.as_ref().map(row_to_state).transpose()
}

/// Insert or version-check-update the phase state; returns rows affected
async fn write_state(
    conn: &mut SqliteConnection,
    state: &MesocycleState,
    expected_version: Option<u64>,
) -> AppResult<u64> {
    let streaks = serde_json::to_string(&state.mrv_streaks)?;
    let result = match expected_version {
        None => sqlx::query(&format!(
            "INSERT OR IGNORE INTO mesocycle_states ({STATE_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(state.user_id.to_string())
        .bind(state.phase.as_str())
        .bind(i64::from(state.block_number))
        .bind(i64::from(state.week_in_block))
        .bind(i64::from(state.weeks_in_phase))
        .bind(i64::from(state.consecutive_high_fatigue_windows))
        .bind(streaks)
        .bind(state.last_advanced_at)
        .bind(version_column(state.version)?)
        .bind(state.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(query_error("insert mesocycle state"))?,
        Some(expected) => sqlx::query(
            r"
            UPDATE mesocycle_states
            SET phase = ?, block_number = ?, week_in_block = ?, weeks_in_phase = ?,
                consecutive_high_fatigue_windows = ?, mrv_streaks = ?, last_advanced_at = ?,
                version = ?, updated_at = ?
            WHERE user_id = ? AND version = ?
            ",
        )
        .bind(state.phase.as_str())
        .bind(i64::from(state.block_number))
        .bind(i64::from(state.week_in_block))
        .bind(i64::from(state.weeks_in_phase))
        .bind(i64::from(state.consecutive_high_fatigue_windows))
        .bind(streaks)
        .bind(state.last_advanced_at)
        .bind(version_column(state.version)?)
        .bind(state.updated_at)
        .bind(state.user_id.to_string())
        .bind(version_column(expected)?)
        .execute(&mut *conn)
        .await
        .map_err(query_error("update mesocycle state"))?,
    };
    Ok(result.rows_affected())
}

/// Every statement of a weekly commit; any conflict aborts the whole commit
async fn apply_week(conn: &mut SqliteConnection, commit: &WeekCommit) -> AppResult<()> {
    let user_id = commit.user_id();

    let stored_state = fetch_state(conn, user_id).await?;
    let state_written = match stored_state {
        Some(_) => write_state(conn, &commit.state, Some(commit.expected_state_version)).await?,
        None if commit.expected_state_version == 0 => write_state(conn, &commit.state, None).await?,
        None => 0,
    };
    if state_written == 0 {
        let actual = stored_state.map_or(0, |s| s.version);
        return Err(
            AppError::conflict("mesocycle state", commit.expected_state_version, actual)
                .with_user_id(user_id),
        );
    }

    for write in &commit.landmarks {
        let muscle = write.row.muscle_group;
        let written = if write.expected_version == 0
            && fetch_landmark(conn, user_id, muscle).await?.is_none()
        {
            insert_landmark(conn, &write.row, "INSERT").await?
        } else {
            update_landmark_row(conn, &write.row, write.expected_version).await?
        };
        if written == 0 {
            let actual = fetch_landmark(conn, user_id, muscle)
                .await?
                .map_or(0, |row| row.version);
            return Err(AppError::conflict(
                format!("landmark {muscle}"),
                write.expected_version,
                actual,
            )
            .with_user_id(user_id));
        }
    }
    Ok(())
}

#[async_trait]
impl TrainingStateStore for SqliteTrainingStore {
    async fn landmarks(&self, user_id: Uuid) -> AppResult<Vec<VolumeLandmark>> {
        let mut guard = self.begin().await?;
        let conn = guard.executor()?;
        ensure_onboarded(conn, user_id).await?;

        let rows = sqlx::query(&format!(
            "SELECT {LANDMARK_COLUMNS} FROM volume_landmarks WHERE user_id = ?"
        ))
        .bind(user_id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(query_error("load landmarks"))?;
        let mut landmarks = rows
            .iter()
            .map(row_to_landmark)
            .collect::<AppResult<Vec<_>>>()?;
        landmarks.sort_by_key(|row| row.muscle_group);
        guard.commit().await?;
        Ok(landmarks)
    }

    async fn landmark(&self, user_id: Uuid, muscle: MuscleGroupId) -> AppResult<VolumeLandmark> {
        let mut guard = self.begin().await?;
        let conn = guard.executor()?;
        ensure_onboarded(conn, user_id).await?;
        let row = match fetch_landmark(conn, user_id, muscle).await? {
            Some(row) => row,
            None => {
                let (row, _) = reseeded_row(user_id, muscle, Utc::now());
                insert_landmark(conn, &row, "INSERT OR IGNORE").await?;
                row
            }
        };
        guard.commit().await?;
        Ok(row)
    }

    async fn update_landmark(
        &self,
        user_id: Uuid,
        muscle: MuscleGroupId,
        update: &LandmarkUpdate,
        expected_version: u64,
    ) -> AppResult<LandmarkChange> {
        let mut guard = self.begin().await?;
        let conn = guard.executor()?;
        ensure_onboarded(conn, user_id).await?;
        let now = Utc::now();
        let mut warnings = Vec::new();
        let current = match fetch_landmark(conn, user_id, muscle).await? {
            Some(row) => row,
            None => {
                let (row, warning) = reseeded_row(user_id, muscle, now);
                insert_landmark(conn, &row, "INSERT OR IGNORE").await?;
                warnings.push(warning);
                row
            }
        };
        let mut change = match versioned_update(&current, update, expected_version, now) {
            Ok(change) => change,
            Err(e) => {
                guard.rollback().await?;
                return Err(e);
            }
        };
        if update_landmark_row(conn, &change.landmark, expected_version).await? == 0 {
            guard.rollback().await?;
            return Err(AppError::conflict(
                format!("landmark {muscle}"),
                expected_version,
                current.version,
            )
            .with_user_id(user_id));
        }
        guard.commit().await?;
        debug!(user_id = %user_id, muscle_group = %muscle, version = change.landmark.version, "landmark updated");
        warnings.append(&mut change.warnings);
        change.warnings = warnings;
        Ok(change)
    }

    async fn mesocycle_state(&self, user_id: Uuid) -> AppResult<MesocycleState> {
        let mut guard = self.begin().await?;
        let conn = guard.executor()?;
        let state = match fetch_state(conn, user_id).await? {
            Some(state) => state,
            None => {
                write_state(conn, &MesocycleState::new(user_id, Utc::now()), None).await?;
                fetch_state(conn, user_id).await?.ok_or_else(|| {
                    AppError::not_found("mesocycle state").with_user_id(user_id)
                })?
            }
        };
        guard.commit().await?;
        Ok(state)
    }

    async fn commit_week(&self, commit: &WeekCommit) -> AppResult<()> {
        let mut guard = self.begin().await?;
        match apply_week(guard.executor()?, commit).await {
            Ok(()) => {
                guard.commit().await?;
                debug!(user_id = %commit.user_id(), state_version = commit.state.version, "week committed");
                Ok(())
            }
            Err(e) => {
                guard.rollback().await?;
                Err(e)
            }
        }
    }

    async fn users(&self) -> AppResult<Vec<Uuid>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r"
            SELECT user_id FROM mesocycle_states
            UNION SELECT user_id FROM volume_landmarks
            UNION SELECT user_id FROM session_feedback
            ORDER BY 1
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("list users"))?;
        ids.iter()
            .map(|id| {
                Uuid::parse_str(id)
                    .map_err(|e| AppError::database(format!("invalid stored user id {id}: {e}")))
            })
            .collect()
    }
}

#[async_trait]
impl FeedbackSource for SqliteTrainingStore {
    async fn record_feedback(&self, feedback: &SessionFeedback) -> AppResult<()> {
        feedback.validate()?;
        let scores = serde_json::to_string(&feedback.feedback)?;
        let exercises = serde_json::to_string(&feedback.exercises)?;
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO session_feedback
                (id, user_id, session_id, recorded_at, recorded_at_ms, feedback, exercises)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(feedback.id.to_string())
        .bind(feedback.user_id.to_string())
        .bind(feedback.session_id.to_string())
        .bind(feedback.recorded_at)
        .bind(feedback.recorded_at.timestamp_millis())
        .bind(scores)
        .bind(exercises)
        .execute(&self.pool)
        .await
        .map_err(query_error("insert feedback"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::invalid_input(format!(
                "feedback record {} already stored",
                feedback.id
            )));
        }
        Ok(())
    }

    async fn feedback_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<SessionFeedback>> {
        // millisecond bounds are widened by one on each side; exact bounds applied below
        let rows = sqlx::query(
            r"
            SELECT id, user_id, session_id, recorded_at, feedback, exercises
            FROM session_feedback
            WHERE user_id = ? AND recorded_at_ms >= ? AND recorded_at_ms <= ?
            ORDER BY recorded_at_ms ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(from.timestamp_millis() - 1)
        .bind(to.timestamp_millis() + 1)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("load feedback"))?;

        let mut records = rows
            .iter()
            .map(row_to_feedback)
            .collect::<AppResult<Vec<_>>>()?;
        records.retain(|r| r.recorded_at > from && r.recorded_at <= to);
        records.sort_by_key(|r| r.recorded_at);
        Ok(records)
    }
}
