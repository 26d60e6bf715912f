//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Helper assertions

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::models::{NewSession, Session};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// A minimal session `days_ago` days back: one hour of moving time, no
/// sensor readings. Tests set the fields they exercise.
pub fn mock_session(activity_type: &str, days_ago: i64) -> Session {
  Session {
    id: 0,
    athlete_id: 1,
    source_id: format!("mock-{}-{}", activity_type.to_lowercase(), days_ago),
    name: "Test Session".to_string(),
    activity_type: activity_type.to_string(),
    sport_type: activity_type.to_string(),
    started_at: datetime_days_ago(days_ago),
    moving_time_seconds: 3600,
    elapsed_time_seconds: 3600,
    distance_meters: 0.0,
    total_elevation_gain: 0.0,
    average_speed: 0.0,
    max_speed: 0.0,
    average_heartrate: None,
    max_heartrate: None,
    average_watts: None,
    max_watts: None,
    weighted_average_watts: None,
    kilojoules: None,
    suffer_score: None,
    average_cadence: None,
    created_at: None,
  }
}

/// The insertable counterpart of [`mock_session`]
pub fn mock_new_session(athlete_id: i64, activity_type: &str, days_ago: i64) -> NewSession {
  NewSession {
    athlete_id,
    source_id: format!("mock-{}-{}-{}", athlete_id, activity_type.to_lowercase(), days_ago),
    name: "Test Session".to_string(),
    activity_type: activity_type.to_string(),
    sport_type: activity_type.to_string(),
    started_at: datetime_days_ago(days_ago),
    moving_time_seconds: 3600,
    elapsed_time_seconds: 3600,
    distance_meters: 0.0,
    total_elevation_gain: 0.0,
    average_speed: 0.0,
    max_speed: 0.0,
    average_heartrate: None,
    max_heartrate: None,
    average_watts: None,
    max_watts: None,
    weighted_average_watts: None,
    kilojoules: None,
    suffer_score: None,
    average_cadence: None,
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Create a DateTime N days ago from now
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('sessions', 'athlete_profiles')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2, "Expected both engine tables");

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let session = mock_session("Run", 1);
    assert_eq!(session.activity_type, "Run");
    assert!(session.is_run());
    assert!(session.moving_time_seconds > 0);

    let new_session = mock_new_session(7, "Ride", 2);
    assert_eq!(new_session.athlete_id, 7);
    assert_eq!(new_session.activity_type, "Ride");
  }

  #[test]
  fn test_datetime_helpers_produce_correct_dates() {
    let past = datetime_days_ago(7);
    let diff = Utc::now() - past;
    assert_eq!(diff.num_days(), 7);
  }
}
