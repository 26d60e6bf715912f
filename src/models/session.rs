use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One completed exercise session, normalized from whatever platform the
/// ingestion layer pulled it from. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
  pub id: i64,
  pub athlete_id: i64,
  pub source_id: String,
  pub name: String,
  /// Coarse activity kind: "Ride", "Run", "Swim", "VirtualRide", "Walk", ...
  pub activity_type: String,
  /// Finer-grained kind: "MountainBikeRide", "TrailRun", ...
  pub sport_type: String,
  pub started_at: DateTime<Utc>,
  pub moving_time_seconds: i64,
  pub elapsed_time_seconds: i64,
  pub distance_meters: f64,
  pub total_elevation_gain: f64,
  /// m/s
  pub average_speed: f64,
  pub max_speed: f64,
  pub average_heartrate: Option<f64>,
  pub max_heartrate: Option<f64>,
  pub average_watts: Option<f64>,
  pub max_watts: Option<f64>,
  pub weighted_average_watts: Option<f64>,
  pub kilojoules: Option<f64>,
  /// Perceived-effort score from the source platform
  pub suffer_score: Option<f64>,
  pub average_cadence: Option<f64>,
  pub created_at: Option<DateTime<Utc>>,
}

impl Session {
  pub fn is_ride(&self) -> bool {
    self.activity_type.contains("Ride") || self.sport_type.contains("Ride")
  }

  pub fn is_run(&self) -> bool {
    self.activity_type == "Run" || self.sport_type.contains("Run")
  }

  pub fn is_swim(&self) -> bool {
    self.activity_type == "Swim" || self.sport_type.contains("Swim")
  }

  /// Calendar day the session belongs to, for daily aggregation
  pub fn day(&self) -> NaiveDate {
    self.started_at.date_naive()
  }
}

/// For inserting new sessions (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
  pub athlete_id: i64,
  pub source_id: String,
  pub name: String,
  pub activity_type: String,
  pub sport_type: String,
  pub started_at: DateTime<Utc>,
  pub moving_time_seconds: i64,
  pub elapsed_time_seconds: i64,
  pub distance_meters: f64,
  pub total_elevation_gain: f64,
  pub average_speed: f64,
  pub max_speed: f64,
  pub average_heartrate: Option<f64>,
  pub max_heartrate: Option<f64>,
  pub average_watts: Option<f64>,
  pub max_watts: Option<f64>,
  pub weighted_average_watts: Option<f64>,
  pub kilojoules: Option<f64>,
  pub suffer_score: Option<f64>,
  pub average_cadence: Option<f64>,
}
