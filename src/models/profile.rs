use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived athlete profile: thresholds, load, volume, zone distributions
/// and the qualitative assessment. One per athlete, recomputed from the
/// full session history and overwritten wholesale on every re-assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
  pub athlete_id: i64,

  // Estimated thresholds (None = not enough data)
  pub ftp_watts: Option<i64>,
  pub lthr_bike: Option<i64>,
  pub lthr_run: Option<i64>,
  /// sec/km
  pub threshold_pace_sec: Option<i64>,
  pub max_hr: Option<i64>,
  /// sec/100m
  pub css_pace_sec: Option<i64>,

  // Training load
  pub ctl: f64,
  pub atl: f64,
  pub tsb: f64,

  // Trailing 4-week average weekly volume (minutes)
  pub weekly_swim_min: i64,
  pub weekly_bike_min: i64,
  pub weekly_run_min: i64,

  // Time-in-zone percentages ([z1..z5] for HR, [z1..z6] for power)
  pub hr_zone_distribution: Option<Vec<i64>>,
  pub power_zone_distribution: Option<Vec<i64>>,

  pub strengths: Vec<String>,
  pub weaknesses: Vec<String>,
  pub assessment_summary: Option<String>,

  pub last_assessed_at: Option<DateTime<Utc>>,
}

impl AthleteProfile {
  /// A profile with nothing estimated yet, the shape an athlete with no
  /// recorded sessions still gets
  pub fn empty(athlete_id: i64) -> Self {
    Self {
      athlete_id,
      ftp_watts: None,
      lthr_bike: None,
      lthr_run: None,
      threshold_pace_sec: None,
      max_hr: None,
      css_pace_sec: None,
      ctl: 0.0,
      atl: 0.0,
      tsb: 0.0,
      weekly_swim_min: 0,
      weekly_bike_min: 0,
      weekly_run_min: 0,
      hr_zone_distribution: None,
      power_zone_distribution: None,
      strengths: Vec::new(),
      weaknesses: Vec::new(),
      assessment_summary: None,
      last_assessed_at: None,
    }
  }
}
