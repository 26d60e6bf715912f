//! Athlete assessment orchestration
//!
//! The single entry point collaborators call: reads the athlete's full
//! session history, runs the metrics engine over it and replaces the
//! stored profile wholesale. Storage failures abort the assessment; thin
//! or missing data never does.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use crate::insights;
use crate::metrics;
use crate::models::AthleteProfile;
use crate::storage::{self, StorageError};

/// Trailing window for the weekly-volume aggregate, in weeks
const VOLUME_WINDOW_WEEKS: i64 = 4;

#[derive(Debug, Error)]
pub enum AssessmentError {
  #[error("Storage error: {0}")]
  Storage(#[from] StorageError),
}

/// Runs complete athlete assessments against an injected database handle
pub struct AssessmentService {
  db: SqlitePool,
}

impl AssessmentService {
  pub fn new(db: SqlitePool) -> Self {
    Self { db }
  }

  /// Recompute the athlete's profile from their full session history and
  /// persist it, replacing any previous profile for the athlete.
  ///
  /// An athlete with no recorded sessions still gets a structurally valid
  /// profile: null thresholds, zero loads, and the not-enough-data
  /// weakness.
  pub async fn assess(&self, athlete_id: i64) -> Result<AthleteProfile, AssessmentError> {
    let sessions = storage::fetch_sessions(&self.db, athlete_id).await?;
    info!(athlete_id, sessions = sessions.len(), "assessing athlete");

    // Physiological thresholds from historical bests
    let ftp = metrics::estimate_ftp(&sessions);
    let lthr = metrics::estimate_lthr(&sessions);
    let max_hr = metrics::estimate_max_hr(&sessions);
    let threshold_pace = metrics::estimate_threshold_pace(&sessions);
    let css = metrics::estimate_css(&sessions);
    debug!(?ftp, ?max_hr, ?threshold_pace, ?css, "estimated thresholds");

    // Zone tables exist only where their threshold does
    let hr_zones = max_hr.map(metrics::hr_zones);
    let power_zones = ftp.map(metrics::power_zones);

    // Fitness, fatigue and form over the gap-filled daily series
    let daily = metrics::daily_stress_series(&sessions, ftp, lthr.bike, lthr.run);
    let ctl = metrics::chronic_load(&daily);
    let atl = metrics::acute_load(&daily);
    let tsb = metrics::form_balance(ctl, atl);
    debug!(ctl, atl, tsb, "training load");

    let hr_distribution =
      hr_zones.map(|zones| metrics::hr_zone_distribution(&sessions, &zones));
    let power_distribution =
      power_zones.map(|zones| metrics::power_zone_distribution(&sessions, &zones));

    let volume = metrics::weekly_volume(&sessions, VOLUME_WINDOW_WEEKS);

    let insights = insights::identify_strengths_weaknesses(
      &volume,
      hr_distribution.as_deref().unwrap_or(&[0, 0, 0, 0, 0]),
      &sessions,
    );
    let summary = insights::build_summary(ftp, threshold_pace, ctl, tsb, &volume);

    let profile = AthleteProfile {
      athlete_id,
      ftp_watts: ftp,
      lthr_bike: lthr.bike,
      lthr_run: lthr.run,
      threshold_pace_sec: threshold_pace,
      max_hr,
      css_pace_sec: css,
      ctl,
      atl,
      tsb,
      weekly_swim_min: volume.swim_min,
      weekly_bike_min: volume.bike_min,
      weekly_run_min: volume.run_min,
      hr_zone_distribution: hr_distribution,
      power_zone_distribution: power_distribution,
      strengths: insights.strengths,
      weaknesses: insights.weaknesses,
      assessment_summary: Some(summary),
      last_assessed_at: Some(Utc::now()),
    };

    storage::upsert_profile(&self.db, &profile).await?;
    info!(athlete_id, "profile saved");

    Ok(profile)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
