//! Storage boundaries of the assessment engine
//!
//! Two contracts matter to the core: reading an athlete's session history
//! ordered by start time, and replacing their derived profile wholesale.
//! Session inserts and profile reads are carried for the ingestion layer
//! and the read API that sit outside the engine.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::models::{AthleteProfile, NewSession, Session};

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// ---------------------------------------------------------------------------
/// Sessions
/// ---------------------------------------------------------------------------

/// Fetch an athlete's full session history, ordered by start time ascending
pub async fn fetch_sessions(
  pool: &SqlitePool,
  athlete_id: i64,
) -> Result<Vec<Session>, StorageError> {
  let sessions = sqlx::query_as::<_, Session>(
    r#"
    SELECT
      id, athlete_id, source_id, name, activity_type, sport_type,
      started_at, moving_time_seconds, elapsed_time_seconds,
      distance_meters, total_elevation_gain, average_speed, max_speed,
      average_heartrate, max_heartrate, average_watts, max_watts,
      weighted_average_watts, kilojoules, suffer_score, average_cadence,
      created_at
    FROM sessions
    WHERE athlete_id = ?1
    ORDER BY started_at ASC
    "#,
  )
  .bind(athlete_id)
  .fetch_all(pool)
  .await?;

  Ok(sessions)
}

/// Insert one session, returning its row id
pub async fn insert_session(
  pool: &SqlitePool,
  session: &NewSession,
) -> Result<i64, StorageError> {
  let result = sqlx::query(
    r#"
    INSERT INTO sessions (
      athlete_id, source_id, name, activity_type, sport_type,
      started_at, moving_time_seconds, elapsed_time_seconds,
      distance_meters, total_elevation_gain, average_speed, max_speed,
      average_heartrate, max_heartrate, average_watts, max_watts,
      weighted_average_watts, kilojoules, suffer_score, average_cadence
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
    "#,
  )
  .bind(session.athlete_id)
  .bind(&session.source_id)
  .bind(&session.name)
  .bind(&session.activity_type)
  .bind(&session.sport_type)
  .bind(session.started_at)
  .bind(session.moving_time_seconds)
  .bind(session.elapsed_time_seconds)
  .bind(session.distance_meters)
  .bind(session.total_elevation_gain)
  .bind(session.average_speed)
  .bind(session.max_speed)
  .bind(session.average_heartrate)
  .bind(session.max_heartrate)
  .bind(session.average_watts)
  .bind(session.max_watts)
  .bind(session.weighted_average_watts)
  .bind(session.kilojoules)
  .bind(session.suffer_score)
  .bind(session.average_cadence)
  .execute(pool)
  .await?;

  Ok(result.last_insert_rowid())
}

/// ---------------------------------------------------------------------------
/// Athlete Profiles
/// ---------------------------------------------------------------------------

/// Row shape with the JSON columns still encoded
#[derive(sqlx::FromRow)]
struct ProfileRow {
  athlete_id: i64,
  ftp_watts: Option<i64>,
  lthr_bike: Option<i64>,
  lthr_run: Option<i64>,
  threshold_pace_sec: Option<i64>,
  max_hr: Option<i64>,
  css_pace_sec: Option<i64>,
  ctl: f64,
  atl: f64,
  tsb: f64,
  weekly_swim_min: i64,
  weekly_bike_min: i64,
  weekly_run_min: i64,
  hr_zone_distribution: Option<String>,
  power_zone_distribution: Option<String>,
  strengths: String,
  weaknesses: String,
  assessment_summary: Option<String>,
  last_assessed_at: Option<DateTime<Utc>>,
}

impl ProfileRow {
  fn decode(self) -> Result<AthleteProfile, StorageError> {
    Ok(AthleteProfile {
      athlete_id: self.athlete_id,
      ftp_watts: self.ftp_watts,
      lthr_bike: self.lthr_bike,
      lthr_run: self.lthr_run,
      threshold_pace_sec: self.threshold_pace_sec,
      max_hr: self.max_hr,
      css_pace_sec: self.css_pace_sec,
      ctl: self.ctl,
      atl: self.atl,
      tsb: self.tsb,
      weekly_swim_min: self.weekly_swim_min,
      weekly_bike_min: self.weekly_bike_min,
      weekly_run_min: self.weekly_run_min,
      hr_zone_distribution: self
        .hr_zone_distribution
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?,
      power_zone_distribution: self
        .power_zone_distribution
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?,
      strengths: serde_json::from_str(&self.strengths)?,
      weaknesses: serde_json::from_str(&self.weaknesses)?,
      assessment_summary: self.assessment_summary,
      last_assessed_at: self.last_assessed_at,
    })
  }
}

/// Read an athlete's cached profile, if one has been computed
pub async fn fetch_profile(
  pool: &SqlitePool,
  athlete_id: i64,
) -> Result<Option<AthleteProfile>, StorageError> {
  let row = sqlx::query_as::<_, ProfileRow>(
    r#"
    SELECT
      athlete_id, ftp_watts, lthr_bike, lthr_run, threshold_pace_sec,
      max_hr, css_pace_sec, ctl, atl, tsb,
      weekly_swim_min, weekly_bike_min, weekly_run_min,
      hr_zone_distribution, power_zone_distribution,
      strengths, weaknesses, assessment_summary, last_assessed_at
    FROM athlete_profiles
    WHERE athlete_id = ?1
    "#,
  )
  .bind(athlete_id)
  .fetch_optional(pool)
  .await?;

  row.map(ProfileRow::decode).transpose()
}

/// Replace the athlete's profile wholesale (upsert keyed by athlete)
pub async fn upsert_profile(
  pool: &SqlitePool,
  profile: &AthleteProfile,
) -> Result<(), StorageError> {
  let hr_distribution = profile
    .hr_zone_distribution
    .as_ref()
    .map(serde_json::to_string)
    .transpose()?;
  let power_distribution = profile
    .power_zone_distribution
    .as_ref()
    .map(serde_json::to_string)
    .transpose()?;
  let strengths = serde_json::to_string(&profile.strengths)?;
  let weaknesses = serde_json::to_string(&profile.weaknesses)?;

  sqlx::query(
    r#"
    INSERT INTO athlete_profiles (
      athlete_id, ftp_watts, lthr_bike, lthr_run, threshold_pace_sec,
      max_hr, css_pace_sec, ctl, atl, tsb,
      weekly_swim_min, weekly_bike_min, weekly_run_min,
      hr_zone_distribution, power_zone_distribution,
      strengths, weaknesses, assessment_summary, last_assessed_at, updated_at
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, CURRENT_TIMESTAMP)
    ON CONFLICT(athlete_id) DO UPDATE SET
      ftp_watts = excluded.ftp_watts,
      lthr_bike = excluded.lthr_bike,
      lthr_run = excluded.lthr_run,
      threshold_pace_sec = excluded.threshold_pace_sec,
      max_hr = excluded.max_hr,
      css_pace_sec = excluded.css_pace_sec,
      ctl = excluded.ctl,
      atl = excluded.atl,
      tsb = excluded.tsb,
      weekly_swim_min = excluded.weekly_swim_min,
      weekly_bike_min = excluded.weekly_bike_min,
      weekly_run_min = excluded.weekly_run_min,
      hr_zone_distribution = excluded.hr_zone_distribution,
      power_zone_distribution = excluded.power_zone_distribution,
      strengths = excluded.strengths,
      weaknesses = excluded.weaknesses,
      assessment_summary = excluded.assessment_summary,
      last_assessed_at = excluded.last_assessed_at,
      updated_at = CURRENT_TIMESTAMP
    "#,
  )
  .bind(profile.athlete_id)
  .bind(profile.ftp_watts)
  .bind(profile.lthr_bike)
  .bind(profile.lthr_run)
  .bind(profile.threshold_pace_sec)
  .bind(profile.max_hr)
  .bind(profile.css_pace_sec)
  .bind(profile.ctl)
  .bind(profile.atl)
  .bind(profile.tsb)
  .bind(profile.weekly_swim_min)
  .bind(profile.weekly_bike_min)
  .bind(profile.weekly_run_min)
  .bind(hr_distribution)
  .bind(power_distribution)
  .bind(strengths)
  .bind(weaknesses)
  .bind(&profile.assessment_summary)
  .bind(profile.last_assessed_at)
  .execute(pool)
  .await?;

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
