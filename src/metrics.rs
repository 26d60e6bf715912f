//! Deterministic training-load metrics
//!
//! Pure computation over session history: no database, no network.
//! Stress estimation, daily aggregation, exponential load smoothing,
//! threshold estimation, zones and weekly volume all live here.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Session;

/// CTL time constant: 42 days of exponential smoothing, the long-horizon
/// "fitness" signal
const CHRONIC_TIME_CONSTANT_DAYS: f64 = 42.0;

/// ATL time constant: 7 days, the short-horizon "fatigue" signal
const ACUTE_TIME_CONSTANT_DAYS: f64 = 7.0;

/// ---------------------------------------------------------------------------
/// Stress Estimation (TSS)
/// ---------------------------------------------------------------------------

/// Power-based TSS: the classic normalized-power formula
fn power_stress(moving_time_s: f64, normalized_power: f64, ftp: f64) -> f64 {
  let intensity_factor = normalized_power / ftp;
  (moving_time_s * normalized_power * intensity_factor) / (ftp * 3600.0) * 100.0
}

/// Heart-rate-based TSS: duration(h) * IF^2 * 100
fn hr_stress(moving_time_s: f64, avg_hr: f64, lthr: f64) -> f64 {
  let intensity_factor = avg_hr / lthr;
  (moving_time_s / 3600.0) * intensity_factor.powi(2) * 100.0
}

/// Estimate a single session's training stress from whatever signals it
/// carries. Not every athlete has a power meter, so this cascades from the
/// best signal down to a duration-only guess. First applicable rule wins;
/// the order is load-bearing.
pub fn estimate_stress(
  session: &Session,
  ftp: Option<i64>,
  lthr_bike: Option<i64>,
  lthr_run: Option<i64>,
) -> f64 {
  let moving = session.moving_time_seconds as f64;

  // 1. Ride with power data
  if session.is_ride() {
    if let (Some(np), Some(ftp)) = (session.weighted_average_watts, ftp) {
      if np > 0.0 && ftp > 0 {
        return power_stress(moving, np, ftp as f64);
      }
    }
  }

  // 2. Ride with heart rate (no power meter)
  if session.is_ride() {
    if let (Some(hr), Some(lthr)) = (session.average_heartrate, lthr_bike) {
      if hr > 0.0 && lthr > 0 {
        return hr_stress(moving, hr, lthr as f64);
      }
    }
  }

  // 3. Run with heart rate
  if session.is_run() {
    if let (Some(hr), Some(lthr)) = (session.average_heartrate, lthr_run) {
      if hr > 0.0 && lthr > 0 {
        return hr_stress(moving, hr, lthr as f64);
      }
    }
  }

  // 4. Swim: flat per-hour approximation, 1h of swimming ~ 65 TSS
  if session.is_swim() {
    return (moving / 3600.0) * 65.0;
  }

  // 5. Perceived-effort score from the source platform
  if let Some(score) = session.suffer_score {
    if score > 0.0 {
      return score * 1.2;
    }
  }

  // 6. Last resort: duration only
  (moving / 3600.0) * 50.0
}

/// ---------------------------------------------------------------------------
/// Daily Aggregation
/// ---------------------------------------------------------------------------

/// One calendar day of aggregate training stress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStress {
  pub date: NaiveDate,
  pub stress: f64,
}

/// Fold sessions into a contiguous daily stress series, from the first to
/// the last day with any data. Rest days are present with stress 0: the
/// smoothing below must see them, or its decay would run on a compressed
/// timeline. Sessions without positive moving time are excluded.
pub fn daily_stress_series(
  sessions: &[Session],
  ftp: Option<i64>,
  lthr_bike: Option<i64>,
  lthr_run: Option<i64>,
) -> Vec<DailyStress> {
  let mut by_day: std::collections::BTreeMap<NaiveDate, f64> = std::collections::BTreeMap::new();

  for session in sessions {
    if session.moving_time_seconds <= 0 {
      continue;
    }
    let stress = estimate_stress(session, ftp, lthr_bike, lthr_run);
    *by_day.entry(session.day()).or_insert(0.0) += stress;
  }

  let (first, last) = match (by_day.keys().next(), by_day.keys().next_back()) {
    (Some(first), Some(last)) => (*first, *last),
    _ => return Vec::new(),
  };

  let mut series = Vec::new();
  let mut day = first;
  while day <= last {
    series.push(DailyStress {
      date: day,
      stress: by_day.get(&day).copied().unwrap_or(0.0),
    });
    match day.succ_opt() {
      Some(next) => day = next,
      None => break,
    }
  }

  series
}

/// ---------------------------------------------------------------------------
/// Load Smoothing (CTL / ATL / TSB)
/// ---------------------------------------------------------------------------

/// Exponentially-weighted moving average over the daily series, processed
/// in chronological order and seeded at 0. Returns the value after the
/// last day, rounded to one decimal.
fn ewma(series: &[DailyStress], time_constant: f64) -> f64 {
  if series.is_empty() {
    return 0.0;
  }

  let mut ordered: Vec<&DailyStress> = series.iter().collect();
  ordered.sort_by_key(|point| point.date);

  let decay = 1.0 - (-1.0 / time_constant).exp();
  let mut value = 0.0;
  for point in ordered {
    value += (point.stress - value) * decay;
  }

  round1(value)
}

/// Chronic load (CTL, "fitness"): 42-day smoothed daily stress
pub fn chronic_load(series: &[DailyStress]) -> f64 {
  ewma(series, CHRONIC_TIME_CONSTANT_DAYS)
}

/// Acute load (ATL, "fatigue"): 7-day smoothed daily stress
pub fn acute_load(series: &[DailyStress]) -> f64 {
  ewma(series, ACUTE_TIME_CONSTANT_DAYS)
}

/// Form balance (TSB, "freshness"): chronic minus acute load
pub fn form_balance(chronic: f64, acute: f64) -> f64 {
  round1(chronic - acute)
}

fn round1(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

/// ---------------------------------------------------------------------------
/// Threshold Estimation
/// ---------------------------------------------------------------------------

/// Estimated lactate threshold heart rates, per discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LthrEstimate {
  pub bike: Option<i64>,
  pub run: Option<i64>,
}

/// FTP from historical bests: best weighted average power over a 20 to 90
/// minute ride, times 0.95. Shorter efforts overstate what is sustainable,
/// longer ones understate it.
pub fn estimate_ftp(sessions: &[Session]) -> Option<i64> {
  let rides: Vec<&Session> = sessions
    .iter()
    .filter(|s| {
      s.is_ride()
        && s.weighted_average_watts.is_some_and(|w| w > 0.0)
        && s.moving_time_seconds >= 1200
    })
    .collect();

  if rides.is_empty() {
    return None;
  }

  let best = rides
    .iter()
    .filter(|s| s.moving_time_seconds >= 1200 && s.moving_time_seconds <= 5400)
    .filter_map(|s| s.weighted_average_watts)
    .max_by(f64::total_cmp)?;

  Some((best * 0.95).round() as i64)
}

/// LTHR for one discipline: the mean of the 3 highest average heart rates
/// over sustained (30 to 90 minute) efforts. Needs at least 3 qualifying
/// sessions.
fn lthr_for(sessions: &[Session], matches: impl Fn(&Session) -> bool) -> Option<i64> {
  let mut candidates: Vec<&Session> = sessions
    .iter()
    .filter(|s| {
      matches(s)
        && s.average_heartrate.is_some_and(|hr| hr > 0.0)
        && s.moving_time_seconds >= 1800
        && s.moving_time_seconds <= 5400
    })
    .collect();

  if candidates.len() < 3 {
    return None;
  }

  candidates.sort_by(|a, b| {
    b.average_heartrate
      .unwrap_or(0.0)
      .total_cmp(&a.average_heartrate.unwrap_or(0.0))
  });

  let top3: f64 = candidates
    .iter()
    .take(3)
    .filter_map(|s| s.average_heartrate)
    .sum();
  Some((top3 / 3.0).round() as i64)
}

/// Lactate threshold heart rate, estimated independently for bike and run
pub fn estimate_lthr(sessions: &[Session]) -> LthrEstimate {
  LthrEstimate {
    bike: lthr_for(sessions, Session::is_ride),
    run: lthr_for(sessions, Session::is_run),
  }
}

/// Highest max-heart-rate reading seen across the history. Readings of
/// 100 bpm and below are sensor noise, not maxima.
pub fn estimate_max_hr(sessions: &[Session]) -> Option<i64> {
  sessions
    .iter()
    .filter_map(|s| s.max_heartrate)
    .filter(|hr| *hr > 100.0)
    .max_by(f64::total_cmp)
    .map(|hr| hr.round() as i64)
}

/// Run threshold pace in sec/km: mean speed of the 3 fastest qualifying
/// runs (at least 5 km, 20 to 90 minutes). Needs at least 3.
pub fn estimate_threshold_pace(sessions: &[Session]) -> Option<i64> {
  let mut runs: Vec<&Session> = sessions
    .iter()
    .filter(|s| {
      s.is_run()
        && s.average_speed > 0.0
        && s.distance_meters >= 5000.0
        && s.moving_time_seconds >= 1200
        && s.moving_time_seconds <= 5400
    })
    .collect();

  if runs.len() < 3 {
    return None;
  }

  runs.sort_by(|a, b| b.average_speed.total_cmp(&a.average_speed));
  let avg_speed: f64 = runs.iter().take(3).map(|s| s.average_speed).sum::<f64>() / 3.0;

  Some((1000.0 / avg_speed).round() as i64)
}

/// Critical swim speed in sec/100m: mean speed of up to the 3 fastest
/// swims of at least 400 m. Needs at least 2.
pub fn estimate_css(sessions: &[Session]) -> Option<i64> {
  let mut swims: Vec<&Session> = sessions
    .iter()
    .filter(|s| s.is_swim() && s.average_speed > 0.0 && s.distance_meters >= 400.0)
    .collect();

  if swims.len() < 2 {
    return None;
  }

  swims.sort_by(|a, b| b.average_speed.total_cmp(&a.average_speed));
  let top = &swims[..swims.len().min(3)];
  let avg_speed: f64 = top.iter().map(|s| s.average_speed).sum::<f64>() / top.len() as f64;

  Some((100.0 / avg_speed).round() as i64)
}

/// ---------------------------------------------------------------------------
/// Training Zones
/// ---------------------------------------------------------------------------

/// One zone's numeric boundaries, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRange {
  pub min: i64,
  pub max: i64,
}

/// Five heart-rate zones as percentages of max HR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrZones {
  pub z1: ZoneRange, // Recovery
  pub z2: ZoneRange, // Endurance
  pub z3: ZoneRange, // Tempo
  pub z4: ZoneRange, // Threshold
  pub z5: ZoneRange, // VO2 max
}

impl HrZones {
  /// Zones in ascending intensity order, for classification
  pub fn ranges(&self) -> [ZoneRange; 5] {
    [self.z1, self.z2, self.z3, self.z4, self.z5]
  }
}

/// Coggan-style six power zones as percentages of FTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerZones {
  pub z1: ZoneRange, // Active recovery
  pub z2: ZoneRange, // Endurance
  pub z3: ZoneRange, // Tempo
  pub z4: ZoneRange, // Threshold
  pub z5: ZoneRange, // VO2 max
  pub z6: ZoneRange, // Anaerobic
}

impl PowerZones {
  pub fn ranges(&self) -> [ZoneRange; 6] {
    [self.z1, self.z2, self.z3, self.z4, self.z5, self.z6]
  }
}

/// Five run pace zones in sec/km. Inverted: zone 1 is the slowest pace,
/// so the largest sec/km values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaceZones {
  pub z1: ZoneRange,
  pub z2: ZoneRange,
  pub z3: ZoneRange,
  pub z4: ZoneRange,
  pub z5: ZoneRange,
}

impl PaceZones {
  pub fn ranges(&self) -> [ZoneRange; 5] {
    [self.z1, self.z2, self.z3, self.z4, self.z5]
  }
}

fn pct(base: i64, factor: f64) -> i64 {
  (base as f64 * factor).round() as i64
}

/// Heart-rate zones from max HR, cut at 50/60/70/80/90/100%
pub fn hr_zones(max_hr: i64) -> HrZones {
  HrZones {
    z1: ZoneRange { min: pct(max_hr, 0.50), max: pct(max_hr, 0.60) },
    z2: ZoneRange { min: pct(max_hr, 0.60), max: pct(max_hr, 0.70) },
    z3: ZoneRange { min: pct(max_hr, 0.70), max: pct(max_hr, 0.80) },
    z4: ZoneRange { min: pct(max_hr, 0.80), max: pct(max_hr, 0.90) },
    z5: ZoneRange { min: pct(max_hr, 0.90), max: max_hr },
  }
}

/// Power zones from threshold power (Coggan 6-zone model)
pub fn power_zones(ftp: i64) -> PowerZones {
  PowerZones {
    z1: ZoneRange { min: 0, max: pct(ftp, 0.55) },
    z2: ZoneRange { min: pct(ftp, 0.56), max: pct(ftp, 0.75) },
    z3: ZoneRange { min: pct(ftp, 0.76), max: pct(ftp, 0.90) },
    z4: ZoneRange { min: pct(ftp, 0.91), max: pct(ftp, 1.05) },
    z5: ZoneRange { min: pct(ftp, 1.06), max: pct(ftp, 1.20) },
    z6: ZoneRange { min: pct(ftp, 1.21), max: pct(ftp, 2.00) },
  }
}

/// Pace zones from run threshold pace in sec/km. Lower sec/km is faster,
/// so the multipliers run from 1.50 (easiest) down to 0.85 (hardest).
pub fn pace_zones(threshold_pace_sec: i64) -> PaceZones {
  PaceZones {
    z1: ZoneRange {
      min: pct(threshold_pace_sec, 1.30),
      max: pct(threshold_pace_sec, 1.50),
    },
    z2: ZoneRange {
      min: pct(threshold_pace_sec, 1.15),
      max: pct(threshold_pace_sec, 1.29),
    },
    z3: ZoneRange {
      min: pct(threshold_pace_sec, 1.06),
      max: pct(threshold_pace_sec, 1.14),
    },
    z4: ZoneRange {
      min: pct(threshold_pace_sec, 0.97),
      max: pct(threshold_pace_sec, 1.05),
    },
    z5: ZoneRange {
      min: pct(threshold_pace_sec, 0.85),
      max: pct(threshold_pace_sec, 0.96),
    },
  }
}

/// Classify a reading against a zone table: the first zone (ascending)
/// whose max covers the reading, or the top zone if none does. A reading
/// exactly on a zone's upper boundary belongs to that zone.
pub fn zone_index(value: f64, ranges: &[ZoneRange]) -> usize {
  for (i, range) in ranges.iter().enumerate() {
    if value <= range.max as f64 {
      return i;
    }
  }
  ranges.len() - 1
}

/// Time-in-zone percentages by average heart rate, across every session
/// carrying a reading. Rounded; all zeros when nothing is classifiable.
pub fn hr_zone_distribution(sessions: &[Session], zones: &HrZones) -> Vec<i64> {
  distribution(sessions, &zones.ranges(), |s| {
    s.average_heartrate.filter(|hr| *hr > 0.0)
  })
}

/// Time-in-zone percentages by average power. Rides only: power readings
/// on other session types are not comparable against a cycling FTP.
pub fn power_zone_distribution(sessions: &[Session], zones: &PowerZones) -> Vec<i64> {
  distribution(sessions, &zones.ranges(), |s| {
    if !s.is_ride() {
      return None;
    }
    s.average_watts.filter(|w| *w > 0.0)
  })
}

fn distribution(
  sessions: &[Session],
  ranges: &[ZoneRange],
  reading: impl Fn(&Session) -> Option<f64>,
) -> Vec<i64> {
  let mut zone_times = vec![0.0; ranges.len()];
  let mut total_time = 0.0;

  for session in sessions {
    let Some(value) = reading(session) else {
      continue;
    };
    let idx = zone_index(value, ranges);
    zone_times[idx] += session.moving_time_seconds as f64;
    total_time += session.moving_time_seconds as f64;
  }

  if total_time == 0.0 {
    return vec![0; ranges.len()];
  }

  zone_times
    .iter()
    .map(|t| (t / total_time * 100.0).round() as i64)
    .collect()
}

/// ---------------------------------------------------------------------------
/// Weekly Volume
/// ---------------------------------------------------------------------------

/// Average weekly minutes per discipline over a trailing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeeklyVolume {
  pub swim_min: i64,
  pub bike_min: i64,
  pub run_min: i64,
}

impl WeeklyVolume {
  pub fn total_min(&self) -> i64 {
    self.swim_min + self.bike_min + self.run_min
  }
}

/// Average weekly minutes per discipline over the trailing `weeks` weeks
pub fn weekly_volume(sessions: &[Session], weeks: i64) -> WeeklyVolume {
  let cutoff = Utc::now() - Duration::days(weeks * 7);

  let mut swim_min = 0.0;
  let mut bike_min = 0.0;
  let mut run_min = 0.0;

  for session in sessions.iter().filter(|s| s.started_at >= cutoff) {
    let minutes = session.moving_time_seconds as f64 / 60.0;
    if session.is_swim() {
      swim_min += minutes;
    } else if session.is_ride() {
      bike_min += minutes;
    } else if session.is_run() {
      run_min += minutes;
    }
  }

  WeeklyVolume {
    swim_min: (swim_min / weeks as f64).round() as i64,
    bike_min: (bike_min / weeks as f64).round() as i64,
    run_min: (run_min / weeks as f64).round() as i64,
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
