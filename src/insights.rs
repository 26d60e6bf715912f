//! Qualitative assessment rules
//!
//! Deterministic rule engine over volume, zone distribution and session
//! cadence. Emits plain-language strengths and weaknesses plus the short
//! narrative summary shown on the athlete's profile.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::WeeklyVolume;
use crate::models::Session;

/// Trailing window used for the regularity rule, in weeks
const REGULARITY_WINDOW_WEEKS: i64 = 4;

/// Strengths and weaknesses, in insertion order. The order matters for
/// display but carries no semantic weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
  pub strengths: Vec<String>,
  pub weaknesses: Vec<String>,
}

/// Apply the strengths/weaknesses heuristics over weekly volume, the
/// heart-rate zone distribution (5 percentages, or all zeros when no zone
/// table was available) and the raw session history.
pub fn identify_strengths_weaknesses(
  volume: &WeeklyVolume,
  hr_distribution: &[i64],
  sessions: &[Session],
) -> Insights {
  let mut insights = Insights::default();

  let total_min = volume.total_min();
  if total_min == 0 {
    insights.weaknesses.push("Not enough data to assess".to_string());
    return insights;
  }

  // Discipline balance: rank by weekly volume
  let mut disciplines = [
    ("Swimming", volume.swim_min),
    ("Cycling", volume.bike_min),
    ("Running", volume.run_min),
  ];
  disciplines.sort_by(|a, b| b.1.cmp(&a.1));

  if disciplines[0].1 > 0 {
    insights
      .strengths
      .push(format!("Strong volume in {}", disciplines[0].0.to_lowercase()));
  }
  for (name, min) in disciplines.iter().rev() {
    if *min == 0 {
      insights.weaknesses.push(format!("{} absent from training", name));
    }
  }
  let lowest = disciplines[2];
  if lowest.1 > 0 && (lowest.1 as f64) < total_min as f64 * 0.15 {
    insights.weaknesses.push(format!("{} under-represented", lowest.0));
  }

  // Intensity distribution (the 80/20 rule)
  if hr_distribution.len() >= 5 {
    let low_intensity = hr_distribution[0] + hr_distribution[1];
    let high_intensity = hr_distribution[3] + hr_distribution[4];

    if low_intensity >= 75 {
      insights.strengths.push("Well polarized training".to_string());
    }
    if hr_distribution[2] > 25 {
      insights
        .weaknesses
        .push("Too much time in Zone 3 (grey zone)".to_string());
    }
    if low_intensity < 60 {
      insights
        .weaknesses
        .push("Not enough aerobic base (Z1-Z2)".to_string());
    }
    if high_intensity < 10 && total_min > 300 {
      insights
        .weaknesses
        .push("Lacking high intensity (Z4-Z5)".to_string());
    }
  }

  // Regularity over the trailing window. Between 2 and 3 sessions a week
  // neither a strength nor a weakness is stated.
  let cutoff = Utc::now() - Duration::days(REGULARITY_WINDOW_WEEKS * 7);
  let recent = sessions.iter().filter(|s| s.started_at >= cutoff).count();
  let avg_per_week = recent as f64 / REGULARITY_WINDOW_WEEKS as f64;

  if avg_per_week >= 5.0 {
    insights
      .strengths
      .push("Excellent training consistency".to_string());
  } else if avg_per_week >= 3.0 {
    insights.strengths.push("Good training consistency".to_string());
  } else if avg_per_week < 2.0 {
    insights.weaknesses.push("Irregular training".to_string());
  }

  insights
}

/// ---------------------------------------------------------------------------
/// Narrative Summary
/// ---------------------------------------------------------------------------

/// Compose the one-paragraph profile summary: fitness tier, form state,
/// thresholds when known, weekly hours when any.
pub fn build_summary(
  ftp: Option<i64>,
  threshold_pace: Option<i64>,
  ctl: f64,
  tsb: f64,
  volume: &WeeklyVolume,
) -> String {
  let mut parts: Vec<String> = Vec::new();

  // Fitness tier from chronic load
  if ctl >= 80.0 {
    parts.push("Excellent fitness level".to_string());
  } else if ctl >= 50.0 {
    parts.push("Good fitness level".to_string());
  } else if ctl >= 25.0 {
    parts.push("Moderate fitness".to_string());
  } else {
    parts.push("Fitness still developing".to_string());
  }

  // Form state from the balance
  if tsb > 15.0 {
    parts.push("very fresh (detraining risk)".to_string());
  } else if tsb > 5.0 {
    parts.push("well rested".to_string());
  } else if tsb > -10.0 {
    parts.push("in peak form".to_string());
  } else if tsb > -25.0 {
    parts.push("carrying a productive training load".to_string());
  } else {
    parts.push("highly fatigued, rest recommended".to_string());
  }

  if let Some(ftp) = ftp {
    parts.push(format!("estimated FTP {}W", ftp));
  }
  if let Some(pace) = threshold_pace {
    parts.push(format!("threshold pace {}:{:02}/km", pace / 60, pace % 60));
  }

  let total_min = volume.total_min();
  if total_min > 0 {
    let total_hours = (total_min as f64 / 60.0).round() as i64;
    parts.push(format!("{}h/week of training", total_hours));
  }

  format!("{}.", parts.join(". "))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
