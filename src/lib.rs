//! Training-load modeling engine for triathlon coaching
//!
//! Turns a raw session history into physiological threshold estimates,
//! a daily training-stress series with smoothed fitness/fatigue/form
//! signals, zone distributions and a rule-based assessment. Ingestion,
//! HTTP surfaces and UI live elsewhere; they hand the engine sessions
//! and get a profile back.

pub mod assessment;
pub mod db;
pub mod insights;
pub mod metrics;
pub mod models;
pub mod storage;

#[cfg(test)]
pub mod test_utils;

pub use assessment::{AssessmentError, AssessmentService};
pub use models::{AthleteProfile, NewSession, Session};
