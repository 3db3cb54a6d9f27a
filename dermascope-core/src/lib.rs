//! DermaScope core library - risk tiers, trends and count-up frames for wound-assessment displays

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Classification and trend functions are pure
// - No global mutable state
// - No randomness, clocks, threads, or async (frame pacing is supplied by the host)
// - Deterministic ordering must be explicit
// - Identical input yields byte-for-byte identical output

pub mod animate;
pub mod assessment;
pub mod capture;
pub mod config;
pub mod error;
pub mod observation;
pub mod report;
pub mod risk;
pub mod trend;

pub use animate::{drive, present, present_from, CancelHandle, DisplaySequence, Frame, FrameTicker};
pub use assessment::{assess, AssessmentReport, RiskAssessment, RiskFactor};
pub use config::ResolvedConfig;
pub use error::{Error, Result};
pub use observation::RiskObservation;
pub use risk::{classify, classify_with_thresholds, Classification, Domain, RiskTier, Thresholds};
pub use trend::{format_trend, timeline, TrendDirection, TrendResult};
