//! Trend semantics between consecutive observations
//!
//! Global invariants enforced:
//! - Deterministic ordering (by timestamp, then domain)
//! - Trends are derived, not stored
//! - Sign is preserved for display

use crate::error::{Error, Result};
use crate::observation::RiskObservation;
use crate::risk::Domain;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trend direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Flat => "flat",
        }
    }
}

/// Direction and signed delta between two observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrendResult {
    pub direction: TrendDirection,
    pub delta_percent: f64,
}

impl TrendResult {
    pub const FLAT: TrendResult = TrendResult {
        direction: TrendDirection::Flat,
        delta_percent: 0.0,
    };

    /// Signed delta with one decimal, e.g. `+2.3%` or `-1.1%`
    ///
    /// The sign comes from the direction, so a move smaller than the display
    /// precision reads `+0.0%` / `-0.0%`; only a flat trend reads `0.0%`.
    pub fn display(&self) -> String {
        match self.direction {
            TrendDirection::Up => format!("+{:.1}%", self.delta_percent),
            TrendDirection::Down => format!("-{:.1}%", self.delta_percent.abs()),
            TrendDirection::Flat => "0.0%".to_string(),
        }
    }

    /// Whether this movement is good news for the given domain
    ///
    /// A falling risk is an improvement; for healing velocity a rise is.
    pub fn is_improvement(&self, domain: Domain) -> bool {
        match self.direction {
            TrendDirection::Flat => false,
            TrendDirection::Up => domain.is_inverted(),
            TrendDirection::Down => !domain.is_inverted(),
        }
    }
}

/// Compute the trend of `current` against an optional `previous` value
///
/// The first observation (`previous == None`) is flat. Values are already
/// percent-like, so the delta is a plain difference.
pub fn format_trend(current: f64, previous: Option<f64>) -> TrendResult {
    let Some(previous) = previous else {
        return TrendResult::FLAT;
    };

    let delta = current - previous;
    if !delta.is_finite() {
        return TrendResult::FLAT;
    }

    let direction = if delta > 0.0 {
        TrendDirection::Up
    } else if delta < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    };

    TrendResult {
        direction,
        delta_percent: if direction == TrendDirection::Flat {
            0.0
        } else {
            delta
        },
    }
}

/// Trend between two observations of the same domain
pub fn observation_trend(
    current: &RiskObservation,
    previous: Option<&RiskObservation>,
) -> Result<TrendResult> {
    match previous {
        None => Ok(TrendResult::FLAT),
        Some(prev) if prev.domain() != current.domain() => Err(Error::DomainMismatch {
            current: current.domain(),
            previous: prev.domain(),
        }),
        Some(prev) => Ok(format_trend(current.score(), Some(prev.score()))),
    }
}

/// One point on a wound timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TimelinePoint {
    pub observation: RiskObservation,
    pub trend: TrendResult,
    pub improving: bool,
}

/// Build a timeline from observations of one or more domains
///
/// Observations are ordered by timestamp, then domain. Each point is compared
/// against the previous point of the same domain; the first point of every
/// domain is flat.
pub fn timeline(observations: &[RiskObservation]) -> Vec<TimelinePoint> {
    let mut sorted: Vec<RiskObservation> = observations.to_vec();
    sorted.sort_by(|a, b| {
        a.timestamp()
            .cmp(&b.timestamp())
            .then_with(|| a.domain().cmp(&b.domain()))
    });

    let mut last_score: HashMap<Domain, f64> = HashMap::new();
    let mut points = Vec::with_capacity(sorted.len());

    for observation in sorted {
        let domain = observation.domain();
        let trend = format_trend(observation.score(), last_score.get(&domain).copied());
        last_score.insert(domain, observation.score());
        points.push(TimelinePoint {
            observation,
            trend,
            improving: trend.is_improvement(domain),
        });
    }

    points
}
