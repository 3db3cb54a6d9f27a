//! Scored observations supplied by the (external) assessment source

use crate::error::{Error, Result};
use crate::risk::{classify_with_thresholds, Classification, Domain, Thresholds};
use serde::{Deserialize, Serialize};

/// One risk score for one domain at one point in time
///
/// Fields are private so a constructed observation always holds a finite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawObservation")]
pub struct RiskObservation {
    score: f64,
    domain: Domain,
    /// Unix seconds
    timestamp: i64,
}

#[derive(Deserialize)]
struct RawObservation {
    score: f64,
    domain: Domain,
    timestamp: i64,
}

impl TryFrom<RawObservation> for RiskObservation {
    type Error = Error;

    fn try_from(raw: RawObservation) -> Result<Self> {
        RiskObservation::new(raw.score, raw.domain, raw.timestamp)
    }
}

impl RiskObservation {
    pub fn new(score: f64, domain: Domain, timestamp: i64) -> Result<Self> {
        if !score.is_finite() {
            return Err(Error::InvalidScore {
                domain,
                value: score,
            });
        }
        Ok(RiskObservation {
            score,
            domain,
            timestamp,
        })
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Tier and action for this observation
    pub fn classify(&self, thresholds: &Thresholds) -> Result<Classification> {
        classify_with_thresholds(self.score, self.domain, thresholds)
    }
}
