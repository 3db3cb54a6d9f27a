//! Error types for the risk display core.

use crate::risk::Domain;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid {domain} score: {value} is not a finite number")]
    InvalidScore { domain: Domain, value: f64 },

    #[error("invalid confidence: {0} is not a finite number")]
    InvalidConfidence(f64),

    #[error("invalid duration: {0}ms (must be greater than zero)")]
    InvalidDuration(i64),

    #[error("invalid animation value: {0} (start, target and their difference must be finite)")]
    InvalidTarget(f64),

    #[error("cannot compare {current} observation against {previous} observation")]
    DomainMismatch { current: Domain, previous: Domain },
}

pub type Result<T> = std::result::Result<T, Error>;
