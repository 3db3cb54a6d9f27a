//! Risk tier classification
//!
//! Global invariants enforced:
//! - Tier and action text are a pure function of (score, domain, thresholds)
//! - Finite scores are clamped to [0, 1], non-finite scores are rejected
//! - `Critical` is only reached through explicit escalation

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical category a risk score applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Infection,
    HealingVelocity,
    Amputation,
    Malignancy,
}

impl Domain {
    /// Fixed display order used by assessments and timelines
    pub const ALL: [Domain; 4] = [
        Domain::Infection,
        Domain::HealingVelocity,
        Domain::Amputation,
        Domain::Malignancy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Infection => "infection",
            Domain::HealingVelocity => "healing_velocity",
            Domain::Amputation => "amputation",
            Domain::Malignancy => "malignancy",
        }
    }

    /// Human-readable title, as shown on risk cards
    pub fn title(&self) -> &'static str {
        match self {
            Domain::Infection => "Infection Risk",
            Domain::HealingVelocity => "Healing Velocity",
            Domain::Amputation => "Amputation Risk",
            Domain::Malignancy => "Malignancy Risk",
        }
    }

    /// Healing velocity is the only domain where a higher value is better
    pub fn is_inverted(&self) -> bool {
        matches!(self, Domain::HealingVelocity)
    }

    /// Display unit; healing velocity is a rate, everything else a probability
    pub fn unit(&self) -> &'static str {
        match self {
            Domain::HealingVelocity => "cm²/wk",
            _ => "%",
        }
    }

    /// Lower-case keywords that tie a named risk factor to this domain
    pub fn factor_keywords(&self) -> &'static [&'static str] {
        match self {
            Domain::Infection => &["infection", "bacterial"],
            Domain::HealingVelocity => &["healing", "delayed"],
            Domain::Amputation => &["neuropathy", "diabetic"],
            Domain::Malignancy => &[],
        }
    }

    /// Domains whose high scores may be escalated to `Critical`
    pub fn supports_escalation(&self) -> bool {
        matches!(self, Domain::Infection | Domain::Amputation)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete risk tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }

    /// Badge label; medium is shown as MODERATE
    pub fn badge(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MODERATE",
            RiskTier::High => "HIGH",
            RiskTier::Critical => "CRITICAL",
        }
    }

    /// High and critical tiers trigger the urgent referral block
    pub fn is_urgent(&self) -> bool {
        matches!(self, RiskTier::High | RiskTier::Critical)
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cutoffs for probability-like domains (infection, amputation, malignancy)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    pub medium: f64,
    pub high: f64,
    /// Only consulted by [`escalate`]
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            medium: 0.4,
            high: 0.7,
            critical: 0.85,
        }
    }
}

/// Cutoffs for healing velocity, where risk rises as velocity falls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityThresholds {
    pub high_below: f64,
    pub medium_below: f64,
}

impl Default for VelocityThresholds {
    fn default() -> Self {
        VelocityThresholds {
            high_below: 0.5,
            medium_below: 1.0,
        }
    }
}

/// All classifier cutoffs
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thresholds {
    pub risk: RiskThresholds,
    pub velocity: VelocityThresholds,
}

/// Result of classifying one score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: RiskTier,
    pub action: &'static str,
}

const ACTION_CONTINUE: &str = "Continue current PHC treatment plan";
const ACTION_MONITOR: &str = "Monitor closely. Review in 72hrs";

/// Recommended action for a (domain, tier) pair
pub fn action_for(domain: Domain, tier: RiskTier) -> &'static str {
    match (domain, tier) {
        (_, RiskTier::Low) => ACTION_CONTINUE,
        (Domain::HealingVelocity, RiskTier::Medium) => "Increase dressing frequency. Review in 48hrs",
        (_, RiskTier::Medium) => ACTION_MONITOR,
        (Domain::Infection, _) => {
            "Start empirical antibiotics. Refer to district hospital within 24hrs"
        }
        (Domain::Amputation, _) => "Urgent vascular assessment. Refer to surgical unit",
        (Domain::Malignancy, _) => "Biopsy recommended. Refer to dermatology specialist",
        (Domain::HealingVelocity, _) => "Escalate to district hospital within 24hrs",
    }
}

/// Reject non-finite scores and clamp the rest into [0, 1]
pub fn clamp_score(score: f64, domain: Domain) -> Result<f64> {
    if !score.is_finite() {
        return Err(Error::InvalidScore {
            domain,
            value: score,
        });
    }
    Ok(score.clamp(0.0, 1.0))
}

/// Percentage shown next to a score, rounded to a whole number
pub fn display_percent(score: f64) -> u8 {
    if !score.is_finite() {
        return 0;
    }
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Score as shown on a risk card: `41%` or `0.80 cm²/wk`
///
/// Velocity is shown as measured, without clamping.
pub fn display_value(score: f64, domain: Domain) -> String {
    if !score.is_finite() {
        return crate::report::PLACEHOLDER.to_string();
    }
    if domain.is_inverted() {
        format!("{:.2} {}", score, domain.unit())
    } else {
        format!("{}{}", display_percent(score), domain.unit())
    }
}

/// Classify a score with default thresholds
pub fn classify(score: f64, domain: Domain) -> Result<Classification> {
    classify_with_thresholds(score, domain, &Thresholds::default())
}

/// Classify a score with custom thresholds
///
/// Never returns `Critical`; see [`escalate`].
pub fn classify_with_thresholds(
    score: f64,
    domain: Domain,
    thresholds: &Thresholds,
) -> Result<Classification> {
    let score = clamp_score(score, domain)?;
    let tier = if domain.is_inverted() {
        velocity_tier(score, &thresholds.velocity)
    } else {
        probability_tier(score, &thresholds.risk)
    };
    Ok(Classification {
        tier,
        action: action_for(domain, tier),
    })
}

fn probability_tier(score: f64, thresholds: &RiskThresholds) -> RiskTier {
    if score >= thresholds.high {
        RiskTier::High
    } else if score >= thresholds.medium {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

fn velocity_tier(velocity: f64, thresholds: &VelocityThresholds) -> RiskTier {
    if velocity < thresholds.high_below {
        RiskTier::High
    } else if velocity < thresholds.medium_below {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

/// Raise a classification to `Critical` for emergency-escalation displays
///
/// Applies only to infection and amputation scores at or above
/// `thresholds.risk.critical`. Everything else is returned unchanged.
pub fn escalate(
    classification: Classification,
    score: f64,
    domain: Domain,
    thresholds: &Thresholds,
) -> Result<Classification> {
    let score = clamp_score(score, domain)?;
    if domain.supports_escalation() && score >= thresholds.risk.critical {
        return Ok(Classification {
            tier: RiskTier::Critical,
            action: action_for(domain, RiskTier::Critical),
        });
    }
    Ok(classification)
}

/// Classify and escalate in one step
pub fn classify_escalated(
    score: f64,
    domain: Domain,
    thresholds: &Thresholds,
) -> Result<Classification> {
    let classification = classify_with_thresholds(score, domain, thresholds)?;
    escalate(classification, score, domain, thresholds)
}
