//! Capture-quality guidance derived from a frame confidence percentage

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureGuidance {
    Searching,
    Adjusting,
    Optimal,
}

impl CaptureGuidance {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureGuidance::Searching => "searching",
            CaptureGuidance::Adjusting => "adjusting",
            CaptureGuidance::Optimal => "optimal",
        }
    }

    /// Label shown next to the image-quality bar
    pub fn label(&self) -> &'static str {
        match self {
            CaptureGuidance::Searching => "Searching...",
            CaptureGuidance::Adjusting => "Adjusting...",
            CaptureGuidance::Optimal => "Optimal",
        }
    }
}

/// Confidence cutoffs on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureThresholds {
    pub adjusting: f64,
    pub optimal: f64,
}

impl Default for CaptureThresholds {
    fn default() -> Self {
        CaptureThresholds {
            adjusting: 50.0,
            optimal: 80.0,
        }
    }
}

/// Clamp confidence into 0..=100 and map it to guidance
pub fn guidance_for(confidence: f64, thresholds: &CaptureThresholds) -> Result<CaptureGuidance> {
    if !confidence.is_finite() {
        return Err(Error::InvalidConfidence(confidence));
    }
    let confidence = confidence.clamp(0.0, 100.0);
    Ok(if confidence >= thresholds.optimal {
        CaptureGuidance::Optimal
    } else if confidence >= thresholds.adjusting {
        CaptureGuidance::Adjusting
    } else {
        CaptureGuidance::Searching
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cutoffs() {
        let t = CaptureThresholds::default();
        assert_eq!(guidance_for(80.0, &t).unwrap(), CaptureGuidance::Optimal);
        assert_eq!(guidance_for(79.9, &t).unwrap(), CaptureGuidance::Adjusting);
        assert_eq!(guidance_for(50.0, &t).unwrap(), CaptureGuidance::Adjusting);
        assert_eq!(guidance_for(49.9, &t).unwrap(), CaptureGuidance::Searching);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let t = CaptureThresholds::default();
        assert_eq!(guidance_for(140.0, &t).unwrap(), CaptureGuidance::Optimal);
        assert_eq!(guidance_for(-3.0, &t).unwrap(), CaptureGuidance::Searching);
    }

    #[test]
    fn test_non_finite_rejected() {
        let t = CaptureThresholds::default();
        assert!(matches!(
            guidance_for(f64::NAN, &t),
            Err(Error::InvalidConfidence(_))
        ));
    }

    #[test]
    fn test_labels() {
        assert_eq!(CaptureGuidance::Adjusting.label(), "Adjusting...");
        assert_eq!(CaptureGuidance::Optimal.as_str(), "optimal");
    }
}
