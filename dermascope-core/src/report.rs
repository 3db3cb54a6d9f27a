//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::animate::Frame;
use crate::assessment::AssessmentReport;
use crate::error::Error;
use crate::risk::{Classification, Domain};
use crate::trend::{TimelinePoint, TrendResult};
use serde::Serialize;

/// Shown in place of a value that could not be computed
pub const PLACEHOLDER: &str = "—";

/// Classification of a single score, as reported
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassificationReport {
    pub domain: Domain,
    pub score: f64,
    #[serde(flatten)]
    pub classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A display value that could not be produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UnavailableReport {
    pub value: Option<f64>,
    pub error: String,
}

impl From<&Error> for UnavailableReport {
    fn from(error: &Error) -> Self {
        UnavailableReport {
            value: None,
            error: error.to_string(),
        }
    }
}

/// Placeholder line shown instead of a value that failed validation
pub fn render_unavailable_text() -> String {
    format!("{}\n", PLACEHOLDER)
}

/// Render a classification as text
pub fn render_classification_text(report: &ClassificationReport) -> String {
    match report.classification {
        Some(c) => format!(
            "{:<18} {:<8} {:<10} {}\n",
            report.domain.as_str(),
            format!("{:.2}", report.score),
            c.tier.badge(),
            c.action
        ),
        None => format!(
            "{:<18} {:<8} {:<10} {}\n",
            report.domain.as_str(),
            PLACEHOLDER,
            PLACEHOLDER,
            PLACEHOLDER
        ),
    }
}

/// Render a trend as text
pub fn render_trend_text(trend: &TrendResult, domain: Option<Domain>) -> String {
    let mut output = format!("{:<6} {}", trend.direction.as_str(), trend.display());
    if let Some(domain) = domain {
        let verdict = if trend.is_improvement(domain) {
            "improving"
        } else if trend.direction == crate::trend::TrendDirection::Flat {
            "stable"
        } else {
            "worsening"
        };
        output.push_str(&format!(" ({})", verdict));
    }
    output.push('\n');
    output
}

/// Render a timeline as a table
pub fn render_timeline_text(points: &[TimelinePoint]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<12} {:<18} {:<8} {:<6} {:<9} {}\n",
        "TIMESTAMP", "DOMAIN", "SCORE", "TREND", "DELTA", "IMPROVING"
    ));
    for point in points {
        output.push_str(&format!(
            "{:<12} {:<18} {:<8} {:<6} {:<9} {}\n",
            point.observation.timestamp(),
            point.observation.domain().as_str(),
            format!("{:.2}", point.observation.score()),
            point.trend.direction.as_str(),
            point.trend.display(),
            if point.improving { "yes" } else { "no" }
        ));
    }
    output
}

/// Render an assessment as text
pub fn render_assessment_text(report: &AssessmentReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Overall risk: {}\n",
        report.overall.badge()
    ));
    if report.urgent_referral {
        output.push_str("URGENT REFERRAL\n");
    }
    output.push('\n');
    output.push_str(&format!(
        "{:<18} {:<12} {:<10} {}\n",
        "DOMAIN", "SCORE", "TIER", "ACTION"
    ));
    for d in &report.domains {
        output.push_str(&format!(
            "{:<18} {:<12} {:<10} {}\n",
            d.title, d.display, d.badge, d.action
        ));
        for factor in &d.factors {
            output.push_str(&format!(
                "  - {} ({}): {}\n",
                factor.name,
                factor.severity.badge(),
                factor.recommendation
            ));
        }
    }
    output
}

/// Render one animation frame as text
pub fn render_frame_text(frame: &Frame) -> String {
    format!(
        "{:>5} {:>7}ms {:.2}\n",
        frame.index, frame.elapsed_ms, frame.value
    )
}

/// Render any serializable report as pretty JSON
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}
