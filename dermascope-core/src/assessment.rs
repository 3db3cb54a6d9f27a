//! Whole-wound risk assessment across all domains
//!
//! Global invariants enforced:
//! - Domains are reported in a fixed order
//! - The overall tier is the most severe domain tier
//! - Identical input yields identical reports

use crate::config::ResolvedConfig;
use crate::error::Result;
use crate::risk::{
    classify_escalated, classify_with_thresholds, display_percent, display_value, Domain,
    RiskTier,
};
use serde::{Deserialize, Serialize};

/// Named finding behind a risk score, e.g. "Bacterial colonisation"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RiskFactor {
    pub name: String,
    pub severity: RiskTier,
    pub description: String,
    pub recommendation: String,
}

impl RiskFactor {
    /// Whether the factor's name mentions one of the domain's keywords
    pub fn applies_to(&self, domain: Domain) -> bool {
        let name = self.name.to_lowercase();
        domain
            .factor_keywords()
            .iter()
            .any(|keyword| name.contains(keyword))
    }
}

/// Raw per-domain scores as produced by the analysis source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RiskAssessment {
    /// 0-1 probability
    pub infection_risk: f64,
    /// cm²/week
    pub healing_velocity: f64,
    /// 0-1 probability
    pub malignancy_risk: f64,
    /// 0-1 probability
    pub amputation_risk: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub factors: Vec<RiskFactor>,
}

impl RiskAssessment {
    pub fn score(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Infection => self.infection_risk,
            Domain::HealingVelocity => self.healing_velocity,
            Domain::Amputation => self.amputation_risk,
            Domain::Malignancy => self.malignancy_risk,
        }
    }
}

/// One classified domain, ready for a risk card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DomainReport {
    pub domain: Domain,
    pub title: &'static str,
    pub score: f64,
    /// Severity bar fill, 0-100
    pub display_percent: u8,
    pub unit: &'static str,
    /// Score as printed on the card, with its unit
    pub display: String,
    pub tier: RiskTier,
    pub badge: &'static str,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub factors: Vec<RiskFactor>,
}

/// Classified assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AssessmentReport {
    pub overall: RiskTier,
    pub urgent_referral: bool,
    pub domains: Vec<DomainReport>,
}

impl AssessmentReport {
    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        use anyhow::Context;
        serde_json::to_string_pretty(self).context("failed to serialize assessment to JSON")
    }
}

/// Classify every domain of an assessment
///
/// Escalation to `critical` is applied when `config.escalate_critical` is set.
pub fn assess(assessment: &RiskAssessment, config: &ResolvedConfig) -> Result<AssessmentReport> {
    let mut domains = Vec::with_capacity(Domain::ALL.len());

    for domain in Domain::ALL {
        let score = assessment.score(domain);
        let classification = if config.escalate_critical {
            classify_escalated(score, domain, &config.thresholds)?
        } else {
            classify_with_thresholds(score, domain, &config.thresholds)?
        };
        domains.push(DomainReport {
            domain,
            title: domain.title(),
            score,
            display_percent: display_percent(score),
            unit: domain.unit(),
            display: display_value(score, domain),
            tier: classification.tier,
            badge: classification.tier.badge(),
            action: classification.action,
            factors: assessment
                .factors
                .iter()
                .filter(|f| f.applies_to(domain))
                .cloned()
                .collect(),
        });
    }

    let overall = domains
        .iter()
        .map(|d| d.tier)
        .max()
        .unwrap_or(RiskTier::Low);
    let urgent_referral = domains.iter().any(|d| d.tier.is_urgent());

    tracing::debug!(
        overall = overall.as_str(),
        urgent_referral,
        "assessment classified"
    );

    Ok(AssessmentReport {
        overall,
        urgent_referral,
        domains,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sample() -> RiskAssessment {
        RiskAssessment {
            infection_risk: 0.41,
            healing_velocity: 0.8,
            malignancy_risk: 0.03,
            amputation_risk: 0.12,
            factors: Vec::new(),
        }
    }

    fn factor(name: &str, severity: RiskTier) -> RiskFactor {
        RiskFactor {
            name: name.to_string(),
            severity,
            description: String::new(),
            recommendation: String::new(),
        }
    }

    #[test]
    fn test_fixed_domain_order() {
        let report = assess(&sample(), &ResolvedConfig::defaults()).unwrap();
        let order: Vec<Domain> = report.domains.iter().map(|d| d.domain).collect();
        assert_eq!(order, Domain::ALL.to_vec());
    }

    #[test]
    fn test_overall_is_max_tier() {
        let report = assess(&sample(), &ResolvedConfig::defaults()).unwrap();
        assert_eq!(report.overall, RiskTier::Medium);
        assert!(!report.urgent_referral);
        assert_eq!(report.domains[0].display_percent, 41);
        assert_eq!(report.domains[0].badge, "MODERATE");
    }

    #[test]
    fn test_escalation_respects_config() {
        let mut assessment = sample();
        assessment.infection_risk = 0.9;

        let report = assess(&assessment, &ResolvedConfig::defaults()).unwrap();
        assert_eq!(report.overall, RiskTier::Critical);
        assert!(report.urgent_referral);

        let config = ResolvedConfig {
            escalate_critical: false,
            ..ResolvedConfig::defaults()
        };
        let report = assess(&assessment, &config).unwrap();
        assert_eq!(report.overall, RiskTier::High);
        assert!(report.urgent_referral);
    }

    #[test]
    fn test_slow_healing_is_urgent() {
        let mut assessment = sample();
        assessment.healing_velocity = 0.2;
        let report = assess(&assessment, &ResolvedConfig::defaults()).unwrap();
        assert_eq!(report.domains[1].tier, RiskTier::High);
        assert_eq!(
            report.domains[1].action,
            "Escalate to district hospital within 24hrs"
        );
        assert!(report.urgent_referral);
    }

    #[test]
    fn test_non_finite_field_names_domain() {
        let mut assessment = sample();
        assessment.amputation_risk = f64::NAN;
        let err = assess(&assessment, &ResolvedConfig::defaults()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidScore {
                domain: Domain::Amputation,
                ..
            }
        ));
    }

    #[test]
    fn test_velocity_displayed_in_its_own_unit() {
        let mut assessment = sample();
        assessment.healing_velocity = 1.4;
        let report = assess(&assessment, &ResolvedConfig::defaults()).unwrap();
        let healing = &report.domains[1];
        assert_eq!(healing.unit, "cm²/wk");
        assert_eq!(healing.display, "1.40 cm²/wk");
        assert_eq!(report.domains[0].display, "41%");
    }

    #[test]
    fn test_factors_grouped_by_domain_keyword() {
        let mut assessment = sample();
        assessment.factors = vec![
            factor("Bacterial colonisation", RiskTier::High),
            factor("Delayed healing", RiskTier::Medium),
            factor("Diabetic neuropathy", RiskTier::High),
            factor("Infection markers in exudate", RiskTier::Medium),
            factor("Irregular pigmentation", RiskTier::Low),
        ];
        let report = assess(&assessment, &ResolvedConfig::defaults()).unwrap();

        let names = |i: usize| -> Vec<&str> {
            report.domains[i]
                .factors
                .iter()
                .map(|f| f.name.as_str())
                .collect()
        };
        assert_eq!(
            names(0),
            vec!["Bacterial colonisation", "Infection markers in exudate"]
        );
        assert_eq!(names(1), vec!["Delayed healing"]);
        assert_eq!(names(2), vec!["Diabetic neuropathy"]);
        assert!(names(3).is_empty());
    }

    #[test]
    fn test_factors_optional_in_input() {
        let json = r#"{"infection_risk": 0.1, "healing_velocity": 1.2, "malignancy_risk": 0.0, "amputation_risk": 0.0}"#;
        let assessment: RiskAssessment = serde_json::from_str(json).unwrap();
        assert!(assessment.factors.is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let report = assess(&sample(), &ResolvedConfig::defaults()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["overall"], "medium");
        assert_eq!(json["domains"][1]["domain"], "healing_velocity");
        assert_eq!(json["domains"][1]["tier"], "medium");
    }
}
