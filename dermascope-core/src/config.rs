//! Configuration file support for DermaScope
//!
//! Loads classifier cutoffs and display settings from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.dermascoperc.json` in project root
//! 3. `dermascope.config.json` in project root
//! 4. `"dermascope"` key in `package.json`
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::animate::DEFAULT_FRAME_INTERVAL_MS;
use crate::capture::CaptureThresholds;
use crate::risk::{RiskThresholds, Thresholds, VelocityThresholds};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_DURATION_MS: i64 = 1000;

/// DermaScope configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DermascopeConfig {
    /// Cutoffs for infection, amputation and malignancy scores
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Cutoffs for healing velocity (inverted)
    #[serde(default)]
    pub healing_velocity: Option<VelocityConfig>,

    /// Capture confidence cutoffs (0-100)
    #[serde(default)]
    pub capture: Option<CaptureConfig>,

    /// Count-up animation defaults
    #[serde(default)]
    pub animation: Option<AnimationConfig>,

    /// Raise infection/amputation scores past the critical cutoff to `critical`
    /// in assessments (default: true)
    #[serde(default)]
    pub escalate_critical: Option<bool>,
}

/// Custom risk tier thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Score at which medium risk starts (default: 0.4)
    pub medium: Option<f64>,
    /// Score at which high risk starts (default: 0.7)
    pub high: Option<f64>,
    /// Score at which escalation to critical applies (default: 0.85)
    pub critical: Option<f64>,
}

/// Custom healing velocity thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VelocityConfig {
    /// Velocity below which risk is high (default: 0.5)
    pub high_below: Option<f64>,
    /// Velocity below which risk is medium (default: 1.0)
    pub medium_below: Option<f64>,
}

/// Custom capture guidance thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureConfig {
    /// Confidence at which guidance becomes "adjusting" (default: 50)
    pub adjusting: Option<f64>,
    /// Confidence at which guidance becomes "optimal" (default: 80)
    pub optimal: Option<f64>,
}

/// Animation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationConfig {
    /// Total count-up duration (default: 1000)
    pub duration_ms: Option<i64>,
    /// Time between frames (default: 16)
    pub frame_interval_ms: Option<i64>,
}

/// Resolved configuration with every default filled in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub thresholds: Thresholds,
    pub capture: CaptureThresholds,
    pub duration_ms: i64,
    pub frame_interval_ms: i64,
    pub escalate_critical: bool,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl DermascopeConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        // Validate thresholds are in (0, 1] and ordered
        if let Some(ref t) = self.thresholds {
            let defaults = RiskThresholds::default();
            let medium = t.medium.unwrap_or(defaults.medium);
            let high = t.high.unwrap_or(defaults.high);
            let critical = t.critical.unwrap_or(defaults.critical);

            for (name, val) in [("medium", medium), ("high", high), ("critical", critical)] {
                if val <= 0.0 || val > 1.0 {
                    anyhow::bail!("thresholds.{} must be in (0, 1] (got {})", name, val);
                }
            }
            if medium >= high {
                anyhow::bail!(
                    "thresholds.medium ({}) must be less than thresholds.high ({})",
                    medium,
                    high
                );
            }
            if high >= critical {
                anyhow::bail!(
                    "thresholds.high ({}) must be less than thresholds.critical ({})",
                    high,
                    critical
                );
            }
        }

        // Velocity is clamped to [0, 1] before classification, so cutoffs must fit
        if let Some(ref v) = self.healing_velocity {
            let defaults = VelocityThresholds::default();
            let high_below = v.high_below.unwrap_or(defaults.high_below);
            let medium_below = v.medium_below.unwrap_or(defaults.medium_below);

            for (name, val) in [("high_below", high_below), ("medium_below", medium_below)] {
                if val <= 0.0 || val > 1.0 {
                    anyhow::bail!("healing_velocity.{} must be in (0, 1] (got {})", name, val);
                }
            }
            if high_below >= medium_below {
                anyhow::bail!(
                    "healing_velocity.high_below ({}) must be less than medium_below ({})",
                    high_below,
                    medium_below
                );
            }
        }

        if let Some(ref c) = self.capture {
            let defaults = CaptureThresholds::default();
            let adjusting = c.adjusting.unwrap_or(defaults.adjusting);
            let optimal = c.optimal.unwrap_or(defaults.optimal);

            for (name, val) in [("adjusting", adjusting), ("optimal", optimal)] {
                if val <= 0.0 || val > 100.0 {
                    anyhow::bail!("capture.{} must be in (0, 100] (got {})", name, val);
                }
            }
            if adjusting >= optimal {
                anyhow::bail!(
                    "capture.adjusting ({}) must be less than capture.optimal ({})",
                    adjusting,
                    optimal
                );
            }
        }

        if let Some(ref a) = self.animation {
            for (name, val) in [
                ("duration_ms", a.duration_ms),
                ("frame_interval_ms", a.frame_interval_ms),
            ] {
                if let Some(v) = val {
                    if v <= 0 {
                        anyhow::bail!("animation.{} must be positive (got {})", name, v);
                    }
                }
            }
        }

        Ok(())
    }

    /// Resolve config into the form used by the classifier and presenters
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let risk_defaults = RiskThresholds::default();
        let risk = match &self.thresholds {
            Some(t) => RiskThresholds {
                medium: t.medium.unwrap_or(risk_defaults.medium),
                high: t.high.unwrap_or(risk_defaults.high),
                critical: t.critical.unwrap_or(risk_defaults.critical),
            },
            None => risk_defaults,
        };

        let velocity_defaults = VelocityThresholds::default();
        let velocity = match &self.healing_velocity {
            Some(v) => VelocityThresholds {
                high_below: v.high_below.unwrap_or(velocity_defaults.high_below),
                medium_below: v.medium_below.unwrap_or(velocity_defaults.medium_below),
            },
            None => velocity_defaults,
        };

        let capture_defaults = CaptureThresholds::default();
        let capture = match &self.capture {
            Some(c) => CaptureThresholds {
                adjusting: c.adjusting.unwrap_or(capture_defaults.adjusting),
                optimal: c.optimal.unwrap_or(capture_defaults.optimal),
            },
            None => capture_defaults,
        };

        let (duration_ms, frame_interval_ms) = match &self.animation {
            Some(a) => (
                a.duration_ms.unwrap_or(DEFAULT_DURATION_MS),
                a.frame_interval_ms.unwrap_or(DEFAULT_FRAME_INTERVAL_MS),
            ),
            None => (DEFAULT_DURATION_MS, DEFAULT_FRAME_INTERVAL_MS),
        };

        Ok(ResolvedConfig {
            thresholds: Thresholds { risk, velocity },
            capture,
            duration_ms,
            frame_interval_ms,
            escalate_critical: self.escalate_critical.unwrap_or(true),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Self {
        ResolvedConfig {
            thresholds: Thresholds::default(),
            capture: CaptureThresholds::default(),
            duration_ms: DEFAULT_DURATION_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            escalate_critical: true,
            config_path: None,
        }
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ResolvedConfig::defaults()
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.dermascoperc.json`
/// 2. `dermascope.config.json`
/// 3. `"dermascope"` key in `package.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(DermascopeConfig, PathBuf)>> {
    let rc_path = project_root.join(".dermascoperc.json");
    if rc_path.exists() {
        let config = load_config_file(&rc_path)?;
        return Ok(Some((config, rc_path)));
    }

    let config_path = project_root.join("dermascope.config.json");
    if config_path.exists() {
        let config = load_config_file(&config_path)?;
        return Ok(Some((config, config_path)));
    }

    let pkg_path = project_root.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<DermascopeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: DermascopeConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load config from the "dermascope" key in package.json
fn load_from_package_json(path: &Path) -> Result<Option<DermascopeConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pkg: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match pkg.get("dermascope") {
        Some(value) => {
            let config: DermascopeConfig = serde_json::from_value(value.clone())
                .with_context(|| format!("invalid dermascope config in {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid dermascope config in {}", path.display()))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (DermascopeConfig::default(), None),
        }
    };

    match &source_path {
        Some(path) => tracing::info!(path = %path.display(), "loaded configuration"),
        None => tracing::debug!("no config file found, using defaults"),
    }

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
