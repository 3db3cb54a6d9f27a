//! DermaScope CLI - risk classification, trends and count-up frames for wound assessments

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Invalid scores render as a placeholder, never as NaN

use anyhow::Context;
use clap::{Parser, Subcommand};
use dermascope_core::capture::guidance_for;
use dermascope_core::config::{self, ResolvedConfig};
use dermascope_core::report::{
    render_assessment_text, render_classification_text, render_frame_text, render_json,
    render_timeline_text, render_trend_text, render_unavailable_text, ClassificationReport,
    UnavailableReport,
};
use dermascope_core::risk::classify_escalated;
use dermascope_core::{
    assess, classify_with_thresholds, drive, format_trend, present_from, timeline, Domain, Error,
    Frame, FrameTicker, RiskAssessment, RiskObservation,
};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dermascope")]
#[command(about = "Risk tiers, trends and display frames for wound assessments")]
#[command(version = env!("DERMASCOPE_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single score into a risk tier and recommended action
    Classify {
        /// Raw score (probability for risk domains, cm²/week for healing velocity)
        #[arg(allow_negative_numbers = true)]
        score: f64,

        /// Risk domain the score belongs to
        #[arg(long)]
        domain: DomainArg,

        /// Escalate infection/amputation scores at or above the critical cutoff
        #[arg(long)]
        escalate: bool,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Compare a value against the previous observation
    Trend {
        /// Current value
        #[arg(allow_negative_numbers = true)]
        current: f64,

        /// Previous value (omit for a first observation)
        #[arg(long, allow_negative_numbers = true)]
        previous: Option<f64>,

        /// Domain, used to say whether the movement is an improvement
        #[arg(long)]
        domain: Option<DomainArg>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Emit the eased count-up frames for a displayed value
    Animate {
        /// Value the display settles on
        #[arg(allow_negative_numbers = true)]
        target: f64,

        /// Value the display starts from
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        from: f64,

        /// Animation duration (overrides config file)
        #[arg(long)]
        duration_ms: Option<i64>,

        /// Frame interval (overrides config file)
        #[arg(long)]
        frame_interval_ms: Option<i64>,

        /// Sleep between frames instead of printing them immediately
        #[arg(long)]
        realtime: bool,

        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<usize>,

        /// Output format (json emits one object per line)
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Classify every domain of an assessment file
    Assess {
        /// JSON file with infection_risk, healing_velocity, malignancy_risk, amputation_risk
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Order observations and compute per-domain trends
    Timeline {
        /// JSON file containing an array of observations
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Map a frame confidence percentage to capture guidance
    Capture {
        /// Detection confidence, 0-100
        #[arg(allow_negative_numbers = true)]
        confidence: f64,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate or inspect configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DomainArg {
    Infection,
    HealingVelocity,
    Amputation,
    Malignancy,
}

impl From<DomainArg> for Domain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Infection => Domain::Infection,
            DomainArg::HealingVelocity => Domain::HealingVelocity,
            DomainArg::Amputation => Domain::Amputation,
            DomainArg::Malignancy => Domain::Malignancy,
        }
    }
}

/// Paces frames with a blocking sleep
struct SleepTicker;

impl FrameTicker for SleepTicker {
    fn wait(&mut self, interval_ms: i64) {
        std::thread::sleep(Duration::from_millis(interval_ms.max(0) as u64));
    }
}

/// Delivers frames back-to-back
struct ImmediateTicker;

impl FrameTicker for ImmediateTicker {
    fn wait(&mut self, _interval_ms: i64) {}
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            score,
            domain,
            escalate,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let domain = Domain::from(domain);

            let result = if escalate {
                classify_escalated(score, domain, &resolved.thresholds)
            } else {
                classify_with_thresholds(score, domain, &resolved.thresholds)
            };

            let report = match result {
                Ok(classification) => ClassificationReport {
                    domain,
                    score,
                    classification: Some(classification),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "score could not be classified");
                    ClassificationReport {
                        domain,
                        score,
                        classification: None,
                        error: Some(e.to_string()),
                    }
                }
            };

            match format {
                OutputFormat::Text => print!("{}", render_classification_text(&report)),
                OutputFormat::Json => println!("{}", render_json(&report)),
            }
        }
        Commands::Trend {
            current,
            previous,
            domain,
            format,
        } => {
            let trend = format_trend(current, previous);
            match format {
                OutputFormat::Text => {
                    print!("{}", render_trend_text(&trend, domain.map(Domain::from)))
                }
                OutputFormat::Json => println!("{}", render_json(&trend)),
            }
        }
        Commands::Animate {
            target,
            from,
            duration_ms,
            frame_interval_ms,
            realtime,
            max_frames,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let duration_ms = duration_ms.unwrap_or(resolved.duration_ms);
            let interval_ms = frame_interval_ms.unwrap_or(resolved.frame_interval_ms);

            let sequence = match present_from(from, target, duration_ms, interval_ms) {
                Ok(sequence) => sequence,
                Err(e) => {
                    tracing::warn!(error = %e, "animation could not be started");
                    print!("{}", unavailable_output(format, &e));
                    return Ok(());
                }
            };

            let mut emitted = 0usize;
            let sink = |frame: Frame| {
                match format {
                    OutputFormat::Text => print!("{}", render_frame_text(&frame)),
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string(&frame).unwrap_or_default())
                    }
                }
                emitted += 1;
                match max_frames {
                    Some(max) if emitted >= max => ControlFlow::Break(()),
                    _ => ControlFlow::Continue(()),
                }
            };

            let delivered = if realtime {
                drive(sequence, &mut SleepTicker, sink)
            } else {
                drive(sequence, &mut ImmediateTicker, sink)
            };
            tracing::debug!(delivered, "animation finished");
        }
        Commands::Assess {
            path,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let assessment: RiskAssessment = read_json(&path)?;
            let report = assess(&assessment, &resolved)
                .with_context(|| format!("failed to assess {}", path.display()))?;

            match format {
                OutputFormat::Text => print!("{}", render_assessment_text(&report)),
                OutputFormat::Json => println!("{}", report.to_json()?),
            }
        }
        Commands::Timeline { path, format } => {
            let observations: Vec<RiskObservation> = read_json(&path)?;
            let points = timeline(&observations);

            match format {
                OutputFormat::Text => print!("{}", render_timeline_text(&points)),
                OutputFormat::Json => println!("{}", render_json(&points)),
            }
        }
        Commands::Capture {
            confidence,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let guidance = match guidance_for(confidence, &resolved.capture) {
                Ok(guidance) => guidance,
                Err(e) => {
                    tracing::warn!(error = %e, "confidence could not be classified");
                    print!("{}", unavailable_output(format, &e));
                    return Ok(());
                }
            };

            match format {
                OutputFormat::Text => println!("{}", guidance.label()),
                OutputFormat::Json => println!(
                    "{}",
                    render_json(&serde_json::json!({
                        "confidence": confidence.clamp(0.0, 100.0),
                        "guidance": guidance,
                        "label": guidance.label(),
                    }))
                ),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                match config::load_and_resolve(&project_root, path.as_deref()) {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let resolved = load_config(path.as_deref())?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Placeholder output for a value the core rejected
fn unavailable_output(format: OutputFormat, error: &Error) -> String {
    match format {
        OutputFormat::Text => render_unavailable_text(),
        OutputFormat::Json => format!("{}\n", render_json(&UnavailableReport::from(error))),
    }
}

fn load_config(config_path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let project_root = std::env::current_dir()?;
    config::load_and_resolve(&project_root, config_path).context("failed to load configuration")
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    match resolved.config_path {
        Some(ref p) => println!("  Source: {}", p.display()),
        None => println!("  Source: defaults (no config file found)"),
    }
    println!();
    println!("Risk thresholds:");
    println!("  medium: {}", resolved.thresholds.risk.medium);
    println!("  high: {}", resolved.thresholds.risk.high);
    println!("  critical: {}", resolved.thresholds.risk.critical);
    println!();
    println!("Healing velocity (cm²/week):");
    println!("  high below: {}", resolved.thresholds.velocity.high_below);
    println!("  medium below: {}", resolved.thresholds.velocity.medium_below);
    println!();
    println!("Capture confidence:");
    println!("  adjusting: {}", resolved.capture.adjusting);
    println!("  optimal: {}", resolved.capture.optimal);
    println!();
    println!("Animation:");
    println!("  duration_ms: {}", resolved.duration_ms);
    println!("  frame_interval_ms: {}", resolved.frame_interval_ms);
    println!();
    println!("Escalate critical: {}", resolved.escalate_critical);
}
