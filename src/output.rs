// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes for reports and exec results.

use serde::Serialize;
use std::time::Instant;

use crate::report::{ContainerReport, SessionReport, UpdateState};
use crate::update::ExecOutcome;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                println!("{message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "success",
                    message,
                    duration_secs: if self.start_time.is_some() {
                        Some(self.elapsed_secs())
                    } else {
                        None
                    },
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: if self.start_time.is_some() {
                        Some(self.elapsed_secs())
                    } else {
                        None
                    },
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print a non-fatal warning (suppressed in quiet mode).
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "warning",
                    message,
                    duration_secs: None,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print a suggestion for resolving the error that follows.
    pub fn hint(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Hint: {message}"),
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "hint",
                    message,
                    duration_secs: None,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print a session report: one line per container, then a summary.
    pub fn report(&self, report: &SessionReport) {
        let summary = summary_line(report);
        match self.mode {
            OutputMode::Normal => {
                for container in report.scanned() {
                    println!("  {}", container_line(container));
                }
                println!("{summary}");
            }
            OutputMode::Quiet => println!("{summary}"),
            OutputMode::Json => {
                for container in report.scanned() {
                    let event = JsonContainer {
                        event: "container",
                        container,
                    };
                    if let Ok(json) = serde_json::to_string(&event) {
                        println!("{json}");
                    }
                }
                let event = JsonSummary {
                    event: "summary",
                    started: report.started.to_rfc3339(),
                    finished: report.finished.to_rfc3339(),
                    scanned: report.scanned().len(),
                    updated: report.updated().len(),
                    stale: report.stale().len(),
                    fresh: report.fresh().len(),
                    skipped: report.skipped().len(),
                    failed: report.failed().len(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print the result of a command run in a container.
    pub fn exec_outcome(&self, outcome: &ExecOutcome) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                if !outcome.output().is_empty() {
                    println!("{}", outcome.output());
                }
                if let ExecOutcome::Unfinished { .. } = outcome {
                    eprintln!("Command still running");
                }
            }
            OutputMode::Json => {
                let event = JsonExec {
                    event: "exec",
                    exit_code: outcome.exit_code(),
                    finished: !matches!(outcome, ExecOutcome::Unfinished { .. }),
                    output: outcome.output(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }
}

fn container_line(container: &ContainerReport) -> String {
    let state = match container.state {
        UpdateState::Scanned => "scanned",
        UpdateState::Stale => "update available",
        UpdateState::Fresh => "up to date",
        UpdateState::Updated => "updated",
        UpdateState::Skipped => "skipped (monitor only)",
        UpdateState::Failed => "failed",
    };
    let mut line = format!("{} ({}): {}", container.name, container.image_name, state);
    if container.state != UpdateState::Fresh {
        if let Some(latest) = &container.latest_image {
            line.push_str(&format!(
                " [{} -> {}]",
                container.current_image.short(),
                latest.short()
            ));
        }
    }
    if let Some(error) = &container.error {
        line.push_str(&format!(": {error}"));
    }
    line
}

fn summary_line(report: &SessionReport) -> String {
    format!(
        "Scanned {}, updated {}, update available {}, up to date {}, skipped {}, failed {}",
        report.scanned().len(),
        report.updated().len(),
        report.stale().len(),
        report.fresh().len(),
        report.skipped().len(),
        report.failed().len()
    )
}

#[derive(Serialize)]
struct JsonContainer<'a> {
    event: &'a str,
    #[serde(flatten)]
    container: &'a ContainerReport,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    event: &'a str,
    started: String,
    finished: String,
    scanned: usize,
    updated: usize,
    stale: usize,
    fresh: usize,
    skipped: usize,
    failed: usize,
}

#[derive(Serialize)]
struct JsonExec<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i64>,
    finished: bool,
    output: &'a str,
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
