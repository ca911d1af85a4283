//! Output formatting and progress reporting

use crate::error::CliResult;
use chrono::{DateTime, Utc};
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use swagprobe::{RunSummary, ScenarioReport, ScenarioStatus};
use uuid::Uuid;

/// Output format for scenario results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
    /// TAP (Test Anything Protocol)
    Tap,
}

/// Progress reporter for a scenario run
///
/// Progress and diagnostics go to stderr; per-scenario outcome lines go to
/// stdout so they can be piped.
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    out: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            out: Term::stdout(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn write(&self, term: &Term, line: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.suspend(|| {
                let _ = term.write_line(line);
            }),
            None => {
                let _ = term.write_line(line);
            }
        }
    }

    fn prefixed(&self, symbol: &str, plain: &str, color: Style) -> String {
        if self.use_color {
            color.bold().apply_to(symbol).to_string()
        } else {
            plain.to_string()
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefixed("⚠", "WARN", Style::new().yellow());
        self.write(&self.term, &format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefixed("ℹ", "INFO", Style::new().blue());
        self.write(&self.term, &format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.write(&self.term, "");
        self.write(&self.term, &styled);
    }

    /// Print the outcome line of one scenario, plus failure details
    pub fn scenario(&self, report: &ScenarioReport) {
        let status = report.status();
        if self.quiet && status == ScenarioStatus::Passed {
            return;
        }

        let label = format!("{:<7}", status.to_string());
        let label = if self.use_color {
            let color = match status {
                ScenarioStatus::Passed => Style::new().green(),
                ScenarioStatus::Failed => Style::new().red(),
                ScenarioStatus::TimedOut => Style::new().yellow(),
            };
            color.bold().apply_to(label).to_string()
        } else {
            label
        };
        self.write(
            &self.out,
            &format!(
                "{label} {} ({:.2}s)",
                report.full_name(),
                report.duration.as_secs_f64()
            ),
        );

        if let Some(failure) = report.outcome.failure() {
            self.write(&self.out, &format!("        {failure}"));
        }
        if let Some(ref shot) = report.screenshot {
            self.write(&self.out, &format!("        screenshot: {}", shot.display()));
        }
    }

    /// Print run summary
    pub fn summary(&self, passed: usize, failed: usize, timed_out: usize, duration: Duration) {
        let broken = failed + timed_out;
        if self.quiet && broken == 0 {
            return;
        }

        let total = passed + broken;
        let duration_secs = duration.as_secs_f64();
        self.write(&self.term, "");

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let timeout_style = Style::new().yellow();

            let status = if broken > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            self.write(
                &self.term,
                &format!(
                    "{} {} scenarios in {:.2}s ({} passed, {} failed, {} timed out)",
                    status,
                    total,
                    duration_secs,
                    passed_style.apply_to(passed),
                    if failed > 0 {
                        failed_style.apply_to(failed).to_string()
                    } else {
                        failed.to_string()
                    },
                    timeout_style.apply_to(timed_out)
                ),
            );
        } else {
            let status = if broken > 0 { "FAILED" } else { "PASSED" };
            self.write(
                &self.term,
                &format!(
                    "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed, {timed_out} timed out)"
                ),
            );
        }
    }
}

/// One scenario in the JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioEntry {
    /// Scenario name
    pub name: String,
    /// Owning suite
    pub suite: String,
    /// pass / fail / timeout
    pub status: ScenarioStatus,
    /// Wall-clock time in milliseconds
    pub duration_ms: u64,
    /// Failing step (0 = setup)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    /// Failing action or expectation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure screenshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl From<&ScenarioReport> for ScenarioEntry {
    fn from(report: &ScenarioReport) -> Self {
        let failure = report.outcome.failure();
        Self {
            name: report.name.clone(),
            suite: report.suite.clone(),
            status: report.status(),
            duration_ms: report.duration.as_millis() as u64,
            step: failure.map(|f| f.step_index),
            description: failure.map(|f| f.description.clone()),
            error: failure.map(|f| f.error.to_string()),
            screenshot: report.screenshot.clone(),
        }
    }
}

/// Machine-readable report of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Unique id of this run
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Storefront the run targeted
    pub base_url: String,
    /// Wall-clock time in milliseconds
    pub duration_ms: u64,
    /// Passed scenarios
    pub passed: usize,
    /// Failed scenarios
    pub failed: usize,
    /// Timed-out scenarios
    pub timed_out: usize,
    /// Per-scenario entries, in registration order
    pub scenarios: Vec<ScenarioEntry>,
}

impl JsonReport {
    /// Build the report for `summary`
    #[must_use]
    pub fn new(summary: &RunSummary, started_at: DateTime<Utc>, base_url: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            base_url: base_url.to_string(),
            duration_ms: summary.duration.as_millis() as u64,
            passed: summary.passed(),
            failed: summary.failed(),
            timed_out: summary.timed_out(),
            scenarios: summary.reports.iter().map(ScenarioEntry::from).collect(),
        }
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn render(&self) -> CliResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// TAP version 13 rendering of `summary`
#[must_use]
pub fn render_tap(summary: &RunSummary) -> String {
    let mut out = format!("TAP version 13\n1..{}\n", summary.total());
    for (i, report) in summary.reports.iter().enumerate() {
        let n = i + 1;
        match report.status() {
            ScenarioStatus::Passed => out.push_str(&format!("ok {n} - {}\n", report.full_name())),
            ScenarioStatus::Failed => {
                out.push_str(&format!("not ok {n} - {}\n", report.full_name()));
            }
            ScenarioStatus::TimedOut => {
                out.push_str(&format!("not ok {n} - {} # timeout\n", report.full_name()));
            }
        }
        if let Some(failure) = report.outcome.failure() {
            for line in failure.to_string().lines() {
                out.push_str(&format!("# {line}\n"));
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use swagprobe::{ProbeError, ScenarioOutcome, StepFailure};

    fn report(name: &str, outcome: ScenarioOutcome) -> ScenarioReport {
        ScenarioReport {
            name: name.to_string(),
            suite: "login".to_string(),
            outcome,
            duration: Duration::from_millis(1500),
            screenshot: None,
        }
    }

    fn summary() -> RunSummary {
        RunSummary {
            reports: vec![
                report("valid credentials", ScenarioOutcome::Passed),
                report(
                    "locked out user",
                    ScenarioOutcome::Failed(StepFailure {
                        step_index: 1,
                        description: "css=.error-message-container visible".to_string(),
                        error: ProbeError::AssertionTimeout {
                            expectation: "css=.error-message-container visible".to_string(),
                            last_observed: "no matching element".to_string(),
                            timeout_ms: 5000,
                        },
                    }),
                ),
                report(
                    "persona performance_glitch reaches inventory",
                    ScenarioOutcome::TimedOut(StepFailure {
                        step_index: 1,
                        description: "login performance_glitch".to_string(),
                        error: ProbeError::ScenarioTimeout {
                            name: "persona performance_glitch reaches inventory".to_string(),
                            timeout_ms: 60_000,
                        },
                    }),
                ),
            ],
            duration: Duration::from_secs(4),
        }
    }

    mod output_format_tests {
        use super::*;

        #[test]
        fn test_default_format() {
            assert_eq!(OutputFormat::default(), OutputFormat::Text);
        }

        #[test]
        fn test_serde_lowercase() {
            assert_eq!(serde_json::to_string(&OutputFormat::Tap).unwrap(), "\"tap\"");
            let f: OutputFormat = serde_json::from_str("\"json\"").unwrap();
            assert_eq!(f, OutputFormat::Json);
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_scenario_lines_and_summary() {
            let reporter = ProgressReporter::new(false, false);
            for r in &summary().reports {
                reporter.scenario(r);
            }
            reporter.summary(1, 1, 1, Duration::from_secs(4));
            // No panic = success
        }

        #[test]
        fn test_progress_bar() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(3, "Running scenarios");
            reporter.increment(1);
            reporter.set_message("login::valid credentials");
            reporter.warning("slow persona");
            reporter.increment(2);
            reporter.finish();
        }

        #[test]
        fn test_quiet_mode_suppresses_output() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Running scenarios");
            assert!(reporter.progress_bar.is_none());
            reporter.warning("hidden");
            reporter.info("hidden");
            reporter.header("hidden");
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_json_report() {
            let started = Utc::now();
            let report = JsonReport::new(&summary(), started, "https://www.saucedemo.com/");
            assert_eq!(report.passed, 1);
            assert_eq!(report.failed, 1);
            assert_eq!(report.timed_out, 1);
            assert_eq!(report.duration_ms, 4000);

            let json = report.render().unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["scenarios"][0]["status"], "passed");
            assert!(value["scenarios"][0].get("error").is_none());
            assert_eq!(value["scenarios"][1]["status"], "failed");
            assert_eq!(value["scenarios"][1]["step"], 1);
            assert_eq!(value["scenarios"][2]["status"], "timed_out");
            assert_eq!(value["run_id"].as_str().unwrap().len(), 36);
        }

        #[test]
        fn test_tap_report() {
            let tap = render_tap(&summary());
            let lines: Vec<&str> = tap.lines().collect();
            assert_eq!(lines[0], "TAP version 13");
            assert_eq!(lines[1], "1..3");
            assert_eq!(lines[2], "ok 1 - login::valid credentials");
            assert_eq!(lines[3], "not ok 2 - login::locked out user");
            assert!(lines[4].starts_with("# step 1:"));
            assert!(tap.contains("not ok 3 - login::persona performance_glitch reaches inventory # timeout"));
        }

        #[test]
        fn test_empty_tap() {
            let tap = render_tap(&RunSummary::default());
            assert_eq!(tap, "TAP version 13\n1..0\n");
        }
    }
}
