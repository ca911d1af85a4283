//! Scenario runner: selection, browser lifecycle and reporting

use crate::commands::SelectArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{render_tap, JsonReport, OutputFormat, ProgressReporter};
use chrono::Utc;
use std::sync::Arc;
use swagprobe::{
    Browser, RunSummary, Scenario, ScenarioFilter, SessionFactory, SuiteRegistry, SuiteRunner,
};

/// Turn selection flags into a library filter
///
/// # Errors
///
/// Returns `InvalidPattern` (wrapped) for a malformed glob
pub fn build_filter(args: &SelectArgs) -> CliResult<ScenarioFilter> {
    let mut filter = ScenarioFilter::new();
    if let Some(ref pattern) = args.filter {
        filter = filter.with_name(pattern)?;
    }
    for tag in &args.tags {
        filter = filter.with_tag(tag.clone());
    }
    for suite in &args.suites {
        filter = filter.with_suite(suite.clone());
    }
    Ok(filter)
}

/// Scenarios of `registry` chosen by `args`, in registration order
///
/// # Errors
///
/// Returns an error for a malformed name pattern
pub fn select<'r>(registry: &'r SuiteRegistry, args: &SelectArgs) -> CliResult<Vec<&'r Scenario>> {
    Ok(registry.select(&build_filter(args)?))
}

/// Runs selected scenarios and reports them in the configured format
#[derive(Debug)]
pub struct ScenarioRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl ScenarioRunner {
    /// Create a new runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Launch Chromium, run `scenarios`, then shut the browser down
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the fixtures cannot
    /// be loaded or the browser fails to launch. Scenario failures are part
    /// of the returned summary, not errors.
    pub async fn run(&mut self, scenarios: &[&Scenario]) -> CliResult<RunSummary> {
        self.config.validate()?;
        if scenarios.is_empty() {
            self.reporter.warning("No scenarios selected");
            self.emit(&RunSummary::default(), Utc::now())?;
            return Ok(RunSummary::default());
        }

        let browser = Browser::launch(self.config.browser_config()).await?;
        let result = self.run_with(&browser, scenarios).await;
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "browser did not shut down cleanly");
        }
        result
    }

    /// Run `scenarios` on sessions from `factory`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the fixtures
    /// cannot be loaded
    pub async fn run_with(
        &mut self,
        factory: &dyn SessionFactory,
        scenarios: &[&Scenario],
    ) -> CliResult<RunSummary> {
        self.config.validate()?;
        let credentials = Arc::new(self.config.credentials()?);
        let context = self.config.run_context(credentials);
        let started_at = Utc::now();
        let text = self.config.format == OutputFormat::Text;

        if text {
            self.reporter.header("Running Scenarios");
        }
        if self.config.verbosity.is_verbose() {
            self.reporter
                .info(&format!("Target: {}", self.config.base_url));
        }
        self.reporter
            .start_progress(scenarios.len() as u64, "Starting...");

        let reporter = &self.reporter;
        let summary = SuiteRunner::new(self.config.jobs)
            .run(factory, &context, scenarios, |report| {
                reporter.set_message(&report.full_name());
                if text {
                    reporter.scenario(report);
                }
                reporter.increment(1);
            })
            .await;

        self.reporter.finish();
        self.emit(&summary, started_at)?;
        Ok(summary)
    }

    fn emit(&self, summary: &RunSummary, started_at: chrono::DateTime<Utc>) -> CliResult<()> {
        match self.config.format {
            OutputFormat::Text => self.reporter.summary(
                summary.passed(),
                summary.failed(),
                summary.timed_out(),
                summary.duration,
            ),
            OutputFormat::Json => {
                let report = JsonReport::new(summary, started_at, &self.config.base_url);
                println!("{}", report.render()?);
            }
            OutputFormat::Tap => print!("{}", render_tap(summary)),
        }
        Ok(())
    }

    /// Get the reporter (for testing)
    #[must_use]
    pub const fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }
}

/// Map a finished run onto the process result
///
/// # Errors
///
/// Returns `ScenarioFailures` unless every scenario passed
pub fn check_summary(summary: &RunSummary) -> CliResult<()> {
    if summary.all_passed() {
        Ok(())
    } else {
        Err(CliError::scenario_failures(format!(
            "{} failed, {} timed out",
            summary.failed(),
            summary.timed_out()
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;
    use swagprobe::storefront::{inventory_page, login_page};
    use swagprobe::{
        suites, Expectation, MockDriver, MockElement, MockSessionFactory, ScenarioStatus,
        TestSuite, DEFAULT_BASE_URL,
    };

    fn quiet_config() -> CliConfig {
        CliConfig::new()
            .with_color(ColorChoice::Never)
            .with_verbosity(crate::config::Verbosity::Quiet)
            .with_timeout_ms(200)
            .with_poll_interval_ms(5)
    }

    /// A login page whose submit button always lands on the inventory
    fn login_page_driver() -> MockDriver {
        let driver = MockDriver::new();
        {
            let mut dom = driver.dom();
            dom.on_navigate(|dom, _| {
                dom.set_element(&login_page::logo(), MockElement::visible("Swag Labs"));
                dom.set_element(&login_page::username(), MockElement::visible(""));
                dom.set_element(&login_page::password(), MockElement::visible(""));
                dom.set_element(&login_page::submit(), MockElement::visible("Login"));
            });
            dom.on_click(&login_page::submit(), |dom, _| {
                dom.url = format!("{DEFAULT_BASE_URL}{}", inventory_page::PATH);
                dom.set_element(&inventory_page::app_logo(), MockElement::visible("Swag Labs"));
            });
        }
        driver
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_build_filter_combines_flags() {
            let registry = suites::registry().unwrap();
            let args = SelectArgs {
                filter: Some("valid*".to_string()),
                tags: vec!["smoke".to_string()],
                suites: vec!["login".to_string()],
            };
            let selected = select(&registry, &args).unwrap();
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].full_name(), "login::valid credentials");
        }

        #[test]
        fn test_empty_selection_selects_everything() {
            let registry = suites::registry().unwrap();
            let selected = select(&registry, &SelectArgs::default()).unwrap();
            assert_eq!(selected.len(), registry.len());
        }

        #[test]
        fn test_bad_glob_is_error() {
            let args = SelectArgs {
                filter: Some("[oops".to_string()),
                ..SelectArgs::default()
            };
            let err = build_filter(&args).unwrap_err();
            assert!(matches!(
                err,
                CliError::Probe(swagprobe::ProbeError::InvalidPattern { .. })
            ));
        }
    }

    mod runner_tests {
        use super::*;

        #[tokio::test]
        async fn test_run_with_mock_factory() {
            let registry = suites::registry().unwrap();
            let args = SelectArgs {
                filter: Some("valid credentials".to_string()),
                ..SelectArgs::default()
            };
            let selected = select(&registry, &args).unwrap();
            let factory = MockSessionFactory::new(login_page_driver);

            let mut runner = ScenarioRunner::new(quiet_config());
            let summary = runner.run_with(&factory, &selected).await.unwrap();

            assert_eq!(summary.total(), 1);
            assert!(summary.all_passed());
            check_summary(&summary).unwrap();
            assert_eq!(factory.opened(), 1);
        }

        #[tokio::test]
        async fn test_failures_map_to_error() {
            let suite = TestSuite::new("broken").with_scenario(
                Scenario::new("never there")
                    .expect(Expectation::visible(inventory_page::list())),
            );
            let factory = MockSessionFactory::new(login_page_driver);

            let mut runner = ScenarioRunner::new(quiet_config().with_format(OutputFormat::Tap));
            let summary = runner
                .run_with(&factory, &[&suite.scenarios[0]])
                .await
                .unwrap();

            assert_eq!(summary.reports[0].status(), ScenarioStatus::Failed);
            let err = check_summary(&summary).unwrap_err();
            assert!(err.to_string().contains("1 failed, 0 timed out"));
        }

        #[tokio::test]
        async fn test_invalid_config_rejected_before_running() {
            let factory = MockSessionFactory::new(MockDriver::new);
            let mut runner = ScenarioRunner::new(quiet_config().with_base_url(""));
            let scenario = Scenario::new("anything");
            let err = runner.run_with(&factory, &[&scenario]).await.unwrap_err();
            assert!(matches!(err, CliError::Config { .. }));
            assert_eq!(factory.opened(), 0);
        }

        #[tokio::test]
        async fn test_empty_selection_skips_browser() {
            let mut runner = ScenarioRunner::new(quiet_config());
            let summary = runner.run(&[]).await.unwrap();
            assert_eq!(summary.total(), 0);
            check_summary(&summary).unwrap();
        }

        #[tokio::test]
        async fn test_missing_fixture_file_is_error() {
            let factory = MockSessionFactory::new(MockDriver::new);
            let config = quiet_config().with_fixtures("/definitely/not/here.json");
            let mut runner = ScenarioRunner::new(config);
            let scenario = Scenario::new("anything");
            assert!(runner.run_with(&factory, &[&scenario]).await.is_err());
        }
    }
}
