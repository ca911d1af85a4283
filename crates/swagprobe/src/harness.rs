//! Test harness for registering, selecting and running scenarios.

use crate::driver::SessionFactory;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{RunContext, Scenario, ScenarioExecutor, ScenarioReport, ScenarioStatus};
use futures::stream::{self, StreamExt};
use glob::Pattern;
use std::time::{Duration, Instant};

/// A named group of scenarios
#[derive(Debug, Clone)]
pub struct TestSuite {
    /// Suite name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Scenarios in registration order
    pub scenarios: Vec<Scenario>,
}

impl TestSuite {
    /// Create a new test suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            scenarios: Vec::new(),
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a scenario, claiming it for this suite
    pub fn add(&mut self, scenario: Scenario) {
        self.scenarios.push(scenario.in_suite(self.name.clone()));
    }

    /// Builder form of [`TestSuite::add`]
    #[must_use]
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.add(scenario);
        self
    }

    /// Get the number of scenarios
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }
}

/// Every known suite, in registration order
#[derive(Debug, Clone, Default)]
pub struct SuiteRegistry {
    suites: Vec<TestSuite>,
}

impl SuiteRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a suite
    ///
    /// # Errors
    ///
    /// Returns `InvalidExpectation` if a suite with the same name exists or
    /// the suite holds two scenarios with the same name
    pub fn register(&mut self, suite: TestSuite) -> ProbeResult<()> {
        if self.suite(&suite.name).is_some() {
            return Err(ProbeError::InvalidExpectation {
                message: format!("suite '{}' registered twice", suite.name),
            });
        }
        for (i, scenario) in suite.scenarios.iter().enumerate() {
            if suite.scenarios[..i].iter().any(|s| s.name == scenario.name) {
                return Err(ProbeError::InvalidExpectation {
                    message: format!("duplicate scenario '{}'", scenario.full_name()),
                });
            }
        }
        self.suites.push(suite);
        Ok(())
    }

    /// All suites
    #[must_use]
    pub fn suites(&self) -> &[TestSuite] {
        &self.suites
    }

    /// Suite by name
    #[must_use]
    pub fn suite(&self, name: &str) -> Option<&TestSuite> {
        self.suites.iter().find(|s| s.name == name)
    }

    /// All scenarios, suite by suite
    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.suites.iter().flat_map(|s| s.scenarios.iter())
    }

    /// Total number of scenarios
    #[must_use]
    pub fn len(&self) -> usize {
        self.suites.iter().map(TestSuite::scenario_count).sum()
    }

    /// Whether no scenario is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scenarios passing `filter`, in registration order
    #[must_use]
    pub fn select(&self, filter: &ScenarioFilter) -> Vec<&Scenario> {
        self.scenarios().filter(|s| filter.matches(s)).collect()
    }
}

/// Selects scenarios by name, tag and suite
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    name: Option<NameFilter>,
    tags: Vec<String>,
    suites: Vec<String>,
}

#[derive(Debug, Clone)]
enum NameFilter {
    Glob(Pattern),
    Substring(String),
}

impl ScenarioFilter {
    /// Filter that keeps everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep scenarios whose name matches `pattern`.
    ///
    /// Patterns containing `*`, `?` or `[` are globs matched against both
    /// `name` and `suite::name`; anything else is a case-insensitive
    /// substring.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for a malformed glob
    pub fn with_name(mut self, pattern: &str) -> ProbeResult<Self> {
        let filter = if pattern.contains(['*', '?', '[']) {
            NameFilter::Glob(Pattern::new(pattern).map_err(|e| ProbeError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?)
        } else {
            NameFilter::Substring(pattern.to_lowercase())
        };
        self.name = Some(filter);
        Ok(self)
    }

    /// Keep scenarios carrying any of the added tags
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Keep scenarios from any of the added suites
    #[must_use]
    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suites.push(suite.into());
        self
    }

    /// Whether `scenario` passes every configured criterion
    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        let name_ok = match &self.name {
            None => true,
            Some(NameFilter::Glob(p)) => {
                p.matches(&scenario.name) || p.matches(&scenario.full_name())
            }
            Some(NameFilter::Substring(s)) => scenario.full_name().to_lowercase().contains(s),
        };
        let tag_ok = self.tags.is_empty() || self.tags.iter().any(|t| scenario.has_tag(t));
        let suite_ok = self.suites.is_empty() || self.suites.iter().any(|s| *s == scenario.suite);
        name_ok && tag_ok && suite_ok
    }
}

/// Reports of one run, in registration order
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One report per selected scenario
    pub reports: Vec<ScenarioReport>,
    /// Wall-clock time of the run
    pub duration: Duration,
}

impl RunSummary {
    fn count(&self, status: ScenarioStatus) -> usize {
        self.reports.iter().filter(|r| r.status() == status).count()
    }

    /// Number of passed scenarios
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    /// Number of timed-out scenarios
    #[must_use]
    pub fn timed_out(&self) -> usize {
        self.count(ScenarioStatus::TimedOut)
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// Check if every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(ScenarioReport::passed)
    }

    /// Reports that did not pass
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.reports.iter().filter(|r| !r.passed()).collect()
    }
}

/// Runs selected scenarios with bounded parallelism
#[derive(Debug, Clone, Copy, Default)]
pub struct SuiteRunner {
    jobs: usize,
}

impl SuiteRunner {
    /// Run up to `jobs` scenarios at once; 0 means available parallelism
    #[must_use]
    pub const fn new(jobs: usize) -> Self {
        Self { jobs }
    }

    /// Effective concurrency
    #[must_use]
    pub fn concurrency(&self) -> usize {
        if self.jobs > 0 {
            self.jobs
        } else {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        }
    }

    /// Run `scenarios`; `on_report` sees each report as it completes
    pub async fn run<F>(
        &self,
        factory: &dyn SessionFactory,
        context: &RunContext,
        scenarios: &[&Scenario],
        mut on_report: F,
    ) -> RunSummary
    where
        F: FnMut(&ScenarioReport),
    {
        let start = Instant::now();
        let jobs = self.concurrency();
        tracing::info!(scenarios = scenarios.len(), jobs, "starting run");

        let executor = ScenarioExecutor::new(factory, context);
        let executor = &executor;
        let mut indexed: Vec<(usize, ScenarioReport)> = stream::iter(scenarios.iter().enumerate())
            .map(|(i, scenario)| async move { (i, executor.run(scenario).await) })
            .buffer_unordered(jobs)
            .inspect(|(_, report)| on_report(report))
            .collect()
            .await;

        indexed.sort_by_key(|(i, _)| *i);
        let summary = RunSummary {
            reports: indexed.into_iter().map(|(_, r)| r).collect(),
            duration: start.elapsed(),
        };
        tracing::info!(
            passed = summary.passed(),
            failed = summary.failed(),
            timed_out = summary.timed_out(),
            "run finished"
        );
        summary
    }
}
