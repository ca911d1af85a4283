//! Scenarios and the executor that runs them.
//!
//! A [`Scenario`] is an ordered list of [`Step`]s, each an optional
//! [`Action`] followed by expectations. The [`ScenarioExecutor`] runs one
//! scenario on a fresh [`PageSession`]:
//!
//! ```text
//! open session ─► goto base URL ─► step 1 ─► step 2 ─► ... ─► close
//!                      │              │         │
//!                      └──── first failure ─────┴──► screenshot ─► close
//! ```
//!
//! Setup (the base-URL navigation) is reported as step 0; declared steps are
//! numbered from 1.

use crate::assertion::{self, Expectation};
use crate::driver::SessionFactory;
use crate::emulation::Viewport;
use crate::fixture::CredentialStore;
use crate::locator::Locator;
use crate::login::login;
use crate::result::{ProbeError, ProbeResult};
use crate::session::{PageSession, DEFAULT_BASE_URL};
use crate::wait::PollConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Default budget for one whole scenario (60 seconds)
pub const DEFAULT_SCENARIO_TIMEOUT_MS: u64 = 60_000;

/// Something a step does to the page
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Navigate to a path (relative to the base URL) or absolute URL
    Navigate(String),
    /// Replace the value of an input
    Fill {
        /// Input to fill
        locator: Locator,
        /// New value
        value: String,
    },
    /// Click an element
    Click(Locator),
    /// Choose a `<select>` option by value
    Select {
        /// The `<select>` control
        locator: Locator,
        /// Option value
        value: String,
    },
    /// Resize the viewport
    SetViewport(Viewport),
    /// Log in as a fixture user, optionally overriding the password
    Login {
        /// Credential fixture key
        user: String,
        /// Password to type instead of the fixture's
        password: Option<String>,
    },
}

impl Action {
    /// Fill `locator` with `value`
    #[must_use]
    pub fn fill(locator: Locator, value: impl Into<String>) -> Self {
        Self::Fill {
            locator,
            value: value.into(),
        }
    }

    /// Select `value` in `locator`
    #[must_use]
    pub fn select(locator: Locator, value: impl Into<String>) -> Self {
        Self::Select {
            locator,
            value: value.into(),
        }
    }

    /// Log in as fixture user `user`
    #[must_use]
    pub fn login(user: impl Into<String>) -> Self {
        Self::Login {
            user: user.into(),
            password: None,
        }
    }

    /// Log in as fixture user `user` with a different password
    #[must_use]
    pub fn login_with_password(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Login {
            user: user.into(),
            password: Some(password.into()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate(path) => write!(f, "navigate to '{path}'"),
            Self::Fill { locator, value } => write!(f, "fill {locator} with {value:?}"),
            Self::Click(locator) => write!(f, "click {locator}"),
            Self::Select { locator, value } => write!(f, "select {value:?} in {locator}"),
            Self::SetViewport(viewport) => write!(f, "set viewport {viewport}"),
            Self::Login { user, password } => match password {
                Some(_) => write!(f, "log in as '{user}' (password override)"),
                None => write!(f, "log in as '{user}'"),
            },
        }
    }
}

/// An optional action followed by expectations
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Step {
    /// Action performed first, if any
    pub action: Option<Action>,
    /// Checked in order after the action
    pub expectations: Vec<Expectation>,
}

impl Step {
    /// A step that performs `action`
    #[must_use]
    pub fn act(action: Action) -> Self {
        Self {
            action: Some(action),
            expectations: Vec::new(),
        }
    }

    /// A step that only checks expectations
    #[must_use]
    pub fn check(expectations: impl IntoIterator<Item = Expectation>) -> Self {
        Self {
            action: None,
            expectations: expectations.into_iter().collect(),
        }
    }

    /// Add an expectation
    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(action) => write!(f, "{action}")?,
            None => f.write_str("check")?,
        }
        if !self.expectations.is_empty() {
            write!(f, " ({} expectation(s))", self.expectations.len())?;
        }
        Ok(())
    }
}

/// A named, tagged sequence of steps
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Scenario name, unique within its suite
    pub name: String,
    /// Owning suite
    pub suite: String,
    /// Tags used for filtering
    pub tags: Vec<String>,
    /// Viewport to open the session with; the run default otherwise
    pub viewport: Option<Viewport>,
    /// Steps in order
    pub steps: Vec<Step>,
    /// Overall budget; the run default otherwise
    pub timeout: Option<Duration>,
}

impl Scenario {
    /// Create an empty scenario
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suite: String::new(),
            tags: Vec::new(),
            viewport: None,
            steps: Vec::new(),
            timeout: None,
        }
    }

    /// Set the owning suite
    #[must_use]
    pub fn in_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = suite.into();
        self
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Open the session with `viewport`
    #[must_use]
    pub const fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Override the overall budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a step performing `action`
    #[must_use]
    pub fn then(self, action: Action) -> Self {
        self.step(Step::act(action))
    }

    /// Attach an expectation to the last step, or add a check-only step
    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        match self.steps.last_mut() {
            Some(step) => step.expectations.push(expectation),
            None => self.steps.push(Step::check([expectation])),
        }
        self
    }

    /// Append a sequence of steps
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Whether the scenario carries `tag`
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// `suite::name`
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.suite.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.suite, self.name)
        }
    }
}

/// Settings shared by every scenario of a run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Base URL for relative navigation
    pub base_url: String,
    /// Credential fixtures, shared read-only
    pub credentials: Arc<CredentialStore>,
    /// Poll settings for expectations and actions
    pub poll: PollConfig,
    /// Viewport for scenarios that do not set one
    pub viewport: Viewport,
    /// Budget for a whole scenario
    pub scenario_timeout: Duration,
    /// Where failure screenshots go, if anywhere
    pub artifacts_dir: Option<PathBuf>,
}

impl RunContext {
    /// Context with default settings around `credentials`
    #[must_use]
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            poll: PollConfig::default(),
            viewport: Viewport::default(),
            scenario_timeout: Duration::from_millis(DEFAULT_SCENARIO_TIMEOUT_MS),
            artifacts_dir: None,
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the poll settings
    #[must_use]
    pub const fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Set the default viewport
    #[must_use]
    pub const fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the per-scenario budget
    #[must_use]
    pub const fn with_scenario_timeout(mut self, timeout: Duration) -> Self {
        self.scenario_timeout = timeout;
        self
    }

    /// Save failure screenshots under `dir`
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }
}

/// Where and why a scenario stopped
#[derive(Debug)]
pub struct StepFailure {
    /// 0 for setup, then 1-based step number
    pub step_index: usize,
    /// Failed action or expectation
    pub description: String,
    /// Underlying error
    pub error: ProbeError,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}: {}: {}",
            self.step_index, self.description, self.error
        )
    }
}

/// Terminal state of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Every step held
    Passed,
    /// A step failed
    Failed,
    /// A deadline passed
    TimedOut,
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Passed => "pass",
            Self::Failed => "fail",
            Self::TimedOut => "timeout",
        })
    }
}

/// Outcome of one scenario
#[derive(Debug)]
pub enum ScenarioOutcome {
    /// Every step held
    Passed,
    /// A step failed outright
    Failed(StepFailure),
    /// The scenario budget ran out mid-step
    TimedOut(StepFailure),
}

impl ScenarioOutcome {
    fn from_failure(failure: StepFailure) -> Self {
        if matches!(failure.error, ProbeError::ScenarioTimeout { .. }) {
            Self::TimedOut(failure)
        } else {
            Self::Failed(failure)
        }
    }

    /// Summary status
    #[must_use]
    pub const fn status(&self) -> ScenarioStatus {
        match self {
            Self::Passed => ScenarioStatus::Passed,
            Self::Failed(_) => ScenarioStatus::Failed,
            Self::TimedOut(_) => ScenarioStatus::TimedOut,
        }
    }

    /// The failure, unless the scenario passed
    #[must_use]
    pub const fn failure(&self) -> Option<&StepFailure> {
        match self {
            Self::Passed => None,
            Self::Failed(f) | Self::TimedOut(f) => Some(f),
        }
    }
}

/// Report for one executed scenario
#[derive(Debug)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Owning suite
    pub suite: String,
    /// Outcome
    pub outcome: ScenarioOutcome,
    /// Wall-clock time including setup and teardown
    pub duration: Duration,
    /// Failure screenshot, if one was written
    pub screenshot: Option<PathBuf>,
}

impl ScenarioReport {
    /// Whether the scenario passed
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, ScenarioOutcome::Passed)
    }

    /// Summary status
    #[must_use]
    pub const fn status(&self) -> ScenarioStatus {
        self.outcome.status()
    }

    /// `suite::name`
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.suite.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.suite, self.name)
        }
    }
}

/// Runs scenarios, each on its own fresh session
pub struct ScenarioExecutor<'a> {
    factory: &'a dyn SessionFactory,
    context: &'a RunContext,
}

impl fmt::Debug for ScenarioExecutor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioExecutor")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl<'a> ScenarioExecutor<'a> {
    /// Create an executor opening sessions from `factory`
    #[must_use]
    pub fn new(factory: &'a dyn SessionFactory, context: &'a RunContext) -> Self {
        Self { factory, context }
    }

    /// Run one scenario to completion; never panics on scenario failure
    pub async fn run(&self, scenario: &Scenario) -> ScenarioReport {
        let start = Instant::now();
        let budget = scenario.timeout.unwrap_or(self.context.scenario_timeout);
        let deadline = start + budget;
        let viewport = scenario.viewport.unwrap_or(self.context.viewport);
        tracing::debug!(scenario = %scenario.full_name(), %viewport, "starting scenario");

        let opened = PageSession::open(
            self.factory,
            viewport,
            self.context.base_url.clone(),
            self.context.poll,
        )
        .await;

        let mut session = match opened {
            Ok(session) => session,
            Err(error) => {
                let failure = StepFailure {
                    step_index: 0,
                    description: "open session".to_string(),
                    error,
                };
                return self.finish(scenario, ScenarioOutcome::from_failure(failure), start, None);
            }
        };

        let outcome = match self.run_steps(&mut session, scenario, deadline, budget).await {
            Ok(()) => ScenarioOutcome::Passed,
            Err(failure) => ScenarioOutcome::from_failure(failure),
        };

        let screenshot = if outcome.failure().is_some() {
            self.save_screenshot(&session, scenario).await
        } else {
            None
        };

        if let Err(e) = session.close().await {
            tracing::warn!(scenario = %scenario.full_name(), error = %e, "failed to close session");
        }

        self.finish(scenario, outcome, start, screenshot)
    }

    async fn run_steps(
        &self,
        session: &mut PageSession,
        scenario: &Scenario,
        deadline: Instant,
        budget: Duration,
    ) -> Result<(), StepFailure> {
        let scenario_timeout = |step_index: usize, description: String| StepFailure {
            step_index,
            description,
            error: ProbeError::ScenarioTimeout {
                name: scenario.full_name(),
                timeout_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
            },
        };

        let setup = format!("navigate to base URL {}", session.base_url());
        match tokio::time::timeout_at(deadline, session.goto("")).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                return Err(StepFailure {
                    step_index: 0,
                    description: setup,
                    error,
                })
            }
            Err(_) => return Err(scenario_timeout(0, setup)),
        }

        for (i, step) in scenario.steps.iter().enumerate() {
            let step_index = i + 1;
            tracing::debug!(scenario = %scenario.name, step = step_index, "{step}");
            match tokio::time::timeout_at(deadline, self.run_step(session, step)).await {
                Ok(Ok(())) => {}
                Ok(Err((description, error))) => {
                    return Err(StepFailure {
                        step_index,
                        description,
                        error,
                    })
                }
                Err(_) => return Err(scenario_timeout(step_index, step.to_string())),
            }
        }
        Ok(())
    }

    async fn run_step(
        &self,
        session: &mut PageSession,
        step: &Step,
    ) -> Result<(), (String, ProbeError)> {
        if let Some(action) = &step.action {
            self.perform(session, action)
                .await
                .map_err(|e| (action.to_string(), e))?;
        }
        for expectation in &step.expectations {
            let observed = assertion::check(session, expectation)
                .await
                .map_err(|e| (expectation.to_string(), e))?;
            tracing::debug!(%expectation, ?observed, "expectation met");
        }
        Ok(())
    }

    async fn perform(&self, session: &mut PageSession, action: &Action) -> ProbeResult<()> {
        match action {
            Action::Navigate(path) => session.goto(path).await,
            Action::Fill { locator, value } => session.fill(locator, value).await,
            Action::Click(locator) => session.click(locator).await,
            Action::Select { locator, value } => session.select_option(locator, value).await,
            Action::SetViewport(viewport) => session.set_viewport(*viewport).await,
            Action::Login { user, password } => {
                let credential = self.context.credentials.get_user(user)?;
                let password = password.as_deref().unwrap_or(&credential.password);
                login(session, &credential.username, password).await
            }
        }
    }

    async fn save_screenshot(&self, session: &PageSession, scenario: &Scenario) -> Option<PathBuf> {
        let dir = self.context.artifacts_dir.as_ref()?;
        let path = dir.join(format!("{}.png", artifact_stem(&scenario.full_name())));
        let written = async {
            let png = session.screenshot().await?;
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, png).await?;
            Ok::<_, ProbeError>(())
        };
        match tokio::time::timeout(self.context.poll.timeout, written).await {
            Ok(Ok(())) => {
                tracing::info!(path = %path.display(), "saved failure screenshot");
                Some(path)
            }
            Ok(Err(e)) => {
                tracing::warn!(scenario = %scenario.full_name(), error = %e, "could not save screenshot");
                None
            }
            Err(_) => {
                tracing::warn!(
                    scenario = %scenario.full_name(),
                    timeout = ?self.context.poll.timeout,
                    "screenshot timed out"
                );
                None
            }
        }
    }

    fn finish(
        &self,
        scenario: &Scenario,
        outcome: ScenarioOutcome,
        start: Instant,
        screenshot: Option<PathBuf>,
    ) -> ScenarioReport {
        let duration = start.elapsed();
        match outcome.failure() {
            None => tracing::info!(scenario = %scenario.full_name(), ?duration, "passed"),
            Some(failure) => tracing::warn!(
                scenario = %scenario.full_name(),
                status = %outcome.status(),
                %failure,
                "scenario did not pass"
            ),
        }
        ScenarioReport {
            name: scenario.name.clone(),
            suite: scenario.suite.clone(),
            outcome,
            duration,
            screenshot,
        }
    }
}

/// File-name-safe form of a scenario name
#[must_use]
pub fn artifact_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('_') {
            stem.push('_');
        }
    }
    stem.trim_matches('_').to_string()
}
