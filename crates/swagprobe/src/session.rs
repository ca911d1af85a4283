//! Page sessions.
//!
//! A [`PageSession`] is one isolated browser context seen through a
//! [`PageDriver`]. It resolves relative paths against the base URL and makes
//! every action auto-wait until its target is actionable.

use crate::driver::{ElementSnapshot, PageDriver, SessionFactory};
use crate::emulation::Viewport;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll_until, PollConfig, PollOutcome};
use std::fmt;

/// Public storefront the suites target by default
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// One isolated page plus the settings scenarios run with
pub struct PageSession {
    driver: Box<dyn PageDriver>,
    base_url: String,
    poll: PollConfig,
    viewport: Viewport,
    closed: bool,
}

impl fmt::Debug for PageSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageSession")
            .field("base_url", &self.base_url)
            .field("poll", &self.poll)
            .field("viewport", &self.viewport)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl PageSession {
    /// Wrap an already-open driver
    pub fn new(driver: Box<dyn PageDriver>, base_url: impl Into<String>, poll: PollConfig) -> Self {
        Self {
            driver,
            base_url: base_url.into(),
            poll,
            viewport: Viewport::default(),
            closed: false,
        }
    }

    /// Open a fresh session from a factory
    ///
    /// # Errors
    ///
    /// Returns the factory's error if no page could be opened
    pub async fn open(
        factory: &dyn SessionFactory,
        viewport: Viewport,
        base_url: impl Into<String>,
        poll: PollConfig,
    ) -> ProbeResult<Self> {
        let driver = factory.open(viewport).await?;
        let mut session = Self::new(driver, base_url, poll);
        session.viewport = viewport;
        tracing::debug!(viewport = %viewport, "opened page session");
        Ok(session)
    }

    /// Base URL relative paths resolve against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default poll settings for expectations and actions
    #[must_use]
    pub const fn poll(&self) -> &PollConfig {
        &self.poll
    }

    /// Current viewport
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resolve a path against the base URL; absolute URLs pass through
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        resolve_url(&self.base_url, path)
    }

    /// Navigate to a path or absolute URL
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` if the page cannot be reached
    pub async fn goto(&mut self, path: &str) -> ProbeResult<()> {
        let url = self.resolve(path);
        tracing::debug!(%url, "navigate");
        self.driver.goto(&url).await
    }

    /// Current URL
    pub async fn url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    /// Resize the rendering area
    pub async fn set_viewport(&mut self, viewport: Viewport) -> ProbeResult<()> {
        self.driver.set_viewport(viewport).await?;
        self.viewport = viewport;
        Ok(())
    }

    /// Observe the elements a locator resolves to
    pub async fn query(
        &self,
        locator: &Locator,
        attribute: Option<&str>,
    ) -> ProbeResult<ElementSnapshot> {
        self.driver.query(locator, attribute).await
    }

    /// Click once the locator resolves to a single visible element
    ///
    /// # Errors
    ///
    /// Returns `ActionTimeout` if the element never becomes actionable
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        let target = self.wait_actionable("click", locator).await?;
        tracing::debug!(locator = %target, "click");
        self.driver.click(&target).await
    }

    /// Fill an input once it is actionable
    ///
    /// # Errors
    ///
    /// Returns `ActionTimeout` if the element never becomes actionable
    pub async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let target = self.wait_actionable("fill", locator).await?;
        tracing::debug!(locator = %target, "fill");
        self.driver.fill(&target, value).await
    }

    /// Choose a `<select>` option by value once the control is actionable
    ///
    /// # Errors
    ///
    /// Returns `ActionTimeout` if the element never becomes actionable
    pub async fn select_option(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let target = self.wait_actionable("select", locator).await?;
        tracing::debug!(locator = %target, value, "select");
        self.driver.select_option(&target, value).await
    }

    /// Capture a PNG of the viewport
    pub async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.driver.screenshot().await
    }

    /// Close the page; later calls are no-ops
    pub async fn close(&mut self) -> ProbeResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        tracing::debug!("closing page session");
        self.driver.close().await
    }

    async fn wait_actionable(&self, action: &str, locator: &Locator) -> ProbeResult<Locator> {
        let target = if locator.is_strict() {
            locator.clone()
        } else {
            locator.clone().first()
        };

        let outcome = poll_until(
            &self.poll,
            || self.driver.query(&target, None),
            ElementSnapshot::is_actionable,
        )
        .await?;

        match outcome {
            PollOutcome::Satisfied { .. } => Ok(target),
            PollOutcome::TimedOut { last, .. } => Err(ProbeError::ActionTimeout {
                action: action.to_string(),
                locator: locator.to_string(),
                timeout_ms: self.poll.timeout_ms(),
                last_observed: last.to_string(),
            }),
        }
    }
}

/// Join a base URL and a relative path; absolute URLs pass through unchanged
#[must_use]
pub fn resolve_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("about:") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{path}")
    }
}
