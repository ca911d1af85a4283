//! PageDriver - abstract browser automation trait
//!
//! Every interaction with the page goes through [`PageDriver`], which lets the
//! same scenarios run against the chromiumoxide backend or the in-memory
//! [`MockDriver`].
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageDriver (trait)                                          │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │  CdpDriver (`browser`)       │  MockDriver                   │
//! │  chromiumoxide page in its   │  keyed element table with     │
//! │  own browser context         │  scripted click reactions     │
//! └──────────────────────────────┴───────────────────────────────┘
//! ```

use crate::emulation::Viewport;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// State of the elements a locator resolves to, as seen in one poll
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Number of matching elements
    pub count: usize,
    /// Whether the first match is rendered with a non-empty box
    pub visible: bool,
    /// Normalized text of the first match
    pub text: Option<String>,
    /// Requested attribute of the first match
    pub attribute: Option<String>,
}

impl ElementSnapshot {
    /// Snapshot for a locator that matched nothing
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    /// Whether exactly one visible element matched
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        self.count == 1 && self.visible
    }
}

impl fmt::Display for ElementSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            0 => write!(f, "no matching element"),
            1 => write!(
                f,
                "1 element ({})",
                if self.visible { "visible" } else { "hidden" }
            ),
            n => write!(f, "{n} elements"),
        }
    }
}

/// Abstract driver over one isolated page
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&mut self, url: &str) -> ProbeResult<()>;

    /// Current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Resize the rendering area
    async fn set_viewport(&mut self, viewport: Viewport) -> ProbeResult<()>;

    /// Observe the elements a locator resolves to
    async fn query(&self, locator: &Locator, attribute: Option<&str>)
        -> ProbeResult<ElementSnapshot>;

    /// Click the single element the locator resolves to
    async fn click(&self, locator: &Locator) -> ProbeResult<()>;

    /// Replace the value of an input
    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()>;

    /// Choose an option of a `<select>` by value
    async fn select_option(&self, locator: &Locator, value: &str) -> ProbeResult<()>;

    /// Capture a PNG of the viewport
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Tear the page (and its context) down
    async fn close(&mut self) -> ProbeResult<()>;
}

/// Opens fresh, isolated pages
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a new page in its own context
    async fn open(&self, viewport: Viewport) -> ProbeResult<Box<dyn PageDriver>>;
}

// ============================================================================
// Mock driver
// ============================================================================

/// An element in the mock page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockElement {
    /// Rendered text
    pub text: String,
    /// Visibility
    pub visible: bool,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
}

impl MockElement {
    /// A visible element with text
    #[must_use]
    pub fn visible(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: true,
            attributes: BTreeMap::new(),
        }
    }

    /// A hidden element with text
    #[must_use]
    pub fn hidden(text: impl Into<String>) -> Self {
        Self {
            visible: false,
            ..Self::visible(text)
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Callback run against the mock page when an action fires
pub type Reaction = Arc<dyn Fn(&mut MockDom, &str) + Send + Sync>;

/// In-memory page model behind [`MockDriver`]
#[derive(Default)]
pub struct MockDom {
    /// Current URL
    pub url: String,
    /// Current viewport
    pub viewport: Viewport,
    elements: HashMap<String, Vec<MockElement>>,
    values: HashMap<String, String>,
    reactions: HashMap<String, Reaction>,
    history: Vec<String>,
    closed: bool,
    navigation_failure: Option<String>,
    screenshot_delay: Option<Duration>,
}

impl fmt::Debug for MockDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDom")
            .field("url", &self.url)
            .field("viewport", &self.viewport)
            .field("elements", &self.elements.len())
            .field("reactions", &self.reactions.len())
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl MockDom {
    /// Replace the matches of a locator with a single element
    pub fn set_element(&mut self, locator: &Locator, element: MockElement) {
        self.set_elements(locator, vec![element]);
    }

    /// Replace the matches of a locator
    pub fn set_elements(&mut self, locator: &Locator, elements: Vec<MockElement>) {
        let _ = self.elements.insert(locator.to_string(), elements);
    }

    /// Remove every match of a locator
    pub fn remove(&mut self, locator: &Locator) {
        let _ = self.elements.remove(&locator.to_string());
    }

    /// Drop every element, keeping URL, values and reactions
    pub fn clear_elements(&mut self) {
        self.elements.clear();
    }

    /// Matches of a locator
    #[must_use]
    pub fn elements(&self, locator: &Locator) -> &[MockElement] {
        self.elements
            .get(&locator.to_string())
            .map_or(&[], Vec::as_slice)
    }

    /// Last value filled into a locator
    #[must_use]
    pub fn value(&self, locator: &Locator) -> Option<&str> {
        self.values.get(&locator.to_string()).map(String::as_str)
    }

    /// Run `reaction` whenever `locator` is clicked
    pub fn on_click<F>(&mut self, locator: &Locator, reaction: F)
    where
        F: Fn(&mut Self, &str) + Send + Sync + 'static,
    {
        let _ = self
            .reactions
            .insert(format!("click:{locator}"), Arc::new(reaction));
    }

    /// Run `reaction` with the chosen value whenever `locator` gets a selection
    pub fn on_select<F>(&mut self, locator: &Locator, reaction: F)
    where
        F: Fn(&mut Self, &str) + Send + Sync + 'static,
    {
        let _ = self
            .reactions
            .insert(format!("select:{locator}"), Arc::new(reaction));
    }

    /// Run `reaction` with the URL on every navigation
    pub fn on_navigate<F>(&mut self, reaction: F)
    where
        F: Fn(&mut Self, &str) + Send + Sync + 'static,
    {
        let _ = self
            .reactions
            .insert("navigate".to_string(), Arc::new(reaction));
    }

    /// Make every navigation fail with `message`
    pub fn fail_navigation(&mut self, message: impl Into<String>) {
        self.navigation_failure = Some(message.into());
    }

    /// Make every screenshot take `delay`
    pub fn delay_screenshot(&mut self, delay: Duration) {
        self.screenshot_delay = Some(delay);
    }

    /// Recorded calls, e.g. `click:css=#login-button`
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Whether a call with this prefix was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.history.iter().any(|c| c.starts_with(prefix))
    }

    /// Whether the page was closed
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn fire(&mut self, key: &str, arg: &str) {
        if let Some(reaction) = self.reactions.get(key).cloned() {
            reaction(self, arg);
        }
    }

    fn actionable(&self, locator: &Locator, action: &str) -> ProbeResult<()> {
        let matches = self.elements(locator);
        match matches {
            [el] if el.visible => Ok(()),
            _ => Err(ProbeError::page(format!(
                "{action}: {locator} resolved to {} element(s)",
                matches.len()
            ))),
        }
    }
}

/// Mock driver for unit testing
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    dom: Arc<Mutex<MockDom>>,
}

impl MockDriver {
    /// Create new mock driver on a blank page
    #[must_use]
    pub fn new() -> Self {
        let driver = Self::default();
        driver.dom().url = "about:blank".to_string();
        driver
    }

    /// Shared handle onto the page model
    #[must_use]
    pub fn handle(&self) -> Arc<Mutex<MockDom>> {
        Arc::clone(&self.dom)
    }

    /// Lock the page model
    pub fn dom(&self) -> MutexGuard<'_, MockDom> {
        self.dom.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&mut self, url: &str) -> ProbeResult<()> {
        let mut dom = self.dom();
        dom.history.push(format!("navigate:{url}"));
        if let Some(message) = dom.navigation_failure.clone() {
            return Err(ProbeError::NavigationError {
                url: url.to_string(),
                message,
            });
        }
        dom.url = url.to_string();
        dom.fire("navigate", url);
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.dom().url.clone())
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> ProbeResult<()> {
        let mut dom = self.dom();
        dom.history.push(format!("viewport:{viewport}"));
        dom.viewport = viewport;
        Ok(())
    }

    async fn query(
        &self,
        locator: &Locator,
        attribute: Option<&str>,
    ) -> ProbeResult<ElementSnapshot> {
        let dom = self.dom();
        let matches = dom.elements(locator);
        Ok(matches
            .first()
            .map_or_else(ElementSnapshot::missing, |first| ElementSnapshot {
                count: matches.len(),
                visible: first.visible,
                text: Some(crate::locator::normalize(&first.text)),
                attribute: attribute.and_then(|name| first.attributes.get(name).cloned()),
            }))
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        let mut dom = self.dom();
        dom.actionable(locator, "click")?;
        dom.history.push(format!("click:{locator}"));
        dom.fire(&format!("click:{locator}"), "");
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let mut dom = self.dom();
        dom.actionable(locator, "fill")?;
        dom.history.push(format!("fill:{locator}={value}"));
        let _ = dom.values.insert(locator.to_string(), value.to_string());
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let mut dom = self.dom();
        dom.actionable(locator, "select")?;
        dom.history.push(format!("select:{locator}={value}"));
        dom.fire(&format!("select:{locator}"), value);
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        let delay = self.dom().screenshot_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(vec![])
    }

    async fn close(&mut self) -> ProbeResult<()> {
        let mut dom = self.dom();
        dom.history.push("close".to_string());
        dom.closed = true;
        Ok(())
    }
}

/// Builds a fresh [`MockDriver`] per session
pub struct MockSessionFactory {
    build: Arc<dyn Fn() -> MockDriver + Send + Sync>,
    opened: AtomicUsize,
    drivers: Mutex<Vec<MockDriver>>,
}

impl fmt::Debug for MockSessionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSessionFactory")
            .field("opened", &self.opened.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl MockSessionFactory {
    /// Use `build` to create the page behind every new session
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> MockDriver + Send + Sync + 'static,
    {
        Self {
            build: Arc::new(build),
            opened: AtomicUsize::new(0),
            drivers: Mutex::new(Vec::new()),
        }
    }

    /// Number of sessions opened so far
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Drivers handed out so far, in opening order
    #[must_use]
    pub fn drivers(&self) -> Vec<MockDriver> {
        self.drivers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn open(&self, viewport: Viewport) -> ProbeResult<Box<dyn PageDriver>> {
        let _ = self.opened.fetch_add(1, Ordering::SeqCst);
        let mut driver = (self.build)();
        driver.set_viewport(viewport).await?;
        self.drivers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(driver.clone());
        Ok(Box::new(driver))
    }
}
