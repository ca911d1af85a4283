//! Swagprobe: browser-driven end-to-end suite for the Swag Labs storefront
//!
//! A small Playwright-style harness (sessions, locators, polling assertions,
//! scenario executor) plus the scenario catalogue that exercises login,
//! inventory, cart, checkout, menu navigation and responsive layout on
//! `https://www.saucedemo.com/`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SWAGPROBE Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Suite      │    │ Scenario   │    │ PageDriver │            │
//! │   │ Registry   │───►│ Executor   │───►│ (CDP or    │            │
//! │   │ + Filter   │    │ + expect() │    │  mock)     │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         ▲                 │                                     │
//! │         │                 ▼                                     │
//! │   ┌────────────┐    ┌────────────┐                              │
//! │   │ suites::*  │    │ Credential │                              │
//! │   │ (catalog)  │    │ Store      │                              │
//! │   └────────────┘    └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use swagprobe::prelude::*;
//!
//! let browser = Browser::launch(BrowserConfig::default()).await?;
//! let context = RunContext::new(Arc::new(CredentialStore::builtin()?));
//! let registry = suites::registry()?;
//! let selected = registry.select(&ScenarioFilter::new().with_tag("smoke"));
//! let summary = SuiteRunner::new(4).run(&browser, &context, &selected, |_| {}).await;
//! assert!(summary.all_passed());
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod assertion;
mod browser;
mod driver;
mod fixture;
mod harness;
mod locator;
mod login;
mod result;
mod scenario;
mod session;
mod wait;

/// Viewport presets and parsing
pub mod emulation;

/// Page objects for the storefront (paths, locators, expected messages)
pub mod storefront;

/// Built-in scenario catalogue
pub mod suites;

pub use assertion::{
    check, expect, parse_amount, Condition, Expect, Expectation, Observed, Target, UrlPattern,
};
pub use browser::{Browser, BrowserConfig};
#[cfg(feature = "browser")]
pub use browser::CdpDriver;
pub use driver::{
    ElementSnapshot, MockDom, MockDriver, MockElement, MockSessionFactory, PageDriver, Reaction,
    SessionFactory,
};
pub use emulation::Viewport;
pub use fixture::{CredentialStore, UserCredential, DEFAULT_USERS_JSON};
pub use harness::{RunSummary, ScenarioFilter, SuiteRegistry, SuiteRunner, TestSuite};
pub use locator::{normalize, test_id_selector, Locator, LocatorStep, TEST_ID_ATTRIBUTE};
pub use login::{login, login_page_visible};
pub use result::{ProbeError, ProbeResult};
pub use scenario::{
    artifact_stem, Action, RunContext, Scenario, ScenarioExecutor, ScenarioOutcome,
    ScenarioReport, ScenarioStatus, Step, StepFailure, DEFAULT_SCENARIO_TIMEOUT_MS,
};
pub use session::{resolve_url, PageSession, DEFAULT_BASE_URL};
pub use wait::{
    poll_until, PollConfig, PollOutcome, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    pub use super::browser::*;
    pub use super::driver::*;
    pub use super::emulation::*;
    pub use super::fixture::*;
    pub use super::harness::*;
    pub use super::locator::*;
    pub use super::login::*;
    pub use super::result::*;
    pub use super::scenario::*;
    pub use super::session::*;
    pub use super::storefront;
    pub use super::suites;
    pub use super::wait::*;
    pub use std::sync::Arc;
}
