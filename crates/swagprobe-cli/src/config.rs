//! CLI configuration
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional `swagprobe.yaml`, then flags and `SWAGPROBE_*` environment
//! variables.

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use swagprobe::{
    BrowserConfig, CredentialStore, PollConfig, RunContext, DEFAULT_BASE_URL,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_SCENARIO_TIMEOUT_MS, DEFAULT_TIMEOUT_MS,
};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "swagprobe.yaml";

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Verbosity level
    #[serde(skip)]
    pub verbosity: Verbosity,
    /// Color output choice
    #[serde(skip)]
    pub color: ColorChoice,
    /// Storefront root every relative path is resolved against
    pub base_url: String,
    /// Scenarios run at once (0 = available parallelism)
    pub jobs: usize,
    /// Per-expectation and per-action timeout in milliseconds
    pub timeout_ms: u64,
    /// Delay between polls in milliseconds
    pub poll_interval_ms: u64,
    /// Whole-scenario budget in milliseconds
    pub scenario_timeout_ms: u64,
    /// Run Chromium without a window
    pub headless: bool,
    /// Chromium executable, if not auto-detected
    pub chromium_path: Option<String>,
    /// Keep the Chromium sandbox enabled
    pub sandbox: bool,
    /// Credential fixture file; built-in users when absent
    pub fixtures: Option<PathBuf>,
    /// Directory for failure screenshots
    pub artifacts_dir: Option<PathBuf>,
    /// Report format
    pub format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
            base_url: DEFAULT_BASE_URL.to_string(),
            jobs: 0,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            scenario_timeout_ms: DEFAULT_SCENARIO_TIMEOUT_MS,
            headless: true,
            chromium_path: None,
            sandbox: true,
            fixtures: None,
            artifacts_dir: None,
            format: OutputFormat::Text,
        }
    }
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML config document
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or has unknown value types
    pub fn from_yaml(yaml: &str) -> CliResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a YAML config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: &Path) -> CliResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Load `explicit` if given, else `swagprobe.yaml` from `dir` if present,
    /// else defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> CliResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using config file");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set parallel jobs
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set expectation timeout
    #[must_use]
    pub const fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set poll interval
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set scenario budget
    #[must_use]
    pub const fn with_scenario_timeout_ms(mut self, ms: u64) -> Self {
        self.scenario_timeout_ms = ms;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set Chromium executable
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Enable or disable the Chromium sandbox
    #[must_use]
    pub const fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Set fixture file
    #[must_use]
    pub fn with_fixtures(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixtures = Some(path.into());
        self
    }

    /// Set screenshot directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    /// Set report format
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Reject values no run could use
    ///
    /// # Errors
    ///
    /// Returns `Config` for an empty base URL or zero timeouts
    pub fn validate(&self) -> CliResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(CliError::config("base_url must not be empty"));
        }
        if self.timeout_ms == 0 || self.scenario_timeout_ms == 0 {
            return Err(CliError::config("timeouts must be greater than zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(CliError::config("poll_interval_ms must be greater than zero"));
        }
        Ok(())
    }

    /// Credential store from the fixture file, or the built-in users
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture file is unreadable or malformed
    pub fn credentials(&self) -> CliResult<CredentialStore> {
        let store = match &self.fixtures {
            Some(path) => CredentialStore::load(path)?,
            None => CredentialStore::builtin()?,
        };
        Ok(store)
    }

    /// Poll settings for expectations and actions
    #[must_use]
    pub const fn poll(&self) -> PollConfig {
        PollConfig::new(Duration::from_millis(self.timeout_ms))
            .with_interval(Duration::from_millis(self.poll_interval_ms))
    }

    /// Library run context around `credentials`
    #[must_use]
    pub fn run_context(&self, credentials: std::sync::Arc<CredentialStore>) -> RunContext {
        let context = RunContext::new(credentials)
            .with_base_url(self.base_url.clone())
            .with_poll(self.poll())
            .with_scenario_timeout(Duration::from_millis(self.scenario_timeout_ms));
        match &self.artifacts_dir {
            Some(dir) => context.with_artifacts_dir(dir.clone()),
            None => context,
        }
    }

    /// Browser launch settings
    #[must_use]
    pub fn browser_config(&self) -> BrowserConfig {
        let mut config = BrowserConfig::default().with_headless(self.headless);
        if let Some(path) = &self.chromium_path {
            config = config.with_chromium_path(path.clone());
        }
        if !self.sandbox {
            config = config.with_no_sandbox();
        }
        config
    }
}
