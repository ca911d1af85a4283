//! CLI command definitions using clap

use crate::config::{CliConfig, ColorChoice, Verbosity};
use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// swagprobe: end-to-end scenarios for the Swag Labs storefront
#[derive(Parser, Debug)]
#[command(name = "swagprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only failures and errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// YAML config file (default: ./swagprobe.yaml if present)
    #[arg(long, global = true, env = "SWAGPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Verbosity from `-q` / `-v` flags
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Debug,
            }
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against a real browser
    Run(RunArgs),

    /// List scenarios without running them
    List(SelectArgs),

    /// List credential fixture keys (never passwords)
    Users(UsersArgs),
}

/// Scenario selection shared by `run` and `list`
#[derive(Args, Debug, Default, Clone)]
pub struct SelectArgs {
    /// Name pattern: glob (`*`, `?`, `[..]`) or case-insensitive substring
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only scenarios carrying this tag (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Only scenarios of this suite (repeatable)
    #[arg(short, long = "suite")]
    pub suites: Vec<String>,
}

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,

    /// Scenarios run at once (0 = available parallelism)
    #[arg(short = 'j', long, env = "SWAGPROBE_JOBS")]
    pub jobs: Option<usize>,

    /// Per-expectation and per-action timeout in milliseconds
    #[arg(long, env = "SWAGPROBE_TIMEOUT_MS")]
    pub timeout: Option<u64>,

    /// Delay between polls in milliseconds
    #[arg(long, env = "SWAGPROBE_POLL_INTERVAL_MS")]
    pub poll_interval: Option<u64>,

    /// Whole-scenario budget in milliseconds
    #[arg(long, env = "SWAGPROBE_SCENARIO_TIMEOUT_MS")]
    pub scenario_timeout: Option<u64>,

    /// Storefront base URL
    #[arg(long, env = "SWAGPROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Credential fixture JSON file
    #[arg(long, env = "SWAGPROBE_FIXTURES")]
    pub fixtures: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium executable
    #[arg(long, env = "SWAGPROBE_CHROMIUM")]
    pub chromium: Option<String>,

    /// Disable the Chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Report format
    #[arg(long)]
    pub format: Option<FormatArg>,

    /// Directory for failure screenshots
    #[arg(long, env = "SWAGPROBE_ARTIFACTS")]
    pub artifacts: Option<PathBuf>,
}

impl RunArgs {
    /// Overlay these flags on `config`
    #[must_use]
    pub fn apply(&self, mut config: CliConfig) -> CliConfig {
        if let Some(jobs) = self.jobs {
            config = config.with_jobs(jobs);
        }
        if let Some(ms) = self.timeout {
            config = config.with_timeout_ms(ms);
        }
        if let Some(ms) = self.poll_interval {
            config = config.with_poll_interval_ms(ms);
        }
        if let Some(ms) = self.scenario_timeout {
            config = config.with_scenario_timeout_ms(ms);
        }
        if let Some(ref url) = self.base_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(ref path) = self.fixtures {
            config = config.with_fixtures(path.clone());
        }
        if self.headed {
            config = config.with_headless(false);
        }
        if let Some(ref path) = self.chromium {
            config = config.with_chromium_path(path.clone());
        }
        if self.no_sandbox {
            config = config.with_sandbox(false);
        }
        if let Some(format) = self.format {
            config = config.with_format(format.into());
        }
        if let Some(ref dir) = self.artifacts {
            config = config.with_artifacts_dir(dir.clone());
        }
        config
    }
}

/// Arguments for the users command
#[derive(Args, Debug, Default)]
pub struct UsersArgs {
    /// Credential fixture JSON file
    #[arg(long, env = "SWAGPROBE_FIXTURES")]
    pub fixtures: Option<PathBuf>,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON document on stdout
    Json,
    /// Test Anything Protocol
    Tap,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
            FormatArg::Tap => Self::Tap,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
