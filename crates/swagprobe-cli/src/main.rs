//! swagprobe CLI: end-to-end scenarios for the Swag Labs storefront
//!
//! ## Usage
//!
//! ```bash
//! swagprobe list --tag smoke                 # Show what would run
//! swagprobe run --tag smoke                  # Run the smoke subset headless
//! swagprobe run --filter "*sort*" --headed   # Watch the sort scenarios
//! swagprobe run --format json > report.json  # Machine-readable report
//! swagprobe users                            # Fixture keys, no passwords
//! ```

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use swagprobe::{suites, CredentialStore};
use swagprobe_cli::{
    check_summary, select, Cli, CliConfig, CliError, CliResult, Commands, RunArgs, SelectArgs,
    UsersArgs,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let verbosity = cli.verbosity();
    init_tracing(verbosity.log_filter());

    let config = CliConfig::discover(cli.config.as_deref(), Path::new("."))?
        .with_verbosity(verbosity)
        .with_color(cli.color.into());

    match cli.command {
        Commands::Run(args) => run_scenarios(config, &args),
        Commands::List(args) => list_scenarios(&args),
        Commands::Users(args) => list_users(&config, &args),
    }
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_scenarios(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    let config = args.apply(config);
    let registry = suites::registry()?;
    let selected = select(&registry, &args.select)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create runtime: {e}")))?;
    let mut runner = swagprobe_cli::ScenarioRunner::new(config);
    let summary = rt.block_on(runner.run(&selected))?;
    check_summary(&summary)
}

fn list_scenarios(args: &SelectArgs) -> CliResult<()> {
    let registry = suites::registry()?;
    let selected = select(&registry, args)?;
    for scenario in &selected {
        println!("{}  [{}]", scenario.full_name(), scenario.tags.join(", "));
    }
    eprintln!("{} of {} scenarios", selected.len(), registry.len());
    Ok(())
}

fn list_users(config: &CliConfig, args: &UsersArgs) -> CliResult<()> {
    let store = match args.fixtures.as_deref().or(config.fixtures.as_deref()) {
        Some(path) => CredentialStore::load(path)?,
        None => CredentialStore::builtin()?,
    };
    for user in store.users() {
        println!("{:<20} {}", user.key, user.username);
    }
    Ok(())
}
