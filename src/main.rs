use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use registry_qa::{report, runner, utils};
use registry_qa::utils::config::{HarnessConfig, UnreachablePolicy};

#[derive(Parser)]
#[command(name = "registry-qa")]
#[command(version)]
#[command(about = "Conformance test harness for the service registry API", long_about = None)]
struct Cli {
    /// Defaults to `run`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the probe battery against every configured target
    Run(RunArgs),

    /// Print the summary of a saved JSON report
    Report {
        /// Path to a report written by `run`
        results: PathBuf,

        /// Also write JUnit XML to this path
        #[arg(long)]
        junit: Option<PathBuf>,
    },
}

/// Flags override the matching environment variables
#[derive(Args, Default)]
struct RunArgs {
    /// Base URL of the sqlite-backed instance [env: SQLITE_API_URL]
    #[arg(long)]
    sqlite_url: Option<String>,

    /// Base URL of the postgres-backed instance [env: POSTGRES_API_URL]
    #[arg(long)]
    postgres_url: Option<String>,

    /// Seconds to wait for each target to become healthy [env: TEST_TIMEOUT]
    #[arg(long)]
    ready_timeout: Option<u64>,

    /// Per-request timeout in seconds [env: REQUEST_TIMEOUT]
    #[arg(long)]
    request_timeout: Option<u64>,

    /// JSON report location [env: REPORT_PATH]
    #[arg(long)]
    report_path: Option<PathBuf>,

    /// Also write junit.xml next to the JSON report [env: JUNIT_REPORT]
    #[arg(long, default_value = "false")]
    junit: bool,

    /// Records for unreachable targets: skip or omit [env: UNREACHABLE_POLICY]
    #[arg(long)]
    unreachable: Option<String>,

    /// Debug-level logging [env: VERBOSE=true]
    #[arg(short, long, default_value = "false", conflicts_with = "quiet")]
    verbose: bool,

    /// Only info-level logging [env: VERBOSE=false]
    #[arg(short, long, default_value = "false")]
    quiet: bool,
}

impl RunArgs {
    fn apply(self, mut config: HarnessConfig) -> Result<HarnessConfig> {
        if let Some(url) = self.sqlite_url {
            config.set_target_url("sqlite", &url);
        }
        if let Some(url) = self.postgres_url {
            config.set_target_url("postgresql", &url);
        }
        if let Some(secs) = self.ready_timeout {
            config.ready_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = self.report_path {
            config.report_path = path;
        }
        if let Some(policy) = self.unreachable {
            config.unreachable = policy
                .parse::<UnreachablePolicy>()
                .context("Invalid --unreachable")?;
        }
        config.junit |= self.junit;
        if self.verbose {
            config.verbose = true;
        }
        if self.quiet {
            config.verbose = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            1
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            let config = args.apply(HarnessConfig::from_env()?)?;
            utils::logger::init(config.verbose);

            println!("{} Registry QA test suite", "▶".green().bold());
            for target in &config.targets {
                println!("  {}: {}", target.label, target.base_url.cyan());
            }
            println!(
                "  Ready timeout: {}s, request timeout: {}s",
                config.ready_timeout.as_secs(),
                config.request_timeout.as_secs()
            );
            println!(
                "  Report: {}",
                config.report_path.display().to_string().cyan()
            );

            let session = runner::run_session(&config).await?;
            Ok(report::emit(&session, &config.report_path, config.junit))
        }

        Commands::Report { results, junit } => {
            utils::logger::init(false);
            println!(
                "{} Summarizing report: {}",
                "📊".to_string().blue(),
                results.display()
            );
            report::rerender(&results, junit.as_deref())
        }
    }
}
