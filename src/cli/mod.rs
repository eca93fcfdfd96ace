//! CLI command handling
//!
//! Loads configuration and test cases, then dispatches to the runner or the
//! driver. Everything user-facing is printed here or in the runner.

use std::path::Path;

use colored::Colorize;

use crate::commands::{Commands, ServerArgs};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::driver::AppiumDriver;
use crate::runner::{self, TestCase};

/// How a successful command should end the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The run completed but at least one test case failed
    TestsFailed,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::TestsFailed => 1,
        }
    }
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<Outcome> {
    match command {
        Commands::Run {
            cases,
            server,
            device,
            output_dir,
            allow_failures,
        } => {
            let mut config = load_config(&server)?;
            if let Some(device) = device {
                config.capabilities.device_name = device;
            }
            if let Some(dir) = output_dir {
                config.report.output_dir = dir;
            }

            let cases = load_cases(&cases, config.evaluation.pass_threshold)?;
            let driver = AppiumDriver::new(&config.server)?;

            tracing::info!(
                server = %driver.base_url(),
                device = %config.capabilities.device_name,
                cases = cases.len(),
                "Starting run"
            );

            let report = runner::run_all(&driver, &config, &cases).await?;
            let summary = report.summary();
            tracing::info!(
                passed = summary.passed,
                failed = summary.failed(),
                "Run finished"
            );

            if summary.all_passed() || allow_failures {
                Ok(Outcome::Success)
            } else {
                Ok(Outcome::TestsFailed)
            }
        }

        Commands::List { cases, config } => {
            let config = match config {
                Some(path) => Config::load_from(&path)?,
                None => Config::load()?,
            };
            let cases = load_cases(&cases, config.evaluation.pass_threshold)?;

            for (position, case) in cases.iter().enumerate() {
                print_case(position + config.target.first_image_index, case);
            }
            println!("{} test case(s)", cases.len());

            Ok(Outcome::Success)
        }

        Commands::Status { server } => {
            let config = load_config(&server)?;
            let driver = AppiumDriver::new(&config.server)?;
            let status = driver.status().await?;

            let version = status
                .build
                .as_ref()
                .and_then(|b| b.version.as_deref())
                .unwrap_or("unknown");

            if status.is_ready() {
                println!(
                    "{} {} (version {})",
                    "✓".green(),
                    driver.base_url(),
                    version
                );
                Ok(Outcome::Success)
            } else {
                let message = status.message.unwrap_or_else(|| "not ready".to_string());
                Err(Error::Session(format!(
                    "{} is not ready: {}",
                    driver.base_url(),
                    message
                )))
            }
        }
    }
}

/// Config from `--config` or the default location, with `--server` applied
fn load_config(args: &ServerArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = &args.server {
        config.server.url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn load_cases(path: &Path, pass_threshold: usize) -> Result<Vec<TestCase>> {
    let cases = runner::load_test_cases(path)?;
    for warning in runner::lint(&cases, pass_threshold) {
        tracing::warn!("{}", warning);
    }
    Ok(cases)
}

fn print_case(image_index: usize, case: &TestCase) {
    println!(
        "{:>3}  {}  {}  [{}]",
        image_index,
        case.name.bold(),
        case.image_file.dimmed(),
        case.expected_keywords.join(", ")
    );
}
