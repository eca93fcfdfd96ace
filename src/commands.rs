//! CLI command definitions
//!
//! Defines the clap commands for scene-check.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run every test case against the device
    Run {
        /// Test case file (JSON, or YAML by extension)
        #[arg(long, short = 'c', default_value = "test_cases.json")]
        cases: PathBuf,

        #[command(flatten)]
        server: ServerArgs,

        /// Device name capability (overrides the config file)
        #[arg(long)]
        device: Option<String>,

        /// Directory for the results file (overrides the config file)
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,

        /// Exit 0 even when some test cases fail
        #[arg(long)]
        allow_failures: bool,
    },

    /// List the test cases in a file without touching a device
    List {
        /// Test case file (JSON, or YAML by extension)
        #[arg(long, short = 'c', default_value = "test_cases.json")]
        cases: PathBuf,

        /// Config file used for the pass threshold warnings
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check that the automation server is up and ready
    Status {
        #[command(flatten)]
        server: ServerArgs,
    },
}

/// Options shared by commands that talk to the automation server
#[derive(Args, Debug, Clone, Default)]
pub struct ServerArgs {
    /// Config file (default: platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Automation server URL (overrides the config file)
    #[arg(long)]
    pub server: Option<String>,
}
