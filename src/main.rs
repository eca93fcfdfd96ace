//! scene-check - accessibility regression runner
//!
//! Drives an Appium device session through open image → share → describe for
//! every test case and scores the description against expected keywords.

use clap::Parser;
use scene_check::{cli, commands, common::logging};
use commands::Commands;

#[derive(Parser)]
#[command(name = "scene-check", about = "Accessibility description regression runner")]
#[command(version, long_about = None)]
struct Cli {
    /// Also write a debug-level log file to the platform log directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _guard = if cli.log_file {
        logging::init_with_file().map(|(path, guard)| {
            eprintln!("Logging to {}", path.display());
            guard
        })
    } else {
        logging::init_cli();
        None
    };

    let code = match cli::dispatch(cli.command).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };

    // Flush the log file before exiting
    drop(_guard);
    std::process::exit(code);
}
