//! scene-check - accessibility regression runner
//!
//! This library drives a remote mobile automation session (Appium) through a
//! fixed share-to-describe flow and scores the generated description.

pub mod cli;
pub mod commands;
pub mod common;
pub mod driver;
pub mod runner;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use driver::{Device, Driver, Locator};
pub use runner::{run_all, run_with_session, RunReport, TestCase, TestResult};
