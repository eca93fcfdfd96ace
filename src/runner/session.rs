//! One test case, one device session
//!
//! `run_with_session` owns the session for exactly the duration of a case:
//! it opens it, runs the navigation into a `Result`, quits it unconditionally,
//! and only then turns the `Result` into a [`TestResult`].

use std::time::Duration;

use colored::Colorize;

use crate::common::config::Config;
use crate::common::Result;
use crate::driver::{Device, Driver, Locator};

use super::cases::TestCase;
use super::evaluator::evaluate;
use super::extractor::TextExtractor;
use super::locator::{locate, locate_nth, scroll_search, ScrollQuery, Wait};
use super::report::TestResult;

/// Run one test case in a fresh session; never fails
///
/// `position` is the zero-based position of the case in its suite and selects
/// which gallery thumbnail to open.
pub async fn run_with_session<D: Driver>(
    driver: &D,
    config: &Config,
    case: &TestCase,
    position: usize,
) -> TestResult {
    println!(
        "\n{} {}",
        "Starting test for:".blue().bold(),
        case.name.white().bold()
    );
    println!("  Image: {}", case.image_file.dimmed());
    println!(
        "  Expected keywords: {}",
        case.expected_keywords.join(", ").dimmed()
    );

    let mut session = match driver.open(&config.capabilities).await {
        Ok(session) => session,
        Err(e) => {
            println!("  {} {}", "✗".red(), e);
            return TestResult::failed(case, &e);
        }
    };

    let outcome = execute_case(&mut session, config, case, position).await;

    if let Err(e) = session.quit().await {
        tracing::warn!(case = %case.name, "Session teardown failed: {}", e);
    } else {
        tracing::debug!(case = %case.name, "Session closed");
    }
    drop(session);

    match outcome {
        Ok(result) => result,
        Err(e) => {
            println!("  {} Test failed: {}", "✗".red(), e);
            TestResult::failed(case, &e)
        }
    }
}

/// Walk gallery → viewer → share sheet → describing app → back
async fn execute_case<S>(
    session: &mut S,
    config: &Config,
    case: &TestCase,
    position: usize,
) -> Result<TestResult>
where
    S: Device + ?Sized,
{
    let target = &config.target;
    let delays = &config.delays;
    let explicit = Wait::explicit(&config.timeouts);

    settle(delays.app_launch_ms).await;

    let index = target.first_image_index + position;
    step(&format!("Opening image at index {}", index));
    let image = locate_nth(
        session,
        &Locator::class_name(&target.image_class),
        index,
        explicit,
    )
    .await?;
    session.click(&image).await?;
    settle(delays.image_open_ms).await;

    step("Opening share sheet");
    let share = locate(session, &Locator::accessibility_id(&target.share_label), explicit).await?;
    session.click(&share).await?;
    settle(delays.share_sheet_ms).await;

    step(&format!("Looking for {} in share sheet", target.app_label));
    let app = scroll_search(session, &ScrollQuery::share_target(config), explicit).await?;
    session.click(&app).await?;
    settle(delays.result_ms).await;

    step("Waiting for result text");
    let extraction = TextExtractor::new(config)
        .extract_description(session)
        .await?;
    let description = extraction.text.to_lowercase();
    tracing::info!(strategy = %extraction.strategy, "Description: {}", description);

    let evaluation = evaluate(
        &description,
        case.expected_keywords.as_slice(),
        config.evaluation.pass_threshold,
    );

    println!("  Scene description: {}", description.italic());
    println!("  Found keywords: {:?}", evaluation.found);
    println!("  Missing keywords: {:?}", evaluation.missing);
    if evaluation.passed {
        println!("  {} {}", "✓".green().bold(), "Test PASSED".green().bold());
    } else {
        println!("  {} {}", "✗".red().bold(), "Test FAILED".red().bold());
    }

    step("Navigating back to gallery");
    for _ in 0..config.gestures.back_presses {
        session.press_keycode(config.gestures.back_keycode).await?;
        settle(delays.back_ms).await;
    }

    Ok(TestResult::evaluated(case, description, &evaluation))
}

fn step(message: &str) {
    println!("  {} {}", "→".cyan(), message);
    tracing::info!("{}", message);
}

async fn settle(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
