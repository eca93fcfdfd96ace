//! Element lookup under UI timing uncertainty
//!
//! Device lookups are instantaneous snapshots, so every wait here is a
//! client-side condition poll against an `Instant` deadline. The scroll search
//! layers a bounded swipe loop on top for targets that sit below the fold.

use std::time::Duration;

use tokio::time::Instant;

use crate::common::config::{Config, Swipe, Timeouts};
use crate::common::{Error, Result};
use crate::driver::{Device, ElementRef, Locator};

/// Bound and cadence for one condition poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    pub timeout: Duration,
    pub poll: Duration,
}

impl Wait {
    /// Long bound for critical navigation steps
    pub fn explicit(timeouts: &Timeouts) -> Self {
        Self {
            timeout: timeouts.explicit(),
            poll: timeouts.poll_interval(),
        }
    }

    /// Short bound for everything else
    pub fn implicit(timeouts: &Timeouts) -> Self {
        Self {
            timeout: timeouts.implicit(),
            poll: timeouts.poll_interval(),
        }
    }
}

/// Wait until at least one element matches, returning all matches
///
/// Always polls at least once, so a zero timeout is a single cheap lookup.
pub async fn locate_all<D>(device: &mut D, locator: &Locator, wait: Wait) -> Result<Vec<ElementRef>>
where
    D: Device + ?Sized,
{
    let deadline = Instant::now().checked_add(wait.timeout).ok_or_else(|| {
        Error::Config(format!("wait of {}s is out of range", wait.timeout.as_secs()))
    })?;
    let mut polls = 0usize;

    loop {
        polls += 1;
        let found = device.find_elements(locator).await?;
        if !found.is_empty() {
            tracing::debug!(%locator, polls, count = found.len(), "Located");
            return Ok(found);
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::debug!(%locator, polls, "Gave up waiting");
            return Err(Error::not_found(locator.to_string(), wait.timeout.as_secs()));
        }
        tokio::time::sleep(wait.poll.min(deadline - now)).await;
    }
}

/// Wait for the first element matching `locator`
pub async fn locate<D>(device: &mut D, locator: &Locator, wait: Wait) -> Result<ElementRef>
where
    D: Device + ?Sized,
{
    let mut found = locate_all(device, locator, wait).await?;
    Ok(found.swap_remove(0))
}

/// Wait for matches and pick the one at `index` in document order
pub async fn locate_nth<D>(
    device: &mut D,
    locator: &Locator,
    index: usize,
    wait: Wait,
) -> Result<ElementRef>
where
    D: Device + ?Sized,
{
    let mut found = locate_all(device, locator, wait).await?;
    let available = found.len();
    if index >= available {
        return Err(Error::IndexOutOfRange {
            what: locator.to_string(),
            index,
            available,
        });
    }
    Ok(found.swap_remove(index))
}

/// What to look for in a scrollable list, and how to scroll it
#[derive(Debug, Clone)]
pub struct ScrollQuery {
    /// Exact-match locator for the wanted entry
    pub target: Locator,
    /// The scrollable container
    pub container: Locator,
    /// Elements whose text makes up a visible-content snapshot
    pub labels: Locator,
    pub max_scrolls: usize,
    pub swipe: Swipe,
    pub settle: Duration,
}

impl ScrollQuery {
    /// Share-sheet search for the describing app
    pub fn share_target(config: &Config) -> Self {
        let target = &config.target;
        Self {
            target: Locator::exact_text(&target.text_class, &target.app_label),
            container: Locator::class_name(&target.scroll_container_class),
            labels: Locator::class_name(&target.text_class),
            max_scrolls: target.max_scrolls,
            swipe: config.gestures.swipe,
            settle: Duration::from_millis(config.delays.scroll_settle_ms),
        }
    }
}

/// Progress of one scroll search
#[derive(Debug, Default)]
pub struct ScrollSearch {
    pub attempts_used: usize,
    last_seen_labels: Option<Vec<String>>,
}

impl ScrollSearch {
    /// Record a visible-label snapshot
    ///
    /// Returns false when it equals the previous one, i.e. the last swipe
    /// moved nothing and the end of the list has been reached.
    pub fn observe(&mut self, labels: Vec<String>) -> bool {
        if self.last_seen_labels.as_ref() == Some(&labels) {
            return false;
        }
        self.last_seen_labels = Some(labels);
        true
    }
}

/// Find an entry that may be scrolled out of view
///
/// First waits `wait` for the target directly. On timeout, scrolls the
/// container up to `max_scrolls` times, re-checking for the target before each
/// swipe and stopping early once the visible content stops changing.
pub async fn scroll_search<D>(device: &mut D, query: &ScrollQuery, wait: Wait) -> Result<ElementRef>
where
    D: Device + ?Sized,
{
    match locate(device, &query.target, wait).await {
        Ok(element) => return Ok(element),
        Err(e) if e.is_not_found() => {
            tracing::info!(entry = %query.target, "Not immediately visible, scrolling");
        }
        Err(e) => return Err(e),
    }

    let container = locate(device, &query.container, wait).await?;
    let mut search = ScrollSearch::default();

    while search.attempts_used < query.max_scrolls {
        search.attempts_used += 1;
        tracing::debug!(
            "Scroll attempt {}/{}",
            search.attempts_used,
            query.max_scrolls
        );

        if let Some(element) = device.find_elements(&query.target).await?.into_iter().next() {
            tracing::info!(attempts = search.attempts_used, "Found {} after scrolling", query.target);
            return Ok(element);
        }

        let labels = visible_labels(device, &container, &query.labels).await?;
        if !search.observe(labels) {
            tracing::info!("Reached end of scrollable area");
            break;
        }

        device.swipe(&query.swipe).await?;
        tokio::time::sleep(query.settle).await;
    }

    Err(Error::ScrollExhausted {
        target: query.target.to_string(),
        attempts: search.attempts_used,
    })
}

/// Non-empty texts of the container's label elements, in document order
async fn visible_labels<D>(
    device: &mut D,
    container: &ElementRef,
    labels: &Locator,
) -> Result<Vec<String>>
where
    D: Device + ?Sized,
{
    let elements = device.find_child_elements(container, labels).await?;
    let mut texts = Vec::with_capacity(elements.len());
    for element in &elements {
        let text = device.text(element).await?;
        if !text.is_empty() {
            texts.push(text);
        }
    }
    Ok(texts)
}
