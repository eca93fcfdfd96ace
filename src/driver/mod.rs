//! Device automation driver contract
//!
//! The runner never speaks the automation protocol itself. It consumes the
//! [`Driver`] / [`Device`] pair below; [`client`] implements it against an
//! Appium server over W3C WebDriver HTTP.

pub mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod types;

use async_trait::async_trait;

use crate::common::config::{Capabilities, Swipe};
use crate::common::Result;

pub use client::{AppiumDriver, AppiumSession};
pub use types::{ElementRef, Locator};

/// Opens device sessions
#[async_trait]
pub trait Driver: Send + Sync {
    type Session: Device;

    /// Establish a new session with the given capability descriptor
    async fn open(&self, capabilities: &Capabilities) -> Result<Self::Session>;
}

/// One live automation session
///
/// Lookups never wait: an element that is not on screen yields an empty list.
/// Waiting is the caller's business (see `runner::locator`).
#[async_trait]
pub trait Device: Send {
    /// Every element matching `locator`, in document order
    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>>;

    /// Every descendant of `parent` matching `locator`, in document order
    async fn find_child_elements(
        &mut self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>>;

    /// Visible text of an element
    async fn text(&mut self, element: &ElementRef) -> Result<String>;

    /// Tap an element
    async fn click(&mut self, element: &ElementRef) -> Result<()>;

    /// Perform a touch swipe in screen coordinates
    async fn swipe(&mut self, swipe: &Swipe) -> Result<()>;

    /// Press a hardware key
    async fn press_keycode(&mut self, keycode: u32) -> Result<()>;

    /// Terminate the session
    async fn quit(&mut self) -> Result<()>;
}
