//! Description text extraction
//!
//! The result screen belongs to a third-party app with no stable layout, so
//! extraction walks a chain from most to least specific and takes the first
//! strategy that yields text.

use std::fmt;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::driver::{Device, Locator};

use super::locator::{locate, Wait};

/// One way of finding the description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The text element right after the section header
    SectionHeader,
    /// Any text element containing a domain hint
    Hints,
    /// The first text element on screen
    AnyText,
}

impl Strategy {
    /// Fallback order
    pub const CHAIN: [Strategy; 3] = [Strategy::SectionHeader, Strategy::Hints, Strategy::AnyText];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::SectionHeader => "section header",
            Strategy::Hints => "hint keywords",
            Strategy::AnyText => "any text",
        };
        f.write_str(name)
    }
}

/// Text pulled off the result screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub strategy: Strategy,
}

/// Runs the fallback chain against a device
#[derive(Debug, Clone)]
pub struct TextExtractor {
    text_class: String,
    section_header: String,
    hints: Vec<String>,
    explicit: Wait,
    implicit: Wait,
}

impl TextExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            text_class: config.target.text_class.clone(),
            section_header: config.target.section_header.clone(),
            hints: config.target.description_hints.clone(),
            explicit: Wait::explicit(&config.timeouts),
            implicit: Wait::implicit(&config.timeouts),
        }
    }

    /// Extract the description, failing only if every strategy fails
    pub async fn extract_description<D>(&self, device: &mut D) -> Result<Extraction>
    where
        D: Device + ?Sized,
    {
        let mut failures = Vec::with_capacity(Strategy::CHAIN.len());

        for strategy in Strategy::CHAIN {
            match self.attempt(device, strategy).await {
                Ok(text) => {
                    tracing::debug!(%strategy, "Extracted description");
                    return Ok(Extraction { text, strategy });
                }
                Err(e) => {
                    tracing::debug!(%strategy, error = %e, "Extraction strategy failed");
                    failures.push(format!("{}: {}", strategy, e));
                }
            }
        }

        Err(Error::Extraction(failures.join("; ")))
    }

    async fn attempt<D>(&self, device: &mut D, strategy: Strategy) -> Result<String>
    where
        D: Device + ?Sized,
    {
        match strategy {
            Strategy::SectionHeader => self.after_header(device).await,
            Strategy::Hints => {
                if self.hints.is_empty() {
                    return Err(Error::Extraction("no hint keywords configured".to_string()));
                }
                let locator = Locator::text_contains(&self.text_class, &self.hints);
                let element = locate(device, &locator, self.implicit).await?;
                device.text(&element).await
            }
            Strategy::AnyText => {
                let locator = Locator::class_name(&self.text_class);
                let element = locate(device, &locator, self.implicit).await?;
                device.text(&element).await
            }
        }
    }

    async fn after_header<D>(&self, device: &mut D) -> Result<String>
    where
        D: Device + ?Sized,
    {
        let header = Locator::exact_text(&self.text_class, &self.section_header);
        locate(device, &header, self.explicit).await?;

        let texts = device
            .find_elements(&Locator::class_name(&self.text_class))
            .await?;

        let mut iter = texts.iter();
        while let Some(element) = iter.next() {
            if device.text(element).await? == self.section_header {
                return match iter.next() {
                    Some(next) => device.text(next).await,
                    None => Err(Error::not_found(
                        format!("text following '{}'", self.section_header),
                        0,
                    )),
                };
            }
        }

        Err(Error::not_found(
            format!("'{}' among text elements", self.section_header),
            0,
        ))
    }
}
