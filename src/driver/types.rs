//! Locator strategies and W3C WebDriver wire types
//!
//! Only the handful of message shapes the runner needs are modelled here.
//! Everything else in an Appium response is ignored.

use std::fmt;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::config::{Capabilities, Swipe};

/// Opaque handle to an element inside one device session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How to find an element on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Accessibility label (content-desc on Android)
    AccessibilityId(String),
    /// Element class, every match in document order
    ClassName(String),
    /// Element of `class` whose visible text equals `text`
    ExactText { class: String, text: String },
    /// Element of `class` whose visible text contains any of `needles`
    TextContains { class: String, needles: Vec<String> },
}

impl Locator {
    pub fn accessibility_id(label: impl Into<String>) -> Self {
        Self::AccessibilityId(label.into())
    }

    pub fn class_name(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    pub fn exact_text(class: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ExactText {
            class: class.into(),
            text: text.into(),
        }
    }

    pub fn text_contains<S: AsRef<str>>(class: impl Into<String>, needles: &[S]) -> Self {
        Self::TextContains {
            class: class.into(),
            needles: needles.iter().map(|n| n.as_ref().to_string()).collect(),
        }
    }

    /// The `(using, value)` pair for a W3C find-element(s) request
    pub fn to_wire(&self) -> (&'static str, String) {
        match self {
            Locator::AccessibilityId(label) => ("accessibility id", label.clone()),
            Locator::ClassName(class) => ("class name", class.clone()),
            Locator::ExactText { class, text } => {
                ("xpath", format!("//{}[@text={}]", class, xpath_literal(text)))
            }
            Locator::TextContains { class, needles } => {
                let predicate = needles
                    .iter()
                    .map(|n| format!("contains(@text, {})", xpath_literal(n)))
                    .collect::<Vec<_>>()
                    .join(" or ");
                ("xpath", format!("//{}[{}]", class, predicate))
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::AccessibilityId(label) => write!(f, "accessibility id '{}'", label),
            Locator::ClassName(class) => write!(f, "class '{}'", class),
            Locator::ExactText { text, .. } => write!(f, "text '{}'", text),
            Locator::TextContains { needles, .. } => {
                let quoted = needles
                    .iter()
                    .map(|n| format!("'{}'", n))
                    .collect::<Vec<_>>()
                    .join(" or ");
                write!(f, "text containing {}", quoted)
            }
        }
    }
}

/// Quote a string as an XPath 1.0 literal
///
/// XPath 1.0 has no escape sequences, so a value holding both quote kinds is
/// assembled with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts = value
            .split('\'')
            .map(|part| format!("'{}'", part))
            .collect::<Vec<_>>()
            .join(", \"'\", ");
        format!("concat({})", parts)
    }
}

/// Build the new-session request body
///
/// Non-W3C capabilities must carry the `appium:` vendor prefix.
pub fn new_session_body(caps: &Capabilities) -> Value {
    json!({
        "capabilities": {
            "alwaysMatch": {
                "platformName": caps.platform_name,
                "appium:automationName": caps.automation_name,
                "appium:deviceName": caps.device_name,
                "appium:appPackage": caps.app_package,
                "appium:appActivity": caps.app_activity,
                "appium:noReset": caps.no_reset,
            },
            "firstMatch": [{}]
        }
    })
}

/// Build a W3C pointer action sequence for a touch swipe
pub fn swipe_actions(swipe: &Swipe) -> Value {
    json!({
        "actions": [{
            "type": "pointer",
            "id": "finger1",
            "parameters": { "pointerType": "touch" },
            "actions": [
                { "type": "pointerMove", "duration": 0, "x": swipe.start_x, "y": swipe.start_y },
                { "type": "pointerDown", "button": 0 },
                { "type": "pause", "duration": 100 },
                { "type": "pointerMove", "duration": swipe.duration_ms, "origin": "viewport", "x": swipe.end_x, "y": swipe.end_y },
                { "type": "pointerUp", "button": 0 }
            ]
        }]
    })
}

/// Value of a successful new-session response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

/// A web element reference as it appears on the wire
#[derive(Debug, Deserialize)]
pub struct WireElement {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf", alias = "ELEMENT")]
    pub id: String,
}

impl From<WireElement> for ElementRef {
    fn from(el: WireElement) -> Self {
        ElementRef(el.id)
    }
}

/// Error payload carried in `value` of a failed response
#[derive(Debug, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// Value of `GET /status`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerStatus {
    /// Missing on older servers, which only answer when ready
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub build: Option<BuildInfo>,
}

impl ServerStatus {
    pub fn is_ready(&self) -> bool {
        self.ready.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildInfo {
    #[serde(default)]
    pub version: Option<String>,
}
