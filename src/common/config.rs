//! Configuration file handling
//!
//! Every section defaults to values tuned for a 1080x1920 emulator running the
//! stock gallery and the Seeing AI app, so an empty or missing config file
//! yields a working setup.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Automation server connection
    #[serde(default)]
    pub server: ServerConfig,

    /// Session capability descriptor
    #[serde(default)]
    pub capabilities: Capabilities,

    /// Wait bounds
    #[serde(default)]
    pub timeouts: Timeouts,

    /// UI element identities along the navigation path
    #[serde(default)]
    pub target: TargetConfig,

    /// Gesture geometry and hardware keys
    #[serde(default)]
    pub gestures: Gestures,

    /// Settle delays after navigation steps
    #[serde(default)]
    pub delays: Delays,

    /// Pass/fail policy
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Report output
    #[serde(default)]
    pub report: ReportConfig,
}

/// Automation server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the Appium server
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:4723".to_string()
}
fn default_request_timeout() -> u64 {
    30
}

/// Capability descriptor sent when opening a session
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Capabilities {
    #[serde(default = "default_platform_name")]
    pub platform_name: String,

    #[serde(default = "default_automation_name")]
    pub automation_name: String,

    #[serde(default = "default_device_name")]
    pub device_name: String,

    #[serde(default = "default_app_package")]
    pub app_package: String,

    #[serde(default = "default_app_activity")]
    pub app_activity: String,

    /// Keep app state between sessions
    #[serde(default = "default_true")]
    pub no_reset: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            platform_name: default_platform_name(),
            automation_name: default_automation_name(),
            device_name: default_device_name(),
            app_package: default_app_package(),
            app_activity: default_app_activity(),
            no_reset: true,
        }
    }
}

fn default_platform_name() -> String {
    "Android".to_string()
}
fn default_automation_name() -> String {
    "UiAutomator2".to_string()
}
fn default_device_name() -> String {
    "emulator-5554".to_string()
}
fn default_app_package() -> String {
    "com.google.android.apps.nexuslauncher".to_string()
}
fn default_app_activity() -> String {
    ".NexusLauncherActivity".to_string()
}
fn default_true() -> bool {
    true
}

/// Wait bounds
#[derive(Debug, Clone, Deserialize)]
pub struct Timeouts {
    /// Short bound for non-critical lookups
    #[serde(default = "default_implicit")]
    pub implicit_secs: u64,

    /// Long bound for critical navigation steps
    #[serde(default = "default_explicit")]
    pub explicit_secs: u64,

    /// Interval between condition polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            implicit_secs: default_implicit(),
            explicit_secs: default_explicit(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Timeouts {
    pub fn implicit(&self) -> Duration {
        Duration::from_secs(self.implicit_secs)
    }

    pub fn explicit(&self) -> Duration {
        Duration::from_secs(self.explicit_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Upper bound accepted for either wait timeout
pub const MAX_WAIT_SECS: u64 = 3600;

fn default_implicit() -> u64 {
    10
}
fn default_explicit() -> u64 {
    20
}
fn default_poll_interval() -> u64 {
    500
}

/// Identities of the UI elements the flow walks through
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Class of gallery thumbnails
    #[serde(default = "default_image_class")]
    pub image_class: String,

    /// Accessibility label of the share action
    #[serde(default = "default_share_label")]
    pub share_label: String,

    /// Visible label of the describing app in the share sheet
    #[serde(default = "default_app_label")]
    pub app_label: String,

    /// Class of the scrollable share-sheet container
    #[serde(default = "default_scroll_container_class")]
    pub scroll_container_class: String,

    /// Class of text elements
    #[serde(default = "default_text_class")]
    pub text_class: String,

    /// Header that precedes the scene description
    #[serde(default = "default_section_header")]
    pub section_header: String,

    /// Substrings that suggest a text element is the description
    #[serde(default = "default_description_hints")]
    pub description_hints: Vec<String>,

    /// Upper bound on share-sheet scroll attempts
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: usize,

    /// Thumbnail index used for the first test case
    #[serde(default = "default_first_image_index")]
    pub first_image_index: usize,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            image_class: default_image_class(),
            share_label: default_share_label(),
            app_label: default_app_label(),
            scroll_container_class: default_scroll_container_class(),
            text_class: default_text_class(),
            section_header: default_section_header(),
            description_hints: default_description_hints(),
            max_scrolls: default_max_scrolls(),
            first_image_index: default_first_image_index(),
        }
    }
}

fn default_image_class() -> String {
    "android.widget.ImageView".to_string()
}
fn default_share_label() -> String {
    "Share".to_string()
}
fn default_app_label() -> String {
    "Seeing AI".to_string()
}
fn default_scroll_container_class() -> String {
    "android.widget.ScrollView".to_string()
}
fn default_text_class() -> String {
    "android.widget.TextView".to_string()
}
fn default_section_header() -> String {
    "Scene".to_string()
}
fn default_description_hints() -> Vec<String> {
    vec!["shelf".to_string(), "drink".to_string()]
}
fn default_max_scrolls() -> usize {
    5
}
fn default_first_image_index() -> usize {
    1
}

/// A straight-line touch swipe
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct Swipe {
    pub start_x: i64,
    pub start_y: i64,
    pub end_x: i64,
    pub end_y: i64,
    pub duration_ms: u64,
}

impl Default for Swipe {
    fn default() -> Self {
        Self {
            start_x: 500,
            start_y: 1500,
            end_x: 500,
            end_y: 500,
            duration_ms: 1000,
        }
    }
}

/// Gesture and hardware key settings
#[derive(Debug, Clone, Deserialize)]
pub struct Gestures {
    /// Swipe used to scroll the share sheet
    #[serde(default)]
    pub swipe: Swipe,

    /// Android keycode for "back"
    #[serde(default = "default_back_keycode")]
    pub back_keycode: u32,

    /// Back presses needed to return to the gallery
    #[serde(default = "default_back_presses")]
    pub back_presses: usize,
}

impl Default for Gestures {
    fn default() -> Self {
        Self {
            swipe: Swipe::default(),
            back_keycode: default_back_keycode(),
            back_presses: default_back_presses(),
        }
    }
}

fn default_back_keycode() -> u32 {
    4
}
fn default_back_presses() -> usize {
    2
}

/// Settle delays in milliseconds
#[derive(Debug, Clone, Deserialize)]
pub struct Delays {
    #[serde(default = "default_app_launch")]
    pub app_launch_ms: u64,

    #[serde(default = "default_image_open")]
    pub image_open_ms: u64,

    #[serde(default = "default_share_sheet")]
    pub share_sheet_ms: u64,

    #[serde(default = "default_scroll_settle")]
    pub scroll_settle_ms: u64,

    #[serde(default = "default_result")]
    pub result_ms: u64,

    #[serde(default = "default_back")]
    pub back_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            app_launch_ms: default_app_launch(),
            image_open_ms: default_image_open(),
            share_sheet_ms: default_share_sheet(),
            scroll_settle_ms: default_scroll_settle(),
            result_ms: default_result(),
            back_ms: default_back(),
        }
    }
}

fn default_app_launch() -> u64 {
    3000
}
fn default_image_open() -> u64 {
    2000
}
fn default_share_sheet() -> u64 {
    2000
}
fn default_scroll_settle() -> u64 {
    1000
}
fn default_result() -> u64 {
    3000
}
fn default_back() -> u64 {
    1000
}

/// Pass/fail policy
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Minimum number of found keywords for a pass
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            pass_threshold: default_pass_threshold(),
        }
    }
}

fn default_pass_threshold() -> usize {
    2
}

/// Report output settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving `test_results_<stamp>.json`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the flow meaningless
    pub fn validate(&self) -> Result<()> {
        if self.timeouts.poll_interval_ms == 0 {
            return Err(Error::Config(
                "timeouts.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        for (key, secs) in [
            ("timeouts.implicit_secs", self.timeouts.implicit_secs),
            ("timeouts.explicit_secs", self.timeouts.explicit_secs),
        ] {
            if secs > MAX_WAIT_SECS {
                return Err(Error::Config(format!(
                    "{} must be at most {} (got {})",
                    key, MAX_WAIT_SECS, secs
                )));
            }
        }
        if self.target.max_scrolls == 0 {
            return Err(Error::Config(
                "target.max_scrolls must be at least 1".to_string(),
            ));
        }
        if !self.server.url.starts_with("http://") && !self.server.url.starts_with("https://") {
            return Err(Error::Config(format!(
                "server.url '{}' must start with http:// or https://",
                self.server.url
            )));
        }
        Ok(())
    }
}
