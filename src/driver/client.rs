//! Appium client speaking W3C WebDriver over HTTP
//!
//! Each call is a single request/response exchange; the server keeps all
//! session state. Failed commands come back as `{"value": {"error", "message"}}`
//! and are mapped to [`Error::Protocol`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::common::config::{Capabilities, ServerConfig, Swipe};
use crate::common::{Error, Result};

use super::types::{
    new_session_body, swipe_actions, ElementRef, Locator, NewSession, ServerStatus, WireElement,
    WireError,
};
use super::{Device, Driver};

/// W3C error code for a lookup with no match
const NO_SUCH_ELEMENT: &str = "no such element";

/// Connection to an Appium server
#[derive(Debug, Clone)]
pub struct AppiumDriver {
    http: Client,
    base_url: String,
}

impl AppiumDriver {
    /// Create a driver for the configured server
    pub fn new(server: &ServerConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(server.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: server.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query server readiness
    pub async fn status(&self) -> Result<ServerStatus> {
        let url = format!("{}/status", self.base_url);
        call(&self.http, Method::GET, &url, None, "status").await
    }
}

#[async_trait]
impl Driver for AppiumDriver {
    type Session = AppiumSession;

    async fn open(&self, capabilities: &Capabilities) -> Result<AppiumSession> {
        let url = format!("{}/session", self.base_url);
        let body = new_session_body(capabilities);

        tracing::debug!(device = %capabilities.device_name, "Opening session at {}", url);

        let created: NewSession = call(&self.http, Method::POST, &url, Some(body), "new session")
            .await
            .map_err(|e| Error::SessionOpen(e.to_string()))?;

        tracing::info!(session = %created.session_id, "Session opened");
        tracing::trace!("Negotiated capabilities: {}", created.capabilities);

        Ok(AppiumSession {
            http: self.http.clone(),
            session_url: format!("{}/session/{}", self.base_url, created.session_id),
            id: created.session_id,
            closed: false,
        })
    }
}

/// One Appium session
pub struct AppiumSession {
    http: Client,
    session_url: String,
    id: String,
    closed: bool,
}

impl AppiumSession {
    async fn command<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        command: &str,
    ) -> Result<T> {
        if self.closed {
            return Err(Error::Session(format!(
                "session {} already closed, cannot {}",
                self.id, command
            )));
        }
        let url = format!("{}{}", self.session_url, path);
        call(&self.http, method, &url, body, command).await
    }

    async fn find(&self, path: &str, locator: &Locator) -> Result<Vec<ElementRef>> {
        let (using, value) = locator.to_wire();
        let body = json!({ "using": using, "value": value });

        match self
            .command::<Vec<WireElement>>(Method::POST, path, Some(body), "find elements")
            .await
        {
            Ok(found) => Ok(found.into_iter().map(ElementRef::from).collect()),
            Err(Error::Protocol { error, .. }) if error == NO_SUCH_ELEMENT => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl Device for AppiumSession {
    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>> {
        self.find("/elements", locator).await
    }

    async fn find_child_elements(
        &mut self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>> {
        self.find(&format!("/element/{}/elements", parent.as_str()), locator)
            .await
    }

    async fn text(&mut self, element: &ElementRef) -> Result<String> {
        let path = format!("/element/{}/text", element.as_str());
        self.command(Method::GET, &path, None, "get text").await
    }

    async fn click(&mut self, element: &ElementRef) -> Result<()> {
        let path = format!("/element/{}/click", element.as_str());
        self.command::<Value>(Method::POST, &path, Some(json!({})), "click")
            .await
            .map(|_| ())
    }

    async fn swipe(&mut self, swipe: &Swipe) -> Result<()> {
        self.command::<Value>(Method::POST, "/actions", Some(swipe_actions(swipe)), "swipe")
            .await
            .map(|_| ())
    }

    async fn press_keycode(&mut self, keycode: u32) -> Result<()> {
        self.command::<Value>(
            Method::POST,
            "/appium/device/press_keycode",
            Some(json!({ "keycode": keycode })),
            "press keycode",
        )
        .await
        .map(|_| ())
    }

    async fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let result = call::<Value>(&self.http, Method::DELETE, &self.session_url, None, "quit")
            .await
            .map(|_| ());
        // The server may have dropped the session already; either way it is gone
        self.closed = true;
        result.map_err(|e| Error::Session(format!("teardown of {} failed: {}", self.id, e)))
    }
}

impl Drop for AppiumSession {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(session = %self.id, "Session dropped without quit; it will linger until the server's new-command timeout");
        }
    }
}

/// Perform one WebDriver request and unwrap its `value`
async fn call<T: DeserializeOwned>(
    http: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
    command: &str,
) -> Result<T> {
    tracing::debug!("WebDriver >>> {} {} {}", method, url, command);

    let mut request = http.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    tracing::debug!("WebDriver <<< {} {}", status.as_u16(), text);

    let envelope: Value = serde_json::from_str(&text).map_err(|e| {
        Error::protocol(
            command,
            "invalid response",
            &format!("HTTP {}: {} ({})", status.as_u16(), e, truncate(&text, 200)),
        )
    })?;
    let value = envelope.get("value").cloned().unwrap_or(Value::Null);

    if !status.is_success() || value.get("error").is_some() {
        let err: WireError = serde_json::from_value(value).unwrap_or_else(|_| WireError {
            error: format!("http {}", status.as_u16()),
            message: truncate(&text, 200),
        });
        return Err(Error::protocol(command, &err.error, &err.message));
    }

    serde_json::from_value(value).map_err(|e| {
        Error::protocol(
            command,
            "invalid response",
            &format!("unexpected value shape: {}", e),
        )
    })
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
