//! Scripted in-memory device for pipeline tests
//!
//! A device is a stack of screens. Each screen is a list of pages; a swipe
//! moves to the next page and sticks on the last one, which is how a real
//! scroll container behaves once its end is reached. Clicking an element with
//! a target screen pushes that screen, and any keycode pops one.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::common::config::{Capabilities, Config, Swipe};
use crate::common::{Error, Result};

use super::types::{ElementRef, Locator};
use super::{Device, Driver};

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub class: String,
    pub text: String,
    pub content_desc: Option<String>,
    /// Screen pushed when this element is clicked
    pub opens: Option<usize>,
}

impl FakeElement {
    pub fn text_view(text: &str) -> Self {
        Self {
            class: "android.widget.TextView".to_string(),
            text: text.to_string(),
            content_desc: None,
            opens: None,
        }
    }

    pub fn image() -> Self {
        Self {
            class: "android.widget.ImageView".to_string(),
            text: String::new(),
            content_desc: None,
            opens: None,
        }
    }

    pub fn button(label: &str) -> Self {
        Self {
            class: "android.widget.Button".to_string(),
            text: String::new(),
            content_desc: Some(label.to_string()),
            opens: None,
        }
    }

    pub fn scroll_view() -> Self {
        Self {
            class: "android.widget.ScrollView".to_string(),
            text: String::new(),
            content_desc: None,
            opens: None,
        }
    }

    pub fn opens(mut self, screen: usize) -> Self {
        self.opens = Some(screen);
        self
    }

    fn matches(&self, locator: &Locator) -> bool {
        match locator {
            Locator::AccessibilityId(label) => self.content_desc.as_deref() == Some(label),
            Locator::ClassName(class) => &self.class == class,
            Locator::ExactText { class, text } => &self.class == class && &self.text == text,
            Locator::TextContains { class, needles } => {
                &self.class == class && needles.iter().any(|n| self.text.contains(n.as_str()))
            }
        }
    }
}

/// A screen whose content may span several scroll pages
#[derive(Debug, Clone, Default)]
pub struct FakeScreen {
    pub pages: Vec<Vec<FakeElement>>,
}

impl FakeScreen {
    pub fn new(elements: Vec<FakeElement>) -> Self {
        Self {
            pages: vec![elements],
        }
    }

    pub fn paged(pages: Vec<Vec<FakeElement>>) -> Self {
        Self { pages }
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    screens: Vec<FakeScreen>,
    /// Open screens with their current page
    stack: Vec<(usize, usize)>,
    /// Lookups that come back empty before content renders
    pub render_delay_polls: usize,
    pub find_calls: usize,
    pub swipes: usize,
    pub clicks: Vec<String>,
    pub keycodes: Vec<u32>,
    pub quits: usize,
    pub fail_quit: bool,
    pub fail_swipe: bool,
    pub fail_find: bool,
}

impl FakeState {
    fn current(&self) -> Option<(usize, usize)> {
        self.stack.last().copied()
    }

    fn visible(&self) -> Vec<(ElementRef, &FakeElement)> {
        let Some((screen, page)) = self.current() else {
            return Vec::new();
        };
        self.screens[screen].pages[page]
            .iter()
            .enumerate()
            .map(|(i, el)| (ElementRef(format!("{}-{}-{}", screen, page, i)), el))
            .collect()
    }

    fn lookup(&self, element: &ElementRef) -> Result<&FakeElement> {
        let parts: Vec<usize> = element
            .as_str()
            .split('-')
            .filter_map(|p| p.parse().ok())
            .collect();
        match parts.as_slice() {
            [s, p, i] => self
                .screens
                .get(*s)
                .and_then(|screen| screen.pages.get(*p))
                .and_then(|page| page.get(*i))
                .ok_or_else(|| Error::protocol("lookup", "no such element", element.as_str())),
            _ => Err(Error::protocol("lookup", "invalid element", element.as_str())),
        }
    }
}

/// Handle onto shared fake state; clones observe the same device
#[derive(Debug, Clone, Default)]
pub struct FakeDevice {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDevice {
    /// Device showing `screens[0]` first
    pub fn new(screens: Vec<FakeScreen>) -> Self {
        let stack = if screens.is_empty() {
            Vec::new()
        } else {
            vec![(0, 0)]
        };
        Self {
            state: Arc::new(Mutex::new(FakeState {
                screens,
                stack,
                ..Default::default()
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn find(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let mut state = self.state();
        state.find_calls += 1;
        if state.fail_find {
            return Err(Error::protocol("find elements", "unknown error", "injected"));
        }
        if state.render_delay_polls > 0 {
            state.render_delay_polls -= 1;
            return Ok(Vec::new());
        }
        let found = state
            .visible()
            .into_iter()
            .filter(|(_, el)| el.matches(locator))
            .map(|(id, _)| id)
            .collect();
        Ok(found)
    }
}

#[async_trait]
impl Device for FakeDevice {
    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementRef>> {
        self.find(locator)
    }

    async fn find_child_elements(
        &mut self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>> {
        Ok(self
            .find(locator)?
            .into_iter()
            .filter(|id| id != parent)
            .collect())
    }

    async fn text(&mut self, element: &ElementRef) -> Result<String> {
        let state = self.state();
        let text = state.lookup(element)?.text.clone();
        Ok(text)
    }

    async fn click(&mut self, element: &ElementRef) -> Result<()> {
        let mut state = self.state();
        let el = state.lookup(element)?.clone();
        let label = el
            .content_desc
            .clone()
            .unwrap_or_else(|| format!("{}:{}", el.class, el.text));
        state.clicks.push(label);
        if let Some(screen) = el.opens {
            state.stack.push((screen, 0));
        }
        Ok(())
    }

    async fn swipe(&mut self, _swipe: &Swipe) -> Result<()> {
        let mut state = self.state();
        if state.fail_swipe {
            return Err(Error::protocol("swipe", "unknown error", "injected"));
        }
        state.swipes += 1;
        let pages = state
            .current()
            .map(|(screen, _)| state.screens[screen].pages.len())
            .unwrap_or(0);
        if let Some(top) = state.stack.last_mut() {
            top.1 = (top.1 + 1).min(pages.saturating_sub(1));
        }
        Ok(())
    }

    async fn press_keycode(&mut self, keycode: u32) -> Result<()> {
        let mut state = self.state();
        state.keycodes.push(keycode);
        if state.stack.len() > 1 {
            state.stack.pop();
        }
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        let mut state = self.state();
        state.quits += 1;
        if state.fail_quit {
            return Err(Error::Session("injected teardown failure".to_string()));
        }
        Ok(())
    }
}

/// Hands out pre-scripted devices, one per `open`
#[derive(Debug, Default)]
pub struct FakeDriver {
    devices: Mutex<VecDeque<FakeDevice>>,
    pub opened: Mutex<Vec<Capabilities>>,
}

impl FakeDriver {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        Self {
            devices: Mutex::new(devices.into()),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Session = FakeDevice;

    async fn open(&self, capabilities: &Capabilities) -> Result<FakeDevice> {
        self.opened.lock().unwrap().push(capabilities.clone());
        self.devices
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::SessionOpen("no device available".to_string()))
    }
}

/// Config with zero settle delays and a short explicit bound
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.timeouts.explicit_secs = 0;
    config.timeouts.implicit_secs = 0;
    config.timeouts.poll_interval_ms = 1;
    config.delays.app_launch_ms = 0;
    config.delays.image_open_ms = 0;
    config.delays.share_sheet_ms = 0;
    config.delays.scroll_settle_ms = 0;
    config.delays.result_ms = 0;
    config.delays.back_ms = 0;
    config
}

/// The full happy path: gallery, viewer, share sheet, result screen
///
/// The target app sits on share-sheet page `app_page` of `pages` pages.
pub fn scripted_flow(description: &str, app_page: usize, pages: usize) -> FakeDevice {
    let gallery = FakeScreen::new(vec![
        FakeElement::image(),
        FakeElement::image().opens(1),
        FakeElement::image().opens(1),
        FakeElement::image().opens(1),
    ]);
    let viewer = FakeScreen::new(vec![FakeElement::image(), FakeElement::button("Share").opens(2)]);

    let share_pages = (0..pages.max(1))
        .map(|p| {
            let mut page = vec![
                FakeElement::scroll_view(),
                FakeElement::text_view(&format!("App {}a", p)),
                FakeElement::text_view(&format!("App {}b", p)),
            ];
            if p == app_page {
                page.push(FakeElement::text_view("Seeing AI").opens(3));
            }
            page
        })
        .collect();
    let share = FakeScreen::paged(share_pages);

    let result = FakeScreen::new(vec![
        FakeElement::text_view("Seeing AI"),
        FakeElement::text_view("Scene"),
        FakeElement::text_view(description),
        FakeElement::text_view("Close"),
    ]);

    FakeDevice::new(vec![gallery, viewer, share, result])
}
