//! The browser-driver seam.
//!
//! Page objects only ever talk to a [`Driver`]; they never see CDP types.
//! [`chromium::ChromiumDriver`] drives a real Chrome tab, and
//! [`memory::MemoryDriver`] serves an in-memory DOM for tests and dry runs.

pub mod chromium;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::selectors::ScopedLocator;

/// Rendered bounding size of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Observed state of one element matched by a scoped locator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementState {
    pub index: usize,
    pub tag: String,
    pub text: String,
    pub visible: bool,
    /// No other element covers the element's center point.
    pub unobscured: bool,
    /// Form-control value, or the `value` attribute for other elements.
    pub value: Option<String>,
    pub size: Size,
}

impl ElementState {
    /// Present, visible and not covered: a click would land on it.
    pub fn is_actionable(&self) -> bool {
        self.visible && self.unobscured
    }
}

#[async_trait]
pub trait Driver: Send + Sync {
    /// Load `url` in the session's tab, returning once the load event fired.
    async fn navigate_to(&self, url: &str) -> Result<()>;

    async fn title(&self) -> Result<String>;

    /// All elements matching `locator`, in document order. Empty when absent.
    async fn find_elements(&self, locator: &ScopedLocator) -> Result<Vec<ElementState>>;

    /// Click the first element matching `locator`.
    async fn click(&self, locator: &ScopedLocator) -> Result<()>;

    async fn attribute(&self, locator: &ScopedLocator, name: &str) -> Result<Option<String>>;

    /// PNG bytes of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;
}
