use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotParams;
use chromiumoxide::page::Page;
use serde::Deserialize;

use super::{Driver, ElementState};
use crate::interaction::click::{click_js, ClickMethod, ClickOutcome};
use crate::selectors::ScopedLocator;

/// Maps a matched element to an [`ElementState`]. Visibility follows computed
/// style and layout; obstruction is only judged for elements inside the
/// viewport, since a click scrolls its target into view first.
const ELEMENT_STATE_JS: &str = r#"(el, index) => {
    const style = getComputedStyle(el);
    const rect = el.getBoundingClientRect();
    const visible = style.display !== 'none'
        && style.visibility !== 'hidden'
        && parseFloat(style.opacity) > 0
        && rect.width > 0
        && rect.height > 0;

    let unobscured = false;
    if (visible) {
        const x = rect.left + rect.width / 2;
        const y = rect.top + rect.height / 2;
        const inViewport = x >= 0 && y >= 0 && x < window.innerWidth && y < window.innerHeight;
        if (!inViewport) {
            unobscured = true;
        } else {
            const topEl = document.elementFromPoint(x, y);
            unobscured = !!topEl && (el === topEl || el.contains(topEl) || topEl.contains(el));
        }
    }

    const isControl = el instanceof HTMLInputElement
        || el instanceof HTMLSelectElement
        || el instanceof HTMLTextAreaElement
        || el instanceof HTMLButtonElement
        || el instanceof HTMLOutputElement;
    const value = isControl ? String(el.value) : el.getAttribute('value');

    return {
        index: index,
        tag: el.tagName.toLowerCase(),
        text: (el.textContent || '').trim().substring(0, 200),
        visible: visible,
        unobscured: unobscured,
        value: value,
        size: { width: rect.width, height: rect.height }
    };
}"#;

#[derive(Debug, Deserialize)]
struct AttributeValue {
    value: Option<String>,
}

/// [`Driver`] backed by a chromiumoxide tab.
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    page: Page,
}

impl ChromiumDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn navigate_to(&self, url: &str) -> Result<()> {
        tracing::info!("Navigating to: {}", url);
        self.page
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        // goto() already waited for the load event; give post-load scripts a moment.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    async fn find_elements(&self, locator: &ScopedLocator) -> Result<Vec<ElementState>> {
        let js = format!(
            "(() => {{ const elements = {elements}; return elements.map({state}); }})()",
            elements = locator.elements_js()?,
            state = ELEMENT_STATE_JS
        );

        self.page
            .evaluate(js)
            .await
            .with_context(|| format!("Failed to query {}", locator))?
            .into_value()
            .with_context(|| format!("Failed to parse element states for {}", locator))
    }

    async fn click(&self, locator: &ScopedLocator) -> Result<()> {
        let outcome: ClickOutcome = self
            .page
            .evaluate(click_js(locator)?)
            .await
            .with_context(|| format!("Failed to click {}", locator))?
            .into_value()
            .context("Failed to parse click result")?;

        if let Some(error) = outcome.error {
            bail!("{}", error);
        }
        if outcome.method == Some(ClickMethod::JsClick) {
            tracing::debug!("Clicked {} via JS fallback", locator);
        }
        // Let click handlers and transitions start before the next query.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        Ok(())
    }

    async fn attribute(&self, locator: &ScopedLocator, name: &str) -> Result<Option<String>> {
        let js = format!(
            r#"(() => {{
                const el = {elements}[0];
                return {{ value: el ? el.getAttribute({name}) : null }};
            }})()"#,
            elements = locator.elements_js()?,
            name = serde_json::to_string(name)?
        );

        // A bare `null` result carries no value over CDP, so it is wrapped.
        let result: AttributeValue = self
            .page
            .evaluate(js)
            .await
            .with_context(|| format!("Failed to read attribute '{}' of {}", name, locator))?
            .into_value()
            .context("Failed to parse attribute value")?;
        Ok(result.value)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.page
            .screenshot(CaptureScreenshotParams::builder().build())
            .await
            .context("Failed to take screenshot")
    }
}
