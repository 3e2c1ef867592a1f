use anyhow::Result;
use serde::Deserialize;

use crate::selectors::ScopedLocator;

/// How a click was delivered to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMethod {
    MouseEvent,
    JsClick,
}

#[derive(Debug, Deserialize)]
pub struct ClickOutcome {
    pub method: Option<ClickMethod>,
    pub error: Option<String>,
}

/// Hybrid click script:
/// 1. Resolve the scoped locator to its first element
/// 2. Scroll into view
/// 3. Check whether the center point is covered by another element
/// 4. Dispatch mouse events if unobscured, fall back to `el.click()` otherwise
pub fn click_js(locator: &ScopedLocator) -> Result<String> {
    Ok(format!(
        r#"(() => {{
            const el = {elements}[0];
            if (!el) return {{ error: 'Element not found: ' + {desc} }};

            el.scrollIntoView({{ block: 'center', inline: 'center', behavior: 'instant' }});

            const rect = el.getBoundingClientRect();
            const x = rect.left + rect.width / 2;
            const y = rect.top + rect.height / 2;

            const topEl = document.elementFromPoint(x, y);
            const unobscured = topEl && (el === topEl || el.contains(topEl) || topEl.contains(el));

            if (unobscured) {{
                const opts = {{ bubbles: true, cancelable: true, clientX: x, clientY: y, button: 0 }};
                el.dispatchEvent(new MouseEvent('mousemove', opts));
                el.dispatchEvent(new MouseEvent('mousedown', opts));
                el.dispatchEvent(new MouseEvent('mouseup', opts));
                el.dispatchEvent(new MouseEvent('click', opts));
                return {{ method: 'mouse_event' }};
            }}

            el.click();
            return {{ method: 'js_click' }};
        }})()"#,
        elements = locator.elements_js()?,
        desc = serde_json::to_string(&locator.to_string())?
    ))
}
