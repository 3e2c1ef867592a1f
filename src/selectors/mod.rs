pub mod css;
pub mod text;
pub mod xpath;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of selector to use for element resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorType {
    #[default]
    Css,
    Text,
    Xpath,
}

/// A selector expression plus the strategy used to evaluate it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub selector: String,
    pub selector_type: SelectorType,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            selector_type: SelectorType::Css,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            selector: text.into(),
            selector_type: SelectorType::Text,
        }
    }

    /// XPath locators are evaluated with the scope root as context node, so
    /// they should be relative (`.//li`) to stay inside their section.
    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self {
            selector: xpath.into(),
            selector_type: SelectorType::Xpath,
        }
    }

    /// Parse a raw selector string. Plain strings are CSS; Playwright-style
    /// `:has-text("...")` becomes a text locator.
    pub fn parse(selector: &str) -> Self {
        let (selector, selector_type) = normalize_selector_type(selector, SelectorType::Css);
        Self {
            selector,
            selector_type,
        }
    }

    /// JS expression evaluating to the first match below the JS variable `root`, or null.
    pub fn first_js(&self, root: &str) -> Result<String> {
        match self.selector_type {
            SelectorType::Css => css::first_js(root, &self.selector),
            SelectorType::Text => text::first_js(root, &self.selector),
            SelectorType::Xpath => xpath::first_js(root, &self.selector),
        }
    }

    /// JS expression evaluating to an array of every match below `root`.
    pub fn all_js(&self, root: &str) -> Result<String> {
        match self.selector_type {
            SelectorType::Css => css::all_js(root, &self.selector),
            SelectorType::Text => text::all_js(root, &self.selector),
            SelectorType::Xpath => xpath::all_js(root, &self.selector),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selector_type {
            SelectorType::Css => write!(f, "{}", self.selector),
            SelectorType::Text => write!(f, "text={:?}", self.selector),
            SelectorType::Xpath => write!(f, "xpath={}", self.selector),
        }
    }
}

/// A locator qualified by the chain of section roots it is evaluated under.
///
/// The scope is ordered outermost first. Each root is resolved relative to the
/// previous one (the first relative to the document), and the target relative
/// to the last. A missing root means no matches, never a document-wide search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopedLocator {
    pub scope: Vec<Locator>,
    pub target: Locator,
}

impl ScopedLocator {
    pub fn document(target: Locator) -> Self {
        Self {
            scope: Vec::new(),
            target,
        }
    }

    pub fn within(scope: Vec<Locator>, target: Locator) -> Self {
        Self { scope, target }
    }

    /// The locators of each enclosing root, as scoped locators themselves.
    pub fn roots(&self) -> impl Iterator<Item = ScopedLocator> + '_ {
        (0..self.scope.len())
            .map(|depth| ScopedLocator::within(self.scope[..depth].to_vec(), self.scope[depth].clone()))
    }

    /// JS expression evaluating to the array of matched elements.
    pub fn elements_js(&self) -> Result<String> {
        let mut body = String::from("let root = document;\n");
        for root in &self.scope {
            body.push_str(&format!(
                "root = {};\nif (!root) return [];\n",
                root.first_js("root")?
            ));
        }
        body.push_str(&format!("return {};", self.target.all_js("root")?));
        Ok(format!("(() => {{\n{}\n}})()", body))
    }
}

impl fmt::Display for ScopedLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in &self.scope {
            write!(f, "{} >> ", root)?;
        }
        write!(f, "{}", self.target)
    }
}

/// Detect Playwright-style :has-text("...") and convert to text selector.
pub fn normalize_selector_type(selector: &str, selector_type: SelectorType) -> (String, SelectorType) {
    if matches!(selector_type, SelectorType::Css) {
        if let Some(start) = selector.find(":has-text(") {
            let after = &selector[start + ":has-text(".len()..];
            let (quote, rest) = if let Some(stripped) = after.strip_prefix('"') {
                ('"', stripped)
            } else if let Some(stripped) = after.strip_prefix('\'') {
                ('\'', stripped)
            } else {
                return (selector.to_string(), selector_type);
            };
            if let Some(end) = rest.find(quote) {
                let text = &rest[..end];
                return (text.to_string(), SelectorType::Text);
            }
        }
    }
    (selector.to_string(), selector_type)
}
