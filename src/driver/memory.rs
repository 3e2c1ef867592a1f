//! In-memory [`Driver`] with a scripted DOM.
//!
//! Elements are stored under the exact [`ScopedLocator`] a page object would
//! produce for them, so a lookup only succeeds inside the scope the element was
//! registered in. Every enclosing root must itself be present, which mirrors a
//! section disappearing together with its children.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use super::{Driver, ElementState, Size};
use crate::selectors::ScopedLocator;

/// A scripted element.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeElement {
    pub tag: String,
    pub text: String,
    pub visible: bool,
    pub obscured: bool,
    pub value: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub size: Size,
    visible_from: Option<Instant>,
}

impl FakeElement {
    pub fn visible(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: String::new(),
            visible: true,
            obscured: false,
            value: None,
            attributes: BTreeMap::new(),
            size: Size::new(100.0, 20.0),
            visible_from: None,
        }
    }

    /// Attached to the DOM but not rendered (`display: none` and friends).
    pub fn hidden(tag: impl Into<String>) -> Self {
        Self {
            visible: false,
            size: Size::default(),
            ..Self::visible(tag)
        }
    }

    /// Becomes visible once `delay` has passed from now.
    pub fn visible_after(mut self, delay: Duration) -> Self {
        self.visible_from = Some(Instant::now() + delay);
        self
    }

    /// Covered by another element, so not clickable.
    pub fn obscured(mut self) -> Self {
        self.obscured = true;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }

    fn is_visible_now(&self) -> bool {
        self.visible && self.visible_from.map_or(true, |at| Instant::now() >= at)
    }

    fn state(&self, index: usize) -> ElementState {
        let visible = self.is_visible_now();
        ElementState {
            index,
            tag: self.tag.clone(),
            text: self.text.clone(),
            visible,
            unobscured: visible && !self.obscured,
            value: self.value.clone(),
            size: if visible { self.size } else { Size::default() },
        }
    }
}

/// An element that covers the rest of the page while it is shown.
#[derive(Debug, Clone)]
struct Overlay {
    cover: ScopedLocator,
    exempt: Vec<ScopedLocator>,
}

/// The mutable document behind a [`MemoryDriver`].
#[derive(Debug, Default)]
pub struct MemoryDom {
    title: String,
    url: Option<String>,
    elements: HashMap<ScopedLocator, Vec<FakeElement>>,
    overlays: Vec<Overlay>,
}

impl MemoryDom {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Append one element matching `locator`.
    pub fn insert(&mut self, locator: ScopedLocator, element: FakeElement) {
        self.elements.entry(locator).or_default().push(element);
    }

    /// Replace every element matching `locator`.
    pub fn replace(&mut self, locator: ScopedLocator, elements: Vec<FakeElement>) {
        self.elements.insert(locator, elements);
    }

    /// Detach every element matching `locator`. Returns whether any existed.
    pub fn remove(&mut self, locator: &ScopedLocator) -> bool {
        self.elements
            .remove(locator)
            .is_some_and(|removed| !removed.is_empty())
    }

    pub fn set_visible(&mut self, locator: &ScopedLocator, visible: bool) {
        for element in self.elements.get_mut(locator).into_iter().flatten() {
            element.visible = visible;
            element.visible_from = None;
        }
    }

    pub fn set_value(&mut self, locator: &ScopedLocator, value: impl Into<String>) {
        let value = value.into();
        for element in self.elements.get_mut(locator).into_iter().flatten() {
            element.value = Some(value.clone());
        }
    }

    /// While `cover` is present and visible, every element outside it and
    /// outside `exempt` reports as obscured.
    pub fn add_overlay(&mut self, cover: ScopedLocator, exempt: Vec<ScopedLocator>) {
        self.overlays.push(Overlay { cover, exempt });
    }

    /// Whether a shown overlay sits on top of `locator`.
    pub fn is_covered(&self, locator: &ScopedLocator) -> bool {
        self.overlays.iter().any(|overlay| {
            let inside = |candidate: &ScopedLocator| {
                *candidate == overlay.cover || overlay.exempt.contains(candidate)
            };
            let shown = self.matches(&overlay.cover).iter().any(FakeElement::is_visible_now);
            shown && !inside(locator) && !locator.roots().any(|root| inside(&root))
        })
    }

    pub fn contains(&self, locator: &ScopedLocator) -> bool {
        !self.matches(locator).is_empty()
    }

    /// Matches for `locator`, empty when it or any enclosing root is absent.
    pub fn matches(&self, locator: &ScopedLocator) -> &[FakeElement] {
        let roots_present = locator.roots().all(|root| {
            self.elements
                .get(&root)
                .is_some_and(|elements| !elements.is_empty())
        });
        if !roots_present {
            return &[];
        }
        self.elements.get(locator).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Everything the harness asked of the driver, in order.
#[derive(Debug, Clone, Default)]
pub struct DriverLog {
    pub navigations: Vec<String>,
    pub queries: Vec<ScopedLocator>,
    pub clicks: Vec<ScopedLocator>,
    pub screenshots: usize,
}

type ClickHandler = Arc<dyn Fn(&mut MemoryDom) + Send + Sync>;

/// [`Driver`] over a [`MemoryDom`], with click handlers scripted per locator.
#[derive(Default)]
pub struct MemoryDriver {
    dom: Mutex<MemoryDom>,
    handlers: Mutex<HashMap<ScopedLocator, ClickHandler>>,
    log: Mutex<DriverLog>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        lock(&self.dom).set_title(title);
        self
    }

    pub fn insert(&self, locator: ScopedLocator, element: FakeElement) {
        lock(&self.dom).insert(locator, element);
    }

    /// Mutate the document directly.
    pub fn update<R>(&self, f: impl FnOnce(&mut MemoryDom) -> R) -> R {
        f(&mut lock(&self.dom))
    }

    /// Run `handler` against the document whenever `locator` is clicked.
    pub fn on_click(
        &self,
        locator: ScopedLocator,
        handler: impl Fn(&mut MemoryDom) + Send + Sync + 'static,
    ) {
        lock(&self.handlers).insert(locator, Arc::new(handler));
    }

    pub fn log(&self) -> DriverLog {
        lock(&self.log).clone()
    }

    /// How many times `locator` was queried.
    pub fn query_count(&self, locator: &ScopedLocator) -> usize {
        lock(&self.log)
            .queries
            .iter()
            .filter(|queried| *queried == locator)
            .count()
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn navigate_to(&self, url: &str) -> Result<()> {
        lock(&self.dom).url = Some(url.to_string());
        lock(&self.log).navigations.push(url.to_string());
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        Ok(lock(&self.dom).title.clone())
    }

    async fn find_elements(&self, locator: &ScopedLocator) -> Result<Vec<ElementState>> {
        lock(&self.log).queries.push(locator.clone());
        let dom = lock(&self.dom);
        let covered = dom.is_covered(locator);
        Ok(dom
            .matches(locator)
            .iter()
            .enumerate()
            .map(|(index, element)| {
                let mut state = element.state(index);
                state.unobscured &= !covered;
                state
            })
            .collect())
    }

    async fn click(&self, locator: &ScopedLocator) -> Result<()> {
        if !lock(&self.dom).contains(locator) {
            bail!("Element not found: {}", locator);
        }
        lock(&self.log).clicks.push(locator.clone());

        let handler = lock(&self.handlers).get(locator).cloned();
        if let Some(handler) = handler {
            handler(&mut lock(&self.dom));
        }
        Ok(())
    }

    async fn attribute(&self, locator: &ScopedLocator, name: &str) -> Result<Option<String>> {
        let dom = lock(&self.dom);
        Ok(dom
            .matches(locator)
            .first()
            .and_then(|element| element.attributes.get(name).cloned()))
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        lock(&self.log).screenshots += 1;
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }
}
