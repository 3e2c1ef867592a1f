use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::alias::{parse_target, Target};
use super::expect::{ElementExpectation, ElementsExpectation, TitleExpectation};
use super::properties::Properties;
use super::section::{Section, SectionBuilder, SectionDef};
use crate::config::WaitSettings;
use crate::driver::{Driver, Size};
use crate::error::{DefinitionError, HarnessError};

/// Where the page is in its load sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    NotStarted,
    Navigated,
    Ready,
}

impl PageState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Navigated,
            2 => Self::Ready,
            _ => Self::NotStarted,
        }
    }
}

/// Immutable description of one application screen.
#[derive(Debug, Clone)]
pub struct PageDef {
    url: String,
    ready: String,
    root: SectionDef,
}

impl PageDef {
    pub fn builder(name: impl Into<String>, url: impl Into<String>) -> PageBuilder {
        PageBuilder {
            url: url.into(),
            ready: None,
            inner: SectionBuilder::new(name.into(), None),
        }
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Target that must be visible for the page to count as ready.
    pub fn ready_target(&self) -> &str {
        &self.ready
    }

    pub fn root(&self) -> &SectionDef {
        &self.root
    }
}

pub struct PageBuilder {
    url: String,
    ready: Option<String>,
    inner: SectionBuilder,
}

impl PageBuilder {
    pub fn alias(mut self, name: &str, selector: &str) -> Self {
        self.inner = self.inner.alias(name, selector);
        self
    }

    pub fn section(mut self, section: SectionDef) -> Self {
        self.inner = self.inner.section(section);
        self
    }

    pub fn property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.inner = self.inner.property(key, value);
        self
    }

    /// The page is ready once `token` is visible. Defaults to `body`.
    pub fn ready_when_visible(mut self, token: &str) -> Self {
        self.ready = Some(token.to_string());
        self
    }

    pub fn build(self) -> Result<PageDef, DefinitionError> {
        let root = self.inner.build()?;
        let ready = self.ready.unwrap_or_else(|| "body".to_string());
        if let Target::Alias(name) = parse_target(&ready) {
            if !root.aliases().contains(name) {
                return Err(DefinitionError::UnknownReadyAlias {
                    page: root.name().to_string(),
                    token: ready,
                });
            }
        }
        Ok(PageDef {
            url: self.url,
            ready,
            root,
        })
    }
}

/// The root section of a session, plus navigation and readiness.
///
/// Page-level aliases resolve against the document. Everything a
/// [`Section`] offers is available here through [`Page::root`] or the
/// delegating shortcuts.
pub struct Page {
    def: PageDef,
    driver: Arc<dyn Driver>,
    waits: WaitSettings,
    state: AtomicU8,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("name", &self.def.name())
            .field("url", &self.def.url())
            .field("state", &self.state())
            .finish()
    }
}

impl Page {
    pub fn new(def: PageDef, driver: Arc<dyn Driver>, waits: WaitSettings) -> Self {
        Self {
            def,
            driver,
            waits,
            state: AtomicU8::new(PageState::NotStarted as u8),
        }
    }

    pub fn definition(&self) -> &PageDef {
        &self.def
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub fn waits(&self) -> WaitSettings {
        self.waits
    }

    pub fn state(&self) -> PageState {
        PageState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn root(&self) -> Section<'_> {
        Section::new(
            self.def.root(),
            Vec::new(),
            self.def.name().to_string(),
            self.driver.as_ref(),
            self.waits,
        )
    }

    pub fn section(&self, name: &str) -> Result<Section<'_>, HarnessError> {
        self.root().section(name)
    }

    pub fn properties(&self) -> &Properties {
        self.def.root().properties()
    }

    /// Load the application URL.
    pub async fn navigate(&self) -> Result<&Self, HarnessError> {
        tracing::info!("Loading {} from {}", self.def.name(), self.def.url());
        self.driver.navigate_to(self.def.url()).await?;
        self.state.store(PageState::Navigated as u8, Ordering::SeqCst);
        Ok(self)
    }

    /// Block until the ready target is visible, bounded by the condition timeout.
    pub async fn wait_for_ready(&self) -> Result<&Self, HarnessError> {
        let waited = self
            .root()
            .wait_for_element_visible(self.def.ready_target(), self.waits.condition_timeout)
            .await?;
        self.state.store(PageState::Ready as u8, Ordering::SeqCst);
        tracing::info!("{} ready after {}ms", self.def.name(), waited.as_millis());
        Ok(self)
    }

    pub fn expect_title(&self) -> TitleExpectation<'_> {
        TitleExpectation::new(self.driver.as_ref(), self.waits.poll_interval)
    }

    pub async fn click(&self, token: &str) -> Result<(), HarnessError> {
        self.root().click(token).await
    }

    pub async fn wait_for_element_visible(
        &self,
        token: &str,
        timeout: Duration,
    ) -> Result<Duration, HarnessError> {
        self.root().wait_for_element_visible(token, timeout).await
    }

    pub fn expect_element(&self, token: &str) -> ElementExpectation<'_> {
        self.root().expect_element(token)
    }

    pub fn expect_elements(&self, token: &str) -> ElementsExpectation<'_> {
        self.root().expect_elements(token)
    }

    pub async fn element_size(&self, token: &str) -> Result<Size, HarnessError> {
        self.root().element_size(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::{FakeElement, MemoryDriver};
    use crate::selectors::{Locator, ScopedLocator};

    fn definition() -> PageDef {
        PageDef::builder("Carina", "http://localhost:8080/")
            .alias("@app", "#app")
            .alias("@splashClose", "#splash-close")
            .property("title", "Carina Nebula")
            .ready_when_visible("@app")
            .build()
            .unwrap()
    }

    fn waits() -> WaitSettings {
        WaitSettings::default()
            .with_condition_timeout(Duration::from_millis(100))
            .with_poll_interval(Duration::from_millis(5))
    }

    #[test]
    fn test_ready_alias_must_be_registered() {
        let err = PageDef::builder("Carina", "http://localhost:8080/")
            .ready_when_visible("@app")
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownReadyAlias { .. }));
    }

    #[tokio::test]
    async fn test_navigate_then_ready() {
        let driver = Arc::new(MemoryDriver::new());
        driver.insert(ScopedLocator::document(Locator::css("#app")), FakeElement::visible("div"));
        let page = Page::new(definition(), driver.clone(), waits());
        assert_eq!(page.state(), PageState::NotStarted);

        page.navigate().await.unwrap().wait_for_ready().await.unwrap();

        assert_eq!(page.state(), PageState::Ready);
        assert_eq!(driver.log().navigations, vec!["http://localhost:8080/".to_string()]);
    }

    #[tokio::test]
    async fn test_ready_times_out() {
        let driver = Arc::new(MemoryDriver::new());
        let page = Page::new(definition(), driver, waits());

        page.navigate().await.unwrap();
        match page.wait_for_ready().await {
            Err(HarnessError::Timeout { condition, .. }) => assert!(condition.contains("@app")),
            other => panic!("expected a ready timeout, got {other:?}"),
        }
        assert_eq!(page.state(), PageState::Navigated);
    }

    #[test]
    fn test_debug_shows_name_and_state() {
        let page = Page::new(definition(), Arc::new(MemoryDriver::new()), waits());
        let debug = format!("{page:?}");
        assert!(debug.contains("Carina"));
        assert!(debug.contains("NotStarted"));
    }

    #[tokio::test]
    async fn test_title_from_properties() {
        let driver = Arc::new(MemoryDriver::new().with_title("Carina Nebula"));
        let page = Page::new(definition(), driver, waits());
        let title = page.root().property_str("title").unwrap().to_string();
        page.expect_title().to_equal(title).await.unwrap();
    }
}
