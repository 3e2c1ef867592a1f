use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::alias::{parse_target, validate_name, AliasRegistry, Target};
use super::expect::{ElementExpectation, ElementsExpectation};
use super::properties::Properties;
use crate::config::WaitSettings;
use crate::driver::{Driver, ElementState, Size};
use crate::error::{DefinitionError, HarnessError};
use crate::interaction::wait_until;
use crate::selectors::{Locator, ScopedLocator};

/// Immutable description of a page region: its root, aliases, child
/// sections and expected-value properties. Built once, then only read.
#[derive(Debug, Clone)]
pub struct SectionDef {
    name: String,
    root: Option<Locator>,
    aliases: AliasRegistry,
    sections: BTreeMap<String, SectionDef>,
    properties: Properties,
}

impl SectionDef {
    pub fn builder(name: impl Into<String>, root: Locator) -> SectionBuilder {
        SectionBuilder::new(name.into(), Some(root))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` for a page's root section, which is the document itself.
    pub fn root(&self) -> Option<&Locator> {
        self.root.as_ref()
    }

    pub fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn child(&self, name: &str) -> Option<&SectionDef> {
        self.sections.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &SectionDef> {
        self.sections.values()
    }
}

pub struct SectionBuilder {
    name: String,
    root: Option<Locator>,
    aliases: Vec<(String, Locator)>,
    sections: Vec<SectionDef>,
    properties: Properties,
}

impl SectionBuilder {
    pub(crate) fn new(name: String, root: Option<Locator>) -> Self {
        Self {
            name,
            root,
            aliases: Vec::new(),
            sections: Vec::new(),
            properties: Properties::new(),
        }
    }

    /// Register `name` (with or without `@`) for a raw selector string.
    pub fn alias(self, name: &str, selector: &str) -> Self {
        self.alias_locator(name, Locator::parse(selector))
    }

    pub fn alias_locator(mut self, name: &str, locator: Locator) -> Self {
        self.aliases.push((name.to_string(), locator));
        self
    }

    pub fn section(mut self, section: SectionDef) -> Self {
        self.sections.push(section);
        self
    }

    pub fn property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties = self.properties.with(key, value);
        self
    }

    pub fn build(self) -> Result<SectionDef, DefinitionError> {
        let name = validate_name("section", &self.name)?;

        let mut aliases = AliasRegistry::new(name.clone());
        for (alias, locator) in self.aliases {
            aliases.register(&alias, locator)?;
        }

        let mut sections = BTreeMap::new();
        for section in self.sections {
            if sections.contains_key(section.name()) {
                return Err(DefinitionError::Duplicate {
                    kind: "section",
                    scope: name,
                    name: section.name,
                });
            }
            sections.insert(section.name.clone(), section);
        }

        Ok(SectionDef {
            name,
            root: self.root,
            aliases,
            sections,
            properties: self.properties,
        })
    }
}

/// A [`SectionDef`] bound to a live driver and to its position in the page.
///
/// Every query is issued under the chain of roots leading to this section,
/// so an alias only ever matches inside the section that declares it.
#[derive(Clone)]
pub struct Section<'a> {
    def: &'a SectionDef,
    scope: Vec<Locator>,
    path: String,
    driver: &'a dyn Driver,
    waits: WaitSettings,
}

impl<'a> Section<'a> {
    pub(crate) fn new(
        def: &'a SectionDef,
        scope: Vec<Locator>,
        path: String,
        driver: &'a dyn Driver,
        waits: WaitSettings,
    ) -> Self {
        Self {
            def,
            scope,
            path,
            driver,
            waits,
        }
    }

    pub fn name(&self) -> &str {
        self.def.name()
    }

    /// Human-readable location, e.g. `Carina > bottomContent`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn definition(&self) -> &'a SectionDef {
        self.def
    }

    pub fn properties(&self) -> &'a Properties {
        self.def.properties()
    }

    pub fn property_u64(&self, key: &str) -> Result<u64, HarnessError> {
        self.properties()
            .get_u64(key)
            .ok_or_else(|| self.unknown_property(key))
    }

    /// An expected element count, rejected when it does not fit a `usize`.
    pub fn property_count(&self, key: &str) -> Result<usize, HarnessError> {
        let value = self.property_u64(key)?;
        usize::try_from(value).map_err(|_| self.unknown_property(key))
    }

    pub fn property_str(&self, key: &str) -> Result<&'a str, HarnessError> {
        self.properties()
            .get_str(key)
            .ok_or_else(|| self.unknown_property(key))
    }

    fn unknown_property(&self, key: &str) -> HarnessError {
        HarnessError::UnknownProperty {
            scope: self.path.clone(),
            property: key.to_string(),
        }
    }

    /// Child section `name`, scoped under this section's root.
    pub fn section(&self, name: &str) -> Result<Section<'a>, HarnessError> {
        let child = self
            .def
            .child(name)
            .ok_or_else(|| HarnessError::UnknownSection {
                scope: self.path.clone(),
                section: name.to_string(),
            })?;

        let mut scope = self.scope.clone();
        scope.extend(child.root().cloned());
        Ok(Section::new(
            child,
            scope,
            format!("{} > {}", self.path, child.name()),
            self.driver,
            self.waits,
        ))
    }

    /// Resolve `@alias` in this scope, or take a raw selector as given.
    pub fn locate(&self, token: &str) -> Result<ScopedLocator, HarnessError> {
        let target = match parse_target(token) {
            Target::Alias(name) => self.def.aliases().resolve(name)?.clone(),
            Target::Raw(selector) => Locator::parse(selector),
        };
        Ok(ScopedLocator::within(self.scope.clone(), target))
    }

    pub async fn elements(&self, token: &str) -> Result<Vec<ElementState>, HarnessError> {
        let locator = self.locate(token)?;
        Ok(self.driver.find_elements(&locator).await?)
    }

    /// Wait until the target is present, visible and unobstructed, then click it.
    pub async fn click(&self, token: &str) -> Result<(), HarnessError> {
        let locator = self.locate(token)?;
        let driver = self.driver;
        let target = &locator;
        let found = AtomicBool::new(false);
        let seen = &found;
        let description = format!("{} in {} to be actionable", token, self.path);

        let waited = wait_until(
            &description,
            self.waits.condition_timeout,
            self.waits.poll_interval,
            move || async move {
                let states = driver.find_elements(target).await?;
                seen.store(!states.is_empty(), Ordering::SeqCst);
                Ok::<_, anyhow::Error>(states.first().is_some_and(ElementState::is_actionable))
            },
        )
        .await
        .map_err(|err| match err {
            // Only an element that was found can be "not actionable"
            HarnessError::Timeout { elapsed, .. } if found.load(Ordering::SeqCst) => {
                HarnessError::ElementNotActionable {
                    target: format!("{} ({}) in {}", token, locator, self.path),
                    elapsed,
                }
            }
            other => other,
        })?;

        self.driver.click(&locator).await?;
        tracing::debug!("Clicked {} in {} after {}ms", token, self.path, waited.as_millis());
        Ok(())
    }

    /// Block until the target is visible, failing with a timeout after `timeout`.
    pub async fn wait_for_element_visible(
        &self,
        token: &str,
        timeout: Duration,
    ) -> Result<Duration, HarnessError> {
        self.wait_for(token, "visible", timeout, |states| {
            states.first().is_some_and(|state| state.visible)
        })
        .await
    }

    pub async fn wait_for_element_present(
        &self,
        token: &str,
        timeout: Duration,
    ) -> Result<Duration, HarnessError> {
        self.wait_for(token, "present", timeout, |states| !states.is_empty())
            .await
    }

    pub async fn wait_for_element_not_present(
        &self,
        token: &str,
        timeout: Duration,
    ) -> Result<Duration, HarnessError> {
        self.wait_for(token, "removed", timeout, |states| states.is_empty())
            .await
    }

    async fn wait_for<P>(
        &self,
        token: &str,
        state: &str,
        timeout: Duration,
        predicate: P,
    ) -> Result<Duration, HarnessError>
    where
        P: Fn(&[ElementState]) -> bool + Sync,
    {
        let locator = self.locate(token)?;
        let driver = self.driver;
        let target = &locator;
        let predicate = &predicate;

        let waited = wait_until(
            &format!("{} in {} to be {}", token, self.path, state),
            timeout,
            self.waits.poll_interval,
            move || async move {
                let states = driver.find_elements(target).await?;
                Ok::<_, anyhow::Error>(predicate(&states))
            },
        )
        .await?;
        tracing::debug!("{} in {} {} after {}ms", token, self.path, state, waited.as_millis());
        Ok(waited)
    }

    /// Query surface for one element; non-blocking unless `.within()` is used.
    pub fn expect_element(&self, token: &str) -> ElementExpectation<'a> {
        ElementExpectation::new(
            format!("{} in {}", token, self.path),
            self.locate(token),
            self.driver,
            self.waits.poll_interval,
        )
    }

    pub fn expect_elements(&self, token: &str) -> ElementsExpectation<'a> {
        ElementsExpectation::new(self.expect_element(token))
    }

    /// Rendered size of the first match.
    pub async fn element_size(&self, token: &str) -> Result<Size, HarnessError> {
        let states = self.elements(token).await?;
        states.first().map(|state| state.size).ok_or_else(|| {
            HarnessError::mismatch(
                format!("{} in {}", token, self.path),
                "to be present",
                "it was not present",
            )
        })
    }

    pub async fn attribute(&self, token: &str, name: &str) -> Result<Option<String>, HarnessError> {
        let locator = self.locate(token)?;
        Ok(self.driver.attribute(&locator, name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::{FakeElement, MemoryDriver};

    fn definition() -> SectionDef {
        SectionBuilder::new("Carina".into(), None)
            .alias("@closeIcon", "#page-close")
            .section(
                SectionDef::builder("videoDialog", Locator::css("#video-dialog"))
                    .alias("@closeIcon", ".close-icon")
                    .build()
                    .unwrap(),
            )
            .section(
                SectionDef::builder("infoSheet", Locator::css("#info-sheet"))
                    .alias("@closeIcon", ".close-icon")
                    .section(
                        SectionDef::builder("tabs", Locator::css(".tabs"))
                            .alias("@tabHeader", ".tab-header")
                            .build()
                            .unwrap(),
                    )
                    .property("tabCount", 2)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    fn waits() -> WaitSettings {
        WaitSettings::default()
            .with_condition_timeout(Duration::from_millis(200))
            .with_poll_interval(Duration::from_millis(5))
    }

    fn root<'a>(def: &'a SectionDef, driver: &'a MemoryDriver) -> Section<'a> {
        Section::new(def, Vec::new(), "Carina".into(), driver, waits())
    }

    #[test]
    fn test_same_alias_resolves_per_scope() {
        let def = definition();
        let driver = MemoryDriver::new();
        let page = root(&def, &driver);

        let video = page.section("videoDialog").unwrap().locate("@closeIcon").unwrap();
        let info = page.section("infoSheet").unwrap().locate("@closeIcon").unwrap();
        let top = page.locate("@closeIcon").unwrap();

        assert_eq!(video.scope, vec![Locator::css("#video-dialog")]);
        assert_eq!(info.scope, vec![Locator::css("#info-sheet")]);
        assert!(top.scope.is_empty());
        assert_ne!(video, info);
    }

    #[test]
    fn test_nested_section_extends_scope_chain() {
        let def = definition();
        let driver = MemoryDriver::new();
        let tabs = root(&def, &driver)
            .section("infoSheet")
            .unwrap()
            .section("tabs")
            .unwrap();

        assert_eq!(tabs.path(), "Carina > infoSheet > tabs");
        assert_eq!(
            tabs.locate("@tabHeader").unwrap().to_string(),
            "#info-sheet >> .tabs >> .tab-header"
        );
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let def = definition();
        let driver = MemoryDriver::new();
        let page = root(&def, &driver);

        assert!(matches!(page.section("missing"), Err(HarnessError::UnknownSection { .. })));
        assert!(matches!(page.locate("@missing"), Err(HarnessError::UnknownAlias { .. })));
        assert!(matches!(
            page.section("videoDialog").unwrap().property_u64("tabCount"),
            Err(HarnessError::UnknownProperty { .. })
        ));
        assert_eq!(page.section("infoSheet").unwrap().property_u64("tabCount").unwrap(), 2);
        assert_eq!(page.section("infoSheet").unwrap().property_count("tabCount").unwrap(), 2);
        assert!(matches!(
            page.section("videoDialog").unwrap().property_count("tabCount"),
            Err(HarnessError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_raw_selector_is_scoped_too() {
        let def = definition();
        let driver = MemoryDriver::new();
        let video = root(&def, &driver).section("videoDialog").unwrap();
        assert_eq!(
            video.locate("video").unwrap(),
            ScopedLocator::within(vec![Locator::css("#video-dialog")], Locator::css("video"))
        );
    }

    #[test]
    fn test_duplicate_child_section_rejected() {
        let child = || SectionDef::builder("dup", Locator::css("#dup")).build().unwrap();
        let err = SectionBuilder::new("Carina".into(), None)
            .section(child())
            .section(child())
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Duplicate { kind: "section", .. }));
    }

    #[tokio::test]
    async fn test_click_waits_for_actionable_element() {
        let def = definition();
        let driver = MemoryDriver::new();
        let dialog = ScopedLocator::document(Locator::css("#video-dialog"));
        let close = ScopedLocator::within(vec![Locator::css("#video-dialog")], Locator::css(".close-icon"));
        driver.insert(dialog, FakeElement::visible("div"));
        driver.insert(
            close.clone(),
            FakeElement::visible("button").visible_after(Duration::from_millis(30)),
        );

        let video = root(&def, &driver).section("videoDialog").unwrap();
        video.click("@closeIcon").await.unwrap();
        assert_eq!(driver.log().clicks, vec![close]);
    }

    #[tokio::test]
    async fn test_click_on_obscured_element_times_out() {
        let def = definition();
        let driver = MemoryDriver::new();
        driver.insert(
            ScopedLocator::document(Locator::css("#page-close")),
            FakeElement::visible("button").obscured(),
        );

        let err = root(&def, &driver).click("@closeIcon").await.unwrap_err();
        assert!(matches!(err, HarnessError::ElementNotActionable { .. }));
        assert!(err.is_timeout());
        assert!(driver.log().clicks.is_empty());
    }

    #[tokio::test]
    async fn test_click_on_missing_element_is_a_plain_timeout() {
        let def = definition();
        let driver = MemoryDriver::new();

        let err = root(&def, &driver).click("@closeIcon").await.unwrap_err();
        match err {
            HarnessError::Timeout { condition, .. } => {
                assert_eq!(condition, "@closeIcon in Carina to be actionable");
            }
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert!(driver.log().clicks.is_empty());
    }

    #[tokio::test]
    async fn test_wait_for_visible_boundary() {
        let def = definition();
        let driver = MemoryDriver::new();
        let page = root(&def, &driver);
        driver.insert(
            ScopedLocator::document(Locator::css("#page-close")),
            FakeElement::visible("button").visible_after(Duration::from_millis(40)),
        );

        page.wait_for_element_visible("@closeIcon", Duration::from_millis(1_000))
            .await
            .unwrap();

        let err = page
            .wait_for_element_visible("#never", Duration::from_millis(60))
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_element_size() {
        let def = definition();
        let driver = MemoryDriver::new();
        driver.insert(
            ScopedLocator::document(Locator::css("html")),
            FakeElement::visible("html").with_size(1280.0, 720.0),
        );
        let page = root(&def, &driver);
        assert_eq!(page.element_size("html").await.unwrap(), Size::new(1280.0, 720.0));
        assert!(page.element_size("#absent").await.is_err());
    }
}
