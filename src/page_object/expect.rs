//! Read-only expectations over a scope's elements.
//!
//! Expectations query once and fail immediately with
//! [`HarnessError::AssertionMismatch`], unless `.within(timeout)` asks them to
//! keep polling until the expectation holds or the timeout passes.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::driver::{Driver, ElementState};
use crate::error::HarnessError;
use crate::selectors::ScopedLocator;

struct Observation {
    passed: bool,
    actual: String,
}

/// Probe once, or poll until the probe passes when `within` is set.
async fn settle<F, Fut>(
    within: Option<Duration>,
    poll_interval: Duration,
    mut probe: F,
) -> Result<Observation, HarnessError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Observation, HarnessError>>,
{
    let start = Instant::now();
    loop {
        let observation = probe().await?;
        let Some(limit) = within else {
            return Ok(observation);
        };
        let elapsed = start.elapsed();
        if observation.passed || elapsed >= limit {
            return Ok(observation);
        }
        tokio::time::sleep(poll_interval.min(limit - elapsed)).await;
    }
}

fn describe_presence(states: &[ElementState]) -> String {
    match states.first() {
        None => "it was not present".to_string(),
        Some(state) if state.visible => "it was present and visible".to_string(),
        Some(_) => "it was present but not visible".to_string(),
    }
}

/// Expectation on the first element a target resolves to.
pub struct ElementExpectation<'a> {
    subject: String,
    target: Result<ScopedLocator, HarnessError>,
    driver: &'a dyn Driver,
    poll_interval: Duration,
    within: Option<Duration>,
}

impl<'a> ElementExpectation<'a> {
    pub(crate) fn new(
        subject: String,
        target: Result<ScopedLocator, HarnessError>,
        driver: &'a dyn Driver,
        poll_interval: Duration,
    ) -> Self {
        Self {
            subject,
            target,
            driver,
            poll_interval,
            within: None,
        }
    }

    /// Keep re-checking for up to `timeout` before reporting a mismatch.
    pub fn within(mut self, timeout: Duration) -> Self {
        self.within = Some(timeout);
        self
    }

    pub async fn to_be_present(self) -> Result<(), HarnessError> {
        self.check("to be present", |states| (!states.is_empty(), describe_presence(states)))
            .await
    }

    /// Absent from the DOM. A hidden element does not satisfy this.
    pub async fn to_not_be_present(self) -> Result<(), HarnessError> {
        self.check("to not be present", |states| (states.is_empty(), describe_presence(states)))
            .await
    }

    pub async fn to_be_visible(self) -> Result<(), HarnessError> {
        self.check("to be visible", |states| {
            (states.first().is_some_and(|s| s.visible), describe_presence(states))
        })
        .await
    }

    /// Present in the DOM but not rendered.
    pub async fn to_not_be_visible(self) -> Result<(), HarnessError> {
        self.check("to be present but not visible", |states| {
            (states.first().is_some_and(|s| !s.visible), describe_presence(states))
        })
        .await
    }

    pub fn value(self) -> ValueExpectation<'a> {
        ValueExpectation {
            element: self,
            source: ValueSource::Value,
        }
    }

    pub fn text(self) -> ValueExpectation<'a> {
        ValueExpectation {
            element: self,
            source: ValueSource::Text,
        }
    }

    pub fn attribute(self, name: impl Into<String>) -> ValueExpectation<'a> {
        ValueExpectation {
            element: self,
            source: ValueSource::Attribute(name.into()),
        }
    }

    async fn check<V>(self, expected: &str, verdict: V) -> Result<(), HarnessError>
    where
        V: Fn(&[ElementState]) -> (bool, String) + Sync,
    {
        let locator = self.target?;
        let driver = self.driver;
        let locator = &locator;
        let verdict = &verdict;

        let observation = settle(self.within, self.poll_interval, move || async move {
            let states = driver.find_elements(locator).await?;
            let (passed, actual) = verdict(&states);
            Ok::<_, HarnessError>(Observation { passed, actual })
        })
        .await?;

        if observation.passed {
            Ok(())
        } else {
            Err(HarnessError::mismatch(self.subject, expected, observation.actual))
        }
    }
}

enum ValueSource {
    Value,
    Text,
    Attribute(String),
}

impl ValueSource {
    fn label(&self) -> String {
        match self {
            Self::Value => "value".to_string(),
            Self::Text => "text".to_string(),
            Self::Attribute(name) => format!("attribute '{}'", name),
        }
    }
}

/// Expectation on a value read from the first matching element.
pub struct ValueExpectation<'a> {
    element: ElementExpectation<'a>,
    source: ValueSource,
}

impl ValueExpectation<'_> {
    pub async fn to_equal(self, expected: impl Into<String>) -> Result<(), HarnessError> {
        let expected = expected.into();
        let description = format!("to equal {:?}", expected);
        self.compare(description, move |actual| actual == expected).await
    }

    pub async fn to_contain(self, fragment: impl Into<String>) -> Result<(), HarnessError> {
        let fragment = fragment.into();
        let description = format!("to contain {:?}", fragment);
        self.compare(description, move |actual| actual.contains(&fragment)).await
    }

    async fn compare<M>(self, expected: String, matches: M) -> Result<(), HarnessError>
    where
        M: Fn(&str) -> bool + Sync,
    {
        let ElementExpectation {
            subject,
            target,
            driver,
            poll_interval,
            within,
        } = self.element;
        let locator = target?;
        let subject = format!("{} of {}", self.source.label(), subject);
        let locator = &locator;
        let source = &self.source;
        let matches = &matches;

        let observation = settle(within, poll_interval, move || async move {
            let value = match source {
                ValueSource::Attribute(name) => {
                    if driver.find_elements(locator).await?.is_empty() {
                        return Ok(Observation {
                            passed: false,
                            actual: "the element was not present".to_string(),
                        });
                    }
                    driver.attribute(locator, name).await?
                }
                ValueSource::Value | ValueSource::Text => {
                    let states = driver.find_elements(locator).await?;
                    let Some(first) = states.into_iter().next() else {
                        return Ok(Observation {
                            passed: false,
                            actual: "the element was not present".to_string(),
                        });
                    };
                    match source {
                        ValueSource::Text => Some(first.text),
                        _ => first.value,
                    }
                }
            };

            Ok::<_, HarnessError>(match value {
                Some(value) => Observation {
                    passed: matches(&value),
                    actual: format!("it was {:?}", value),
                },
                None => Observation {
                    passed: false,
                    actual: "it had none".to_string(),
                },
            })
        })
        .await?;

        if observation.passed {
            Ok(())
        } else {
            Err(HarnessError::mismatch(subject, expected, observation.actual))
        }
    }
}

/// Expectation over every element a target resolves to.
pub struct ElementsExpectation<'a> {
    element: ElementExpectation<'a>,
}

impl<'a> ElementsExpectation<'a> {
    pub(crate) fn new(element: ElementExpectation<'a>) -> Self {
        Self { element }
    }

    pub fn within(self, timeout: Duration) -> Self {
        Self {
            element: self.element.within(timeout),
        }
    }

    /// Number of matching elements in the DOM.
    pub fn count(self) -> CountExpectation<'a> {
        CountExpectation {
            element: self.element,
            visible_only: false,
        }
    }

    /// Number of matching elements that are rendered.
    pub fn visible_count(self) -> CountExpectation<'a> {
        CountExpectation {
            element: self.element,
            visible_only: true,
        }
    }
}

pub struct CountExpectation<'a> {
    element: ElementExpectation<'a>,
    visible_only: bool,
}

impl CountExpectation<'_> {
    pub async fn to_equal(self, expected: usize) -> Result<(), HarnessError> {
        let visible_only = self.visible_only;
        let noun = if visible_only { "visible elements" } else { "elements" };
        self.element
            .check(&format!("to have {} {}", expected, noun), move |states| {
                let count = if visible_only {
                    states.iter().filter(|s| s.visible).count()
                } else {
                    states.len()
                };
                (count == expected, format!("found {}", count))
            })
            .await
    }
}

/// Expectation on the document title.
pub struct TitleExpectation<'a> {
    driver: &'a dyn Driver,
    poll_interval: Duration,
    within: Option<Duration>,
}

impl<'a> TitleExpectation<'a> {
    pub(crate) fn new(driver: &'a dyn Driver, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
            within: None,
        }
    }

    pub fn within(mut self, timeout: Duration) -> Self {
        self.within = Some(timeout);
        self
    }

    pub async fn to_equal(self, expected: impl Into<String>) -> Result<(), HarnessError> {
        let expected = expected.into();
        let driver = self.driver;
        let wanted = &expected;

        let observation = settle(self.within, self.poll_interval, move || async move {
            let title = driver.title().await?;
            Ok::<_, HarnessError>(Observation {
                passed: &title == wanted,
                actual: format!("it was {:?}", title),
            })
        })
        .await?;

        if observation.passed {
            Ok(())
        } else {
            Err(HarnessError::mismatch(
                "page title",
                format!("to equal {:?}", expected),
                observation.actual,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::{FakeElement, MemoryDriver};
    use crate::selectors::Locator;

    fn expectation<'a>(driver: &'a MemoryDriver, selector: &str) -> ElementExpectation<'a> {
        ElementExpectation::new(
            format!("{} in test", selector),
            Ok(ScopedLocator::document(Locator::css(selector))),
            driver,
            Duration::from_millis(5),
        )
    }

    #[tokio::test]
    async fn test_hidden_element_is_present_but_not_visible() {
        let driver = MemoryDriver::new();
        driver.insert(ScopedLocator::document(Locator::css("#info-text")), FakeElement::hidden("p"));

        expectation(&driver, "#info-text").to_be_present().await.unwrap();
        expectation(&driver, "#info-text").to_not_be_visible().await.unwrap();
        assert!(expectation(&driver, "#info-text").to_not_be_present().await.is_err());
        assert!(expectation(&driver, "#info-text").to_be_visible().await.is_err());
    }

    #[tokio::test]
    async fn test_absent_element_is_not_hidden() {
        let driver = MemoryDriver::new();
        let err = expectation(&driver, "#wwt-text").to_not_be_visible().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected #wwt-text in test to be present but not visible, but it was not present"
        );
    }

    #[tokio::test]
    async fn test_value_mismatch_reports_actual() {
        let driver = MemoryDriver::new();
        driver.insert(
            ScopedLocator::document(Locator::css("#opacity-slider")),
            FakeElement::visible("input").with_value("50"),
        );

        expectation(&driver, "#opacity-slider").value().to_equal("50").await.unwrap();
        let err = expectation(&driver, "#opacity-slider").value().to_equal("0").await.unwrap_err();
        match err {
            HarnessError::AssertionMismatch { subject, expected, actual } => {
                assert_eq!(subject, "value of #opacity-slider in test");
                assert_eq!(expected, "to equal \"0\"");
                assert_eq!(actual, "it was \"50\"");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_attribute_and_text() {
        let driver = MemoryDriver::new();
        driver.insert(
            ScopedLocator::document(Locator::css("#video")),
            FakeElement::visible("video")
                .with_attribute("src", "carina.mp4")
                .with_text("Carina flythrough"),
        );

        expectation(&driver, "#video").attribute("src").to_contain(".mp4").await.unwrap();
        expectation(&driver, "#video").text().to_equal("Carina flythrough").await.unwrap();
        assert!(expectation(&driver, "#video").attribute("poster").to_equal("x").await.is_err());
    }

    #[tokio::test]
    async fn test_count_and_visible_count() {
        let driver = MemoryDriver::new();
        let icon = ScopedLocator::document(Locator::css(".credit-icon"));
        driver.insert(icon.clone(), FakeElement::visible("img"));
        driver.insert(icon.clone(), FakeElement::visible("img"));
        driver.insert(icon, FakeElement::hidden("img"));

        ElementsExpectation::new(expectation(&driver, ".credit-icon")).count().to_equal(3).await.unwrap();
        ElementsExpectation::new(expectation(&driver, ".credit-icon"))
            .visible_count()
            .to_equal(2)
            .await
            .unwrap();
        let err = ElementsExpectation::new(expectation(&driver, ".credit-icon"))
            .count()
            .to_equal(4)
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with("to have 4 elements, but found 3"));
    }

    #[tokio::test]
    async fn test_within_polls_until_visible() {
        let driver = MemoryDriver::new();
        driver.insert(
            ScopedLocator::document(Locator::css("#user-experience")),
            FakeElement::visible("div").visible_after(Duration::from_millis(40)),
        );

        assert!(expectation(&driver, "#user-experience").to_be_visible().await.is_err());
        expectation(&driver, "#user-experience")
            .within(Duration::from_secs(2))
            .to_be_visible()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_title() {
        let driver = MemoryDriver::new().with_title("Carina Nebula");
        TitleExpectation::new(&driver, Duration::from_millis(5))
            .to_equal("Carina Nebula")
            .await
            .unwrap();
        let err = TitleExpectation::new(&driver, Duration::from_millis(5))
            .to_equal("Pillars")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::AssertionMismatch);
    }
}
