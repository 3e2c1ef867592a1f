//! Batch checks over a list of aliases in one scope.

use crate::error::HarnessError;
use crate::page_object::{Page, Section};

/// Anything aliases can be resolved in: a page or one of its sections.
pub trait Scope {
    fn section_view(&self) -> Section<'_>;
}

impl Scope for Page {
    fn section_view(&self) -> Section<'_> {
        self.root()
    }
}

impl Scope for Section<'_> {
    fn section_view(&self) -> Section<'_> {
        self.clone()
    }
}

#[derive(Clone, Copy)]
enum Check {
    Visible,
    NotPresent,
}

impl Check {
    async fn run(self, section: &Section<'_>, token: &str) -> Result<(), HarnessError> {
        let expectation = section.expect_element(token);
        match self {
            Self::Visible => expectation.to_be_visible().await,
            Self::NotPresent => expectation.to_not_be_present().await,
        }
    }
}

async fn check_all<S>(scope: &S, names: &[&str], check: Check) -> Result<(), HarnessError>
where
    S: Scope + Sync + ?Sized,
{
    let section = scope.section_view();
    for (index, name) in names.iter().enumerate() {
        if let Err(err) = check.run(&section, name).await {
            return Err(HarnessError::ExpectationFailed {
                index,
                alias: name.to_string(),
                source: Box::new(err),
            });
        }
    }
    Ok(())
}

/// Every alias must be visible. Stops at the first one that is not.
pub async fn expect_all_visible<S>(scope: &S, names: &[&str]) -> Result<(), HarnessError>
where
    S: Scope + Sync + ?Sized,
{
    check_all(scope, names, Check::Visible).await
}

/// Every alias must be absent from the DOM. A hidden element fails this.
pub async fn expect_all_not_present<S>(scope: &S, names: &[&str]) -> Result<(), HarnessError>
where
    S: Scope + Sync + ?Sized,
{
    check_all(scope, names, Check::NotPresent).await
}
