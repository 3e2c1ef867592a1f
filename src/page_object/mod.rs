//! Declarative page objects: named locators grouped into nested sections.

pub mod alias;
pub mod expect;
pub mod page;
pub mod properties;
pub mod section;

pub use alias::{parse_target, AliasRegistry, Target};
pub use expect::{CountExpectation, ElementExpectation, ElementsExpectation, TitleExpectation, ValueExpectation};
pub use page::{Page, PageBuilder, PageDef, PageState};
pub use properties::Properties;
pub use section::{Section, SectionBuilder, SectionDef};
