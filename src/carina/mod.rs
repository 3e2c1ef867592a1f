//! The Carina page object: aliases, sections and expected values.

pub mod scenarios;

use crate::driver::Size;
use crate::error::{DefinitionError, HarnessError};
use crate::page_object::{PageDef, SectionDef};
use crate::selectors::Locator;

pub use scenarios::suite;

/// Alias tokens. The same token may be registered in several sections.
pub mod alias {
    pub const APP: &str = "@app";
    pub const SPLASH_SCREEN: &str = "@splashScreen";
    pub const SPLASH_CLOSE: &str = "@splashClose";
    pub const VIDEO_DIALOG: &str = "@videoDialog";
    pub const INFO_SHEET: &str = "@infoSheet";
    pub const USER_EXPERIENCE: &str = "@userExperience";
    pub const MAIN_CONTENT: &str = "@mainContent";

    pub const VIDEO_ICON: &str = "@videoIcon";
    pub const SHOW_HIDE_BUTTON: &str = "@showHideButton";
    pub const RESET_ICON: &str = "@resetIcon";
    pub const TEXT_ICON: &str = "@textIcon";

    pub const TOOLS: &str = "@tools";
    pub const HUBBLE_BUTTON: &str = "@hubbleButton";
    pub const JWST_BUTTON: &str = "@jwstButton";
    pub const SLIDER: &str = "@slider";
    pub const CREDITS: &str = "@credits";
    pub const CREDIT_ICON: &str = "@creditIcon";

    pub const CLOSE_BUTTON: &str = "@closeButton";
    pub const VIDEO: &str = "@video";
    pub const CLOSE_ICON: &str = "@closeIcon";

    pub const INFO_TAB_HEADER: &str = "@infoTabHeader";
    pub const WWT_TAB_HEADER: &str = "@wwtTabHeader";
    pub const INFO_TEXT: &str = "@infoText";
    pub const WWT_TEXT: &str = "@wwtText";
    pub const TAB_HEADER: &str = "@tabHeader";
}

pub mod section {
    pub const TOP_CONTENT: &str = "topContent";
    pub const BOTTOM_CONTENT: &str = "bottomContent";
    pub const USER_EXPERIENCE: &str = "userExperience";
    pub const VIDEO_DIALOG: &str = "videoDialog";
    pub const INFO_SHEET: &str = "infoSheet";
}

pub mod property {
    pub const TITLE: &str = "title";
    pub const CREDIT_ICON_COUNT: &str = "creditIconCount";
    pub const TAB_COUNT: &str = "tabCount";
}

pub const PAGE_NAME: &str = "Carina";

/// Share of the viewport height the main content takes while the info sheet is open.
pub const MAIN_CONTENT_HEIGHT_RATIO: f64 = 0.66;

pub fn page_definition(url: &str) -> Result<PageDef, DefinitionError> {
    let top_content = SectionDef::builder(section::TOP_CONTENT, Locator::css("#top-content"))
        .alias(alias::VIDEO_ICON, "#video-icon")
        .alias(alias::SHOW_HIDE_BUTTON, "#show-hide-button")
        .alias(alias::RESET_ICON, "#reset-icon")
        .alias(alias::TEXT_ICON, "#text-icon")
        .build()?;

    let bottom_content = SectionDef::builder(section::BOTTOM_CONTENT, Locator::css("#bottom-content"))
        .alias(alias::TOOLS, "#tools")
        .alias(alias::HUBBLE_BUTTON, "#hubble-button")
        .alias(alias::JWST_BUTTON, "#jwst-button")
        .alias(alias::SLIDER, "#opacity-slider")
        .alias(alias::CREDITS, "#credits")
        .alias(alias::CREDIT_ICON, ".credit-icon")
        .property(property::CREDIT_ICON_COUNT, 3)
        .build()?;

    let user_experience = SectionDef::builder(section::USER_EXPERIENCE, Locator::css("#user-experience"))
        .alias(alias::CLOSE_BUTTON, ".close-button")
        .build()?;

    let video_dialog = SectionDef::builder(section::VIDEO_DIALOG, Locator::css("#video-dialog"))
        .alias(alias::VIDEO, "video")
        .alias(alias::CLOSE_ICON, ".close-icon")
        .build()?;

    let info_sheet = SectionDef::builder(section::INFO_SHEET, Locator::css("#info-sheet"))
        .alias(alias::CLOSE_ICON, ".close-icon")
        .alias(alias::INFO_TAB_HEADER, "#info-tab-header")
        .alias(alias::WWT_TAB_HEADER, "#wwt-tab-header")
        .alias(alias::INFO_TEXT, "#info-text")
        .alias(alias::WWT_TEXT, "#wwt-text")
        .alias(alias::TAB_HEADER, ".tab-header")
        .property(property::TAB_COUNT, 2)
        .build()?;

    PageDef::builder(PAGE_NAME, url)
        .alias(alias::APP, "#app")
        .alias(alias::SPLASH_SCREEN, "#splash-screen")
        .alias(alias::SPLASH_CLOSE, "#splash-close")
        .alias(alias::VIDEO_DIALOG, "#video-dialog")
        .alias(alias::INFO_SHEET, "#info-sheet")
        .alias(alias::USER_EXPERIENCE, "#user-experience")
        .alias(alias::MAIN_CONTENT, "#main-content")
        .section(top_content)
        .section(bottom_content)
        .section(user_experience)
        .section(video_dialog)
        .section(info_sheet)
        .property(property::TITLE, "Carina Nebula")
        .ready_when_visible(alias::APP)
        .build()
}

/// With the info sheet open, the main content keeps the full width and about
/// two thirds of the viewport height.
pub fn check_main_content_layout(viewport: Size, main: Size) -> Result<(), HarnessError> {
    let expected_height = MAIN_CONTENT_HEIGHT_RATIO * viewport.height;
    if (main.height - expected_height).round().abs() >= 2.0 {
        return Err(HarnessError::mismatch(
            "main content height",
            format!("to be about {:.0}px", expected_height),
            format!("it was {:.0}px", main.height),
        ));
    }
    if viewport.width.round() != main.width.round() {
        return Err(HarnessError::mismatch(
            "main content width",
            format!("to equal the viewport width {:.0}px", viewport.width),
            format!("it was {:.0}px", main.width),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builds() {
        let def = page_definition("http://localhost:8080").unwrap();
        assert_eq!(def.name(), PAGE_NAME);
        assert_eq!(def.ready_target(), alias::APP);
        assert_eq!(def.root().children().count(), 5);
        assert_eq!(
            def.root()
                .child(section::BOTTOM_CONTENT)
                .unwrap()
                .properties()
                .get_u64(property::CREDIT_ICON_COUNT),
            Some(3)
        );
        assert!(def.root().child(section::INFO_SHEET).unwrap().aliases().contains(alias::CLOSE_ICON));
        assert!(!def.root().aliases().contains(alias::CLOSE_ICON));
    }

    #[test]
    fn test_layout_within_tolerance() {
        let viewport = Size::new(1280.0, 720.0);
        check_main_content_layout(viewport, Size::new(1280.0, 475.2)).unwrap();
        check_main_content_layout(viewport, Size::new(1280.0, 476.0)).unwrap();
        assert!(check_main_content_layout(viewport, Size::new(1280.0, 720.0)).is_err());
        assert!(check_main_content_layout(viewport, Size::new(1280.0, 400.0)).is_err());
        assert!(check_main_content_layout(viewport, Size::new(1000.0, 475.2)).is_err());
    }
}
