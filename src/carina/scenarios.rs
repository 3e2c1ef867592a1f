use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;

use super::{alias, check_main_content_layout, property, section, PAGE_NAME};
use crate::assertions::{expect_all_not_present, expect_all_visible};
use crate::error::HarnessError;
use crate::page_object::{PageState, Section};
use crate::scenario::{ScenarioContext, Suite};

/// How long the user-experience prompt may take to appear.
const USER_EXPERIENCE_TIMEOUT: Duration = Duration::from_millis(30_000);

pub const NAVIGATION_AND_LOADING: &str = "Navigation and loading";
pub const INITIAL_CONFIGURATION: &str = "Initial configuration";
pub const LAYER_BUTTONS: &str = "Layer buttons";
pub const OPEN_VIDEO: &str = "Open video";
pub const INFO_TEXT: &str = "Info text";

pub fn suite() -> Suite {
    Suite::new(PAGE_NAME)
        .before_each(ensure_ready)
        .scenario(NAVIGATION_AND_LOADING, navigation_and_loading)
        .scenario(INITIAL_CONFIGURATION, initial_configuration)
        .scenario(LAYER_BUTTONS, layer_buttons)
        .scenario(OPEN_VIDEO, open_video)
        .scenario(INFO_TEXT, info_text)
}

/// Load the app unless an earlier scenario already did.
fn ensure_ready(ctx: &ScenarioContext) -> BoxFuture<'_, Result<(), HarnessError>> {
    async move {
        let page = ctx.page();
        if page.state() == PageState::Ready {
            return Ok(());
        }
        ctx.step(format!("navigate to {}", page.definition().url()));
        page.navigate().await?;
        ctx.step("wait for ready");
        page.wait_for_ready().await?;
        Ok::<_, HarnessError>(())
    }
    .boxed()
}

async fn is_present(scope: &Section<'_>, token: &str) -> Result<bool, HarnessError> {
    Ok(!scope.elements(token).await?.is_empty())
}

/// Put the page back in the state a finished welcome flow leaves it in:
/// no splash, no prompt, no open dialog or sheet, layer controls shown.
/// Only acts on what an earlier, failed scenario left behind.
async fn restore_baseline(ctx: &ScenarioContext) -> Result<(), HarnessError> {
    let page = ctx.page();
    let settle = page.waits().condition_timeout;
    let root = page.root();

    if is_present(&root, alias::SPLASH_CLOSE).await? {
        ctx.step("dismiss leftover splash screen");
        page.click(alias::SPLASH_CLOSE).await?;
        root.wait_for_element_not_present(alias::SPLASH_SCREEN, settle)
            .await?;
        page.wait_for_element_visible(alias::USER_EXPERIENCE, USER_EXPERIENCE_TIMEOUT)
            .await?;
    }
    if is_present(&root, alias::USER_EXPERIENCE).await? {
        ctx.step("dismiss leftover user experience prompt");
        page.section(section::USER_EXPERIENCE)?
            .click(alias::CLOSE_BUTTON)
            .await?;
        root.wait_for_element_not_present(alias::USER_EXPERIENCE, settle)
            .await?;
    }
    if is_present(&root, alias::VIDEO_DIALOG).await? {
        ctx.step("close leftover video dialog");
        page.section(section::VIDEO_DIALOG)?
            .click(alias::CLOSE_ICON)
            .await?;
        root.wait_for_element_not_present(alias::VIDEO_DIALOG, settle)
            .await?;
    }
    if is_present(&root, alias::INFO_SHEET).await? {
        ctx.step("close leftover info sheet");
        page.section(section::INFO_SHEET)?
            .click(alias::CLOSE_ICON)
            .await?;
        root.wait_for_element_not_present(alias::INFO_SHEET, settle)
            .await?;
    }

    let bottom = page.section(section::BOTTOM_CONTENT)?;
    if !is_present(&bottom, alias::TOOLS).await? {
        ctx.step("show hidden layer controls");
        page.section(section::TOP_CONTENT)?
            .click(alias::SHOW_HIDE_BUTTON)
            .await?;
        bottom.wait_for_element_visible(alias::TOOLS, settle).await?;
    }
    Ok(())
}

fn navigation_and_loading(ctx: &ScenarioContext) -> BoxFuture<'_, Result<(), HarnessError>> {
    async move {
        ctx.step(format!("expect {} ready", PAGE_NAME));
        ctx.page().wait_for_ready().await?;
        Ok::<_, HarnessError>(())
    }
    .boxed()
}

fn initial_configuration(ctx: &ScenarioContext) -> BoxFuture<'_, Result<(), HarnessError>> {
    async move {
        let page = ctx.page();
        let settle = page.waits().condition_timeout;

        ctx.step("expect title");
        let title = page.root().property_str(property::TITLE)?;
        page.expect_title().to_equal(title).await?;

        ctx.step("expect splash screen");
        expect_all_visible(page, &[alias::SPLASH_SCREEN, alias::SPLASH_CLOSE]).await?;
        expect_all_not_present(page, &[alias::VIDEO_DIALOG, alias::INFO_SHEET]).await?;

        ctx.step(format!("click {}", alias::SPLASH_CLOSE));
        page.click(alias::SPLASH_CLOSE).await?;
        page.root()
            .wait_for_element_not_present(alias::SPLASH_SCREEN, settle)
            .await?;
        expect_all_not_present(page, &[alias::SPLASH_SCREEN, alias::SPLASH_CLOSE]).await?;

        ctx.step("expect top content");
        let top = page.section(section::TOP_CONTENT)?;
        expect_all_visible(
            &top,
            &[
                alias::VIDEO_ICON,
                alias::SHOW_HIDE_BUTTON,
                alias::RESET_ICON,
                alias::TEXT_ICON,
            ],
        )
        .await?;

        ctx.step("expect bottom content");
        let bottom = page.section(section::BOTTOM_CONTENT)?;
        expect_all_visible(
            &bottom,
            &[
                alias::TOOLS,
                alias::HUBBLE_BUTTON,
                alias::JWST_BUTTON,
                alias::SLIDER,
                alias::CREDITS,
            ],
        )
        .await?;

        ctx.step("expect credit icons");
        let credit_icons = bottom.property_count(property::CREDIT_ICON_COUNT)?;
        bottom
            .expect_elements(alias::CREDIT_ICON)
            .count()
            .to_equal(credit_icons)
            .await?;
        bottom
            .expect_elements(alias::CREDIT_ICON)
            .visible_count()
            .to_equal(credit_icons)
            .await?;

        ctx.step("dismiss user experience prompt");
        page.wait_for_element_visible(alias::USER_EXPERIENCE, USER_EXPERIENCE_TIMEOUT)
            .await?;
        page.section(section::USER_EXPERIENCE)?
            .click(alias::CLOSE_BUTTON)
            .await?;
        page.expect_element(alias::USER_EXPERIENCE)
            .within(settle)
            .to_not_be_present()
            .await?;

        ctx.snapshot("Initial").await;
        Ok::<_, HarnessError>(())
    }
    .boxed()
}

fn layer_buttons(ctx: &ScenarioContext) -> BoxFuture<'_, Result<(), HarnessError>> {
    async move {
        restore_baseline(ctx).await?;
        let page = ctx.page();
        let settle = page.waits().condition_timeout;
        let top = page.section(section::TOP_CONTENT)?;
        let bottom = page.section(section::BOTTOM_CONTENT)?;

        ctx.step(format!("click {}", alias::HUBBLE_BUTTON));
        bottom.click(alias::HUBBLE_BUTTON).await?;
        bottom.expect_element(alias::SLIDER).within(settle).value().to_equal("0").await?;

        ctx.step(format!("click {}", alias::JWST_BUTTON));
        bottom.click(alias::JWST_BUTTON).await?;
        bottom.expect_element(alias::SLIDER).within(settle).value().to_equal("100").await?;

        ctx.step("hide images");
        top.click(alias::SHOW_HIDE_BUTTON).await?;
        bottom.wait_for_element_not_present(alias::TOOLS, settle).await?;
        ctx.snapshot("Images hidden").await;

        ctx.step("expect controls removed");
        expect_all_not_present(
            &bottom,
            &[alias::TOOLS, alias::HUBBLE_BUTTON, alias::JWST_BUTTON, alias::SLIDER],
        )
        .await?;
        bottom.expect_element(alias::CREDITS).to_be_visible().await?;

        ctx.step("show images");
        top.click(alias::SHOW_HIDE_BUTTON).await?;
        bottom.wait_for_element_visible(alias::TOOLS, settle).await?;
        expect_all_visible(
            &bottom,
            &[
                alias::TOOLS,
                alias::HUBBLE_BUTTON,
                alias::JWST_BUTTON,
                alias::SLIDER,
                alias::CREDITS,
            ],
        )
        .await?;

        ctx.snapshot("Images shown").await;
        Ok::<_, HarnessError>(())
    }
    .boxed()
}

fn open_video(ctx: &ScenarioContext) -> BoxFuture<'_, Result<(), HarnessError>> {
    async move {
        restore_baseline(ctx).await?;
        let page = ctx.page();
        let settle = page.waits().condition_timeout;

        ctx.step(format!("click {}", alias::VIDEO_ICON));
        page.section(section::TOP_CONTENT)?.click(alias::VIDEO_ICON).await?;
        page.expect_element(alias::VIDEO_DIALOG)
            .within(settle)
            .to_be_visible()
            .await?;

        ctx.step("expect video dialog");
        let dialog = page.section(section::VIDEO_DIALOG)?;
        expect_all_visible(&dialog, &[alias::VIDEO, alias::CLOSE_ICON]).await?;

        ctx.snapshot("Video open").await;

        ctx.step("close video dialog");
        dialog.click(alias::CLOSE_ICON).await?;
        page.expect_element(alias::VIDEO_DIALOG)
            .within(settle)
            .to_not_be_present()
            .await?;
        Ok::<_, HarnessError>(())
    }
    .boxed()
}

fn info_text(ctx: &ScenarioContext) -> BoxFuture<'_, Result<(), HarnessError>> {
    async move {
        restore_baseline(ctx).await?;
        let page = ctx.page();
        let settle = page.waits().condition_timeout;

        ctx.step(format!("click {}", alias::TEXT_ICON));
        page.section(section::TOP_CONTENT)?.click(alias::TEXT_ICON).await?;
        page.expect_element(alias::INFO_SHEET)
            .within(settle)
            .to_be_visible()
            .await?;

        ctx.step("expect info sheet");
        let sheet = page.section(section::INFO_SHEET)?;
        expect_all_visible(
            &sheet,
            &[
                alias::CLOSE_ICON,
                alias::INFO_TAB_HEADER,
                alias::WWT_TAB_HEADER,
                alias::INFO_TEXT,
            ],
        )
        .await?;
        sheet.expect_element(alias::WWT_TEXT).to_not_be_present().await?;
        let tabs = sheet.property_count(property::TAB_COUNT)?;
        sheet.expect_elements(alias::TAB_HEADER).count().to_equal(tabs).await?;

        ctx.snapshot("Info sheet open").await;

        ctx.step("check main content layout");
        let viewport = page.element_size("html").await?;
        let main = page.element_size(alias::MAIN_CONTENT).await?;
        check_main_content_layout(viewport, main)?;

        ctx.step(format!("click {}", alias::WWT_TAB_HEADER));
        sheet.click(alias::WWT_TAB_HEADER).await?;
        sheet.expect_element(alias::INFO_TEXT).to_be_present().await?;
        sheet.expect_element(alias::INFO_TEXT)
            .within(settle)
            .to_not_be_visible()
            .await?;

        ctx.snapshot("Info sheet - WWT Tab").await;

        ctx.step(format!("click {}", alias::INFO_TAB_HEADER));
        sheet.click(alias::INFO_TAB_HEADER).await?;
        sheet.expect_element(alias::WWT_TEXT).within(settle).to_be_present().await?;
        sheet.expect_element(alias::WWT_TEXT)
            .within(settle)
            .to_not_be_visible()
            .await?;

        ctx.snapshot("Info sheet - Info Tab").await;
        Ok::<_, HarnessError>(())
    }
    .boxed()
}
