//! Runs the Carina suite in a real Chrome against `fixtures/carina.html`.
//!
//! Ignored by default: `cargo test -- --ignored` with Chrome installed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use carina_e2e::browser::BrowserSession;
use carina_e2e::carina::{self, alias, section};
use carina_e2e::config::SessionConfig;
use carina_e2e::page_object::Page;
use carina_e2e::scenario::ScenarioContext;
use carina_e2e::snapshot::DirectorySnapshotter;

fn fixture_url(name: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = PathBuf::from(manifest_dir).join("fixtures").join(name);
    format!("file://{}", path.display())
}

fn config() -> SessionConfig {
    SessionConfig::new(fixture_url("carina.html")).with_condition_timeout(Duration::from_millis(5_000))
}

#[tokio::test]
#[ignore = "needs a local Chrome"]
async fn test_suite_against_fixture() {
    let config = config();
    let tmp = tempfile::tempdir().unwrap();
    let snapshots = Arc::new(DirectorySnapshotter::create(tmp.path()).await.unwrap());

    let session = BrowserSession::begin(&config).await.unwrap();
    let page = Page::new(
        carina::page_definition(&config.app_url).unwrap(),
        session.driver(),
        config.waits,
    );
    let ctx = ScenarioContext::new(page, snapshots.clone());

    let report = carina::suite().run(&ctx).await;
    drop(ctx);
    session.end().await.unwrap();

    assert!(report.all_passed(), "{}", report.summary());
    let records = snapshots.records().await;
    assert_eq!(records.len(), 7);
    assert!(records.iter().all(|record| record.bytes > 0));
    assert!(tmp.path().join("manifest.json").exists());
}

#[tokio::test]
#[ignore = "needs a local Chrome"]
async fn test_slider_value_and_scoped_close_icon() {
    let config = config();
    let session = BrowserSession::begin(&config).await.unwrap();
    let page = Page::new(
        carina::page_definition(&config.app_url).unwrap(),
        session.driver(),
        config.waits,
    );

    page.navigate().await.unwrap().wait_for_ready().await.unwrap();
    page.click(alias::SPLASH_CLOSE).await.unwrap();

    let bottom = page.section(section::BOTTOM_CONTENT).unwrap();
    bottom.expect_element(alias::SLIDER).value().to_equal("50").await.unwrap();
    bottom.click(alias::JWST_BUTTON).await.unwrap();
    bottom.expect_element(alias::SLIDER).value().to_equal("100").await.unwrap();

    page.section(section::TOP_CONTENT).unwrap().click(alias::VIDEO_ICON).await.unwrap();
    let dialog = page.section(section::VIDEO_DIALOG).unwrap();
    dialog.expect_element(alias::CLOSE_ICON).within(config.waits.condition_timeout).to_be_visible().await.unwrap();
    page.section(section::INFO_SHEET)
        .unwrap()
        .expect_element(alias::CLOSE_ICON)
        .to_not_be_present()
        .await
        .unwrap();

    drop(page);
    session.end().await.unwrap();
}
