use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use super::launcher::{chrome_args, resolve_chrome_binary};
use crate::config::SessionConfig;
use crate::driver::chromium::ChromiumDriver;
use crate::driver::Driver;

/// One Chrome process with a single tab, owned by the suite runner.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    driver: Arc<ChromiumDriver>,
    _profile: TempDir,
}

impl BrowserSession {
    /// Launch Chrome with a throw-away profile and open a blank tab.
    pub async fn begin(config: &SessionConfig) -> Result<Self> {
        let binary = resolve_chrome_binary(config.chrome_path.as_deref())?;
        let profile = tempfile::Builder::new()
            .prefix("carina-e2e-")
            .tempdir()
            .context("Failed to create Chrome profile directory")?;
        let (width, height) = config.window_size;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(binary)
            .user_data_dir(profile.path())
            .args(chrome_args())
            .window_size(width, height);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(|e| anyhow::anyhow!("{}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch Chrome")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e).context("Failed to create initial page");
            }
        };

        tracing::info!(
            "Browser session started (headless: {}, window: {}x{})",
            config.headless,
            width,
            height
        );

        Ok(Self {
            browser,
            handler_task,
            driver: Arc::new(ChromiumDriver::new(page)),
            _profile: profile,
        })
    }

    pub fn driver(&self) -> Arc<dyn Driver> {
        self.driver.clone()
    }

    /// Close the browser and wait for the process to exit.
    pub async fn end(mut self) -> Result<()> {
        let browser = &mut self.browser;
        let result = stop_handler(&self.handler_task, async move {
            browser.close().await.context("Failed to close Chrome")?;
            browser.wait().await.context("Chrome did not exit")?;
            Ok::<_, anyhow::Error>(())
        })
        .await;
        tracing::info!("Browser session ended");
        result
    }
}

/// Run `shutdown`, then abort the CDP handler whether or not it succeeded.
async fn stop_handler<F>(handler: &JoinHandle<()>, shutdown: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    let result = shutdown.await;
    handler.abort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handler_is_aborted_when_shutdown_fails() {
        let handler = tokio::spawn(futures::future::pending::<()>());

        let result = stop_handler(&handler, async {
            Err::<(), _>(anyhow::anyhow!("Chrome did not exit"))
        }).await;

        assert!(result.is_err());
        assert!(handler.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_handler_is_aborted_after_clean_shutdown() {
        let handler = tokio::spawn(futures::future::pending::<()>());
        assert!(stop_handler(&handler, async { Ok::<_, anyhow::Error>(()) }).await.is_ok());
        assert!(handler.await.unwrap_err().is_cancelled());
    }
}
