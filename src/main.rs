use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use carina_e2e::browser::BrowserSession;
use carina_e2e::config::{SessionConfig, DEFAULT_APP_URL};
use carina_e2e::page_object::Page;
use carina_e2e::scenario::{ScenarioContext, SuiteReport};
use carina_e2e::snapshot::{DirectorySnapshotter, DisabledSnapshotter, Snapshotter};
use carina_e2e::{carina, scenario::Suite};

/// carina-e2e: end-to-end checks for the Carina web experience
#[derive(Parser)]
#[command(name = "carina-e2e", version, about)]
struct Cli {
    /// URL the app is served from
    #[arg(long, default_value = DEFAULT_APP_URL)]
    url: String,

    /// Run Chrome with a visible window (default: headless)
    #[arg(long)]
    headed: bool,

    /// Chrome or Chromium binary (default: discovered)
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Upper bound for implicit waits, in milliseconds
    #[arg(long, default_value_t = 30_000)]
    condition_timeout_ms: u64,

    /// Write snapshots and a manifest into this directory
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Run only these scenarios (repeatable)
    #[arg(long = "scenario")]
    scenarios: Vec<String>,

    /// Write the suite report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// List scenarios and exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new(self.url.clone())
            .with_condition_timeout(Duration::from_millis(self.condition_timeout_ms));
        config.headless = !self.headed;
        config.chrome_path = self.chrome.clone();
        config.snapshot_dir = self.snapshot_dir.clone();
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr only; stdout carries the summary
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let suite = carina::suite().select(&cli.scenarios)?;

    if cli.list {
        for scenario in suite.scenarios() {
            println!("{}", scenario.name);
        }
        return Ok(());
    }

    let config = cli.session_config();
    let report = run(&suite, &config).await?;

    print!("{}", report.summary());
    if let Some(path) = &cli.report {
        report.write_json(path).await?;
        tracing::info!("Report written to {}", path.display());
    }

    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(suite: &Suite, config: &SessionConfig) -> anyhow::Result<SuiteReport> {
    let definition =
        carina::page_definition(&config.app_url).context("Invalid Carina page definition")?;
    let snapshotter: Arc<dyn Snapshotter> = match &config.snapshot_dir {
        Some(dir) => Arc::new(DirectorySnapshotter::create(dir).await?),
        None => Arc::new(DisabledSnapshotter),
    };

    tracing::info!("Starting {} against {} (headless: {})", suite.name(), config.app_url, config.headless);
    let session = BrowserSession::begin(config).await?;
    let page = Page::new(definition, session.driver(), config.waits);
    let ctx = ScenarioContext::new(page, snapshotter);

    // Always end the browser, whether the suite finished or was interrupted
    let report = tokio::select! {
        report = suite.run(&ctx) => Some(report),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received interrupt signal, shutting down");
            None
        }
    };

    drop(ctx);
    if let Err(e) = session.end().await {
        tracing::warn!("Failed to end browser session: {:#}", e);
    }

    report.context("Interrupted before the suite finished")
}
