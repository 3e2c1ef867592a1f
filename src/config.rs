use std::path::PathBuf;
use std::time::Duration;

/// Upper bound for implicit waits (clicks, readiness) unless overridden per session.
pub const DEFAULT_CONDITION_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_APP_URL: &str = "http://localhost:8080";

/// Timing knobs shared by every bounded wait in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    pub condition_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            condition_timeout: DEFAULT_CONDITION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitSettings {
    pub fn with_condition_timeout(mut self, timeout: Duration) -> Self {
        self.condition_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Everything needed to begin a browser session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub app_url: String,
    pub headless: bool,
    /// Explicit Chrome binary; discovered from well-known paths when unset.
    pub chrome_path: Option<PathBuf>,
    pub window_size: (u32, u32),
    pub waits: WaitSettings,
    /// Where snapshots are written; snapshots are skipped when unset.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_url: DEFAULT_APP_URL.to_string(),
            headless: true,
            chrome_path: None,
            window_size: (1280, 720),
            waits: WaitSettings::default(),
            snapshot_dir: None,
        }
    }
}

impl SessionConfig {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into(),
            ..Self::default()
        }
    }

    pub fn with_condition_timeout(mut self, timeout: Duration) -> Self {
        self.waits.condition_timeout = timeout;
        self
    }
}
