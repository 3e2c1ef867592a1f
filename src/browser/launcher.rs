use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Pick the Chrome/Chromium binary: the explicit path if given, otherwise the
/// first well-known install location or PATH entry that exists.
pub fn resolve_chrome_binary(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        bail!("Chrome binary {} does not exist", path.display());
    }

    let candidates = chrome_candidates();
    for candidate in &candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            tracing::info!("Found Chrome at: {}", path.display());
            return Ok(path);
        }
    }

    for name in &[
        "google-chrome",
        "google-chrome-stable",
        "chromium-browser",
        "chromium",
    ] {
        if let Ok(path) = which::which(name) {
            tracing::info!("Found Chrome in PATH: {}", path.display());
            return Ok(path);
        }
    }

    bail!(
        "Could not find Chrome or Chromium (pass --chrome). Searched:\n{}",
        candidates.join("\n")
    )
}

fn chrome_candidates() -> Vec<String> {
    let mut candidates = Vec::new();

    #[cfg(target_os = "macos")]
    {
        candidates.extend([
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome".into(),
            "/Applications/Chromium.app/Contents/MacOS/Chromium".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            candidates.push(format!(
                "{}/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                home
            ));
        }
    }

    #[cfg(target_os = "linux")]
    {
        candidates.extend([
            "/usr/bin/google-chrome".into(),
            "/usr/bin/google-chrome-stable".into(),
            "/usr/bin/chromium-browser".into(),
            "/usr/bin/chromium".into(),
            "/snap/bin/chromium".into(),
        ]);
    }

    #[cfg(target_os = "windows")]
    {
        for var in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
            if let Ok(dir) = std::env::var(var) {
                candidates.push(format!("{}\\Google\\Chrome\\Application\\chrome.exe", dir));
            }
        }
    }

    candidates
}

/// Flags that keep a test browser quiet and deterministic.
pub fn chrome_args() -> Vec<&'static str> {
    vec![
        "--no-first-run",
        "--no-default-browser-check",
        "--disable-background-networking",
        "--disable-client-side-phishing-detection",
        "--disable-default-apps",
        "--disable-extensions",
        "--disable-hang-monitor",
        "--disable-popup-blocking",
        "--disable-prompt-on-repost",
        "--disable-sync",
        "--disable-translate",
        "--metrics-recording-only",
        "--no-sandbox",
        "--safebrowsing-disable-auto-update",
        "--autoplay-policy=no-user-gesture-required",
        "--hide-scrollbars",
        "--mute-audio",
    ]
}
