//! Headless Chrome launch and configuration.

use anyhow::{Result, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt as _;
use log::{debug, warn};
use std::env;
use std::path::PathBuf;
use std::process::Command;
use tokio::spawn;
use tokio::task::JoinHandle;

/// Browser launch settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChromeConfig {
    /// Explicit Chrome binary; discovered on `PATH` when unset
    pub executable: Option<PathBuf>,
    /// Viewport width in CSS pixels
    pub window_width: u32,
    /// Viewport height in CSS pixels
    pub window_height: u32,
    /// Extra command line switches passed to Chrome
    pub extra_args: Vec<String>,
    /// Upper bound on page navigation, in milliseconds
    pub navigation_timeout_ms: u64,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            executable: None,
            window_width: 1280,
            window_height: 800,
            extra_args: Vec::new(),
            navigation_timeout_ms: 30_000,
        }
    }
}

impl ChromeConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `CHROME_BIN`: Chrome executable
    /// - `CASCADE_WINDOW_SIZE`: viewport as `WIDTHxHEIGHT` (default: 1280x800)
    /// - `CASCADE_CHROME_ARGS`: whitespace separated extra switches
    /// - `CASCADE_NAVIGATION_TIMEOUT_MS`: navigation bound (default: 30000)
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let executable = env::var("CHROME_BIN")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from);
        let (window_width, window_height) = env::var("CASCADE_WINDOW_SIZE")
            .ok()
            .and_then(|val| parse_window_size(&val))
            .unwrap_or((defaults.window_width, defaults.window_height));
        let extra_args = env::var("CASCADE_CHROME_ARGS")
            .map(|val| val.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();
        let navigation_timeout_ms = env::var("CASCADE_NAVIGATION_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(defaults.navigation_timeout_ms);
        Self {
            executable,
            window_width,
            window_height,
            extra_args,
            navigation_timeout_ms,
        }
    }
}

/// Parse `WIDTHxHEIGHT`.
fn parse_window_size(value: &str) -> Option<(u32, u32)> {
    let (width, height) = value.trim().split_once(['x', 'X'])?;
    let width = width.trim().parse().ok()?;
    let height = height.trim().parse().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

/// Finds the Chrome executable on the system.
///
/// # Errors
///
/// Returns an error if Chrome cannot be found.
pub fn find_chrome_executable(config: &ChromeConfig) -> Result<PathBuf> {
    if let Some(path) = &config.executable {
        if path.exists() {
            return Ok(path.clone());
        }
        warn!("[CHROME] configured executable {} does not exist", path.display());
    }

    for candidate in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(output) = Command::new(candidate).arg("--version").output() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Snap stubs print no version and mention snap on stderr.
            if (stdout.contains("Chrome") || stdout.contains("Chromium")) && !stderr.contains("snap")
            {
                return Ok(PathBuf::from(candidate));
            }
        }
    }

    Err(anyhow!(
        "Chrome/Chromium executable not found. Please install Chrome or set CHROME_BIN environment variable."
    ))
}

/// Browser instance with its background event handler.
pub struct ChromeSession {
    pub browser: Browser,
    pub handler: JoinHandle<()>,
}

/// Launch headless Chrome and spawn its CDP event loop.
///
/// # Errors
///
/// Returns an error if no executable is found or the browser fails to start.
pub async fn launch_browser(config: &ChromeConfig) -> Result<ChromeSession> {
    let executable = find_chrome_executable(config)?;
    debug!("[CHROME] launching {}", executable.display());

    let browser_config = BrowserConfig::builder()
        .chrome_executable(executable)
        .no_sandbox()
        .window_size(config.window_width, config.window_height)
        .arg("--hide-scrollbars")
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .args(config.extra_args.iter().map(String::as_str))
        .build()
        .map_err(|err| anyhow!("Browser config error: {err}"))?;

    let (browser, mut handler) = Browser::launch(browser_config).await?;
    let handler_task = spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(err) = event {
                debug!("[CHROME] browser event error: {err:?}");
            }
        }
    });

    Ok(ChromeSession {
        browser,
        handler: handler_task,
    })
}
