//! Chrome-backed cascade inspection.
//!
//! Wires [`css_inspector::CascadeInspector`] to a headless Chrome instance: a pool of pages
//! keyed by URL and a style backend built on the CSS protocol domain and in-page scripts.

mod chrome;
mod cli;
mod cssom;
mod pool;
mod scripts;

pub use chrome::{ChromeConfig, ChromeSession, find_chrome_executable, launch_browser};
pub use cli::{USAGE, parse_args};
pub use cssom::{ChromeNode, ChromeStyleInspector};
pub use pool::ChromePagePool;

use anyhow::Result;
use css_inspector::{AnalysisRequest, CascadeInspector, CssCascadeAnalysis, InspectorConfig};
use log::warn;

/// Inspector over Chrome.
pub type ChromeCascadeInspector = CascadeInspector<ChromePagePool, ChromeStyleInspector>;

/// Launch Chrome, analyze one request and shut the browser down.
///
/// # Errors
/// Returns an error if Chrome cannot be launched or the analysis fails.
pub async fn inspect_once(
    request: &AnalysisRequest,
    chrome: &ChromeConfig,
    config: InspectorConfig,
) -> Result<CssCascadeAnalysis> {
    let pool = ChromePagePool::launch(chrome).await?;
    let inspector = ChromeCascadeInspector::new(pool, ChromeStyleInspector, config);
    let outcome = inspector.analyze(request).await;
    if let Err(err) = inspector.provider().shutdown().await {
        warn!("[CHROME] shutdown failed: {err:#}");
    }
    Ok(outcome?)
}
