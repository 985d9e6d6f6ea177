//! Explain the cascade for one element of a live page.

use cascade_inspect::{ChromeConfig, inspect_once, parse_args};
use css_inspector::InspectorConfig;
use env_logger::{Builder, Env};
use log::error;
use std::env;
use std::io::{Write as _, stdout};
use std::process::exit;
use tokio::runtime::Runtime;

fn main() {
    let _log_init: Result<(), _> = Builder::from_env(Env::default().filter_or("RUST_LOG", "warn"))
        .is_test(false)
        .try_init();

    let request = match parse_args(env::args().skip(1)) {
        Ok(request) => request,
        Err(err) => {
            error!("{err}");
            exit(1);
        }
    };
    let Ok(runtime) = Runtime::new() else {
        error!("failed to start the async runtime");
        exit(1);
    };

    let outcome = runtime.block_on(inspect_once(
        &request,
        &ChromeConfig::from_env(),
        InspectorConfig::from_env(),
    ));
    let analysis = match outcome {
        Ok(analysis) => analysis,
        Err(err) => {
            error!("error: {err:#}");
            exit(1);
        }
    };
    let rendered = match serde_json::to_string_pretty(&analysis) {
        Ok(rendered) => rendered,
        Err(err) => {
            error!("error: {err}");
            exit(1);
        }
    };
    let mut out = stdout().lock();
    if let Err(err) = writeln!(out, "{rendered}") {
        error!("error: {err}");
        exit(1);
    }
}
