//! `archiver` CLI: fetch a URL, migrate it into a self-contained document
//! tree, and package the result as a `.maff` file.
//!
//! Grounded in the teacher's `valor` binary for the
//! `env_logger::init`/`log::{error, info}`/top-level `anyhow::Result`
//! shape, adapted from an event-loop application into a one-shot
//! pipeline driven by an explicit `tokio::runtime::Runtime` and
//! `block_on`: parse config, build network collaborators, migrate one
//! tab, write it into a `.maff` archive.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use archive_core::{ArchiveConfig, Mode};
use archive_maff::{format_archive_time, TabDir};
use archive_migrate::TabInput;
use archive_net::{BrowserPool, HttpClient};
use clap::Parser;
use log::{error, info};
use url::Url;

/// Archive a web page as a Mozilla Archive Format (`.maff`) file.
#[derive(Parser, Debug)]
#[command(name = "archiver", version, about)]
struct Cli {
    /// URL of the page to archive.
    #[arg(short = 'u', long = "url")]
    url: String,

    /// Output archive basename; `.maff` is appended.
    #[arg(short = 'o', long = "output")]
    output: String,

    /// Render the page through a headless browser before archiving, so
    /// scripted content is captured and a screenshot is taken.
    #[arg(short = 'j', long = "js-execution")]
    js_execution: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(archive_path) => {
            info!("wrote {}", archive_path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("archive failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<std::path::PathBuf> {
    let config = ArchiveConfig::new(cli.url.clone(), cli.output.clone(), cli.js_execution);
    let url = Url::parse(&config.url).with_context(|| format!("invalid url: {}", config.url))?;

    let http = Arc::new(HttpClient::new(config.connect_timeout, config.read_timeout).context("building http client")?);

    let (browser, browser_handle) = if matches!(config.mode, Mode::JsExecution) {
        let (pool, handle) = BrowserPool::launch(config.pool_size, config.page_load_timeout)
            .await
            .context("launching headless browser")?;
        (Some(Arc::new(pool)), Some(handle))
    } else {
        (None, None)
    };

    let tab = TabDir::create().context("creating tab staging directory")?;
    let input = TabInput {
        url,
        resource_dir: tab.resource_dir(),
        mode: config.mode,
        recursion_limit: config.recursion_limit,
    };

    let (envelope, metadata) = archive_migrate::migrate_tab(input, http, browser)
        .await
        .context("migrating root document")?;

    if let Some(handle) = browser_handle {
        handle.abort();
    }

    let title = metadata.title.unwrap_or_else(|| cli.url.clone());
    let archive_time = format_archive_time(&chrono::Local::now());
    archive_maff::write_tab(&tab, &envelope, &title, &archive_time).context("writing tab contents")?;

    archive_maff::finish(std::path::Path::new(&cli.output), vec![tab]).context("writing .maff archive")
}
