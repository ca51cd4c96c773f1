//! Runtime configuration for the archiver.
//!
//! Mirrors the split between CLI flags and environment overrides used by
//! the teacher's `page_handler::config::ValorConfig`: a handful of knobs
//! that govern recursion depth, pool size, and network timeouts, loadable
//! either from explicit values or from the environment.

use core::time::Duration;
use std::env;

/// Which flavor of document migration the archive operation should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Scripts and iframes are downloaded but never executed.
    NoJsExecution,
    /// The root (and iframes) are fetched through a headless browser.
    JsExecution,
}

/// Top-level configuration for one archive run.
#[derive(Clone, Debug)]
pub struct ArchiveConfig {
    /// Root URL to archive.
    pub url: String,
    /// Output archive basename (without the `.maff` suffix).
    pub output: String,
    /// Migration mode.
    pub mode: Mode,
    /// Per-entity recursion limit for CSS `@import` / HTML `<iframe>` chains.
    pub recursion_limit: u32,
    /// Maximum concurrent headless-browser sessions.
    pub pool_size: usize,
    /// TCP connect timeout for the HTTP client.
    pub connect_timeout: Duration,
    /// Read timeout for the HTTP client.
    pub read_timeout: Duration,
    /// Per-page-load timeout for the browser pool.
    pub page_load_timeout: Duration,
}

impl ArchiveConfig {
    /// Build a config from explicit CLI-derived values, filling unset knobs
    /// from the environment the way `ValorConfig::from_env` does.
    #[inline]
    #[must_use]
    pub fn new(url: String, output: String, js_execution: bool) -> Self {
        Self {
            url,
            output,
            mode: if js_execution {
                Mode::JsExecution
            } else {
                Mode::NoJsExecution
            },
            recursion_limit: env_u32("ARCHIVE_RECURSION_LIMIT", 3),
            pool_size: env_u32("ARCHIVE_POOL_SIZE", 10) as usize,
            connect_timeout: Duration::from_millis(u64::from(env_u32(
                "ARCHIVE_CONNECT_TIMEOUT_MS",
                10_000,
            ))),
            read_timeout: Duration::from_millis(u64::from(env_u32(
                "ARCHIVE_READ_TIMEOUT_MS",
                30_000,
            ))),
            page_load_timeout: Duration::from_millis(u64::from(env_u32(
                "ARCHIVE_PAGE_LOAD_TIMEOUT_MS",
                30_000,
            ))),
        }
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|val| val.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let config = ArchiveConfig::new("http://example.test".into(), "out".into(), false);
        assert_eq!(config.recursion_limit, 3);
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.mode, Mode::NoJsExecution);
    }

    #[test]
    fn js_execution_flag_selects_mode() {
        let config = ArchiveConfig::new("http://example.test".into(), "out".into(), true);
        assert_eq!(config.mode, Mode::JsExecution);
    }
}
