use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "info";

fn env_filter(filter: Option<&str>) -> Result<EnvFilter> {
    let directive: Directive = filter
        .unwrap_or(DEFAULT_DIRECTIVE)
        .parse()
        .with_context(|| format!("invalid log directive {:?}", filter.unwrap_or_default()))?;
    Ok(EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy())
}

/// Logs to stderr; used by the one-shot commands.
pub fn init_stderr(filter: Option<&str>) -> Result<()> {
    let env_filter = env_filter(filter)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}

/// Appends to `path`; the terminal belongs to the TUI while it runs.
pub fn init_file(path: &Path, filter: Option<&str>) -> Result<()> {
    let env_filter = env_filter(filter)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file at {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}
