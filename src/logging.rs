// src/logging.rs

//! Diagnostics for the orchestrator itself.
//!
//! Level: `--log-level`, then `DEVRUN_LOG`, then `info`. Events go to stderr
//! and never carry the children's output, which stays on the inherited
//! terminal streams.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("DEVRUN_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names_case_insensitively() {
        assert_eq!(parse_level_str(" Debug "), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level_str("warning"), Some(tracing::Level::WARN));
        assert_eq!(parse_level_str("loud"), None);
    }
}
