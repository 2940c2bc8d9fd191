//! Logger setup for the checker.
//!
//! Log lines always go to stderr: stdout carries the report itself, and with
//! `--quiet` it must stay pure JSON.

use std::io::Write;

use colored::*;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Resolver internals that are chatty about retried UDP answers.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("hickory_proto", LevelFilter::Error),
    ("hickory_resolver", LevelFilter::Warn),
];

/// Installs the global logger.
///
/// `RUST_LOG` is honoured for per-module tuning, but `level` wins for the
/// crate itself and as the default. Calling this twice returns
/// `InitializationError::LoggerError`.
///
/// ```bash
/// RUST_LOG=email_posture::spf=trace email_posture example.com --log-level warn
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(format == LogFormat::Plain);
    build_logger(level, format)
        .try_init()
        .map_err(InitializationError::from)
}

fn build_logger(level: LevelFilter, format: LogFormat) -> Builder {
    let mut builder = Builder::from_default_env();
    builder.target(Target::Stderr);
    builder.filter_level(level);
    for (module, cap) in QUIET_MODULES {
        builder.filter_module(module, (*cap).min(level));
    }
    builder.filter_module("email_posture", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                let line = serde_json::json!({
                    "ts": chrono::Utc::now().to_rfc3339(),
                    "level": record.level().as_str(),
                    "target": record.target(),
                    "msg": record.args().to_string(),
                });
                writeln!(buf, "{line}")
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let tag = match record.level() {
                    Level::Error => "ERROR".red().bold(),
                    Level::Warn => "WARN ".yellow(),
                    Level::Info => "INFO ".green(),
                    Level::Debug => "DEBUG".blue(),
                    Level::Trace => "TRACE".purple(),
                };
                // email_posture::spf::resolver -> spf::resolver
                let target = record
                    .target()
                    .strip_prefix("email_posture::")
                    .unwrap_or(record.target());
                writeln!(buf, "{tag} {} {}", target.dimmed(), record.args())
            });
        }
    }
    builder
}
