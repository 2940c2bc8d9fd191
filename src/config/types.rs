//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_REQUEST_TIMEOUT_SECS, DKIM_PROBE_CONCURRENCY, DNS_ATTEMPTS, DNS_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Audit configuration.
///
/// Parsed from the command line by the binary, or built programmatically with
/// `..Default::default()`.
///
/// # Examples
///
/// ```no_run
/// use email_posture::Config;
///
/// let config = Config {
///     domain: "example.com".to_string(),
///     aggressive_dkim: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "email_posture",
    version,
    about = "Email authentication (SPF/DKIM/DMARC) posture checker"
)]
pub struct Config {
    /// Domain to check (e.g. example.com)
    pub domain: String,

    /// Check only this DKIM selector instead of guessing
    #[arg(long)]
    pub selector: Option<String>,

    /// Try the larger DKIM selector list (slower)
    #[arg(long)]
    pub aggressive_dkim: bool,

    /// Extra DKIM selectors, one per line
    #[arg(long)]
    pub selector_file: Option<PathBuf>,

    /// Write the JSON report to this file
    #[arg(long)]
    pub json_out: Option<PathBuf>,

    /// Only print JSON
    #[arg(long)]
    pub quiet: bool,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain or json
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Per-query DNS timeout in seconds
    #[arg(long, default_value_t = DNS_TIMEOUT_SECS)]
    pub dns_timeout_secs: u64,

    /// Attempts per DNS query
    #[arg(long, default_value_t = DNS_ATTEMPTS)]
    pub dns_attempts: usize,

    /// Overall time budget for the report in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Maximum DKIM selector probes in flight
    #[arg(long, default_value_t = DKIM_PROBE_CONCURRENCY)]
    pub dkim_concurrency: usize,
}

impl Config {
    /// Overall report deadline as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Per-query DNS timeout as a `Duration`.
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: String::new(),
            selector: None,
            aggressive_dkim: false,
            selector_file: None,
            json_out: None,
            quiet: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            dns_timeout_secs: DNS_TIMEOUT_SECS,
            dns_attempts: DNS_ATTEMPTS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            dkim_concurrency: DKIM_PROBE_CONCURRENCY,
        }
    }
}
