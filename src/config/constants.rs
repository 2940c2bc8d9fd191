//! Configuration constants.
//!
//! This module defines the protocol limits, network timeouts and built-in
//! DKIM selector lists used throughout the application.

/// Maximum number of DNS-querying SPF terms a single evaluation may use
/// (RFC 7208 section 4.6.4).
pub const SPF_DNS_LOOKUP_LIMIT: u32 = 10;

// Network operation timeouts
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 5;
/// Attempts per DNS query before the resolver gives up
pub const DNS_ATTEMPTS: usize = 2;
/// Overall budget for one report, after which in-flight queries are dropped
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum DKIM selector probes in flight at once.
///
/// Fixed regardless of how long the candidate list is, so aggressive discovery
/// takes longer instead of hitting the name server harder.
pub const DKIM_PROBE_CONCURRENCY: usize = 8;

// DMARC tag defaults (RFC 7489 section 6.3)
/// `pct=` when absent
pub const DEFAULT_DMARC_PERCENTAGE: u8 = 100;
/// `ri=` when absent, in seconds
pub const DEFAULT_DMARC_REPORT_INTERVAL: u32 = 86_400;
/// `fo=` when absent
pub const DEFAULT_DMARC_FAILURE_OPTIONS: &str = "0";
/// `rf=` when absent
pub const DEFAULT_DMARC_REPORT_FORMAT: &str = "afrf";

/// Report URI schemes DMARC receivers are expected to understand.
pub const RECOGNIZED_REPORT_URI_SCHEMES: &[&str] = &["mailto", "https"];

/// Selectors tried when no selector is given.
pub const DEFAULT_DKIM_SELECTORS: &[&str] = &[
    "default", "selector1", "s1", "google", "google1", "mail", "smtp", "dkim", "mx", "selector",
    "k1", "k2", "mta",
];

/// Selectors tried in aggressive mode (a superset of the defaults).
pub const AGGRESSIVE_DKIM_SELECTORS: &[&str] = &[
    "default", "selector", "selector1", "selector2", "s", "s1", "s2", "sel", "mail", "smtp",
    "mx", "dkim", "k", "key", "google", "google1", "google2", "mta", "amazonses", "k1", "k2",
    "k3", "201608", "2019", "2020", "2021", "2022", "mail1", "mail2", "smtp1", "sendgrid",
    "mailgun", "mandrill", "zoho", "outlook", "office", "o365", "microsoft", "sparkpost",
    "postfix", "postmark", "mailchimp", "ses", "sendinblue", "elasticemail", "yandex",
    "icloud", "protonmail", "fastmail", "gws", "gapp", "domainkey", "email", "hosted",
    "secure", "info", "securemail",
];
