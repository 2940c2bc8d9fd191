//! Error handling and diagnostics.
//!
//! This module provides:
//! - Transport errors returned by the DNS gateway
//! - Parse errors produced by the record tokenizer
//! - Diagnostic codes and the report-level diagnostic type
//! - Initialization and fatal report errors
//!
//! Diagnostics are categorized into:
//! - **Dns**: a query failed (NXDOMAIN, SERVFAIL, timeout, ...)
//! - **Parse**: malformed record syntax, kept and reported
//! - **Policy**: well-formed data that violates a protocol rule

mod dedup;
mod types;

// Re-export public API
pub use dedup::merge_diagnostics;
pub use types::{
    Diagnostic, DiagnosticCategory, DiagnosticCode, DnsError, InitializationError, ParseError,
    ReportError,
};
