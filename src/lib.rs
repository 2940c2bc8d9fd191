//! email_posture library: SPF, DKIM and DMARC posture checks
//!
//! This library fetches a domain's email-authentication records through a
//! pluggable DNS gateway and turns them into structured, validated models:
//! - SPF policies expanded through `include:` and `redirect=` under the
//!   ten-lookup limit, with cycle detection
//! - DKIM keys found by probing likely selectors
//! - DMARC policies with RFC 7489 defaults applied
//!
//! Problems found along the way are reported as [`Diagnostic`]s on the
//! result instead of aborting it.
//!
//! # Example
//!
//! ```no_run
//! use email_posture::dns::ResolverGateway;
//! use email_posture::initialization::init_resolver;
//! use email_posture::{build_report, render_text, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = init_resolver(&Config::default())?;
//! let gateway = ResolverGateway::new(resolver);
//!
//! let report = build_report(&gateway, "example.com", false).await?;
//! println!("{}", render_text(&report));
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod dkim;
pub mod dmarc;
pub mod dns;
pub mod error_handling;
pub mod initialization;
pub mod record;
pub mod report;
pub mod spf;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use dkim::{discover_dkim, DkimSelectorResult, SelectorCatalog};
pub use dmarc::{parse_dmarc, DmarcLookup, DmarcPolicy, DmarcRecord};
pub use dns::{DnsGateway, MockGateway};
pub use error_handling::{Diagnostic, DiagnosticCode, DnsError, ParseError, ReportError};
pub use record::{RawRecord, RecordType};
pub use report::{
    assess, build_report, build_report_with, render_text, Assessment, DomainReport,
    ReportOptions,
};
pub use spf::{evaluate_spf, SpfEvaluation, SpfMechanism, SpfNode};
