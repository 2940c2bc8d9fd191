//! Report aggregation.

use std::time::Duration;

use chrono::Utc;
use log::{debug, info};
use tokio::time::Instant;

use super::assess::assess_parts;
use super::types::DomainReport;
use crate::config::{Config, DKIM_PROBE_CONCURRENCY};
use crate::dkim::{discover_dkim_with, SelectorCatalog};
use crate::dmarc::parse_dmarc;
use crate::dns::{normalize_name, DnsGateway, ScopedGateway};
use crate::error_handling::{merge_diagnostics, InitializationError, ReportError};
use crate::spf::evaluate_spf;

/// Knobs for one [`build_report_with`] call.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Probe only this DKIM selector.
    pub selector: Option<String>,
    pub aggressive_dkim: bool,
    pub catalog: SelectorCatalog,
    pub dkim_concurrency: usize,
    /// Overall budget; queries still in flight when it runs out answer
    /// [`DnsError::Timeout`](crate::error_handling::DnsError::Timeout).
    pub timeout: Option<Duration>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            selector: None,
            aggressive_dkim: false,
            catalog: SelectorCatalog::default(),
            dkim_concurrency: DKIM_PROBE_CONCURRENCY,
            timeout: None,
        }
    }
}

impl ReportOptions {
    /// Options matching the command-line configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.selector_file` is set but cannot be read.
    pub fn from_config(config: &Config) -> Result<Self, InitializationError> {
        let catalog = match &config.selector_file {
            Some(path) => SelectorCatalog::with_file(path)?,
            None => SelectorCatalog::default(),
        };
        Ok(Self {
            selector: config.selector.clone(),
            aggressive_dkim: config.aggressive_dkim,
            catalog,
            dkim_concurrency: config.dkim_concurrency,
            timeout: Some(config.request_timeout()),
        })
    }
}

/// Builds the full SPF/DKIM/DMARC report for `domain` with default options.
///
/// # Errors
///
/// See [`build_report_with`].
pub async fn build_report<G: DnsGateway>(
    gateway: &G,
    domain: &str,
    aggressive_dkim: bool,
) -> Result<DomainReport, ReportError> {
    let options = ReportOptions {
        aggressive_dkim,
        ..ReportOptions::default()
    };
    build_report_with(gateway, domain, &options).await
}

/// Builds the report for `domain`.
///
/// SPF, DKIM and DMARC are checked concurrently and joined. Their failures
/// become diagnostics on the report.
///
/// # Errors
///
/// - [`ReportError::EmptyDomain`] if `domain` is blank
/// - [`ReportError::DnsUnavailable`] if not a single query reached a name
///   server
pub async fn build_report_with<G: DnsGateway>(
    gateway: &G,
    domain: &str,
    options: &ReportOptions,
) -> Result<DomainReport, ReportError> {
    let domain = normalize_name(domain);
    if domain.is_empty() {
        return Err(ReportError::EmptyDomain);
    }
    info!("Checking email authentication for {domain}");

    let deadline = options.timeout.map(|timeout| Instant::now() + timeout);
    let scoped = ScopedGateway::new(gateway, deadline);

    let (spf, dkim, dmarc) = tokio::join!(
        evaluate_spf(&scoped, &domain),
        discover_dkim_with(
            &scoped,
            &domain,
            options.selector.as_deref(),
            options.aggressive_dkim,
            &options.catalog,
            options.dkim_concurrency,
        ),
        parse_dmarc(&scoped, &domain),
    );

    if scoped.never_reached_dns() {
        return Err(ReportError::DnsUnavailable {
            domain,
            reason: scoped
                .last_unavailable_reason()
                .unwrap_or_else(|| "no name server reachable".to_string()),
        });
    }
    debug!("{domain}: {} DNS queries issued", scoped.attempts());

    let diagnostics = merge_diagnostics(
        spf.diagnostics()
            .into_iter()
            .chain(dkim.iter().flat_map(|r| r.diagnostics()))
            .chain(dmarc.diagnostics),
    );
    let assessment = assess_parts(&spf, dmarc.record.as_ref(), &dkim);

    Ok(DomainReport {
        domain,
        spf,
        dkim,
        dmarc: dmarc.record,
        diagnostics,
        assessment,
        aggressive_dkim: options.aggressive_dkim,
        fetched_at: Utc::now(),
    })
}
