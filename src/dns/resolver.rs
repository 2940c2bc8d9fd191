//! `hickory-resolver` backed gateway.
//!
//! This module adapts the system resolver to [`DnsGateway`], mapping resolver
//! errors onto [`DnsError`] variants.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;

use super::gateway::DnsGateway;
use crate::error_handling::DnsError;

/// Gateway issuing real queries through a shared `TokioAsyncResolver`.
#[derive(Clone)]
pub struct ResolverGateway {
    resolver: Arc<TokioAsyncResolver>,
}

impl ResolverGateway {
    pub fn new(resolver: Arc<TokioAsyncResolver>) -> Self {
        Self { resolver }
    }
}

/// Classifies a resolver failure.
///
/// `Ok(())` means "the name exists but holds no records of this type", which
/// callers turn into an empty answer.
fn classify_error(e: &ResolveError) -> Result<(), DnsError> {
    match e.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::NXDomain => Err(DnsError::NxDomain),
            ResponseCode::ServFail => Err(DnsError::ServFail),
            ResponseCode::Refused => Err(DnsError::Refused),
            _ => Ok(()),
        },
        ResolveErrorKind::Timeout => Err(DnsError::Timeout),
        ResolveErrorKind::NoConnections => Err(DnsError::Unavailable(e.to_string())),
        ResolveErrorKind::Io(_) => Err(DnsError::Unavailable(e.to_string())),
        _ => {
            let error_msg = e.to_string().to_lowercase();
            if error_msg.contains("timeout") || error_msg.contains("timed out") {
                Err(DnsError::Timeout)
            } else if error_msg.contains("servfail") {
                Err(DnsError::ServFail)
            } else if error_msg.contains("refused") {
                Err(DnsError::Refused)
            } else {
                Err(DnsError::Other(e.to_string()))
            }
        }
    }
}

impl DnsGateway for ResolverGateway {
    async fn resolve_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        match self.resolver.txt_lookup(name).await {
            Ok(lookup) => {
                let txt_records: Vec<String> = lookup
                    .iter()
                    .map(|txt| {
                        // TXT records can contain multiple strings - join them
                        txt.iter()
                            .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                            .collect::<Vec<String>>()
                            .join("")
                    })
                    .collect();
                log::debug!("Found {} TXT records for {}", txt_records.len(), name);
                Ok(txt_records)
            }
            Err(e) => {
                classify_error(&e).map_err(|dns_err| {
                    log::warn!("TXT lookup failed for {name}: {e}");
                    dns_err
                })?;
                Ok(Vec::new())
            }
        }
    }

    async fn resolve_a(&self, name: &str) -> Result<Vec<Ipv4Addr>, DnsError> {
        match self.resolver.ipv4_lookup(name).await {
            Ok(lookup) => Ok(lookup.iter().map(|a| a.0).collect()),
            Err(e) => {
                classify_error(&e)?;
                Ok(Vec::new())
            }
        }
    }

    async fn resolve_mx(&self, name: &str) -> Result<Vec<(u16, String)>, DnsError> {
        match self.resolver.mx_lookup(name).await {
            Ok(lookup) => {
                let mut mx_records: Vec<(u16, String)> = lookup
                    .iter()
                    .map(|mx| (mx.preference(), mx.exchange().to_utf8()))
                    .collect();
                // Sort by priority (lower preference = higher priority)
                mx_records.sort_by_key(|(priority, _)| *priority);
                Ok(mx_records)
            }
            Err(e) => {
                classify_error(&e)?;
                Ok(Vec::new())
            }
        }
    }

    async fn resolve_ptr(&self, ip: IpAddr) -> Result<Vec<String>, DnsError> {
        match self.resolver.reverse_lookup(ip).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|name| name.to_string().trim_end_matches('.').to_string())
                .collect()),
            Err(e) => {
                classify_error(&e)?;
                Ok(Vec::new())
            }
        }
    }
}
