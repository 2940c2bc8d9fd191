//! Per-report gateway wrapper.
//!
//! Applies the caller's overall deadline to every query and records whether
//! any query reached a name server, so the aggregator can tell a broken
//! network apart from a broken zone.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::time::Instant;

use super::gateway::DnsGateway;
use crate::error_handling::DnsError;

/// Wraps a gateway for the lifetime of one report.
///
/// Once the deadline passes, in-flight queries are dropped and answer
/// [`DnsError::Timeout`]; results that completed earlier are unaffected.
pub struct ScopedGateway<'g, G> {
    inner: &'g G,
    deadline: Option<Instant>,
    attempts: AtomicUsize,
    unavailable: AtomicUsize,
    last_unavailable: Mutex<Option<String>>,
}

impl<'g, G: DnsGateway> ScopedGateway<'g, G> {
    pub fn new(inner: &'g G, deadline: Option<Instant>) -> Self {
        Self {
            inner,
            deadline,
            attempts: AtomicUsize::new(0),
            unavailable: AtomicUsize::new(0),
            last_unavailable: Mutex::new(None),
        }
    }

    /// Number of queries issued through this wrapper.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }

    /// True when at least one query was issued and every one of them failed
    /// without reaching a name server.
    pub fn never_reached_dns(&self) -> bool {
        let attempts = self.attempts();
        attempts > 0 && self.unavailable.load(Ordering::Relaxed) == attempts
    }

    /// Reason given by the most recent unreachable-network failure.
    pub fn last_unavailable_reason(&self) -> Option<String> {
        self.last_unavailable
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl<G: DnsGateway> DnsGateway for ScopedGateway<'_, G> {
    async fn resolve_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        let result = match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, self.inner.resolve_txt(name))
                .await
                .unwrap_or_else(|_| {
                    log::warn!("Request deadline reached while resolving {name}");
                    Err(DnsError::Timeout)
                }),
            None => self.inner.resolve_txt(name).await,
        };
        if let Err(DnsError::Unavailable(reason)) = &result {
            self.unavailable.fetch_add(1, Ordering::Relaxed);
            *self
                .last_unavailable
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(reason.clone());
        }
        result
    }
}
