//! In-memory DNS gateway.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::gateway::{normalize_name, DnsGateway};
use crate::error_handling::DnsError;

#[derive(Default)]
struct MockZone {
    txt_records: HashMap<String, Vec<String>>,
    failures: HashMap<String, DnsError>,
    delays: HashMap<String, Duration>,
    queries: Vec<String>,
}

/// DNS gateway answering from a fixed table.
///
/// Names without TXT data or an injected failure answer NXDOMAIN. Clones share
/// the same table, so a test can keep a handle to inspect the query log.
///
/// ```
/// use email_posture::dns::MockGateway;
///
/// let dns = MockGateway::new();
/// dns.add_txt("example.com", ["v=spf1 -all"]);
/// ```
#[derive(Clone, Default)]
pub struct MockGateway {
    zone: Arc<Mutex<MockZone>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn zone(&self) -> MutexGuard<'_, MockZone> {
        self.zone.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publishes TXT records at `name`, replacing any earlier ones.
    pub fn add_txt<I, S>(&self, name: &str, records: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = records.into_iter().map(Into::into).collect();
        self.zone().txt_records.insert(normalize_name(name), records);
    }

    /// Makes every query for `name` fail with `error`.
    pub fn fail(&self, name: &str, error: DnsError) {
        self.zone().failures.insert(normalize_name(name), error);
    }

    /// Delays answers for `name`.
    pub fn delay(&self, name: &str, delay: Duration) {
        self.zone().delays.insert(normalize_name(name), delay);
    }

    /// Names queried so far, in arrival order.
    pub fn queries(&self) -> Vec<String> {
        self.zone().queries.clone()
    }

    /// How many times `name` was queried.
    pub fn query_count(&self, name: &str) -> usize {
        let name = normalize_name(name);
        self.zone().queries.iter().filter(|q| **q == name).count()
    }
}

impl DnsGateway for MockGateway {
    async fn resolve_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        let name = normalize_name(name);
        let (delay, answer) = {
            let mut zone = self.zone();
            zone.queries.push(name.clone());
            let answer = match zone.failures.get(&name) {
                Some(error) => Err(error.clone()),
                None => zone
                    .txt_records
                    .get(&name)
                    .cloned()
                    .ok_or(DnsError::NxDomain),
            };
            (zone.delays.get(&name).copied(), answer)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        answer
    }
}
