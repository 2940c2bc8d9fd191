//! Report data model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dkim::DkimSelectorResult;
use crate::dmarc::DmarcRecord;
use crate::error_handling::Diagnostic;
use crate::spf::SpfEvaluation;

/// Everything learned about one domain's email authentication.
///
/// Assembled once by [`build_report`](super::build_report) and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainReport {
    pub domain: String,
    pub spf: SpfEvaluation,
    /// One entry per probed selector, in probe order.
    pub dkim: Vec<DkimSelectorResult>,
    pub dmarc: Option<DmarcRecord>,
    /// Findings from every component, deduplicated by `(domain, code)`.
    pub diagnostics: Vec<Diagnostic>,
    pub assessment: Assessment,
    /// Whether the large selector list was used.
    pub aggressive_dkim: bool,
    pub fetched_at: DateTime<Utc>,
}

impl DomainReport {
    /// Selectors that publish a usable public key.
    pub fn dkim_keys(&self) -> impl Iterator<Item = &DkimSelectorResult> {
        self.dkim.iter().filter(|r| r.public_key_present)
    }
}

/// Overall posture score with the reasons behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    /// 0 (no protection) to 100.
    pub score: u8,
    pub findings: Vec<Finding>,
}

/// One scoring observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Points deducted; zero for positive or neutral observations.
    pub penalty: u8,
    pub message: String,
}

impl Finding {
    pub fn new(penalty: u8, message: impl Into<String>) -> Self {
        Self {
            penalty,
            message: message.into(),
        }
    }
}
