//! DMARC data model.

use std::collections::BTreeMap;

use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error_handling::Diagnostic;

/// Requested handling of mail that fails DMARC (`p=` / `sp=`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DmarcPolicy {
    None,
    Quarantine,
    Reject,
}

/// Identifier alignment mode (`adkim=` / `aspf=`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Strict,
    #[default]
    Relaxed,
}

impl Alignment {
    pub fn from_tag(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "s" => Some(Alignment::Strict),
            "r" => Some(Alignment::Relaxed),
            _ => None,
        }
    }
}

/// A parsed `_dmarc` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DmarcRecord {
    pub version: String,
    /// `None` when `p=` is missing or not a known policy.
    pub policy: Option<DmarcPolicy>,
    /// `sp=`, or the value of `policy` when absent.
    pub subdomain_policy: Option<DmarcPolicy>,
    pub percentage: u8,
    pub aggregate_report_uris: Vec<String>,
    pub forensic_report_uris: Vec<String>,
    pub dkim_alignment: Alignment,
    pub spf_alignment: Alignment,
    /// `fo=` failure reporting options.
    pub failure_options: String,
    /// `rf=` failure report format.
    pub report_format: String,
    /// `ri=` aggregate report interval in seconds.
    pub report_interval: u32,
    /// Every tag as published, keyed by lowercased tag name.
    pub raw_tags: BTreeMap<String, String>,
    pub raw: String,
}

/// Outcome of looking up and parsing `_dmarc.<domain>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DmarcLookup {
    pub record: Option<DmarcRecord>,
    pub diagnostics: Vec<Diagnostic>,
}
