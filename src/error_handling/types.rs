//! Error type definitions.
//!
//! This module defines the transport errors, parse errors and diagnostic codes
//! used throughout the crate.

use log::SetLoggerError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error reading a DKIM selector file.
    #[error("Selector file error: {0}")]
    SelectorFileError(#[from] std::io::Error),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),
}

/// Transport-level failures reported by a [`DnsGateway`](crate::dns::DnsGateway).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DnsError {
    /// The queried name does not exist.
    #[error("NXDOMAIN: domain does not exist")]
    NxDomain,
    /// The server failed to complete the query.
    #[error("SERVFAIL: server failure")]
    ServFail,
    /// No answer before the deadline.
    #[error("DNS query timed out")]
    Timeout,
    /// The server refused the query.
    #[error("REFUSED: query refused by server")]
    Refused,
    /// No name server could be contacted at all.
    #[error("DNS unavailable: {0}")]
    Unavailable(String),
    /// Any other resolver failure.
    #[error("DNS error: {0}")]
    Other(String),
}

impl DnsError {
    /// Maps the transport failure onto its diagnostic code.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            DnsError::NxDomain => DiagnosticCode::DnsNxDomain,
            DnsError::ServFail => DiagnosticCode::DnsServFail,
            DnsError::Timeout => DiagnosticCode::DnsTimeout,
            DnsError::Refused => DiagnosticCode::DnsRefused,
            DnsError::Unavailable(_) => DiagnosticCode::DnsUnavailable,
            DnsError::Other(_) => DiagnosticCode::DnsOther,
        }
    }
}

/// Syntax problems found while tokenizing a record.
///
/// None of these abort a parse: the offending segment is skipped (or kept as
/// an unknown mechanism) and the error travels with the result.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ParseError {
    /// A tag segment has no `=`.
    #[error("segment `{0}` has no `=` separator")]
    MissingSeparator(String),
    /// A tag segment has an empty name (`=value`).
    #[error("segment `{0}` has an empty tag name")]
    EmptyTagName(String),
    /// The same tag appears twice; the first value is kept.
    #[error("tag `{0}` appears more than once")]
    DuplicateTag(String),
    /// An SPF term that is neither a known mechanism nor a known modifier.
    #[error("unknown SPF term `{0}`")]
    UnknownMechanism(String),
    /// A known mechanism or modifier is missing its required value.
    #[error("`{0}` requires a value")]
    MissingValue(String),
}

impl ParseError {
    /// Maps the parse failure onto its diagnostic code.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            ParseError::MissingSeparator(_) => DiagnosticCode::MalformedTag,
            ParseError::EmptyTagName(_) => DiagnosticCode::MalformedTag,
            ParseError::DuplicateTag(_) => DiagnosticCode::DuplicateTag,
            ParseError::UnknownMechanism(_) => DiagnosticCode::UnknownMechanism,
            ParseError::MissingValue(_) => DiagnosticCode::MissingMechanismValue,
        }
    }
}

/// Error returned by [`build_report`](crate::build_report) when no report can
/// be produced at all.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Every DNS query failed before reaching a name server.
    #[error("DNS gateway unreachable for {domain}: {reason}")]
    DnsUnavailable {
        /// Domain the report was requested for.
        domain: String,
        /// Last transport failure seen.
        reason: String,
    },
    /// The requested domain is empty after trimming.
    #[error("no domain given")]
    EmptyDomain,
}

/// Broad family a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    /// Transport failure talking to DNS.
    Dns,
    /// Malformed record syntax.
    Parse,
    /// Structurally valid syntax that breaks a protocol rule.
    Policy,
}

/// Every condition the audit can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, EnumIterMacro)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    // DNS transport
    DnsNxDomain,
    DnsServFail,
    DnsTimeout,
    DnsRefused,
    DnsUnavailable,
    DnsOther,
    // Record syntax
    MalformedTag,
    DuplicateTag,
    UnknownMechanism,
    MissingMechanismValue,
    // SPF posture
    NoSpfRecord,
    MultipleSpfRecords,
    LookupLimitExceeded,
    CycleDetected,
    // DMARC posture
    InvalidDmarcVersion,
    MultipleDmarcRecords,
    MissingDmarcPolicy,
    InvalidDmarcPolicy,
    InvalidPercentage,
    PercentageOutOfRange,
    UnrecognizedUriScheme,
    InvalidAlignment,
    // DKIM posture
    RevokedDkimKey,
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::DnsNxDomain => "DNS NXDOMAIN",
            DiagnosticCode::DnsServFail => "DNS SERVFAIL",
            DiagnosticCode::DnsTimeout => "DNS timeout",
            DiagnosticCode::DnsRefused => "DNS REFUSED",
            DiagnosticCode::DnsUnavailable => "DNS unavailable",
            DiagnosticCode::DnsOther => "DNS error",
            DiagnosticCode::MalformedTag => "Malformed tag",
            DiagnosticCode::DuplicateTag => "Duplicate tag",
            DiagnosticCode::UnknownMechanism => "Unknown SPF mechanism",
            DiagnosticCode::MissingMechanismValue => "SPF term missing value",
            DiagnosticCode::NoSpfRecord => "No SPF record",
            DiagnosticCode::MultipleSpfRecords => "Multiple SPF records",
            DiagnosticCode::LookupLimitExceeded => "SPF DNS lookup limit exceeded",
            DiagnosticCode::CycleDetected => "SPF include/redirect cycle",
            DiagnosticCode::InvalidDmarcVersion => "Invalid DMARC version",
            DiagnosticCode::MultipleDmarcRecords => "Multiple DMARC records",
            DiagnosticCode::MissingDmarcPolicy => "Missing DMARC policy",
            DiagnosticCode::InvalidDmarcPolicy => "Invalid DMARC policy",
            DiagnosticCode::InvalidPercentage => "Invalid DMARC pct",
            DiagnosticCode::PercentageOutOfRange => "DMARC pct out of range",
            DiagnosticCode::UnrecognizedUriScheme => "Unrecognized report URI scheme",
            DiagnosticCode::InvalidAlignment => "Invalid DMARC alignment mode",
            DiagnosticCode::RevokedDkimKey => "Revoked DKIM key",
        }
    }

    pub fn category(&self) -> DiagnosticCategory {
        match self {
            DiagnosticCode::DnsNxDomain
            | DiagnosticCode::DnsServFail
            | DiagnosticCode::DnsTimeout
            | DiagnosticCode::DnsRefused
            | DiagnosticCode::DnsUnavailable
            | DiagnosticCode::DnsOther => DiagnosticCategory::Dns,
            DiagnosticCode::MalformedTag
            | DiagnosticCode::DuplicateTag
            | DiagnosticCode::UnknownMechanism
            | DiagnosticCode::MissingMechanismValue
            | DiagnosticCode::InvalidPercentage
            | DiagnosticCode::InvalidAlignment
            | DiagnosticCode::UnrecognizedUriScheme => DiagnosticCategory::Parse,
            DiagnosticCode::NoSpfRecord
            | DiagnosticCode::MultipleSpfRecords
            | DiagnosticCode::LookupLimitExceeded
            | DiagnosticCode::CycleDetected
            | DiagnosticCode::InvalidDmarcVersion
            | DiagnosticCode::MultipleDmarcRecords
            | DiagnosticCode::MissingDmarcPolicy
            | DiagnosticCode::InvalidDmarcPolicy
            | DiagnosticCode::PercentageOutOfRange
            | DiagnosticCode::RevokedDkimKey => DiagnosticCategory::Policy,
        }
    }
}

/// One reportable finding, attributed to the DNS name it was found at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub domain: String,
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    pub fn new(domain: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: message.into(),
        }
    }

    pub fn from_dns(domain: &str, error: &DnsError) -> Self {
        Self::new(domain, error.code(), error.to_string())
    }

    pub fn from_parse(domain: &str, error: &ParseError) -> Self {
        Self::new(domain, error.code(), error.to_string())
    }

    pub fn category(&self) -> DiagnosticCategory {
        self.code.category()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.domain, self.code, self.message)
    }
}
