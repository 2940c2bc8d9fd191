//! SPF data model.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error_handling::{Diagnostic, ParseError};

/// Qualifier prefix on a directive (RFC 7208 section 4.6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    Pass,     // + (default)
    Fail,     // -
    SoftFail, // ~
    Neutral,  // ?
}

impl Qualifier {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Qualifier::Pass),
            '-' => Some(Qualifier::Fail),
            '~' => Some(Qualifier::SoftFail),
            '?' => Some(Qualifier::Neutral),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Qualifier::Pass => '+',
            Qualifier::Fail => '-',
            Qualifier::SoftFail => '~',
            Qualifier::Neutral => '?',
        }
    }
}

/// What an SPF term is.
///
/// Terms the tokenizer cannot place keep their raw text in `Unknown` so they
/// can still be reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismKind {
    All,
    Include,
    A,
    Mx,
    Ptr,
    Ip4,
    Ip6,
    Exists,
    /// `redirect=` modifier.
    Redirect,
    /// `exp=` modifier.
    Explanation,
    Unknown(String),
}

impl MechanismKind {
    /// Looks up a mechanism keyword (case-insensitive).
    pub fn from_mechanism_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "all" => Some(MechanismKind::All),
            "include" => Some(MechanismKind::Include),
            "a" => Some(MechanismKind::A),
            "mx" => Some(MechanismKind::Mx),
            "ptr" => Some(MechanismKind::Ptr),
            "ip4" => Some(MechanismKind::Ip4),
            "ip6" => Some(MechanismKind::Ip6),
            "exists" => Some(MechanismKind::Exists),
            _ => None,
        }
    }

    /// Looks up a modifier name (case-insensitive).
    pub fn from_modifier_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "redirect" => Some(MechanismKind::Redirect),
            "exp" => Some(MechanismKind::Explanation),
            _ => None,
        }
    }

    /// Number of DNS lookups evaluating this term costs against the
    /// ten-lookup budget.
    pub fn lookup_cost(&self) -> u32 {
        match self {
            MechanismKind::Include
            | MechanismKind::A
            | MechanismKind::Mx
            | MechanismKind::Ptr
            | MechanismKind::Exists
            | MechanismKind::Redirect => 1,
            _ => 0,
        }
    }

    /// True when the term's value must be present.
    pub fn requires_value(&self) -> bool {
        matches!(
            self,
            MechanismKind::Include
                | MechanismKind::Exists
                | MechanismKind::Ip4
                | MechanismKind::Ip6
                | MechanismKind::Redirect
                | MechanismKind::Explanation
        )
    }
}

/// One term of an SPF record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpfMechanism {
    pub qualifier: Qualifier,
    pub kind: MechanismKind,
    pub value: Option<String>,
    pub domain_lookups_cost: u32,
}

impl SpfMechanism {
    pub fn new(qualifier: Qualifier, kind: MechanismKind, value: Option<String>) -> Self {
        let domain_lookups_cost = kind.lookup_cost();
        Self {
            qualifier,
            kind,
            value,
            domain_lookups_cost,
        }
    }

    /// The syntax problem this term represents, if any.
    ///
    /// Unknown `name=value` modifiers are legal (RFC 7208 section 6) and are
    /// not reported.
    pub fn parse_error(&self) -> Option<ParseError> {
        let MechanismKind::Unknown(raw) = &self.kind else {
            return None;
        };
        let qualified = raw.starts_with(['+', '-', '~', '?']);
        let term = if qualified { &raw[1..] } else { raw.as_str() };
        let name_end = term.find([':', '/', '=']).unwrap_or(term.len());
        let (name, rest) = term.split_at(name_end);
        let missing_value = Some(ParseError::MissingValue(name.to_ascii_lowercase()));
        let unknown = Some(ParseError::UnknownMechanism(raw.clone()));

        if rest.starts_with('=') {
            return match (qualified, MechanismKind::from_modifier_name(name)) {
                (true, _) => unknown,
                (false, Some(_)) => missing_value,
                (false, None) => None,
            };
        }
        match MechanismKind::from_mechanism_name(name) {
            Some(_) if rest.is_empty() || rest == ":" => missing_value,
            _ => unknown,
        }
    }

    /// Renders the term the way it would appear in a record.
    pub fn to_term(&self) -> String {
        let prefix = match self.qualifier {
            Qualifier::Pass => String::new(),
            other => other.as_char().to_string(),
        };
        let name = match &self.kind {
            MechanismKind::All => "all",
            MechanismKind::Include => "include",
            MechanismKind::A => "a",
            MechanismKind::Mx => "mx",
            MechanismKind::Ptr => "ptr",
            MechanismKind::Ip4 => "ip4",
            MechanismKind::Ip6 => "ip6",
            MechanismKind::Exists => "exists",
            MechanismKind::Redirect => return format!("redirect={}", self.value_or_empty()),
            MechanismKind::Explanation => return format!("exp={}", self.value_or_empty()),
            MechanismKind::Unknown(raw) => return raw.clone(),
        };
        match &self.value {
            Some(value) if value.starts_with('/') => format!("{prefix}{name}{value}"),
            Some(value) => format!("{prefix}{name}:{value}"),
            None => format!("{prefix}{name}"),
        }
    }

    fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }
}

/// One SPF record in the expansion tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpfNode {
    pub domain: String,
    /// The record text the mechanisms came from.
    pub record: Option<String>,
    pub mechanisms: Vec<SpfMechanism>,
    /// Target of the `redirect=` modifier, if the record has one.
    pub redirect: Option<String>,
    /// Expanded `include:` targets, keyed by included domain.
    pub children: BTreeMap<String, SpfNode>,
    /// Expanded `redirect=` target, when it was followed.
    pub redirected: Option<Box<SpfNode>>,
    pub errors: Vec<Diagnostic>,
}

impl SpfNode {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            record: None,
            mechanisms: Vec::new(),
            redirect: None,
            children: BTreeMap::new(),
            redirected: None,
            errors: Vec::new(),
        }
    }

    pub fn push_error(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    /// The terminating `all` mechanism, if the record has one.
    pub fn all_mechanism(&self) -> Option<&SpfMechanism> {
        self.mechanisms
            .iter()
            .find(|m| m.kind == MechanismKind::All)
    }

    /// Every diagnostic in this subtree, depth-first, parents before children.
    pub fn collect_errors(&self) -> Vec<Diagnostic> {
        let mut out = self.errors.clone();
        for child in self.children.values() {
            out.extend(child.collect_errors());
        }
        if let Some(redirected) = &self.redirected {
            out.extend(redirected.collect_errors());
        }
        out
    }
}

/// Outcome of expanding a domain's SPF policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpfEvaluation {
    pub root: SpfNode,
    pub total_lookups: u32,
    pub lookup_limit_exceeded: bool,
    pub cycle_detected: bool,
    pub visited_domains: BTreeSet<String>,
    /// Number of TXT records at the root that start with `v=spf1`.
    pub record_count: usize,
}

impl SpfEvaluation {
    /// True when the root domain publishes at least one SPF record.
    pub fn has_record(&self) -> bool {
        self.record_count > 0
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.root.collect_errors()
    }
}
