// rust/ttlc-shacl/src/report.rs
// Validation report records and their JSON projection

use serde::Serialize;
use ttlc_rdf::{Interner, NodeId};

use crate::shapes::Severity;

/// One constraint violation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub focus: NodeId,
    pub shape: NodeId,
    pub path: Option<NodeId>,
    pub constraint: &'static str,
    pub severity: Severity,
    pub message: Option<NodeId>,
}

/// A constraint that could not be evaluated; distinct from a
/// violation.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeErrorEntry {
    pub focus: NodeId,
    pub shape: NodeId,
    pub constraint: &'static str,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub entries: Vec<ReportEntry>,
    pub errors: Vec<RuntimeErrorEntry>,
}

impl ValidationReport {
    pub fn conforms(&self) -> bool {
        self.entries.is_empty() && self.errors.is_empty()
    }

    pub fn violation_count(&self) -> usize {
        self.count(Severity::Violation)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    fn count(&self, s: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == s).count()
    }

    /// Resolve identifiers to strings for emission.
    pub fn resolve(&self, interner: &Interner) -> ReportJson {
        let name = |id: NodeId| interner.str_of(id).to_string();
        ReportJson {
            conforms: self.conforms(),
            violations: self.violation_count(),
            warnings: self.warning_count(),
            infos: self.info_count(),
            results: self
                .entries
                .iter()
                .map(|e| ResultJson {
                    focus: name(e.focus),
                    shape: name(e.shape),
                    path: e.path.map(name),
                    constraint: e.constraint,
                    severity: e.severity,
                    message: e.message.map(name),
                })
                .collect(),
            errors: self
                .errors
                .iter()
                .map(|e| ErrorJson {
                    focus: name(e.focus),
                    shape: name(e.shape),
                    constraint: e.constraint,
                    detail: e.detail.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportJson {
    pub conforms: bool,
    pub violations: usize,
    pub warnings: usize,
    pub infos: usize,
    pub results: Vec<ResultJson>,
    pub errors: Vec<ErrorJson>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultJson {
    pub focus: String,
    pub shape: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub constraint: &'static str,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorJson {
    pub focus: String,
    pub shape: String,
    pub constraint: &'static str,
    pub detail: String,
}
