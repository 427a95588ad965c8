// src/error.rs
// Pipeline error taxonomy
// Each error maps to a stable kind string for the driver's
// path:line:col: KIND: message output

use std::path::PathBuf;

use ttlc_arena::ArenaError;
use ttlc_config::ConfigError;
use ttlc_owl::OwlError;
use ttlc_plan::PlanError;
use ttlc_rdf::{InternError, ParseError, ParseErrorKind};
use ttlc_shacl::ShaclError;

/// Stable kind strings, one per failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorKind(pub &'static str);

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("no such file: {path}")]
    FileNotFound { path: PathBuf },
    #[error("cannot read {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("{path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Arena(#[from] ArenaError),
    #[error("{0}")]
    Intern(#[from] InternError),
    #[error("{0}")]
    Owl(#[from] OwlError),
    #[error("{0}")]
    Shacl(#[from] ShaclError),
    #[error("disjointness contradiction between {a} and {b}{}", subject.as_ref().map(|s| format!(" (instance {s})")).unwrap_or_default())]
    Disjoint {
        subject: Option<String>,
        a: String,
        b: String,
    },
    #[error("validation failed with {violations} violation(s)")]
    ValidationFailed { violations: usize },
    #[error("{0}")]
    Plan(#[from] PlanError),
    #[error("compilation cancelled")]
    Cancelled,
}

impl CompileError {
    /// Taxonomy kind for user-facing output.
    pub fn kind(&self) -> ErrorKind {
        let s = match self {
            CompileError::Config(_) => "config-error",
            CompileError::FileNotFound { .. } => "file-not-found",
            CompileError::Read { .. } => "read-failure",
            CompileError::InvalidUtf8 { .. } => "invalid-utf8",
            CompileError::Parse(e) => match &e.kind {
                ParseErrorKind::Lex(_) => "lexer-invalid-token",
                ParseErrorKind::UnexpectedToken { .. } => "parser-unexpected-token",
                ParseErrorKind::IncompleteStatement => "parser-incomplete-statement",
                ParseErrorKind::UndeclaredPrefix(_) => "undeclared-prefix",
                ParseErrorKind::InvalidEscape => "invalid-escape",
                ParseErrorKind::InvalidIri(_) => "invalid-iri",
                ParseErrorKind::Intern(InternError::TableFull) => "interner-table-full",
                ParseErrorKind::Intern(InternError::Arena(_)) => "arena-exhausted",
                ParseErrorKind::Graph(_) => "invariant-violation",
            },
            CompileError::Arena(ArenaError::TooManyZones) => "too-many-zones",
            CompileError::Arena(ArenaError::Exhausted { .. }) => "arena-exhausted",
            CompileError::Arena(_) => "invariant-violation",
            CompileError::Intern(InternError::TableFull) => "interner-table-full",
            CompileError::Intern(InternError::Arena(_)) => "arena-exhausted",
            CompileError::Owl(_) => "invariant-violation",
            CompileError::Shacl(_) => "constraint-runtime-error",
            CompileError::Disjoint { .. } => "disjointness-contradiction",
            CompileError::ValidationFailed { .. } => "shape-violation",
            CompileError::Plan(PlanError::PartialWrite { .. }) => "partial-write",
            CompileError::Plan(PlanError::UnsupportedVersion { .. }) => {
                "unsupported-version-on-open"
            }
            CompileError::Plan(PlanError::Io(_)) => "write-failure",
            CompileError::Plan(_) => "invariant-violation",
            CompileError::Cancelled => "cancelled",
        };
        ErrorKind(s)
    }

    /// Source position, when the error carries one.
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            CompileError::Parse(e) => Some((e.line, e.column)),
            _ => None,
        }
    }
}
