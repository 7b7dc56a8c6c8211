//! Error types for the examflat pipeline
//!
//! Classification and reconciliation problems that reference a specific
//! question ID are collected into [`Diagnostic`] lists so a caller sees
//! every problem ID in one pass. I/O and container problems abort
//! immediately.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExamError>;

/// Top-level error type for the library.
#[derive(Error, Debug)]
pub enum ExamError {
    /// File could not be opened, read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The container is not a usable .docx package
    #[error("invalid document {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// The exam layout configuration is unusable
    #[error("invalid exam layout: {0}")]
    Layout(String),

    /// Reconciliation found per-question problems; all of them are listed
    #[error("{0}")]
    Reconcile(#[from] ReconcileFailure),
}

impl ExamError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_document(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// The complete set of per-question diagnostics from one reconciliation
/// pass. Never constructed empty.
#[derive(Debug)]
pub struct ReconcileFailure {
    pub diagnostics: Vec<Diagnostic>,
}

impl std::error::Error for ReconcileFailure {}

impl fmt::Display for ReconcileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "reconciliation failed with {} problem(s):", self.diagnostics.len())?;
        for diag in &self.diagnostics {
            writeln!(f, "  {diag}")?;
        }
        Ok(())
    }
}

/// A single problem tied to a question ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: u32,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "question {}: {}", self.id, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// No question with this ID in the exam document
    MissingQuestion,
    /// No answer entry for this ID in the answer document
    MissingAnswer,
    /// No explanation entry for this ID in the answer document
    MissingExplanation,
    /// The answer field held a value the question kind cannot interpret
    UnrecognizedAnswerValue(String),
    /// The layout maps this ID to a table position past the collected cells
    TablePositionOutOfRange(usize),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MissingQuestion => write!(f, "no question found in exam document"),
            DiagnosticKind::MissingAnswer => write!(f, "no answer found in answer document"),
            DiagnosticKind::MissingExplanation => {
                write!(f, "no explanation found in answer document")
            }
            DiagnosticKind::UnrecognizedAnswerValue(value) => {
                write!(f, "unrecognized answer value {value:?}")
            }
            DiagnosticKind::TablePositionOutOfRange(pos) => {
                write!(f, "table position {pos} is beyond the collected answer cells")
            }
        }
    }
}
