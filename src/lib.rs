//! examflat: exam paper flattener for .docx files
//!
//! This library extracts question/answer/explanation content from
//! Vietnamese exam documents, reconciles the three sources by question
//! ID and reassembles them into a single flattened document with inline
//! bold/italic/underline markup and numbered image placeholders.

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod images;
pub mod markup;
pub mod reconcile;

/// Output format options
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    Docx,
    Json,
}

// Re-export commonly used types
pub use config::ExamLayout;
pub use document::{AnswerKey, ExamPaper, Question, QuestionRecord, QuestionType};
pub use error::{Diagnostic, DiagnosticKind, ExamError};
pub use images::{ImageStore, PlaceholderCounter};
