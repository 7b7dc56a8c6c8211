//! Document parsing and data structures module
//!
//! This module provides the docx-facing half of the pipeline: container
//! validation, paragraph/run extraction, and the two classifier passes
//! that turn source documents into the in-memory exam model.

pub(crate) mod io;
pub mod models;
pub(crate) mod parsing;

pub use io::{read_docx_file, validate_docx_file};
pub use models::*;
pub use parsing::answers::classify_answer_document;
pub use parsing::questions::classify_questions;
pub use parsing::SkippedLine;
