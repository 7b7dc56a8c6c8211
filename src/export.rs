//! Output composition and writing
//!
//! Turns reconciled records into the flattened output text, and writes
//! that text as a .docx document (one paragraph per line, markup decoded
//! back into styled runs) or as JSON for inspection.

use std::fs::File;
use std::path::Path;

use crate::document::models::{FormattedRun, QuestionRecord};
use crate::error::{ExamError, Result};
use crate::markup;

/// Literal label line between a question body and its answer lines.
pub const ANSWER_LABEL: &str = "Lời giải";
/// Literal separator line between answer lines and the explanation.
pub const EXPLANATION_SEPARATOR: &str = "####";

/// Compose the flattened output text.
///
/// Each record contributes, in order: question body, the answer label,
/// its answer line(s), the separator, the explanation, and a blank
/// line. Records are expected in ascending ID order.
pub fn compose(records: &[QuestionRecord]) -> String {
    let mut out = String::new();

    for record in records {
        out.push_str(&record.body);
        out.push('\n');
        out.push_str(ANSWER_LABEL);
        out.push('\n');
        for line in &record.answer_lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(EXPLANATION_SEPARATOR);
        out.push('\n');
        out.push_str(&record.explanation);
        out.push_str("\n\n");
    }

    out
}

/// Build a docx-rs run from a styled run.
pub(crate) fn build_run(run: &FormattedRun) -> docx_rs::Run {
    let mut built = docx_rs::Run::new().add_text(run.text.as_str());
    if run.formatting.bold {
        built = built.bold();
    }
    if run.formatting.italic {
        built = built.italic();
    }
    if run.formatting.underline {
        built = built.underline("single");
    }
    built
}

/// Write composed markup text as a .docx document, one paragraph per
/// line with the markup decoded back into styled runs.
pub fn write_docx(markup_text: &str, path: &Path) -> Result<()> {
    let mut docx = docx_rs::Docx::new();

    for line in markup_text.lines() {
        let mut para = docx_rs::Paragraph::new();
        for run in markup::decode(line) {
            para = para.add_run(build_run(&run));
        }
        docx = docx.add_paragraph(para);
    }

    save_docx(docx, path)
}

/// Pack a built document to disk.
pub fn save_docx(docx: docx_rs::Docx, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| ExamError::io(path, e))?;
    docx.build()
        .pack(file)
        .map_err(|e| ExamError::invalid_document(path, e.to_string()))?;
    Ok(())
}

/// Dump the reconciled records as pretty JSON.
pub fn write_json(records: &[QuestionRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| ExamError::invalid_document(path, e.to_string()))?;
    std::fs::write(path, json).map_err(|e| ExamError::io(path, e))
}
