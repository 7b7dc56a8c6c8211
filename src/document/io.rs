//! File I/O operations and validation
//!
//! This module handles container validation and scoped reading of the
//! source documents: each file is fully read and the handle released
//! before any classification starts.

use std::fs::File;
use std::path::Path;

use zip::ZipArchive;

use crate::error::{ExamError, Result};

/// Validates that the file is a legitimate .docx package
pub fn validate_docx_file(path: &Path) -> Result<()> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    if extension != "docx" {
        return Err(ExamError::invalid_document(
            path,
            format!("expected a .docx file, got .{extension}"),
        ));
    }

    // Check ZIP structure contains word/document.xml
    let file = File::open(path).map_err(|e| ExamError::io(path, e))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| ExamError::invalid_document(path, e.to_string()))?;

    if archive.by_name("word/document.xml").is_err() {
        // Check if it might be an Excel file
        if archive.by_name("xl/workbook.xml").is_ok() {
            return Err(ExamError::invalid_document(
                path,
                "this appears to be an Excel workbook (.xlsx), not a Word document",
            ));
        }

        return Err(ExamError::invalid_document(
            path,
            "missing word/document.xml; the file may be corrupted",
        ));
    }

    Ok(())
}

/// Read and parse a .docx file into the docx-rs document model.
pub fn read_docx_file(path: &Path) -> Result<docx_rs::Docx> {
    let data = std::fs::read(path).map_err(|e| ExamError::io(path, e))?;
    docx_rs::read_docx(&data).map_err(|e| ExamError::invalid_document(path, e.to_string()))
}
