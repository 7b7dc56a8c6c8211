//! Text extraction and formatting utilities
//!
//! This module handles extraction of text and formatting information
//! from docx-rs paragraph and run elements, and re-expression of a
//! paragraph's runs as an inline markup string.

use crate::document::models::{FormattedRun, TextFormatting};
use crate::markup;

/// Extract plain text from a paragraph, handling various child elements
pub(crate) fn extract_paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();

    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            text.push_str(&extract_run_text(run));
        }
    }

    text.trim().to_string()
}

/// Extract text from a run using docx-rs features
pub(crate) fn extract_run_text(run: &docx_rs::Run) -> String {
    let mut text = String::new();

    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(text_elem) => {
                text.push_str(&text_elem.text);
            }
            docx_rs::RunChild::Tab(_) => {
                text.push('\t');
            }
            docx_rs::RunChild::Break(_) => {
                text.push('\n');
            }
            _ => {
                // Drawings and other run children carry no text
            }
        }
    }

    text
}

/// Extract formatting information from a run
pub(crate) fn extract_run_formatting(run: &docx_rs::Run) -> TextFormatting {
    let props = &run.run_property;

    TextFormatting {
        bold: props.bold.is_some(),
        italic: props.italic.is_some(),
        underline: props.underline.is_some(),
    }
}

/// True when any run of the paragraph embeds a graphical object.
pub(crate) fn paragraph_has_drawing(para: &docx_rs::Paragraph) -> bool {
    para.children.iter().any(|child| {
        if let docx_rs::ParagraphChild::Run(run) = child {
            run.children
                .iter()
                .any(|run_child| matches!(run_child, docx_rs::RunChild::Drawing(_)))
        } else {
            false
        }
    })
}

/// Collect a paragraph's runs with their formatting, consolidated.
pub(crate) fn collect_formatted_runs(para: &docx_rs::Paragraph) -> Vec<FormattedRun> {
    let mut runs = Vec::new();

    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            let text = extract_run_text(run);
            if !text.is_empty() {
                runs.push(FormattedRun {
                    text,
                    formatting: extract_run_formatting(run),
                });
            }
        }
    }

    FormattedRun::consolidate_runs(runs)
}

/// Re-express a paragraph as a single markup string, preserving the
/// bold/italic/underline emphasis of each run.
pub(crate) fn paragraph_markup(para: &docx_rs::Paragraph) -> String {
    markup::encode_runs(&collect_formatted_runs(para))
}
