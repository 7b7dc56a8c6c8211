//! Answer document classifier
//!
//! The answer key document holds three things: a table with the first
//! block of answer letters, ID-prefixed answer paragraphs, and - after
//! a section-header paragraph - ID-prefixed explanation paragraphs.
//! Answers keep plain text; explanations keep run emphasis as markup.

use super::formatting::{extract_paragraph_text, paragraph_markup};
use super::questions::QUESTION_PATTERN;
use super::table::collect_cell_texts;
use super::SkippedLine;
use crate::config::ExamLayout;
use crate::document::models::AnswerKey;

/// Which zone of the answer document the scan is in.
#[derive(PartialEq)]
enum Zone {
    Answers,
    Explanations,
}

/// Classify the answer document into its answer key.
///
/// Table cells are collected only from tables before the section
/// header. A paragraph that matches no pattern and has no open entry to
/// attach to is dropped, and the drop is reported.
pub fn classify_answer_document(
    docx: &docx_rs::Docx,
    layout: &ExamLayout,
) -> (AnswerKey, Vec<SkippedLine>) {
    let mut key = AnswerKey::default();
    let mut skipped = Vec::new();

    let mut zone = Zone::Answers;
    let mut open_answer: Option<u32> = None;
    let mut open_explanation: Option<u32> = None;

    for (index, child) in docx.document.children.iter().enumerate() {
        match child {
            docx_rs::DocumentChild::Table(table) => {
                if zone == Zone::Answers {
                    key.table_answers.extend(collect_cell_texts(table));
                }
            }
            docx_rs::DocumentChild::Paragraph(para) => {
                let text = extract_paragraph_text(para);

                if text.starts_with(&layout.section_header) {
                    zone = Zone::Explanations;
                    continue;
                }
                if text.is_empty() {
                    continue;
                }

                let entry = QUESTION_PATTERN
                    .captures(&text)
                    .and_then(|caps| Some((caps[1].parse::<u32>().ok()?, caps[2].to_string())));

                match zone {
                    Zone::Answers => {
                        if let Some((id, value)) = entry {
                            key.answers.insert(id, value);
                            open_answer = Some(id);
                        } else if let Some(id) = open_answer {
                            // Multi-line answers are newline-joined
                            if let Some(entry) = key.answers.get_mut(&id) {
                                entry.push('\n');
                                entry.push_str(&text);
                            }
                        } else {
                            skipped.push(SkippedLine::new(index, &text));
                        }
                    }
                    Zone::Explanations => {
                        if let Some((id, _)) = entry {
                            // Re-derive from formatted runs to preserve emphasis
                            key.explanations.insert(id, paragraph_markup(para));
                            open_explanation = Some(id);
                        } else if let Some(id) = open_explanation {
                            if let Some(entry) = key.explanations.get_mut(&id) {
                                entry.push('\n');
                                entry.push_str(&text);
                            }
                        } else {
                            skipped.push(SkippedLine::new(index, &text));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    (key, skipped)
}
