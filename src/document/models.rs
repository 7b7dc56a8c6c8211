//! Core data structures for exam content representation
//!
//! This module defines the types shared by the classifiers and the
//! reconciler: styled runs, questions, answer keys and the composed
//! output records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inline formatting flags carried by a run.
///
/// The three styles are independent; a run may set any combination,
/// although the markup codec only round-trips single-style spans.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextFormatting {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl TextFormatting {
    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.underline
    }
}

/// A contiguous span of text sharing one formatting state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormattedRun {
    pub text: String,
    pub formatting: TextFormatting,
}

impl FormattedRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            formatting: TextFormatting::default(),
        }
    }

    /// Consolidate adjacent runs with identical formatting into single runs
    pub fn consolidate_runs(runs: Vec<FormattedRun>) -> Vec<FormattedRun> {
        if runs.is_empty() {
            return runs;
        }

        let mut consolidated = Vec::new();
        let mut current_run = runs[0].clone();

        for run in runs.into_iter().skip(1) {
            if current_run.formatting == run.formatting {
                // Same formatting - merge the text
                current_run.text.push_str(&run.text);
            } else {
                // Different formatting - push current and start new
                consolidated.push(current_run);
                current_run = run;
            }
        }

        // last run
        consolidated.push(current_run);
        consolidated
    }
}

/// The three supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    FillBlank,
}

/// A question as assembled from the exam document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    /// Kind per the layout's range policy; `None` when the ID falls
    /// outside every configured range.
    pub kind: Option<QuestionType>,
    /// Newline-joined markup: stem, choice lines and image placeholder
    /// lines in document order.
    pub body: String,
    /// Number of image placeholders referenced by this question.
    pub image_count: u32,
}

/// All questions of one exam document, keyed by 1-based ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamPaper {
    pub questions: BTreeMap<u32, Question>,
}

impl ExamPaper {
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Everything the answer document contributes to reconciliation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerKey {
    /// Non-empty table cell texts in traversal order. Correlated to
    /// question IDs positionally through the layout's position table.
    pub table_answers: Vec<String>,
    /// Paragraph-sourced answers keyed by ID. Multi-line answers are
    /// newline-joined.
    pub answers: BTreeMap<u32, String>,
    /// Explanation markup keyed by ID, still carrying the echoed
    /// `N.` prefix from the source document.
    pub explanations: BTreeMap<u32, String>,
}

/// One reconciled output record, ready for composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: u32,
    pub kind: QuestionType,
    pub body: String,
    pub answer_lines: Vec<String>,
    pub explanation: String,
}
