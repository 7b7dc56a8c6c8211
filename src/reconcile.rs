//! Cross-document reconciler
//!
//! Merges the two classifier outputs by question ID under the layout's
//! range policy and produces the final output records. Problems are
//! collected per ID across the whole pass - the caller gets every
//! missing or unusable entry in one list, not just the first.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExamLayout;
use crate::document::models::{AnswerKey, ExamPaper, QuestionRecord, QuestionType};
use crate::error::{Diagnostic, DiagnosticKind, ReconcileFailure};

/// Label in front of the accepted fill-in-blank answers.
const FILL_ANSWER_LABEL: &str = "Đáp án";

// Echoed "N." prefix at the head of an explanation, possibly wrapped in
// one markup marker. Stripped by its matched length, never by a fixed
// character count.
static EXPLANATION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\*\*|\*|_)?(\d+)\.(?:\*\*|\*|_)?\s?").unwrap());

/// Merge the exam paper and the answer key into output records, one per
/// configured ID, in ascending ID order.
///
/// On failure the complete diagnostic list is returned; no partial
/// record list is produced.
pub fn reconcile(
    paper: &ExamPaper,
    key: &AnswerKey,
    layout: &ExamLayout,
) -> Result<Vec<QuestionRecord>, ReconcileFailure> {
    if key.table_answers.len() > layout.table_positions.len() {
        log::warn!(
            "answer table holds {} cells but the layout maps only {}",
            key.table_answers.len(),
            layout.table_positions.len()
        );
    }

    let mut records = Vec::new();
    let mut diagnostics = Vec::new();

    for id in layout.ids() {
        let Some(kind) = layout.kind_for(id) else {
            continue;
        };
        let mut report = |kind: DiagnosticKind| diagnostics.push(Diagnostic { id, kind });

        let body = match paper.questions.get(&id) {
            Some(question) => Some(question.body.clone()),
            None => {
                report(DiagnosticKind::MissingQuestion);
                None
            }
        };

        let explanation = match key.explanations.get(&id) {
            Some(markup) => Some(strip_explanation_prefix(markup, id)),
            None => {
                report(DiagnosticKind::MissingExplanation);
                None
            }
        };

        let answer_lines = answer_lines_for(id, kind, key, layout, &mut report);

        if let (Some(body), Some(explanation), Some(answer_lines)) =
            (body, explanation, answer_lines)
        {
            records.push(QuestionRecord {
                id,
                kind,
                body,
                answer_lines,
                explanation,
            });
        }
    }

    if diagnostics.is_empty() {
        Ok(records)
    } else {
        Err(ReconcileFailure { diagnostics })
    }
}

/// Render the answer line(s) for one ID, or report why it cannot be
/// done.
fn answer_lines_for(
    id: u32,
    kind: QuestionType,
    key: &AnswerKey,
    layout: &ExamLayout,
    report: &mut impl FnMut(DiagnosticKind),
) -> Option<Vec<String>> {
    match kind {
        QuestionType::MultipleChoice => {
            let token = if let Some(position) = layout.table_position_for(id) {
                match key.table_answers.get(position) {
                    // The cell echoes the question number; the second
                    // token is the letter.
                    Some(cell) => match cell.split_whitespace().nth(1) {
                        Some(token) => token.to_string(),
                        None => {
                            report(DiagnosticKind::UnrecognizedAnswerValue(cell.clone()));
                            return None;
                        }
                    },
                    None => {
                        report(DiagnosticKind::TablePositionOutOfRange(position));
                        return None;
                    }
                }
            } else {
                match key.answers.get(&id) {
                    Some(raw) => raw.trim().to_string(),
                    None => {
                        report(DiagnosticKind::MissingAnswer);
                        return None;
                    }
                }
            };

            match letter_value(&token) {
                Some(value) => Some(vec![value.to_string()]),
                None => {
                    report(DiagnosticKind::UnrecognizedAnswerValue(token));
                    None
                }
            }
        }
        QuestionType::TrueFalse => {
            let raw = match key.answers.get(&id) {
                Some(raw) => raw.trim(),
                None => {
                    report(DiagnosticKind::MissingAnswer);
                    return None;
                }
            };
            match raw {
                "True" => Some(vec!["1".to_string()]),
                "False" => Some(vec!["0".to_string()]),
                other => {
                    report(DiagnosticKind::UnrecognizedAnswerValue(other.to_string()));
                    None
                }
            }
        }
        QuestionType::FillBlank => match key.answers.get(&id) {
            Some(raw) => Some(vec![render_fill_blank(raw, id, layout)]),
            None => {
                report(DiagnosticKind::MissingAnswer);
                None
            }
        },
    }
}

/// `A` maps to 1 through `D` to 4; anything else is unrecognized.
fn letter_value(token: &str) -> Option<u32> {
    let mut chars = token.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match letter {
        'A' => Some(1),
        'B' => Some(2),
        'C' => Some(3),
        'D' => Some(4),
        _ => None,
    }
}

/// Render the accepted fill-in-blank answers:
/// `Đáp án: [[a1]|[a2]|...|[an]]`.
///
/// From `hint_from` on, the raw answer carries a discardable hint in
/// front of the hint prefix; only the tail is split. An answer missing
/// the expected prefix is used whole.
fn render_fill_blank(raw: &str, id: u32, layout: &ExamLayout) -> String {
    let effective = if id >= layout.hint_from {
        match raw.split_once(&layout.hint_prefix) {
            Some((_, tail)) => tail,
            None => {
                log::debug!(
                    "question {id}: expected hint prefix {:?} not found",
                    layout.hint_prefix
                );
                raw
            }
        }
    } else {
        raw
    };

    let rendered: Vec<String> = effective
        .split(&layout.fill_delimiter)
        .map(|part| format!("[{}]", part.trim()))
        .collect();

    format!("{FILL_ANSWER_LABEL}: [{}]", rendered.join("|"))
}

/// Strip the echoed `N.` numbering from the head of an explanation by
/// exactly the matched prefix length. Text without the expected prefix
/// is kept unchanged.
fn strip_explanation_prefix(markup: &str, id: u32) -> String {
    if let Some(caps) = EXPLANATION_PREFIX.captures(markup) {
        if let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) {
            if digits.as_str().parse() == Ok(id) {
                return markup[whole.end()..].to_string();
            }
            log::warn!(
                "explanation for question {id} is numbered {}",
                digits.as_str()
            );
        }
    }
    markup.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypeRange;
    use crate::document::models::Question;

    fn small_layout() -> ExamLayout {
        ExamLayout {
            type_ranges: vec![
                TypeRange {
                    start: 1,
                    end: 2,
                    kind: QuestionType::MultipleChoice,
                },
                TypeRange {
                    start: 3,
                    end: 3,
                    kind: QuestionType::TrueFalse,
                },
                TypeRange {
                    start: 4,
                    end: 5,
                    kind: QuestionType::FillBlank,
                },
            ],
            table_positions: vec![1],
            hint_from: 5,
            ..ExamLayout::default()
        }
    }

    fn question(id: u32, kind: QuestionType) -> Question {
        Question {
            id,
            kind: Some(kind),
            body: format!("{id}. câu hỏi"),
            image_count: 0,
        }
    }

    fn complete_inputs(layout: &ExamLayout) -> (ExamPaper, AnswerKey) {
        let mut paper = ExamPaper::default();
        let mut key = AnswerKey::default();

        for id in layout.ids() {
            let kind = layout.kind_for(id).unwrap();
            paper.questions.insert(id, question(id, kind));
            key.explanations.insert(id, format!("{id}. giải thích"));

            if let Some(position) = layout.table_position_for(id) {
                while key.table_answers.len() <= position {
                    key.table_answers.push(String::new());
                }
                key.table_answers[position] = format!("{id} A");
            } else {
                let raw = match kind {
                    QuestionType::MultipleChoice => "B".to_string(),
                    QuestionType::TrueFalse => "True".to_string(),
                    QuestionType::FillBlank if id >= layout.hint_from => {
                        "Gợi ý: x/y".to_string()
                    }
                    QuestionType::FillBlank => "a/b".to_string(),
                };
                key.answers.insert(id, raw);
            }
        }

        (paper, key)
    }

    #[test]
    fn one_record_per_configured_id_in_ascending_order() {
        let layout = ExamLayout::default();
        let (paper, key) = complete_inputs(&layout);

        let records = reconcile(&paper, &key, &layout).unwrap();
        let ids: Vec<u32> = records.iter().map(|record| record.id).collect();
        assert_eq!(ids, layout.ids());
    }

    #[test]
    fn table_sourced_letter_uses_second_token() {
        let layout = small_layout();
        let (paper, mut key) = complete_inputs(&layout);
        key.table_answers[0] = "1 C".to_string();

        let records = reconcile(&paper, &key, &layout).unwrap();
        assert_eq!(records[0].answer_lines, vec!["3"]);
    }

    #[test]
    fn paragraph_sourced_letter_maps_to_digit() {
        let layout = small_layout();
        let (paper, key) = complete_inputs(&layout);

        let records = reconcile(&paper, &key, &layout).unwrap();
        // Question 2 is multiple choice without a table position, answered "B"
        assert_eq!(records[1].answer_lines, vec!["2"]);
    }

    #[test]
    fn true_false_maps_to_one_and_zero() {
        let layout = small_layout();
        let (paper, mut key) = complete_inputs(&layout);

        key.answers.insert(3, "True".to_string());
        let records = reconcile(&paper, &key, &layout).unwrap();
        assert_eq!(records[2].answer_lines, vec!["1"]);

        key.answers.insert(3, "False".to_string());
        let records = reconcile(&paper, &key, &layout).unwrap();
        assert_eq!(records[2].answer_lines, vec!["0"]);
    }

    #[test]
    fn unrecognized_true_false_value_is_an_error() {
        let layout = small_layout();
        let (paper, mut key) = complete_inputs(&layout);
        key.answers.insert(3, "Maybe".to_string());

        let failure = reconcile(&paper, &key, &layout).unwrap_err();
        assert_eq!(failure.diagnostics.len(), 1);
        assert_eq!(failure.diagnostics[0].id, 3);
        assert_eq!(
            failure.diagnostics[0].kind,
            DiagnosticKind::UnrecognizedAnswerValue("Maybe".to_string())
        );
    }

    #[test]
    fn fill_blank_renders_bracketed_alternatives() {
        let layout = small_layout();
        let (paper, mut key) = complete_inputs(&layout);
        key.answers.insert(4, "a/b/c".to_string());

        let records = reconcile(&paper, &key, &layout).unwrap();
        assert_eq!(records[3].answer_lines, vec!["Đáp án: [[a]|[b]|[c]]"]);
    }

    #[test]
    fn fill_blank_discards_hint_prefix_from_threshold_on() {
        let layout = small_layout();
        let (paper, mut key) = complete_inputs(&layout);
        key.answers.insert(5, "Gợi ý: x/y".to_string());

        let records = reconcile(&paper, &key, &layout).unwrap();
        assert_eq!(records[4].answer_lines, vec!["Đáp án: [[x]|[y]]"]);
    }

    #[test]
    fn explanation_prefix_is_stripped_by_matched_length() {
        assert_eq!(strip_explanation_prefix("1. vì vậy", 1), "vì vậy");
        assert_eq!(strip_explanation_prefix("**12.** do đó", 12), "do đó");
        assert_eq!(strip_explanation_prefix("không có số", 7), "không có số");
    }

    #[test]
    fn missing_entries_are_collected_across_all_ids() {
        let layout = small_layout();
        let (mut paper, mut key) = complete_inputs(&layout);
        paper.questions.remove(&1);
        key.answers.remove(&3);
        key.explanations.remove(&5);

        let failure = reconcile(&paper, &key, &layout).unwrap_err();
        let mut found: Vec<(u32, DiagnosticKind)> = failure
            .diagnostics
            .iter()
            .map(|diag| (diag.id, diag.kind.clone()))
            .collect();
        found.sort_by_key(|(id, _)| *id);
        assert_eq!(
            found,
            vec![
                (1, DiagnosticKind::MissingQuestion),
                (3, DiagnosticKind::MissingAnswer),
                (5, DiagnosticKind::MissingExplanation),
            ]
        );
    }
}
