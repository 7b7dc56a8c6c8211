//! Question document classifier
//!
//! Scans the exam document's paragraphs in order and groups them into
//! questions: a `N. ...` header opens question N, `A.`..`D.` lines are
//! its choices, graphic paragraphs become image placeholder lines. The
//! body of each question is the newline-join of those lines in document
//! order, as markup.

use once_cell::sync::Lazy;
use regex::Regex;

use super::formatting::{extract_paragraph_text, paragraph_has_drawing, paragraph_markup};
use super::SkippedLine;
use crate::config::ExamLayout;
use crate::document::models::{ExamPaper, Question};
use crate::images::{placeholder_text, PlaceholderCounter};

pub(crate) static QUESTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.\s(.*)").unwrap());
static CHOICE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-D]\.").unwrap());

/// Classifier state: the open question and its accumulated lines.
#[derive(Default)]
struct Accumulator {
    paper: ExamPaper,
    current: Option<OpenQuestion>,
    skipped: Vec<SkippedLine>,
}

struct OpenQuestion {
    question: Question,
    lines: Vec<String>,
}

impl Accumulator {
    fn open(&mut self, question: Question, stem: String) {
        self.flush();
        self.current = Some(OpenQuestion {
            question,
            lines: vec![stem],
        });
    }

    fn append(&mut self, line: String) -> bool {
        match &mut self.current {
            Some(open) => {
                open.lines.push(line);
                true
            }
            None => false,
        }
    }

    fn count_image(&mut self) {
        if let Some(open) = &mut self.current {
            open.question.image_count += 1;
        }
    }

    fn flush(&mut self) {
        if let Some(mut open) = self.current.take() {
            open.question.body = open.lines.join("\n");
            if let Some(previous) = self
                .paper
                .questions
                .insert(open.question.id, open.question)
            {
                log::warn!("question {} appears more than once, keeping the later one", previous.id);
            }
        }
    }
}

/// Classify the exam document into its question map.
///
/// The placeholder counter is shared with the rest of the traversal so
/// image numbering stays global across the whole document. A document
/// with no matching paragraphs yields an empty map.
pub fn classify_questions(
    docx: &docx_rs::Docx,
    layout: &ExamLayout,
    images: &mut PlaceholderCounter,
) -> (ExamPaper, Vec<SkippedLine>) {
    let mut state = Accumulator::default();

    for (index, child) in docx.document.children.iter().enumerate() {
        let docx_rs::DocumentChild::Paragraph(para) = child else {
            continue;
        };

        let text = extract_paragraph_text(para);

        if let Some(caps) = QUESTION_PATTERN.captures(&text) {
            if let Ok(id) = caps[1].parse::<u32>() {
                let kind = layout.kind_for(id);
                if kind.is_none() {
                    log::warn!("question {id} is outside every configured range");
                }
                state.open(
                    Question {
                        id,
                        kind,
                        body: String::new(),
                        image_count: 0,
                    },
                    paragraph_markup(para),
                );
                continue;
            }
        }

        if CHOICE_PATTERN.is_match(&text) {
            if !state.append(paragraph_markup(para)) {
                state.skipped.push(SkippedLine::new(index, &text));
            }
        } else if paragraph_has_drawing(para) {
            let line = placeholder_text(images.next_number());
            state.count_image();
            if !state.append(line) {
                state.skipped.push(SkippedLine::new(index, "[đồ họa]"));
            }
        } else if !text.is_empty() {
            state.skipped.push(SkippedLine::new(index, &text));
        }
    }

    state.flush();
    (state.paper, state.skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::QuestionType;

    fn text_paragraph(text: &str) -> docx_rs::Paragraph {
        docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(text))
    }

    fn classify(docx: &docx_rs::Docx) -> (ExamPaper, Vec<SkippedLine>) {
        let mut counter = PlaceholderCounter::new();
        classify_questions(docx, &ExamLayout::default(), &mut counter)
    }

    #[test]
    fn groups_stem_and_choices_into_one_body() {
        let docx = docx_rs::Docx::new()
            .add_paragraph(text_paragraph("1. Chọn đáp án đúng"))
            .add_paragraph(text_paragraph("A. một"))
            .add_paragraph(text_paragraph("B. hai"))
            .add_paragraph(text_paragraph("C. ba"))
            .add_paragraph(text_paragraph("D. bốn"));

        let (paper, skipped) = classify(&docx);
        assert!(skipped.is_empty());
        assert_eq!(paper.questions.len(), 1);

        let question = &paper.questions[&1];
        assert_eq!(question.kind, Some(QuestionType::MultipleChoice));
        assert_eq!(
            question.body,
            "1. Chọn đáp án đúng\nA. một\nB. hai\nC. ba\nD. bốn"
        );
    }

    #[test]
    fn header_line_keeps_run_emphasis_as_markup() {
        let para = docx_rs::Paragraph::new()
            .add_run(docx_rs::Run::new().add_text("2. Từ nào có phần "))
            .add_run(docx_rs::Run::new().add_text("gạch chân").bold())
            .add_run(docx_rs::Run::new().add_text(" khác?"));
        let docx = docx_rs::Docx::new().add_paragraph(para);

        let (paper, _) = classify(&docx);
        assert_eq!(
            paper.questions[&2].body,
            "2. Từ nào có phần **gạch chân** khác?"
        );
    }

    #[test]
    fn new_header_flushes_previous_question() {
        let docx = docx_rs::Docx::new()
            .add_paragraph(text_paragraph("1. đầu tiên"))
            .add_paragraph(text_paragraph("A. x"))
            .add_paragraph(text_paragraph("2. thứ hai"));

        let (paper, _) = classify(&docx);
        assert_eq!(paper.questions.len(), 2);
        assert_eq!(paper.questions[&1].body, "1. đầu tiên\nA. x");
        assert_eq!(paper.questions[&2].body, "2. thứ hai");
    }

    #[test]
    fn unmatched_paragraphs_are_skipped_but_reported() {
        let docx = docx_rs::Docx::new()
            .add_paragraph(text_paragraph("PHẦN I"))
            .add_paragraph(text_paragraph("1. câu hỏi"));

        let (paper, skipped) = classify(&docx);
        assert_eq!(paper.questions.len(), 1);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].preview, "PHẦN I");
    }

    #[test]
    fn graphic_paragraphs_become_placeholder_lines() {
        let mut buf = std::io::Cursor::new(Vec::new());
        image::RgbaImage::new(1, 1)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        let png = buf.into_inner();

        let docx = docx_rs::Docx::new()
            .add_paragraph(text_paragraph("5. Nhìn hình và trả lời"))
            .add_paragraph(
                docx_rs::Paragraph::new()
                    .add_run(docx_rs::Run::new().add_image(docx_rs::Pic::new(&png))),
            )
            .add_paragraph(text_paragraph("A. đúng"));

        let mut counter = PlaceholderCounter::new();
        let (paper, _) = classify_questions(&docx, &ExamLayout::default(), &mut counter);

        let question = &paper.questions[&5];
        assert_eq!(question.image_count, 1);
        assert_eq!(
            question.body,
            "5. Nhìn hình và trả lời\n[Hình ảnh 1]\nA. đúng"
        );
        assert_eq!(counter.issued(), 1);
    }

    #[test]
    fn empty_document_yields_empty_map() {
        let (paper, skipped) = classify(&docx_rs::Docx::new());
        assert!(paper.is_empty());
        assert!(skipped.is_empty());
    }
}
