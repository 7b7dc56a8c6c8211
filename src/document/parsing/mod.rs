//! Paragraph classification for the two source documents
//!
//! The exam document and the answer document share one line grammar
//! (`N. ...` question headers, `A.`..`D.` choice lines) but are bucketed
//! differently; each gets its own classifier pass.

pub(crate) mod answers;
pub(crate) mod formatting;
pub(crate) mod questions;
pub(crate) mod table;

use unicode_segmentation::UnicodeSegmentation;

/// A paragraph the classifier had to drop: it matched no pattern and no
/// entry was open to attach it to. Surfaced so callers can report what
/// the source behavior discarded silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// Index of the paragraph in document order.
    pub index: usize,
    /// Shortened text of the dropped paragraph.
    pub preview: String,
}

impl SkippedLine {
    const PREVIEW_GRAPHEMES: usize = 48;

    pub(crate) fn new(index: usize, text: &str) -> Self {
        let mut preview: String = text
            .graphemes(true)
            .take(Self::PREVIEW_GRAPHEMES)
            .collect();
        if preview.len() < text.len() {
            preview.push('…');
        }
        Self { index, preview }
    }
}
