//! Exam layout configuration
//!
//! The numbering and section conventions of the source documents live
//! here rather than in the parsing code: which ID ranges hold which
//! question kind, which IDs take their answer from the key table and at
//! which position, and the literal tokens the answer document uses.
//!
//! A layout can be loaded from a TOML file; anything not set falls back
//! to the observed 40-question convention.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::models::QuestionType;
use crate::error::{ExamError, Result};

/// An inclusive ID range mapped to one question kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRange {
    pub start: u32,
    pub end: u32,
    pub kind: QuestionType,
}

/// Structural description of one exam convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamLayout {
    /// Inclusive ranges assigning a kind to every expected question ID.
    pub type_ranges: Vec<TypeRange>,
    /// Question IDs whose answer letter comes from the key table, in
    /// cell-traversal order: `table_positions[p]` is the ID answered by
    /// the p-th collected cell.
    pub table_positions: Vec<u32>,
    /// Paragraph text opening the explanation section.
    pub section_header: String,
    /// Delimiter between accepted fill-in-blank sub-answers.
    pub fill_delimiter: String,
    /// Prefix separating a discardable hint from the accepted answers.
    pub hint_prefix: String,
    /// First ID whose raw answer carries the hint prefix.
    pub hint_from: u32,
}

impl Default for ExamLayout {
    fn default() -> Self {
        Self {
            type_ranges: vec![
                TypeRange {
                    start: 1,
                    end: 22,
                    kind: QuestionType::MultipleChoice,
                },
                TypeRange {
                    start: 23,
                    end: 26,
                    kind: QuestionType::TrueFalse,
                },
                TypeRange {
                    start: 27,
                    end: 28,
                    kind: QuestionType::MultipleChoice,
                },
                TypeRange {
                    start: 29,
                    end: 40,
                    kind: QuestionType::FillBlank,
                },
            ],
            table_positions: (1..=22).collect(),
            section_header: "HƯỚNG DẪN GIẢI".to_string(),
            fill_delimiter: "/".to_string(),
            hint_prefix: "ý: ".to_string(),
            hint_from: 37,
        }
    }
}

impl ExamLayout {
    /// Load a layout from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ExamError::io(path, e))?;
        let layout: ExamLayout =
            toml::from_str(&raw).map_err(|e| ExamError::Layout(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Load the layout from the user configuration directory if one has
    /// been written there, otherwise fall back to the default convention.
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                log::debug!("loading exam layout from {}", path.display());
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("examflat").join("layout.toml"))
    }

    /// Every configured question ID, ascending.
    pub fn ids(&self) -> Vec<u32> {
        let ids: BTreeSet<u32> = self
            .type_ranges
            .iter()
            .flat_map(|range| range.start..=range.end)
            .collect();
        ids.into_iter().collect()
    }

    /// The kind assigned to an ID, if any range covers it.
    pub fn kind_for(&self, id: u32) -> Option<QuestionType> {
        self.type_ranges
            .iter()
            .find(|range| range.start <= id && id <= range.end)
            .map(|range| range.kind)
    }

    /// The table-cell position holding this ID's answer, if the ID is
    /// table-sourced.
    pub fn table_position_for(&self, id: u32) -> Option<usize> {
        self.table_positions.iter().position(|&mapped| mapped == id)
    }

    pub fn validate(&self) -> Result<()> {
        if self.type_ranges.is_empty() {
            return Err(ExamError::Layout("no type ranges configured".into()));
        }

        let mut sorted: Vec<&TypeRange> = self.type_ranges.iter().collect();
        sorted.sort_by_key(|range| range.start);
        for range in &sorted {
            if range.start == 0 {
                return Err(ExamError::Layout("question IDs are 1-based".into()));
            }
            if range.start > range.end {
                return Err(ExamError::Layout(format!(
                    "empty range {}..={}",
                    range.start, range.end
                )));
            }
        }
        for pair in sorted.windows(2) {
            if pair[1].start <= pair[0].end {
                return Err(ExamError::Layout(format!(
                    "ranges {}..={} and {}..={} overlap",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for &id in &self.table_positions {
            if !seen.insert(id) {
                return Err(ExamError::Layout(format!(
                    "question {id} appears twice in table_positions"
                )));
            }
            if self.kind_for(id).is_none() {
                return Err(ExamError::Layout(format!(
                    "table_positions maps unconfigured question {id}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_valid_and_covers_forty_questions() {
        let layout = ExamLayout::default();
        layout.validate().unwrap();
        assert_eq!(layout.ids(), (1..=40).collect::<Vec<u32>>());
    }

    #[test]
    fn default_kind_assignment_matches_convention() {
        let layout = ExamLayout::default();
        assert_eq!(layout.kind_for(1), Some(QuestionType::MultipleChoice));
        assert_eq!(layout.kind_for(22), Some(QuestionType::MultipleChoice));
        assert_eq!(layout.kind_for(23), Some(QuestionType::TrueFalse));
        assert_eq!(layout.kind_for(26), Some(QuestionType::TrueFalse));
        assert_eq!(layout.kind_for(27), Some(QuestionType::MultipleChoice));
        assert_eq!(layout.kind_for(29), Some(QuestionType::FillBlank));
        assert_eq!(layout.kind_for(40), Some(QuestionType::FillBlank));
        assert_eq!(layout.kind_for(41), None);
    }

    #[test]
    fn table_positions_map_low_ids_in_order() {
        let layout = ExamLayout::default();
        assert_eq!(layout.table_position_for(1), Some(0));
        assert_eq!(layout.table_position_for(22), Some(21));
        assert_eq!(layout.table_position_for(23), None);
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let mut layout = ExamLayout::default();
        layout.type_ranges.push(TypeRange {
            start: 20,
            end: 25,
            kind: QuestionType::FillBlank,
        });
        assert!(layout.validate().is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let layout: ExamLayout = toml::from_str(
            r#"
            section_header = "GIẢI CHI TIẾT"

            [[type_ranges]]
            start = 1
            end = 10
            kind = "MultipleChoice"
            "#,
        )
        .unwrap();
        assert_eq!(layout.section_header, "GIẢI CHI TIẾT");
        assert_eq!(layout.type_ranges.len(), 1);
        assert_eq!(layout.fill_delimiter, "/");
    }
}
