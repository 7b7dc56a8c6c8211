//! Image placeholder bridge
//!
//! Export direction: embedded graphics are replaced by numbered
//! `[Hình ảnh <n>]` placeholders, counted 1-based across the whole
//! document traversal (top-level paragraphs first, then table cells in
//! row-major order). Import direction: placeholders are resolved back
//! to `image<n>.<ext>` assets and re-inserted at a fixed display width.
//! Raw media bytes are pulled straight out of the .docx package.

use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use image::GenericImageView;
use once_cell::sync::Lazy;
use regex::Regex;
use zip::ZipArchive;

use crate::document::io::read_docx_file;
use crate::document::parsing::formatting::{
    collect_formatted_runs, extract_paragraph_text, paragraph_has_drawing,
};
use crate::error::{ExamError, Result};
use crate::export::{build_run, save_docx};

/// Default display width for re-inserted images: 5 inches in EMU.
pub const DEFAULT_DISPLAY_WIDTH_EMU: u32 = 4_572_000;

static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Hình ảnh (\d+)\]").unwrap());

/// Strictly increasing 1-based counter shared across one document
/// traversal. Threaded explicitly through the classifiers and the
/// flatten pass instead of living in process-wide state.
#[derive(Debug, Default)]
pub struct PlaceholderCounter {
    issued: u32,
}

impl PlaceholderCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next placeholder number.
    pub fn next_number(&mut self) -> u32 {
        self.issued += 1;
        self.issued
    }

    /// How many placeholders have been issued so far.
    pub fn issued(&self) -> u32 {
        self.issued
    }
}

/// The literal placeholder text for one image number.
pub fn placeholder_text(number: u32) -> String {
    format!("[Hình ảnh {number}]")
}

/// Extract the image number when the text contains a placeholder.
pub fn placeholder_number(text: &str) -> Option<u32> {
    PLACEHOLDER_PATTERN
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Copy every `word/media/*` entry of the package into `dest_dir`,
/// keeping the conventional `image<n>.<ext>` base names. Returns the
/// extracted paths in name order.
pub fn extract_media(docx_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(docx_path).map_err(|e| ExamError::io(docx_path, e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| ExamError::invalid_document(docx_path, e.to_string()))?;

    let mut extracted = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| ExamError::invalid_document(docx_path, e.to_string()))?;
        let name = entry.name().to_string();

        let Some(base_name) = name.strip_prefix("word/media/") else {
            continue;
        };
        if base_name.is_empty() || base_name.contains('/') {
            continue;
        }

        fs::create_dir_all(dest_dir).map_err(|e| ExamError::io(dest_dir, e))?;
        let out_path = dest_dir.join(base_name);
        let mut out = File::create(&out_path).map_err(|e| ExamError::io(&out_path, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| ExamError::io(&out_path, e))?;
        extracted.push(out_path);
    }

    extracted.sort();
    log::info!(
        "extracted {} media file(s) from {}",
        extracted.len(),
        docx_path.display()
    );
    Ok(extracted)
}

/// Rebuild a document with every graphic-bearing paragraph replaced by
/// its placeholder text. Top-level paragraphs are visited before table
/// cells so both share one counter in a stable order. Returns the new
/// document and the number of placeholders issued.
pub fn flatten_graphics(docx: &docx_rs::Docx) -> (docx_rs::Docx, u32) {
    let mut counter = PlaceholderCounter::new();
    let mut flattened = docx_rs::Docx::new();

    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(para) = child {
            let text = if paragraph_has_drawing(para) {
                placeholder_text(counter.next_number())
            } else {
                extract_paragraph_text(para)
            };
            flattened = flattened
                .add_paragraph(docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(text)));
        }
    }

    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Table(table) = child {
            flattened = flattened.add_table(flatten_table(table, &mut counter));
        }
    }

    let issued = counter.issued();
    (flattened, issued)
}

fn flatten_table(table: &docx_rs::Table, counter: &mut PlaceholderCounter) -> docx_rs::Table {
    let mut rows = Vec::new();

    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;
        let mut cells = Vec::new();

        for row_child in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            let mut new_cell = docx_rs::TableCell::new();

            for content in &cell.children {
                if let docx_rs::TableCellContent::Paragraph(para) = content {
                    let text = if paragraph_has_drawing(para) {
                        placeholder_text(counter.next_number())
                    } else {
                        extract_paragraph_text(para)
                    };
                    new_cell = new_cell.add_paragraph(
                        docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(text)),
                    );
                }
            }

            cells.push(new_cell);
        }

        rows.push(docx_rs::TableRow::new(cells));
    }

    docx_rs::Table::new(rows)
}

/// Directory of `image<n>.<ext>` assets, indexed by number.
#[derive(Debug, Default)]
pub struct ImageStore {
    assets: BTreeMap<u32, PathBuf>,
}

static ASSET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^image(\d+)\.(?:png|jpe?g|gif|bmp)$").unwrap());

impl ImageStore {
    /// Index a directory by the asset naming convention. Files that do
    /// not match the convention are ignored.
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut assets = BTreeMap::new();

        let entries = fs::read_dir(dir).map_err(|e| ExamError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| ExamError::io(dir, e))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(caps) = ASSET_PATTERN.captures(&name.to_ascii_lowercase()) {
                if let Ok(number) = caps[1].parse::<u32>() {
                    assets.insert(number, entry.path());
                }
            }
        }

        Ok(Self { assets })
    }

    pub fn get(&self, number: u32) -> Option<&Path> {
        self.assets.get(&number).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Rebuild `input`, appending the stored image to every paragraph whose
/// text carries a placeholder. A placeholder with no matching asset
/// keeps its text and is reported as a warning, never an error.
/// Returns the number of images inserted.
pub fn restore_images(
    input: &Path,
    output: &Path,
    store: &ImageStore,
    display_width_emu: u32,
) -> Result<u32> {
    let docx = read_docx_file(input)?;
    let mut restored = docx_rs::Docx::new();
    let mut inserted = 0;

    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let runs = collect_formatted_runs(para);
                let plain: String = runs.iter().map(|run| run.text.as_str()).collect();

                let mut new_para = docx_rs::Paragraph::new();
                for run in &runs {
                    new_para = new_para.add_run(build_run(run));
                }

                if let Some(number) = placeholder_number(&plain) {
                    match store.get(number) {
                        Some(asset) => {
                            new_para = new_para.add_run(image_run(asset, display_width_emu)?);
                            inserted += 1;
                        }
                        None => {
                            log::warn!(
                                "no asset image{number} for placeholder, leaving text in place"
                            );
                        }
                    }
                }

                restored = restored.add_paragraph(new_para);
            }
            docx_rs::DocumentChild::Table(table) => {
                restored = restored.add_table(copy_table(table));
            }
            _ => {}
        }
    }

    save_docx(restored, output)?;
    log::info!("inserted {inserted} image(s) into {}", output.display());
    Ok(inserted)
}

fn image_run(asset: &Path, display_width_emu: u32) -> Result<docx_rs::Run> {
    let data = fs::read(asset).map_err(|e| ExamError::io(asset, e))?;
    let (px_width, px_height) = image::load_from_memory(&data)
        .map_err(|e| ExamError::invalid_document(asset, format!("unreadable image: {e}")))?
        .dimensions();

    // Fixed display width, aspect ratio preserved
    let height_emu =
        (display_width_emu as u64 * px_height as u64 / px_width.max(1) as u64) as u32;
    let pic = docx_rs::Pic::new(&data).size(display_width_emu, height_emu);

    Ok(docx_rs::Run::new().add_image(pic))
}

fn copy_table(table: &docx_rs::Table) -> docx_rs::Table {
    let mut rows = Vec::new();

    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;
        let mut cells = Vec::new();

        for row_child in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            let mut new_cell = docx_rs::TableCell::new();

            for content in &cell.children {
                if let docx_rs::TableCellContent::Paragraph(para) = content {
                    new_cell = new_cell.add_paragraph(
                        docx_rs::Paragraph::new()
                            .add_run(docx_rs::Run::new().add_text(extract_paragraph_text(para))),
                    );
                }
            }

            cells.push(new_cell);
        }

        rows.push(docx_rs::TableRow::new(cells));
    }

    docx_rs::Table::new(rows)
}
