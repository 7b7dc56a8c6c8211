//! Table cell collection
//!
//! The answer key's first block of answers lives in a table. Cells are
//! flattened in row-major order; only their text matters, the position
//! of each non-empty cell is the correlation key.

use super::formatting::extract_paragraph_text;

/// Collect every non-empty cell text of a table, row-major.
pub(crate) fn collect_cell_texts(table: &docx_rs::Table) -> Vec<String> {
    let mut cells = Vec::new();

    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;

        for row_child in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            let mut cell_text = String::new();

            for content in &cell.children {
                match content {
                    docx_rs::TableCellContent::Paragraph(para) => {
                        let text = extract_paragraph_text(para);
                        if !text.is_empty() {
                            if !cell_text.is_empty() {
                                cell_text.push(' ');
                            }
                            cell_text.push_str(&text);
                        }
                    }
                    _ => {
                        // Nested tables do not occur in answer keys
                    }
                }
            }

            if !cell_text.is_empty() {
                cells.push(cell_text);
            }
        }
    }

    cells
}
