//! Plain-text rendering of the package table.

use crate::model::{CellState, FamilyRow, PackageTable};

/// Suffix marking the winning cell of a row.
const WINNER_MARK: &str = "*";

/// Render the table as aligned columns: a header line, then one line per family.
pub fn render_table(table: &PackageTable) -> String {
    let mut lines: Vec<Vec<String>> = Vec::with_capacity(table.row_count() + 1);
    lines.push(
        (0..table.column_count())
            .filter_map(|c| table.header(c))
            .collect(),
    );
    for row in table.rows() {
        lines.push(row_cells(row));
    }

    let mut widths = vec![0; table.column_count()];
    for line in &lines {
        for (width, text) in widths.iter_mut().zip(line) {
            *width = (*width).max(text.chars().count());
        }
    }

    lines
        .iter()
        .map(|line| {
            let padded: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(text, width)| format!("{:<width$}", text, width = *width))
                .collect();
            padded.join("  ").trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn row_cells(row: &FamilyRow) -> Vec<String> {
    let mut cells = vec![row.family().to_string()];
    for (index, cell) in row.cells().iter().enumerate() {
        let mut text = cell.display_text();
        if row.is_winner(index) {
            text.push_str(WINNER_MARK);
        }
        cells.push(text);
    }
    cells
}

/// Lookups that failed while the table was built, or `None` when all succeeded.
pub fn render_failures(table: &PackageTable) -> Option<String> {
    if table.failures().is_empty() {
        return None;
    }

    let mut lines = vec!["Failed lookups:".to_string()];
    for failure in table.failures() {
        lines.push(format!(
            "  {} in {}: {}",
            failure.family,
            failure.repository.display(),
            failure.message
        ));
    }
    Some(lines.join("\n"))
}

/// Everything the table knows about one family, repository by repository.
pub fn render_family(table: &PackageTable, row: &FamilyRow) -> String {
    let mut lines = vec![format!("Package: {}", row.family())];

    for (index, cell) in row.cells().iter().enumerate() {
        let repository = table
            .repositories()
            .get(index)
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let status = match cell {
            CellState::Absent => "(not present)".to_string(),
            _ if row.is_winner(index) => format!("{} (winner)", cell.display_text()),
            _ => cell.display_text(),
        };
        lines.push(format!("{}: {}", repository, status));

        for line in cell.tooltip().lines() {
            lines.push(format!("    {}", line));
        }
    }

    lines.join("\n")
}
