use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::package::{PackageRef, Version};

/// Display text of a cell whose family folder exists without any version.
pub const EMPTY_FOLDER_TEXT: &str = "-";

/// Tooltip of a cell whose family folder exists without any version.
pub const EMPTY_FOLDER_TOOLTIP: &str = "[Empty folder]";

/// Header of the family-name column.
pub const FAMILY_HEADER: &str = "Package";

/// What one repository holds for one family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum CellState {
    /// Latest version present in the repository.
    Present(PackageRef),
    /// No version, but the family folder is still there.
    EmptyFolder(PathBuf),
    Absent,
}

impl CellState {
    pub fn package(&self) -> Option<&PackageRef> {
        match self {
            CellState::Present(package) => Some(package),
            _ => None,
        }
    }

    pub fn version(&self) -> Option<&Version> {
        self.package().map(|p| &p.version)
    }

    pub fn empty_folder(&self) -> Option<&Path> {
        match self {
            CellState::EmptyFolder(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, CellState::Present(_))
    }

    pub fn display_text(&self) -> String {
        match self {
            CellState::Present(package) => package.version.to_string(),
            CellState::EmptyFolder(_) => EMPTY_FOLDER_TEXT.to_string(),
            CellState::Absent => String::new(),
        }
    }

    pub fn tooltip(&self) -> String {
        match self {
            CellState::Present(package) => package.meta.summary(),
            CellState::EmptyFolder(_) => EMPTY_FOLDER_TOOLTIP.to_string(),
            CellState::Absent => String::new(),
        }
    }
}

/// One family across all repositories, in repository order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyRow {
    family: String,
    cells: Vec<CellState>,
    winning_version: Option<Version>,
    winner: Option<usize>,
}

impl FamilyRow {
    /// Build a row and rank it: the winning version is the highest present one,
    /// the winner the first repository holding it.
    pub fn new(family: impl Into<String>, cells: Vec<CellState>) -> Self {
        let winning_version = cells.iter().filter_map(CellState::version).max().cloned();
        let winner = winning_version
            .as_ref()
            .and_then(|w| cells.iter().position(|c| c.version() == Some(w)));

        Self {
            family: family.into(),
            cells,
            winning_version,
            winner,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn cell(&self, repository: usize) -> Option<&CellState> {
        self.cells.get(repository)
    }

    pub fn winning_version(&self) -> Option<&Version> {
        self.winning_version.as_ref()
    }

    /// Repository index of the winning cell.
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    pub fn is_winner(&self, repository: usize) -> bool {
        self.winner == Some(repository)
    }
}

/// A lookup that failed while the table was built. The cell shows as absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryFailure {
    pub family: String,
    pub repository: PathBuf,
    pub message: String,
}

/// Snapshot of every family across every repository.
///
/// Column 0 is the family name, column `i + 1` is repository `i`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PackageTable {
    repositories: Vec<PathBuf>,
    rows: Vec<FamilyRow>,
    failures: Vec<QueryFailure>,
}

impl PackageTable {
    pub fn new(repositories: Vec<PathBuf>, rows: Vec<FamilyRow>, failures: Vec<QueryFailure>) -> Self {
        Self {
            repositories,
            rows,
            failures,
        }
    }

    pub fn repositories(&self) -> &[PathBuf] {
        &self.repositories
    }

    pub fn rows(&self) -> &[FamilyRow] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&FamilyRow> {
        self.rows.get(row)
    }

    pub fn failures(&self) -> &[QueryFailure] {
        &self.failures
    }

    /// Row index and row of a family.
    pub fn find(&self, family: &str) -> Option<(usize, &FamilyRow)> {
        self.rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.family == family)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.repositories.len() + 1
    }

    pub fn header(&self, column: usize) -> Option<String> {
        match column {
            0 => Some(FAMILY_HEADER.to_string()),
            c => self
                .repositories
                .get(c - 1)
                .map(|p| p.display().to_string()),
        }
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<CellView<'_>> {
        let family_row = self.rows.get(row)?;
        if column == 0 {
            return Some(CellView {
                family: &family_row.family,
                repository: None,
                state: None,
                is_winner: false,
            });
        }

        let index = column - 1;
        Some(CellView {
            family: &family_row.family,
            repository: Some(self.repositories.get(index)?),
            state: Some(family_row.cells.get(index)?),
            is_winner: family_row.is_winner(index),
        })
    }
}

/// Read-only view of one table cell, with the text a shell renders for it.
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    family: &'a str,
    repository: Option<&'a Path>,
    state: Option<&'a CellState>,
    is_winner: bool,
}

impl<'a> CellView<'a> {
    pub fn family(&self) -> &'a str {
        self.family
    }

    /// Repository of the column; `None` for the family-name column.
    pub fn repository(&self) -> Option<&'a Path> {
        self.repository
    }

    /// Cell state; `None` for the family-name column.
    pub fn state(&self) -> Option<&'a CellState> {
        self.state
    }

    pub fn text(&self) -> String {
        match self.state {
            Some(state) => state.display_text(),
            None => self.family.to_string(),
        }
    }

    pub fn tooltip(&self) -> String {
        self.state.map(CellState::tooltip).unwrap_or_default()
    }

    pub fn is_winner(&self) -> bool {
        self.is_winner
    }

    pub fn package(&self) -> Option<&'a PackageRef> {
        self.state.and_then(CellState::package)
    }

    pub fn empty_folder(&self) -> Option<&'a Path> {
        self.state.and_then(CellState::empty_folder)
    }

    /// Folder holding the cell's package version.
    pub fn version_folder(&self) -> Option<PathBuf> {
        self.package().map(PackageRef::version_dir)
    }
}
