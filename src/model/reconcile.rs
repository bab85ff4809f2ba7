//! Builds a [`PackageTable`] from the package query service.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::Arc;

use crate::config::RepositoryList;
use crate::package::PackageQuery;

use super::table::{CellState, FamilyRow, PackageTable, QueryFailure};

/// Computes table snapshots. Cheap to clone, so a shell can hand one to a worker
/// thread while the model keeps serving the previous table.
pub struct Reconciler<Q: PackageQuery> {
    query: Arc<Q>,
    repositories: RepositoryList,
}

impl<Q: PackageQuery> Clone for Reconciler<Q> {
    fn clone(&self) -> Self {
        Self {
            query: Arc::clone(&self.query),
            repositories: self.repositories.clone(),
        }
    }
}

impl<Q: PackageQuery> Reconciler<Q> {
    pub fn new(query: Arc<Q>, repositories: RepositoryList) -> Self {
        Self {
            query,
            repositories,
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn repositories(&self) -> &RepositoryList {
        &self.repositories
    }

    /// Build a fresh table from the current on-disk state.
    ///
    /// Only a failure to enumerate families is fatal; a failing lookup shows as an
    /// absent cell and is recorded in [`PackageTable::failures`].
    #[tracing::instrument(skip(self))]
    pub fn reload(&self) -> Result<PackageTable> {
        self.query.invalidate_cache();

        let families = self
            .query
            .enumerate_families()
            .context("Failed to enumerate package families")?;
        debug!(
            "Reconciling {} families across {} repositories",
            families.len(),
            self.repositories.len()
        );

        let mut failures = Vec::new();
        let rows = families
            .into_iter()
            .map(|family| self.reconcile_family(family, &mut failures))
            .collect();

        Ok(PackageTable::new(
            self.repositories.paths().to_vec(),
            rows,
            failures,
        ))
    }

    fn reconcile_family(&self, family: String, failures: &mut Vec<QueryFailure>) -> FamilyRow {
        let mut cells = Vec::with_capacity(self.repositories.len());

        for repository in self.repositories.paths() {
            let cell = match self.query.latest_version(&family, repository) {
                Ok(Some(package)) => CellState::Present(package),
                Ok(None) => {
                    let folder = repository.join(&family);
                    if self.query.directory_exists(&folder) {
                        CellState::EmptyFolder(folder)
                    } else {
                        CellState::Absent
                    }
                }
                Err(e) => {
                    warn!("Showing {} in {:?} as absent: {:#}", family, repository, e);
                    failures.push(QueryFailure {
                        family: family.clone(),
                        repository: repository.clone(),
                        message: format!("{:#}", e),
                    });
                    CellState::Absent
                }
            };
            cells.push(cell);
        }

        FamilyRow::new(family, cells)
    }
}
