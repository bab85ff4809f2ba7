use anyhow::{Result, bail};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::{BatchError, BatchOutcome, DeleteAction, LocaliseAction, MutationKind};
use crate::config::RepositoryList;
use crate::package::{PackageQuery, PackageRef};

use super::events::{ModelEvent, ModelObserver};
use super::reconcile::Reconciler;
use super::table::{CellView, PackageTable};

/// Handle for one reload request. Only the most recently issued ticket may
/// replace the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReloadTicket(u64);

impl ReloadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Presentation-facing table of families across repositories.
///
/// Holds the current [`PackageTable`], runs mutations through the application
/// actions and refreshes itself after every batch that changed something.
/// Mutating calls take `&mut self`, so at most one operation runs at a time.
pub struct PackageTableModel<Q: PackageQuery> {
    reconciler: Reconciler<Q>,
    table: Arc<PackageTable>,
    observers: Vec<Box<dyn ModelObserver>>,
    issued: u64,
    pending: Option<ReloadTicket>,
}

impl<Q: PackageQuery> PackageTableModel<Q> {
    /// Create an empty model. Call [`reload`](Self::reload) to populate it.
    pub fn new(query: Arc<Q>, repositories: RepositoryList) -> Self {
        let table = PackageTable::new(repositories.paths().to_vec(), vec![], vec![]);
        Self {
            reconciler: Reconciler::new(query, repositories),
            table: Arc::new(table),
            observers: Vec::new(),
            issued: 0,
            pending: None,
        }
    }

    pub fn subscribe(&mut self, observer: impl ModelObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn query(&self) -> &Q {
        self.reconciler.query()
    }

    pub fn repositories(&self) -> &RepositoryList {
        self.reconciler.repositories()
    }

    pub fn local_repository_index(&self) -> Option<usize> {
        self.repositories().local_index()
    }

    /// The current snapshot. Stays valid after later reloads.
    pub fn table(&self) -> Arc<PackageTable> {
        Arc::clone(&self.table)
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    pub fn header(&self, column: usize) -> Option<String> {
        self.table.header(column)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<CellView<'_>> {
        self.table.cell(row, column)
    }

    /// Whether a reload was started and has not completed yet.
    pub fn is_reloading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a reload. The returned ticket supersedes every earlier one; the
    /// caller computes the table with [`reconciler`](Self::reconciler), possibly on
    /// another thread, and hands it to [`complete_reload`](Self::complete_reload).
    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.issued += 1;
        let ticket = ReloadTicket(self.issued);
        if let Some(previous) = self.pending.replace(ticket) {
            debug!("Reload #{} superseded by #{}", previous.0, ticket.0);
        }
        self.emit(ModelEvent::ReloadStarted { ticket: ticket.0 });
        ticket
    }

    pub fn reconciler(&self) -> Reconciler<Q> {
        self.reconciler.clone()
    }

    /// Finish a reload. Returns `false` when the ticket was superseded and the
    /// result discarded. A failed reload keeps the previous table.
    pub fn complete_reload(
        &mut self,
        ticket: ReloadTicket,
        result: Result<PackageTable>,
    ) -> Result<bool> {
        if self.pending != Some(ticket) {
            debug!("Discarding result of superseded reload #{}", ticket.0);
            return Ok(false);
        }
        self.pending = None;

        match result {
            Ok(table) => {
                self.table = Arc::new(table);
                self.emit(ModelEvent::ReloadFinished {
                    table: Arc::clone(&self.table),
                });
                Ok(true)
            }
            Err(e) => {
                self.emit(ModelEvent::ReloadFailed {
                    error: format!("{:#}", e),
                });
                Err(e)
            }
        }
    }

    /// Give up on a reload whose result will never arrive.
    pub fn abandon_reload(&mut self, ticket: ReloadTicket) {
        if self.pending == Some(ticket) {
            debug!("Reload #{} abandoned", ticket.0);
            self.pending = None;
        }
    }

    /// Rebuild the table from the current on-disk state.
    pub fn reload(&mut self) -> Result<()> {
        let ticket = self.begin_reload();
        let result = self.reconciler.reload();
        self.complete_reload(ticket, result)?;
        Ok(())
    }

    /// Delete package versions from the local repository, or whole families
    /// when `all_versions` is set.
    pub fn delete_local(&mut self, packages: &[PackageRef], all_versions: bool) -> Result<BatchOutcome> {
        let kind = if all_versions {
            MutationKind::DeleteAllVersions
        } else {
            MutationKind::DeleteVersion
        };
        self.ensure_idle(kind)?;

        let result = self.delete_action().delete_local(packages, all_versions);
        self.finish_batch(kind, result)
    }

    /// Delete family folders of the local repository that hold no version.
    pub fn delete_empty_folders(&mut self, folders: &[PathBuf]) -> Result<BatchOutcome> {
        let kind = MutationKind::DeleteEmptyFolder;
        self.ensure_idle(kind)?;

        let result = self.delete_action().delete_empty_folders(folders);
        self.finish_batch(kind, result)
    }

    /// Copy packages from other repositories into the local one.
    pub fn localise(&mut self, packages: &[PackageRef]) -> Result<BatchOutcome> {
        let kind = MutationKind::Localise;
        self.ensure_idle(kind)?;

        let action = LocaliseAction::new(self.reconciler.query(), self.reconciler.repositories());
        let result = action.localise(packages);
        self.finish_batch(kind, result)
    }

    fn delete_action(&self) -> DeleteAction<'_, Q> {
        DeleteAction::new(self.reconciler.query(), self.reconciler.repositories())
    }

    fn ensure_idle(&self, kind: MutationKind) -> Result<()> {
        if let Some(ticket) = self.pending {
            bail!("Cannot {} while reload #{} is in progress", kind, ticket.0);
        }
        Ok(())
    }

    fn finish_batch(&mut self, kind: MutationKind, result: Result<BatchOutcome>) -> Result<BatchOutcome> {
        let completed = match &result {
            Ok(outcome) => {
                self.emit(ModelEvent::MutationCompleted {
                    kind,
                    completed: outcome.completed.clone(),
                });
                outcome.completed.len()
            }
            Err(e) => {
                let completed = e
                    .downcast_ref::<BatchError>()
                    .map(|b| b.completed.clone())
                    .unwrap_or_default();
                let count = completed.len();
                self.emit(ModelEvent::MutationFailed {
                    kind,
                    completed,
                    error: format!("{:#}", e),
                });
                count
            }
        };

        if completed > 0
            && let Err(e) = self.reload()
        {
            warn!("Failed to refresh after {}: {:#}", kind, e);
        }
        result
    }

    fn emit(&self, event: ModelEvent) {
        for observer in &self.observers {
            observer.notify(&event);
        }
    }
}
