//! Change notifications emitted by the table model.

use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::MutationKind;

use super::table::PackageTable;

#[derive(Debug, Clone)]
pub enum ModelEvent {
    ReloadStarted {
        ticket: u64,
    },
    /// A new table replaced the previous one.
    ReloadFinished {
        table: Arc<PackageTable>,
    },
    /// The reload failed; the previous table is still in place.
    ReloadFailed {
        error: String,
    },
    MutationCompleted {
        kind: MutationKind,
        completed: Vec<PathBuf>,
    },
    /// The batch stopped early; `completed` lists what was applied before.
    MutationFailed {
        kind: MutationKind,
        completed: Vec<PathBuf>,
        error: String,
    },
}

/// Receives model events. Closures taking `&ModelEvent` are observers too.
pub trait ModelObserver: Send + Sync {
    fn notify(&self, event: &ModelEvent);
}

impl<F> ModelObserver for F
where
    F: Fn(&ModelEvent) + Send + Sync,
{
    fn notify(&self, event: &ModelEvent) {
        self(event)
    }
}

/// Forwards every event to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ModelObserver for LogObserver {
    fn notify(&self, event: &ModelEvent) {
        match event {
            ModelEvent::ReloadStarted { ticket } => debug!("Reload #{} started", ticket),
            ModelEvent::ReloadFinished { table } => debug!(
                "Reload finished: {} families, {} failed lookup(s)",
                table.row_count(),
                table.failures().len()
            ),
            ModelEvent::ReloadFailed { error } => warn!("Reload failed: {}", error),
            ModelEvent::MutationCompleted { kind, completed } => {
                info!("{}: {} item(s) done", kind, completed.len())
            }
            ModelEvent::MutationFailed {
                kind,
                completed,
                error,
            } => error!(
                "{} failed after {} item(s): {}",
                kind,
                completed.len(),
                error
            ),
        }
    }
}
