//! Package table model.
//!
//! Reconciles the families found in every repository into a ranked table and
//! keeps it current across mutations:
//!
//! - `table` - Snapshot types: cell states, rows, cell views
//! - `reconcile` - Building a snapshot from the package query service
//! - `events` - Notifications for presentation shells
//! - `table_model` - The stateful model: reload tickets, mutations

mod events;
mod reconcile;
mod table;
mod table_model;

pub use events::{LogObserver, ModelEvent, ModelObserver};
pub use reconcile::Reconciler;
pub use table::{
    CellState, CellView, EMPTY_FOLDER_TEXT, EMPTY_FOLDER_TOOLTIP, FAMILY_HEADER, FamilyRow,
    PackageTable, QueryFailure,
};
pub use table_model::{PackageTableModel, ReloadTicket};
