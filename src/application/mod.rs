//! Application layer - Mutating use cases on top of the package query service.
//!
//! Every action checks its preconditions for the whole batch before touching
//! the filesystem, then processes items in order and stops at the first
//! failure. The table model runs these and refreshes afterwards.

mod batch;
mod delete;
mod localise;

pub use batch::{BatchError, BatchOutcome, MutationKind};
pub use delete::DeleteAction;
pub use localise::LocaliseAction;
