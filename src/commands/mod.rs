//! Terminal front end for the package table.
//!
//! Each command resolves family names to table cells, runs the model
//! operation and prints the result.

use anyhow::Result;
use std::sync::Arc;

use crate::application::{BatchError, BatchOutcome};
use crate::model::{LogObserver, PackageTableModel};
use crate::package::FsPackageRepository;
use crate::runtime::Runtime;

pub mod config;
mod delete;
mod list;
mod localise;
mod path;
mod prune;
mod render;
mod show;

pub use delete::delete;
pub use list::list;
pub use localise::localise;
pub use path::path;
pub use prune::prune;
pub use show::show;

use config::Config;

type Model<R> = PackageTableModel<FsPackageRepository<R>>;

/// Build the model over the filesystem repositories and load the table.
fn open_model<R: Runtime>(runtime: R, config: Config) -> Result<Model<R>> {
    let query = FsPackageRepository::new(runtime, config.repositories.paths().to_vec());
    let mut model = PackageTableModel::new(Arc::new(query), config.repositories);
    model.subscribe(LogObserver);
    model.reload()?;
    Ok(model)
}

/// Print what a batch changed, including the part of a failed batch that went through.
fn report(result: Result<BatchOutcome>, verb: &str) -> Result<()> {
    match result {
        Ok(outcome) => {
            for path in &outcome.completed {
                println!("{} {}", verb, path.display());
            }
            Ok(())
        }
        Err(e) => {
            if let Some(batch) = e.downcast_ref::<BatchError>() {
                for path in &batch.completed {
                    println!("{} {}", verb, path.display());
                }
            }
            Err(e)
        }
    }
}
