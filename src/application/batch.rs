//! Batch execution shared by the mutating actions.

use log::{error, info};
use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

/// The mutating operations a user can request on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    DeleteVersion,
    DeleteAllVersions,
    DeleteEmptyFolder,
    Localise,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::DeleteVersion => "delete package version",
            MutationKind::DeleteAllVersions => "delete all package versions",
            MutationKind::DeleteEmptyFolder => "delete empty folder",
            MutationKind::Localise => "localise package",
        };
        f.write_str(name)
    }
}

/// A batch that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub kind: MutationKind,
    /// Paths removed or created, in processing order.
    pub completed: Vec<PathBuf>,
}

/// A batch that stopped at its first failing item. Items before it stay applied.
#[derive(Debug)]
pub struct BatchError {
    pub kind: MutationKind,
    pub completed: Vec<PathBuf>,
    /// The item that failed.
    pub failed: String,
    pub cause: anyhow::Error,
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to {} {} ({} item(s) already done)",
            self.kind,
            self.failed,
            self.completed.len()
        )
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.cause)
    }
}

/// Apply `apply` to each item in order, stopping at the first error.
pub(crate) fn run_batch<T>(
    kind: MutationKind,
    items: impl IntoIterator<Item = T>,
    describe: impl Fn(&T) -> String,
    mut apply: impl FnMut(&T) -> Result<PathBuf>,
) -> Result<BatchOutcome> {
    let mut completed = Vec::new();

    for item in items {
        match apply(&item) {
            Ok(path) => {
                info!("{}: {:?}", kind, path);
                completed.push(path);
            }
            Err(cause) => {
                let failed = describe(&item);
                error!("Failed to {} {}: {:#}", kind, failed, cause);
                return Err(BatchError {
                    kind,
                    completed,
                    failed,
                    cause,
                }
                .into());
            }
        }
    }

    Ok(BatchOutcome { kind, completed })
}

/// Log a refused request and turn it into an error.
pub(crate) fn refuse(kind: MutationKind, reason: String) -> anyhow::Error {
    error!("Refusing to {}: {}", kind, reason);
    anyhow::anyhow!(reason)
}

/// Drop repeated items, keeping the first occurrence.
pub(crate) fn dedup_by_key<T, K: PartialEq>(items: &[T], key: impl Fn(&T) -> K) -> Vec<&T> {
    let mut seen: Vec<K> = Vec::with_capacity(items.len());
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        let k = key(item);
        if !seen.contains(&k) {
            seen.push(k);
            unique.push(item);
        }
    }
    unique
}
