//! Repository configuration.
//!
//! The ordered repository list decides column order and tie-breaks; one of the
//! repositories may be designated local (writable).

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Ordered repository search path, in the platform's path-list syntax.
pub const PACKAGES_PATH_VAR: &str = "REPODECK_PACKAGES_PATH";

/// The writable repository. Only honoured when it is part of the search path.
pub const LOCAL_PACKAGES_PATH_VAR: &str = "REPODECK_LOCAL_PACKAGES_PATH";

/// Ordered list of repository locations, at most one of them local.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepositoryList {
    paths: Vec<PathBuf>,
    local: Option<usize>,
}

impl RepositoryList {
    /// Build a list from explicit paths. `local` designates a repository only if it
    /// appears in `paths`; repeated paths keep their first position.
    pub fn new(paths: Vec<PathBuf>, local: Option<&Path>) -> Self {
        let mut unique: Vec<PathBuf> = Vec::with_capacity(paths.len());
        for path in paths {
            if unique.contains(&path) {
                warn!("Repository {:?} listed more than once, keeping the first", path);
            } else {
                unique.push(path);
            }
        }

        let local = local.and_then(|l| unique.iter().position(|p| p == l));
        Self {
            paths: unique,
            local,
        }
    }

    /// Resolve the configuration from command-line values, falling back to the
    /// environment and then to `~/packages`.
    #[tracing::instrument(skip(runtime))]
    pub fn resolve<R: Runtime>(
        runtime: &R,
        paths: Vec<PathBuf>,
        local: Option<PathBuf>,
    ) -> Result<Self> {
        let paths = if !paths.is_empty() {
            paths
        } else if let Some(value) = non_empty_var(runtime, PACKAGES_PATH_VAR) {
            std::env::split_paths(&value).collect()
        } else {
            vec![default_repository(runtime)?]
        };

        let local = match local {
            Some(path) => path,
            None => match non_empty_var(runtime, LOCAL_PACKAGES_PATH_VAR) {
                Some(value) => PathBuf::from(value),
                None => default_repository(runtime)?,
            },
        };

        let list = Self::new(paths, Some(&local));
        if list.local.is_none() {
            debug!(
                "Local repository {:?} is not in the search path; local operations are disabled",
                local
            );
        }
        Ok(list)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    pub fn index_of(&self, path: &Path) -> Option<usize> {
        self.paths.iter().position(|p| p == path)
    }

    pub fn local_index(&self) -> Option<usize> {
        self.local
    }

    pub fn local(&self) -> Option<&Path> {
        self.local.and_then(|i| self.get(i))
    }

    pub fn is_local(&self, path: &Path) -> bool {
        self.local() == Some(path)
    }
}

fn non_empty_var<R: Runtime>(runtime: &R, key: &str) -> Option<String> {
    runtime.env_var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_repository<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home.join("packages"))
}
