use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::config::RepositoryList;
use crate::runtime::Runtime;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Config {
    pub repositories: RepositoryList,
}

impl Config {
    /// Resolve the repository list from the command line, the environment and
    /// the defaults, in that order.
    pub fn load<R: Runtime>(runtime: &R, paths: Vec<PathBuf>, local: Option<PathBuf>) -> Result<Self> {
        let repositories = RepositoryList::resolve(runtime, paths, local)?;
        debug!(
            "Using repositories {:?} (local: {:?})",
            repositories.paths(),
            repositories.local()
        );
        Ok(Self { repositories })
    }
}
