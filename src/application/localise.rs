//! Localise action - copies packages from other repositories into the local one.

use anyhow::Result;
use log::debug;

use crate::config::RepositoryList;
use crate::package::{PackageQuery, PackageRef};

use super::batch::{BatchOutcome, MutationKind, dedup_by_key, refuse, run_batch};

pub struct LocaliseAction<'a, Q: PackageQuery> {
    query: &'a Q,
    repositories: &'a RepositoryList,
}

impl<'a, Q: PackageQuery> LocaliseAction<'a, Q> {
    pub fn new(query: &'a Q, repositories: &'a RepositoryList) -> Self {
        Self {
            query,
            repositories,
        }
    }

    /// Copy each package into the local repository, keeping file timestamps.
    /// Sources are left untouched.
    #[tracing::instrument(skip(self, packages), fields(count = packages.len()))]
    pub fn localise(&self, packages: &[PackageRef]) -> Result<BatchOutcome> {
        let kind = MutationKind::Localise;
        let Some(local) = self.repositories.local() else {
            return Err(refuse(
                kind,
                "No local repository is configured; nothing can be localised".to_string(),
            ));
        };

        if let Some(already) = packages.iter().find(|p| p.is_in(local)) {
            return Err(refuse(
                kind,
                format!(
                    "{} is already in the local repository {:?}",
                    already.qualified_name(),
                    local
                ),
            ));
        }

        let targets = dedup_by_key(packages, PackageRef::version_dir);
        run_batch(kind, targets, |p| p.qualified_name(), |p| {
            debug!("Localising {} from {:?}", p.qualified_name(), p.repository);
            self.query.copy_package(p, local, true)
        })
    }
}
