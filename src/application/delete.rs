//! Delete action - removes packages and empty family folders from the local repository.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::config::RepositoryList;
use crate::package::{PackageQuery, PackageRef};

use super::batch::{BatchOutcome, MutationKind, dedup_by_key, refuse, run_batch};

/// Delete action - every target must live in the local repository.
pub struct DeleteAction<'a, Q: PackageQuery> {
    query: &'a Q,
    repositories: &'a RepositoryList,
}

impl<'a, Q: PackageQuery> DeleteAction<'a, Q> {
    pub fn new(query: &'a Q, repositories: &'a RepositoryList) -> Self {
        Self {
            query,
            repositories,
        }
    }

    /// Delete local packages.
    ///
    /// With `all_versions` the whole family folder goes. Otherwise only the
    /// version folder, unless it is the family's last entry, in which case the
    /// family folder goes with it.
    #[tracing::instrument(skip(self, packages), fields(count = packages.len()))]
    pub fn delete_local(&self, packages: &[PackageRef], all_versions: bool) -> Result<BatchOutcome> {
        let kind = if all_versions {
            MutationKind::DeleteAllVersions
        } else {
            MutationKind::DeleteVersion
        };
        let local = self.local_repository(kind)?;

        if let Some(outside) = packages.iter().find(|p| !p.is_in(local)) {
            return Err(refuse(
                kind,
                format!(
                    "{} is in {:?}, not in the local repository {:?}",
                    outside.qualified_name(),
                    outside.repository,
                    local
                ),
            ));
        }

        let targets = if all_versions {
            dedup_by_key(packages, |p| p.family.clone())
        } else {
            dedup_by_key(packages, PackageRef::version_dir)
        };

        run_batch(kind, targets, |p| p.qualified_name(), |p| {
            let target = if all_versions {
                p.family_dir()
            } else {
                self.version_removal_target(p)?
            };
            debug!("Removing {:?}", target);
            self.query.delete_path(&target, true)?;
            Ok(target)
        })
    }

    /// Delete family folders that hold no package version.
    #[tracing::instrument(skip(self, folders), fields(count = folders.len()))]
    pub fn delete_empty_folders(&self, folders: &[PathBuf]) -> Result<BatchOutcome> {
        let kind = MutationKind::DeleteEmptyFolder;
        let local = self.local_repository(kind)?;

        if let Some(outside) = folders.iter().find(|f| f.parent() != Some(local)) {
            return Err(refuse(
                kind,
                format!(
                    "{:?} is not a family folder of the local repository {:?}",
                    outside, local
                ),
            ));
        }

        let targets = dedup_by_key(folders, |f| f.clone());
        run_batch(kind, targets, |f| format!("{:?}", f), |f| {
            self.query.delete_path(f, true)?;
            Ok(f.to_path_buf())
        })
    }

    /// The folder to remove for a single version: the family folder when the
    /// version is its only entry, the version folder otherwise.
    pub fn version_removal_target(&self, package: &PackageRef) -> Result<PathBuf> {
        let family_dir = package.family_dir();
        let version_dir = package.version_dir();
        let entries = self.query.list_dir(&family_dir)?;

        if entries.len() == 1 && entries[0] == version_dir {
            debug!("{} is the last entry of {:?}", package.qualified_name(), family_dir);
            Ok(family_dir)
        } else {
            Ok(version_dir)
        }
    }

    fn local_repository(&self, kind: MutationKind) -> Result<&'a Path> {
        self.repositories
            .local()
            .ok_or_else(|| refuse(kind, "No local repository is configured".to_string()))
    }
}
