use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{PackageMeta, Version};

/// A specific installed package version in one repository.
///
/// Produced by a [`PackageQuery`](super::PackageQuery); read-only afterwards and
/// handed back to the query for deletion or copying.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageRef {
    pub family: String,
    pub version: Version,
    pub repository: PathBuf,
    #[serde(skip)]
    pub meta: PackageMeta,
}

impl PackageRef {
    pub fn new(
        family: impl Into<String>,
        version: Version,
        repository: impl Into<PathBuf>,
        meta: PackageMeta,
    ) -> Self {
        Self {
            family: family.into(),
            version,
            repository: repository.into(),
            meta,
        }
    }

    /// `<repository>/<family>`
    pub fn family_dir(&self) -> PathBuf {
        self.repository.join(&self.family)
    }

    /// `<repository>/<family>/<version>`
    pub fn version_dir(&self) -> PathBuf {
        self.family_dir().join(self.version.as_str())
    }

    pub fn is_in(&self, repository: &Path) -> bool {
        self.repository == repository
    }

    /// `family-version`, the usual way of naming a package in messages.
    pub fn qualified_name(&self) -> String {
        format!("{}-{}", self.family, self.version)
    }
}
