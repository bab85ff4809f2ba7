use anyhow::Result;
use std::path::{Path, PathBuf};

use super::PackageRef;

/// The package-repository service the table model is built on.
///
/// Implementations answer "what is the newest version of this family in this
/// repository" and perform the physical deletes and copies. They may cache
/// lookups; callers invalidate the cache before every full reload.
#[cfg_attr(test, mockall::automock)]
pub trait PackageQuery: Send + Sync {
    /// All family names known to any repository, without duplicates.
    fn enumerate_families(&self) -> Result<Vec<String>>;

    /// Newest version of `family` inside `repository` only.
    fn latest_version(&self, family: &str, repository: &Path) -> Result<Option<PackageRef>>;

    /// Forget cached lookups so the next queries see the current disk state.
    fn invalidate_cache(&self);

    fn directory_exists(&self, path: &Path) -> bool;

    /// Entries directly inside `path`.
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    fn delete_path(&self, path: &Path, recursive: bool) -> Result<()>;

    /// Copy `package` into `destination`, returning the new version directory.
    fn copy_package(
        &self,
        package: &PackageRef,
        destination: &Path,
        preserve_timestamps: bool,
    ) -> Result<PathBuf>;
}
