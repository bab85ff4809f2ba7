//! Filesystem package repositories.
//!
//! [`FsPackageRepository`] answers [`PackageQuery`] calls for an ordered list of
//! repository directories laid out as `<repository>/<family>/<version>/package.json`.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::runtime::Runtime;

use super::{PACKAGE_FILE, PackageMeta, PackageQuery, PackageRef, find_families, find_versions};

type LatestCache = HashMap<(PathBuf, String), Option<PackageRef>>;

pub struct FsPackageRepository<R: Runtime> {
    runtime: R,
    repositories: Vec<PathBuf>,
    latest: Mutex<LatestCache>,
}

impl<R: Runtime> FsPackageRepository<R> {
    pub fn new(runtime: R, repositories: Vec<PathBuf>) -> Self {
        Self {
            runtime,
            repositories,
            latest: Mutex::new(HashMap::new()),
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn repositories(&self) -> &[PathBuf] {
        &self.repositories
    }

    fn cache(&self) -> MutexGuard<'_, LatestCache> {
        // The cache only ever holds complete entries, so a poisoned lock is still usable.
        self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lookup_latest(&self, family: &str, repository: &Path) -> Result<Option<PackageRef>> {
        let family_dir = repository.join(family);
        let Some(latest) = find_versions(&self.runtime, &family_dir)?.into_iter().max() else {
            return Ok(None);
        };

        let meta_path = family_dir.join(latest.as_str()).join(PACKAGE_FILE);
        let meta = PackageMeta::load(&self.runtime, &meta_path)?;
        Ok(Some(PackageRef::new(family, latest, repository, meta)))
    }

    fn copy_tree(&self, from: &Path, to: &Path, preserve_timestamps: bool) -> Result<()> {
        self.runtime.create_dir_all(to)?;

        for entry in self.runtime.read_dir(from)? {
            let Some(name) = entry.file_name() else {
                continue;
            };
            let target = to.join(name);

            if self.runtime.is_symlink(&entry) {
                // Links are recreated as links, whether or not their target exists.
                let original = self.runtime.read_link(&entry)?;
                self.runtime.symlink(&original, &target)?;
            } else if self.runtime.is_dir(&entry) {
                self.copy_tree(&entry, &target, preserve_timestamps)?;
            } else {
                self.runtime.copy(&entry, &target)?;
                if preserve_timestamps {
                    self.runtime.copy_times(&entry, &target)?;
                }
            }
        }

        // Last, since creating entries touches the directory's own times.
        if preserve_timestamps {
            self.runtime.copy_times(from, to)?;
        }
        Ok(())
    }

    fn discard_partial_copy(&self, staging: &Path, family_dir: &Path, created_family_dir: bool) {
        if self.runtime.exists(staging)
            && let Err(e) = self.runtime.remove_dir_all(staging)
        {
            warn!("Failed to remove partial copy {:?}: {:#}", staging, e);
        }
        if created_family_dir
            && let Err(e) = self.runtime.remove_dir(family_dir)
        {
            warn!("Failed to remove {:?}: {:#}", family_dir, e);
        }
    }
}

impl<R: Runtime> PackageQuery for FsPackageRepository<R> {
    #[tracing::instrument(skip(self))]
    fn enumerate_families(&self) -> Result<Vec<String>> {
        let mut families: Vec<String> = Vec::new();

        for repository in &self.repositories {
            if !self.runtime.exists(repository) {
                debug!("Repository {:?} does not exist, skipping", repository);
                continue;
            }
            let found = find_families(&self.runtime, repository)
                .with_context(|| format!("Failed to list families in {:?}", repository))?;
            for family in found {
                if !families.contains(&family) {
                    families.push(family);
                }
            }
        }

        Ok(families)
    }

    #[tracing::instrument(skip(self))]
    fn latest_version(&self, family: &str, repository: &Path) -> Result<Option<PackageRef>> {
        let key = (repository.to_path_buf(), family.to_string());
        if let Some(hit) = self.cache().get(&key) {
            return Ok(hit.clone());
        }

        let found = self
            .lookup_latest(family, repository)
            .with_context(|| format!("Failed to query {} in {:?}", family, repository))?;
        self.cache().insert(key, found.clone());
        Ok(found)
    }

    fn invalidate_cache(&self) {
        let mut cache = self.cache();
        debug!("Dropping {} cached lookup(s)", cache.len());
        cache.clear();
    }

    fn directory_exists(&self, path: &Path) -> bool {
        self.runtime.is_dir(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.runtime.read_dir(path)
    }

    #[tracing::instrument(skip(self))]
    fn delete_path(&self, path: &Path, recursive: bool) -> Result<()> {
        if recursive {
            self.runtime.remove_dir_all(path)
        } else {
            self.runtime.remove_dir(path)
        }
    }

    #[tracing::instrument(skip(self, package), fields(package = %package.qualified_name()))]
    fn copy_package(
        &self,
        package: &PackageRef,
        destination: &Path,
        preserve_timestamps: bool,
    ) -> Result<PathBuf> {
        let source = package.version_dir();
        if !self.runtime.is_dir(&source) {
            anyhow::bail!(
                "Package {} not found at {:?}",
                package.qualified_name(),
                source
            );
        }

        let family_dir = destination.join(&package.family);
        let target = family_dir.join(package.version.as_str());
        if self.runtime.exists(&target) {
            anyhow::bail!(
                "Package {} already exists in {:?}",
                package.qualified_name(),
                destination
            );
        }

        let staging = family_dir.join(format!(".{}.partial", package.version));
        if self.runtime.exists(&staging) {
            debug!("Removing leftover partial copy {:?}", staging);
            self.runtime.remove_dir_all(&staging)?;
        }

        let created_family_dir = !self.runtime.exists(&family_dir);
        self.runtime.create_dir_all(&family_dir)?;

        debug!("Copying {:?} to {:?}", source, target);
        let copied = self
            .copy_tree(&source, &staging, preserve_timestamps)
            .and_then(|_| self.runtime.rename(&staging, &target));

        if let Err(e) = copied {
            self.discard_partial_copy(&staging, &family_dir, created_family_dir);
            return Err(e.context(format!(
                "Failed to copy {} into {:?}",
                package.qualified_name(),
                destination
            )));
        }

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Version;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::tempdir;

    fn write_version(root: &Path, family: &str, version: &str, json: &str) {
        let dir = root.join(family).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PACKAGE_FILE), json).unwrap();
    }

    #[test]
    fn test_enumerate_families_dedups_in_repository_order() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local");
        let remote = dir.path().join("remote");
        write_version(&local, "zlib", "1.0", "{}");
        write_version(&remote, "boost", "1.80", "{}");
        write_version(&remote, "zlib", "1.2", "{}");
        fs::create_dir_all(local.join("empty")).unwrap();

        let repo = FsPackageRepository::new(
            RealRuntime,
            vec![local, dir.path().join("missing"), remote],
        );

        assert_eq!(
            repo.enumerate_families().unwrap(),
            vec!["empty", "zlib", "boost"]
        );
    }

    #[test]
    fn test_latest_version_picks_semantic_max() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        write_version(&root, "foo", "1.9.0", "{}");
        write_version(&root, "foo", "1.10.0", r#"{"description": "newest"}"#);
        write_version(&root, "foo", "1.2.0", "{}");

        let repo = FsPackageRepository::new(RealRuntime, vec![root.clone()]);
        let latest = repo.latest_version("foo", &root).unwrap().unwrap();

        assert_eq!(latest.version, Version::parse("1.10.0"));
        assert_eq!(latest.repository, root);
        assert_eq!(latest.meta.description.as_deref(), Some("newest"));
        assert!(repo.latest_version("bar", &root).unwrap().is_none());
    }

    #[test]
    fn test_latest_version_malformed_definition_is_error() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        write_version(&root, "foo", "1.0", "not json");

        let repo = FsPackageRepository::new(RealRuntime, vec![root.clone()]);
        let err = repo.latest_version("foo", &root).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to query foo"));
    }

    #[test]
    fn test_latest_version_is_cached_until_invalidated() {
        let mut runtime = MockRuntime::new();
        let family_dir = PathBuf::from("/repo/foo");

        // Two lookups reach the disk: before and after invalidation
        runtime
            .expect_is_dir()
            .with(eq(family_dir.clone()))
            .times(2)
            .returning(|_| false);

        let repo = FsPackageRepository::new(runtime, vec![PathBuf::from("/repo")]);
        let root = PathBuf::from("/repo");

        assert!(repo.latest_version("foo", &root).unwrap().is_none());
        assert!(repo.latest_version("foo", &root).unwrap().is_none());
        repo.invalidate_cache();
        assert!(repo.latest_version("foo", &root).unwrap().is_none());
    }

    #[test]
    fn test_delete_path_recursive_and_not() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_remove_dir_all()
            .with(eq(PathBuf::from("/repo/foo")))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_remove_dir()
            .with(eq(PathBuf::from("/repo/bar")))
            .times(1)
            .returning(|_| Ok(()));

        let repo = FsPackageRepository::new(runtime, vec![]);
        repo.delete_path(Path::new("/repo/foo"), true).unwrap();
        repo.delete_path(Path::new("/repo/bar"), false).unwrap();
    }

    #[test]
    fn test_copy_package_copies_tree_and_keeps_times() {
        let dir = tempdir().unwrap();
        let remote = dir.path().join("remote");
        let local = dir.path().join("local");
        write_version(&remote, "foo", "1.0", r#"{"tools": ["foo"]}"#);
        fs::create_dir_all(remote.join("foo/1.0/bin")).unwrap();
        fs::write(remote.join("foo/1.0/bin/foo"), "#!/bin/sh\n").unwrap();

        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_500_000_000);
        fs::File::options()
            .write(true)
            .open(remote.join("foo/1.0/bin/foo"))
            .unwrap()
            .set_modified(old)
            .unwrap();

        let repo = FsPackageRepository::new(RealRuntime, vec![local.clone(), remote.clone()]);
        let package = repo.latest_version("foo", &remote).unwrap().unwrap();
        let target = repo.copy_package(&package, &local, true).unwrap();

        assert_eq!(target, local.join("foo/1.0"));
        assert_eq!(
            fs::read_to_string(target.join("bin/foo")).unwrap(),
            "#!/bin/sh\n"
        );
        assert_eq!(
            fs::metadata(target.join("bin/foo")).unwrap().modified().unwrap(),
            old
        );
        assert!(!local.join("foo/.1.0.partial").exists());
        // Source untouched
        assert!(remote.join("foo/1.0/bin/foo").exists());
    }

    #[test]
    fn test_copy_package_keeps_read_only_files() {
        let dir = tempdir().unwrap();
        let remote = dir.path().join("remote");
        let local = dir.path().join("local");
        write_version(&remote, "foo", "1.0", r#"{"description": "released"}"#);

        let definition = remote.join("foo/1.0").join(PACKAGE_FILE);
        let mut permissions = fs::metadata(&definition).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&definition, permissions).unwrap();

        let repo = FsPackageRepository::new(RealRuntime, vec![local.clone(), remote.clone()]);
        let package = repo.latest_version("foo", &remote).unwrap().unwrap();
        let target = repo.copy_package(&package, &local, true).unwrap();

        let copied = target.join(PACKAGE_FILE);
        assert!(fs::metadata(&copied).unwrap().permissions().readonly());
        assert_eq!(
            fs::read_to_string(&copied).unwrap(),
            r#"{"description": "released"}"#
        );
        assert_eq!(
            fs::metadata(&copied).unwrap().modified().unwrap(),
            fs::metadata(&definition).unwrap().modified().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_package_recreates_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let remote = dir.path().join("remote");
        let local = dir.path().join("local");
        write_version(&remote, "foo", "1.0", "{}");
        let lib = remote.join("foo/1.0/lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("libfoo.so.1"), "elf").unwrap();
        symlink("libfoo.so.1", lib.join("libfoo.so")).unwrap();
        symlink("missing.so", lib.join("dangling.so")).unwrap();

        let repo = FsPackageRepository::new(RealRuntime, vec![local.clone(), remote.clone()]);
        let package = repo.latest_version("foo", &remote).unwrap().unwrap();
        let target = repo.copy_package(&package, &local, true).unwrap();

        let copied = target.join("lib");
        let linked = copied.join("libfoo.so");
        assert!(fs::symlink_metadata(&linked).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&linked).unwrap(), Path::new("libfoo.so.1"));
        assert_eq!(fs::read_to_string(&linked).unwrap(), "elf");

        let dangling = copied.join("dangling.so");
        assert!(fs::symlink_metadata(&dangling).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&dangling).unwrap(), Path::new("missing.so"));
        assert!(!local.join("foo/.1.0.partial").exists());
    }

    #[test]
    fn test_copy_package_refuses_existing_target() {
        let dir = tempdir().unwrap();
        let remote = dir.path().join("remote");
        let local = dir.path().join("local");
        write_version(&remote, "foo", "1.0", "{}");
        write_version(&local, "foo", "1.0", r#"{"description": "local edit"}"#);

        let repo = FsPackageRepository::new(RealRuntime, vec![local.clone(), remote.clone()]);
        let package = repo.latest_version("foo", &remote).unwrap().unwrap();
        let err = repo.copy_package(&package, &local, true).unwrap_err();

        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            fs::read_to_string(local.join("foo/1.0").join(PACKAGE_FILE)).unwrap(),
            r#"{"description": "local edit"}"#
        );
    }

    #[test]
    fn test_copy_package_missing_source() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local");
        let package = PackageRef::new(
            "ghost",
            Version::parse("0.1"),
            dir.path().join("remote"),
            PackageMeta::default(),
        );

        let repo = FsPackageRepository::new(RealRuntime, vec![local.clone()]);
        assert!(repo.copy_package(&package, &local, false).is_err());
        assert!(!local.join("ghost").exists());
    }

    #[test]
    fn test_copy_package_failure_cleans_up() {
        let mut runtime = MockRuntime::new();
        let source = PathBuf::from("/remote/foo/1.0");
        let family_dir = PathBuf::from("/local/foo");
        let staging = family_dir.join(".1.0.partial");

        runtime
            .expect_is_dir()
            .with(eq(source.clone()))
            .returning(|_| true);
        runtime
            .expect_exists()
            .with(eq(family_dir.join("1.0")))
            .returning(|_| false);
        // No leftover before the copy, a half-written one after the failure
        let mut staging_checks = 0;
        runtime
            .expect_exists()
            .with(eq(staging.clone()))
            .returning(move |_| {
                staging_checks += 1;
                staging_checks > 1
            });
        runtime
            .expect_exists()
            .with(eq(family_dir.clone()))
            .returning(|_| false);
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime.expect_read_dir().with(eq(source.clone())).returning(|_| {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        });
        runtime
            .expect_remove_dir_all()
            .with(eq(staging.clone()))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_remove_dir()
            .with(eq(family_dir.clone()))
            .times(1)
            .returning(|_| Ok(()));

        let repo = FsPackageRepository::new(runtime, vec![]);
        let package = PackageRef::new(
            "foo",
            Version::parse("1.0"),
            "/remote",
            PackageMeta::default(),
        );

        let err = repo
            .copy_package(&package, Path::new("/local"), true)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to copy foo-1.0"));
    }
}
