use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::application::DeleteAction;
use crate::model::PackageTable;
use crate::package::{PackageQuery, PackageRef};
use crate::runtime::Runtime;

use super::config::Config;
use super::{open_model, report};

/// Delete the local version of each family, or every local version with `all_versions`
#[tracing::instrument(skip(runtime, config))]
pub fn delete<R: Runtime>(
    runtime: R,
    config: Config,
    families: &[String],
    all_versions: bool,
    yes: bool,
) -> Result<()> {
    let mut model = open_model(runtime, config)?;
    let Some(local) = model.local_repository_index() else {
        anyhow::bail!("No local repository is configured; nothing can be deleted.");
    };

    let packages = local_packages(&model.table(), local, families);
    if packages.is_empty() {
        println!("Nothing to delete.");
        return Ok(());
    }
    debug!("Deleting {} package(s), all_versions={}", packages.len(), all_versions);

    if !yes {
        println!("The following will be deleted:");
        let action = DeleteAction::new(model.query(), model.repositories());
        for target in deletion_targets(&action, &packages, all_versions)? {
            println!("  {}", target.display());
        }
        let prompt = format!("Delete {} package(s)?", packages.len());
        if !model.query().runtime().confirm(&prompt)? {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    report(model.delete_local(&packages, all_versions), "Deleted")
}

/// The folders a deletion removes: the family folder for `all_versions` or when
/// the version is the family's only entry, the version folder otherwise.
fn deletion_targets<Q: PackageQuery>(
    action: &DeleteAction<'_, Q>,
    packages: &[PackageRef],
    all_versions: bool,
) -> Result<Vec<PathBuf>> {
    let mut targets: Vec<PathBuf> = Vec::with_capacity(packages.len());
    for package in packages {
        let target = if all_versions {
            package.family_dir()
        } else {
            action.version_removal_target(package)?
        };
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    Ok(targets)
}

/// The local cell of each named family. Families without one are reported and skipped.
fn local_packages(table: &PackageTable, local: usize, families: &[String]) -> Vec<PackageRef> {
    let mut packages = Vec::new();
    for family in families {
        let Some((_, row)) = table.find(family) else {
            println!("Package family {} not found, skipping.", family);
            continue;
        };
        match row.cell(local).and_then(|c| c.package()) {
            Some(package) => packages.push(package.clone()),
            None => println!("{} has no version in the local repository, skipping.", family),
        }
    }
    packages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepositoryList;
    use crate::runtime::RealRuntime;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_version(root: &Path, family: &str, version: &str) {
        let dir = root.join(family).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), "{}").unwrap();
    }

    #[test]
    fn test_delete_local_versions() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local");
        let remote = dir.path().join("remote");
        write_version(&local, "foo", "1.0");
        write_version(&local, "bar", "1.0");
        write_version(&local, "bar", "2.0");
        write_version(&remote, "qux", "0.3");

        let config = Config {
            repositories: RepositoryList::new(vec![local.clone(), remote.clone()], Some(&local)),
        };
        let families = vec!["foo".to_string(), "bar".to_string(), "qux".to_string()];
        delete(RealRuntime, config, &families, false, true).unwrap();

        assert!(!local.join("foo").exists());
        assert!(!local.join("bar/2.0").exists());
        assert!(local.join("bar/1.0").exists());
        assert!(remote.join("qux/0.3").exists());
    }

    #[test]
    fn test_delete_all_versions() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local");
        write_version(&local, "bar", "1.0");
        write_version(&local, "bar", "2.0");

        let config = Config {
            repositories: RepositoryList::new(vec![local.clone()], Some(&local)),
        };
        delete(RealRuntime, config, &["bar".to_string()], true, true).unwrap();

        assert!(!local.join("bar").exists());
    }

    #[test]
    fn test_delete_without_local_repository() {
        let dir = tempdir().unwrap();
        let remote = dir.path().join("remote");
        write_version(&remote, "foo", "1.0");

        let config = Config {
            repositories: RepositoryList::new(vec![remote.clone()], None),
        };
        assert!(delete(RealRuntime, config, &["foo".to_string()], false, true).is_err());
        assert!(remote.join("foo/1.0").exists());
    }

    #[test]
    fn test_deletion_targets_match_what_is_removed() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local");
        write_version(&local, "foo", "1.0");
        write_version(&local, "bar", "1.0");
        write_version(&local, "bar", "2.0");

        let config = Config {
            repositories: RepositoryList::new(vec![local.clone()], Some(&local)),
        };
        let model = open_model(RealRuntime, config).unwrap();
        let families = vec!["foo".to_string(), "bar".to_string()];
        let packages = local_packages(&model.table(), 0, &families);
        let action = DeleteAction::new(model.query(), model.repositories());

        // foo-1.0 is the last entry of its family folder
        assert_eq!(
            deletion_targets(&action, &packages, false).unwrap(),
            vec![local.join("foo"), local.join("bar").join("2.0")]
        );
        assert_eq!(
            deletion_targets(&action, &packages, true).unwrap(),
            vec![local.join("foo"), local.join("bar")]
        );
    }

    #[test]
    fn test_local_packages_skips_missing() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local");
        write_version(&local, "foo", "1.0");
        fs::create_dir_all(local.join("baz")).unwrap();

        let config = Config {
            repositories: RepositoryList::new(vec![local.clone()], Some(&local)),
        };
        let model = open_model(RealRuntime, config).unwrap();
        let families = vec!["foo".to_string(), "baz".to_string(), "nope".to_string()];
        let packages = local_packages(&model.table(), 0, &families);

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].family, "foo");
    }
}
