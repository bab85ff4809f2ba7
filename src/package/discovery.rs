use anyhow::Result;
use std::path::Path;

use crate::runtime::Runtime;

use super::{PACKAGE_FILE, Version};

/// Find the family directories of one repository.
///
/// Directory structure: `<root>/<family>/<version>/package.json`
///
/// Every visible sub-directory of the root counts as a family, including ones
/// that hold no version any more. A missing root yields no families.
#[tracing::instrument(skip(runtime))]
pub fn find_families<R: Runtime>(runtime: &R, root: &Path) -> Result<Vec<String>> {
    let mut families = Vec::new();

    if !runtime.exists(root) {
        return Ok(families);
    }

    for path in runtime.read_dir(root)? {
        if runtime.is_dir(&path)
            && let Some(name) = visible_name(&path)
        {
            families.push(name.to_string());
        }
    }

    families.sort();
    Ok(families)
}

/// Find the installed versions of a family directory.
///
/// A version directory is a visible sub-directory holding a `package.json`.
#[tracing::instrument(skip(runtime))]
pub fn find_versions<R: Runtime>(runtime: &R, family_dir: &Path) -> Result<Vec<Version>> {
    let mut versions = Vec::new();

    if !runtime.is_dir(family_dir) {
        return Ok(versions);
    }

    for path in runtime.read_dir(family_dir)? {
        if let Some(name) = visible_name(&path)
            && runtime.is_dir(&path)
            && runtime.exists(&path.join(PACKAGE_FILE))
        {
            versions.push(Version::parse(name));
        }
    }

    Ok(versions)
}

/// Entry name, unless it is hidden (in-progress copies live in dot-directories).
fn visible_name(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.starts_with('.'))
}
