//! Symlink operations (create, read, detect).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn symlink_impl(&self, original: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::symlink as unix_symlink;
            unix_symlink(original, link)
                .with_context(|| format!("Failed to create symlink {:?} -> {:?}", link, original))?;
        }
        #[cfg(windows)]
        {
            use std::os::windows::fs::{symlink_dir, symlink_file};

            // A relative target is relative to the link's parent, not the CWD.
            let target_path = if original.is_absolute() {
                original.to_path_buf()
            } else {
                link.parent()
                    .context("Failed to get parent directory for symlink")?
                    .join(original)
            };

            if target_path.is_dir() {
                symlink_dir(original, link).with_context(|| {
                    format!("Failed to create directory symlink {:?} -> {:?}", link, original)
                })?;
            } else {
                symlink_file(original, link).with_context(|| {
                    format!("Failed to create file symlink {:?} -> {:?}", link, original)
                })?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_link_impl(&self, path: &Path) -> Result<PathBuf> {
        fs::read_link(path).with_context(|| format!("Failed to read symlink {:?}", path))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_symlink_impl(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn test_relative_symlink_round_trip() {
        let rt = RealRuntime;
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("libfoo.so.1"), b"elf").unwrap();
        let link = dir.path().join("libfoo.so");

        rt.symlink(Path::new("libfoo.so.1"), &link).unwrap();

        assert!(rt.is_symlink(&link));
        assert!(!rt.is_symlink(&dir.path().join("libfoo.so.1")));
        assert_eq!(rt.read_link(&link).unwrap(), Path::new("libfoo.so.1"));
        assert_eq!(rt.read_to_string(&link).unwrap(), "elf");
    }

    #[test]
    fn test_dangling_symlink_is_still_a_symlink() {
        let rt = RealRuntime;
        let dir = tempdir().unwrap();
        let link = dir.path().join("dangling.so");

        rt.symlink(Path::new("missing.so"), &link).unwrap();

        assert!(rt.is_symlink(&link));
        assert!(!rt.exists(&link));
        assert!(!rt.is_symlink(&dir.path().join("nothing")));
        assert!(rt.read_link(&dir.path().join("nothing")).is_err());
    }
}
