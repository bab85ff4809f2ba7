use anyhow::{Result, bail};
use log::debug;
use std::path::{Path, PathBuf};

use crate::model::{FamilyRow, PackageTable};
use crate::package::PackageRef;
use crate::runtime::Runtime;

use super::config::Config;
use super::{open_model, report};

/// Copy each family's version into the local repository
#[tracing::instrument(skip(runtime, config))]
pub fn localise<R: Runtime>(
    runtime: R,
    config: Config,
    families: &[String],
    from: Option<PathBuf>,
) -> Result<()> {
    let mut model = open_model(runtime, config)?;
    let Some(local) = model.local_repository_index() else {
        bail!("No local repository is configured; nothing can be localised.");
    };

    let table = model.table();
    let from = match from {
        Some(path) => Some(source_index(&table, local, &path)?),
        None => None,
    };

    let mut packages = Vec::with_capacity(families.len());
    for family in families {
        let Some((_, row)) = table.find(family) else {
            bail!("Package family {} not found.", family);
        };
        packages.push(pick_source(&table, row, local, from)?);
    }
    debug!("Localising {} package(s)", packages.len());

    report(model.localise(&packages), "Localised")
}

fn source_index(table: &PackageTable, local: usize, path: &Path) -> Result<usize> {
    match table.repositories().iter().position(|p| p == path) {
        Some(index) if index == local => {
            bail!("{} is the local repository.", path.display())
        }
        Some(index) => Ok(index),
        None => bail!("{} is not a configured repository.", path.display()),
    }
}

/// The version to copy: the one in `from`, or the highest version outside the
/// local repository (first repository wins a tie).
fn pick_source(
    table: &PackageTable,
    row: &FamilyRow,
    local: usize,
    from: Option<usize>,
) -> Result<PackageRef> {
    if let Some(index) = from {
        return match row.cell(index).and_then(|c| c.package()) {
            Some(package) => Ok(package.clone()),
            None => bail!(
                "{} has no version in {}.",
                row.family(),
                table.header(index + 1).unwrap_or_default()
            ),
        };
    }

    let mut best: Option<&PackageRef> = None;
    for (index, cell) in row.cells().iter().enumerate() {
        if index == local {
            continue;
        }
        if let Some(package) = cell.package()
            && best.is_none_or(|b| package.version > b.version)
        {
            best = Some(package);
        }
    }

    match best {
        Some(package) => Ok(package.clone()),
        None => bail!("{} has no version outside the local repository.", row.family()),
    }
}
