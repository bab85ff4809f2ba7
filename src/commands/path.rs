use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use crate::model::{FamilyRow, PackageTable};
use crate::runtime::Runtime;

use super::config::Config;
use super::open_model;

/// Print the folder of a family's version: the winning one, or the one in `repository`
#[tracing::instrument(skip(runtime, config))]
pub fn path<R: Runtime>(
    runtime: R,
    config: Config,
    family: &str,
    repository: Option<PathBuf>,
) -> Result<()> {
    let model = open_model(runtime, config)?;
    let table = model.table();

    let Some((_, row)) = table.find(family) else {
        bail!("Package family {} not found.", family);
    };

    let folder = version_folder(&table, row, repository.as_deref())?;
    println!("{}", folder.display());
    Ok(())
}

fn version_folder(table: &PackageTable, row: &FamilyRow, repository: Option<&Path>) -> Result<PathBuf> {
    let index = match repository {
        Some(repository) => match table.repositories().iter().position(|p| p == repository) {
            Some(index) => index,
            None => bail!("{:?} is not a configured repository.", repository),
        },
        None => match row.winner() {
            Some(index) => index,
            None => bail!("{} has no version in any repository.", row.family()),
        },
    };

    match row.cell(index).and_then(|c| c.package()) {
        Some(package) => Ok(package.version_dir()),
        None => bail!(
            "{} has no version in {}.",
            row.family(),
            table.header(index + 1).unwrap_or_default()
        ),
    }
}
