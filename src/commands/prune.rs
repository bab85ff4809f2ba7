use anyhow::{Result, bail};
use log::debug;
use std::path::PathBuf;

use crate::model::{FamilyRow, PackageTable};
use crate::runtime::Runtime;

use super::config::Config;
use super::{open_model, report};

/// Delete the local package folders that hold no version
#[tracing::instrument(skip(runtime, config))]
pub fn prune<R: Runtime>(runtime: R, config: Config, families: &[String], yes: bool) -> Result<()> {
    let mut model = open_model(runtime, config)?;
    let Some(local) = model.local_repository_index() else {
        bail!("No local repository is configured; nothing can be pruned.");
    };

    let folders = empty_folders(&model.table(), local, families);
    if folders.is_empty() {
        println!("No empty folders to prune.");
        return Ok(());
    }
    debug!("Found {} empty folder(s)", folders.len());

    if !yes {
        println!("The following empty folders will be deleted:");
        for folder in &folders {
            println!("  {}", folder.display());
        }
        let prompt = format!("Delete {} empty folder(s)?", folders.len());
        if !model.query().runtime().confirm(&prompt)? {
            println!("Prune cancelled.");
            return Ok(());
        }
    }

    report(model.delete_empty_folders(&folders), "Deleted")
}

/// Empty folders of the local column; all of them when `families` is empty.
fn empty_folders(table: &PackageTable, local: usize, families: &[String]) -> Vec<PathBuf> {
    let folder_of = |row: &FamilyRow| {
        row.cell(local)
            .and_then(|c| c.empty_folder())
            .map(|p| p.to_path_buf())
    };

    if families.is_empty() {
        return table.rows().iter().filter_map(folder_of).collect();
    }

    let mut folders = Vec::new();
    for family in families {
        match table.find(family).and_then(|(_, row)| folder_of(row)) {
            Some(folder) => folders.push(folder),
            None => println!("{} has no empty folder in the local repository, skipping.", family),
        }
    }
    folders
}
