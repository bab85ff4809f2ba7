use anyhow::{Result, bail};
use log::debug;

use crate::runtime::Runtime;

use super::config::Config;
use super::open_model;
use super::render::render_family;

/// Show what every repository holds for one package family
#[tracing::instrument(skip(runtime, config))]
pub fn show<R: Runtime>(runtime: R, config: Config, family: &str) -> Result<()> {
    debug!("Showing info for {}", family);
    let model = open_model(runtime, config)?;
    let table = model.table();

    let Some((_, row)) = table.find(family) else {
        bail!("Package family {} not found.", family);
    };

    println!("{}", render_family(&table, row));
    Ok(())
}
