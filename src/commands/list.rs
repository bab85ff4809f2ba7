use anyhow::Result;
use log::debug;

use crate::runtime::Runtime;

use super::config::Config;
use super::open_model;
use super::render::{render_failures, render_table};

/// List every package family across the configured repositories
#[tracing::instrument(skip(runtime, config))]
pub fn list<R: Runtime>(runtime: R, config: Config, json: bool) -> Result<()> {
    let model = open_model(runtime, config)?;
    let table = model.table();
    debug!("Listing {} package family(ies)", table.row_count());

    if json {
        println!("{}", serde_json::to_string_pretty(&*table)?);
        return Ok(());
    }

    if table.row_count() == 0 {
        println!("No packages found.");
    } else {
        println!("{}", render_table(&table));
    }

    if let Some(failures) = render_failures(&table) {
        println!();
        println!("{}", failures);
    }

    Ok(())
}
