use anyhow::Result;
use clap::Parser;
use repodeck::commands::{self, config::Config};
use std::path::PathBuf;

/// repodeck - Package repository deck
///
/// Compare package families across an ordered list of repositories and manage
/// the local one.
///
/// Repositories default to REPODECK_PACKAGES_PATH (a path list), the local
/// repository to REPODECK_LOCAL_PACKAGES_PATH; both fall back to ~/packages.
///
/// Examples:
///   repodeck                          # Table of every family and repository (same as list)
///   repodeck localise foo             # Copy the newest remote foo into the local repository
///   repodeck delete foo --yes         # Delete the local foo version
#[derive(Parser, Debug)]
#[command(author, version = env!("REPODECK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Repository to search, in priority order (repeatable)
    #[arg(long = "path", short = 'p', value_name = "PATH", global = true)]
    pub paths: Vec<PathBuf>,

    /// The writable local repository; must also be one of the searched paths
    #[arg(long = "local", short = 'l', value_name = "PATH", global = true)]
    pub local: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List every package family and its latest version per repository
    List(ListArgs),

    /// Show what each repository holds for a package family
    Show(ShowArgs),

    /// Print the folder of a package family's version
    Path(PathArgs),

    /// Delete local package versions
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),

    /// Delete local package folders that hold no version
    Prune(PruneArgs),

    /// Copy package versions into the local repository
    #[command(visible_alias = "localize")]
    Localise(LocaliseArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Print the table as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Package family name
    #[arg(value_name = "FAMILY")]
    pub family: String,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Package family name
    #[arg(value_name = "FAMILY")]
    pub family: String,

    /// Repository to take the version from (defaults to the winning one)
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Package families whose local version to delete
    #[arg(value_name = "FAMILY", required = true)]
    pub families: Vec<String>,

    /// Delete every local version of the family, not only the latest
    #[arg(long)]
    pub all_versions: bool,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct PruneArgs {
    /// Package families to prune (all empty folders if omitted)
    #[arg(value_name = "FAMILY")]
    pub families: Vec<String>,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct LocaliseArgs {
    /// Package families to copy
    #[arg(value_name = "FAMILY", required = true)]
    pub families: Vec<String>,

    /// Repository to copy from (defaults to the highest version outside the local repository)
    #[arg(long, value_name = "PATH")]
    pub from: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = repodeck::runtime::RealRuntime;
    let config = Config::load(&runtime, cli.paths, cli.local)?;

    match cli.command.unwrap_or(Commands::List(ListArgs { json: false })) {
        Commands::List(args) => commands::list(runtime, config, args.json)?,
        Commands::Show(args) => commands::show(runtime, config, &args.family)?,
        Commands::Path(args) => commands::path(runtime, config, &args.family, args.repo)?,
        Commands::Delete(args) => {
            commands::delete(runtime, config, &args.families, args.all_versions, args.yes)?
        }
        Commands::Prune(args) => commands::prune(runtime, config, &args.families, args.yes)?,
        Commands::Localise(args) => commands::localise(runtime, config, &args.families, args.from)?,
    }
    Ok(())
}
