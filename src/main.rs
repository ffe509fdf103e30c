mod cli;
mod commands;
mod config;
mod editor;
mod error;
mod hash;
mod lookup;
mod metadata;
mod organize;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use commands::search::SearchTarget;
use commands::tag::TagSource;
use lookup::VolumeQuery;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { paths, json } => {
            commands::check::run(&paths, json, cli.quiet)?;
        }
        Commands::Tag {
            files,
            issue_id,
            from_file,
            overwrite_all,
            rename,
            no_dry_run,
        } => {
            let source = match (issue_id, from_file.as_deref()) {
                (Some(id), _) => TagSource::ComicVine(id),
                (None, Some(path)) => TagSource::File(path),
                (None, None) => anyhow::bail!("Provide --issue-id or --from-file"),
            };
            commands::tag::run(&files, source, overwrite_all, rename, no_dry_run, cli.quiet)?;
        }
        Commands::Erase { files, no_dry_run } => {
            commands::erase::run(&files, no_dry_run, cli.quiet)?;
        }
        Commands::Search {
            series,
            author,
            title,
            publisher,
            year,
            num_issues,
            volume,
            issue,
        } => {
            let target = match (volume, issue) {
                (Some(id), _) => SearchTarget::Volume(id),
                (None, Some(id)) => SearchTarget::Issue(id),
                (None, None) => SearchTarget::Volumes(VolumeQuery {
                    name: series,
                    author,
                    title,
                    publisher,
                    start_year: year,
                    count_of_issues: num_issues,
                }),
            };
            commands::search::run(target, cli.quiet)?;
        }
        Commands::Fields => {
            commands::fields::run()?;
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flag
fn init_tracing(verbose: bool) {
    let default = if verbose { "cbztag=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
