use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cbztag")]
#[command(about = "CLI tool for reading, writing, and organizing ComicInfo.xml metadata in CBZ archives")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display ComicInfo.xml metadata for CBZ files or directories
    Check {
        /// CBZ files or directories (searched recursively)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write ComicInfo.xml from ComicVine or a local JSON document
    #[command(group(ArgGroup::new("source").required(true).args(["issue_id", "from_file"])))]
    Tag {
        /// CBZ files to tag
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// ComicVine issue id to fetch
        #[arg(long, value_name = "ID")]
        issue_id: Option<u64>,

        /// Local JSON metadata document
        #[arg(long, value_name = "FILE")]
        from_file: Option<PathBuf>,

        /// Replace existing ComicInfo.xml instead of merging
        #[arg(long)]
        overwrite_all: bool,

        /// Rename files after their metadata
        #[arg(long)]
        rename: bool,

        /// Actually apply changes (default: dry-run)
        #[arg(long)]
        no_dry_run: bool,
    },

    /// Remove ComicInfo.xml from CBZ files
    Erase {
        /// CBZ files to erase metadata from
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Actually apply changes (default: dry-run)
        #[arg(long)]
        no_dry_run: bool,
    },

    /// Search ComicVine volumes, or show a volume or issue by id
    Search {
        /// Volume name contains
        #[arg(long)]
        series: Option<String>,

        /// Creator credited on the volume
        #[arg(long)]
        author: Option<String>,

        /// Volume name or description contains
        #[arg(long)]
        title: Option<String>,

        /// Publisher name contains
        #[arg(long)]
        publisher: Option<String>,

        /// Volume start year
        #[arg(long)]
        year: Option<u32>,

        /// Exact number of issues in the volume
        #[arg(long)]
        num_issues: Option<u32>,

        /// Show a volume and its issues
        #[arg(long, value_name = "ID", conflicts_with_all = ["issue", "series", "author", "title", "publisher", "year", "num_issues"])]
        volume: Option<u64>,

        /// Show the metadata an issue would be tagged with
        #[arg(long, value_name = "ID", conflicts_with_all = ["series", "author", "title", "publisher", "year", "num_issues"])]
        issue: Option<u64>,
    },

    /// List ComicInfo.xml fields and the rename template
    Fields,

    /// Interactively create a config file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}
