use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shotforged")]
#[command(author, version, about = "Vendor package ingest and client delivery tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a vendor package and publish what it contains
    Ingest {
        /// Package folder to ingest
        #[arg(required = true)]
        folder: PathBuf,

        /// Tracking catalog (overrides the config)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Project code (taken from the folder path if not given)
        #[arg(long)]
        project_code: Option<String>,

        /// Publish without asking
        #[arg(short, long)]
        yes: bool,

        /// Also publish records flagged for review
        #[arg(long)]
        include_review: bool,

        /// Overwrite existing versions on publish
        #[arg(long)]
        overwrite: bool,

        /// Write the scan report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Match a single filename and show the assembled record
    Match {
        /// Filename or path to match
        #[arg(required = true)]
        filename: String,

        /// Tracking catalog (overrides the config)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Project code (taken from the path if not given)
        #[arg(long)]
        project_code: Option<String>,
    },

    /// Plan the delivery media of a version
    Deliver {
        /// Delivery request JSON file
        #[arg(required = true)]
        request: PathBuf,

        /// Write the CSV manifest into the package
        #[arg(long)]
        write_manifest: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
