//! CLI module - Command-line interface for Kalkops
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Kalkops - lake-liming logistics backend
/// Search and season-archive API for the helicopter field map
#[derive(Parser)]
#[command(name = "kalkops")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default when no command is given)
    #[command(alias = "-s", alias = "--serve")]
    Serve,

    /// Apply bundled migrations to the configured database
    Migrate,

    /// Generate season-archive SQL and print it to stdout
    ArchiveSql {
        /// Season year the archived tables are named under
        #[arg(long)]
        year: String,

        /// Optional archive prefix (e.g. "test" or "backup")
        #[arg(long, default_value = "")]
        prefix: String,

        /// Table to archive; repeat the flag for multiple tables
        #[arg(long = "table", required = true)]
        tables: Vec<String>,

        /// Recorded in app_config.updated_by
        #[arg(long, default_value = "cli")]
        updated_by: String,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
