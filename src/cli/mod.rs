pub mod completions;
pub mod export;
pub mod list;

use clap::{Parser, Subcommand};

/// mapsnap - tile map snapshot exporter
#[derive(Parser, Debug)]
#[command(name = "mapsnap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render maps to PNG snapshots
    Export(export::ExportArgs),

    /// List loaded map names without rendering
    List(list::ListArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
