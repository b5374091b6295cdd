//! List command implementation.
//!
//! Reports loaded map names without rendering or touching the queue.

use std::path::PathBuf;

use clap::Args;

use crate::commands::{Command, Exporter};
use crate::error::Result;
use crate::loader::load_maps;
use crate::output::Printer;

/// List loaded map names without rendering
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Map documents or directories to load (default: current directory)
    pub paths: Vec<PathBuf>,
}

pub fn run(args: ListArgs, printer: &Printer) -> Result<()> {
    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths
    };

    let host = load_maps(&paths)?;
    let exporter = Exporter::new(host, "MapExport");
    exporter.handle_command(&Command::List, printer);

    debug_assert_eq!(exporter.pending(), 0);
    Ok(())
}
