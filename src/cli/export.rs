//! Export command implementation.
//!
//! Loads map documents, queues the requested maps, then drives the tick
//! loop until the queue drains - one job per tick, the same cadence a host
//! update loop would use.

use std::path::PathBuf;

use clap::Args;

use crate::commands::{Command, CommandOutcome, Exporter, TickStatus};
use crate::error::Result;
use crate::loader::load_maps;
use crate::output::{plural, Printer};

/// Render maps to PNG snapshots
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Map documents or directories to load
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Export a single map by name (repeatable)
    #[arg(long = "map", value_name = "NAME")]
    pub maps: Vec<String>,

    /// Export every loaded map (the default when no selector is given)
    #[arg(long)]
    pub all: bool,

    /// Export the current map
    #[arg(long)]
    pub current: bool,

    /// Output directory
    #[arg(long, short, default_value = "MapExport")]
    pub output: PathBuf,
}

pub fn run(args: ExportArgs, printer: &Printer) -> Result<()> {
    let host = load_maps(&args.paths)?;
    let mut exporter = Exporter::new(host, &args.output);

    let mut commands = Vec::new();
    if args.all || (!args.current && args.maps.is_empty()) {
        commands.push(Command::All);
    }
    if args.current {
        commands.push(Command::Current);
    }
    for name in &args.maps {
        commands.push(Command::Named(name.clone()));
    }

    let mut rejected = 0;
    for command in &commands {
        if matches!(
            exporter.handle_command(command, printer),
            CommandOutcome::BadName(_)
        ) {
            rejected += 1;
        }
    }

    let mut exported = 0;
    let mut failed = 0;
    loop {
        match exporter.tick(printer) {
            TickStatus::Idle => break,
            TickStatus::Exported(_) => exported += 1,
            TickStatus::Failed => failed += 1,
        }
    }

    printer.success(
        "Finished",
        &format!("{} to {}", plural(exported, "map", "maps"), args.output.display()),
    );
    if failed + rejected > 0 {
        printer.warning("Skipped", &plural(failed + rejected, "map", "maps"));
    }

    Ok(())
}
