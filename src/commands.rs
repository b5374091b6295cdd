//! Console command surface and the exporter that services it.
//!
//! Console-style command grammar: `all`, `list`, `current`, `help`,
//! or a map name. Commands only touch the host and the queue; the actual
//! rendering happens later, one job per [`Exporter::tick`], on the context
//! that owns the device.

use std::path::PathBuf;

use crate::error::{Result, SnapError};
use crate::host::Host;
use crate::output::{plural, Printer};
use crate::queue::{RenderJob, RenderQueue};
use crate::render::{export_png, MapRenderer};
use crate::types::TilesheetStore;

/// A parsed export command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Export every loaded map.
    All,
    /// Export the current map.
    Current,
    /// Report loaded map names without rendering.
    List,
    /// Export one map by name.
    Named(String),
    /// Print usage.
    Help,
}

impl Command {
    /// Parse console arguments. An empty argument list is a user error.
    pub fn parse(args: &[&str]) -> Result<Command> {
        let Some(first) = args.first() else {
            return Err(SnapError::Parse {
                message: "no command or map name given".to_string(),
                help: Some("try 'help' for the command list".to_string()),
            });
        };

        Ok(match *first {
            "all" => Command::All,
            "list" => Command::List,
            "current" => Command::Current,
            "help" => Command::Help,
            name => Command::Named(name.to_string()),
        })
    }
}

/// What a command did, for callers that track results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Number of jobs added to the queue.
    Queued(usize),
    /// Loaded map names, possibly empty.
    Listed(Vec<String>),
    /// The requested name resolved to no loaded map; nothing was queued.
    BadName(String),
    /// Usage was printed.
    Help,
}

/// Result of one update tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickStatus {
    /// No work was pending.
    Idle,
    /// One map was rendered and written.
    Exported(PathBuf),
    /// One job was consumed but failed; the failure was logged and the
    /// queue keeps going next tick.
    Failed,
}

/// Owns the pieces of the export pipeline and wires them together.
///
/// Everything is explicit dependency injection: the host, queue, renderer
/// and tilesheet store are constructed here and passed nowhere else, with
/// no process-wide instance. Command handling takes `&self` (it only reads
/// the host and pushes onto the shared queue); `tick` takes `&mut self`
/// and must stay on the context that owns the device.
pub struct Exporter {
    host: Host,
    queue: RenderQueue,
    renderer: MapRenderer,
    sheets: TilesheetStore,
    export_dir: PathBuf,
}

impl Exporter {
    /// Create an exporter over a host, writing PNGs under `export_dir`.
    pub fn new(host: Host, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            host,
            queue: RenderQueue::new(),
            renderer: MapRenderer::new(),
            sheets: TilesheetStore::new(),
            export_dir: export_dir.into(),
        }
    }

    /// The host of loaded maps.
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Mutable host access, for loading and unloading maps at runtime.
    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    /// A clone of the request queue, safe to hand to another thread.
    pub fn queue(&self) -> RenderQueue {
        self.queue.clone()
    }

    /// The renderer, for device-state inspection.
    pub fn renderer(&self) -> &MapRenderer {
        &self.renderer
    }

    /// Number of jobs waiting to render.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Service one console command.
    pub fn handle_command(&self, command: &Command, printer: &Printer) -> CommandOutcome {
        match command {
            Command::All => {
                // Snapshot of what is loaded right now; maps unloaded
                // before their tick fail per job, not here.
                let handles = self.host.handles();
                let count = handles.len();
                for handle in handles {
                    self.queue.enqueue(handle);
                }
                printer.status("Queued", &plural(count, "map", "maps"));
                CommandOutcome::Queued(count)
            }

            Command::Current => match self.host.current() {
                Some(map) => {
                    let name = map.name.clone();
                    self.queue.enqueue(self.host.handle_for(map));
                    printer.status("Queued", &name);
                    CommandOutcome::Queued(1)
                }
                None => {
                    printer.error("Error", "no current map");
                    CommandOutcome::BadName("current".to_string())
                }
            },

            Command::List => {
                let names = self.host.names();
                if names.is_empty() {
                    printer.info("Maps", "No maps loaded.");
                } else {
                    printer.info("Maps", &names.join(", "));
                }
                CommandOutcome::Listed(names)
            }

            Command::Named(name) => match self.host.get(name) {
                Some(map) => {
                    self.queue.enqueue(self.host.handle_for(map));
                    printer.status("Queued", name);
                    CommandOutcome::Queued(1)
                }
                None => {
                    printer.error("Error", &format!("bad map name '{}'", name));
                    CommandOutcome::BadName(name.clone())
                }
            },

            Command::Help => {
                printer.info("Usage", "export all        export every loaded map");
                printer.info("", "export list       list loaded map names");
                printer.info("", "export current    export the current map");
                printer.info("", "export <name>     export one map by name");
                printer.info("", "export help       print this help");
                CommandOutcome::Help
            }
        }
    }

    /// Process at most one queued job.
    ///
    /// Failures are logged with full detail and consume the job; nothing
    /// propagates and nothing halts the queue. A failed map must be
    /// explicitly re-requested.
    pub fn tick(&mut self, printer: &Printer) -> TickStatus {
        let Some(job) = self.queue.try_dequeue() else {
            return TickStatus::Idle;
        };

        let name = job.handle.name().to_string();
        match self.export(&job, printer) {
            Ok(path) => {
                printer.success("Exported", &format!("{} to {}", name, path.display()));
                TickStatus::Exported(path)
            }
            Err(e) => {
                printer.error("Failed", &format!("{}: {}", name, e));
                TickStatus::Failed
            }
        }
    }

    fn export(&mut self, job: &RenderJob, printer: &Printer) -> Result<PathBuf> {
        // Re-resolve the handle: the map may have been unloaded since the
        // job was queued.
        let map = self
            .host
            .get(job.handle.name())
            .ok_or_else(|| SnapError::UnknownMap {
                name: job.handle.name().to_string(),
                help: Some("the map was unloaded after it was queued".to_string()),
            })?;

        printer.status(
            "Rendering",
            &format!("{} ({}x{})", map.name, map.display_width(), map.display_height()),
        );

        let target = self.renderer.render(map, &mut self.sheets)?;
        let path = self.export_dir.join(format!("{}.png", map.export_name()));
        export_png(&target, &path)?;
        Ok(path)
    }
}
