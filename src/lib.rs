//! mapsnap - layered tile map snapshot exporter
//!
//! Queues loaded maps and renders each one into a quarter-resolution PNG.
//! Layers composite in a fixed order ("Back", "Buildings", "Front", then
//! an optional "AlwaysFront") through begin/end-scoped draw batches against
//! an off-screen pixel target, which is then encoded to disk.

pub mod cli;
pub mod commands;
pub mod error;
pub mod host;
pub mod loader;
pub mod output;
pub mod queue;
pub mod render;
pub mod types;

pub use commands::{Command, CommandOutcome, Exporter, TickStatus};
pub use error::{Result, SnapError};
pub use host::Host;
pub use loader::{is_map_document, load_map, load_maps, scan_paths};
pub use queue::{MapHandle, RenderJob, RenderQueue};
pub use render::{
    encode_png, export_png, write_png, Device, DrawOp, MapRenderer, PixelTarget, Rect, Scene,
    SortMode, QUARTER_SCALE,
};
pub use types::{layer, Colour, Layer, SheetRef, TileMap, TileRef, Tilesheet, TilesheetStore};
