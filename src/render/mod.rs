//! Rendering module for mapsnap.
//!
//! A CPU device with scoped target/batch/scene guards, the map renderer
//! that composites layer passes, and PNG encoding for the result.

mod device;
mod map;
mod png;

pub use device::{Batch, BoundTarget, Device, DrawOp, PixelTarget, Rect, Scene, SortMode};
pub use map::{MapRenderer, QUARTER_SCALE};
pub use png::{encode_png, export_png, write_png};
