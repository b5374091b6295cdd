//! Core data types for mapsnap.

mod colour;
pub(crate) mod map;
mod tilesheet;

pub use colour::Colour;
pub use map::{layer, Layer, SheetRef, TileMap, TileRef};
pub use tilesheet::{Tilesheet, TilesheetStore};
