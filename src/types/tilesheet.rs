//! Tilesheet atlases and the store that resolves them.

use std::collections::HashMap;

use crate::error::{Result, SnapError};
use crate::render::Rect;
use crate::types::colour::Colour;
use crate::types::map::TileMap;

/// A decoded tilesheet: an RGBA atlas cut into fixed-size tiles.
///
/// Tile indices run row-major across the sheet's columns.
#[derive(Debug, Clone)]
pub struct Tilesheet {
    /// Sheet id, as referenced by map tiles.
    pub id: String,

    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    pixels: Vec<Colour>,
}

impl Tilesheet {
    /// Create a tilesheet from decoded pixels.
    pub fn from_pixels(
        id: impl Into<String>,
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
        pixels: Vec<Colour>,
    ) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            id: id.into(),
            width,
            height,
            tile_width,
            tile_height,
            pixels,
        }
    }

    /// Sheet width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Sheet height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of tile columns.
    pub fn columns(&self) -> u32 {
        if self.tile_width == 0 {
            0
        } else {
            self.width / self.tile_width
        }
    }

    /// Number of tile rows.
    pub fn rows(&self) -> u32 {
        if self.tile_height == 0 {
            0
        } else {
            self.height / self.tile_height
        }
    }

    /// Total number of tiles in the sheet.
    pub fn tile_count(&self) -> u32 {
        self.columns() * self.rows()
    }

    /// Pixel rectangle of a tile index, or `None` when out of range.
    pub fn source_rect(&self, index: u32) -> Option<Rect> {
        let cols = self.columns();
        if cols == 0 || index >= self.tile_count() {
            return None;
        }
        Some(Rect::new(
            (index % cols) * self.tile_width,
            (index / cols) * self.tile_height,
            self.tile_width,
            self.tile_height,
        ))
    }

    /// Sample a pixel. Out-of-range reads are transparent.
    pub fn pixel(&self, x: u32, y: u32) -> Colour {
        if x >= self.width || y >= self.height {
            return Colour::TRANSPARENT;
        }
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Cache of loaded tilesheets, keyed by sheet id.
///
/// Sheets are resolved from a map's references before any layer draws; a
/// sheet inserted directly (synthetic art, tests) is never reloaded.
#[derive(Debug, Default)]
pub struct TilesheetStore {
    sheets: HashMap<String, Tilesheet>,
}

impl TilesheetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already-decoded sheet.
    pub fn insert(&mut self, sheet: Tilesheet) {
        self.sheets.insert(sheet.id.clone(), sheet);
    }

    /// Look up a loaded sheet.
    pub fn get(&self, id: &str) -> Option<&Tilesheet> {
        self.sheets.get(id)
    }

    /// Check whether a sheet is loaded.
    pub fn contains(&self, id: &str) -> bool {
        self.sheets.contains_key(id)
    }

    /// Number of loaded sheets.
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Load every sheet the map references that is not already present.
    ///
    /// This runs before any drawing so a pass never has to touch the
    /// filesystem mid-batch. Sheet tile size follows the map's tile size.
    pub fn resolve(&mut self, map: &TileMap) -> Result<()> {
        for sheet_ref in map.sheet_refs() {
            if self.contains(&sheet_ref.id) {
                continue;
            }

            let img = image::open(&sheet_ref.image)
                .map_err(|e| SnapError::Tilesheet {
                    sheet: sheet_ref.id.clone(),
                    message: format!("failed to load {}: {}", sheet_ref.image.display(), e),
                })?
                .to_rgba8();

            let (width, height) = img.dimensions();
            let pixels = img
                .pixels()
                .map(|p| Colour::new(p.0[0], p.0[1], p.0[2], p.0[3]))
                .collect();

            self.insert(Tilesheet::from_pixels(
                sheet_ref.id.clone(),
                width,
                height,
                map.tile_width(),
                map.tile_height(),
                pixels,
            ));
        }

        Ok(())
    }
}
