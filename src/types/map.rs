//! Tile map and layer types.
//!
//! A [`TileMap`] is an ordered stack of named [`Layer`]s over a fixed tile
//! grid. Layers hold optional [`TileRef`] cells pointing into tilesheets;
//! drawing a layer issues one draw op per present tile into an open scene.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapError};
use crate::render::{DrawOp, Scene};
use crate::types::tilesheet::TilesheetStore;

/// Well-known layer names, composited in this order.
pub mod layer {
    pub const BACK: &str = "Back";
    pub const BUILDINGS: &str = "Buildings";
    pub const FRONT: &str = "Front";
    /// Optional; maps without it are expected and valid.
    pub const ALWAYS_FRONT: &str = "AlwaysFront";
}

/// One tile cell: a tilesheet id plus a tile index within that sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRef {
    pub sheet: String,
    pub index: u32,
}

/// A named tilesheet reference carried by a map document.
#[derive(Debug, Clone)]
pub struct SheetRef {
    /// Id the map's tiles refer to.
    pub id: String,
    /// Image path, already resolved against the document's directory.
    pub image: PathBuf,
}

/// One ordered plane of tiles within a map.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Layer name ("Back", "Buildings", ...).
    pub id: String,

    /// Row-major cell grid (tiles[y][x]); `None` is an empty cell.
    tiles: Vec<Vec<Option<TileRef>>>,
}

impl Layer {
    /// Create a new layer from a cell grid.
    pub fn new(id: impl Into<String>, tiles: Vec<Vec<Option<TileRef>>>) -> Self {
        Self {
            id: id.into(),
            tiles,
        }
    }

    /// Create a layer of empty cells.
    pub fn empty(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(id, vec![vec![None; width as usize]; height as usize])
    }

    /// Width of the cell grid.
    pub fn width(&self) -> u32 {
        self.tiles.first().map_or(0, |row| row.len()) as u32
    }

    /// Height of the cell grid.
    pub fn height(&self) -> u32 {
        self.tiles.len() as u32
    }

    /// Get a cell.
    pub fn get(&self, x: u32, y: u32) -> Option<&TileRef> {
        self.tiles
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .and_then(|cell| cell.as_ref())
    }

    /// Set a cell. Out-of-range positions are ignored.
    pub fn set(&mut self, x: u32, y: u32, tile: Option<TileRef>) {
        if let Some(cell) = self
            .tiles
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *cell = tile;
        }
    }

    /// Iterate present tiles with their cell positions.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (u32, u32, &TileRef)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().filter_map(move |(x, cell)| {
                cell.as_ref().map(|tile| (x as u32, y as u32, tile))
            })
        })
    }

    /// Issue draw ops for every present tile into an open scene.
    ///
    /// `origin` is the pixel offset of this layer's top-left corner in map
    /// space; the scene maps it down to target space. Tile art is looked up
    /// through `sheets`, which must already have every referenced sheet
    /// resolved. Depth is the tile row, so back-to-front batches draw lower
    /// rows over higher ones.
    pub fn draw<'s>(
        &self,
        scene: &mut Scene<'_, '_, 's>,
        sheets: &'s TilesheetStore,
        tile_width: u32,
        tile_height: u32,
        origin: (u32, u32),
    ) -> Result<()> {
        let step = scene.sample_step();

        for (tx, ty, tile) in self.iter_tiles() {
            let sheet = sheets.get(&tile.sheet).ok_or_else(|| SnapError::Tilesheet {
                sheet: tile.sheet.clone(),
                message: format!("not resolved while drawing layer '{}'", self.id),
            })?;

            let src = sheet.source_rect(tile.index).ok_or_else(|| SnapError::Render {
                message: format!(
                    "tile index {} out of range for sheet '{}' in layer '{}'",
                    tile.index, sheet.id, self.id
                ),
            })?;

            let px = origin.0 + tx * tile_width;
            let py = origin.1 + ty * tile_height;
            let dx = px / step;
            let dy = py / step;

            scene.draw(DrawOp::new(
                sheet,
                src,
                dx,
                dy,
                (px + tile_width) / step - dx,
                (py + tile_height) / step - dy,
                ty,
            ));
        }

        Ok(())
    }
}

/// A loaded map: a tile grid with named layers and tilesheet references.
#[derive(Debug, Clone)]
pub struct TileMap {
    /// Display name.
    pub name: String,

    /// Unique name, preferred for output file naming when present.
    pub unique_name: Option<String>,

    tile_width: u32,
    tile_height: u32,
    width: u32,
    height: u32,
    sheets: Vec<SheetRef>,
    layers: Vec<Layer>,
}

impl TileMap {
    /// Create a new map with a grid size in tiles and a tile size in pixels.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Self {
        Self {
            name: name.into(),
            unique_name: None,
            tile_width,
            tile_height,
            width,
            height,
            sheets: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Set the unique name.
    pub fn with_unique_name(mut self, unique: impl Into<String>) -> Self {
        self.unique_name = Some(unique.into());
        self
    }

    /// Register a tilesheet reference.
    pub fn add_sheet(&mut self, id: impl Into<String>, image: impl Into<PathBuf>) {
        self.sheets.push(SheetRef {
            id: id.into(),
            image: image.into(),
        });
    }

    /// Append a layer to the stack.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Grid width in tiles.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tile width in pixels.
    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    /// Tile height in pixels.
    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    /// Full-resolution display width in pixels.
    pub fn display_width(&self) -> u32 {
        self.width * self.tile_width
    }

    /// Full-resolution display height in pixels.
    pub fn display_height(&self) -> u32 {
        self.height * self.tile_height
    }

    /// Tilesheets this map references.
    pub fn sheet_refs(&self) -> &[SheetRef] {
        &self.sheets
    }

    /// Layers in stack order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Look up a layer by name.
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Check whether a layer is present.
    pub fn has_layer(&self, id: &str) -> bool {
        self.layer(id).is_some()
    }

    /// Name used for the output file: unique name when present, display
    /// name otherwise.
    pub fn export_name(&self) -> &str {
        self.unique_name.as_deref().unwrap_or(&self.name)
    }
}
