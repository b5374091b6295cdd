//! Map renderer - composites a map's layer stack into a pixel target.
//!
//! Layers draw in a fixed order: "Back" and "Buildings" share one deferred
//! batch, "Front" and the optional "AlwaysFront" each get a back-to-front
//! batch so taller tiles overlap lower rows correctly. Output is rendered
//! at quarter resolution; the export is a thumbnail-style snapshot, not a
//! full-resolution dump.

use crate::error::{Result, SnapError};
use crate::render::device::{Device, PixelTarget, Rect, SortMode};
use crate::types::map::{layer, Layer, TileMap};
use crate::types::TilesheetStore;

/// Downscale divisor applied to the map's display size.
pub const QUARTER_SCALE: u32 = 4;

/// Renders one map at a time against an owned device.
///
/// The renderer must run on the tick context that owns the device; only
/// the request queue crosses threads.
#[derive(Debug, Default)]
pub struct MapRenderer {
    device: Device,
}

impl MapRenderer {
    /// Create a renderer with an idle device.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying device, for state inspection.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Render a map into a freshly allocated quarter-resolution target.
    ///
    /// Tilesheets the map references are resolved up front. The target is
    /// bound for the duration of the draw passes and unbound on every exit
    /// path; a pass failing partway still closes its scene and batch before
    /// the error propagates.
    pub fn render(&self, map: &TileMap, sheets: &mut TilesheetStore) -> Result<PixelTarget> {
        let width = map.display_width() / QUARTER_SCALE;
        let height = map.display_height() / QUARTER_SCALE;
        if width == 0 || height == 0 {
            return Err(SnapError::Render {
                message: format!(
                    "map '{}' ({}x{} px) is too small to render at 1/{} scale",
                    map.name,
                    map.display_width(),
                    map.display_height(),
                    QUARTER_SCALE
                ),
            });
        }

        sheets.resolve(map)?;
        let sheets = &*sheets;

        let mut target = PixelTarget::new(width, height);
        let bounds = Rect::of_size(width, height);

        {
            let mut bound = self.device.bind_target(&mut target);
            bound.clear(crate::types::Colour::BLACK);

            {
                let mut batch = bound.begin_batch(SortMode::Deferred);
                let mut scene = batch.begin_scene(bounds, QUARTER_SCALE);
                self.draw_layer(map, required(map, layer::BACK)?, &mut scene, sheets)?;
                // Buildings composites straight over Back, no clear between.
                self.draw_layer(map, required(map, layer::BUILDINGS)?, &mut scene, sheets)?;
            }

            {
                let mut batch = bound.begin_batch(SortMode::BackToFront);
                let mut scene = batch.begin_scene(bounds, QUARTER_SCALE);
                self.draw_layer(map, required(map, layer::FRONT)?, &mut scene, sheets)?;
            }

            if let Some(always_front) = map.layer(layer::ALWAYS_FRONT) {
                let mut batch = bound.begin_batch(SortMode::BackToFront);
                let mut scene = batch.begin_scene(bounds, QUARTER_SCALE);
                self.draw_layer(map, always_front, &mut scene, sheets)?;
            }
        }

        Ok(target)
    }

    fn draw_layer<'s>(
        &self,
        map: &TileMap,
        layer: &Layer,
        scene: &mut crate::render::Scene<'_, '_, 's>,
        sheets: &'s TilesheetStore,
    ) -> Result<()> {
        layer.draw(scene, sheets, map.tile_width(), map.tile_height(), (0, 0))
    }
}

fn required<'m>(map: &'m TileMap, id: &str) -> Result<&'m Layer> {
    map.layer(id).ok_or_else(|| SnapError::Render {
        message: format!("map '{}' has no '{}' layer", map.name, id),
    })
}
