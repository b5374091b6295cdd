//! CPU render device: pixel targets, draw batches, and scoped guards.
//!
//! Mirrors the discipline a GPU-backed host imposes: one bound render
//! target, begin/end-bracketed batches and scenes, all released in reverse
//! acquisition order on every exit path. Each acquisition returns a guard
//! that restores device state on drop, so a pass that fails partway can
//! propagate its error without leaving the device dirty for the next tick.

use std::cell::Cell;

use crate::types::{Colour, Tilesheet};

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin.
    pub const fn of_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// An owned off-screen RGBA pixel buffer used as a render target.
#[derive(Debug, Clone)]
pub struct PixelTarget {
    width: u32,
    height: u32,
    pixels: Vec<Colour>,
}

impl PixelTarget {
    /// Allocate a transparent target.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Colour::TRANSPARENT; (width * height) as usize],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill every pixel with one colour.
    pub fn clear(&mut self, colour: Colour) {
        self.pixels.fill(colour);
    }

    /// Get a pixel, or `None` when out of range.
    pub fn get(&self, x: u32, y: u32) -> Option<Colour> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Overwrite a pixel. Out-of-range writes are ignored.
    pub fn put(&mut self, x: u32, y: u32, colour: Colour) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = colour;
        }
    }

    /// Source-over blend a pixel onto the buffer.
    pub fn blend(&mut self, x: u32, y: u32, colour: Colour) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) as usize;
            self.pixels[idx] = colour.over(self.pixels[idx]);
        }
    }

    /// Flatten to an RGBA8 byte buffer for encoding.
    pub fn to_rgba_buffer(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.pixels.len() * 4);
        for colour in &self.pixels {
            buffer.extend_from_slice(&colour.to_rgba());
        }
        buffer
    }
}

/// Draw ordering within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Execute ops in submission order.
    Deferred,
    /// Stable-sort ops by depth before executing, so deeper (lower depth)
    /// ops land first and nearer ones composite over them.
    BackToFront,
}

/// One queued tile draw: a source rect in a tilesheet blitted to a dest
/// rect with point sampling.
#[derive(Debug, Clone, Copy)]
pub struct DrawOp<'s> {
    sheet: &'s Tilesheet,
    src: Rect,
    dest: Rect,
    depth: u32,
    step: u32,
}

impl<'s> DrawOp<'s> {
    /// Create a draw op. The sampling step is stamped on by the scene the
    /// op is issued into.
    pub fn new(
        sheet: &'s Tilesheet,
        src: Rect,
        dest_x: u32,
        dest_y: u32,
        dest_width: u32,
        dest_height: u32,
        depth: u32,
    ) -> Self {
        Self {
            sheet,
            src,
            dest: Rect::new(dest_x, dest_y, dest_width, dest_height),
            depth,
            step: 1,
        }
    }
}

/// Tracks graphics-device state that must never leak across renders.
///
/// All mutation goes through guards; [`Device::is_idle`] is true exactly
/// when no target is bound and no batch or scene is open.
#[derive(Debug, Default)]
pub struct Device {
    target_bound: Cell<bool>,
    batch_open: Cell<bool>,
    scene_open: Cell<bool>,
}

impl Device {
    /// Create an idle device.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no target is bound and no batch or scene is open.
    pub fn is_idle(&self) -> bool {
        !self.target_bound.get() && !self.batch_open.get() && !self.scene_open.get()
    }

    /// True while a render target is bound.
    pub fn target_bound(&self) -> bool {
        self.target_bound.get()
    }

    /// Bind a pixel target as the active render destination.
    ///
    /// Exactly one target may be bound at a time; the returned guard
    /// unbinds it on drop.
    pub fn bind_target<'d, 't>(&'d self, target: &'t mut PixelTarget) -> BoundTarget<'d, 't> {
        debug_assert!(!self.target_bound.get(), "render target already bound");
        self.target_bound.set(true);
        BoundTarget {
            device: self,
            target,
        }
    }
}

/// Guard for the bound render target. Unbinds on drop.
pub struct BoundTarget<'d, 't> {
    device: &'d Device,
    target: &'t mut PixelTarget,
}

impl<'d, 't> BoundTarget<'d, 't> {
    /// Clear the bound target.
    pub fn clear(&mut self, colour: Colour) {
        self.target.clear(colour);
    }

    /// Open a draw batch against the bound target.
    pub fn begin_batch<'a, 's>(&'a mut self, sort: SortMode) -> Batch<'a, 's> {
        debug_assert!(!self.device.batch_open.get(), "draw batch already open");
        self.device.batch_open.set(true);
        Batch {
            device: self.device,
            target: self.target,
            sort,
            ops: Vec::new(),
        }
    }
}

impl Drop for BoundTarget<'_, '_> {
    fn drop(&mut self) {
        self.device.target_bound.set(false);
    }
}

/// An open draw batch: collects ops, executes them when closed.
///
/// Dropping the batch flushes whatever was queued and marks it closed, so
/// a failed pass still ends cleanly.
pub struct Batch<'a, 's> {
    device: &'a Device,
    target: &'a mut PixelTarget,
    sort: SortMode,
    ops: Vec<DrawOp<'s>>,
}

impl<'a, 's> Batch<'a, 's> {
    /// Open a scene scoped to a target region, with a point-sampling step
    /// mapping map-space pixels down to target-space.
    pub fn begin_scene<'b>(&'b mut self, bounds: Rect, step: u32) -> Scene<'b, 'a, 's> {
        debug_assert!(!self.device.scene_open.get(), "scene already open");
        self.device.scene_open.set(true);
        Scene {
            batch: self,
            bounds,
            step: step.max(1),
        }
    }

    fn flush(&mut self) {
        let mut ops = std::mem::take(&mut self.ops);
        if self.sort == SortMode::BackToFront {
            ops.sort_by_key(|op| op.depth);
        }
        for op in &ops {
            blit(self.target, op);
        }
    }
}

impl Drop for Batch<'_, '_> {
    fn drop(&mut self) {
        self.flush();
        self.device.batch_open.set(false);
    }
}

/// An open scene within a batch. Draw calls are clipped to its bounds.
pub struct Scene<'b, 'a, 's> {
    batch: &'b mut Batch<'a, 's>,
    bounds: Rect,
    step: u32,
}

impl<'b, 'a, 's> Scene<'b, 'a, 's> {
    /// The scene's target-region bounds.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Point-sampling step for draws issued into this scene.
    pub fn sample_step(&self) -> u32 {
        self.step
    }

    /// Queue a draw op. Ops entirely outside the scene bounds are dropped.
    pub fn draw(&mut self, mut op: DrawOp<'s>) {
        if op.dest.x >= self.bounds.x + self.bounds.width
            || op.dest.y >= self.bounds.y + self.bounds.height
        {
            return;
        }
        op.step = self.step;
        self.batch.ops.push(op);
    }
}

impl Drop for Scene<'_, '_, '_> {
    fn drop(&mut self) {
        self.batch.device.scene_open.set(false);
    }
}

/// Point-sampled alpha blit of one op onto the target.
fn blit(target: &mut PixelTarget, op: &DrawOp<'_>) {
    for dy in 0..op.dest.height {
        let ty = op.dest.y + dy;
        if ty >= target.height() {
            break;
        }
        let sy = dy * op.step;
        if sy >= op.src.height {
            break;
        }
        for dx in 0..op.dest.width {
            let tx = op.dest.x + dx;
            if tx >= target.width() {
                break;
            }
            let sx = dx * op.step;
            if sx >= op.src.width {
                break;
            }
            let colour = op.sheet.pixel(op.src.x + sx, op.src.y + sy);
            if colour.is_transparent() {
                continue;
            }
            target.blend(tx, ty, colour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_sheet(colour: Colour) -> Tilesheet {
        Tilesheet::from_pixels("s", 16, 16, 16, 16, vec![colour; 256])
    }

    fn full_rect() -> Rect {
        Rect::of_size(16, 16)
    }

    #[test]
    fn test_target_get_put() {
        let mut target = PixelTarget::new(4, 4);
        assert_eq!(target.get(0, 0), Some(Colour::TRANSPARENT));

        target.put(1, 2, Colour::WHITE);
        assert_eq!(target.get(1, 2), Some(Colour::WHITE));

        target.put(9, 9, Colour::WHITE); // ignored
        assert_eq!(target.get(4, 0), None);
    }

    #[test]
    fn test_target_clear() {
        let mut target = PixelTarget::new(2, 2);
        target.clear(Colour::BLACK);
        assert_eq!(target.get(1, 1), Some(Colour::BLACK));
    }

    #[test]
    fn test_guards_restore_device_state() {
        let device = Device::new();
        let mut target = PixelTarget::new(4, 4);
        assert!(device.is_idle());

        {
            let mut bound = device.bind_target(&mut target);
            assert!(device.target_bound());
            {
                let mut batch = bound.begin_batch(SortMode::Deferred);
                {
                    let _scene = batch.begin_scene(Rect::of_size(4, 4), 1);
                    assert!(!device.is_idle());
                }
                // scene closed, batch still open
                assert!(!device.is_idle());
            }
            assert!(device.target_bound());
        }

        assert!(device.is_idle());
    }

    #[test]
    fn test_deferred_keeps_submission_order() {
        let device = Device::new();
        let mut target = PixelTarget::new(4, 4);
        let red = solid_sheet(Colour::rgb(255, 0, 0));
        let blue = solid_sheet(Colour::rgb(0, 0, 255));

        {
            let mut bound = device.bind_target(&mut target);
            let mut batch = bound.begin_batch(SortMode::Deferred);
            let mut scene = batch.begin_scene(Rect::of_size(4, 4), 1);
            scene.draw(DrawOp::new(&red, full_rect(), 0, 0, 4, 4, 5));
            scene.draw(DrawOp::new(&blue, full_rect(), 0, 0, 4, 4, 0));
        }

        // Submission order wins regardless of depth.
        assert_eq!(target.get(0, 0), Some(Colour::rgb(0, 0, 255)));
    }

    #[test]
    fn test_back_to_front_sorts_by_depth() {
        let device = Device::new();
        let mut target = PixelTarget::new(4, 4);
        let red = solid_sheet(Colour::rgb(255, 0, 0));
        let blue = solid_sheet(Colour::rgb(0, 0, 255));

        {
            let mut bound = device.bind_target(&mut target);
            let mut batch = bound.begin_batch(SortMode::BackToFront);
            let mut scene = batch.begin_scene(Rect::of_size(4, 4), 1);
            // Nearer op submitted first; it must still draw last.
            scene.draw(DrawOp::new(&red, full_rect(), 0, 0, 4, 4, 7));
            scene.draw(DrawOp::new(&blue, full_rect(), 0, 0, 4, 4, 2));
        }

        assert_eq!(target.get(0, 0), Some(Colour::rgb(255, 0, 0)));
    }

    #[test]
    fn test_point_sampling_step() {
        // 8x8 sheet with quadrants of distinct colours; a step of 4 into a
        // 2x2 dest must pick one sample per quadrant.
        let mut pixels = vec![Colour::TRANSPARENT; 64];
        for y in 0..8u32 {
            for x in 0..8u32 {
                let c = match (x < 4, y < 4) {
                    (true, true) => Colour::rgb(255, 0, 0),
                    (false, true) => Colour::rgb(0, 255, 0),
                    (true, false) => Colour::rgb(0, 0, 255),
                    (false, false) => Colour::rgb(255, 255, 0),
                };
                pixels[(y * 8 + x) as usize] = c;
            }
        }
        let sheet = Tilesheet::from_pixels("q", 8, 8, 8, 8, pixels);

        let device = Device::new();
        let mut target = PixelTarget::new(2, 2);
        {
            let mut bound = device.bind_target(&mut target);
            let mut batch = bound.begin_batch(SortMode::Deferred);
            let mut scene = batch.begin_scene(Rect::of_size(2, 2), 4);
            scene.draw(DrawOp::new(&sheet, Rect::of_size(8, 8), 0, 0, 2, 2, 0));
        }

        assert_eq!(target.get(0, 0), Some(Colour::rgb(255, 0, 0)));
        assert_eq!(target.get(1, 0), Some(Colour::rgb(0, 255, 0)));
        assert_eq!(target.get(0, 1), Some(Colour::rgb(0, 0, 255)));
        assert_eq!(target.get(1, 1), Some(Colour::rgb(255, 255, 0)));
    }

    #[test]
    fn test_blit_clamps_to_target_edge() {
        let device = Device::new();
        let mut target = PixelTarget::new(4, 4);
        let red = solid_sheet(Colour::rgb(255, 0, 0));

        {
            let mut bound = device.bind_target(&mut target);
            let mut batch = bound.begin_batch(SortMode::Deferred);
            let mut scene = batch.begin_scene(Rect::of_size(4, 4), 1);
            scene.draw(DrawOp::new(&red, full_rect(), 2, 2, 8, 8, 0));
        }

        assert_eq!(target.get(3, 3), Some(Colour::rgb(255, 0, 0)));
        assert_eq!(target.get(1, 1), Some(Colour::TRANSPARENT));
    }

    #[test]
    fn test_draw_outside_scene_bounds_dropped() {
        let device = Device::new();
        let mut target = PixelTarget::new(8, 8);
        let red = solid_sheet(Colour::rgb(255, 0, 0));

        {
            let mut bound = device.bind_target(&mut target);
            let mut batch = bound.begin_batch(SortMode::Deferred);
            let mut scene = batch.begin_scene(Rect::of_size(4, 4), 1);
            scene.draw(DrawOp::new(&red, full_rect(), 6, 6, 2, 2, 0));
        }

        assert_eq!(target.get(6, 6), Some(Colour::TRANSPARENT));
    }

    #[test]
    fn test_alpha_blend_onto_cleared_target() {
        let device = Device::new();
        let mut target = PixelTarget::new(2, 2);
        let half = solid_sheet(Colour::new(255, 0, 0, 128));

        {
            let mut bound = device.bind_target(&mut target);
            bound.clear(Colour::BLACK);
            let mut batch = bound.begin_batch(SortMode::Deferred);
            let mut scene = batch.begin_scene(Rect::of_size(2, 2), 1);
            scene.draw(DrawOp::new(&half, full_rect(), 0, 0, 2, 2, 0));
        }

        let px = target.get(0, 0).unwrap();
        assert!(px.is_opaque());
        assert!(px.r > 100 && px.r < 140, "r was {}", px.r);
    }

    #[test]
    fn test_sequential_batches_composite() {
        let device = Device::new();
        let mut target = PixelTarget::new(2, 2);
        let red = solid_sheet(Colour::rgb(255, 0, 0));
        let green = solid_sheet(Colour::rgb(0, 255, 0));

        {
            let mut bound = device.bind_target(&mut target);
            {
                let mut batch = bound.begin_batch(SortMode::Deferred);
                let mut scene = batch.begin_scene(Rect::of_size(2, 2), 1);
                scene.draw(DrawOp::new(&red, full_rect(), 0, 0, 2, 2, 0));
            }
            {
                let mut batch = bound.begin_batch(SortMode::Deferred);
                let mut scene = batch.begin_scene(Rect::of_size(2, 2), 1);
                scene.draw(DrawOp::new(&green, full_rect(), 0, 0, 1, 1, 0));
            }
        }

        // Second batch drew over the first without an intervening clear.
        assert_eq!(target.get(0, 0), Some(Colour::rgb(0, 255, 0)));
        assert_eq!(target.get(1, 1), Some(Colour::rgb(255, 0, 0)));
    }

    #[test]
    fn test_to_rgba_buffer_layout() {
        let mut target = PixelTarget::new(2, 1);
        target.put(0, 0, Colour::rgb(1, 2, 3));
        target.put(1, 0, Colour::new(4, 5, 6, 7));

        assert_eq!(target.to_rgba_buffer(), vec![1, 2, 3, 255, 4, 5, 6, 7]);
    }
}
