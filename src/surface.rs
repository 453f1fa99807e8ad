//! Drawing surfaces
//!
//! The renderer only needs four primitives, all in pixel units. [`Surface`]
//! is the seam to whatever actually shows the canvas; this module ships a
//! raster implementation backed by an [`RgbaImage`] (used for PNG output) and
//! a recording implementation that keeps the call log.

use image::{Rgba, RgbaImage};

/// A drawable canvas.
pub trait Surface {
    /// Fill a rectangle with a solid color.
    fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba<u8>);

    /// Draw a one-pixel outline along the inside edge of a rectangle.
    fn stroke_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba<u8>);

    /// Reset a rectangle to the surface's clear color.
    fn clear_rect(&mut self, x: i64, y: i64, width: u32, height: u32);

    /// Change the canvas dimensions. Existing contents are discarded.
    fn resize(&mut self, width: u32, height: u32);

    /// Current canvas dimensions.
    fn size(&self) -> (u32, u32);
}

/// One primitive call, as seen by a [`RecordingSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Fill { x: i64, y: i64, width: u32, height: u32, color: Rgba<u8> },
    Stroke { x: i64, y: i64, width: u32, height: u32, color: Rgba<u8> },
    Clear { x: i64, y: i64, width: u32, height: u32 },
    Resize { width: u32, height: u32 },
}

/// A surface that only records what was drawn.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
    width: u32,
    height: u32,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Drain the call log.
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Filled rectangles in call order, as `(x, y, color)`.
    pub fn fills(&self) -> Vec<(i64, i64, Rgba<u8>)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                DrawCall::Fill { x, y, color, .. } => Some((x, y, color)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba<u8>) {
        self.calls.push(DrawCall::Fill { x, y, width, height, color });
    }

    fn stroke_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba<u8>) {
        self.calls.push(DrawCall::Stroke { x, y, width, height, color });
    }

    fn clear_rect(&mut self, x: i64, y: i64, width: u32, height: u32) {
        self.calls.push(DrawCall::Clear { x, y, width, height });
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.calls.push(DrawCall::Resize { width, height });
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// An in-memory RGBA canvas. Drawing outside the image is clipped.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
    clear_color: Rgba<u8>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::new(width, height), clear_color: Rgba([0, 0, 0, 0]) }
    }

    /// Use `color` for cleared pixels instead of transparent black.
    pub fn with_clear_color(mut self, color: Rgba<u8>) -> Self {
        self.clear_color = color;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.image.get_pixel_checked(x, y).copied()
    }

    /// Clip a rectangle to the canvas, returning pixel ranges.
    fn clip(&self, x: i64, y: i64, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let (cw, ch) = (i64::from(self.image.width()), i64::from(self.image.height()));
        let x0 = x.clamp(0, cw);
        let y0 = y.clamp(0, ch);
        let x1 = (x + i64::from(width)).clamp(0, cw);
        let y1 = (y + i64::from(height)).clamp(0, ch);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn paint(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba<u8>) {
        if let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) {
            for py in y0..y1 {
                for px in x0..x1 {
                    self.image.put_pixel(px, py, color);
                }
            }
        }
    }
}

impl Surface for RasterSurface {
    fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba<u8>) {
        self.paint(x, y, width, height, color);
    }

    fn stroke_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba<u8>) {
        if width == 0 || height == 0 {
            return;
        }
        let right = x + i64::from(width) - 1;
        let bottom = y + i64::from(height) - 1;
        self.paint(x, y, width, 1, color);
        self.paint(x, bottom, width, 1, color);
        self.paint(x, y, 1, height, color);
        self.paint(right, y, 1, height, color);
    }

    fn clear_rect(&mut self, x: i64, y: i64, width: u32, height: u32) {
        let color = self.clear_color;
        self.paint(x, y, width, height, color);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::from_pixel(width, height, self.clear_color);
    }

    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn test_fill_rect() {
        let mut surface = RasterSurface::new(4, 4);
        surface.fill_rect(1, 1, 2, 2, RED);
        assert_eq!(surface.pixel(1, 1), Some(RED));
        assert_eq!(surface.pixel(2, 2), Some(RED));
        assert_eq!(surface.pixel(0, 0), Some(CLEAR));
        assert_eq!(surface.pixel(3, 3), Some(CLEAR));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut surface = RasterSurface::new(4, 4);
        surface.fill_rect(-2, -2, 3, 3, RED);
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(1, 1), Some(CLEAR));

        surface.fill_rect(10, 10, 5, 5, RED);
        assert_eq!(surface.pixel(3, 3), Some(CLEAR));
    }

    #[test]
    fn test_stroke_rect_outline_only() {
        let mut surface = RasterSurface::new(5, 5);
        surface.stroke_rect(0, 0, 5, 5, RED);
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(4, 2), Some(RED));
        assert_eq!(surface.pixel(2, 4), Some(RED));
        assert_eq!(surface.pixel(2, 2), Some(CLEAR));
    }

    #[test]
    fn test_clear_rect_uses_clear_color() {
        let bg = Rgba([9, 9, 9, 255]);
        let mut surface = RasterSurface::new(2, 2).with_clear_color(bg);
        surface.fill_rect(0, 0, 2, 2, RED);
        surface.clear_rect(0, 0, 1, 1);
        assert_eq!(surface.pixel(0, 0), Some(bg));
        assert_eq!(surface.pixel(1, 1), Some(RED));
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut surface = RasterSurface::new(2, 2);
        surface.fill_rect(0, 0, 2, 2, RED);
        surface.resize(3, 1);
        assert_eq!(surface.size(), (3, 1));
        assert_eq!(surface.pixel(0, 0), Some(CLEAR));
        assert_eq!(surface.pixel(0, 1), None);
    }

    #[test]
    fn test_recording_surface() {
        let mut surface = RecordingSurface::new();
        surface.resize(8, 8);
        surface.fill_rect(0, 0, 4, 4, RED);
        surface.stroke_rect(-4, -4, 12, 12, RED);
        assert_eq!(surface.size(), (8, 8));
        assert_eq!(surface.fills(), vec![(0, 0, RED)]);
        assert_eq!(surface.take_calls().len(), 3);
        assert!(surface.calls().is_empty());
    }
}
