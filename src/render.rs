//! Render and repaint engine
//!
//! Translates [`TileMap`] state into [`Surface`] calls. A full repaint is only
//! needed when the grid extent or the cell pixel size changes; edits inside
//! the existing extent repaint just the cells they touched.

use crate::coords::{cell_origin, square_around, CellCoord, PixelPos};
use crate::grid::TileMap;
use crate::input::CursorState;
use crate::registry::{CellCode, CellRegistry};
use crate::surface::Surface;
use image::Rgba;
use tracing::{debug, trace};

/// Extra cells repainted around the pointer so a large jump between two
/// pointer samples still erases the old cursor outline.
pub const REGION_MARGIN: u32 = 10;

/// Overlay colors, plus the color raster surfaces clear to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    pub spawn_color: Rgba<u8>,
    pub cursor_color: Rgba<u8>,
    pub background: Rgba<u8>,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            spawn_color: Rgba([255, 0, 255, 255]),
            cursor_color: Rgba([255, 255, 255, 255]),
            background: Rgba([0, 0, 0, 255]),
        }
    }
}

/// Paints a map onto a surface at a given cell pixel size.
#[derive(Debug, Clone)]
pub struct Renderer<S> {
    surface: S,
    cell_size: u32,
    style: RenderStyle,
}

impl<S: Surface> Renderer<S> {
    pub fn new(surface: S, cell_size: u32, style: RenderStyle) -> Self {
        Self { surface, cell_size, style }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Change the scale factor. The caller is responsible for the full repaint.
    pub fn set_cell_size(&mut self, cell_size: u32) {
        self.cell_size = cell_size;
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Normalize the map, size the surface to it and repaint everything.
    pub fn full_repaint(&mut self, map: &mut TileMap, registry: &CellRegistry, cursor: &CursorState) {
        self.render_map(map, registry);
        self.paint_cursor_outline(cursor);
    }

    /// Full repaint without the cursor outline, as used for exported images.
    pub fn render_map(&mut self, map: &mut TileMap, registry: &CellRegistry) {
        map.normalize();

        let width = span(map.width(), self.cell_size);
        let height = span(map.height(), self.cell_size);
        self.surface.resize(width, height);
        self.surface.clear_rect(0, 0, width, height);

        for (coord, code) in map.cells() {
            self.paint_cell(coord, code, registry);
        }
        self.paint_spawn_overlay(map);

        debug!(
            cells_wide = map.width(),
            cells_high = map.height(),
            width,
            height,
            "full repaint"
        );
    }

    /// Repaint one cell with its registry color. Returns `false` if the cell
    /// is outside the stored grid.
    pub fn repaint_cell(&mut self, map: &TileMap, registry: &CellRegistry, coord: CellCoord) -> bool {
        match map.get(coord) {
            Some(code) => self.paint_cell(coord, code, registry),
            None => false,
        }
    }

    /// Repaint the square of half-width `radius + REGION_MARGIN` cells around
    /// `pixel`, then the spawn overlay. Returns how many cells were painted.
    pub fn repaint_bounded_region(
        &mut self,
        map: &TileMap,
        registry: &CellRegistry,
        pixel: PixelPos,
        radius: u32,
    ) -> usize {
        let center = pixel.to_cell(self.cell_size);
        let mut painted = 0;

        for (x, y) in square_around(center, radius.saturating_add(REGION_MARGIN)) {
            let Some(coord) = CellCoord::from_signed(x, y) else {
                continue;
            };
            if self.repaint_cell(map, registry, coord) {
                painted += 1;
            }
        }

        self.paint_spawn_overlay(map);
        painted
    }

    /// Outline the footprint the next region fill would cover.
    pub fn paint_cursor_outline(&mut self, cursor: &CursorState) {
        let (cx, cy) = cursor.pointer.to_cell(self.cell_size);
        let radius = i64::from(cursor.radius);
        let (x, y) = cell_origin(cx - radius, cy - radius, self.cell_size);
        let side = span(2 * cursor.radius as usize + 1, self.cell_size);
        self.surface.stroke_rect(x, y, side, side, self.style.cursor_color);
    }

    /// Fill the spawn cell with the overlay color.
    pub fn paint_spawn_overlay(&mut self, map: &TileMap) {
        let spawn = map.spawn();
        let (x, y) = cell_origin(spawn.x as i64, spawn.y as i64, self.cell_size);
        self.surface.fill_rect(x, y, self.cell_size, self.cell_size, self.style.spawn_color);
    }

    fn paint_cell(&mut self, coord: CellCoord, code: CellCode, registry: &CellRegistry) -> bool {
        match registry.lookup(code) {
            Ok(def) => {
                let (x, y) = cell_origin(coord.x as i64, coord.y as i64, self.cell_size);
                self.surface.fill_rect(x, y, self.cell_size, self.cell_size, def.color);
                true
            }
            Err(e) => {
                trace!(%coord, error = %e, "skipping cell");
                false
            }
        }
    }
}

/// Pixel length of `cells` cells, saturating at `u32::MAX`.
fn span(cells: usize, cell_size: u32) -> u32 {
    let pixels = (cells as u64).saturating_mul(u64::from(cell_size));
    u32::try_from(pixels).unwrap_or(u32::MAX)
}
