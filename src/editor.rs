//! Editing session
//!
//! [`Editor`] is the single live editing context: the map, the registry, the
//! renderer and the cursor. Every edit updates the map first and then issues
//! the smallest repaint that keeps the canvas correct; anything that changes
//! the grid extent or the cell pixel size triggers a full repaint instead.
//!
//! Out-of-range cells never surface as errors. They are skipped, so a region
//! fill that runs over the map edge paints what it can.

use crate::config::{GridpaintConfig, CURSOR_RADIUS_LIMIT};
use crate::coords::{square_around, CellCoord, PixelPos};
use crate::grid::{CellWrite, TileMap};
use crate::input::{Brush, Button, CursorState, InputEvent, KeyBindings, KeyCommand, TickClock};
use crate::map_file::{snapshot, MapSnapshot};
use crate::registry::{CellCode, CellRegistry, EMPTY};
use crate::render::{RenderStyle, Renderer};
use crate::surface::Surface;
use tracing::{debug, trace};

/// Session settings that do not live in the map.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    pub cell_size: u32,
    pub min_cell_size: u32,
    pub max_cell_size: u32,
    pub zoom_step: u32,
    pub cursor_radius: u32,
    pub max_cursor_radius: u32,
    pub tick_rate: u32,
    pub style: RenderStyle,
    pub keys: KeyBindings,
}

impl EditorOptions {
    /// Options from a loaded config. Colors were validated when the config
    /// was loaded; anything unparseable falls back to the default style.
    pub fn from_config(config: &GridpaintConfig, registry: &CellRegistry) -> Self {
        let editor = &config.editor;
        Self {
            cell_size: editor.cell_size,
            min_cell_size: editor.min_cell_size,
            max_cell_size: editor.max_cell_size,
            zoom_step: editor.zoom_step,
            cursor_radius: editor.cursor_radius,
            max_cursor_radius: editor.max_cursor_radius,
            tick_rate: editor.tick_rate,
            style: config.style.render_style().unwrap_or_default(),
            keys: KeyBindings::from_config(&config.keys, registry),
        }
    }
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self::from_config(&GridpaintConfig::default(), &CellRegistry::builtin())
    }
}

/// Result of a single-cell edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The cell changed inside the existing extent and was repainted.
    Painted(CellCoord),
    /// The grid grew to include the cell and the canvas was fully repainted.
    Grew(CellCoord),
    /// The cell could not be written (negative, past the extent limit, or
    /// an unknown code). Nothing changed.
    Skipped,
}

/// Summary of one region pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionOutcome {
    pub painted: usize,
    pub skipped: usize,
    /// At least one cell grew the grid, so the pass ended in a full repaint.
    pub grew: bool,
}

/// What the caller should do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Handled,
    Ignored,
    /// The save key was pressed; persist this payload.
    Save(MapSnapshot),
}

/// One live editing session.
pub struct Editor<S> {
    map: TileMap,
    registry: CellRegistry,
    renderer: Renderer<S>,
    cursor: CursorState,
    keys: KeyBindings,
    clock: TickClock,
    options: EditorOptions,
}

impl<S: Surface> Editor<S> {
    /// Start a session and paint the initial canvas.
    pub fn new(map: TileMap, registry: CellRegistry, surface: S, options: EditorOptions) -> Self {
        let renderer = Renderer::new(surface, options.cell_size, options.style);
        let cursor = CursorState {
            radius: options.cursor_radius.min(options.max_cursor_radius.min(CURSOR_RADIUS_LIMIT)),
            ..CursorState::default()
        };
        let mut editor = Self {
            map,
            registry,
            renderer,
            cursor,
            keys: options.keys.clone(),
            clock: TickClock::new(options.tick_rate),
            options,
        };
        editor.full_repaint();
        editor
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    pub fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    pub fn renderer(&self) -> &Renderer<S> {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.renderer.surface_mut()
    }

    pub fn cell_size(&self) -> u32 {
        self.renderer.cell_size()
    }

    /// End the session, handing back the map and the surface.
    pub fn into_parts(self) -> (TileMap, S) {
        (self.map, self.renderer.into_surface())
    }

    /// Normalize, resize the canvas and repaint everything.
    pub fn full_repaint(&mut self) {
        self.renderer.full_repaint(&mut self.map, &self.registry, &self.cursor);
    }

    /// Place `code` in the cell under `pixel`.
    pub fn place_cell(&mut self, pixel: PixelPos, code: CellCode) -> Placement {
        let placement = self.write_cell(pixel.to_cell(self.cell_size()), code);
        match placement {
            Placement::Painted(coord) => {
                self.renderer.repaint_cell(&self.map, &self.registry, coord);
                if coord == self.map.spawn() {
                    self.renderer.paint_spawn_overlay(&self.map);
                }
            }
            Placement::Grew(_) => self.full_repaint(),
            Placement::Skipped => {}
        }
        placement
    }

    /// Place `code` over the cursor-radius square around `pixel`.
    ///
    /// Cells that cannot be written are skipped; the rest of the square is
    /// still painted. The spawn overlay is repainted last.
    pub fn place_region(&mut self, pixel: PixelPos, code: CellCode) -> RegionOutcome {
        let center = pixel.to_cell(self.cell_size());
        let mut outcome = RegionOutcome::default();

        for (x, y) in square_around(center, self.cursor.radius) {
            match self.write_cell((x, y), code) {
                Placement::Painted(coord) => {
                    // a full repaint is coming, per-cell repaints would be wasted
                    if !outcome.grew {
                        self.renderer.repaint_cell(&self.map, &self.registry, coord);
                    }
                    outcome.painted += 1;
                }
                Placement::Grew(_) => {
                    outcome.grew = true;
                    outcome.painted += 1;
                }
                Placement::Skipped => outcome.skipped += 1,
            }
        }

        if outcome.grew {
            self.full_repaint();
        } else {
            self.renderer.paint_spawn_overlay(&self.map);
        }
        outcome
    }

    pub fn erase_cell(&mut self, pixel: PixelPos) -> Placement {
        self.place_cell(pixel, EMPTY)
    }

    pub fn erase_region(&mut self, pixel: PixelPos) -> RegionOutcome {
        self.place_region(pixel, EMPTY)
    }

    /// Move the spawn to `coord`. Out-of-bounds targets are ignored.
    pub fn relocate_spawn(&mut self, coord: CellCoord) -> bool {
        match self.map.relocate_spawn(coord) {
            Some(previous) => {
                self.renderer.repaint_cell(&self.map, &self.registry, previous);
                self.renderer.repaint_cell(&self.map, &self.registry, coord);
                self.renderer.paint_spawn_overlay(&self.map);
                debug!(from = %previous, to = %coord, "spawn moved");
                true
            }
            None => {
                trace!(%coord, "spawn target outside grid");
                false
            }
        }
    }

    /// Change the cell pixel size and repaint. Callers clamp the value.
    pub fn resize_cell_pixel_size(&mut self, cell_size: u32) {
        self.renderer.set_cell_size(cell_size);
        self.full_repaint();
    }

    /// Set the region radius. Values above the configured maximum, or above
    /// [`CURSOR_RADIUS_LIMIT`], are rejected and leave the radius unchanged.
    pub fn set_cursor_radius(&mut self, radius: u32) -> bool {
        let max = self.options.max_cursor_radius.min(CURSOR_RADIUS_LIMIT);
        if radius > max {
            trace!(radius, max, "radius rejected");
            return false;
        }
        self.cursor.radius = radius;
        self.refresh_cursor();
        true
    }

    pub fn select_brush(&mut self, brush: Brush) {
        self.cursor.brush = brush;
    }

    /// Capture the map for saving. Normalizes first.
    pub fn snapshot(&mut self) -> MapSnapshot {
        snapshot(&mut self.map)
    }

    /// Apply one input event.
    pub fn handle_event(&mut self, event: &InputEvent) -> Response {
        match event {
            InputEvent::PointerDown { button } => self.set_button(*button, true),
            InputEvent::PointerUp { button } => self.set_button(*button, false),
            InputEvent::PointerMove { x, y } => {
                self.cursor.pointer = PixelPos::new(*x, *y);
                self.refresh_cursor();
                Response::Handled
            }
            InputEvent::Wheel { delta } => self.zoom(*delta),
            InputEvent::Key { key } => match self.keys.resolve(key) {
                Some(command) => self.run_command(command),
                None => Response::Ignored,
            },
            InputEvent::Tick { time_ms } => {
                if self.tick(*time_ms) {
                    Response::Handled
                } else {
                    Response::Ignored
                }
            }
        }
    }

    /// Run one placement pass if a button is held and a tick is due.
    ///
    /// Primary paints with the selected brush, secondary erases. When both
    /// are held, primary wins.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if !self.cursor.primary_down && !self.cursor.secondary_down {
            return false;
        }
        if !self.clock.due(now_ms) {
            return false;
        }

        let pointer = self.cursor.pointer;
        if self.cursor.primary_down {
            match self.cursor.brush {
                Brush::Cell(code) => {
                    self.place_region(pointer, code);
                }
                Brush::Spawn => {
                    let (x, y) = pointer.to_cell(self.cell_size());
                    if let Some(coord) = CellCoord::from_signed(x, y) {
                        self.relocate_spawn(coord);
                    }
                }
            }
        } else {
            self.erase_region(pointer);
        }
        self.renderer.paint_cursor_outline(&self.cursor);
        true
    }

    fn run_command(&mut self, command: KeyCommand) -> Response {
        match command {
            KeyCommand::Select(code) => self.select_brush(Brush::Cell(code)),
            KeyCommand::SelectSpawn => self.select_brush(Brush::Spawn),
            KeyCommand::Save => return Response::Save(self.snapshot()),
            KeyCommand::GrowRadius => {
                self.set_cursor_radius(self.cursor.radius.saturating_add(1));
            }
            KeyCommand::ShrinkRadius => {
                if let Some(radius) = self.cursor.radius.checked_sub(1) {
                    self.set_cursor_radius(radius);
                }
            }
        }
        Response::Handled
    }

    fn set_button(&mut self, button: Button, down: bool) -> Response {
        match button {
            Button::Primary => self.cursor.primary_down = down,
            Button::Secondary => self.cursor.secondary_down = down,
            Button::Middle => return Response::Ignored,
        }
        Response::Handled
    }

    /// Wheel up zooms in, wheel down zooms out, within the configured range.
    fn zoom(&mut self, delta: f64) -> Response {
        let current = self.cell_size();
        let step = self.options.zoom_step;
        let target = if delta < 0.0 {
            current.saturating_add(step)
        } else if delta > 0.0 {
            current.saturating_sub(step)
        } else {
            return Response::Ignored;
        };
        let target = target.clamp(self.options.min_cell_size, self.options.max_cell_size);
        if target == current {
            return Response::Ignored;
        }
        self.resize_cell_pixel_size(target);
        Response::Handled
    }

    fn refresh_cursor(&mut self) {
        self.renderer.repaint_bounded_region(
            &self.map,
            &self.registry,
            self.cursor.pointer,
            self.cursor.radius,
        );
        self.renderer.paint_cursor_outline(&self.cursor);
    }

    fn write_cell(&mut self, (x, y): (i64, i64), code: CellCode) -> Placement {
        let Some(coord) = CellCoord::from_signed(x, y) else {
            trace!(x, y, "skipping negative cell");
            return Placement::Skipped;
        };
        match self.map.set_cell(coord, code, &self.registry) {
            Ok(CellWrite::Updated { .. }) => Placement::Painted(coord),
            Ok(CellWrite::Grew) => {
                debug!(%coord, width = self.map.width(), height = self.map.height(), "grid grew");
                Placement::Grew(coord)
            }
            Err(e) => {
                trace!(%coord, error = %e, "skipping cell");
                Placement::Skipped
            }
        }
    }
}
