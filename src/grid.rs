//! Grid store
//!
//! [`TileMap`] owns the cell array, the spawn position and the aux table, and
//! enforces the structural invariants between them:
//!
//! - after [`TileMap::normalize`] every row has the same length,
//! - the spawn cell lies inside the grid and holds [`EMPTY`],
//! - a cell whose type requires aux data owns exactly one aux record.
//!
//! The grid grows when a write lands past its current extent and never
//! shrinks on its own.

use crate::aux_data::{AuxRecord, AuxTable};
use crate::coords::CellCoord;
use crate::registry::{CellCode, CellRegistry, RegistryError, EMPTY};
use thiserror::Error;

/// Largest width or height a map may grow to by default.
pub const DEFAULT_MAX_EXTENT: usize = 1024;

/// Grid write errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("cell {coord} is beyond the {limit}x{limit} extent limit")]
    ExtentLimit { coord: CellCoord, limit: usize },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Outcome of a successful [`TileMap::set_cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellWrite {
    /// A cell inside the existing extent changed from `previous`.
    Updated { previous: CellCode },
    /// The grid grew to include the cell; the drawable surface must be resized.
    Grew,
}

/// What a [`TileMap::normalize`] pass had to fix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Rows padded with empty cells to the common width.
    pub padded_rows: usize,
    /// The grid grew to contain the spawn position.
    pub grew_for_spawn: bool,
    /// The spawn cell held a non-empty type and was cleared.
    pub spawn_cleared: bool,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// The editable map: cells, spawn position and aux data.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    /// Indexed as `rows[y][x]`. May be ragged until the next normalize.
    rows: Vec<Vec<CellCode>>,
    spawn: CellCoord,
    aux: AuxTable,
    max_extent: usize,
}

impl TileMap {
    /// An empty `width` x `height` map with the spawn at the origin.
    pub fn new(width: usize, height: usize) -> Self {
        let mut map = Self::from_rows(vec![vec![EMPTY; width]; height], CellCoord::default());
        map.normalize();
        map
    }

    /// Wrap existing rows without normalizing them.
    pub fn from_rows(rows: Vec<Vec<CellCode>>, spawn: CellCoord) -> Self {
        Self { rows, spawn, aux: AuxTable::new(), max_extent: DEFAULT_MAX_EXTENT }
    }

    pub fn with_max_extent(mut self, max_extent: usize) -> Self {
        self.max_extent = max_extent;
        self
    }

    pub fn max_extent(&self) -> usize {
        self.max_extent
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<CellCode>] {
        &self.rows
    }

    pub fn spawn(&self) -> CellCoord {
        self.spawn
    }

    pub fn aux(&self) -> &AuxTable {
        &self.aux
    }

    pub fn aux_mut(&mut self) -> &mut AuxTable {
        &mut self.aux
    }

    /// Whether `coord` lies in `[0, width) x [0, height)`.
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.y < self.height() && coord.x < self.width()
    }

    /// The stored code at `coord`, or `None` outside the stored cells.
    pub fn get(&self, coord: CellCoord) -> Option<CellCode> {
        self.rows.get(coord.y).and_then(|row| row.get(coord.x)).copied()
    }

    /// All stored cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, CellCode)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, &code)| (CellCoord::new(x, y), code))
        })
    }

    /// Grow the grid so it covers at least `width` x `height`, padding every
    /// row with empty cells. Returns whether anything grew.
    pub fn ensure_extent(&mut self, width: usize, height: usize) -> bool {
        let width = width.max(self.width());
        let mut grew = false;

        if self.rows.len() < height {
            self.rows.resize_with(height, Vec::new);
            grew = true;
        }
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, EMPTY);
                grew = true;
            }
        }
        grew
    }

    /// Write `code` at `coord`, growing the grid if needed.
    ///
    /// Aux bookkeeping: the old record goes first if the old type required one,
    /// then a fresh default record is created if the new type requires one.
    pub fn set_cell(
        &mut self,
        coord: CellCoord,
        code: CellCode,
        registry: &CellRegistry,
    ) -> Result<CellWrite, GridError> {
        let def = registry.lookup(code)?;
        if coord.x >= self.max_extent || coord.y >= self.max_extent {
            return Err(GridError::ExtentLimit { coord, limit: self.max_extent });
        }

        let inside = self.rows.get(coord.y).is_some_and(|row| coord.x < row.len());
        if !inside {
            self.ensure_extent(coord.x + 1, coord.y + 1);
        }

        let previous = self.rows[coord.y][coord.x];
        if registry.requires_aux(previous) {
            self.aux.remove(coord);
        }
        self.rows[coord.y][coord.x] = code;
        if def.requires_aux {
            self.aux.insert(AuxRecord::with_defaults(coord, &def.aux_defaults));
        }

        Ok(if inside { CellWrite::Updated { previous } } else { CellWrite::Grew })
    }

    /// Move the spawn to `coord`, clearing the cell under it.
    ///
    /// Returns the previous spawn, or `None` (and changes nothing) when
    /// `coord` lies outside the grid.
    pub fn relocate_spawn(&mut self, coord: CellCoord) -> Option<CellCoord> {
        if !self.contains(coord) {
            return None;
        }
        let row = &mut self.rows[coord.y];
        if row.len() <= coord.x {
            row.resize(coord.x + 1, EMPTY);
        }

        let previous = self.spawn;
        self.clear_spawn_cell_at(coord);
        self.spawn = coord;
        Some(previous)
    }

    /// Make the grid rectangular and the spawn cell empty.
    ///
    /// Running it twice in a row changes nothing the second time.
    pub fn normalize(&mut self) -> NormalizeReport {
        let mut report = NormalizeReport::default();

        if !self.contains(self.spawn) {
            self.ensure_extent(self.spawn.x + 1, self.spawn.y + 1);
            report.grew_for_spawn = true;
        }

        let width = self.width();
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, EMPTY);
                report.padded_rows += 1;
            }
        }

        let spawn = self.spawn;
        if self.rows[spawn.y][spawn.x] != EMPTY {
            self.clear_spawn_cell_at(spawn);
            report.spawn_cleared = true;
        }

        report
    }

    /// Whether a normalize pass would change nothing.
    pub fn is_normalized(&self) -> bool {
        let width = self.width();
        self.rows.iter().all(|row| row.len() == width) && self.get(self.spawn) == Some(EMPTY)
    }

    /// Give every aux-typed cell a record and drop records on other cells.
    ///
    /// Returns `(created, dropped)`.
    pub fn reconcile_aux(&mut self, registry: &CellRegistry) -> (usize, usize) {
        let before = self.aux.len();
        let rows = &self.rows;
        self.aux.retain(|record| {
            let code = rows.get(record.cell.y).and_then(|row| row.get(record.cell.x));
            code.is_some_and(|&code| registry.requires_aux(code))
        });
        let dropped = before - self.aux.len();

        let mut created = 0;
        for (y, row) in self.rows.iter().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                let coord = CellCoord::new(x, y);
                let Ok(def) = registry.lookup(code) else {
                    continue;
                };
                if def.requires_aux && !self.aux.contains(coord) {
                    self.aux.insert(AuxRecord::with_defaults(coord, &def.aux_defaults));
                    created += 1;
                }
            }
        }

        (created, dropped)
    }

    fn clear_spawn_cell_at(&mut self, coord: CellCoord) {
        self.rows[coord.y][coord.x] = EMPTY;
        self.aux.remove(coord);
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(1, 1)
    }
}
