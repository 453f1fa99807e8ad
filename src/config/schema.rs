//! Configuration schema types for `gridpaint.toml`
//!
//! Defines the structure and validation rules for editor configuration.

use crate::color::{parse_color, ColorError};
use crate::grid::DEFAULT_MAX_EXTENT;
use crate::render::RenderStyle;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Upper bound for `editor.max_cursor_radius`, in cells.
pub const CURSOR_RADIUS_LIMIT: u32 = 20;

/// Editing and canvas settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Initial cell edge length in pixels
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,
    /// Smallest cell size reachable by zooming
    #[serde(default = "default_min_cell_size")]
    pub min_cell_size: u32,
    /// Largest cell size reachable by zooming
    #[serde(default = "default_max_cell_size")]
    pub max_cell_size: u32,
    /// Pixels added or removed per wheel notch
    #[serde(default = "default_zoom_step")]
    pub zoom_step: u32,
    /// Initial region fill radius, in cells
    #[serde(default = "default_cursor_radius")]
    pub cursor_radius: u32,
    #[serde(default = "default_max_cursor_radius")]
    pub max_cursor_radius: u32,
    /// Placement passes per second while a button is held
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Largest width or height the grid may grow to
    #[serde(default = "default_max_extent")]
    pub max_extent: usize,
}

fn default_cell_size() -> u32 {
    16
}

fn default_min_cell_size() -> u32 {
    4
}

fn default_max_cell_size() -> u32 {
    80
}

fn default_zoom_step() -> u32 {
    2
}

fn default_cursor_radius() -> u32 {
    1
}

fn default_max_cursor_radius() -> u32 {
    CURSOR_RADIUS_LIMIT
}

fn default_tick_rate() -> u32 {
    60
}

fn default_max_extent() -> usize {
    DEFAULT_MAX_EXTENT
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            min_cell_size: default_min_cell_size(),
            max_cell_size: default_max_cell_size(),
            zoom_step: default_zoom_step(),
            cursor_radius: default_cursor_radius(),
            max_cursor_radius: default_max_cursor_radius(),
            tick_rate: default_tick_rate(),
            max_extent: default_max_extent(),
        }
    }
}

/// Settings for newly created maps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_width")]
    pub default_width: usize,
    #[serde(default = "default_height")]
    pub default_height: usize,
}

fn default_width() -> usize {
    32
}

fn default_height() -> usize {
    18
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { default_width: default_width(), default_height: default_height() }
    }
}

/// Overlay and background colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_spawn_color")]
    pub spawn_color: String,
    #[serde(default = "default_cursor_color")]
    pub cursor_color: String,
    /// Color of cleared canvas pixels in PNG output
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_spawn_color() -> String {
    "#ff00ff".to_string()
}

fn default_cursor_color() -> String {
    "#ffffff".to_string()
}

fn default_background() -> String {
    "#000000".to_string()
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            spawn_color: default_spawn_color(),
            cursor_color: default_cursor_color(),
            background: default_background(),
        }
    }
}

impl StyleConfig {
    pub fn render_style(&self) -> Result<RenderStyle, ColorError> {
        Ok(RenderStyle {
            spawn_color: parse_color(&self.spawn_color)?,
            cursor_color: parse_color(&self.cursor_color)?,
            background: parse_color(&self.background)?,
        })
    }
}

/// Key bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default = "default_save_key")]
    pub save: String,
    /// Selects the spawn brush
    #[serde(default = "default_spawn_key")]
    pub spawn: String,
    #[serde(default = "default_grow_key")]
    pub grow_radius: String,
    #[serde(default = "default_shrink_key")]
    pub shrink_radius: String,
    /// Key -> cell code. Empty means digits select the first ten cell types.
    #[serde(default)]
    pub select: HashMap<String, u32>,
}

fn default_save_key() -> String {
    "s".to_string()
}

fn default_spawn_key() -> String {
    "p".to_string()
}

fn default_grow_key() -> String {
    "]".to_string()
}

fn default_shrink_key() -> String {
    "[".to_string()
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            save: default_save_key(),
            spawn: default_spawn_key(),
            grow_radius: default_grow_key(),
            shrink_radius: default_shrink_key(),
            select: HashMap::new(),
        }
    }
}

/// One `[[cells]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellConfig {
    /// Must equal the entry's position in the list
    pub code: u32,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub requires_aux: bool,
    /// Fields copied into each new aux record of this type
    #[serde(default)]
    pub aux_defaults: Map<String, Value>,
}

/// Complete gridpaint.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridpaintConfig {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    /// Cell registry. Empty means the built-in table.
    #[serde(default)]
    pub cells: Vec<CellConfig>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "editor.cell_size")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gridpaint.toml: '{}' {}", self.field, self.message)
    }
}

impl GridpaintConfig {
    /// Validate the configuration and return any errors.
    ///
    /// Cell codes are not checked here; the registry rejects a misordered
    /// table when it is built.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigValidationError { field: field.to_string(), message });
        };

        let editor = &self.editor;
        if editor.min_cell_size == 0 {
            push("editor.min_cell_size", "must be a positive integer".to_string());
        }
        if editor.min_cell_size > editor.max_cell_size {
            push(
                "editor.max_cell_size",
                format!("must be at least min_cell_size ({})", editor.min_cell_size),
            );
        }
        if editor.cell_size < editor.min_cell_size || editor.cell_size > editor.max_cell_size {
            push(
                "editor.cell_size",
                format!("must be within {}..={}", editor.min_cell_size, editor.max_cell_size),
            );
        }
        if editor.zoom_step == 0 {
            push("editor.zoom_step", "must be a positive integer".to_string());
        }
        if editor.max_cursor_radius > CURSOR_RADIUS_LIMIT {
            push(
                "editor.max_cursor_radius",
                format!("must not exceed {}", CURSOR_RADIUS_LIMIT),
            );
        }
        if editor.cursor_radius > editor.max_cursor_radius {
            push(
                "editor.cursor_radius",
                format!("must not exceed max_cursor_radius ({})", editor.max_cursor_radius),
            );
        }
        if editor.tick_rate == 0 || editor.tick_rate > 1000 {
            push("editor.tick_rate", "must be within 1..=1000".to_string());
        }
        if editor.max_extent == 0 {
            push("editor.max_extent", "must be a positive integer".to_string());
        }

        if self.map.default_width == 0 || self.map.default_width > editor.max_extent {
            push("map.default_width", format!("must be within 1..={}", editor.max_extent));
        }
        if self.map.default_height == 0 || self.map.default_height > editor.max_extent {
            push("map.default_height", format!("must be within 1..={}", editor.max_extent));
        }

        for (field, value) in [
            ("style.spawn_color", &self.style.spawn_color),
            ("style.cursor_color", &self.style.cursor_color),
            ("style.background", &self.style.background),
        ] {
            if let Err(e) = parse_color(value) {
                push(field, format!("is not a color: {}", e));
            }
        }

        let mut seen = HashSet::new();
        for (field, key) in [
            ("keys.save", &self.keys.save),
            ("keys.spawn", &self.keys.spawn),
            ("keys.grow_radius", &self.keys.grow_radius),
            ("keys.shrink_radius", &self.keys.shrink_radius),
        ] {
            if key.is_empty() {
                push(field, "must not be empty".to_string());
            } else if !seen.insert(key.as_str()) || self.keys.select.contains_key(key) {
                push(field, format!("key '{}' is bound more than once", key));
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
