//! Input events, key bindings and the placement tick
//!
//! Raw events update [`CursorState`] immediately; the [`TickClock`] decides
//! when a held button turns into another region pass.

use crate::config::KeysConfig;
use crate::coords::PixelPos;
use crate::registry::{CellCode, CellRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the primary button paints with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brush {
    /// Place cells of this type.
    Cell(CellCode),
    /// Move the spawn position. Never written into the grid.
    Spawn,
}

impl Default for Brush {
    fn default() -> Self {
        Brush::Cell(1)
    }
}

/// Transient pointer and selection state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    /// Last pointer position in canvas pixels.
    pub pointer: PixelPos,
    pub primary_down: bool,
    pub secondary_down: bool,
    pub brush: Brush,
    /// Half-width of the region fill square, in cells.
    pub radius: u32,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            pointer: PixelPos::default(),
            primary_down: false,
            secondary_down: false,
            brush: Brush::default(),
            radius: 1,
        }
    }
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Primary,
    Secondary,
    Middle,
}

/// One discrete input event.
///
/// Serialized as a tagged object, e.g. `{"event": "pointer_move", "x": 10, "y": 4}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { button: Button },
    PointerUp { button: Button },
    PointerMove { x: i32, y: i32 },
    /// Negative deltas scroll up (zoom in).
    Wheel { delta: f64 },
    Key { key: String },
    /// Timestamp sample driving continuous placement.
    Tick { time_ms: u64 },
}

/// What a key press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Select(CellCode),
    SelectSpawn,
    Save,
    GrowRadius,
    ShrinkRadius,
}

/// Key to command table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyBindings {
    bindings: HashMap<String, KeyCommand>,
}

impl KeyBindings {
    /// Bindings from config. Cell selection defaults to the digit keys for
    /// the first ten cell types when the config names none.
    pub fn from_config(keys: &KeysConfig, registry: &CellRegistry) -> Self {
        let mut bindings = HashMap::new();

        if keys.select.is_empty() {
            for code in 0..registry.len().min(10) {
                bindings.insert(code.to_string(), KeyCommand::Select(code as CellCode));
            }
        } else {
            for (key, &code) in &keys.select {
                if let Ok(code) = CellCode::try_from(code) {
                    if registry.lookup(code).is_ok() {
                        bindings.insert(key.clone(), KeyCommand::Select(code));
                    }
                }
            }
        }

        bindings.insert(keys.spawn.clone(), KeyCommand::SelectSpawn);
        bindings.insert(keys.save.clone(), KeyCommand::Save);
        bindings.insert(keys.grow_radius.clone(), KeyCommand::GrowRadius);
        bindings.insert(keys.shrink_radius.clone(), KeyCommand::ShrinkRadius);

        Self { bindings }
    }

    pub fn resolve(&self, key: &str) -> Option<KeyCommand> {
        self.bindings.get(key).copied()
    }

    pub fn bind(&mut self, key: impl Into<String>, command: KeyCommand) {
        self.bindings.insert(key.into(), command);
    }

    /// Bindings sorted by key, for display.
    pub fn sorted(&self) -> Vec<(&str, KeyCommand)> {
        let mut entries: Vec<_> = self.bindings.iter().map(|(k, &c)| (k.as_str(), c)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Fixed-rate sampler for continuous placement.
///
/// At most one tick is reported per call, however much time has passed, so
/// grid mutation is bounded by the tick rate rather than the event rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickClock {
    interval_ms: u64,
    last: Option<u64>,
}

impl TickClock {
    /// A clock firing `rate_hz` times per second.
    pub fn new(rate_hz: u32) -> Self {
        let interval_ms = 1000 / u64::from(rate_hz.max(1));
        Self { interval_ms: interval_ms.max(1), last: None }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Whether a tick is due at `now_ms`. Consumes the tick if so.
    pub fn due(&mut self, now_ms: u64) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if due {
            self.last = Some(now_ms);
        }
        due
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(60)
    }
}
