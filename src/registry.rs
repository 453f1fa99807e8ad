//! Cell registry
//!
//! The registry is the ordered table of cell types a map may contain. A cell's
//! code is its index in the table; the table is checked once when it is built
//! and a mismatch is fatal.

use crate::color::{parse_color, ColorError};
use crate::config::CellConfig;
use image::Rgba;
use serde_json::{Map, Value};
use thiserror::Error;

/// Code stored in the grid for one cell.
pub type CellCode = u8;

/// The empty cell. Always present, always code 0.
pub const EMPTY: CellCode = 0;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("cell registry is empty")]
    Empty,
    #[error("cell at index {index} declares code {code}; codes must match table order")]
    CodeMismatch { index: usize, code: u32 },
    #[error("invalid cell code {0}")]
    InvalidCode(u32),
    #[error("too many cell types ({0}), at most 256 are supported")]
    TooMany(usize),
    #[error("cell '{name}': {source}")]
    Color {
        name: String,
        #[source]
        source: ColorError,
    },
}

/// One cell type.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDefinition {
    pub code: CellCode,
    pub name: String,
    pub color: Rgba<u8>,
    /// Cells of this type carry an aux record keyed by their coordinate.
    pub requires_aux: bool,
    /// Extra fields copied into every fresh aux record for this type.
    pub aux_defaults: Map<String, Value>,
}

impl CellDefinition {
    pub fn new(code: CellCode, name: impl Into<String>, color: Rgba<u8>) -> Self {
        Self { code, name: name.into(), color, requires_aux: false, aux_defaults: Map::new() }
    }

    /// Mark this type as carrying aux data with the given default fields.
    pub fn with_aux(mut self, defaults: Map<String, Value>) -> Self {
        self.requires_aux = true;
        self.aux_defaults = defaults;
        self
    }
}

/// Ordered, validated table of cell definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRegistry {
    cells: Vec<CellDefinition>,
}

impl CellRegistry {
    /// Build a registry, failing if the table is out of order.
    pub fn new(cells: Vec<CellDefinition>) -> Result<Self, RegistryError> {
        let registry = Self { cells };
        registry.validate()?;
        Ok(registry)
    }

    /// The default level palette.
    pub fn builtin() -> Self {
        let mut sign_defaults = Map::new();
        sign_defaults.insert("message".to_string(), Value::String(String::new()));

        Self {
            cells: vec![
                CellDefinition::new(0, "empty", Rgba([30, 30, 30, 255])),
                CellDefinition::new(1, "wall", Rgba([120, 120, 120, 255])),
                CellDefinition::new(2, "platform", Rgba([139, 90, 43, 255])),
                CellDefinition::new(3, "hazard", Rgba([220, 40, 40, 255])),
                CellDefinition::new(4, "goal", Rgba([250, 210, 40, 255])),
                CellDefinition::new(5, "sign", Rgba([60, 140, 230, 255])).with_aux(sign_defaults),
            ],
        }
    }

    /// Build a registry from `[[cells]]` config entries.
    ///
    /// An empty list falls back to [`CellRegistry::builtin`].
    pub fn from_config(entries: &[CellConfig]) -> Result<Self, RegistryError> {
        if entries.is_empty() {
            return Ok(Self::builtin());
        }
        if entries.len() > usize::from(CellCode::MAX) + 1 {
            return Err(RegistryError::TooMany(entries.len()));
        }

        let mut cells = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let code = CellCode::try_from(entry.code)
                .map_err(|_| RegistryError::CodeMismatch { index, code: entry.code })?;
            let color = parse_color(&entry.color)
                .map_err(|source| RegistryError::Color { name: entry.name.clone(), source })?;
            let mut def = CellDefinition::new(code, entry.name.clone(), color);
            if entry.requires_aux {
                def = def.with_aux(entry.aux_defaults.clone());
            }
            cells.push(def);
        }

        Self::new(cells)
    }

    /// Check that every entry sits at the index equal to its code.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.cells.is_empty() {
            return Err(RegistryError::Empty);
        }
        if self.cells.len() > usize::from(CellCode::MAX) + 1 {
            return Err(RegistryError::TooMany(self.cells.len()));
        }
        for (index, def) in self.cells.iter().enumerate() {
            if usize::from(def.code) != index {
                return Err(RegistryError::CodeMismatch { index, code: u32::from(def.code) });
            }
        }
        Ok(())
    }

    /// Look up a cell definition by code.
    pub fn lookup(&self, code: CellCode) -> Result<&CellDefinition, RegistryError> {
        self.cells.get(usize::from(code)).ok_or(RegistryError::InvalidCode(u32::from(code)))
    }

    /// Look up a raw (possibly out-of-range) persisted value.
    pub fn lookup_raw(&self, value: i64) -> Option<&CellDefinition> {
        usize::try_from(value).ok().and_then(|i| self.cells.get(i))
    }

    pub fn requires_aux(&self, code: CellCode) -> bool {
        self.lookup(code).map(|def| def.requires_aux).unwrap_or(false)
    }

    pub fn by_name(&self, name: &str) -> Option<&CellDefinition> {
        self.cells.iter().find(|def| def.name == name)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellDefinition> {
        self.cells.iter()
    }
}

impl Default for CellRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let registry = CellRegistry::builtin();
        assert!(registry.validate().is_ok());
        assert_eq!(registry.lookup(EMPTY).unwrap().name, "empty");
        assert!(registry.requires_aux(5));
        assert!(!registry.requires_aux(1));
    }

    #[test]
    fn test_lookup_out_of_range() {
        let registry = CellRegistry::builtin();
        assert_eq!(registry.lookup(6), Err(RegistryError::InvalidCode(6)));
        assert!(registry.lookup_raw(-1).is_none());
        assert!(registry.lookup_raw(99).is_none());
        assert_eq!(registry.lookup_raw(2).map(|d| d.code), Some(2));
    }

    #[test]
    fn test_code_mismatch_is_fatal() {
        let cells = vec![
            CellDefinition::new(0, "empty", Rgba([0, 0, 0, 255])),
            CellDefinition::new(2, "wall", Rgba([1, 1, 1, 255])),
        ];
        assert_eq!(
            CellRegistry::new(cells),
            Err(RegistryError::CodeMismatch { index: 1, code: 2 })
        );
    }

    #[test]
    fn test_empty_registry_rejected() {
        assert_eq!(CellRegistry::new(Vec::new()), Err(RegistryError::Empty));
    }

    #[test]
    fn test_from_config() {
        let entries = vec![
            CellConfig {
                code: 0,
                name: "void".to_string(),
                color: "#000".to_string(),
                requires_aux: false,
                aux_defaults: Map::new(),
            },
            CellConfig {
                code: 1,
                name: "note".to_string(),
                color: "red".to_string(),
                requires_aux: true,
                aux_defaults: Map::new(),
            },
        ];
        let registry = CellRegistry::from_config(&entries).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(1).unwrap().color, Rgba([255, 0, 0, 255]));
        assert!(registry.requires_aux(1));
        assert_eq!(registry.by_name("void").map(|d| d.code), Some(0));
    }

    #[test]
    fn test_from_config_bad_color() {
        let entries = vec![CellConfig {
            code: 0,
            name: "empty".to_string(),
            color: "#zz0000".to_string(),
            requires_aux: false,
            aux_defaults: Map::new(),
        }];
        assert!(matches!(
            CellRegistry::from_config(&entries),
            Err(RegistryError::Color { .. })
        ));
    }

    #[test]
    fn test_from_config_empty_uses_builtin() {
        assert_eq!(CellRegistry::from_config(&[]).unwrap(), CellRegistry::builtin());
    }
}
