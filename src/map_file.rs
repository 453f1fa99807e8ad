//! Map and aux-data JSON files
//!
//! Map file:
//!
//! ```json
//! {"data": [[0, 1, 1], [2, 0, 0]], "spawnPosition": {"x": 0, "y": 0}}
//! ```
//!
//! Aux companion file, sorted by row then column:
//!
//! ```json
//! {"data": [{"cell": {"x": 1, "y": 0}, "message": "hello"}]}
//! ```
//!
//! Loading is lenient: `null` rows and cells, ragged rows and unknown codes
//! are coerced to empty cells and reported as warnings. Saving always
//! normalizes first, so written grids are rectangular.

use crate::aux_data::AuxRecord;
use crate::coords::CellCoord;
use crate::grid::TileMap;
use crate::registry::{CellCode, CellRegistry, EMPTY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Map file errors
#[derive(Debug, Error)]
pub enum MapFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("map is {width}x{height}, larger than the {limit}x{limit} limit")]
    TooLarge { width: usize, height: usize, limit: usize },
}

/// On-disk map shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFile {
    pub data: Vec<Vec<CellCode>>,
    #[serde(rename = "spawnPosition")]
    pub spawn_position: CellCoord,
}

/// On-disk aux companion shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxFile {
    pub data: Vec<AuxRecord>,
}

/// Everything a save writes.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSnapshot {
    pub map: MapFile,
    pub aux: AuxFile,
}

impl MapSnapshot {
    pub fn map_json(&self) -> Result<String, MapFileError> {
        Ok(serde_json::to_string(&self.map)?)
    }

    pub fn aux_json(&self) -> Result<String, MapFileError> {
        Ok(serde_json::to_string_pretty(&self.aux)?)
    }

    /// Write the map, and the aux companion next to it if there is any aux data.
    /// A companion left over from an earlier save is removed when there is none.
    ///
    /// Returns the paths written.
    pub fn write(&self, map_path: &Path) -> Result<Vec<PathBuf>, MapFileError> {
        let mut written = Vec::new();
        write_file(map_path, &self.map_json()?)?;
        written.push(map_path.to_path_buf());

        let aux_path = aux_path_for(map_path);
        if !self.aux.data.is_empty() {
            write_file(&aux_path, &self.aux_json()?)?;
            written.push(aux_path);
        } else if aux_path.exists() {
            fs::remove_file(&aux_path)?;
            debug!(path = %aux_path.display(), "removed stale aux file");
        }

        info!(path = %map_path.display(), aux_records = self.aux.data.len(), "saved map");
        Ok(written)
    }
}

/// A freshly loaded map plus what had to be coerced on the way in.
#[derive(Debug, Clone)]
pub struct LoadedMap {
    pub map: TileMap,
    pub warnings: Vec<String>,
}

#[derive(Deserialize)]
struct RawMapFile {
    #[serde(default)]
    data: Vec<Option<Vec<Option<i64>>>>,
    #[serde(rename = "spawnPosition", default)]
    spawn_position: Option<RawCoord>,
}

#[derive(Deserialize)]
struct RawCoord {
    x: i64,
    y: i64,
}

/// Normalize `map` and capture it in file form.
pub fn snapshot(map: &mut TileMap) -> MapSnapshot {
    map.normalize();
    MapSnapshot {
        map: MapFile { data: map.rows().to_vec(), spawn_position: map.spawn() },
        aux: AuxFile { data: map.aux().iter().cloned().collect() },
    }
}

/// Parse map JSON into a normalized map.
pub fn parse_map(
    json: &str,
    registry: &CellRegistry,
    max_extent: usize,
) -> Result<LoadedMap, MapFileError> {
    let raw: RawMapFile = serde_json::from_str(json)?;
    let mut warnings = Vec::new();

    let height = raw.data.len();
    let width = raw.data.iter().flatten().map(Vec::len).max().unwrap_or(0);
    if width > max_extent || height > max_extent {
        return Err(MapFileError::TooLarge { width, height, limit: max_extent });
    }

    let mut rows = Vec::with_capacity(height);
    let mut null_cells = 0;
    for (y, raw_row) in raw.data.into_iter().enumerate() {
        let Some(raw_row) = raw_row else {
            warnings.push(format!("row {} is null, treated as empty", y));
            rows.push(Vec::new());
            continue;
        };

        let mut row = Vec::with_capacity(raw_row.len());
        for (x, value) in raw_row.into_iter().enumerate() {
            let code = match value {
                None => {
                    null_cells += 1;
                    EMPTY
                }
                Some(value) => match registry.lookup_raw(value) {
                    Some(def) => def.code,
                    None => {
                        warnings.push(format!("cell ({}, {}): unknown code {} set to empty", x, y, value));
                        EMPTY
                    }
                },
            };
            row.push(code);
        }
        rows.push(row);
    }
    if null_cells > 0 {
        warnings.push(format!("{} null cells set to empty", null_cells));
    }

    let spawn = match raw.spawn_position {
        None => {
            warnings.push("missing spawnPosition, using (0, 0)".to_string());
            CellCoord::default()
        }
        Some(RawCoord { x, y }) => match CellCoord::from_signed(x, y) {
            Some(coord) if coord.x < max_extent && coord.y < max_extent => coord,
            _ => {
                warnings.push(format!("spawnPosition ({}, {}) is unusable, using (0, 0)", x, y));
                CellCoord::default()
            }
        },
    };

    let mut map = TileMap::from_rows(rows, spawn).with_max_extent(max_extent);
    let report = map.normalize();
    if report.padded_rows > 0 {
        warnings.push(format!("{} ragged rows padded to width {}", report.padded_rows, map.width()));
    }
    if report.grew_for_spawn {
        warnings.push(format!("grid grown to contain spawn at {}", spawn));
    }
    if report.spawn_cleared {
        warnings.push(format!("spawn cell {} was not empty, cleared", spawn));
    }
    map.reconcile_aux(registry);

    for warning in &warnings {
        debug!("{}", warning);
    }
    Ok(LoadedMap { map, warnings })
}

/// Apply aux JSON to an already loaded map.
///
/// Records for cells whose type takes no aux data are dropped with a warning.
/// Later records for the same cell replace earlier ones.
pub fn parse_aux(
    json: &str,
    map: &mut TileMap,
    registry: &CellRegistry,
) -> Result<Vec<String>, MapFileError> {
    let file: AuxFile = serde_json::from_str(json)?;
    let mut warnings = Vec::new();
    let mut seen = std::collections::BTreeSet::new();

    for record in file.data {
        let cell = record.cell;
        let accepts = map.get(cell).is_some_and(|code| registry.requires_aux(code));
        if !accepts {
            warnings.push(format!("aux record at {} is not on an aux cell, dropped", cell));
            continue;
        }
        if !seen.insert(cell) {
            warnings.push(format!("duplicate aux record at {}, keeping the last", cell));
        }
        map.aux_mut().insert(record);
    }

    for warning in &warnings {
        debug!("{}", warning);
    }
    Ok(warnings)
}

/// Load a map file, and its aux companion if `aux` names one.
pub fn load_map(
    path: &Path,
    aux: Option<&Path>,
    registry: &CellRegistry,
    max_extent: usize,
) -> Result<LoadedMap, MapFileError> {
    let json = fs::read_to_string(path)?;
    let mut loaded = parse_map(&json, registry, max_extent)?;

    if let Some(aux_path) = aux {
        let aux_json = fs::read_to_string(aux_path)?;
        let warnings = parse_aux(&aux_json, &mut loaded.map, registry)?;
        loaded.warnings.extend(warnings);
    }

    Ok(loaded)
}

/// Default companion path: `level.json` -> `level.aux.json`.
pub fn aux_path_for(map_path: &Path) -> PathBuf {
    let stem = map_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    map_path.with_file_name(format!("{}.aux.json", stem))
}

fn write_file(path: &Path, contents: &str) -> Result<(), MapFileError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> CellRegistry {
        CellRegistry::builtin()
    }

    fn parse(json: &str) -> LoadedMap {
        parse_map(json, &registry(), 1024).unwrap()
    }

    #[test]
    fn test_parse_clean_map() {
        let loaded = parse(r#"{"data": [[0, 1], [2, 3]], "spawnPosition": {"x": 0, "y": 0}}"#);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.map.rows(), &[vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_parse_clears_spawn_cell() {
        let loaded = parse(r#"{"data": [[1, 1], [2, 0]], "spawnPosition": {"x": 0, "y": 0}}"#);
        assert_eq!(loaded.map.rows(), &[vec![0, 1], vec![2, 0]]);
        assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn test_parse_coerces_nulls_and_ragged_rows() {
        let loaded = parse(
            r#"{"data": [[1, null, 2], null, [3]], "spawnPosition": {"x": 1, "y": 1}}"#,
        );
        assert_eq!(loaded.map.rows(), &[vec![1, 0, 2], vec![0, 0, 0], vec![3, 0, 0]]);
        assert!(loaded.warnings.iter().any(|w| w.contains("row 1 is null")));
        assert!(loaded.warnings.iter().any(|w| w.contains("1 null cells")));
        assert!(loaded.warnings.iter().any(|w| w.contains("2 ragged rows")));
    }

    #[test]
    fn test_parse_unknown_codes() {
        let loaded = parse(r#"{"data": [[0, 9, -1]], "spawnPosition": {"x": 0, "y": 0}}"#);
        assert_eq!(loaded.map.rows(), &[vec![0, 0, 0]]);
        assert_eq!(loaded.warnings.iter().filter(|w| w.contains("unknown code")).count(), 2);
    }

    #[test]
    fn test_parse_missing_spawn() {
        let loaded = parse(r#"{"data": [[4, 1]]}"#);
        assert_eq!(loaded.map.spawn(), CellCoord::new(0, 0));
        assert_eq!(loaded.map.rows(), &[vec![0, 1]]);
    }

    #[test]
    fn test_parse_negative_spawn() {
        let loaded = parse(r#"{"data": [[0, 1]], "spawnPosition": {"x": -2, "y": 0}}"#);
        assert_eq!(loaded.map.spawn(), CellCoord::new(0, 0));
        assert!(loaded.warnings.iter().any(|w| w.contains("unusable")));
    }

    #[test]
    fn test_parse_too_large() {
        let result = parse_map(r#"{"data": [[0, 0, 0]]}"#, &registry(), 2);
        assert!(matches!(result, Err(MapFileError::TooLarge { width: 3, height: 1, limit: 2 })));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(parse_map("{", &registry(), 16), Err(MapFileError::Json(_))));
    }

    #[test]
    fn test_parse_creates_default_aux() {
        let loaded = parse(r#"{"data": [[0, 5]], "spawnPosition": {"x": 0, "y": 0}}"#);
        assert_eq!(loaded.map.aux().len(), 1);
        assert_eq!(loaded.map.aux().get(CellCoord::new(1, 0)).unwrap().fields["message"], json!(""));
    }

    #[test]
    fn test_round_trip() {
        let registry = registry();
        let mut map = TileMap::from_rows(vec![vec![1, 2, 3], vec![4]], CellCoord::new(2, 0));
        let snap = snapshot(&mut map);
        let json = snap.map_json().unwrap();

        let loaded = parse_map(&json, &registry, 1024).unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.map.rows(), map.rows());
        assert_eq!(loaded.map.spawn(), CellCoord::new(2, 0));
        assert_eq!(loaded.map.rows(), &[vec![1, 2, 0], vec![4, 0, 0]]);
    }

    #[test]
    fn test_map_json_shape() {
        let mut map = TileMap::new(2, 1);
        let value: serde_json::Value =
            serde_json::from_str(&snapshot(&mut map).map_json().unwrap()).unwrap();
        assert_eq!(value, json!({"data": [[0, 0]], "spawnPosition": {"x": 0, "y": 0}}));
    }

    #[test]
    fn test_aux_export_sorted() {
        let registry = registry();
        let mut map = TileMap::new(4, 4);
        for (x, y) in [(3, 2), (1, 3), (2, 0), (0, 2)] {
            map.set_cell(CellCoord::new(x, y), 5, &registry).unwrap();
        }
        let snap = snapshot(&mut map);
        let order: Vec<_> = snap.aux.data.iter().map(|r| (r.cell.x, r.cell.y)).collect();
        assert_eq!(order, vec![(2, 0), (0, 2), (3, 2), (1, 3)]);
    }

    #[test]
    fn test_parse_aux() {
        let registry = registry();
        let mut loaded = parse(r#"{"data": [[0, 5, 1]], "spawnPosition": {"x": 0, "y": 0}}"#);
        let warnings = parse_aux(
            r#"{"data": [
                {"cell": {"x": 1, "y": 0}, "message": "first"},
                {"cell": {"x": 2, "y": 0}, "message": "wall"},
                {"cell": {"x": 1, "y": 0}, "message": "second"}
            ]}"#,
            &mut loaded.map,
            &registry,
        )
        .unwrap();

        assert_eq!(warnings.len(), 2);
        assert_eq!(loaded.map.aux().len(), 1);
        assert_eq!(
            loaded.map.aux().get(CellCoord::new(1, 0)).unwrap().fields["message"],
            json!("second")
        );
    }

    #[test]
    fn test_aux_path_for() {
        assert_eq!(aux_path_for(Path::new("maps/level1.json")), PathBuf::from("maps/level1.aux.json"));
    }

    #[test]
    fn test_write_and_load() {
        let registry = registry();
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("out").join("level.json");

        let mut map = TileMap::new(3, 2);
        map.set_cell(CellCoord::new(2, 1), 5, &registry).unwrap();
        map.aux_mut()
            .get_mut(CellCoord::new(2, 1))
            .unwrap()
            .fields
            .insert("message".to_string(), json!("hi"));

        let written = snapshot(&mut map).write(&path).unwrap();
        assert_eq!(written.len(), 2);

        let aux_path = aux_path_for(&path);
        let loaded = load_map(&path, Some(&aux_path), &registry, 1024).unwrap();
        assert_eq!(loaded.map, map);
    }

    #[test]
    fn test_save_without_aux_removes_stale_companion() {
        let registry = registry();
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("level.json");
        let aux_path = aux_path_for(&path);

        let mut map = TileMap::new(3, 1);
        map.set_cell(CellCoord::new(1, 0), 5, &registry).unwrap();
        snapshot(&mut map).write(&path).unwrap();
        assert!(aux_path.exists());

        map.set_cell(CellCoord::new(1, 0), 1, &registry).unwrap();
        let written = snapshot(&mut map).write(&path).unwrap();
        assert_eq!(written, vec![path.clone()]);
        assert!(!aux_path.exists());

        let loaded = load_map(&path, None, &registry, 1024).unwrap();
        assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
        assert_eq!(loaded.map.get(CellCoord::new(1, 0)), Some(1));
    }
}
