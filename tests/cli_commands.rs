//! CLI integration tests for the `gridpaint` binary.
//!
//! Every command runs inside a temp directory with `XDG_CONFIG_HOME` pointed
//! at it, so only configs written by the test are picked up.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Run gridpaint in `dir` and return (stdout, stderr, exit code).
fn run(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_gridpaint"))
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute gridpaint");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code().unwrap_or(-1))
}

fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// new / normalize
// ============================================================================

#[test]
fn test_new_creates_empty_map() {
    let dir = tempfile::TempDir::new().unwrap();

    let (stdout, stderr, code) = run(dir.path(), &["new", "level.json", "--width", "4", "--height", "2"]);
    assert_eq!(code, 0, "new should succeed: {}", stderr);
    assert!(stdout.contains("Created"));

    let json = read_json(&dir.path().join("level.json"));
    assert_eq!(json["data"], serde_json::json!([[0, 0, 0, 0], [0, 0, 0, 0]]));
    assert_eq!(json["spawnPosition"], serde_json::json!({"x": 0, "y": 0}));
    assert!(!dir.path().join("level.aux.json").exists());
}

#[test]
fn test_new_refuses_to_overwrite() {
    let dir = tempfile::TempDir::new().unwrap();
    write(&dir, "level.json", "{}");

    let (_, stderr, code) = run(dir.path(), &["new", "level.json"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("already exists"));
}

#[test]
fn test_normalize_rewrites_map() {
    let dir = tempfile::TempDir::new().unwrap();
    write(&dir, "level.json", r#"{"data": [[1, 1], [2, 0, 3]], "spawnPosition": {"x": 0, "y": 0}}"#);

    let (_, stderr, code) = run(dir.path(), &["normalize", "level.json", "-o", "out.json"]);
    assert_eq!(code, 0, "normalize should succeed: {}", stderr);
    assert!(stderr.contains("Warning"), "ragged rows should be reported");

    let json = read_json(&dir.path().join("out.json"));
    assert_eq!(json["data"], serde_json::json!([[0, 1, 0], [2, 0, 3]]));
}

#[test]
fn test_normalize_writes_aux_companion() {
    let dir = tempfile::TempDir::new().unwrap();
    write(&dir, "level.json", r#"{"data": [[0, 5]], "spawnPosition": {"x": 0, "y": 0}}"#);
    write(&dir, "level.aux.json", r#"{"data": [{"cell": {"x": 1, "y": 0}, "message": "hello"}]}"#);

    let (_, stderr, code) = run(dir.path(), &["normalize", "level.json"]);
    assert_eq!(code, 0, "{}", stderr);

    let aux = read_json(&dir.path().join("level.aux.json"));
    assert_eq!(aux["data"][0]["message"], "hello");
    assert_eq!(aux["data"][0]["cell"], serde_json::json!({"x": 1, "y": 0}));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_clean_map() {
    let dir = tempfile::TempDir::new().unwrap();
    write(&dir, "level.json", r#"{"data": [[0, 1], [2, 3]], "spawnPosition": {"x": 0, "y": 0}}"#);

    let (stdout, _, code) = run(dir.path(), &["validate", "level.json"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("OK (2x2 cells, spawn at (0, 0)"), "{}", stdout);
}

#[test]
fn test_validate_strict_fails_on_warnings() {
    let dir = tempfile::TempDir::new().unwrap();
    write(&dir, "level.json", r#"{"data": [[9, 1]], "spawnPosition": {"x": 1, "y": 0}}"#);

    let (_, stderr, code) = run(dir.path(), &["validate", "level.json"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("Warning"));

    let (_, _, code) = run(dir.path(), &["validate", "level.json", "--strict"]);
    assert_eq!(code, 1);
}

#[test]
fn test_validate_bad_json() {
    let dir = tempfile::TempDir::new().unwrap();
    write(&dir, "level.json", "{not json");

    let (_, stderr, code) = run(dir.path(), &["validate", "level.json"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Cannot load map"));
}

// ============================================================================
// render
// ============================================================================

#[test]
fn test_render_png() {
    let dir = tempfile::TempDir::new().unwrap();
    write(&dir, "level.json", r#"{"data": [[0, 1], [3, 0]], "spawnPosition": {"x": 1, "y": 1}}"#);

    let (_, stderr, code) = run(dir.path(), &["render", "level.json", "--cell-size", "8"]);
    assert_eq!(code, 0, "render should succeed: {}", stderr);

    let image = image::open(dir.path().join("level.png")).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (16, 16));
    assert_eq!(*image.get_pixel(12, 3), image::Rgba([120, 120, 120, 255]));
    assert_eq!(*image.get_pixel(12, 12), image::Rgba([255, 0, 255, 255]));
}

#[test]
fn test_render_cell_size_out_of_range() {
    let dir = tempfile::TempDir::new().unwrap();
    write(&dir, "level.json", r#"{"data": [[0]], "spawnPosition": {"x": 0, "y": 0}}"#);

    let (_, stderr, code) = run(dir.path(), &["render", "level.json", "--cell-size", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("editor.cell_size"), "{}", stderr);
}

// ============================================================================
// config / cells
// ============================================================================

#[test]
fn test_cells_lists_builtin_registry() {
    let dir = tempfile::TempDir::new().unwrap();

    let (stdout, _, code) = run(dir.path(), &["cells"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("wall"));
    assert!(stdout.contains("sign"));
    assert!(stdout.contains("save"));
}

#[test]
fn test_custom_registry_from_config() {
    let dir = tempfile::TempDir::new().unwrap();
    write(
        &dir,
        "gridpaint.toml",
        r##"
[[cells]]
code = 0
name = "void"
color = "#000"

[[cells]]
code = 1
name = "lava"
color = "orangered"
"##,
    );

    let (stdout, stderr, code) = run(dir.path(), &["cells"]);
    assert_eq!(code, 0, "{}", stderr);
    assert!(stdout.contains("lava"));
    assert!(stdout.contains("#ff4500"));
    assert!(!stdout.contains("wall"));
}

#[test]
fn test_misordered_registry_is_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    write(
        &dir,
        "gridpaint.toml",
        r##"
[[cells]]
code = 1
name = "wall"
color = "#888"
"##,
    );

    let (_, stderr, code) = run(dir.path(), &["cells"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("Error:"), "{}", stderr);
}

// ============================================================================
// replay
// ============================================================================

#[test]
fn test_replay_paints_and_saves() {
    let dir = tempfile::TempDir::new().unwrap();
    write(&dir, "level.json", r#"{"data": [[0, 0, 0], [0, 0, 0]], "spawnPosition": {"x": 0, "y": 0}}"#);
    write(
        &dir,
        "events.jsonl",
        r#"# grow the map by one column of signs
{"event": "key", "key": "5"}
{"event": "key", "key": "["}
{"event": "pointer_move", "x": 56, "y": 8}
{"event": "pointer_down", "button": "primary"}
{"event": "tick", "time_ms": 0}
{"event": "pointer_up", "button": "primary"}
{"event": "key", "key": "s"}
"#,
    );

    let (stdout, stderr, code) = run(
        dir.path(),
        &["replay", "level.json", "events.jsonl", "-o", "out.json", "--png", "out.png"],
    );
    assert_eq!(code, 0, "replay should succeed: {}", stderr);
    assert!(stdout.contains("Replayed 7 events (1 saves)"), "{}", stdout);

    let json = read_json(&dir.path().join("out.json"));
    assert_eq!(json["data"], serde_json::json!([[0, 0, 0, 5], [0, 0, 0, 0]]));
    let aux = read_json(&dir.path().join("out.aux.json"));
    assert_eq!(aux["data"][0]["cell"], serde_json::json!({"x": 3, "y": 0}));
    assert_eq!(aux["data"][0]["message"], "");

    let image = image::open(dir.path().join("out.png")).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (64, 32));
}

#[test]
fn test_replay_rejects_bad_event() {
    let dir = tempfile::TempDir::new().unwrap();
    write(&dir, "level.json", r#"{"data": [[0]], "spawnPosition": {"x": 0, "y": 0}}"#);
    write(&dir, "events.jsonl", "{\"event\": \"tick\", \"time_ms\": 0}\n{\"event\": \"teleport\"}\n");

    let (_, stderr, code) = run(dir.path(), &["replay", "level.json", "events.jsonl"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("line 2"), "{}", stderr);
}
