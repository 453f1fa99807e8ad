//! Replay command implementation
//!
//! Drives a headless editing session from a file of recorded input events,
//! one JSON object per line. Blank lines and lines starting with `#` are
//! skipped.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::editor::{Editor, Response};
use crate::input::InputEvent;
use crate::output::save_png;
use crate::surface::RasterSurface;

use super::{print_warnings, Session, EXIT_ERROR, EXIT_SUCCESS};

/// Parse an event log. Errors name the offending line.
pub(crate) fn parse_events(contents: &str) -> Result<Vec<InputEvent>, String> {
    let mut events = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|e| format!("line {}: {}", index + 1, e))?;
        events.push(event);
    }
    Ok(events)
}

/// Execute the replay command
pub fn run_replay(
    session: &Session,
    input: &Path,
    events_path: &Path,
    output: Option<&Path>,
    aux: Option<&Path>,
    png: Option<&Path>,
) -> ExitCode {
    let loaded = match session.load_map(input, aux) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: Cannot load map '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    print_warnings(&loaded.warnings);

    let contents = match fs::read_to_string(events_path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", events_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let events = match parse_events(&contents) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Error: {}: {}", events_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let options = session.options();
    let surface = RasterSurface::new(0, 0).with_clear_color(options.style.background);
    let mut editor = Editor::new(loaded.map, session.registry.clone(), surface, options);

    let target = output.unwrap_or(input);
    let mut saves = 0;
    for event in &events {
        if let Response::Save(snapshot) = editor.handle_event(event) {
            match snapshot.write(target) {
                Ok(written) => {
                    for path in written {
                        println!("Wrote: {}", path.display());
                    }
                    saves += 1;
                }
                Err(e) => {
                    eprintln!("Error: Failed to write '{}': {}", target.display(), e);
                    return ExitCode::from(EXIT_ERROR);
                }
            }
        }
    }

    if let Some(png_path) = png {
        if let Err(e) = save_png(editor.surface().image(), png_path) {
            eprintln!("Error: Failed to save '{}': {}", png_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
        println!("Saved: {}", png_path.display());
    }

    println!("Replayed {} events ({} saves)", events.len(), saves);
    ExitCode::from(EXIT_SUCCESS)
}
