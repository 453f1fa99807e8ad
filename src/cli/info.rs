//! Informational and scaffolding commands (cells, new)

use std::path::Path;
use std::process::ExitCode;

use crate::color::to_hex;
use crate::grid::TileMap;
use crate::input::KeyCommand;
use crate::map_file::snapshot;

use super::{Session, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the cells command
pub fn run_cells(session: &Session) -> ExitCode {
    let keys = session.options().keys;
    let bindings = keys.sorted();

    println!("{:>4}  {:<12} {:<9} {:<5} KEYS", "CODE", "NAME", "COLOR", "AUX");
    for cell in session.registry.iter() {
        let bound: Vec<&str> = bindings
            .iter()
            .filter(|(_, command)| *command == KeyCommand::Select(cell.code))
            .map(|(key, _)| *key)
            .collect();
        println!(
            "{:>4}  {:<12} {:<9} {:<5} {}",
            cell.code,
            cell.name,
            to_hex(cell.color),
            if cell.requires_aux { "yes" } else { "-" },
            bound.join(" ")
        );
    }

    println!();
    for (key, command) in &bindings {
        let action = match command {
            KeyCommand::Select(_) => continue,
            KeyCommand::SelectSpawn => "spawn brush",
            KeyCommand::Save => "save",
            KeyCommand::GrowRadius => "grow radius",
            KeyCommand::ShrinkRadius => "shrink radius",
        };
        println!("{:>4}  {}", key, action);
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the new command
pub fn run_new(
    session: &Session,
    output: &Path,
    width: Option<usize>,
    height: Option<usize>,
    force: bool,
) -> ExitCode {
    if output.exists() && !force {
        eprintln!("Error: '{}' already exists (use --force to overwrite)", output.display());
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let max_extent = session.config.editor.max_extent;
    let width = width.unwrap_or(session.config.map.default_width);
    let height = height.unwrap_or(session.config.map.default_height);
    if width == 0 || height == 0 || width > max_extent || height > max_extent {
        eprintln!("Error: Map size must be within 1..={} in both directions", max_extent);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut map = TileMap::new(width, height).with_max_extent(max_extent);
    match snapshot(&mut map).write(output) {
        Ok(written) => {
            for path in written {
                println!("Created: {} ({}x{})", path.display(), width, height);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to write '{}': {}", output.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
