//! Validation command implementations (validate, normalize)

use std::path::Path;
use std::process::ExitCode;

use crate::map_file::snapshot;

use super::{print_warnings, Session, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the validate command
pub fn run_validate(session: &Session, input: &Path, aux: Option<&Path>, strict: bool) -> ExitCode {
    let loaded = match session.load_map(input, aux) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: Cannot load map '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let map = &loaded.map;
    if loaded.warnings.is_empty() {
        println!(
            "{}: OK ({}x{} cells, spawn at {}, {} aux records)",
            input.display(),
            map.width(),
            map.height(),
            map.spawn(),
            map.aux().len()
        );
        return ExitCode::from(EXIT_SUCCESS);
    }

    print_warnings(&loaded.warnings);
    println!("{}: {} warning(s)", input.display(), loaded.warnings.len());
    if strict {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Execute the normalize command
pub fn run_normalize(
    session: &Session,
    input: &Path,
    output: Option<&Path>,
    aux: Option<&Path>,
) -> ExitCode {
    let mut loaded = match session.load_map(input, aux) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: Cannot load map '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    print_warnings(&loaded.warnings);

    let target = output.unwrap_or(input);
    match snapshot(&mut loaded.map).write(target) {
        Ok(written) => {
            for path in written {
                println!("Wrote: {}", path.display());
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to write '{}': {}", target.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
