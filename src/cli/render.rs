//! Render command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::output::{png_path_for, save_png};
use crate::render::Renderer;
use crate::surface::RasterSurface;

use super::{print_warnings, Session, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the render command
pub fn run_render(
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

    let options = session.options();
    let surface = RasterSurface::new(0, 0).with_clear_color(options.style.background);
    let mut renderer = Renderer::new(surface, options.cell_size, options.style);
    renderer.render_map(&mut loaded.map, &session.registry);

    let png_path = png_path_for(input, output);
    if let Err(e) = save_png(renderer.surface().image(), &png_path) {
        eprintln!("Error: Failed to save '{}': {}", png_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!(
        "Saved: {} ({}x{} cells at {}px)",
        png_path.display(),
        loaded.map.width(),
        loaded.map.height(),
        options.cell_size
    );
    ExitCode::from(EXIT_SUCCESS)
}
