//! PNG output and file path generation

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("canvas is empty, nothing to write")]
    EmptyCanvas,
}

/// Save a rendered canvas to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(OutputError::EmptyCanvas);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    Ok(())
}

/// Generate the PNG path for a rendered map.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `{input stem}.png` next to the input |
/// | `-o out.png` | `out.png` |
/// | `-o dir/` (trailing slash or existing directory) | `dir/{input stem}.png` |
pub fn png_path_for(input: &Path, output_arg: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let file_name = format!("{}.png", stem);

    match output_arg {
        None => input.with_file_name(file_name),
        Some(out) => {
            let is_dir = out.to_string_lossy().ends_with('/') || out.is_dir();
            if is_dir {
                out.join(file_name)
            } else {
                out.to_path_buf()
            }
        }
    }
}
