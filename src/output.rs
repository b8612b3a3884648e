//! PNG export and output path generation

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use std::io;
use std::path::{Path, PathBuf};

/// Error type for export operations
#[derive(Debug)]
pub enum ExportError {
    /// IO error during file operations
    Io(io::Error),
    /// PNG encoding error
    Image(image::ImageError),
    /// The canvas has a zero dimension, so there is nothing to encode
    EmptyCanvas { width: u32, height: u32 },
    /// No image has been loaded yet
    NothingLoaded,
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "IO error: {}", e),
            ExportError::Image(e) => write!(f, "Image error: {}", e),
            ExportError::EmptyCanvas { width, height } => {
                write!(f, "Cannot export an empty canvas ({}x{})", width, height)
            }
            ExportError::NothingLoaded => write!(f, "No image loaded"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            ExportError::Image(e) => Some(e),
            ExportError::EmptyCanvas { .. } | ExportError::NothingLoaded => None,
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Image(e)
    }
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCanvas { width, height });
    }

    let mut png_data = Vec::new();
    PngEncoder::new(&mut png_data).write_image(image.as_raw(), width, height, ColorType::Rgba8)?;
    Ok(png_data)
}

/// Write already encoded PNG bytes to `path`, creating parent directories.
pub fn write_png_bytes(png_data: &[u8], path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, png_data)?;
    Ok(())
}

/// Download name for an export: the original file name with `.png` appended.
pub fn export_file_name(original: &str) -> String {
    format!("{}.png", original)
}

/// Generate the output path for a rendered file.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `{input}.png` next to the input |
/// | `-o out.png` | `out.png` |
/// | `-o dir/` | `dir/{input file name}.png` |
pub fn generate_output_path(input: &Path, output_arg: Option<&Path>) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    match output_arg {
        Some(output) => {
            // Check if output is a directory (ends with / or is existing directory)
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(export_file_name(&file_name))
            } else {
                output.to_path_buf()
            }
        }
        None => {
            let parent = input.parent().unwrap_or(Path::new(""));
            if parent.as_os_str().is_empty() {
                PathBuf::from(export_file_name(&file_name))
            } else {
                parent.join(export_file_name(&file_name))
            }
        }
    }
}
