//! Render and watch command implementations

use std::path::Path;
use std::process::ExitCode;

use log::info;
use thiserror::Error;
use web_time::Instant;

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::output::{generate_output_path, write_png_bytes, ExportError};
use crate::viewer::Viewer;
use crate::watch::{watch_and_render, WatchOptions};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Requested canvas size from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Error from a single render
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{0}")]
    Viewer(#[from] ViewerError),
    #[error("{0}")]
    Export(#[from] ExportError),
}

/// Load `input` into `viewer`, apply the resize and write the PNG.
///
/// The viewer keeps its last good image when loading fails, so nothing is
/// written in that case.
pub fn render_file(
    viewer: &mut Viewer,
    input: &Path,
    output: &Path,
    resize: ResizeRequest,
) -> Result<(), RenderError> {
    viewer.load_path(input)?;

    let now = Instant::now();
    match (resize.width, resize.height) {
        (Some(width), Some(height)) => {
            // Both given: take them literally
            let keep = viewer.state().keep_aspect_ratio();
            viewer.set_keep_aspect_ratio(false);
            viewer.resize_width(width, now);
            viewer.resize_height(height, now);
            viewer.set_keep_aspect_ratio(keep);
        }
        (Some(width), None) => {
            viewer.resize_width(width, now);
        }
        (None, Some(height)) => {
            viewer.resize_height(height, now);
        }
        (None, None) => {}
    }
    viewer.flush();

    let png = viewer.export_png()?;
    write_png_bytes(&png, output)?;
    Ok(())
}

/// Execute the render command
pub fn run_render(
    input: &Path,
    output: Option<&Path>,
    resize: ResizeRequest,
    config: &ViewerConfig,
) -> ExitCode {
    let output_path = generate_output_path(input, output);
    let mut viewer = Viewer::new(&config.view);

    match render_file(&mut viewer, input, &output_path, resize) {
        Ok(()) => {
            let frame = viewer.frame();
            info!("Saved {} ({}x{})", output_path.display(), frame.width(), frame.height());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(RenderError::Viewer(e @ ViewerError::RejectedUpload(_))) => {
            eprintln!("Error: {}: {}", input.display(), e);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the watch command
pub fn run_watch(
    input: &Path,
    output: Option<&Path>,
    resize: ResizeRequest,
    config: &ViewerConfig,
) -> ExitCode {
    let options = WatchOptions {
        input: input.to_path_buf(),
        output: generate_output_path(input, output),
        config: config.watch.clone(),
    };
    let mut viewer = Viewer::new(&config.view);

    let render = |input: &Path, output: &Path| render_file(&mut viewer, input, output, resize);
    match watch_and_render(options, render) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const WIDE: &str = "P3\n4 2\n255\n255 0 0\n0 255 0\n0 0 255\n255 255 255\n0 0 0\n1 1 1\n2 2 2\n3 3 3";

    fn fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).expect("should write fixture");
        path
    }

    fn output_dimensions(path: &Path) -> (u32, u32) {
        let img = image::open(path).expect("should open output png");
        (img.width(), img.height())
    }

    #[test]
    fn test_render_natural_size() {
        let dir = TempDir::new().unwrap();
        let input = fixture(&dir, "wide.ppm", WIDE);
        let output = dir.path().join("wide.png");

        render_file(&mut Viewer::default(), &input, &output, ResizeRequest::default()).unwrap();
        assert_eq!(output_dimensions(&output), (4, 2));
    }

    #[test]
    fn test_render_width_keeps_aspect() {
        let dir = TempDir::new().unwrap();
        let input = fixture(&dir, "wide.ppm", WIDE);
        let output = dir.path().join("wide.png");

        let resize = ResizeRequest { width: Some(40), height: None };
        render_file(&mut Viewer::default(), &input, &output, resize).unwrap();
        assert_eq!(output_dimensions(&output), (40, 20));
    }

    #[test]
    fn test_render_width_without_aspect() {
        let dir = TempDir::new().unwrap();
        let input = fixture(&dir, "wide.ppm", WIDE);
        let output = dir.path().join("wide.png");

        let config = ViewConfig { keep_aspect_ratio: false, ..Default::default() };
        let resize = ResizeRequest { width: Some(40), height: None };
        render_file(&mut Viewer::new(&config), &input, &output, resize).unwrap();
        assert_eq!(output_dimensions(&output), (40, 2));
    }

    #[test]
    fn test_render_both_dimensions_are_literal() {
        let dir = TempDir::new().unwrap();
        let input = fixture(&dir, "wide.ppm", WIDE);
        let output = dir.path().join("wide.png");

        let resize = ResizeRequest { width: Some(10), height: Some(30) };
        let mut viewer = Viewer::default();
        render_file(&mut viewer, &input, &output, resize).unwrap();
        assert_eq!(output_dimensions(&output), (10, 30));
        assert!(viewer.state().keep_aspect_ratio());
    }

    #[test]
    fn test_render_invalid_file_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = fixture(&dir, "bad.ppm", "P6\n1 1\n255\n0 0 0");
        let output = dir.path().join("bad.png");

        let err = render_file(&mut Viewer::default(), &input, &output, ResizeRequest::default()).unwrap_err();
        assert!(matches!(err, RenderError::Viewer(ViewerError::Invalid(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_render_zero_width_is_export_error() {
        let dir = TempDir::new().unwrap();
        let input = fixture(&dir, "wide.ppm", WIDE);
        let output = dir.path().join("wide.png");

        let resize = ResizeRequest { width: Some(0), height: None };
        let err = render_file(&mut Viewer::default(), &input, &output, resize).unwrap_err();
        assert!(matches!(err, RenderError::Export(ExportError::EmptyCanvas { .. })));
    }
}
