//! Immutable viewer state
//!
//! The file name, decoded image, canvas size, aspect toggle and current
//! error live in one value. Every transition builds a new value and the
//! viewer swaps it in whole, so a failed upload can never leave a new file
//! name paired with an old raster, or a canvas sized for an image that
//! never decoded.

use std::sync::Arc;

use crate::error::ViewerError;
use crate::models::{Header, ImageSize};
use crate::renderer::RasterBuffer;
use crate::resize::CanvasSize;

/// A successfully decoded upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    file_name: String,
    header: Header,
    raster: RasterBuffer,
}

impl LoadedImage {
    pub fn new(file_name: impl Into<String>, header: Header, raster: RasterBuffer) -> Self {
        Self { file_name: file_name.into(), header, raster }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn raster(&self) -> &RasterBuffer {
        &self.raster
    }

    pub fn size(&self) -> ImageSize {
        self.raster.size()
    }
}

/// Snapshot of everything the page displays.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    image: Option<Arc<LoadedImage>>,
    canvas: CanvasSize,
    keep_aspect_ratio: bool,
    error: Option<ViewerError>,
}

impl ViewerState {
    pub fn new(keep_aspect_ratio: bool) -> Self {
        Self { image: None, canvas: CanvasSize::default(), keep_aspect_ratio, error: None }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.image.as_deref().map(LoadedImage::file_name)
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_deref()
    }

    /// Natural size of the loaded image (0x0 when nothing is loaded).
    pub fn image_size(&self) -> ImageSize {
        self.image.as_deref().map(LoadedImage::size).unwrap_or_default()
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn keep_aspect_ratio(&self) -> bool {
        self.keep_aspect_ratio
    }

    pub fn error(&self) -> Option<&ViewerError> {
        self.error.as_ref()
    }

    pub(crate) fn loaded(&self, image: Arc<LoadedImage>) -> Self {
        Self {
            canvas: image.size().into(),
            image: Some(image),
            keep_aspect_ratio: self.keep_aspect_ratio,
            error: None,
        }
    }

    pub(crate) fn with_error(&self, error: ViewerError) -> Self {
        Self { error: Some(error), ..self.clone() }
    }

    pub(crate) fn without_error(&self) -> Self {
        Self { error: None, ..self.clone() }
    }

    pub(crate) fn with_canvas(&self, canvas: CanvasSize) -> Self {
        Self { canvas, ..self.clone() }
    }

    pub(crate) fn with_keep_aspect_ratio(&self, keep_aspect_ratio: bool) -> Self {
        Self { keep_aspect_ratio, ..self.clone() }
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(true)
    }
}
