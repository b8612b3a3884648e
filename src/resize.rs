//! Canvas resize policy and the display transform
//!
//! Resizing is a pure view transform over an already decoded
//! [`RasterBuffer`]; nothing here re-parses or re-rasterizes the source.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::models::ImageSize;
use crate::renderer::RasterBuffer;

/// Largest canvas side, in pixels. Larger requests are clamped to it so a
/// redraw never asks for more than 256 MiB of RGBA.
pub const MAX_CANVAS_DIMENSION: u32 = 8192;

/// Resampling filter used when the canvas differs from the image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleFilter {
    /// Nearest-neighbor (crisp pixels)
    #[default]
    Nearest,
    /// Bilinear
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ScaleFilter> for FilterType {
    fn from(filter: ScaleFilter) -> Self {
        match filter {
            ScaleFilter::Nearest => FilterType::Nearest,
            ScaleFilter::Triangle => FilterType::Triangle,
            ScaleFilter::CatmullRom => FilterType::CatmullRom,
            ScaleFilter::Gaussian => FilterType::Gaussian,
            ScaleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Displayed canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Change the width, deriving the height from the image's original
    /// aspect ratio when `keep_aspect_ratio` is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use ppmview::models::ImageSize;
    /// use ppmview::resize::CanvasSize;
    ///
    /// let image = ImageSize::new(100, 50);
    /// let canvas = CanvasSize::new(100, 50).with_width(50, image, true);
    /// assert_eq!(canvas, CanvasSize::new(50, 25));
    /// ```
    pub fn with_width(self, width: u32, image: ImageSize, keep_aspect_ratio: bool) -> Self {
        let width = clamp_dimension(u64::from(width));
        let height = if keep_aspect_ratio && !image.is_empty() {
            scale_dimension(width, image.height, image.width)
        } else {
            self.height
        };
        Self { width, height }
    }

    /// Change the height, deriving the width from the image's original
    /// aspect ratio when `keep_aspect_ratio` is set.
    pub fn with_height(self, height: u32, image: ImageSize, keep_aspect_ratio: bool) -> Self {
        let height = clamp_dimension(u64::from(height));
        let width = if keep_aspect_ratio && !image.is_empty() {
            scale_dimension(height, image.width, image.height)
        } else {
            self.width
        };
        Self { width, height }
    }

    /// This size with both sides limited to [`MAX_CANVAS_DIMENSION`].
    pub fn clamped(self) -> Self {
        Self {
            width: clamp_dimension(u64::from(self.width)),
            height: clamp_dimension(u64::from(self.height)),
        }
    }
}

impl From<ImageSize> for CanvasSize {
    fn from(size: ImageSize) -> Self {
        Self { width: size.width, height: size.height }
    }
}

/// `value * numerator / denominator`, truncated. `denominator` is non-zero.
fn scale_dimension(value: u32, numerator: u32, denominator: u32) -> u32 {
    clamp_dimension(u64::from(value) * u64::from(numerator) / u64::from(denominator))
}

fn clamp_dimension(value: u64) -> u32 {
    value.min(u64::from(MAX_CANVAS_DIMENSION)) as u32
}

/// Truncate to a pixel count; NaN, negative and infinite values become 0.
fn to_dimension(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.trunc().min(f64::from(MAX_CANVAS_DIMENSION)) as u32
    } else {
        0
    }
}

/// Coerce raw size-field input to a dimension.
///
/// Empty, non-numeric and negative input all become 0; fractions truncate
/// and anything past [`MAX_CANVAS_DIMENSION`] is clamped to it.
pub fn parse_dimension_input(input: &str) -> u32 {
    input.trim().parse::<f64>().map(to_dimension).unwrap_or(0)
}

/// Scale factors `(canvas.width / image.width, canvas.height / image.height)`.
pub fn display_scale(canvas: CanvasSize, image: ImageSize) -> Option<(f64, f64)> {
    if image.is_empty() {
        return None;
    }
    Some((
        f64::from(canvas.width) / f64::from(image.width),
        f64::from(canvas.height) / f64::from(image.height),
    ))
}

/// Scale the retained raster to the canvas size.
///
/// A canvas with a zero dimension yields an empty image. Oversized canvases
/// are clamped to [`MAX_CANVAS_DIMENSION`] per side.
pub fn scale_raster(raster: &RasterBuffer, canvas: CanvasSize, filter: ScaleFilter) -> RgbaImage {
    let canvas = canvas.clamped();
    if canvas.is_empty() || raster.size().is_empty() {
        return RgbaImage::new(canvas.width, canvas.height);
    }
    if raster.size() == ImageSize::new(canvas.width, canvas.height) {
        return raster.as_image().clone();
    }
    imageops::resize(raster.as_image(), canvas.width, canvas.height, filter.into())
}
