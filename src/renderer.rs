//! Conversion of parsed P3 pixels into an RGBA raster

use image::{Rgba, RgbaImage};

use crate::models::{ImageSize, ParsedImage};
use crate::parser::{parse_ppm, PpmError};

/// Just under 256, so `channel == max` lands on 255 and never on 256.
const CHANNEL_SCALE: f64 = 255.9999;

/// Fully opaque alpha written for every pixel.
const OPAQUE: u8 = 255;

/// Decoded RGBA pixels, independent of any on-screen size.
///
/// Row-major, top-to-bottom, left-to-right, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    image: RgbaImage,
}

impl RasterBuffer {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.image.width(), self.image.height())
    }

    /// The raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// RGBA value at `(x, y)`, or `None` when out of bounds.
    pub fn rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        Some(self.image.get_pixel(x, y).0)
    }
}

/// Rescale one channel from `[0, max]` to `[0, 255]`.
///
/// Returns `None` when `max` is zero.
pub fn normalize_channel(channel: u32, max: u32) -> Option<u8> {
    (max != 0).then(|| scale_channel(channel, max))
}

fn scale_channel(channel: u32, max: u32) -> u8 {
    let scaled = (f64::from(channel) / f64::from(max) * CHANNEL_SCALE).floor();
    scaled.clamp(0.0, 255.0) as u8
}

/// Rasterize a parsed image into RGBA.
///
/// # Examples
///
/// ```
/// use ppmview::parser::parse_ppm;
/// use ppmview::renderer::rasterize;
///
/// let parsed = parse_ppm("P3\n1 1\n1\n1 0 1").unwrap();
/// let raster = rasterize(&parsed).unwrap();
/// assert_eq!(raster.as_bytes(), &[255, 0, 255, 255]);
/// ```
pub fn rasterize(parsed: &ParsedImage) -> Result<RasterBuffer, PpmError> {
    let max = parsed.max_color_value();
    if max == 0 {
        return Err(PpmError::InvalidMaxColorValue { value: max.to_string() });
    }

    let width = parsed.width();
    let mut image = RgbaImage::new(width, parsed.height());
    for (index, pixel) in parsed.pixels().iter().enumerate() {
        let x = index as u32 % width;
        let y = index as u32 / width;
        let mut rgba = [0, 0, 0, OPAQUE];
        for (out, &channel) in rgba.iter_mut().zip(pixel.channels().iter()) {
            *out = scale_channel(channel, max);
        }
        image.put_pixel(x, y, Rgba(rgba));
    }

    Ok(RasterBuffer { image })
}

/// Parse and rasterize in one step.
pub fn decode(text: &str) -> Result<RasterBuffer, PpmError> {
    rasterize(&parse_ppm(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_full_range() {
        assert_eq!(normalize_channel(0, 255), Some(0));
        assert_eq!(normalize_channel(255, 255), Some(255));
        assert_eq!(normalize_channel(128, 255), Some(128));
    }

    #[test]
    fn test_normalize_binary_channel() {
        assert_eq!(normalize_channel(0, 1), Some(0));
        assert_eq!(normalize_channel(1, 1), Some(255));
    }

    #[test]
    fn test_normalize_max_maps_to_255_for_every_max() {
        for max in [1, 2, 3, 7, 15, 100, 255, 256, 1000, 4095, 65535] {
            assert_eq!(normalize_channel(max, max), Some(255), "max {max}");
        }
    }

    #[test]
    fn test_normalize_zero_max() {
        assert_eq!(normalize_channel(0, 0), None);
    }

    #[test]
    fn test_normalize_sixteen_bit() {
        assert_eq!(normalize_channel(32767, 65535), Some(127));
        assert_eq!(normalize_channel(32768, 65535), Some(128));
    }

    #[test]
    fn test_rasterize_writes_rgba_in_scan_order() {
        let parsed = parse_ppm("P3\n2 2\n255\n255 0 0\n0 255 0\n0 0 255\n10 20 30").unwrap();
        let raster = rasterize(&parsed).unwrap();
        assert_eq!(raster.width(), 2);
        assert_eq!(raster.height(), 2);
        assert_eq!(
            raster.as_bytes(),
            &[255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 10, 20, 30, 255]
        );
    }

    #[test]
    fn test_rasterize_alpha_is_opaque() {
        let raster = decode("P3\n3 1\n7\n0 0 0\n3 3 3\n7 7 7").unwrap();
        assert!(raster.as_bytes().chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_rasterize_buffer_length() {
        let raster = decode("P3\n3 2\n9\n0 0 0\n1 1 1\n2 2 2\n3 3 3\n4 4 4\n5 5 5").unwrap();
        assert_eq!(raster.as_bytes().len(), 3 * 2 * 4);
    }

    #[test]
    fn test_rasterize_rgba_lookup() {
        let raster = decode("P3\n2 1\n3\n3 0 0\n0 3 0").unwrap();
        assert_eq!(raster.rgba(1, 0), Some([0, 255, 0, 255]));
        assert_eq!(raster.rgba(2, 0), None);
    }

    #[test]
    fn test_rasterize_rejects_zero_max() {
        use crate::models::{Header, Rgb};

        let header = Header { width: 1, height: 1, max_color_value: 0 };
        let parsed = ParsedImage::new(header, vec![Rgb([0, 0, 0])]);
        assert!(matches!(rasterize(&parsed), Err(PpmError::InvalidMaxColorValue { .. })));
    }

    #[test]
    fn test_decode_propagates_parse_error() {
        assert!(matches!(decode("P6\n1 1\n255\n0 0 0"), Err(PpmError::BadMagicNumber { .. })));
    }
}
