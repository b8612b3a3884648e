//! Data model for decoded P3 documents

use serde::{Deserialize, Serialize};

/// The only accepted magic number (ASCII RGB pixmap).
pub const MAGIC_P3: &str = "P3";

/// Largest max color value allowed by the Netpbm format.
pub const MAX_COLOR_LIMIT: u32 = 65535;

/// A single source line kept with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// The trimmed text of an upload, split into lines.
///
/// Only leading and trailing blank content is dropped; interior lines keep
/// their position so errors can point at the real source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument<'a> {
    lines: Vec<SourceLine<'a>>,
}

impl<'a> RawDocument<'a> {
    pub fn new(text: &'a str) -> Self {
        let trimmed = text.trim();
        // Number lines against the original text, not the trimmed one
        let skipped = text[..text.len() - text.trim_start().len()].matches('\n').count();
        let lines = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split('\n')
                .enumerate()
                .map(|(i, line)| SourceLine { number: skipped + i + 1, text: line.trim() })
                .collect()
        };
        Self { lines }
    }

    pub fn lines(&self) -> &[SourceLine<'a>] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Validated P3 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub max_color_value: u32,
}

impl Header {
    /// Number of pixel rows the body must contain.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn size(&self) -> ImageSize {
        ImageSize { width: self.width, height: self.height }
    }
}

/// One RGB triple in source range `[0, max_color_value]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u32; 3]);

impl Rgb {
    pub fn channels(&self) -> [u32; 3] {
        self.0
    }
}

/// Natural pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A fully validated P3 image: header plus exactly `width * height` pixels
/// in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImage {
    header: Header,
    pixels: Vec<Rgb>,
}

impl ParsedImage {
    pub(crate) fn new(header: Header, pixels: Vec<Rgb>) -> Self {
        debug_assert_eq!(pixels.len() as u64, header.pixel_count());
        Self { header, pixels }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn width(&self) -> u32 {
        self.header.width
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn max_color_value(&self) -> u32 {
        self.header.max_color_value
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.header.width || y >= self.header.height {
            return None;
        }
        let index = y as usize * self.header.width as usize + x as usize;
        self.pixels.get(index).copied()
    }
}
