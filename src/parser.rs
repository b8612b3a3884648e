//! P3 (ASCII PPM) parsing and validation
//!
//! The accepted layout is strictly line oriented:
//!
//! ```text
//! P3
//! <width> <height>
//! <max color value>
//! <r> <g> <b>        (one line per pixel, width * height lines)
//! ```
//!
//! Parsing is fail-fast: the first violation is returned and nothing is
//! accumulated.

use log::debug;
use thiserror::Error;

use crate::models::{Header, ParsedImage, RawDocument, Rgb, SourceLine, MAGIC_P3, MAX_COLOR_LIMIT};

/// Lines taken by the header (magic, dimensions, max value).
const HEADER_LINES: usize = 3;

/// Reason a document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PpmError {
    #[error("Invalid PPM image file format - too few lines (found {found}, need at least 3)")]
    TooFewLines { found: usize },

    #[error("Bad PPM image file format - magic number must be \"P3\" (found \"{found}\")")]
    BadMagicNumber { found: String },

    #[error("Bad PPM image file format - image width is not a number (\"{value}\")")]
    InvalidWidth { value: String },

    #[error("Bad PPM image file format - image height is not a number (\"{value}\")")]
    InvalidHeight { value: String },

    #[error("Bad PPM image file format - maximum color value must be a non-zero number up to 65535 (\"{value}\")")]
    InvalidMaxColorValue { value: String },

    #[error("Bad PPM image file format - Not enough lines of pixel data (found: {found}, expecting: {expected}), based on width = {width} and height = {height}")]
    PixelCountMismatch { found: usize, expected: u64, width: u32, height: u32 },

    #[error("Bad PPM image file format - Pixel data at line {line} is invalid (must contain 3 numbers separated by spaces from 0 - {max})")]
    MalformedPixelRow { line: usize, max: u32 },
}

impl PpmError {
    /// 1-based source line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            PpmError::BadMagicNumber { .. } => Some(1),
            PpmError::InvalidWidth { .. } | PpmError::InvalidHeight { .. } => Some(2),
            PpmError::InvalidMaxColorValue { .. } => Some(3),
            PpmError::MalformedPixelRow { line, .. } => Some(*line),
            PpmError::TooFewLines { .. } | PpmError::PixelCountMismatch { .. } => None,
        }
    }

    /// Stable snake_case tag, used for JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            PpmError::TooFewLines { .. } => "too_few_lines",
            PpmError::BadMagicNumber { .. } => "bad_magic_number",
            PpmError::InvalidWidth { .. } => "invalid_width",
            PpmError::InvalidHeight { .. } => "invalid_height",
            PpmError::InvalidMaxColorValue { .. } => "invalid_max_color_value",
            PpmError::PixelCountMismatch { .. } => "pixel_count_mismatch",
            PpmError::MalformedPixelRow { .. } => "malformed_pixel_row",
        }
    }
}

/// Header plus the number of pixel rows actually present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSummary {
    pub header: Header,
    pub pixel_rows: usize,
}

impl HeaderSummary {
    /// Whether the body has exactly the rows the header asks for.
    pub fn is_complete(&self) -> bool {
        self.pixel_rows as u64 == self.header.pixel_count()
    }
}

/// Parse and validate a complete P3 document.
///
/// # Examples
///
/// ```
/// use ppmview::parser::parse_ppm;
///
/// let image = parse_ppm("P3\n2 1\n255\n255 0 0\n0 0 255").unwrap();
/// assert_eq!(image.width(), 2);
/// assert_eq!(image.pixels().len(), 2);
/// ```
pub fn parse_ppm(text: &str) -> Result<ParsedImage, PpmError> {
    let doc = RawDocument::new(text);
    let header = read_header(&doc)?;

    let rows = &doc.lines()[HEADER_LINES..];
    if rows.len() as u64 != header.pixel_count() {
        return Err(PpmError::PixelCountMismatch {
            found: rows.len(),
            expected: header.pixel_count(),
            width: header.width,
            height: header.height,
        });
    }

    // Rows are already in scan order: y outer, x inner
    let pixels =
        rows.iter().map(|row| parse_pixel_row(row, header.max_color_value)).collect::<Result<Vec<_>, _>>()?;

    debug!(
        "parsed P3 image {}x{} (max color value {})",
        header.width, header.height, header.max_color_value
    );
    Ok(ParsedImage::new(header, pixels))
}

/// Validate only the header, without touching pixel rows.
pub fn parse_header(text: &str) -> Result<HeaderSummary, PpmError> {
    let doc = RawDocument::new(text);
    let header = read_header(&doc)?;
    Ok(HeaderSummary { header, pixel_rows: doc.len() - HEADER_LINES })
}

fn read_header(doc: &RawDocument<'_>) -> Result<Header, PpmError> {
    let lines = doc.lines();
    if lines.len() < HEADER_LINES {
        return Err(PpmError::TooFewLines { found: lines.len() });
    }

    let magic = lines[0].text;
    if magic != MAGIC_P3 {
        return Err(PpmError::BadMagicNumber { found: magic.to_string() });
    }

    let (width, height) = parse_dimensions(lines[1].text)?;

    let max_text = lines[2].text;
    let max_color_value = match max_text.parse::<u32>() {
        Ok(v) if v > 0 && v <= MAX_COLOR_LIMIT => v,
        _ => return Err(PpmError::InvalidMaxColorValue { value: max_text.to_string() }),
    };

    Ok(Header { width, height, max_color_value })
}

fn parse_dimensions(line: &str) -> Result<(u32, u32), PpmError> {
    let mut tokens = line.split_whitespace();

    let width_token = tokens.next().unwrap_or("");
    let width = parse_positive(width_token)
        .ok_or_else(|| PpmError::InvalidWidth { value: width_token.to_string() })?;

    let height_token = tokens.next().unwrap_or("");
    let height = match (parse_positive(height_token), tokens.next()) {
        (Some(h), None) => h,
        _ => {
            let rest = line.split_whitespace().skip(1).collect::<Vec<_>>().join(" ");
            return Err(PpmError::InvalidHeight { value: rest });
        }
    };

    Ok((width, height))
}

fn parse_positive(token: &str) -> Option<u32> {
    token.parse::<u32>().ok().filter(|&v| v > 0)
}

fn parse_pixel_row(row: &SourceLine<'_>, max: u32) -> Result<Rgb, PpmError> {
    let malformed = || PpmError::MalformedPixelRow { line: row.number, max };

    let mut channels = [0u32; 3];
    let mut count = 0;
    for token in row.text.split_whitespace() {
        if count == 3 {
            return Err(malformed());
        }
        channels[count] = token.parse::<u32>().ok().filter(|&v| v <= max).ok_or_else(malformed)?;
        count += 1;
    }
    if count != 3 {
        return Err(malformed());
    }

    Ok(Rgb(channels))
}
