//! WASM API module for browser/JS interop
//!
//! [`WasmViewer`] is the page's controller: the host hands it dropped file
//! names, file contents once read, text from the width and height fields,
//! and calls [`WasmViewer::tick`] from its animation loop. The page then
//! draws [`WasmViewer::pixels`] and shows [`WasmViewer::error`].

use log::warn;
use wasm_bindgen::prelude::*;
use web_time::Instant;

use crate::config::ViewConfig;
use crate::error::ReadFailure;
use crate::output::encode_png;
use crate::parser::parse_ppm;
use crate::renderer::decode;
use crate::upload::UploadTicket;
use crate::viewer::{UploadOutcome, Viewer};

/// Initialize logging and the panic hook
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Interactive viewer state exposed to JavaScript.
#[wasm_bindgen]
pub struct WasmViewer {
    viewer: Viewer,
    // Only the latest read can still land
    pending: Option<UploadTicket>,
}

#[wasm_bindgen]
impl WasmViewer {
    /// Create a viewer with the default 1s redraw delay.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmViewer {
        Self::with_redraw_delay(ViewConfig::default().redraw_delay_ms)
    }

    /// Create a viewer with a custom redraw delay in milliseconds.
    pub fn with_redraw_delay(redraw_delay_ms: u32) -> WasmViewer {
        let config = ViewConfig { redraw_delay_ms, ..Default::default() };
        WasmViewer { viewer: Viewer::new(&config), pending: None }
    }

    /// Start an upload from the names of the dropped files.
    ///
    /// Returns the upload's generation, or 0 if the drop was rejected (see
    /// [`WasmViewer::error`]).
    pub fn begin_upload(&mut self, names: Vec<String>) -> u32 {
        match self.viewer.begin_upload(&names) {
            Ok(ticket) => {
                let generation = ticket.generation() as u32;
                self.pending = Some(ticket);
                generation
            }
            Err(_) => 0,
        }
    }

    /// Deliver the text of a finished read.
    ///
    /// Returns `"loaded"`, `"failed"` or `"stale"`.
    pub fn complete_upload(&mut self, generation: u32, text: String) -> String {
        self.finish(generation, Ok(text))
    }

    /// Report that reading the file failed.
    pub fn fail_upload(&mut self, generation: u32, detail: String) -> String {
        self.finish(generation, Err(ReadFailure::new(detail)))
    }

    /// Raw text from the width field.
    pub fn set_canvas_width(&mut self, input: &str) -> bool {
        self.viewer.set_canvas_width(input, Instant::now()).is_some()
    }

    /// Raw text from the height field.
    pub fn set_canvas_height(&mut self, input: &str) -> bool {
        self.viewer.set_canvas_height(input, Instant::now()).is_some()
    }

    pub fn set_keep_aspect_ratio(&mut self, keep: bool) {
        self.viewer.set_keep_aspect_ratio(keep);
    }

    /// Run a due redraw. Returns true when the frame changed.
    pub fn tick(&mut self) -> bool {
        self.viewer.tick(Instant::now())
    }

    /// Milliseconds until the pending redraw, if any.
    pub fn next_redraw_in_ms(&self) -> Option<u32> {
        self.viewer
            .next_redraw_in(Instant::now())
            .map(|d| u32::try_from(d.as_millis()).unwrap_or(u32::MAX))
    }

    /// RGBA bytes of the frame on screen
    #[wasm_bindgen(getter)]
    pub fn pixels(&self) -> Vec<u8> {
        self.viewer.frame().as_raw().clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.viewer.frame().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.viewer.frame().height()
    }

    /// Canvas width as shown in the width field
    #[wasm_bindgen(getter)]
    pub fn canvas_width(&self) -> u32 {
        self.viewer.state().canvas().width
    }

    /// Canvas height as shown in the height field
    #[wasm_bindgen(getter)]
    pub fn canvas_height(&self) -> u32 {
        self.viewer.state().canvas().height
    }

    /// Natural width of the loaded image, unaffected by resizing
    #[wasm_bindgen(getter)]
    pub fn image_width(&self) -> u32 {
        self.viewer.state().image_size().width
    }

    /// Natural height of the loaded image, unaffected by resizing
    #[wasm_bindgen(getter)]
    pub fn image_height(&self) -> u32 {
        self.viewer.state().image_size().height
    }

    #[wasm_bindgen(getter)]
    pub fn keep_aspect_ratio(&self) -> bool {
        self.viewer.state().keep_aspect_ratio()
    }

    /// Message to show in the error area, if any
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.viewer.state().error().map(ToString::to_string)
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> Option<String> {
        self.viewer.state().file_name().map(str::to_string)
    }

    /// PNG bytes of the frame on screen, or `None` when there is nothing to export.
    pub fn export_png(&self) -> Option<Vec<u8>> {
        match self.viewer.export_png() {
            Ok(png) => Some(png),
            Err(e) => {
                warn!("export failed: {}", e);
                None
            }
        }
    }

    /// Download name for [`WasmViewer::export_png`].
    pub fn export_file_name(&self) -> Option<String> {
        self.viewer.export_file_name()
    }
}

impl WasmViewer {
    fn finish(&mut self, generation: u32, read: Result<String, ReadFailure>) -> String {
        let ticket = match self.pending.take() {
            Some(ticket) if ticket.generation() as u32 == generation => ticket,
            other => {
                self.pending = other;
                return "stale".to_string();
            }
        };

        let outcome = match self.viewer.finish_upload(ticket, read) {
            UploadOutcome::Loaded => "loaded",
            UploadOutcome::Failed(_) => "failed",
            UploadOutcome::Stale => "stale",
        };
        outcome.to_string()
    }
}

impl Default for WasmViewer {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of decoding a P3 document to RGBA pixels.
#[wasm_bindgen]
pub struct DecodeResult {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    error: Option<String>,
}

#[wasm_bindgen]
impl DecodeResult {
    /// Width of the decoded image in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the decoded image in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixel data (4 bytes per pixel)
    #[wasm_bindgen(getter)]
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Why decoding failed, if it did
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }
}

/// Decode a P3 document to RGBA pixels.
#[wasm_bindgen]
pub fn decode_to_rgba(text: &str) -> DecodeResult {
    match decode(text) {
        Ok(raster) => DecodeResult {
            width: raster.width(),
            height: raster.height(),
            pixels: raster.into_image().into_raw(),
            error: None,
        },
        Err(e) => DecodeResult { width: 0, height: 0, pixels: Vec::new(), error: Some(e.to_string()) },
    }
}

/// Decode a P3 document and encode it as PNG.
///
/// Returns an empty array if the document is invalid.
#[wasm_bindgen]
pub fn decode_to_png(text: &str) -> Vec<u8> {
    let Ok(raster) = decode(text) else {
        return Vec::new();
    };
    encode_png(raster.as_image()).unwrap_or_default()
}

/// Validate a P3 document.
///
/// Returns the first error message, or an empty array if the document is valid.
#[wasm_bindgen]
pub fn validate(text: &str) -> Vec<String> {
    match parse_ppm(text) {
        Ok(_) => Vec::new(),
        Err(e) => vec![e.to_string()],
    }
}
