//! The viewer: uploads, resizing, redraws and export over one state value

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use log::{debug, info, warn};
use web_time::{Duration, Instant};

use crate::config::ViewConfig;
use crate::debounce::RedrawScheduler;
use crate::error::{ReadFailure, ViewerError};
use crate::output::{encode_png, export_file_name, ExportError};
use crate::parser::parse_ppm;
use crate::renderer::rasterize;
use crate::resize::{parse_dimension_input, scale_raster, CanvasSize, ScaleFilter};
use crate::state::{LoadedImage, ViewerState};
use crate::upload::{accept_upload, read_upload, UploadTicket, UploadTracker};

/// What happened to a finished read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The image decoded and replaced the previous one
    Loaded,
    /// Reading or decoding failed; the previous image is still shown
    Failed(ViewerError),
    /// A newer upload was accepted first; the result was discarded
    Stale,
}

/// Drives a [`ViewerState`] through uploads, resizes and redraws.
#[derive(Debug)]
pub struct Viewer {
    state: ViewerState,
    uploads: UploadTracker,
    redraw: RedrawScheduler<CanvasSize>,
    filter: ScaleFilter,
    frame: RgbaImage,
}

impl Viewer {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            state: ViewerState::new(config.keep_aspect_ratio),
            uploads: UploadTracker::new(),
            redraw: RedrawScheduler::new(Duration::from_millis(u64::from(config.redraw_delay_ms))),
            filter: config.filter,
            frame: RgbaImage::new(0, 0),
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// The image currently on screen, at the last settled canvas size.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// Accept a drop and issue a ticket for its read.
    ///
    /// A rejected drop records the error but leaves the current image and
    /// any read already in flight alone.
    pub fn begin_upload<S: AsRef<str>>(&mut self, names: &[S]) -> Result<UploadTicket, ViewerError> {
        match accept_upload(names) {
            Ok(file_name) => {
                let ticket = self.uploads.issue(file_name);
                debug!("accepted upload {} (generation {})", ticket.file_name(), ticket.generation());
                self.state = self.state.without_error();
                Ok(ticket)
            }
            Err(e) => {
                warn!("rejected upload: {}", e);
                self.state = self.state.with_error(e.clone());
                Err(e)
            }
        }
    }

    /// Apply the result of a read started by [`Viewer::begin_upload`].
    pub fn finish_upload(&mut self, ticket: UploadTicket, read: Result<String, ReadFailure>) -> UploadOutcome {
        if !self.uploads.is_current(&ticket) {
            debug!(
                "discarding stale read of {} (generation {}, latest {})",
                ticket.file_name(),
                ticket.generation(),
                self.uploads.latest_generation()
            );
            return UploadOutcome::Stale;
        }

        match read.map_err(ViewerError::from).and_then(|text| decode_upload(ticket.file_name(), &text)) {
            Ok(image) => {
                info!("loaded {} ({}x{})", image.file_name(), image.header().width, image.header().height);
                self.redraw.cancel();
                self.frame = image.raster().as_image().clone();
                self.state = self.state.loaded(Arc::new(image));
                UploadOutcome::Loaded
            }
            Err(e) => {
                warn!("failed to load {}: {}", ticket.file_name(), e);
                self.state = self.state.with_error(e.clone());
                UploadOutcome::Failed(e)
            }
        }
    }

    /// Load a file from disk through the same accept/read/decode path.
    pub fn load_path(&mut self, path: &Path) -> Result<(), ViewerError> {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let ticket = self.begin_upload(&[name])?;
        match self.finish_upload(ticket, read_upload(path)) {
            UploadOutcome::Failed(e) => Err(e),
            UploadOutcome::Loaded | UploadOutcome::Stale => Ok(()),
        }
    }

    /// Handle raw input from the width field.
    pub fn set_canvas_width(&mut self, input: &str, now: Instant) -> Option<CanvasSize> {
        self.resize_width(parse_dimension_input(input), now)
    }

    /// Handle raw input from the height field.
    pub fn set_canvas_height(&mut self, input: &str, now: Instant) -> Option<CanvasSize> {
        self.resize_height(parse_dimension_input(input), now)
    }

    /// Set the canvas width and schedule a redraw. No-op without an image.
    pub fn resize_width(&mut self, width: u32, now: Instant) -> Option<CanvasSize> {
        let image = self.state.image()?.size();
        let canvas = self.state.canvas().with_width(width, image, self.state.keep_aspect_ratio());
        Some(self.apply_canvas(canvas, now))
    }

    /// Set the canvas height and schedule a redraw. No-op without an image.
    pub fn resize_height(&mut self, height: u32, now: Instant) -> Option<CanvasSize> {
        let image = self.state.image()?.size();
        let canvas = self.state.canvas().with_height(height, image, self.state.keep_aspect_ratio());
        Some(self.apply_canvas(canvas, now))
    }

    fn apply_canvas(&mut self, canvas: CanvasSize, now: Instant) -> CanvasSize {
        self.state = self.state.with_canvas(canvas);
        self.redraw.request(canvas, now);
        canvas
    }

    pub fn set_keep_aspect_ratio(&mut self, keep: bool) {
        self.state = self.state.with_keep_aspect_ratio(keep);
    }

    /// Run the pending redraw if its quiet period is over.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.redraw.poll(now) {
            Some(canvas) => {
                self.redraw_frame(canvas);
                true
            }
            None => false,
        }
    }

    /// Run the pending redraw now, if any.
    pub fn flush(&mut self) -> bool {
        match self.redraw.flush() {
            Some(canvas) => {
                self.redraw_frame(canvas);
                true
            }
            None => false,
        }
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw.is_pending()
    }

    /// Time until the pending redraw is due.
    pub fn next_redraw_in(&self, now: Instant) -> Option<Duration> {
        self.redraw.remaining(now)
    }

    fn redraw_frame(&mut self, canvas: CanvasSize) {
        if let Some(image) = self.state.image() {
            debug!("redraw at {}x{}", canvas.width, canvas.height);
            self.frame = scale_raster(image.raster(), canvas, self.filter);
        }
    }

    /// PNG bytes of the frame currently on screen.
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        if self.state.image().is_none() {
            return Err(ExportError::NothingLoaded);
        }
        encode_png(&self.frame)
    }

    /// Download name for [`Viewer::export_png`].
    pub fn export_file_name(&self) -> Option<String> {
        self.state.file_name().map(export_file_name)
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(&ViewConfig::default())
    }
}

fn decode_upload(file_name: &str, text: &str) -> Result<LoadedImage, ViewerError> {
    let parsed = parse_ppm(text)?;
    let raster = rasterize(&parsed)?;
    Ok(LoadedImage::new(file_name, *parsed.header(), raster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectReason;
    use crate::models::ImageSize;
    use crate::parser::PpmError;
    use crate::resize::MAX_CANVAS_DIMENSION;

    const WIDE: &str = "P3\n4 2\n255\n255 0 0\n0 255 0\n0 0 255\n255 255 255\n0 0 0\n1 1 1\n2 2 2\n3 3 3";
    const DOT: &str = "P3\n1 1\n1\n1 1 1";

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn viewer_with(text: &str) -> Viewer {
        let mut viewer = Viewer::default();
        let ticket = viewer.begin_upload(&["wide.ppm"]).unwrap();
        assert_eq!(viewer.finish_upload(ticket, Ok(text.to_string())), UploadOutcome::Loaded);
        viewer
    }

    #[test]
    fn test_load_sets_canvas_to_image_size() {
        let viewer = viewer_with(WIDE);
        let state = viewer.state();
        assert_eq!(state.file_name(), Some("wide.ppm"));
        assert_eq!(state.image_size(), ImageSize::new(4, 2));
        assert_eq!(state.canvas(), CanvasSize::new(4, 2));
        assert_eq!(viewer.frame().dimensions(), (4, 2));
        assert!(!viewer.redraw_pending());
    }

    #[test]
    fn test_failed_reupload_keeps_last_good_image() {
        let mut viewer = viewer_with(WIDE);
        viewer.resize_width(8, Instant::now());
        viewer.flush();
        let before_image = viewer.state().image().cloned();
        let before_frame = viewer.frame().clone();

        let ticket = viewer.begin_upload(&["broken.ppm"]).unwrap();
        let outcome = viewer.finish_upload(ticket, Ok("P3\n9 9\n255\n0 0 0".to_string()));

        assert!(matches!(outcome, UploadOutcome::Failed(ViewerError::Invalid(PpmError::PixelCountMismatch { .. }))));
        assert_eq!(viewer.state().image().cloned(), before_image);
        assert_eq!(viewer.state().file_name(), Some("wide.ppm"));
        assert_eq!(viewer.state().canvas(), CanvasSize::new(8, 4));
        assert_eq!(viewer.frame(), &before_frame);
        assert!(viewer.state().error().is_some());
    }

    #[test]
    fn test_read_failure_is_recorded() {
        let mut viewer = Viewer::default();
        let ticket = viewer.begin_upload(&["a.ppm"]).unwrap();
        let outcome = viewer.finish_upload(ticket, Err(ReadFailure::new("disk on fire")));

        assert!(matches!(outcome, UploadOutcome::Failed(ViewerError::FileReadFailure(_))));
        assert_eq!(viewer.state().error().map(|e| e.to_string()).as_deref(), Some("Failed to read PPM image file."));
        assert!(viewer.state().image().is_none());
    }

    #[test]
    fn test_stale_read_is_discarded() {
        let mut viewer = Viewer::default();
        let old = viewer.begin_upload(&["old.ppm"]).unwrap();
        let new = viewer.begin_upload(&["new.ppm"]).unwrap();

        assert_eq!(viewer.finish_upload(new, Ok(DOT.to_string())), UploadOutcome::Loaded);
        assert_eq!(viewer.finish_upload(old, Ok(WIDE.to_string())), UploadOutcome::Stale);

        assert_eq!(viewer.state().file_name(), Some("new.ppm"));
        assert_eq!(viewer.state().image_size(), ImageSize::new(1, 1));
    }

    #[test]
    fn test_stale_failure_does_not_set_error() {
        let mut viewer = Viewer::default();
        let old = viewer.begin_upload(&["old.ppm"]).unwrap();
        let _new = viewer.begin_upload(&["new.ppm"]).unwrap();

        assert_eq!(viewer.finish_upload(old, Err(ReadFailure::new("gone"))), UploadOutcome::Stale);
        assert!(viewer.state().error().is_none());
    }

    #[test]
    fn test_rejected_upload_keeps_image_and_sets_error() {
        let mut viewer = viewer_with(DOT);
        let err = viewer.begin_upload(&["a.ppm", "b.ppm"]).unwrap_err();

        assert_eq!(err, ViewerError::RejectedUpload(RejectReason::TooManyFiles));
        assert_eq!(viewer.state().error(), Some(&err));
        assert_eq!(viewer.state().file_name(), Some("wide.ppm"));

        // Next accepted drop clears the message
        viewer.begin_upload(&["c.ppm"]).unwrap();
        assert!(viewer.state().error().is_none());
    }

    #[test]
    fn test_resize_keeps_original_aspect_ratio() {
        let mut viewer = viewer_with(WIDE);
        let now = Instant::now();

        assert_eq!(viewer.set_canvas_width("2", now), Some(CanvasSize::new(2, 1)));
        assert_eq!(viewer.set_canvas_height("10", now), Some(CanvasSize::new(20, 10)));
        assert_eq!(viewer.set_canvas_width("", now), Some(CanvasSize::new(0, 0)));
    }

    #[test]
    fn test_resize_without_aspect_lock() {
        let mut viewer = viewer_with(WIDE);
        viewer.set_keep_aspect_ratio(false);
        let now = Instant::now();

        assert_eq!(viewer.set_canvas_width("10", now), Some(CanvasSize::new(10, 2)));
        assert_eq!(viewer.set_canvas_height("-3", now), Some(CanvasSize::new(10, 0)));
    }

    #[test]
    fn test_huge_width_input_is_clamped_before_redraw() {
        let mut viewer = viewer_with(DOT);
        viewer.set_keep_aspect_ratio(false);

        let canvas = viewer.set_canvas_width("4294967295", Instant::now());
        assert_eq!(canvas, Some(CanvasSize::new(MAX_CANVAS_DIMENSION, 1)));
        assert!(viewer.flush());
        assert_eq!(viewer.frame().dimensions(), (MAX_CANVAS_DIMENSION, 1));
    }

    #[test]
    fn test_resize_restores_natural_size_of_narrow_image() {
        let tall = format!("P3\n1 49\n1\n{}", vec!["1 0 1"; 49].join("\n"));
        let mut viewer = viewer_with(&tall);
        let now = Instant::now();

        assert_eq!(viewer.set_canvas_height("98", now), Some(CanvasSize::new(2, 98)));
        assert_eq!(viewer.set_canvas_height("49", now), Some(CanvasSize::new(1, 49)));
        viewer.flush();
        assert_eq!(viewer.frame().dimensions(), (1, 49));
    }

    #[test]
    fn test_resize_without_image_is_noop() {
        let mut viewer = Viewer::default();
        assert_eq!(viewer.set_canvas_width("10", Instant::now()), None);
        assert!(!viewer.redraw_pending());
    }

    #[test]
    fn test_rapid_resizes_redraw_once_with_final_size() {
        let mut viewer = viewer_with(WIDE);
        let start = Instant::now();
        let mut redraws = 0;

        for (offset, width) in [(0, "8"), (100, "12"), (200, "16")] {
            let now = start + ms(offset);
            if viewer.tick(now) {
                redraws += 1;
            }
            viewer.set_canvas_width(width, now);
        }
        assert_eq!(viewer.frame().dimensions(), (4, 2));

        for step in 0..40 {
            if viewer.tick(start + ms(200 + step * 50)) {
                redraws += 1;
            }
        }

        assert_eq!(redraws, 1);
        assert_eq!(viewer.frame().dimensions(), (16, 8));
    }

    #[test]
    fn test_new_upload_cancels_pending_redraw() {
        let mut viewer = viewer_with(WIDE);
        let now = Instant::now();
        viewer.set_canvas_width("40", now);
        assert!(viewer.redraw_pending());

        let ticket = viewer.begin_upload(&["dot.ppm"]).unwrap();
        viewer.finish_upload(ticket, Ok(DOT.to_string()));

        assert!(!viewer.redraw_pending());
        assert!(!viewer.tick(now + ms(5000)));
        assert_eq!(viewer.frame().dimensions(), (1, 1));
    }

    #[test]
    fn test_export_uses_display_scale() {
        let mut viewer = viewer_with(WIDE);
        viewer.set_canvas_width("8", Instant::now());
        viewer.flush();

        let png = viewer.export_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
        assert_eq!(viewer.export_file_name().as_deref(), Some("wide.ppm.png"));
    }

    #[test]
    fn test_export_without_image() {
        let viewer = Viewer::default();
        assert!(matches!(viewer.export_png(), Err(ExportError::NothingLoaded)));
        assert_eq!(viewer.export_file_name(), None);
    }

    #[test]
    fn test_export_empty_canvas() {
        let mut viewer = viewer_with(WIDE);
        viewer.set_canvas_width("0", Instant::now());
        viewer.flush();
        assert!(matches!(viewer.export_png(), Err(ExportError::EmptyCanvas { .. })));
    }

    #[test]
    fn test_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.ppm");
        std::fs::write(&path, DOT).unwrap();

        let mut viewer = Viewer::default();
        viewer.load_path(&path).unwrap();
        assert_eq!(viewer.state().file_name(), Some("dot.ppm"));

        let err = viewer.load_path(&dir.path().join("dot.png")).unwrap_err();
        assert_eq!(err, ViewerError::RejectedUpload(RejectReason::WrongExtension));
    }
}
