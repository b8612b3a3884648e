//! Watch mode for automatic re-rendering on file changes
//!
//! Provides file system watching with debouncing for the `ppmview watch` command.

use log::{info, warn};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::config::schema::WatchConfig;

/// Error during watch mode
#[derive(Debug)]
pub enum WatchError {
    /// Failed to initialize file watcher
    WatcherInit(notify::Error),
    /// Failed to add watch path
    WatchPath(notify::Error),
    /// Channel receive error
    ChannelError(String),
    /// Input file not found
    SourceNotFound(PathBuf),
}

impl std::fmt::Display for WatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchError::WatcherInit(e) => write!(f, "Failed to initialize file watcher: {}", e),
            WatchError::WatchPath(e) => write!(f, "Failed to watch path: {}", e),
            WatchError::ChannelError(msg) => write!(f, "Watch channel error: {}", msg),
            WatchError::SourceNotFound(path) => {
                write!(f, "Input file not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for WatchError {}

/// Options for watch mode
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// The .ppm file to watch
    pub input: PathBuf,
    /// Where each successful render is written
    pub output: PathBuf,
    /// Watch configuration (debounce, clear screen)
    pub config: WatchConfig,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("image.ppm"),
            output: PathBuf::from("image.ppm.png"),
            config: WatchConfig::default(),
        }
    }
}

/// Clear the terminal screen
fn clear_screen() {
    // ANSI escape code to clear screen and move cursor to top-left
    print!("\x1B[2J\x1B[1;1H");
}

/// Format duration for display
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Directory to hand to the watcher for `input`.
///
/// Editors often replace a file rather than write it in place, so the parent
/// is watched and events are filtered by name.
fn watch_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Check if a changed path refers to the watched input
fn is_relevant_path(changed: &Path, input: &Path) -> bool {
    match (changed.file_name(), input.file_name()) {
        (Some(changed), Some(input)) => changed == input,
        _ => false,
    }
}

fn render_once<F, E>(options: &WatchOptions, render: &mut F)
where
    F: FnMut(&Path, &Path) -> Result<(), E>,
    E: Display,
{
    if options.config.clear_screen {
        clear_screen();
    }

    let start = Instant::now();
    match render(&options.input, &options.output) {
        Ok(()) => info!(
            "Rendered {} -> {} ({})",
            options.input.display(),
            options.output.display(),
            format_duration(start.elapsed())
        ),
        // The previous PNG stays on disk until the input is fixed
        Err(e) => warn!("Render failed ({}): {}", format_duration(start.elapsed()), e),
    }
}

/// Watch a .ppm file and re-render it whenever it changes.
///
/// `render` is called once on startup and then once per debounced batch of
/// changes to the input. A failed render is logged and watching continues.
/// This function blocks until the watcher's channel closes.
///
/// # Example
/// ```ignore
/// let options = WatchOptions {
///     input: PathBuf::from("sunset.ppm"),
///     output: PathBuf::from("sunset.ppm.png"),
///     config: WatchConfig::default(),
/// };
/// watch_and_render(options, |input, output| render_file(&mut viewer, input, output, resize))?;
/// ```
pub fn watch_and_render<F, E>(options: WatchOptions, mut render: F) -> Result<(), WatchError>
where
    F: FnMut(&Path, &Path) -> Result<(), E>,
    E: Display,
{
    if !options.input.is_file() {
        return Err(WatchError::SourceNotFound(options.input.clone()));
    }

    let (tx, rx) = channel();

    let debounce_duration = Duration::from_millis(u64::from(options.config.debounce_ms));
    let mut debouncer = new_debouncer(debounce_duration, tx).map_err(WatchError::WatcherInit)?;

    let dir = watch_dir(&options.input);
    debouncer.watcher().watch(&dir, RecursiveMode::NonRecursive).map_err(WatchError::WatchPath)?;

    render_once(&options, &mut render);
    info!("Watching {} for changes...", options.input.display());

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed = events.iter().any(|e| {
                    matches!(e.kind, DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous)
                        && is_relevant_path(&e.path, &options.input)
                });

                if changed {
                    info!("Changed: {}", options.input.display());
                    render_once(&options, &mut render);
                    info!("Watching {} for changes...", options.input.display());
                }
            }
            Ok(Err(error)) => {
                // Non-fatal, keep watching
                warn!("Watch error: {:?}", error);
            }
            Err(e) => {
                return Err(WatchError::ChannelError(e.to_string()));
            }
        }
    }
}
