//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod render;
mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, ViewerConfig};
use crate::resize::ScaleFilter;

pub use render::{render_file, RenderError, ResizeRequest};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// ppmview - View, validate and convert ASCII PPM (P3) images
#[derive(Parser)]
#[command(name = "ppmview")]
#[command(about = "ppmview - Parse ASCII PPM (P3) images, resize them and export to PNG")]
#[command(version)]
pub struct Cli {
    /// Path to a ppmview.toml (default: discovered from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Canvas sizing flags shared by `render` and `watch`
#[derive(clap::Args, Debug, Clone)]
pub struct CanvasArgs {
    /// Canvas width in pixels (height follows the aspect ratio unless --height is given)
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels (width follows the aspect ratio unless --width is given)
    #[arg(long)]
    pub height: Option<u32>,

    /// Do not preserve the original aspect ratio when only one dimension is given
    #[arg(long)]
    pub no_keep_aspect: bool,

    /// Resampling filter for resized output
    #[arg(long, value_enum)]
    pub filter: Option<ScaleFilter>,
}

impl CanvasArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            keep_aspect_ratio: self.no_keep_aspect.then_some(false),
            filter: self.filter,
            ..Default::default()
        }
    }

    fn resize(&self) -> ResizeRequest {
        ResizeRequest { width: self.width, height: self.height }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a .ppm file to PNG
    Render {
        /// Input file (.ppm)
        input: PathBuf,

        /// Output file or directory.
        /// If omitted: {input}.png
        /// If directory (ends with /): dir/{input file name}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        canvas: CanvasArgs,
    },

    /// Validate .ppm files and report the first error in each
    Validate {
        /// Files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show header information for a .ppm file
    Info {
        /// Input file (.ppm)
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-render a .ppm file whenever it changes
    Watch {
        /// Input file (.ppm)
        input: PathBuf,

        /// Output file or directory (same rules as render)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        canvas: CanvasArgs,

        /// Debounce delay in milliseconds
        #[arg(long)]
        debounce: Option<u32>,

        /// Don't clear the terminal between renders
        #[arg(long)]
        no_clear: bool,
    },
}

/// Initialise `env_logger`, defaulting to `info` (or `debug` with --verbose).
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    // A second init (e.g. in tests) is harmless
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).try_init();
}

fn resolve_config(path: Option<&std::path::Path>, overrides: &CliOverrides) -> Result<ViewerConfig, ExitCode> {
    match load_config(path) {
        Ok(mut config) => {
            merge_cli_overrides(&mut config, overrides);
            let errors = config.validate();
            if errors.is_empty() {
                return Ok(config);
            }
            for error in errors {
                eprintln!("Error: {}", error);
            }
            Err(ExitCode::from(EXIT_INVALID_ARGS))
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

/// Entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render { input, output, canvas } => {
            let config = match resolve_config(cli.config.as_deref(), &canvas.overrides()) {
                Ok(config) => config,
                Err(code) => return code,
            };
            render::run_render(&input, output.as_deref(), canvas.resize(), &config)
        }
        Commands::Validate { files, json } => validate::run_validate(&files, json),
        Commands::Info { input, json } => validate::run_info(&input, json),
        Commands::Watch { input, output, canvas, debounce, no_clear } => {
            let overrides = CliOverrides {
                debounce_ms: debounce,
                clear_screen: no_clear.then_some(false),
                ..canvas.overrides()
            };
            let config = match resolve_config(cli.config.as_deref(), &overrides) {
                Ok(config) => config,
                Err(code) => return code,
            };
            render::run_watch(&input, output.as_deref(), canvas.resize(), &config)
        }
    }
}
