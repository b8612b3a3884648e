//! ppmview - ASCII PPM (P3) viewer core
//!
//! This library provides functionality to:
//! - Parse and validate P3 documents, failing fast on the first error
//! - Rasterize them into RGBA buffers
//! - Resize the displayed canvas with an optional aspect-ratio lock and
//!   debounced redraws
//! - Export the displayed image as PNG
//!
//! The browser page talks to [`viewer::Viewer`] through the `wasm` feature;
//! the `ppmview` binary drives the same viewer from the command line.

pub mod cli;
pub mod config;
pub mod debounce;
pub mod error;
pub mod models;
pub mod output;
pub mod parser;
pub mod renderer;
pub mod resize;
pub mod state;
pub mod upload;
pub mod viewer;
pub mod watch;

#[cfg(feature = "wasm")]
pub mod wasm;
