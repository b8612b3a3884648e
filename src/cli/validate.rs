//! Validation and inspection command implementations (validate, info)

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde_json::{json, Value};

use crate::error::{RejectReason, ViewerError};
use crate::models::Header;
use crate::parser::{parse_header, parse_ppm, HeaderSummary};
use crate::upload::{is_ppm_file, read_upload};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Read a `.ppm` file, applying the same extension rule as an upload.
fn read_ppm(path: &Path) -> Result<String, ViewerError> {
    if !is_ppm_file(path) {
        return Err(ViewerError::RejectedUpload(RejectReason::WrongExtension));
    }
    Ok(read_upload(path)?)
}

/// Fully parse one file, returning its header.
fn check_file(path: &Path) -> Result<Header, ViewerError> {
    let text = read_ppm(path)?;
    let parsed = parse_ppm(&text)?;
    Ok(*parsed.header())
}

fn error_line(error: &ViewerError) -> Option<usize> {
    match error {
        ViewerError::Invalid(e) => e.line(),
        _ => None,
    }
}

fn error_json(path: &Path, error: &ViewerError) -> Value {
    json!({
        "file": path.display().to_string(),
        "valid": false,
        "kind": error.kind(),
        "line": error_line(error),
        "message": error.to_string(),
    })
}

fn header_json(header: &Header) -> Value {
    json!({
        "width": header.width,
        "height": header.height,
        "max_color_value": header.max_color_value,
    })
}

/// Execute the validate command
pub fn run_validate(files: &[PathBuf], json: bool) -> ExitCode {
    let mut failures = 0usize;
    let mut results = Vec::with_capacity(files.len());

    for file in files {
        match check_file(file) {
            Ok(header) => {
                if json {
                    results.push(json!({
                        "file": file.display().to_string(),
                        "valid": true,
                        "header": header_json(&header),
                    }));
                } else {
                    println!("{}: OK ({}x{}, max {})", file.display(), header.width, header.height, header.max_color_value);
                }
            }
            Err(e) => {
                failures += 1;
                if json {
                    results.push(error_json(file, &e));
                } else {
                    match error_line(&e) {
                        Some(line) => eprintln!("{}:{}: {}", file.display(), line, e),
                        None => eprintln!("{}: {}", file.display(), e),
                    }
                }
            }
        }
    }

    if json {
        let report = json!({
            "files": files.len(),
            "failed": failures,
            "results": results,
        });
        println!("{}", report);
    } else if files.len() > 1 {
        println!();
        println!("{} file(s) checked, {} failed", files.len(), failures);
    }

    if failures == 0 {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

fn summarize(path: &Path) -> Result<HeaderSummary, ViewerError> {
    let text = read_ppm(path)?;
    Ok(parse_header(&text)?)
}

/// Execute the info command
pub fn run_info(input: &Path, json: bool) -> ExitCode {
    let summary = match summarize(input) {
        Ok(summary) => summary,
        Err(e) => {
            if json {
                println!("{}", error_json(input, &e));
            } else {
                eprintln!("Error: {}: {}", input.display(), e);
            }
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let header = summary.header;
    if json {
        let info = json!({
            "file": input.display().to_string(),
            "header": header_json(&header),
            "pixel_count": header.pixel_count(),
            "pixel_rows": summary.pixel_rows,
            "complete": summary.is_complete(),
        });
        println!("{}", info);
    } else {
        println!("File:       {}", input.display());
        println!("Size:       {}x{}", header.width, header.height);
        println!("Max value:  {}", header.max_color_value);
        println!("Pixel rows: {} of {}", summary.pixel_rows, header.pixel_count());
        if !summary.is_complete() {
            println!("Warning: pixel row count does not match the header");
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
