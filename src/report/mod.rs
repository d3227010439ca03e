//! Result reporting.
//!
//! Renders the result set as indented JSON, echoes it to the console, and
//! writes the identical text to the output file.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::lookup::ResultSet;

/// Errors that can occur while reporting results.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write results file: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders the result set as a JSON object with 4-space indentation.
pub fn render(results: &ResultSet) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    results.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Prints the rendered results and writes them to `path`, overwriting any
/// existing content.
pub fn save(results: &ResultSet, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let path = path.as_ref();
    let rendered = render(results)?;

    println!("{rendered}");
    std::fs::write(path, &rendered)?;
    println!("Results saved to {}", path.display());

    Ok(())
}
