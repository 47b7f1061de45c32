//! SVG flamegraph output writer.

use super::json::{create_parent_dirs, validate_output_path};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write SVG content to a file
///
/// **Public** - main entry point for SVG output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
pub fn write_svg(svg_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing SVG to: {}", output_path.display());

    validate_output_path(output_path)?;
    if output_path.extension().is_some_and(|ext| ext != "svg") {
        debug!("File does not have .svg extension: {}", output_path.display());
    }
    create_parent_dirs(output_path)?;

    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all(svg_content.as_bytes())?;
    writer.flush()?;

    let file_size = svg_content.len();
    info!(
        "SVG written successfully ({} bytes, {:.2} KB)",
        file_size,
        file_size as f64 / 1024.0
    );

    Ok(())
}

/// Write any rendered text output (dot graph, JSON) to a file
pub fn write_text(content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    validate_output_path(output_path)?;
    create_parent_dirs(output_path)?;

    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;

    info!("Wrote {} bytes to {}", content.len(), output_path.display());
    Ok(())
}
