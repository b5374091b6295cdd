//! PNG output for rendered pixel targets.
//!
//! Encoding and file writing are split so the render boundary can treat
//! "could not encode" and "could not write" as distinct failures.

use std::fs;
use std::io::Write;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{Result, SnapError};
use crate::render::device::PixelTarget;

/// Encode a pixel target to PNG bytes.
///
/// Lossless RGBA8 at the target's exact dimensions.
pub fn encode_png(target: &PixelTarget) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();

    PngEncoder::new(&mut bytes)
        .write_image(
            &target.to_rgba_buffer(),
            target.width(),
            target.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| SnapError::Encode {
            message: format!("failed to encode {}x{} PNG: {}", target.width(), target.height(), e),
        })?;

    Ok(bytes)
}

/// Write encoded bytes to a destination path.
///
/// Missing parent directories are created first. The file handle closes on
/// every exit path; there is no atomic rename, so a crash mid-write can
/// leave a partial file behind.
pub fn write_png(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SnapError::Io {
                path: parent.to_path_buf(),
                message: format!("Failed to create export directory: {}", e),
            })?;
        }
    }

    let mut file = fs::File::create(path).map_err(|e| SnapError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to create output file: {}", e),
    })?;

    file.write_all(bytes).map_err(|e| SnapError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write PNG: {}", e),
    })?;

    Ok(())
}

/// Encode a pixel target and write it to `path`.
pub fn export_png(target: &PixelTarget, path: &Path) -> Result<()> {
    write_png(&encode_png(target)?, path)
}
