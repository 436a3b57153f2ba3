use std::path::Path;

use image::ImageFormat;

use super::IngestError;

/// Rejects a client-declared filename whose extension differs from the single
/// accepted one. Runs before any decoding; the comparison is case-insensitive.
pub fn check_extension(filename: &str, accepted: &str) -> Result<(), IngestError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if extension != accepted {
        return Err(IngestError::UnsupportedFormat(extension));
    }
    Ok(())
}

/// Structurally decodes the buffer as a JPEG.
///
/// The extension proves nothing about the content; only a full decode earns
/// the bytes a place on disk. The caller keeps this same buffer for the later
/// write, so what was validated is exactly what gets persisted.
pub fn validate(bytes: &[u8]) -> Result<(), IngestError> {
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map(|_| ())
        .map_err(IngestError::InvalidImage)
}
