use std::io;
use std::path::Path;

use anyhow::{Context, Result};

/// One stored photo, as shown on the gallery page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    pub file_name: String,
    pub size_bytes: u64,
}

/// Lists persisted photos, sorted by file name so that repeated calls over an
/// unchanged directory always agree.
///
/// Only names the persister generates are returned; dot-prefixed temp
/// artifacts and foreign files are skipped. A directory that does not exist
/// yet simply has no photos.
pub async fn list_photos(dir: &Path, extension: &str) -> Result<Vec<PhotoEntry>> {
    let mut entries = Vec::new();
    let mut reader = match tokio::fs::read_dir(dir).await {
        Ok(reader) => reader,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(entries),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read upload directory {}", dir.display()));
        }
    };

    while let Some(entry) = reader
        .next_entry()
        .await
        .context("failed to walk upload directory")?
    {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_photo_name(name, extension) {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => continue,
        };
        entries.push(PhotoEntry {
            file_name: name.to_string(),
            size_bytes: metadata.len(),
        });
    }

    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(entries)
}

/// Accepts exactly the names the persister generates: a 32-character
/// lowercase-hex stem plus the fixed extension. Everything else (temp
/// artifacts, traversal attempts, hand-placed files) is rejected, which is
/// what keeps the serve and delete handlers inside the upload directory.
pub fn is_photo_name(name: &str, extension: &str) -> bool {
    let Some(stem) = name
        .strip_suffix(extension)
        .and_then(|s| s.strip_suffix('.'))
    else {
        return false;
    };
    stem.len() == 32 && stem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
