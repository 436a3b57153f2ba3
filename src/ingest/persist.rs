use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

use crate::config::IngestConfig;

use super::IngestError;

/// A photo durably written under its final generated name.
#[derive(Debug, Clone)]
pub struct StoredPhoto {
    pub file_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Writes validated bytes under a fresh random name in the upload directory.
///
/// The bytes land in full in a dot-prefixed temp file first; the lister and
/// the handlers never pick those up, so no truncated file is ever visible
/// under a final name. Publishing links the temp file to the final name and
/// refuses to overwrite, retrying with fresh names on collision.
pub async fn persist(bytes: &[u8], cfg: &IngestConfig) -> Result<StoredPhoto, IngestError> {
    fs::create_dir_all(&cfg.upload_dir)
        .await
        .map_err(|err| storage("failed to create upload directory", err))?;

    let tmp_path = cfg
        .upload_dir
        .join(format!(".{}.part", Uuid::new_v4().simple()));
    if let Err(err) = write_durably(&tmp_path, bytes).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(storage("failed to write upload temp file", err));
    }

    let published = publish(&tmp_path, &cfg.upload_dir, cfg.publish_retries, || {
        format!("{}.{}", Uuid::new_v4().simple(), cfg.accepted_extension)
    })
    .await;
    let _ = fs::remove_file(&tmp_path).await;

    let (file_name, path) = published?;
    Ok(StoredPhoto {
        file_name,
        path,
        size_bytes: bytes.len() as u64,
    })
}

async fn write_durably(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

/// Links the fully written temp file under a generated final name.
///
/// `hard_link` fails on an existing target instead of overwriting, so a name
/// collision can never clobber another upload; a fresh name is drawn instead,
/// up to `retries` attempts.
async fn publish(
    tmp: &Path,
    dir: &Path,
    retries: u32,
    mut next_name: impl FnMut() -> String,
) -> Result<(String, PathBuf), IngestError> {
    for _ in 0..retries {
        let name = next_name();
        let target = dir.join(&name);
        match fs::hard_link(tmp, &target).await {
            Ok(()) => return Ok((name, target)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                warn!(name = %name, "generated photo name collided, drawing a fresh one");
            }
            Err(err) => return Err(storage("failed to publish upload", err)),
        }
    }
    Err(IngestError::Storage(anyhow::anyhow!(
        "exhausted {retries} attempts to find an unused photo name"
    )))
}

fn storage(context: &'static str, err: io::Error) -> IngestError {
    IngestError::Storage(anyhow::Error::new(err).context(context))
}
