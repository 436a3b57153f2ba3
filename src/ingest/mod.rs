pub mod body;
pub mod image;
pub mod multipart;
pub mod persist;

use sanitize_filename::sanitize;
use thiserror::Error;
use tokio::io::AsyncRead;
use tracing::{debug, info};

use crate::config::IngestConfig;
use crate::session::SessionStore;

pub use multipart::{Field, FileUpload, FormData};
pub use persist::StoredPhoto;

/// Multipart field the gallery form posts its photo under.
pub const FILE_FIELD: &str = "file";

/// Terminal classification for one upload request. Every failure is converted
/// into exactly one of these at the point of detection; the web boundary maps
/// them to status codes and redirects.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("request declared no body length")]
    MissingLength,
    #[error("body ended after {received} of {declared} declared bytes")]
    TruncatedInput { declared: u64, received: u64 },
    #[error("malformed multipart body: {0}")]
    MalformedBody(String),
    #[error("unsupported file extension `{0}`")]
    UnsupportedFormat(String),
    #[error("upload does not decode as a JPEG image: {0}")]
    InvalidImage(::image::ImageError),
    #[error("storage failure: {0}")]
    Storage(anyhow::Error),
    #[error("no valid session token")]
    Unauthenticated,
}

/// Request envelope handed over by the hosting transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct UploadMeta<'a> {
    pub token: Option<&'a str>,
    pub content_length: Option<u64>,
    pub content_type: Option<&'a str>,
}

/// Drives one upload request through the pipeline: authenticate, drain the
/// declared body, decode the multipart framing, gate on the extension,
/// validate the image structurally, persist under a fresh name.
///
/// Stages run strictly in that order and the first failure ends the request;
/// an unauthenticated request never touches the body.
pub async fn ingest_upload<R>(
    sessions: &dyn SessionStore,
    meta: UploadMeta<'_>,
    body_source: R,
    cfg: &IngestConfig,
) -> Result<StoredPhoto, IngestError>
where
    R: AsyncRead + Unpin,
{
    let token = meta.token.ok_or(IngestError::Unauthenticated)?;
    let username = sessions
        .lookup(token)
        .await
        .map_err(IngestError::Storage)?
        .ok_or(IngestError::Unauthenticated)?;
    debug!(user = %username, "upload authenticated");

    let declared = meta.content_length.ok_or(IngestError::MissingLength)?;
    let boundary = multipart::boundary_from_content_type(meta.content_type)?;

    let buf = body::read_declared(body_source, declared)
        .await
        // A transport failure mid-body leaves the framing unusable, same as
        // an early end-of-stream.
        .map_err(|_| IngestError::TruncatedInput {
            declared,
            received: 0,
        })?;
    if (buf.len() as u64) < declared {
        return Err(IngestError::TruncatedInput {
            declared,
            received: buf.len() as u64,
        });
    }
    debug!(bytes = buf.len(), "body drained");

    let form = multipart::decode(&buf, &boundary)?;
    let upload = form.file(FILE_FIELD).ok_or_else(|| {
        IngestError::MalformedBody(format!("body carries no `{FILE_FIELD}` file part"))
    })?;

    image::check_extension(&upload.filename, &cfg.accepted_extension)?;
    image::validate(&upload.bytes)?;

    let stored = persist::persist(&upload.bytes, cfg).await?;
    info!(
        user = %username,
        original = %sanitize(&upload.filename),
        file = %stored.file_name,
        size = stored.size_bytes,
        "photo persisted"
    );
    Ok(stored)
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Cursor;

    use anyhow::Result;
    use async_trait::async_trait;

    use super::testsupport::{
        framed_upload, jpeg_bytes, multipart_content_type, test_ingest_config,
    };
    use super::*;

    struct MemoryStore(HashMap<String, String>);

    impl MemoryStore {
        fn with_session(token: &str, username: &str) -> Self {
            let mut sessions = HashMap::new();
            sessions.insert(token.to_string(), username.to_string());
            Self(sessions)
        }
    }

    #[async_trait]
    impl SessionStore for MemoryStore {
        async fn lookup(&self, token: &str) -> Result<Option<String>> {
            Ok(self.0.get(token).cloned())
        }
    }

    fn meta<'a>(token: Option<&'a str>, content_length: Option<u64>, ct: &'a str) -> UploadMeta<'a> {
        UploadMeta {
            token,
            content_length,
            content_type: Some(ct),
        }
    }

    #[tokio::test]
    async fn a_valid_upload_round_trips_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = test_ingest_config(dir.path());
        let store = MemoryStore::with_session("tok", "ada");
        let photo = jpeg_bytes(16, 16);
        let body = framed_upload("holiday.jpg", &photo);
        let ct = multipart_content_type();

        let stored = ingest_upload(
            &store,
            meta(Some("tok"), Some(body.len() as u64), &ct),
            Cursor::new(body),
            &cfg,
        )
        .await
        .expect("ingest");

        let on_disk = std::fs::read(&stored.path).expect("read back");
        assert_eq!(on_disk, photo);
    }

    #[tokio::test]
    async fn trailing_bytes_past_the_declared_length_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = test_ingest_config(dir.path());
        let store = MemoryStore::with_session("tok", "ada");
        let photo = jpeg_bytes(8, 8);
        let body = framed_upload("holiday.jpg", &photo);
        let declared = body.len() as u64;
        let ct = multipart_content_type();

        let mut padded = body;
        padded.extend_from_slice(b"keep-alive junk the framing does not own");

        ingest_upload(
            &store,
            meta(Some("tok"), Some(declared), &ct),
            Cursor::new(padded),
            &cfg,
        )
        .await
        .expect("ingest");
    }

    #[tokio::test]
    async fn a_short_body_is_classified_as_truncated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = test_ingest_config(dir.path());
        let store = MemoryStore::with_session("tok", "ada");
        let body = framed_upload("holiday.jpg", &jpeg_bytes(8, 8));
        let declared = body.len() as u64 + 50;
        let ct = multipart_content_type();

        let err = ingest_upload(
            &store,
            meta(Some("tok"), Some(declared), &ct),
            Cursor::new(body),
            &cfg,
        )
        .await
        .unwrap_err();

        match err {
            IngestError::TruncatedInput { declared: d, received } => {
                assert_eq!(d, declared);
                assert_eq!(received, declared - 50);
            }
            other => panic!("expected TruncatedInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn a_missing_length_cannot_proceed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = test_ingest_config(dir.path());
        let store = MemoryStore::with_session("tok", "ada");
        let ct = multipart_content_type();

        let err = ingest_upload(
            &store,
            meta(Some("tok"), None, &ct),
            Cursor::new(Vec::new()),
            &cfg,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::MissingLength));
    }

    #[tokio::test]
    async fn an_absent_token_never_reaches_the_decoder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = test_ingest_config(dir.path());
        let store = MemoryStore::with_session("tok", "ada");
        // Malformed on purpose: if the decoder ran, this would be MalformedBody.
        let body = b"not multipart at all".to_vec();
        let ct = multipart_content_type();

        let err = ingest_upload(
            &store,
            meta(None, Some(body.len() as u64), &ct),
            Cursor::new(body),
            &cfg,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::Unauthenticated));
    }

    #[tokio::test]
    async fn an_unknown_token_is_unauthenticated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = test_ingest_config(dir.path());
        let store = MemoryStore::with_session("tok", "ada");
        let body = framed_upload("holiday.jpg", &jpeg_bytes(8, 8));
        let declared = body.len() as u64;
        let ct = multipart_content_type();

        let err = ingest_upload(
            &store,
            meta(Some("forged"), Some(declared), &ct),
            Cursor::new(body),
            &cfg,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::Unauthenticated));
    }

    #[tokio::test]
    async fn a_disguised_payload_is_rejected_and_nothing_is_stored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let upload_dir = dir.path().join("photos");
        let cfg = test_ingest_config(&upload_dir);
        let store = MemoryStore::with_session("tok", "ada");
        let body = framed_upload("disguised.jpg", b"plain text wearing a jpg extension");
        let declared = body.len() as u64;
        let ct = multipart_content_type();

        let err = ingest_upload(
            &store,
            meta(Some("tok"), Some(declared), &ct),
            Cursor::new(body),
            &cfg,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::InvalidImage(_)));
        // Validation failed before anything touched the upload directory.
        assert!(!upload_dir.exists());
    }

    #[tokio::test]
    async fn the_extension_gate_runs_before_the_decoder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = test_ingest_config(dir.path());
        let store = MemoryStore::with_session("tok", "ada");
        // Undecodable content: if the image decoder ran first, this would be
        // InvalidImage. The foreign extension must win.
        let body = framed_upload("notes.txt", b"not an image either");
        let declared = body.len() as u64;
        let ct = multipart_content_type();

        let err = ingest_upload(
            &store,
            meta(Some("tok"), Some(declared), &ct),
            Cursor::new(body),
            &cfg,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[tokio::test]
    async fn an_empty_body_decodes_but_lacks_the_file_part() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = test_ingest_config(dir.path());
        let store = MemoryStore::with_session("tok", "ada");
        let ct = multipart_content_type();

        let err = ingest_upload(
            &store,
            meta(Some("tok"), Some(0), &ct),
            Cursor::new(Vec::new()),
            &cfg,
        )
        .await
        .unwrap_err();

        // The decoder accepts the empty body as zero fields, so the failure
        // is the missing `file` part, not a parse error.
        match err {
            IngestError::MalformedBody(reason) => assert!(reason.contains("file")),
            other => panic!("expected MalformedBody, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn a_missing_boundary_is_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = test_ingest_config(dir.path());
        let store = MemoryStore::with_session("tok", "ada");

        let err = ingest_upload(
            &store,
            UploadMeta {
                token: Some("tok"),
                content_length: Some(0),
                content_type: Some("multipart/form-data"),
            },
            Cursor::new(Vec::new()),
            &cfg,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::MalformedBody(_)));
    }
}
