use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// The single accepted image format family is JPEG; every stored photo
/// carries this extension regardless of the client-declared filename.
pub const ACCEPTED_EXTENSION: &str = "jpg";

/// Fresh names drawn before a collision becomes a storage error.
pub const PUBLISH_RETRIES: u32 = 3;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_FILE: &str = "data/sessions.jsonl";
const DEFAULT_UPLOAD_DIR: &str = "data/photos";
const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

/// Runtime configuration, read from the environment once at startup.
/// Components receive what they need explicitly; nothing reads the
/// environment after this.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub session_file: PathBuf,
    pub upload_dir: PathBuf,
    /// Deployment-level body size bound, enforced by the web layer before
    /// the pipeline runs.
    pub max_body_bytes: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {raw}"))?,
            Err(_) => DEFAULT_PORT,
        };
        let session_file = env::var("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_FILE));
        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR));
        let max_body_bytes = match env::var("MAX_BODY_BYTES") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("MAX_BODY_BYTES is not a valid byte count: {raw}"))?,
            Err(_) => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            port,
            session_file,
            upload_dir,
            max_body_bytes,
        })
    }

    pub fn ingest(&self) -> IngestConfig {
        IngestConfig {
            upload_dir: self.upload_dir.clone(),
            accepted_extension: ACCEPTED_EXTENSION.to_string(),
            publish_retries: PUBLISH_RETRIES,
        }
    }
}

/// Settings the upload pipeline needs, passed in at construction.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub upload_dir: PathBuf,
    pub accepted_extension: String,
    pub publish_retries: u32,
}
