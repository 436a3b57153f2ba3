use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One line of the append-only session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub username: String,
}

/// Resolves opaque session tokens to usernames.
///
/// Tokens are issued by an external registration flow; this crate only reads
/// them. The trait keeps the pipeline independent of the backing store so the
/// flat file can later be swapped for an indexed store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn lookup(&self, token: &str) -> Result<Option<String>>;
}

/// Append-only, newline-delimited JSON file of session records.
///
/// Readers take no lock: the file only ever grows, and a partially written
/// trailing line fails to parse and is skipped like any other bad line.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn lookup(&self, token: &str) -> Result<Option<String>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            // No file yet means no sessions have been issued.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read session store at {}", self.path.display())
                });
            }
        };

        // The log is append-only, so the last parseable record for a token is
        // the newest fact about it.
        let mut username = None;
        for line in contents.lines() {
            let Ok(record) = serde_json::from_str::<SessionRecord>(line) else {
                continue;
            };
            if record.token == token {
                username = Some(record.username);
            }
        }

        Ok(username)
    }
}
