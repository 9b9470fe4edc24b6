//! webfs control-protocol client.
//!
//! A fetch is one session:
//!
//! 1. read `<root>/clone` to obtain a session number `N`
//! 2. write `url <target>` to `<root>/N/ctl`
//! 3. read `<root>/N/body` until end of data
//!
//! The clone file stays open for the whole session; webfs tears the session
//! down when it is closed.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{FetchClient, FetchError};

/// Where webfs is normally mounted.
pub const DEFAULT_WEBFS_ROOT: &str = "/mnt/web";

/// Body read chunk size.
const CHUNK_SIZE: usize = 1024;

/// Fetches through a mounted webfs.
#[derive(Debug, Clone)]
pub struct WebfsClient {
    root: PathBuf,
}

impl Default for WebfsClient {
    fn default() -> Self {
        Self::new(DEFAULT_WEBFS_ROOT)
    }
}

impl WebfsClient {
    /// Client for a webfs mounted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The webfs mount point.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn clone_path(&self) -> PathBuf {
        self.root.join("clone")
    }

    async fn open_session(&self) -> Result<(File, PathBuf), FetchError> {
        let mut clone = File::open(self.clone_path()).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                FetchError::Unavailable
            } else {
                FetchError::CloneRead(e)
            }
        })?;

        let mut buf = [0u8; 32];
        let n = clone.read(&mut buf).await.map_err(FetchError::CloneRead)?;
        let text = String::from_utf8_lossy(&buf[..n]);
        let session: u32 = text
            .trim()
            .parse()
            .map_err(|_| FetchError::Session(text.trim().to_string()))?;

        Ok((clone, self.root.join(session.to_string())))
    }
}

#[async_trait]
impl FetchClient for WebfsClient {
    /// Checks that `clone` exists without opening it; an open would
    /// allocate a webfs session.
    async fn is_available(&self) -> bool {
        tokio::fs::try_exists(self.clone_path()).await.unwrap_or(false)
    }

    async fn fetch(&self, url: &str, limit: usize) -> Result<Vec<u8>, FetchError> {
        let (clone, session_dir) = self.open_session().await?;
        tracing::debug!(session = %session_dir.display(), url, "webfs session opened");

        let mut ctl = OpenOptions::new()
            .write(true)
            .open(session_dir.join("ctl"))
            .await
            .map_err(FetchError::Control)?;
        ctl.write_all(format!("url {}", url).as_bytes())
            .await
            .map_err(FetchError::Control)?;
        ctl.flush().await.map_err(FetchError::Control)?;

        let mut body = File::open(session_dir.join("body"))
            .await
            .map_err(FetchError::Body)?;

        let mut payload = Vec::new();
        let mut chunk = vec![0u8; CHUNK_SIZE];
        while payload.len() < limit {
            let n = body.read(&mut chunk).await.map_err(FetchError::Body)?;
            if n == 0 {
                break;
            }
            let room = limit - payload.len();
            payload.extend_from_slice(&chunk[..n.min(room)]);
        }

        drop(clone);
        Ok(payload)
    }
}
