//! Remote fetch clients.
//!
//! [`FetchClient`] is the narrow seam between the cache and the network:
//! "give me the bytes behind this URL". [`WebfsClient`] speaks the webfs
//! clone/ctl/body control protocol; tests substitute scripted clients.

mod webfs;

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use thiserror::Error;

pub use webfs::{WebfsClient, DEFAULT_WEBFS_ROOT};

/// Fetch failures.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The control surface is not there at all.
    #[error("run webfs first")]
    Unavailable,

    /// Opening or reading the clone file failed.
    #[error("clone read failed: {0}")]
    CloneRead(#[source] io::Error),

    /// The clone file did not yield a session number.
    #[error("bad session handle: {0:?}")]
    Session(String),

    /// The session's control file is missing or rejected the URL.
    #[error("can't find ctl: {0}")]
    Control(#[source] io::Error),

    /// Reading the body failed part way.
    #[error("body read failed: {0}")]
    Body(#[source] io::Error),

    /// The whole session took too long.
    #[error("fetch timed out after {0:?}")]
    TimedOut(Duration),
}

/// Fetches the bytes behind a URL.
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// Cheap reachability check; must not block on the network.
    async fn is_available(&self) -> bool;

    /// Fetch `url`, keeping at most `limit` bytes of the body.
    async fn fetch(&self, url: &str, limit: usize) -> Result<Vec<u8>, FetchError>;
}
