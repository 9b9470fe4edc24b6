//! Core VFS types.
//!
//! Requests and responses are plain values so any transport can carry them.
//! Attributes are synthetic: virtual files have no backing storage, so sizes
//! are reported as zero and content length is only known once a handler runs.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use super::error::{VfsError, VfsResult};

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular (virtual) file.
    File,
    /// Directory.
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// File attributes (metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttr {
    /// Size in bytes (always 0 for virtual files).
    pub size: u64,
    /// File type.
    pub kind: FileType,
    /// Unix permissions (e.g., 0o444).
    pub perm: u32,
    /// Time the tree was built.
    pub mtime: SystemTime,
    /// Owner name.
    pub owner: String,
}

impl FileAttr {
    /// Attributes for a virtual file.
    pub fn file(perm: u32, owner: impl Into<String>, mtime: SystemTime) -> Self {
        Self {
            size: 0,
            kind: FileType::File,
            perm,
            mtime,
            owner: owner.into(),
        }
    }

    /// Attributes for a directory.
    pub fn directory(perm: u32, owner: impl Into<String>, mtime: SystemTime) -> Self {
        Self {
            size: 0,
            kind: FileType::Directory,
            perm,
            mtime,
            owner: owner.into(),
        }
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: FileType,
    /// Unix permissions.
    pub perm: u32,
}

impl DirEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<String>, perm: u32) -> Self {
        Self {
            name: name.into(),
            kind: FileType::File,
            perm,
        }
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>, perm: u32) -> Self {
        Self {
            name: name.into(),
            kind: FileType::Directory,
            perm,
        }
    }
}

/// What a request asks of its target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Read up to `count` bytes.
    Read { count: u32 },
    /// Write `data`.
    Write { data: Vec<u8> },
}

impl Operation {
    /// Short name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Read { .. } => "read",
            Operation::Write { .. } => "write",
        }
    }
}

/// One client operation against a virtual file.
#[derive(Debug, Clone)]
pub struct Request {
    /// Name of the target file.
    pub target: String,
    /// Identity of the client making the request.
    pub caller: String,
    /// Byte offset into the file.
    pub offset: u64,
    /// Read or write.
    pub op: Operation,
}

impl Request {
    /// Build a read request.
    pub fn read(target: impl Into<String>, caller: impl Into<String>, offset: u64, count: u32) -> Self {
        Self {
            target: target.into(),
            caller: caller.into(),
            offset,
            op: Operation::Read { count },
        }
    }

    /// Build a write request at offset 0.
    pub fn write(target: impl Into<String>, caller: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            target: target.into(),
            caller: caller.into(),
            offset: 0,
            op: Operation::Write { data: data.into() },
        }
    }
}

/// Per-request information handed to handlers.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    /// Name of the file being accessed.
    pub file: &'a str,
    /// Identity of the client.
    pub caller: &'a str,
}

/// Result of a write handler.
///
/// `accepted` is the byte count reported back to the client. A handler may
/// also attach an error message; the count still stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub accepted: u32,
    pub message: Option<String>,
}

impl WriteOutcome {
    /// A plain successful write.
    pub fn accepted(count: u32) -> Self {
        Self {
            accepted: count,
            message: None,
        }
    }

    /// Accept a whole write of `len` bytes.
    ///
    /// Counts travel as `u32`; a longer write is refused rather than
    /// reported with a wrapped count.
    pub fn whole(len: usize) -> VfsResult<Self> {
        u32::try_from(len)
            .map(Self::accepted)
            .map_err(|_| VfsError::other(format!("write of {len} bytes is too large")))
    }

    /// Attach an error message to the outcome.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Transport-facing response to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Bytes produced by a read.
    Data(Vec<u8>),
    /// Byte count accepted by a write.
    Written(u32),
    /// Error message, with the accepted count when a write handler both
    /// accepted the bytes and reported an error.
    Error { message: String, count: Option<u32> },
}

impl Response {
    /// Plain error response.
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
            count: None,
        }
    }

    /// Returns true for an error response.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}
