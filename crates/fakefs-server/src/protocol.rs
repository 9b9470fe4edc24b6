//! Serde types for the fakefs socket protocol.
//!
//! A client connects, sends one [`WireRequest`] as a JSON line, receives one
//! [`WireResponse`] line, and disconnects. File content travels as base64 so
//! binary files (`sat.jpg`) survive the JSON encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use fakefs_kernel::{DirEntry, FileAttr, Response};

fn default_count() -> u32 {
    u32::MAX
}

/// One request line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum WireRequest {
    /// Read `count` bytes at `offset` from the file at `path`.
    Read {
        path: String,
        #[serde(default)]
        offset: u64,
        #[serde(default = "default_count")]
        count: u32,
        /// Caller identity; the service owner when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<String>,
    },
    /// Write base64 `data` to the file at `path`.
    Write {
        path: String,
        #[serde(default)]
        offset: u64,
        data: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<String>,
    },
    /// List a directory.
    List { path: String },
    /// Attributes of any node.
    Stat { path: String },
}

impl WireRequest {
    pub fn read(path: impl Into<String>, offset: u64, count: u32) -> Self {
        Self::Read {
            path: path.into(),
            offset,
            count,
            user: None,
        }
    }

    pub fn write(path: impl Into<String>, data: &[u8]) -> Self {
        Self::Write {
            path: path.into(),
            offset: 0,
            data: STANDARD.encode(data),
            user: None,
        }
    }

    /// Attach a caller identity to reads and writes.
    pub fn as_user(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            Self::Read { user, .. } | Self::Write { user, .. } => *user = Some(name.into()),
            Self::List { .. } | Self::Stat { .. } => {}
        }
        self
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::List { path }
            | Self::Stat { path } => path,
        }
    }
}

/// One response line.
///
/// Untagged: the variant is recognised by its keys. `Error` comes first
/// because it may also carry `count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireResponse {
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
    },
    Data {
        data: String,
    },
    Entries {
        entries: Vec<DirEntry>,
    },
    Attr {
        attr: FileAttr,
    },
    Written {
        count: u32,
    },
}

impl WireResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
            count: None,
        }
    }

    pub fn data(bytes: &[u8]) -> Self {
        Self::Data {
            data: STANDARD.encode(bytes),
        }
    }

    /// Decoded payload of a `Data` response.
    pub fn decode_data(&self) -> Option<Vec<u8>> {
        match self {
            Self::Data { data } => STANDARD.decode(data).ok(),
            _ => None,
        }
    }
}

impl From<Response> for WireResponse {
    fn from(response: Response) -> Self {
        match response {
            Response::Data(bytes) => Self::data(&bytes),
            Response::Written(count) => Self::Written { count },
            Response::Error { message, count } => Self::Error {
                error: message,
                count,
            },
        }
    }
}

/// Decode a request's base64 payload.
pub fn decode_payload(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(data)
}
