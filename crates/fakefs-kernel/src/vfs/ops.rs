//! Handler capability traits.
//!
//! A virtual file is bound to at most one reader and one writer. Handlers
//! produce or consume whole content images; offsets are applied by the
//! [`Dispatcher`](super::Dispatcher), not by handlers.

use async_trait::async_trait;

use super::types::{CallContext, WriteOutcome};
use super::VfsResult;

/// Produces the content of a virtual file.
#[async_trait]
pub trait ReadHandler: Send + Sync {
    /// Produce the full content image for this read.
    async fn read(&self, ctx: CallContext<'_>) -> VfsResult<Vec<u8>>;
}

/// Consumes bytes written to a virtual file.
#[async_trait]
pub trait WriteHandler: Send + Sync {
    /// Consume `data` and report how many bytes were accepted.
    async fn write(&self, ctx: CallContext<'_>, data: &[u8]) -> VfsResult<WriteOutcome>;
}
