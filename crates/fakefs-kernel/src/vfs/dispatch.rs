//! Request routing.
//!
//! The dispatcher resolves a request's target in the registry, picks the
//! reader or writer for the operation, and folds the handler's result into a
//! [`Response`]. It holds no state of its own and never retries.

use std::sync::Arc;

use super::error::{VfsError, VfsResult};
use super::registry::FileRegistry;
use super::types::{CallContext, Operation, Request, Response};

/// Routes requests to the handlers bound in a [`FileRegistry`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<FileRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a built registry.
    pub fn new(registry: Arc<FileRegistry>) -> Self {
        Self { registry }
    }

    /// The registry requests are routed through.
    pub fn registry(&self) -> &Arc<FileRegistry> {
        &self.registry
    }

    /// Handle one request and produce its response.
    #[tracing::instrument(
        skip(self, request),
        name = "fakefs.dispatch",
        fields(file = %request.target, op = request.op.name(), caller = %request.caller)
    )]
    pub async fn dispatch(&self, request: Request) -> Response {
        match self.route(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "request failed");
                Response::error(e.to_string())
            }
        }
    }

    async fn route(&self, request: &Request) -> VfsResult<Response> {
        let file = self.registry.lookup(&request.target)?;
        let ctx = CallContext {
            file: file.name(),
            caller: &request.caller,
        };

        match &request.op {
            Operation::Read { count } => {
                let reader = file
                    .reader()
                    .ok_or_else(|| VfsError::unsupported(file.name(), "read"))?;
                let content = reader.read(ctx).await?;
                Ok(Response::Data(window(&content, request.offset, *count)))
            }
            Operation::Write { data } => {
                let writer = file
                    .writer()
                    .ok_or_else(|| VfsError::unsupported(file.name(), "write"))?;
                let outcome = writer.write(ctx, data).await?;
                Ok(match outcome.message {
                    Some(message) => Response::Error {
                        message,
                        count: Some(outcome.accepted),
                    },
                    None => Response::Written(outcome.accepted),
                })
            }
        }
    }
}

/// Slice `count` bytes at `offset` out of a content image.
fn window(content: &[u8], offset: u64, count: u32) -> Vec<u8> {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(content.len());
    let end = start.saturating_add(count as usize).min(content.len());
    content[start..end].to_vec()
}
