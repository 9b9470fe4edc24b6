//! `honeypot`: a decoy that records who touched it.
//!
//! Reads return bait; writes are swallowed whole and answered with a scary
//! error. Every access leaves exactly one audit line.

use async_trait::async_trait;
use std::sync::Arc;

use crate::audit::AuditLog;
use crate::vfs::{CallContext, ReadHandler, VfsResult, WriteHandler, WriteOutcome};

/// What a read of the honeypot returns.
pub const DECOY: &str = "Juicy corporate secrets\n";

/// Error message returned to every writer.
pub const WRITE_WARNING: &str = "Authorities Have Been Notified";

/// The decoy file.
#[derive(Debug)]
pub struct Honeypot {
    audit: Arc<AuditLog>,
}

impl Honeypot {
    pub fn new(audit: Arc<AuditLog>) -> Self {
        Self { audit }
    }
}

#[async_trait]
impl ReadHandler for Honeypot {
    async fn read(&self, ctx: CallContext<'_>) -> VfsResult<Vec<u8>> {
        self.audit.record_access(ctx.caller, "read the honeypot");
        tracing::info!(caller = ctx.caller, "honeypot read");
        Ok(DECOY.as_bytes().to_vec())
    }
}

#[async_trait]
impl WriteHandler for Honeypot {
    async fn write(&self, ctx: CallContext<'_>, data: &[u8]) -> VfsResult<WriteOutcome> {
        self.audit.record_access(ctx.caller, "write the honeypot");
        tracing::info!(caller = ctx.caller, bytes = data.len(), "honeypot write");
        Ok(WriteOutcome::whole(data.len())?.with_message(WRITE_WARNING))
    }
}
