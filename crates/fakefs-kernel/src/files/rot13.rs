//! `rot13`: a shared transform buffer.
//!
//! Any client's write replaces the buffer with the ROT13 of its input; any
//! client's read returns whatever the last write left there. One lock guards
//! the buffer, held for the whole of each handler call, so a reader never
//! sees a half-transformed buffer.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::vfs::{CallContext, ReadHandler, VfsResult, WriteHandler, WriteOutcome};

/// Default buffer capacity: 10 KiB.
pub const DEFAULT_CAPACITY: usize = 10 * 1024;

/// Apply ROT13 in place. Only ASCII letters change.
pub fn rot13_in_place(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        *b = match *b {
            b'A'..=b'M' | b'a'..=b'm' => *b + 13,
            b'N'..=b'Z' | b'n'..=b'z' => *b - 13,
            other => other,
        };
    }
}

#[derive(Debug)]
struct BufferState {
    bytes: Vec<u8>,
    len: usize,
}

/// Fixed-capacity shared buffer behind the `rot13` file.
///
/// At most `capacity - 1` bytes are stored; the last byte stays free so the
/// content always reads as a terminated string.
#[derive(Debug)]
pub struct TransformBuffer {
    state: Mutex<BufferState>,
}

impl Default for TransformBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TransformBuffer {
    /// Create an empty buffer. `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(BufferState {
                bytes: vec![0; capacity.max(1)],
                len: 0,
            }),
        }
    }

    /// Total capacity, terminator included.
    pub fn capacity(&self) -> usize {
        self.state.lock().bytes.len()
    }

    /// Replace the content with the transform of `input`.
    ///
    /// Input beyond `capacity - 1` bytes is dropped. Returns the number of
    /// bytes stored.
    pub fn replace(&self, input: &[u8]) -> usize {
        let mut state = self.state.lock();
        let limit = state.bytes.len() - 1;
        let n = input.len().min(limit);

        state.bytes.fill(0);
        state.bytes[..n].copy_from_slice(&input[..n]);
        rot13_in_place(&mut state.bytes[..n]);
        state.len = n;
        n
    }

    /// Current content, up to the first NUL.
    pub fn contents(&self) -> Vec<u8> {
        let state = self.state.lock();
        let valid = &state.bytes[..state.len];
        let end = valid.iter().position(|&b| b == 0).unwrap_or(valid.len());
        valid[..end].to_vec()
    }
}

#[async_trait]
impl ReadHandler for TransformBuffer {
    async fn read(&self, _ctx: CallContext<'_>) -> VfsResult<Vec<u8>> {
        Ok(self.contents())
    }
}

#[async_trait]
impl WriteHandler for TransformBuffer {
    async fn write(&self, ctx: CallContext<'_>, data: &[u8]) -> VfsResult<WriteOutcome> {
        let outcome = WriteOutcome::whole(data.len())?;
        let stored = self.replace(data);
        if stored < data.len() {
            tracing::debug!(
                file = ctx.file,
                requested = data.len(),
                stored,
                "transform input truncated"
            );
        }
        // The full request is reported accepted even when truncated.
        Ok(outcome)
    }
}
