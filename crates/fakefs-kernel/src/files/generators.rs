//! Stateless content generators: `tyme`, `backtalk` and `i-ching`.
//!
//! Output is rendered into a fixed-size scratch area and silently cut to fit.

use async_trait::async_trait;
use std::fmt::Write;
use std::sync::Arc;

use crate::clock::{Clock, RandomSource};
use crate::vfs::{CallContext, ReadHandler, VfsResult};

/// Size of the scratch area generators render into, terminator included.
pub const SCRATCH_SIZE: usize = 128;

/// Glyph for a yang (odd) line.
pub const ODD_LINE: &str = "_________";

/// Glyph for a yin (even) line.
pub const EVEN_LINE: &str = "___   ___";

/// Lines in a hexagram.
pub const HEXAGRAM_LINES: usize = 6;

/// Cut rendered output to what the scratch area holds.
fn bounded(rendered: String) -> Vec<u8> {
    let mut bytes = rendered.into_bytes();
    bytes.truncate(SCRATCH_SIZE - 1);
    bytes
}

/// `tyme`: a message carrying the current Unix time.
pub struct TimeMessage {
    clock: Arc<dyn Clock>,
}

impl TimeMessage {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl ReadHandler for TimeMessage {
    async fn read(&self, _ctx: CallContext<'_>) -> VfsResult<Vec<u8>> {
        Ok(bounded(format!(
            "And it came to pass, in \n{} seconds of\nthe reign of Unix...\n",
            self.clock.unix_secs()
        )))
    }
}

/// `backtalk`: a refusal addressed to the caller.
#[derive(Debug, Default)]
pub struct Backtalk;

#[async_trait]
impl ReadHandler for Backtalk {
    async fn read(&self, ctx: CallContext<'_>) -> VfsResult<Vec<u8>> {
        Ok(bounded(format!(
            "I'm sorry {}, I'm afraid I can't do that.\n",
            ctx.caller
        )))
    }
}

/// `i-ching`: six fresh line casts, one per read.
pub struct Hexagram {
    random: Arc<dyn RandomSource>,
}

impl Hexagram {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }
}

/// Cast six lines. Each value is 6..=9; odd values get [`ODD_LINE`].
pub fn cast_hexagram(random: &dyn RandomSource) -> String {
    let mut out = String::new();
    for _ in 0..HEXAGRAM_LINES {
        let value = 6 + random.draw(4);
        let glyph = if value % 2 == 1 { ODD_LINE } else { EVEN_LINE };
        let _ = writeln!(out, "{} {}", glyph, value);
    }
    out
}

#[async_trait]
impl ReadHandler for Hexagram {
    async fn read(&self, _ctx: CallContext<'_>) -> VfsResult<Vec<u8>> {
        Ok(bounded(cast_hexagram(self.random.as_ref())))
    }
}
