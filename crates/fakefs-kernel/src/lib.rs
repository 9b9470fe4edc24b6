//! # fakefs-kernel
//!
//! A synthetic filesystem: a handful of named files whose content is made
//! on demand by handler logic rather than stored anywhere.
//!
//! - [`vfs`] binds file names to handlers and routes requests to them
//! - [`files`] holds the handlers: generators, the `rot13` transform buffer,
//!   the `honeypot` decoy and the `sat.jpg` fetch cache
//! - [`audit`] is the append-only side-channel log
//! - [`fetch`] abstracts pulling bytes from the network
//! - [`FakeFs`] owns all shared state and wires it together
//!
//! Transports (how requests reach [`Dispatcher`]) live outside this crate.

pub mod audit;
pub mod clock;
pub mod config;
pub mod fetch;
pub mod files;
pub mod service;
pub mod vfs;

pub use audit::{AuditLog, AuditSink, FileSink, MemorySink};
pub use clock::{Clock, ManualClock, RandomSource, SystemClock, ThreadRandom};
pub use config::{ConfigError, FakefsConfig};
pub use fetch::{FetchClient, FetchError, WebfsClient};
pub use service::{FakeFs, FakeFsBuilder, StartupError};
pub use vfs::{
    CallContext, DirEntry, Dispatcher, FileAttr, FileRegistry, FileTree, FileType, Node,
    Operation, ReadHandler, Request, Response, VfsError, VfsResult, VirtualFile, WriteHandler,
    WriteOutcome,
};
