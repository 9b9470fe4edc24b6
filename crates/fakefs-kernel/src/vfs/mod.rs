//! Virtual filesystem core.
//!
//! Key components:
//!
//! - [`ReadHandler`] / [`WriteHandler`] - capability traits a file binds to
//! - [`FileRegistry`] - ordered, immutable table of virtual files
//! - [`Dispatcher`] - routes a [`Request`] to its file's handler
//! - [`FileTree`] - resolves mounted paths and lists the served directories
//!
//! ## Design Decisions
//!
//! - **Handlers own their state**: each stateful file carries its own lock,
//!   so the dispatcher stays a stateless router.
//! - **Whole-image handlers**: handlers produce the full content; the
//!   dispatcher applies offset and count.
//! - **Errors are responses**: a handler error turns into an error response,
//!   never a panic or a dropped request.

mod dispatch;
mod error;
mod ops;
mod registry;
mod tree;
mod types;

pub use dispatch::Dispatcher;
pub use error::{VfsError, VfsResult};
pub use ops::{ReadHandler, WriteHandler};
pub use registry::{FileRegistry, RegistryBuilder, VirtualFile, MODE_READ_ONLY, MODE_READ_WRITE};
pub use tree::{FileTree, Node, DIR_MODE};
pub use types::{CallContext, DirEntry, FileAttr, FileType, Operation, Request, Response, WriteOutcome};
