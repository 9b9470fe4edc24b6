//! # fakefs-server
//!
//! Posts a [`fakefs_kernel::FakeFs`] as a local Unix socket and provides the
//! matching client calls.

pub mod protocol;
pub mod srv;

pub use protocol::{WireRequest, WireResponse};
pub use srv::{
    MAX_REQUEST_LINE, SrvListener, default_socket_path, run_until, send_request, shutdown_signal,
};
