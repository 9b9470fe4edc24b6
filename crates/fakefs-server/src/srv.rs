//! Unix socket front end for a [`FakeFs`].
//!
//! The service is posted as a socket named after `srv_name`. Each connection
//! carries one request line and gets one response line back; connections
//! are handled on their own tasks, so a slow `sat.jpg` fetch never holds up
//! a `tyme` read.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::signal::unix::{SignalKind, signal};

use fakefs_kernel::{FakeFs, Request};

use crate::protocol::{WireRequest, WireResponse, decode_payload};

/// Directory under `$XDG_RUNTIME_DIR` holding service sockets.
pub const SOCKET_DIR: &str = "fakefs";

/// Longest request line accepted, newline included.
pub const MAX_REQUEST_LINE: usize = 1024 * 1024;

/// Socket path for a service name.
///
/// Returns `None` if `$XDG_RUNTIME_DIR` is not set; there is no `/tmp`
/// fallback.
pub fn default_socket_path(srv_name: &str) -> Option<PathBuf> {
    let runtime_dir = dirs::runtime_dir()?;
    Some(runtime_dir.join(SOCKET_DIR).join(format!("{srv_name}.sock")))
}

/// Resolves on Ctrl-C or SIGTERM with the name of the signal.
///
/// The SIGTERM handler is installed before this returns.
pub fn shutdown_signal() -> io::Result<impl Future<Output = &'static str>> {
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::warn!("ctrl-c handler failed: {e}");
                }
                "interrupt"
            }
            _ = terminate.recv() => "terminate",
        }
    })
}

/// Post `fs` at `socket_path` and serve until `shutdown` resolves.
///
/// Writes the start and stop audit lines and removes the socket on the way
/// out.
pub async fn run_until<F>(fs: Arc<FakeFs>, socket_path: &Path, shutdown: F) -> anyhow::Result<()>
where
    F: Future,
{
    let listener = SrvListener::bind(socket_path).await?;
    fs.start();

    let srv = Arc::new(SrvListener::new(fs.clone()));
    tokio::select! {
        _ = srv.serve(listener) => {}
        _ = shutdown => {}
    }

    fs.stop();
    if let Err(e) = tokio::fs::remove_file(socket_path).await {
        tracing::debug!("socket cleanup: {e}");
    }
    Ok(())
}

/// Serves one [`FakeFs`] over a Unix socket.
pub struct SrvListener {
    fs: Arc<FakeFs>,
    max_request: usize,
}

impl SrvListener {
    pub fn new(fs: Arc<FakeFs>) -> Self {
        Self {
            fs,
            max_request: MAX_REQUEST_LINE,
        }
    }

    /// Override the request line limit.
    pub fn with_max_request(mut self, bytes: usize) -> Self {
        self.max_request = bytes;
        self
    }

    /// Bind the socket, replacing a stale one left by an earlier run.
    pub async fn bind(socket_path: &Path) -> anyhow::Result<UnixListener> {
        if let Some(parent) = socket_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if socket_path.exists() {
            tokio::fs::remove_file(socket_path).await?;
        }

        let listener = UnixListener::bind(socket_path)?;
        tracing::info!(path = %socket_path.display(), "fakefs socket listening");
        Ok(listener)
    }

    /// Accept connections until the task is cancelled. Spawns a task per
    /// connection.
    pub async fn serve(self: Arc<Self>, listener: UnixListener) {
        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let this = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = this.handle_connection(stream).await {
                            tracing::debug!("connection error: {e}");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!("accept error: {e}");
                }
            }
        }
    }

    /// Read one JSON line, answer it, close.
    async fn handle_connection(&self, stream: UnixStream) -> anyhow::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let limit = self.max_request as u64 + 1;
        let mut buf_reader = BufReader::new(reader.take(limit));
        let mut line = Vec::new();

        buf_reader.read_until(b'\n', &mut line).await?;

        let response = if line.len() > self.max_request {
            tracing::warn!(limit = self.max_request, "request line too long");
            WireResponse::error(format!(
                "request too large: limit is {} bytes",
                self.max_request
            ))
        } else if line.trim_ascii().is_empty() {
            return Ok(());
        } else {
            match serde_json::from_slice::<WireRequest>(line.trim_ascii()) {
                Ok(request) => self.handle(request).await,
                Err(e) => WireResponse::error(format!("invalid request: {e}")),
            }
        };

        let json = serde_json::to_string(&response)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.shutdown().await?;

        Ok(())
    }

    /// Answer one request. Paths are absolute paths under the mount point.
    pub async fn handle(&self, request: WireRequest) -> WireResponse {
        let tree = self.fs.tree();

        match request {
            WireRequest::Read {
                path,
                offset,
                count,
                user,
            } => {
                let name = match tree.resolve_file(Path::new(&path)) {
                    Ok(name) => name,
                    Err(e) => return WireResponse::error(e.to_string()),
                };
                let caller = user.unwrap_or_else(|| self.fs.owner().to_string());
                self.fs
                    .dispatch(Request::read(name, caller, offset, count))
                    .await
                    .into()
            }

            // Write offsets are accepted on the wire but not honoured.
            WireRequest::Write {
                path, data, user, ..
            } => {
                let name = match tree.resolve_file(Path::new(&path)) {
                    Ok(name) => name,
                    Err(e) => return WireResponse::error(e.to_string()),
                };
                let bytes = match decode_payload(&data) {
                    Ok(bytes) => bytes,
                    Err(e) => return WireResponse::error(format!("bad data: {e}")),
                };
                let caller = user.unwrap_or_else(|| self.fs.owner().to_string());
                self.fs
                    .dispatch(Request::write(name, caller, bytes))
                    .await
                    .into()
            }

            WireRequest::List { path } => match tree.readdir(Path::new(&path)) {
                Ok(entries) => WireResponse::Entries { entries },
                Err(e) => WireResponse::error(e.to_string()),
            },

            WireRequest::Stat { path } => match tree.getattr(Path::new(&path)) {
                Ok(attr) => WireResponse::Attr { attr },
                Err(e) => WireResponse::error(e.to_string()),
            },
        }
    }
}

/// Connect to a service socket, send one request and return the response.
///
/// This is the client side, used by the `read`, `write` and `ls`
/// subcommands.
pub async fn send_request(
    socket_path: &Path,
    request: &WireRequest,
) -> anyhow::Result<WireResponse> {
    let stream = UnixStream::connect(socket_path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot reach {}: {e}", socket_path.display()))?;
    let (reader, mut writer) = stream.into_split();

    let json = serde_json::to_string(request)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.shutdown().await?;

    let mut buf_reader = BufReader::new(reader);
    let mut response = String::new();
    buf_reader.read_line(&mut response).await?;

    Ok(serde_json::from_str(response.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fakefs_kernel::{FakefsConfig, FileType, MemorySink};

    fn listener() -> SrvListener {
        let fs = FakeFs::builder(FakefsConfig::default())
            .owner("glenda")
            .audit_sink(Arc::new(MemorySink::new()))
            .build()
            .unwrap();
        SrvListener::new(Arc::new(fs))
    }

    #[test]
    fn test_default_socket_path_names_service() {
        if let Some(path) = default_socket_path("decoy") {
            assert!(path.ends_with("fakefs/decoy.sock"));
        }
    }

    #[tokio::test]
    async fn test_read_defaults_caller_to_owner() {
        let srv = listener();
        let resp = srv.handle(WireRequest::read("/n/fake/backtalk", 0, 256)).await;
        assert_eq!(
            resp.decode_data().unwrap(),
            b"I'm sorry glenda, I'm afraid I can't do that.\n"
        );
    }

    #[tokio::test]
    async fn test_read_as_user() {
        let srv = listener();
        let req = WireRequest::read("/n/fake/backtalk", 0, 256).as_user("dave");
        let resp = srv.handle(req).await;
        assert_eq!(
            resp.decode_data().unwrap(),
            b"I'm sorry dave, I'm afraid I can't do that.\n"
        );
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let srv = listener();
        let resp = srv.handle(WireRequest::read("/n/fake/passwd", 0, 256)).await;
        assert!(matches!(resp, WireResponse::Error { .. }));

        let resp = srv.handle(WireRequest::read("/etc/passwd", 0, 256)).await;
        assert!(matches!(resp, WireResponse::Error { .. }));
    }

    #[tokio::test]
    async fn test_bad_base64() {
        let srv = listener();
        let req = WireRequest::Write {
            path: "/n/fake/rot13".into(),
            offset: 0,
            data: "not base64!".into(),
            user: None,
        };
        match srv.handle(req).await {
            WireResponse::Error { error, .. } => assert!(error.starts_with("bad data")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_and_stat() {
        let srv = listener();

        match srv.handle(WireRequest::List { path: "/n".into() }).await {
            WireResponse::Entries { entries } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].name, "fake");
            }
            other => panic!("expected entries, got {other:?}"),
        }

        match srv
            .handle(WireRequest::Stat {
                path: "/n/fake/rot13".into(),
            })
            .await
        {
            WireResponse::Attr { attr } => {
                assert_eq!(attr.kind, FileType::File);
                assert_eq!(attr.perm, 0o666);
                assert_eq!(attr.owner, "glenda");
            }
            other => panic!("expected attr, got {other:?}"),
        }
    }
}
