//! fakefs server binary.
//!
//! Usage:
//!   # Serve with defaults (socket at $XDG_RUNTIME_DIR/fakefs/fakefs.sock)
//!   cargo run -p fakefs-server
//!
//!   # Another service name and mount point, settings from a RON file
//!   cargo run -p fakefs-server -- -s decoy -m /mnt/decoy -c fakefs.ron
//!
//!   # Stop with Ctrl-C or SIGTERM; both write the stop line.
//!
//!   # Talk to a running service
//!   cargo run -p fakefs-server -- ls
//!   cargo run -p fakefs-server -- read /n/fake/tyme
//!   cargo run -p fakefs-server -- write /n/fake/rot13 'Hello, World!'

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use fakefs_kernel::{FakeFs, FakefsConfig, FetchClient, WebfsClient};
use fakefs_server::{
    WireRequest, WireResponse, default_socket_path, run_until, send_request, shutdown_signal,
};

/// Synthetic file server.
#[derive(Parser, Debug)]
#[command(name = "fakefs")]
#[command(about = "Serve a directory of synthetic files")]
struct Args {
    /// Name the service is posted under
    #[arg(short = 's', long = "srv")]
    srv: Option<String>,

    /// Mount point of the tree
    #[arg(short = 'm', long = "mount")]
    mount: Option<PathBuf>,

    /// RON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Socket path, overriding the runtime-dir default
    #[arg(long)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a file from a running service
    Read {
        path: String,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long)]
        count: Option<u32>,
    },
    /// Write text to a file on a running service
    Write { path: String, text: String },
    /// List a directory on a running service
    Ls {
        /// Defaults to the file directory
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries file content for the client commands.
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => FakefsConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => FakefsConfig::default(),
    };
    if let Some(srv) = args.srv {
        config.srv_name = srv;
    }
    if let Some(mount) = args.mount {
        config.mountpoint = mount;
    }

    let socket_path = match args.socket {
        Some(path) => path,
        None => default_socket_path(&config.srv_name)
            .context("XDG_RUNTIME_DIR is not set; pass --socket")?,
    };

    match args.command {
        None => serve(config, socket_path).await,
        Some(command) => client(command, &config, &socket_path).await,
    }
}

async fn serve(config: FakefsConfig, socket_path: PathBuf) -> Result<ExitCode> {
    if !WebfsClient::new(&config.webfs_root).is_available().await {
        tracing::warn!(root = %config.webfs_root.display(), "no webfs, sat.jpg will fail");
    }

    let fs = match FakeFs::builder(config).build() {
        Ok(fs) => Arc::new(fs),
        Err(e) => {
            tracing::error!("startup failed: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    tracing::info!(
        dir = %fs.tree().mountpoint().join(&fs.config().dir_name).display(),
        socket = %socket_path.display(),
        "fakefs starting"
    );

    let shutdown = shutdown_signal()?;
    run_until(fs, &socket_path, async {
        let name = shutdown.await;
        tracing::info!(signal = name, "shutdown requested");
    })
    .await?;

    tracing::info!("fakefs shutting down");
    Ok(ExitCode::SUCCESS)
}

async fn client(command: Command, config: &FakefsConfig, socket_path: &Path) -> Result<ExitCode> {
    let user = whoami::username();
    let request = match command {
        Command::Read {
            path,
            offset,
            count,
        } => WireRequest::read(path, offset, count.unwrap_or(u32::MAX)).as_user(user),
        Command::Write { path, text } => WireRequest::write(path, text.as_bytes()).as_user(user),
        Command::Ls { path } => WireRequest::List {
            path: path.unwrap_or_else(|| {
                config
                    .mountpoint
                    .join(&config.dir_name)
                    .display()
                    .to_string()
            }),
        },
    };

    let response = send_request(socket_path, &request).await?;
    let mut stdout = std::io::stdout().lock();

    match response {
        WireResponse::Data { .. } => {
            let bytes = response.decode_data().context("undecodable data")?;
            stdout.write_all(&bytes)?;
        }
        WireResponse::Written { count } => {
            writeln!(stdout, "{count}")?;
        }
        WireResponse::Entries { entries } => {
            for entry in entries {
                let suffix = if entry.kind.is_dir() { "/" } else { "" };
                writeln!(stdout, "{:o}\t{}{}", entry.perm, entry.name, suffix)?;
            }
        }
        WireResponse::Attr { attr } => {
            writeln!(stdout, "{:o}\t{}\t{:?}", attr.perm, attr.owner, attr.kind)?;
        }
        WireResponse::Error { error, count } => {
            if let Some(count) = count {
                writeln!(stdout, "{count}")?;
            }
            eprintln!("{}: {error}", request.path());
            return Ok(ExitCode::FAILURE);
        }
    }

    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}
