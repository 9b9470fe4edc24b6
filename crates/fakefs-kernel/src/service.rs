//! The fakefs service state.
//!
//! [`FakeFs`] owns every process-wide piece of state (transform buffer,
//! fetch cache, audit log) and the registry that binds them to file names.
//! Collaborators are injected through [`FakeFsBuilder`]; anything left unset
//! gets its production default.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::audit::{AuditLog, AuditSink, FileSink};
use crate::clock::{Clock, RandomSource, SystemClock, ThreadRandom};
use crate::config::{ConfigError, FakefsConfig};
use crate::fetch::{FetchClient, WebfsClient};
use crate::files::{
    self, Backtalk, FetchCache, Hexagram, Honeypot, TimeMessage, TransformBuffer,
};
use crate::vfs::{Dispatcher, FileRegistry, FileTree, Request, Response, VfsError};

/// Failures that stop the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot open audit log {path}: {source}")]
    AuditLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot build file table: {0}")]
    Registry(#[from] VfsError),
}

/// Assembles a [`FakeFs`].
pub struct FakeFsBuilder {
    config: FakefsConfig,
    owner: Option<String>,
    clock: Option<Arc<dyn Clock>>,
    random: Option<Arc<dyn RandomSource>>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    fetch_client: Option<Arc<dyn FetchClient>>,
}

impl FakeFsBuilder {
    pub fn new(config: FakefsConfig) -> Self {
        Self {
            config,
            owner: None,
            clock: None,
            random: None,
            audit_sink: None,
            fetch_client: None,
        }
    }

    /// Owner shown on every entry. Defaults to the current user.
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    /// Audit destination. Defaults to appending to the configured log file.
    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Fetch client for `sat.jpg`. Defaults to webfs at the configured root.
    pub fn fetch_client(mut self, client: Arc<dyn FetchClient>) -> Self {
        self.fetch_client = Some(client);
        self
    }

    pub fn build(self) -> Result<FakeFs, StartupError> {
        let config = self.config;
        let owner = self.owner.unwrap_or_else(whoami::username);
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let random = self.random.unwrap_or_else(|| Arc::new(ThreadRandom));
        let fetch_client = self
            .fetch_client
            .unwrap_or_else(|| Arc::new(WebfsClient::new(&config.webfs_root)));

        let sink = match self.audit_sink {
            Some(sink) => sink,
            None => {
                let path = config.resolved_log_path()?;
                let sink = FileSink::open(&path)
                    .map_err(|source| StartupError::AuditLog { path, source })?;
                Arc::new(sink)
            }
        };
        let audit = Arc::new(AuditLog::new(sink, clock.clone()));

        let rot13 = Arc::new(TransformBuffer::new(config.rot13_capacity));
        let sat = Arc::new(FetchCache::new(
            config.cache_policy(),
            fetch_client,
            clock.clone(),
            audit.clone(),
        ));

        let registry = Arc::new(
            FileRegistry::builder()
                .read_only(files::TYME, Arc::new(TimeMessage::new(clock)))
                .read_only(files::BACKTALK, Arc::new(Backtalk))
                .read_only(files::I_CHING, Arc::new(Hexagram::new(random)))
                .read_write(files::ROT13, rot13.clone())
                .read_write(files::HONEYPOT, Arc::new(Honeypot::new(audit.clone())))
                .read_only(files::SAT, sat.clone())
                .build()?,
        );

        let tree = FileTree::new(
            &config.mountpoint,
            &config.dir_name,
            &owner,
            registry.clone(),
        );

        Ok(FakeFs {
            config,
            owner,
            audit,
            rot13,
            sat,
            dispatcher: Dispatcher::new(registry),
            tree,
        })
    }
}

/// A running set of virtual files and their shared state.
#[derive(Debug)]
pub struct FakeFs {
    config: FakefsConfig,
    owner: String,
    audit: Arc<AuditLog>,
    rot13: Arc<TransformBuffer>,
    sat: Arc<FetchCache>,
    dispatcher: Dispatcher,
    tree: FileTree,
}

impl FakeFs {
    pub fn builder(config: FakefsConfig) -> FakeFsBuilder {
        FakeFsBuilder::new(config)
    }

    pub fn config(&self) -> &FakefsConfig {
        &self.config
    }

    /// Owner of the tree and default caller identity.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// The shared `rot13` buffer.
    pub fn transform_buffer(&self) -> &Arc<TransformBuffer> {
        &self.rot13
    }

    /// The `sat.jpg` cache.
    pub fn fetch_cache(&self) -> &Arc<FetchCache> {
        &self.sat
    }

    /// Handle one request.
    pub async fn dispatch(&self, request: Request) -> Response {
        self.dispatcher.dispatch(request).await
    }

    /// Record service start.
    pub fn start(&self) {
        self.audit
            .record(&format!("{} started", self.config.srv_name));
        tracing::info!(
            srv = %self.config.srv_name,
            mountpoint = %self.config.mountpoint.display(),
            files = self.dispatcher.registry().len(),
            "fakefs started"
        );
    }

    /// Record service stop.
    pub fn stop(&self) {
        self.audit
            .record(&format!("{} stopped", self.config.srv_name));
        tracing::info!(srv = %self.config.srv_name, "fakefs stopped");
    }
}
