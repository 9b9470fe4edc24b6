//! Virtual file registry.
//!
//! An ordered table of file names to permission bits and handlers. The
//! registry is assembled once through [`RegistryBuilder`] and is immutable
//! afterwards; share it behind an `Arc`.

use indexmap::IndexMap;
use std::sync::Arc;

use super::error::{VfsError, VfsResult};
use super::ops::{ReadHandler, WriteHandler};

/// Permission bits for a file that can only be read.
pub const MODE_READ_ONLY: u32 = 0o444;

/// Permission bits for a file that can be read and written.
pub const MODE_READ_WRITE: u32 = 0o666;

/// A registered virtual file.
#[derive(Clone)]
pub struct VirtualFile {
    name: String,
    mode: u32,
    reader: Option<Arc<dyn ReadHandler>>,
    writer: Option<Arc<dyn WriteHandler>>,
}

impl std::fmt::Debug for VirtualFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualFile")
            .field("name", &self.name)
            .field("mode", &format_args!("{:#o}", self.mode))
            .field("readable", &self.reader.is_some())
            .field("writable", &self.writer.is_some())
            .finish()
    }
}

impl VirtualFile {
    /// File name within the tree.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Permission bits.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// The bound read handler, if any.
    pub fn reader(&self) -> Option<&Arc<dyn ReadHandler>> {
        self.reader.as_ref()
    }

    /// The bound write handler, if any.
    pub fn writer(&self) -> Option<&Arc<dyn WriteHandler>> {
        self.writer.as_ref()
    }
}

/// Immutable, ordered table of virtual files.
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: IndexMap<String, VirtualFile>,
}

impl FileRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a file by name.
    pub fn lookup(&self, name: &str) -> VfsResult<&VirtualFile> {
        self.files
            .get(name)
            .ok_or_else(|| VfsError::not_found(name))
    }

    /// Iterate files in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &VirtualFile> {
        self.files.values()
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no files are registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Collects registrations and rejects duplicate names.
#[derive(Default)]
pub struct RegistryBuilder {
    files: IndexMap<String, VirtualFile>,
    duplicate: Option<String>,
}

impl RegistryBuilder {
    /// Register a file with explicit mode and optional handlers.
    pub fn file(
        mut self,
        name: impl Into<String>,
        mode: u32,
        reader: Option<Arc<dyn ReadHandler>>,
        writer: Option<Arc<dyn WriteHandler>>,
    ) -> Self {
        let name = name.into();
        if self.files.contains_key(&name) {
            self.duplicate.get_or_insert(name);
            return self;
        }
        self.files.insert(
            name.clone(),
            VirtualFile {
                name,
                mode,
                reader,
                writer,
            },
        );
        self
    }

    /// Register a read-only file (mode 0444).
    pub fn read_only(self, name: impl Into<String>, handler: Arc<dyn ReadHandler>) -> Self {
        self.file(name, MODE_READ_ONLY, Some(handler), None)
    }

    /// Register a file whose handler both reads and writes (mode 0666).
    pub fn read_write<H>(self, name: impl Into<String>, handler: Arc<H>) -> Self
    where
        H: ReadHandler + WriteHandler + 'static,
    {
        let writer: Arc<dyn WriteHandler> = handler.clone();
        let reader: Arc<dyn ReadHandler> = handler;
        self.file(name, MODE_READ_WRITE, Some(reader), Some(writer))
    }

    /// Finish the registry.
    pub fn build(self) -> VfsResult<FileRegistry> {
        if let Some(name) = self.duplicate {
            return Err(VfsError::DuplicateFile(name));
        }
        Ok(FileRegistry { files: self.files })
    }
}
