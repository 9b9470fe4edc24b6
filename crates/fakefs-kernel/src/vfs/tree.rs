//! Mounted tree view over the registry.
//!
//! The served tree is `<mountpoint>/<dir>/<file>`: a root directory holding a
//! single directory whose children are the registered files. `FileTree`
//! translates absolute mounted paths into registry names and synthesizes
//! attributes and listings for the two directory levels.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::{VfsError, VfsResult};
use super::registry::FileRegistry;
use super::types::{DirEntry, FileAttr};

/// Permission bits for the synthesized directories.
pub const DIR_MODE: u32 = 0o555;

/// Where a path lands inside the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The mount point itself.
    Root,
    /// The directory holding the virtual files.
    Dir,
    /// A registered file, by name.
    File(String),
}

/// Path-level view of the served tree.
#[derive(Debug, Clone)]
pub struct FileTree {
    mountpoint: PathBuf,
    dir_name: String,
    owner: String,
    built_at: SystemTime,
    registry: Arc<FileRegistry>,
}

impl FileTree {
    /// Create a tree rooted at `mountpoint` with the files under `dir_name`.
    pub fn new(
        mountpoint: impl Into<PathBuf>,
        dir_name: impl Into<String>,
        owner: impl Into<String>,
        registry: Arc<FileRegistry>,
    ) -> Self {
        Self {
            mountpoint: normalize(&mountpoint.into()),
            dir_name: dir_name.into(),
            owner: owner.into(),
            built_at: SystemTime::now(),
            registry,
        }
    }

    /// The normalized mount point.
    pub fn mountpoint(&self) -> &Path {
        &self.mountpoint
    }

    /// Absolute path of a file in the tree.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.mountpoint.join(&self.dir_name).join(name)
    }

    /// Resolve an absolute mounted path to a node.
    pub fn resolve(&self, path: &Path) -> VfsResult<Node> {
        let path = normalize(path);
        let relative = path
            .strip_prefix(&self.mountpoint)
            .map_err(|_| VfsError::invalid_path(path.display().to_string()))?;

        let mut parts = relative.components().filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        });

        match (parts.next(), parts.next(), parts.next()) {
            (None, _, _) => Ok(Node::Root),
            (Some(dir), None, _) if dir == self.dir_name => Ok(Node::Dir),
            (Some(dir), Some(name), None) if dir == self.dir_name => {
                self.registry.lookup(&name)?;
                Ok(Node::File(name))
            }
            _ => Err(VfsError::not_found(path.display().to_string())),
        }
    }

    /// Resolve a path that must name a file; returns the file name.
    pub fn resolve_file(&self, path: &Path) -> VfsResult<String> {
        match self.resolve(path)? {
            Node::File(name) => Ok(name),
            _ => Err(VfsError::other(format!("is a directory: {}", path.display()))),
        }
    }

    /// Attributes for a path.
    pub fn getattr(&self, path: &Path) -> VfsResult<FileAttr> {
        match self.resolve(path)? {
            Node::Root | Node::Dir => Ok(FileAttr::directory(DIR_MODE, &self.owner, self.built_at)),
            Node::File(name) => {
                let file = self.registry.lookup(&name)?;
                Ok(FileAttr::file(file.mode(), &self.owner, self.built_at))
            }
        }
    }

    /// List a directory in registration order.
    pub fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        match self.resolve(path)? {
            Node::Root => Ok(vec![DirEntry::directory(&self.dir_name, DIR_MODE)]),
            Node::Dir => Ok(self
                .registry
                .iter()
                .map(|f| DirEntry::file(f.name(), f.mode()))
                .collect()),
            Node::File(name) => Err(VfsError::other(format!("not a directory: {}", name))),
        }
    }
}

/// Normalize a path: ensure it is absolute, drop `.` and resolve `..`.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(s) => result.push(s),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    result
}
