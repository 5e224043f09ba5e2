//! # In-Memory Handle
//!
//! [`MemoryFs`] keeps a whole namespace in process memory. It stands in for
//! a remote store: its backend id differs from [`LocalFs`](crate::LocalFs),
//! so copies between the two take the cross-backend path, while clones of one
//! `MemoryFs` share state and identity.
//!
//! ## Test support
//!
//! Fault injection (`fail_deletes`, `fail_opens`, `fail_flushes`,
//! `clear_faults`) exists for tests that need the partial-failure paths of
//! the tree algorithms. It is hidden from the rendered docs and is not part
//! of the stable API.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    BridgeError, FileStatus, FsBackend, FsDir, FsPath, FsRead, FsWrite, Permissions,
    QualifiedPath,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<FsPath, Node>,
    delete_faults: HashMap<FsPath, usize>,
    open_faults: HashSet<FsPath>,
    flush_faults: HashSet<FsPath>,
}

/// In-process filesystem handle.
///
/// Relative paths resolve against `/`. Listings are sorted by name.
#[derive(Debug, Clone)]
pub struct MemoryFs {
    id: String,
    state: Arc<RwLock<State>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    /// Empty namespace holding only `/`, with a fresh backend id.
    pub fn new() -> Self {
        let mut state = State::default();
        state.nodes.insert(FsPath::new("/"), Node::Dir);
        Self {
            id: format!("mem-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Make the next `times` deletes of `path` return `Ok(false)`.
    ///
    /// `usize::MAX` makes the path permanently undeletable.
    #[doc(hidden)]
    pub fn fail_deletes(&self, path: impl Into<FsPath>, times: usize) {
        let key = key(&path.into());
        self.write().delete_faults.insert(key, times);
    }

    /// Make every `open` of `path` fail with an I/O error.
    #[doc(hidden)]
    pub fn fail_opens(&self, path: impl Into<FsPath>) {
        let key = key(&path.into());
        self.write().open_faults.insert(key);
    }

    /// Make every `flush` of a writer onto `path` fail with an I/O error.
    #[doc(hidden)]
    pub fn fail_flushes(&self, path: impl Into<FsPath>) {
        let key = key(&path.into());
        self.write().flush_faults.insert(key);
    }

    /// Clear every injected fault.
    #[doc(hidden)]
    pub fn clear_faults(&self) {
        let mut state = self.write();
        state.delete_faults.clear();
        state.open_faults.clear();
        state.flush_faults.clear();
    }

    /// Write `data` to `path` in one call, creating parents.
    pub fn put(&self, path: impl Into<FsPath>, data: impl Into<Vec<u8>>) -> Result<(), BridgeError> {
        let path = path.into();
        let mut state = self.write();
        ensure_parents(&mut state, &key(&path), &path)?;
        insert_file(&mut state, &path, data.into(), true)
    }

    /// Full contents of the file at `path`.
    pub fn contents(&self, path: impl Into<FsPath>) -> Result<Vec<u8>, BridgeError> {
        let path = path.into();
        match self.read().nodes.get(&key(&path)) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Dir) => Err(BridgeError::InvalidPath {
                path: path.to_string(),
                reason: "is a directory",
            }),
            None => Err(BridgeError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn key(path: &FsPath) -> FsPath {
    FsPath::new("/").join(path.as_str()).normalized()
}

fn is_below(candidate: &FsPath, ancestor: &FsPath) -> bool {
    if ancestor.is_root() {
        return !candidate.is_root();
    }
    candidate
        .as_str()
        .strip_prefix(ancestor.as_str())
        .is_some_and(|rest| rest.starts_with('/'))
}

fn ensure_parents(state: &mut State, key: &FsPath, shown: &FsPath) -> Result<(), BridgeError> {
    let Some(parent) = key.parent() else {
        return Ok(());
    };
    if mkdirs_locked(state, &parent) {
        Ok(())
    } else {
        Err(BridgeError::NotADirectory {
            path: shown.to_string(),
        })
    }
}

fn mkdirs_locked(state: &mut State, dir: &FsPath) -> bool {
    let mut chain = Vec::new();
    let mut cursor = Some(dir.clone());
    while let Some(current) = cursor {
        match state.nodes.get(&current) {
            Some(Node::Dir) => break,
            Some(Node::File(_)) => return false,
            None => {
                cursor = current.parent();
                chain.push(current);
            }
        }
    }
    for missing in chain {
        state.nodes.insert(missing, Node::Dir);
    }
    true
}

fn insert_file(
    state: &mut State,
    path: &FsPath,
    data: Vec<u8>,
    overwrite: bool,
) -> Result<(), BridgeError> {
    let k = key(path);
    match state.nodes.get(&k) {
        Some(Node::Dir) => {
            return Err(BridgeError::AlreadyExists {
                path: path.to_string(),
                operation: "create",
            });
        }
        Some(Node::File(_)) if !overwrite => {
            return Err(BridgeError::AlreadyExists {
                path: path.to_string(),
                operation: "create",
            });
        }
        _ => {}
    }
    state.nodes.insert(k, Node::File(data));
    Ok(())
}

fn status(path: FsPath, node: &Node) -> FileStatus {
    match node {
        Node::Dir => FileStatus {
            path,
            is_dir: true,
            is_file: false,
            len: 0,
            permission: Permissions::default_dir(),
        },
        Node::File(data) => FileStatus {
            path,
            is_dir: false,
            is_file: true,
            len: data.len() as u64,
            permission: Permissions::default_file(),
        },
    }
}

/// Writer returned by [`MemoryFs::create`]. Buffered bytes become visible on
/// `flush` and again on drop.
struct MemoryWriter {
    state: Arc<RwLock<State>>,
    key: FsPath,
    buf: Vec<u8>,
}

impl MemoryWriter {
    fn commit(&self) -> io::Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.flush_faults.contains(&self.key) {
            return Err(io::Error::other(format!("injected flush failure on {}", self.key)));
        }
        match state.nodes.get_mut(&self.key) {
            Some(Node::File(data)) => {
                data.clone_from(&self.buf);
                Ok(())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} vanished while open", self.key),
            )),
        }
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit()
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        let _ = self.commit();
    }
}

impl FsRead for MemoryFs {
    fn exists(&self, path: &FsPath) -> Result<bool, BridgeError> {
        Ok(self.read().nodes.contains_key(&key(path)))
    }

    fn stat(&self, path: &FsPath) -> Result<FileStatus, BridgeError> {
        let state = self.read();
        let node = state.nodes.get(&key(path)).ok_or_else(|| BridgeError::NotFound {
            path: path.to_string(),
        })?;
        Ok(status(path.clone(), node))
    }

    fn open(&self, path: &FsPath) -> Result<Box<dyn Read + Send>, BridgeError> {
        let k = key(path);
        let state = self.read();
        if state.open_faults.contains(&k) {
            return Err(BridgeError::Io {
                operation: "open",
                path: path.to_string(),
                source: io::Error::other("injected open failure"),
            });
        }
        match state.nodes.get(&k) {
            Some(Node::File(data)) => Ok(Box::new(io::Cursor::new(data.clone()))),
            Some(Node::Dir) => Err(BridgeError::InvalidPath {
                path: path.to_string(),
                reason: "is a directory",
            }),
            None => Err(BridgeError::NotFound {
                path: path.to_string(),
            }),
        }
    }
}

impl FsWrite for MemoryFs {
    fn create(&self, path: &FsPath, overwrite: bool) -> Result<Box<dyn Write + Send>, BridgeError> {
        let k = key(path);
        let mut state = self.write();
        ensure_parents(&mut state, &k, path)?;
        insert_file(&mut state, path, Vec::new(), overwrite)?;
        Ok(Box::new(MemoryWriter {
            state: Arc::clone(&self.state),
            key: k,
            buf: Vec::new(),
        }))
    }

    fn delete(&self, path: &FsPath, recursive: bool) -> Result<bool, BridgeError> {
        let k = key(path);
        let mut state = self.write();
        if let Some(remaining) = state.delete_faults.get_mut(&k) {
            if *remaining > 0 {
                if *remaining != usize::MAX {
                    *remaining -= 1;
                }
                return Ok(false);
            }
        }
        if k.is_root() {
            return Ok(false);
        }
        let is_dir = match state.nodes.get(&k) {
            None => return Ok(false),
            Some(node) => matches!(node, Node::Dir),
        };
        if !is_dir {
            state.nodes.remove(&k);
            return Ok(true);
        }
        let children: Vec<FsPath> = state
            .nodes
            .keys()
            .filter(|p| is_below(p, &k))
            .cloned()
            .collect();
        if !children.is_empty() && !recursive {
            return Err(BridgeError::Io {
                operation: "delete",
                path: path.to_string(),
                source: io::Error::new(io::ErrorKind::DirectoryNotEmpty, "directory not empty"),
            });
        }
        // A pinned descendant keeps the whole subtree in place.
        if children
            .iter()
            .any(|c| state.delete_faults.get(c).is_some_and(|n| *n > 0))
        {
            return Ok(false);
        }
        for child in children {
            state.nodes.remove(&child);
        }
        state.nodes.remove(&k);
        Ok(true)
    }

    fn rename(&self, from: &FsPath, to: &FsPath) -> Result<bool, BridgeError> {
        let (src, dst) = (key(from), key(to));
        let mut state = self.write();
        if !state.nodes.contains_key(&src) {
            return Err(BridgeError::NotFound {
                path: from.to_string(),
            });
        }
        if state.nodes.contains_key(&dst) || src.is_root() || is_below(&dst, &src) {
            return Ok(false);
        }
        if !matches!(dst.parent().and_then(|p| state.nodes.get(&p)), Some(Node::Dir)) {
            return Ok(false);
        }
        let moved: Vec<FsPath> = state
            .nodes
            .keys()
            .filter(|p| **p == src || is_below(p, &src))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = state.nodes.remove(&old) {
                let suffix = &old.as_str()[src.as_str().len()..];
                state.nodes.insert(FsPath::new(format!("{dst}{suffix}")), node);
            }
        }
        Ok(true)
    }
}

impl FsDir for MemoryFs {
    fn list(&self, path: &FsPath) -> Result<Vec<FileStatus>, BridgeError> {
        let k = key(path);
        let state = self.read();
        match state.nodes.get(&k) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => {
                return Err(BridgeError::NotADirectory {
                    path: path.to_string(),
                });
            }
            None => {
                return Err(BridgeError::NotFound {
                    path: path.to_string(),
                });
            }
        }
        // BTreeMap order is path order, which within one parent is name order.
        Ok(state
            .nodes
            .iter()
            .filter(|(p, _)| !p.is_root() && p.parent().as_ref() == Some(&k))
            .map(|(p, node)| {
                let name = p.name().unwrap_or_default();
                status(path.join(name), node)
            })
            .collect())
    }

    fn mkdirs(&self, path: &FsPath) -> Result<bool, BridgeError> {
        let k = key(path);
        Ok(mkdirs_locked(&mut self.write(), &k))
    }
}

impl FsBackend for MemoryFs {
    fn backend_id(&self) -> &str {
        &self.id
    }

    fn qualify(&self, path: &FsPath) -> QualifiedPath {
        QualifiedPath::new("mem", &self.id, &key(path))
    }
}
