//! Log store capability.
//!
//! The writer and the rotation logic only ever talk to a [`LogStore`]:
//! existence checks, create, rename and whole-file reads. [`FsLogStore`]
//! maps these onto the filesystem; [`MemoryLogStore`] keeps everything in
//! process for tests and dry runs.

use crate::error::{LogError, LogResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Durable append-only storage addressed by path
pub trait LogStore: Send + Sync + 'static {
    /// Append handle returned by [`LogStore::create`]
    type Handle: Write + Send + 'static;

    /// Whether a file or directory exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Create an empty file at `path`, replacing whatever was there
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created
    fn create(&self, path: &Path) -> LogResult<Self::Handle>;

    /// Move `from` to `to`
    ///
    /// # Errors
    ///
    /// Returns error if `from` is missing or the move fails
    fn rename(&self, from: &Path, to: &Path) -> LogResult<()>;

    /// Read a whole file as UTF-8
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing or not valid UTF-8
    fn read_to_string(&self, path: &Path) -> LogResult<String>;

    /// Ensure a directory exists
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    fn create_dir_all(&self, dir: &Path) -> LogResult<()>;

    /// Files directly inside `dir` with the given extension, sorted by path
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be read
    fn list(&self, dir: &Path, extension: &str) -> LogResult<Vec<PathBuf>>;
}

/// Filesystem-backed store
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLogStore;

impl FsLogStore {
    /// Create a filesystem store
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LogStore for FsLogStore {
    type Handle = fs::File;

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create(&self, path: &Path) -> LogResult<Self::Handle> {
        fs::File::create(path).map_err(|e| LogError::io("create", path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> LogResult<()> {
        fs::rename(from, to).map_err(|e| LogError::io("rename", from, e))
    }

    fn read_to_string(&self, path: &Path) -> LogResult<String> {
        fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LogError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LogError::io("read", path, e),
        })
    }

    fn create_dir_all(&self, dir: &Path) -> LogResult<()> {
        fs::create_dir_all(dir).map_err(|e| LogError::io("create directory", dir, e))
    }

    fn list(&self, dir: &Path, extension: &str) -> LogResult<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| LogError::io("list", dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| LogError::io("list", dir, e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, Arc<Mutex<Vec<u8>>>>,
    dirs: BTreeSet<PathBuf>,
}

/// In-memory store; clones share the same contents
#[derive(Debug, Clone, Default)]
pub struct MemoryLogStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryLogStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file with contents
    ///
    /// # Errors
    ///
    /// Returns error if the store lock is poisoned
    pub fn insert(&self, path: impl Into<PathBuf>, contents: &str) -> LogResult<()> {
        let mut state = self.inner.lock().map_err(|_| LogError::Poisoned)?;
        state
            .files
            .insert(path.into(), Arc::new(Mutex::new(contents.as_bytes().to_vec())));
        Ok(())
    }

    /// Current contents of a file, if present
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.read_to_string(path.as_ref()).ok()
    }

    /// All file paths currently held
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.inner
            .lock()
            .map(|state| state.files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl LogStore for MemoryLogStore {
    type Handle = MemoryHandle;

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .lock()
            .map(|state| {
                state.files.contains_key(path)
                    || state.dirs.contains(path)
                    || state.files.keys().any(|file| file.starts_with(path))
            })
            .unwrap_or(false)
    }

    fn create(&self, path: &Path) -> LogResult<Self::Handle> {
        let mut state = self.inner.lock().map_err(|_| LogError::Poisoned)?;
        let buffer = Arc::new(Mutex::new(Vec::new()));
        state.files.insert(path.to_path_buf(), Arc::clone(&buffer));
        Ok(MemoryHandle { buffer })
    }

    fn rename(&self, from: &Path, to: &Path) -> LogResult<()> {
        let mut state = self.inner.lock().map_err(|_| LogError::Poisoned)?;
        let buffer = state.files.remove(from).ok_or_else(|| LogError::NotFound {
            path: from.to_path_buf(),
        })?;
        state.files.insert(to.to_path_buf(), buffer);
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> LogResult<String> {
        let buffer = {
            let state = self.inner.lock().map_err(|_| LogError::Poisoned)?;
            state
                .files
                .get(path)
                .cloned()
                .ok_or_else(|| LogError::NotFound {
                    path: path.to_path_buf(),
                })?
        };
        let bytes = buffer.lock().map_err(|_| LogError::Poisoned)?.clone();
        String::from_utf8(bytes)
            .map_err(|e| LogError::io("read", path, io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn create_dir_all(&self, dir: &Path) -> LogResult<()> {
        let mut state = self.inner.lock().map_err(|_| LogError::Poisoned)?;
        state.dirs.insert(dir.to_path_buf());
        Ok(())
    }

    fn list(&self, dir: &Path, extension: &str) -> LogResult<Vec<PathBuf>> {
        let state = self.inner.lock().map_err(|_| LogError::Poisoned)?;
        Ok(state
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter(|path| path.extension().is_some_and(|ext| ext == extension))
            .cloned()
            .collect())
    }
}

/// Append handle into a [`MemoryLogStore`] file
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for MemoryHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| io::Error::other("memory log buffer poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
