use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{StoreError, TokenStore};
use crate::models::TokenKind;

type Document = BTreeMap<String, String>;

/// Tokens persisted as a small JSON document keyed by [`TokenKind::key`].
///
/// The file is re-read on every access, and writes replace it atomically
/// through a uniquely named temp file. Handles opened on the same path in
/// one process share a write lock, so their updates never clobber each
/// other. Separate processes are not coordinated.
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        FileTokenStore {
            write_lock: path_lock(&path),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Document::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_document(&self, document: &Document) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(io_err)?;

        let body = serde_json::to_vec_pretty(document)?;
        let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
        tmp.write_all(&body).map_err(io_err)?;
        restrict_permissions(tmp.path()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Document) -> bool,
    {
        let _guard = self.write_lock.lock().expect("token store lock poisoned");
        let mut document = self.read_document()?;
        if mutate(&mut document) {
            self.write_document(&document)?;
        }
        Ok(())
    }
}

/// One lock per path, shared by every handle in the process.
fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .expect("token store lock registry poisoned");
    locks.entry(path.to_path_buf()).or_default().clone()
}

// Tokens are credentials: keep the file private to the owner.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        match self.read_document() {
            Ok(mut document) => document.remove(kind.key()),
            Err(e) => {
                warn!(key = kind.key(), "Treating token as absent: {}", e);
                None
            }
        }
    }

    fn set(&self, kind: TokenKind, value: &str) -> Result<(), StoreError> {
        debug!(key = kind.key(), path = %self.path.display(), "Writing token");
        self.update(|document| {
            document.insert(kind.key().to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, kind: TokenKind) -> Result<(), StoreError> {
        debug!(key = kind.key(), path = %self.path.display(), "Removing token");
        self.update(|document| document.remove(kind.key()).is_some())
    }

    fn backend(&self) -> &str {
        "file"
    }
}
